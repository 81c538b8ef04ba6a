//! PDF report generation
//!
//! Renders the downloadable analytics report for one upload: a title block,
//! an executive summary of the stored statistics, and the full equipment
//! detail table. Reports are regenerated from current storage on every
//! request and never cached.

use chrono::Utc;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use chemviz_common::ChemVizError;

use crate::models::{EquipmentRecord, Upload};

// US letter
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;

const MARGIN_LEFT_MM: f32 = 18.0;
const MARGIN_TOP_MM: f32 = 18.0;
const MARGIN_BOTTOM_MM: f32 = 18.0;
const LINE_HEIGHT_MM: f32 = 6.0;

/// Column x offsets for the detail table, in mm from the left edge
const COLUMNS_MM: [f32; 5] = [18.0, 75.0, 115.0, 145.0, 175.0];

/// Render the analytics report for one upload as PDF bytes
pub fn render_pdf(upload: &Upload, records: &[EquipmentRecord]) -> Result<Vec<u8>, ChemVizError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        format!("ChemVisualizer Report - {}", upload.filename),
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Layer 1",
    );

    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ChemVizError::render(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ChemVizError::render(e.to_string()))?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(first_page).get_layer(first_layer),
        y: PAGE_HEIGHT_MM - MARGIN_TOP_MM,
    };

    // Title block
    writer.text(&bold, 20.0, MARGIN_LEFT_MM, "ChemVisualizer Analytics Report");
    writer.advance(10.0);
    writer.text(&regular, 10.0, MARGIN_LEFT_MM, &format!("Dataset: {}", upload.filename));
    writer.advance(LINE_HEIGHT_MM);
    writer.text(
        &regular,
        10.0,
        MARGIN_LEFT_MM,
        &format!(
            "Generated on {}",
            Utc::now().format("%B %d, %Y at %H:%M UTC")
        ),
    );
    writer.advance(12.0);

    // Executive summary
    writer.text(&bold, 14.0, MARGIN_LEFT_MM, "Executive Summary");
    writer.advance(8.0);
    let summary_lines = [
        format!("Total records: {}", upload.total_records),
        format!("Average flowrate: {:.1} L/min", upload.avg_flowrate),
        format!("Average pressure: {:.1} PSI", upload.avg_pressure),
        format!("Average temperature: {:.1} \u{b0}C", upload.avg_temperature),
    ];
    for line in &summary_lines {
        writer.text(&regular, 10.0, MARGIN_LEFT_MM, line);
        writer.advance(LINE_HEIGHT_MM);
    }
    writer.advance(8.0);

    // Detail table
    writer.text(&bold, 14.0, MARGIN_LEFT_MM, "Detailed Equipment Logs");
    writer.advance(8.0);
    writer.table_row(&bold, &["Equipment Name", "Type", "Flowrate", "Pressure", "Temp"]);
    writer.advance(LINE_HEIGHT_MM);

    for record in records {
        if writer.y < MARGIN_BOTTOM_MM + LINE_HEIGHT_MM {
            writer.new_page();
            writer.table_row(&bold, &["Equipment Name", "Type", "Flowrate", "Pressure", "Temp"]);
            writer.advance(LINE_HEIGHT_MM);
        }

        writer.table_row(
            &regular,
            &[
                &record.equipment_name,
                &record.equipment_type,
                &format!("{:.1}", record.flowrate),
                &format!("{:.1}", record.pressure),
                &format!("{:.1}", record.temperature),
            ],
        );
        writer.advance(LINE_HEIGHT_MM);
    }

    doc.save_to_bytes()
        .map_err(|e| ChemVizError::render(e.to_string()))
}

/// Cursor over the current page; tracks the write position and paginates
struct PageWriter<'a> {
    doc: &'a printpdf::PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    fn text(&self, font: &IndirectFontRef, size: f32, x: f32, content: &str) {
        self.layer.use_text(content, size, Mm(x), Mm(self.y), font);
    }

    fn table_row(&self, font: &IndirectFontRef, cells: &[&str; 5]) {
        for (cell, x) in cells.iter().zip(COLUMNS_MM) {
            self.layer.use_text(*cell, 9.0, Mm(x), Mm(self.y), font);
        }
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_TOP_MM;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_upload() -> Upload {
        Upload {
            id: "7b6f9e9e-1111-2222-3333-444455556666".to_string(),
            filename: "plant_readings.csv".to_string(),
            upload_date: Utc::now(),
            total_records: 2,
            skipped_rows: 0,
            avg_flowrate: 50.0,
            avg_pressure: 130.0,
            avg_temperature: 85.0,
        }
    }

    fn sample_records(upload_id: &str, count: usize) -> Vec<EquipmentRecord> {
        (0..count)
            .map(|i| EquipmentRecord {
                id: i as i64 + 1,
                upload_id: upload_id.to_string(),
                equipment_name: format!("R-{:03}", i + 1),
                equipment_type: "Reactor".to_string(),
                flowrate: 40.0 + i as f64,
                pressure: 120.0,
                temperature: 80.0,
            })
            .collect()
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let upload = sample_upload();
        let records = sample_records(&upload.id, 2);
        let bytes = render_pdf(&upload, &records).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_paginates_large_datasets() {
        let upload = sample_upload();
        // Enough rows to overflow the first page
        let records = sample_records(&upload.id, 120);
        let bytes = render_pdf(&upload, &records).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_empty_record_set() {
        let upload = sample_upload();
        let bytes = render_pdf(&upload, &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
