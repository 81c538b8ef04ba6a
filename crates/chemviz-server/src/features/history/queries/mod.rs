pub mod get_upload;
pub mod list_uploads;

pub use get_upload::{GetUploadError, GetUploadQuery, UploadDetailResponse};
pub use list_uploads::ListUploadsError;
