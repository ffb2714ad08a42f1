mod pipeline;
mod types;

pub use pipeline::upload_pipeline;
pub use types::{StoredUpload, UploadFile};
