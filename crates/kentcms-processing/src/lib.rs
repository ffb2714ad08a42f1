pub mod scanner;
pub mod signature;
pub mod upload;
pub mod validator;
pub mod variants;

pub use scanner::{ClamAvScanner, ScanOutcome, ThreatScanner};
pub use upload::{upload_pipeline, StoredUpload, UploadFile};
pub use validator::{UploadPolicy, ValidationReport};
pub use variants::variant_keys;
