pub mod keys;
pub mod local;
pub mod resolver;
pub mod traits;

pub use keys::{generate_unique_filename, sanitize_filename};
pub use local::LocalStorage;
pub use resolver::{slugify, StorageResolver, StorageTarget};
pub use traits::{Storage, StorageError, StorageResult};
