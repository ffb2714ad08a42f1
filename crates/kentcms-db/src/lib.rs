//! Database repositories.
//!
//! Repositories own the SQL for one table each and return domain models from
//! `kentcms-core`. Query parameters arrive as typed filters; nothing in this
//! crate interpolates caller-supplied strings into SQL.

pub mod category;
pub mod media;

pub use category::CategoryRepository;
pub use media::{MediaListFilter, MediaRepository, NewMedia, SortField, SortOrder};
