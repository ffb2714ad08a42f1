pub mod categories;
pub mod media_delete;
pub mod media_get;
pub mod media_list;
pub mod media_upload;
