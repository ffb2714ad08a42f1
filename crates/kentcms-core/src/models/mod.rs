mod category;
mod media;

pub use category::{CategoryResponse, CategoryWithCount, MediaCategory, NewCategory};
pub use media::{
    ImageOriginalInfo, ImageProcessingStats, ImageProcessingSummary, ImageVariantInfo,
    MediaRecord, MediaResponse, MediaType, Pagination, EMBED_MIME_TYPE,
};
