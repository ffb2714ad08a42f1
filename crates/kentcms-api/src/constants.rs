/// Versioned prefix for all media API routes.
pub const API_PREFIX: &str = "/api/v0";
