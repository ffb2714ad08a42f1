//! Pre-save upload validation against the media policy.
//!
//! Validation aggregates every violated rule instead of stopping at the
//! first, so a client can fix everything in one round-trip.

/// MIME types accepted for Word documents.
pub const WORD_MIME_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Outcome of pre-save validation. `errors` is ordered and complete.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Size ceilings and the MIME allow-list for uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    image_max_bytes: usize,
    video_max_bytes: usize,
    document_max_bytes: usize,
}

impl UploadPolicy {
    pub fn new(image_max_bytes: usize, video_max_bytes: usize, document_max_bytes: usize) -> Self {
        UploadPolicy {
            image_max_bytes,
            video_max_bytes,
            document_max_bytes,
        }
    }

    /// Whether the declared MIME type is acceptable at all.
    fn is_allowed_mime(mime: &str) -> bool {
        mime.starts_with("image/")
            || mime.starts_with("video/")
            || mime == "application/pdf"
            || WORD_MIME_TYPES.contains(&mime)
            || mime == "text/plain"
    }

    /// Size ceiling for the declared MIME type. Images are capped lower than
    /// videos; everything else counts as a document.
    pub fn ceiling_for(&self, mime: &str) -> usize {
        if mime.starts_with("image/") {
            self.image_max_bytes
        } else if mime.starts_with("video/") {
            self.video_max_bytes
        } else {
            self.document_max_bytes
        }
    }

    /// Phase-1 validation over declared metadata only. Returns the complete
    /// list of violated rules, never just the first.
    pub fn pre_validate(&self, filename: &str, declared_mime: &str, size: usize) -> ValidationReport {
        let mime = declared_mime
            .split(';')
            .next()
            .unwrap_or(declared_mime)
            .trim()
            .to_lowercase();
        let mut errors = Vec::new();

        if !Self::is_allowed_mime(&mime) {
            errors.push(format!(
                "File type '{}' is not allowed; accepted: images, videos, PDF, Word, plain text",
                declared_mime
            ));
        }

        if size == 0 {
            errors.push("File is empty".to_string());
        } else {
            let ceiling = self.ceiling_for(&mime);
            if size > ceiling {
                errors.push(format!(
                    "File size {} bytes exceeds the {} byte limit for this type",
                    size, ceiling
                ));
            }
        }

        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension {
            None => errors.push(format!("Filename '{}' has no extension", filename)),
            Some(ext) => {
                if Self::is_allowed_mime(&mime) && !extension_matches_mime(&ext, &mime) {
                    errors.push(format!(
                        "File extension '.{}' does not match declared type '{}'",
                        ext, mime
                    ));
                }
            }
        }

        ValidationReport { errors }
    }
}

/// Map common extensions to the declared MIME types they are allowed to carry.
/// Unknown extensions skip the cross-check; the allow-list already bounds the
/// accepted MIME types.
fn extension_matches_mime(extension: &str, mime: &str) -> bool {
    let expected: &[&str] = match extension {
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "bmp" => &["image/bmp"],
        "svg" => &["image/svg+xml"],
        "mp4" => &["video/mp4"],
        "m4v" => &["video/x-m4v", "video/mp4"],
        "webm" => &["video/webm"],
        "mov" => &["video/quicktime"],
        "avi" => &["video/x-msvideo"],
        "mkv" => &["video/x-matroska"],
        "pdf" => &["application/pdf"],
        "doc" => &["application/msword"],
        "docx" => {
            &["application/vnd.openxmlformats-officedocument.wordprocessingml.document"]
        }
        "txt" => &["text/plain"],
        _ => {
            tracing::debug!(
                extension = %extension,
                mime = %mime,
                "Unknown extension, skipping extension/MIME cross-check"
            );
            return true;
        }
    };
    expected.contains(&mime)
}
