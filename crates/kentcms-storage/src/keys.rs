//! Filename sanitization and collision-resistant name generation.

use rand::distr::Alphanumeric;
use rand::Rng;

const MAX_FILENAME_LENGTH: usize = 255;
const MAX_STEM_LENGTH: usize = 80;
const RANDOM_SUFFIX_LENGTH: usize = 6;

/// Strip path components and characters unsafe for a filesystem or URL path.
/// Deterministic: the same input always sanitizes to the same output.
pub fn sanitize_filename(filename: &str) -> String {
    let base = std::path::Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if base.contains("..") {
        return "file".to_string();
    }

    let sanitized: String = base
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['_', '.']).is_empty() {
        "file".to_string()
    } else {
        sanitized
    }
}

/// Produce a collision-resistant stored filename from a user-supplied one:
/// sanitized stem, bounded length, then `-{unix_millis}-{random}` before the
/// extension. Two concurrent uploads with identical names never collide.
/// Not idempotent by design: the uniqueness token differs per call.
pub fn generate_unique_filename(original: &str) -> String {
    let sanitized = sanitize_filename(original);

    let (stem, extension) = match sanitized.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem.to_string(), Some(ext.to_lowercase()))
        }
        _ => (sanitized.clone(), None),
    };

    let stem: String = stem.chars().take(MAX_STEM_LENGTH).collect();

    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LENGTH)
        .map(char::from)
        .collect();

    match extension {
        Some(ext) => format!("{}-{}-{}.{}", stem, millis, suffix.to_lowercase(), ext),
        None => format!("{}-{}-{}", stem, millis, suffix.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_unsafe_characters() {
        assert_eq!(sanitize_filename("meclis kararı.pdf"), "meclis_kararı.pdf");
        assert_eq!(sanitize_filename("a<b>c.png"), "a_b_c.png");
        assert_eq!(sanitize_filename("normal-file_1.jpg"), "normal-file_1.jpg");
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("/etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("dir/sub/photo.jpg"), "photo.jpg");
    }

    #[test]
    fn sanitize_rejects_traversal_and_empty() {
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("???"), "file");
    }

    #[test]
    fn sanitize_is_deterministic() {
        assert_eq!(sanitize_filename("a b.png"), sanitize_filename("a b.png"));
    }

    #[test]
    fn unique_names_keep_extension() {
        let name = generate_unique_filename("Park Projesi.JPG");
        assert!(name.ends_with(".jpg"), "got {}", name);
        assert!(name.starts_with("Park_Projesi-"), "got {}", name);
    }

    #[test]
    fn identical_inputs_produce_distinct_names() {
        let a = generate_unique_filename("photo.jpg");
        let b = generate_unique_filename("photo.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn long_stems_are_truncated() {
        let long = format!("{}.png", "x".repeat(500));
        let name = generate_unique_filename(&long);
        assert!(name.len() < 120, "got len {}", name.len());
        assert!(name.ends_with(".png"));
    }
}
