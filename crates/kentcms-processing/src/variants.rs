//! Image variant generation.
//!
//! Successful image uploads to category folders get a set of resized JPEG
//! renditions stored next to the original. Variant generation is best-effort:
//! a decode or encode failure never fails the upload itself.

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, GenericImageView, ImageReader};
use kentcms_core::models::{ImageProcessingSummary, ImageVariantInfo};
use kentcms_storage::{Storage, StorageTarget};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;

const JPEG_QUALITY: u8 = 80;

/// Variant label, filename suffix, and bounding-box edge in pixels.
/// The thumbnail is always generated; larger renditions only when the
/// original actually exceeds them.
pub const VARIANT_SPECS: &[(&str, &str, u32)] = &[
    ("thumb", "thumb", 150),
    ("medium", "md", 600),
    ("large", "lg", 1200),
];

/// Filename for a variant: original stem plus the variant suffix, always
/// `.jpg` regardless of the source format.
pub fn variant_filename(stored_filename: &str, suffix: &str) -> String {
    let stem = std::path::Path::new(stored_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(stored_filename);
    format!("{}-{}.jpg", stem, suffix)
}

/// Storage keys every rendition of a stored image could live under, whether
/// or not it was actually generated. Used for cleanup on delete.
pub fn variant_keys(target: &StorageTarget, stored_filename: &str) -> Vec<String> {
    VARIANT_SPECS
        .iter()
        .map(|(_, suffix, _)| target.key(&variant_filename(stored_filename, suffix)))
        .collect()
}

struct EncodedVariant {
    label: String,
    suffix: String,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Decode, resize, and re-encode in one blocking pass. CPU-bound, so it runs
/// off the async runtime.
fn encode_variants(data: &[u8]) -> Result<Vec<EncodedVariant>, anyhow::Error> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("failed to sniff image format")?;
    let img = reader.decode().context("failed to decode image")?;
    let (orig_width, orig_height) = img.dimensions();
    let max_dim = orig_width.max(orig_height);

    let mut variants = Vec::new();
    for &(label, suffix, edge) in VARIANT_SPECS {
        // Never upscale
        if label != "thumb" && max_dim <= edge {
            continue;
        }
        let resized = if max_dim <= edge {
            img.clone()
        } else {
            img.resize(edge, edge, FilterType::Lanczos3)
        };
        let (width, height) = resized.dimensions();

        let rgb = resized.to_rgb8();
        let mut buffer = Vec::new();
        JpegEncoder::new_with_quality(&mut Cursor::new(&mut buffer), JPEG_QUALITY)
            .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .with_context(|| format!("failed to encode '{}' variant", label))?;

        variants.push(EncodedVariant {
            label: label.to_string(),
            suffix: suffix.to_string(),
            width,
            height,
            data: buffer,
        });
    }
    Ok(variants)
}

/// Generate and store resized renditions of a stored image.
///
/// Returns the processing summary on success. Callers treat errors as
/// non-fatal for the upload: the original is already stored and valid.
pub async fn process_image(
    storage: Arc<dyn Storage>,
    target: &StorageTarget,
    stored_filename: &str,
    data: &[u8],
) -> Result<ImageProcessingSummary, anyhow::Error> {
    let start = Instant::now();
    let original_size = data.len() as u64;

    let owned = data.to_vec();
    let encoded = tokio::task::spawn_blocking(move || encode_variants(&owned))
        .await
        .context("variant encoding task failed")??;

    let mut infos = Vec::with_capacity(encoded.len());
    for variant in encoded {
        let key = target.key(&variant_filename(stored_filename, &variant.suffix));
        let file_size = variant.data.len() as u64;
        storage
            .save(&key, variant.data)
            .await
            .with_context(|| format!("failed to store '{}' variant", variant.label))?;
        infos.push(ImageVariantInfo {
            label: variant.label,
            width: variant.width,
            height: variant.height,
            file_size,
        });
    }

    tracing::info!(
        filename = %stored_filename,
        variant_count = infos.len(),
        duration_ms = start.elapsed().as_millis(),
        "Generated image variants"
    );

    Ok(ImageProcessingSummary::new(original_size, infos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use kentcms_storage::LocalStorage;

    fn test_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 128, 255, 255]));
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png).unwrap();
        buffer
    }

    fn target() -> StorageTarget {
        StorageTarget {
            folder: "haberler".to_string(),
            used_custom_folder: false,
        }
    }

    #[test]
    fn variant_filenames_keep_the_stem() {
        assert_eq!(
            variant_filename("park-1712000000000-ab12cd.png", "thumb"),
            "park-1712000000000-ab12cd-thumb.jpg"
        );
        assert_eq!(variant_filename("noext", "md"), "noext-md.jpg");
    }

    #[test]
    fn small_image_gets_thumbnail_only() {
        let data = test_png(100, 80);
        let variants = encode_variants(&data).unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].label, "thumb");
        // A 100x80 original fits inside the 150px box untouched
        assert_eq!((variants[0].width, variants[0].height), (100, 80));
    }

    #[test]
    fn large_image_gets_all_variants_bounded() {
        let data = test_png(2000, 1000);
        let variants = encode_variants(&data).unwrap();
        assert_eq!(variants.len(), 3);
        for variant in &variants {
            let spec = VARIANT_SPECS
                .iter()
                .find(|(label, _, _)| *label == variant.label)
                .unwrap();
            assert!(variant.width.max(variant.height) <= spec.2);
            assert!(!variant.data.is_empty());
        }
    }

    #[test]
    fn undecodable_bytes_error_out() {
        assert!(encode_variants(b"definitely not an image").is_err());
    }

    #[tokio::test]
    async fn variants_are_written_to_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost/media".to_string())
                .await
                .unwrap(),
        );
        let data = test_png(800, 600);

        let summary = process_image(storage.clone(), &target(), "park-1-ab.png", &data)
            .await
            .unwrap();

        // 800px wide: thumb and medium resize, large is skipped
        assert_eq!(summary.variants.len(), 2);
        assert_eq!(summary.original.file_size, data.len() as u64);
        assert!(storage.exists("haberler/park-1-ab-thumb.jpg").await.unwrap());
        assert!(storage.exists("haberler/park-1-ab-md.jpg").await.unwrap());
        assert!(!storage.exists("haberler/park-1-ab-lg.jpg").await.unwrap());
    }
}
