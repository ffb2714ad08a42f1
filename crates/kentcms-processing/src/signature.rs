//! Post-save content-signature verification.
//!
//! Phase 2 of file validation: the file is re-checked as stored, from its
//! actual bytes, to catch spoofed declared types (e.g. an executable renamed
//! to `.jpg`). The MIME type is re-derived from the content signature and
//! must be compatible with the stored extension.

/// Sniff a MIME type from leading magic bytes. Returns `None` when no known
/// signature matches (which includes plain text).
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if data.starts_with(b"RIFF") && data.len() >= 12 {
        if &data[8..12] == b"WEBP" {
            return Some("image/webp");
        }
        if &data[8..11] == b"AVI" {
            return Some("video/x-msvideo");
        }
    }
    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }
    if data.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    if data.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
        return Some("application/zip");
    }
    if data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]) {
        return Some("application/x-ole-storage");
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return Some("video/webm");
    }
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return Some("video/mp4");
    }
    // Executables, sniffed explicitly so rejections name the real content.
    if data.starts_with(b"MZ") {
        return Some("application/x-msdownload");
    }
    if data.starts_with(&[0x7F, 0x45, 0x4C, 0x46]) {
        return Some("application/x-executable");
    }

    None
}

/// Sniffed MIME types acceptable for a stored extension. DOCX is a ZIP
/// container and DOC an OLE container at the byte level.
fn acceptable_signatures(extension: &str) -> Option<&'static [&'static str]> {
    let expected: &'static [&'static str] = match extension {
        "jpg" | "jpeg" => &["image/jpeg"],
        "png" => &["image/png"],
        "gif" => &["image/gif"],
        "webp" => &["image/webp"],
        "bmp" => &["image/bmp"],
        "mp4" | "m4v" | "mov" => &["video/mp4"],
        "webm" | "mkv" => &["video/webm"],
        "avi" => &["video/x-msvideo"],
        "pdf" => &["application/pdf"],
        "docx" => &["application/zip"],
        "doc" => &["application/x-ole-storage"],
        _ => return None,
    };
    Some(expected)
}

/// Verify a stored file's content against its filename. Returns the violated
/// rule on failure; the caller is responsible for deleting the file.
pub fn verify_content(data: &[u8], filename: &str) -> Result<(), String> {
    if data.is_empty() {
        return Err("Stored file is empty or truncated".to_string());
    }

    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let sniffed = sniff_mime(data);

    match acceptable_signatures(&extension) {
        Some(expected) => match sniffed {
            Some(mime) if expected.contains(&mime) => Ok(()),
            Some(mime) => Err(format!(
                "File content is '{}' which does not match extension '.{}'",
                mime, extension
            )),
            None => Err(format!(
                "File content has no recognizable '{}' signature",
                extension
            )),
        },
        None => {
            // Extensions without a byte signature (txt, svg): must not carry
            // a known binary signature and must decode as UTF-8 text.
            if let Some(mime) = sniffed {
                return Err(format!(
                    "File content is '{}' which does not match extension '.{}'",
                    mime, extension
                ));
            }
            std::str::from_utf8(data)
                .map(|_| ())
                .map_err(|_| "File content is not valid text".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_common_signatures() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(
            sniff_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            Some("image/png")
        );
        assert_eq!(sniff_mime(b"%PDF-1.7 rest"), Some("application/pdf"));
        assert_eq!(sniff_mime(b"RIFF\x10\x00\x00\x00WEBPVP8 "), Some("image/webp"));
        assert_eq!(
            sniff_mime(b"\x00\x00\x00\x18ftypisom"),
            Some("video/mp4")
        );
        assert_eq!(sniff_mime(b"hello world"), None);
    }

    #[test]
    fn executable_renamed_to_jpg_is_rejected() {
        let exe = b"MZ\x90\x00\x03\x00\x00\x00";
        let err = verify_content(exe, "photo.jpg").unwrap_err();
        assert!(err.contains("application/x-msdownload"), "got: {}", err);
    }

    #[test]
    fn junk_bytes_with_image_extension_rejected() {
        let err = verify_content(b"not an image at all", "photo.png").unwrap_err();
        assert!(err.contains("no recognizable"), "got: {}", err);
    }

    #[test]
    fn matching_signature_passes() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10];
        assert!(verify_content(&jpeg, "photo.jpeg").is_ok());
    }

    #[test]
    fn docx_is_a_zip_container() {
        let zip = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(verify_content(&zip, "karar.docx").is_ok());
        assert!(verify_content(&zip, "karar.doc").is_err());
    }

    #[test]
    fn empty_stored_file_rejected() {
        assert!(verify_content(&[], "photo.jpg").is_err());
    }

    #[test]
    fn plain_text_accepted_binary_text_rejected() {
        assert!(verify_content(b"duyuru metni", "duyuru.txt").is_ok());
        assert!(verify_content(&[0xFF, 0xFE, 0x00, 0x01], "duyuru.txt").is_err());
        // A PE renamed to .txt is named as such
        let err = verify_content(b"MZ\x90\x00binary", "duyuru.txt").unwrap_err();
        assert!(err.contains("application/x-msdownload"));
    }
}
