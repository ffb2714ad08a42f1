//! Storage target resolution: category or custom folder to a folder key.
//!
//! A custom folder always wins over category-based resolution. When neither
//! is supplied, a legacy origin hint may still resolve through
//! [`LEGACY_FOLDER_OVERRIDES`] before the request is rejected.

/// Known legacy callers that upload without a custom folder but expect their
/// files under a fixed folder, keyed by a path segment of the request's
/// Referer. This is a compatibility shim kept as an explicit table so entries
/// can be audited and retired; do not extend it for new callers.
pub const LEGACY_FOLDER_OVERRIDES: &[(&str, &str)] = &[("hafriyat", "hafriyat")];

/// Resolved upload destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTarget {
    /// Folder key relative to the storage root (single sanitized segment).
    pub folder: String,
    /// True for caller-supplied custom folders and legacy overrides; these
    /// uploads skip image variant processing and category linkage.
    pub used_custom_folder: bool,
}

impl StorageTarget {
    /// Storage key for a filename inside this target.
    pub fn key(&self, filename: &str) -> String {
        format!("{}/{}", self.folder, filename)
    }
}

/// Slugify a category name into a storage folder segment. Transliterates
/// Turkish characters so "Hafriyat Sahaları" becomes "hafriyat-sahalari".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        let mapped = match c {
            'ç' | 'Ç' => Some('c'),
            'ğ' | 'Ğ' => Some('g'),
            'ı' | 'İ' => Some('i'),
            'ö' | 'Ö' => Some('o'),
            'ş' | 'Ş' => Some('s'),
            'ü' | 'Ü' => Some('u'),
            c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
            _ => None,
        };
        match mapped {
            Some(c) => {
                slug.push(c);
                last_dash = false;
            }
            None if !last_dash => {
                slug.push('-');
                last_dash = true;
            }
            None => {}
        }
    }
    slug.trim_matches('-').to_string()
}

/// Maps a (category, custom folder, origin hint) triple to a storage folder.
#[derive(Debug, Clone, Default)]
pub struct StorageResolver;

impl StorageResolver {
    pub fn new() -> Self {
        StorageResolver
    }

    /// Resolve the destination folder for an upload.
    ///
    /// Precedence: caller-supplied custom folder, then a legacy override
    /// matched from `origin_hint`, then the slugified category name. Returns
    /// `None` when nothing resolves; the caller rejects the request.
    pub fn resolve(
        &self,
        category_name: Option<&str>,
        custom_folder: Option<&str>,
        origin_hint: Option<&str>,
    ) -> Option<StorageTarget> {
        if let Some(folder) = custom_folder.map(slugify).filter(|f| !f.is_empty()) {
            return Some(StorageTarget {
                folder,
                used_custom_folder: true,
            });
        }

        if let Some(folder) = origin_hint.and_then(Self::legacy_override) {
            tracing::warn!(
                folder = %folder,
                "Upload resolved through legacy folder override"
            );
            return Some(StorageTarget {
                folder: folder.to_string(),
                used_custom_folder: true,
            });
        }

        category_name
            .map(slugify)
            .filter(|f| !f.is_empty())
            .map(|folder| StorageTarget {
                folder,
                used_custom_folder: false,
            })
    }

    /// Match an origin hint (Referer URL or path) against the override table.
    /// Only whole path segments match, so "/hafriyat/basvuru" hits and
    /// "/hafriyatci-firmalar" does not.
    fn legacy_override(origin_hint: &str) -> Option<&'static str> {
        let path = origin_hint
            .split("://")
            .nth(1)
            .and_then(|rest| rest.find('/').map(|i| &rest[i..]))
            .unwrap_or(origin_hint);
        let segments: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or(path)
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        LEGACY_FOLDER_OVERRIDES
            .iter()
            .find(|(hint, _)| segments.contains(hint))
            .map(|(_, folder)| *folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_transliterates_turkish() {
        assert_eq!(slugify("Hafriyat Sahaları"), "hafriyat-sahalari");
        assert_eq!(slugify("Çevre Düzenleme"), "cevre-duzenleme");
        assert_eq!(slugify("Haberler"), "haberler");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  a -- b  "), "a-b");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn custom_folder_takes_precedence() {
        let resolver = StorageResolver::new();
        let target = resolver
            .resolve(Some("Haberler"), Some("Basın Odası"), None)
            .unwrap();
        assert_eq!(target.folder, "basin-odasi");
        assert!(target.used_custom_folder);
    }

    #[test]
    fn category_resolves_when_no_custom_folder() {
        let resolver = StorageResolver::new();
        let target = resolver.resolve(Some("Meclis Kararları"), None, None).unwrap();
        assert_eq!(target.folder, "meclis-kararlari");
        assert!(!target.used_custom_folder);
    }

    #[test]
    fn legacy_override_matches_whole_segment() {
        let resolver = StorageResolver::new();

        let target = resolver
            .resolve(None, None, Some("https://example.gov.tr/hafriyat/basvuru"))
            .unwrap();
        assert_eq!(target.folder, "hafriyat");
        assert!(target.used_custom_folder);

        assert!(resolver
            .resolve(None, None, Some("https://example.gov.tr/hafriyatci-firmalar"))
            .is_none());
    }

    #[test]
    fn explicit_folder_beats_legacy_override() {
        let resolver = StorageResolver::new();
        let target = resolver
            .resolve(None, Some("galeri"), Some("https://example.gov.tr/hafriyat"))
            .unwrap();
        assert_eq!(target.folder, "galeri");
    }

    #[test]
    fn nothing_resolvable_returns_none() {
        let resolver = StorageResolver::new();
        assert!(resolver.resolve(None, None, None).is_none());
        assert!(resolver.resolve(None, Some("!!!"), None).is_none());
    }

    #[test]
    fn target_key_joins_folder_and_filename() {
        let target = StorageTarget {
            folder: "haberler".to_string(),
            used_custom_folder: false,
        };
        assert_eq!(target.key("a.jpg"), "haberler/a.jpg");
    }
}
