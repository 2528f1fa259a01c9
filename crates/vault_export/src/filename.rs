use crate::types::essence;
use crate::{ExportKind, SelectableItem};

const MAX_STEM_CHARS: usize = 120;
const ACCOUNT_ARCHIVE_NAME: &str = "account_data_export.zip";

/// Archive-safe entry name for an item, with an extension inferred from the media
/// type when the display name has none.
pub fn entry_name(item: &SelectableItem) -> String {
    let name = sanitize_name(&item.name);
    if has_extension(&name) {
        return name;
    }
    match extension_for_media_type(&item.media_type) {
        Some(ext) => format!("{name}.{ext}"),
        None => name,
    }
}

/// Canonical extension for the media types the file browser accepts.
pub fn extension_for_media_type(media_type: &str) -> Option<&'static str> {
    let ext = match essence(media_type).as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/heic" => "heic",
        "image/avif" => "avif",
        "application/pdf" | "application/x-pdf" => "pdf",
        "text/plain" => "txt",
        _ => return None,
    };
    Some(ext)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Images,
    Documents,
    Videos,
    Audio,
    Files,
}

impl MediaCategory {
    pub fn of(media_type: &str) -> Self {
        let essence = essence(media_type);
        if essence.starts_with("image/") {
            MediaCategory::Images
        } else if essence == "application/pdf" || essence == "application/x-pdf" {
            MediaCategory::Documents
        } else if essence.starts_with("video/") {
            MediaCategory::Videos
        } else if essence.starts_with("audio/") {
            MediaCategory::Audio
        } else {
            MediaCategory::Files
        }
    }

    fn slug(self) -> &'static str {
        match self {
            MediaCategory::Images => "images",
            MediaCategory::Documents => "documents",
            MediaCategory::Videos => "videos",
            MediaCategory::Audio => "audio",
            MediaCategory::Files => "files",
        }
    }
}

/// Name of the produced archive: type-specific for homogeneous selections,
/// generic for mixed ones, fixed for account data exports.
pub fn archive_filename(items: &[SelectableItem], kind: ExportKind) -> String {
    if kind == ExportKind::AccountData {
        return ACCOUNT_ARCHIVE_NAME.to_string();
    }
    let mut categories = items.iter().map(|item| MediaCategory::of(&item.media_type));
    let category = match categories.next() {
        Some(first) if categories.all(|c| c == first) => first,
        _ => MediaCategory::Files,
    };
    format!("{}_export.zip", category.slug())
}

/// Replaces characters that would make an entry escape its directory or break on
/// common file systems.
pub fn sanitize_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);
    let mut name = if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    };

    let (stem, ext) = split_extension(&name);
    if stem.chars().count() > MAX_STEM_CHARS {
        let truncated: String = stem.chars().take(MAX_STEM_CHARS).collect();
        name = match ext {
            Some(ext) => format!("{truncated}.{ext}"),
            None => truncated,
        };
    }

    let (stem, ext) = split_extension(&name);
    if is_reserved_windows_name(stem) {
        name = match ext {
            Some(ext) => format!("{stem}_.{ext}"),
            None => format!("{stem}_"),
        };
    }
    name
}

/// Splits `photo.final.png` into (`photo.final`, `png`). Only short alphanumeric
/// tails count as an extension.
pub(crate) fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            (stem, Some(ext))
        }
        _ => (name, None),
    }
}

fn has_extension(name: &str) -> bool {
    split_extension(name).1.is_some()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::{sanitize_name, split_extension};

    #[test]
    fn splits_only_plausible_extensions() {
        assert_eq!(split_extension("scan.pdf"), ("scan", Some("pdf")));
        assert_eq!(split_extension("v1.2 draft"), ("v1.2 draft", None));
        assert_eq!(split_extension(".hidden"), (".hidden", None));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
    }

    #[test]
    fn long_stems_are_truncated_keeping_extension() {
        let long = format!("{}.png", "é".repeat(300));
        let cleaned = sanitize_name(&long);
        assert!(cleaned.ends_with(".png"));
        assert_eq!(cleaned.chars().count(), 120 + ".png".len());
    }

    #[test]
    fn reserved_names_are_patched_before_extension() {
        assert_eq!(sanitize_name("con.txt"), "con_.txt");
        assert_eq!(sanitize_name("NUL"), "NUL_");
    }
}
