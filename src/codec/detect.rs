//! Format detection
//!
//! `.csv` and `.xlsx` are decided by extension alone. `.txt` files are
//! sniffed: a file with a "Shopping List" banner line and a dashed separator
//! line is the legacy dialect, anything else is the standard dialect.

use std::path::Path;

use super::plain_text::{is_separator_line, BANNER};
use super::FormatKind;

/// Classify a file from its name and (a sample of) its content
///
/// Returns `None` for unknown extensions; callers skip such files.
pub fn detect(file_name: &str, content_sample: &[u8]) -> Option<FormatKind> {
    match extension_of(Path::new(file_name)).as_deref() {
        Some("csv") => Some(FormatKind::Csv),
        Some("xlsx") => Some(FormatKind::Spreadsheet),
        Some("txt") => Some(sniff_text(content_sample)),
        _ => None,
    }
}

/// [`detect`] for a path, using its file name
pub fn detect_path(path: &Path, content_sample: &[u8]) -> Option<FormatKind> {
    let file_name = path.file_name()?.to_str()?;
    detect(file_name, content_sample)
}

/// Lower-cased extension of a path
pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn sniff_text(content: &[u8]) -> FormatKind {
    let text = String::from_utf8_lossy(content);

    let mut has_banner = false;
    let mut has_separator = false;
    for line in text.lines() {
        has_banner |= line.contains(BANNER);
        has_separator |= is_separator_line(line);
        if has_banner && has_separator {
            return FormatKind::PlainTextLegacy;
        }
    }

    FormatKind::PlainTextStandard
}
