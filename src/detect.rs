//! Source format detection.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Kind of manuscript source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Office Open XML word-processing package
    Docx,
    /// LaTeX source
    Latex,
    /// Markdown source
    Markdown,
}

/// Markup extensions: LaTeX first, then Markdown.
const MARKUP_EXTENSIONS: &[&str] = &["tex", "latex", "ltx", "md", "markdown"];

impl SourceFormat {
    /// File extensions for this format, lowercase without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SourceFormat::Docx => &["docx"],
            SourceFormat::Latex => &MARKUP_EXTENSIONS[..3],
            SourceFormat::Markdown => &MARKUP_EXTENSIONS[3..],
        }
    }

    /// Extensions of every markup format (LaTeX and Markdown).
    pub fn markup_extensions() -> &'static [&'static str] {
        MARKUP_EXTENSIONS
    }

    /// Look up a format by file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        [SourceFormat::Docx, SourceFormat::Latex, SourceFormat::Markdown]
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SourceFormat::Docx => "DOCX",
            SourceFormat::Latex => "LaTeX",
            SourceFormat::Markdown => "Markdown",
        })
    }
}

/// ZIP local file header signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Bytes read from the start of a file for sniffing.
const SNIFF_LEN: u64 = 8192;

const LATEX_MARKERS: &[&str] = &["\\documentclass", "\\begin{document}", "\\section{"];

/// Detect the format of a source file.
///
/// The extension decides when it is known; a `.docx` must also carry the
/// ZIP signature. Files with other extensions are sniffed.
///
/// # Example
/// ```no_run
/// use paperdoc::detect::{detect_format_from_path, SourceFormat};
///
/// let format = detect_format_from_path("paper.tex").unwrap();
/// assert_eq!(format, SourceFormat::Latex);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::InputNotFound(path.to_path_buf()));
    }

    let mut head = Vec::new();
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(SourceFormat::from_extension);

    match by_extension {
        Some(SourceFormat::Docx) if !is_zip(&head) => Err(Error::UnsupportedFormat(format!(
            "{} has a .docx extension but is not a ZIP package",
            path.display()
        ))),
        Some(format) => Ok(format),
        None => detect_format_from_bytes(&head),
    }
}

/// Detect the format from the first bytes of a file.
///
/// Returns `Err(Error::UnsupportedFormat)` when the content matches no
/// known format. Markdown has no signature and is only recognized by
/// extension.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<SourceFormat> {
    if is_zip(data) {
        return Ok(SourceFormat::Docx);
    }

    let text = String::from_utf8_lossy(data);
    if LATEX_MARKERS.iter().any(|m| text.contains(m)) {
        return Ok(SourceFormat::Latex);
    }

    Err(Error::UnsupportedFormat(
        "content is neither a .docx package nor LaTeX source".to_string(),
    ))
}

/// Check if data starts with a ZIP signature.
pub fn is_zip(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}
