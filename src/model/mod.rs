//! Document model types for word-processing content.
//!
//! The model covers what formatting needs to see and change: paragraphs,
//! runs, tables and section geometry. Everything else in the source markup
//! is carried as [`RawXml`] and written back unchanged.

mod document;
mod paragraph;
mod section;
mod table;
mod units;

pub use document::{Block, Document, Metadata};
pub use paragraph::{
    Alignment, BreakKind, ElementKind, LineSpacing, Paragraph, ParagraphFormat, ParagraphItem,
    Run, RunContent, RunFonts, RunLanguage, RunProperties,
};
pub use section::{PageMargins, PageSize, SectionProperties};
pub use table::{Border, BorderSet, CellProperties, Table, TableCell, TableProperties, TableRow};
pub use units::{Length, PaperSize, EMU_PER_INCH, EMU_PER_MM, EMU_PER_PT, EMU_PER_TWIP};

use serde::{Deserialize, Serialize};

/// A fragment of source markup preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawXml {
    /// Local name of the fragment's root element
    pub name: String,
    /// The fragment, exactly as it appeared in the source
    pub xml: String,
}

impl RawXml {
    /// Create a raw fragment.
    pub fn new(name: impl Into<String>, xml: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            xml: xml.into(),
        }
    }
}
