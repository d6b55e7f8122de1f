//! Section-level page geometry.

use super::{Length, RawXml};
use serde::{Deserialize, Serialize};

/// Page size of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width
    pub width: Length,
    /// Page height
    pub height: Length,
    /// Whether the section is marked landscape
    pub landscape: bool,
}

impl PageSize {
    /// Create a portrait page size.
    pub fn portrait(width: Length, height: Length) -> Self {
        Self {
            width,
            height,
            landscape: false,
        }
    }
}

/// Page margins of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMargins {
    /// Top margin
    pub top: Length,
    /// Right margin
    pub right: Length,
    /// Bottom margin
    pub bottom: Length,
    /// Left margin
    pub left: Length,
    /// Distance from page edge to header
    pub header: Length,
    /// Distance from page edge to footer
    pub footer: Length,
    /// Binding gutter
    pub gutter: Length,
}

impl Default for PageMargins {
    fn default() -> Self {
        let inch = Length::from_inches(1.0);
        let half = Length::from_inches(0.5);
        Self {
            top: inch,
            right: inch,
            bottom: inch,
            left: inch,
            header: half,
            footer: half,
            gutter: Length::ZERO,
        }
    }
}

/// Section properties (`w:sectPr`).
///
/// A document has one final section; paragraphs that end a section carry
/// their own properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Page size (`w:pgSz`)
    pub page_size: Option<PageSize>,

    /// Page margins (`w:pgMar`)
    pub margins: Option<PageMargins>,

    /// Other section settings, kept verbatim
    pub extra: Vec<RawXml>,
}

impl SectionProperties {
    /// Create empty section properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Printable width inside the left and right margins.
    pub fn text_width(&self) -> Option<Length> {
        let size = self.page_size?;
        let margins = self.margins.unwrap_or_default();
        Some(size.width - margins.left - margins.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        let mut section = SectionProperties::new();
        assert_eq!(section.text_width(), None);

        section.page_size = Some(PageSize::portrait(
            Length::from_inches(8.5),
            Length::from_inches(11.0),
        ));
        assert_eq!(section.text_width(), Some(Length::from_inches(6.5)));
    }
}
