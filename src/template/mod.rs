//! Journal templates: the formatting rules a manuscript is held to.
//!
//! A [`TemplateConfig`] is an immutable record looked up by name from a
//! [`TemplateRegistry`]. The registry ships with built-in journal templates
//! and can be extended from a JSON file.

mod builtin;
mod registry;

pub use registry::TemplateRegistry;

use crate::error::{Error, Result};
use crate::model::{ElementKind, Length, PaperSize};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest font size WordprocessingML can express, in points.
pub const MAX_FONT_SIZE: f32 = 1638.0;

/// Largest accepted line spacing multiplier.
pub const MAX_LINE_SPACING: f32 = 10.0;

/// Formatting rules for one journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Lookup key (lowercase)
    pub key: String,

    /// Human-readable journal name
    pub name: String,

    /// Font family for all text
    pub font: String,

    /// Body font size in points
    pub font_size: f32,

    /// Title size in points; base + 4 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_size: Option<f32>,

    /// Heading 1 size in points; base + 2 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading1_size: Option<f32>,

    /// Heading 2 size in points; base when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading2_size: Option<f32>,

    /// Heading 3 size in points; base when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading3_size: Option<f32>,

    /// Line spacing multiplier
    pub line_spacing: f32,

    /// Page margins
    #[serde(default)]
    pub margins: Margins,

    /// Paper size
    #[serde(default)]
    pub paper_size: PaperSize,

    /// Proofing language
    #[serde(default)]
    pub language: Locale,

    /// Citation style family
    #[serde(default)]
    pub citation_style: CitationStyle,

    /// CSL style used by the converter for citations
    #[serde(default = "default_csl")]
    pub csl_style: String,

    /// Section headings for new manuscripts, in order
    #[serde(default)]
    pub sections: Vec<String>,
}

fn default_csl() -> String {
    "https://www.zotero.org/styles/apa".to_string()
}

impl TemplateConfig {
    /// Title size in points.
    pub fn title_size(&self) -> f32 {
        self.title_size.unwrap_or(self.font_size + 4.0)
    }

    /// Heading 1 size in points.
    pub fn heading1_size(&self) -> f32 {
        self.heading1_size.unwrap_or(self.font_size + 2.0)
    }

    /// Heading 2 size in points.
    pub fn heading2_size(&self) -> f32 {
        self.heading2_size.unwrap_or(self.font_size)
    }

    /// Heading 3 size in points.
    pub fn heading3_size(&self) -> f32 {
        self.heading3_size.unwrap_or(self.font_size)
    }

    /// Font size for a paragraph of the given kind.
    pub fn size_for(&self, kind: ElementKind) -> f32 {
        match kind {
            ElementKind::Title => self.title_size(),
            ElementKind::Heading1 => self.heading1_size(),
            ElementKind::Heading2 => self.heading2_size(),
            ElementKind::Heading3 => self.heading3_size(),
            ElementKind::TableCaption | ElementKind::Body => self.font_size,
        }
    }

    /// Page width and height.
    pub fn page_dimensions(&self) -> (Length, Length) {
        self.paper_size.dimensions()
    }

    /// Check that every value is physically meaningful.
    pub fn validate(&self) -> Result<()> {
        if self.font.trim().is_empty() {
            return Err(self.invalid("font name is empty"));
        }

        let sizes = [
            ("font_size", self.font_size),
            ("title_size", self.title_size()),
            ("heading1_size", self.heading1_size()),
            ("heading2_size", self.heading2_size()),
            ("heading3_size", self.heading3_size()),
        ];
        for (field, size) in sizes {
            if !(size.is_finite() && size > 0.0 && size <= MAX_FONT_SIZE) {
                return Err(self.invalid(format!(
                    "{} must be in (0, {}] pt, got {}",
                    field, MAX_FONT_SIZE, size
                )));
            }
        }

        if !(self.line_spacing.is_finite()
            && self.line_spacing > 0.0
            && self.line_spacing <= MAX_LINE_SPACING)
        {
            return Err(self.invalid(format!(
                "line_spacing must be in (0, {}], got {}",
                MAX_LINE_SPACING, self.line_spacing
            )));
        }

        let m = &self.margins;
        for (edge, value) in [
            ("top", m.top),
            ("right", m.right),
            ("bottom", m.bottom),
            ("left", m.left),
        ] {
            if value.is_negative() {
                return Err(self.invalid(format!("{} margin is negative ({})", edge, value)));
            }
        }

        let (width, height) = self.page_dimensions();
        if m.left + m.right >= width || m.top + m.bottom >= height {
            return Err(self.invalid(format!(
                "margins leave no text area on {} paper",
                self.paper_size
            )));
        }

        Ok(())
    }

    fn invalid(&self, reason: impl fmt::Display) -> Error {
        Error::InvalidConfig(format!("template '{}': {}", self.key, reason))
    }
}

/// Page margins for a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    /// Top margin
    pub top: Length,
    /// Right margin
    pub right: Length,
    /// Bottom margin
    pub bottom: Length,
    /// Left margin
    pub left: Length,
}

impl Margins {
    /// The same margin on all four edges.
    pub fn uniform(length: Length) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }

    /// Check if all four edges match.
    pub fn is_uniform(&self) -> bool {
        self.top == self.right && self.right == self.bottom && self.bottom == self.left
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(Length::from_inches(1.0))
    }
}

impl fmt::Display for Margins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            write!(f, "{}", self.top)
        } else {
            write!(
                f,
                "{} {} {} {}",
                self.top, self.right, self.bottom, self.left
            )
        }
    }
}

/// Proofing language locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    /// US English
    #[serde(rename = "en-US")]
    EnUs,
    /// UK English
    #[default]
    #[serde(rename = "en-GB")]
    EnGb,
}

impl Locale {
    /// BCP 47 language tag.
    pub fn tag(self) -> &'static str {
        match self {
            Locale::EnUs => "en-US",
            Locale::EnGb => "en-GB",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Citation style family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CitationStyle {
    /// Author-year citations, e.g. (Smith, 2020)
    #[default]
    AuthorYear,
    /// Numbered citations, e.g. [1]
    Numbered,
}

impl fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CitationStyle::AuthorYear => "author-year",
            CitationStyle::Numbered => "numbered",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TemplateConfig {
        TemplateRegistry::builtin().default_config().clone()
    }

    #[test]
    fn test_heading_offsets_when_sizes_omitted() {
        let mut config = sample();
        config.font_size = 10.0;
        config.title_size = None;
        config.heading1_size = None;
        config.heading2_size = None;
        config.heading3_size = None;

        assert_eq!(config.size_for(ElementKind::Title), 14.0);
        assert_eq!(config.size_for(ElementKind::Heading1), 12.0);
        assert_eq!(config.size_for(ElementKind::Heading2), 10.0);
        assert_eq!(config.size_for(ElementKind::Body), 10.0);
    }

    #[test]
    fn test_validate_rejects_zero_font_size() {
        let mut config = sample();
        config.font_size = 0.0;
        config.title_size = Some(16.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(err.to_string().contains("font_size"));
    }

    #[test]
    fn test_validate_rejects_negative_spacing_and_margins() {
        let mut config = sample();
        config.line_spacing = -1.0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.margins.left = Length::from_inches(-0.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_margins_wider_than_page() {
        let mut config = sample();
        config.margins = Margins::uniform(Length::from_inches(5.0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_margins() {
        let mut config = sample();
        config.margins.left = Length::from_emu(i64::MAX);
        config.margins.right = Length::from_emu(i64::MAX);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no text area"));
    }

    #[test]
    fn test_template_json_rejects_out_of_range_margins() {
        let json = r#"{
            "key": "huge",
            "name": "Huge",
            "font": "Arial",
            "font_size": 12,
            "line_spacing": 1,
            "margins": {"top": "1in", "right": "1in", "bottom": "1in", "left": "100000000000000in"}
        }"#;
        let err = serde_json::from_str::<TemplateConfig>(json).unwrap_err();
        assert!(err.to_string().contains("largest page dimension"), "{}", err);
    }

    #[test]
    fn test_template_json_uses_units() {
        let json = r#"{
            "key": "thesis",
            "name": "University Thesis",
            "font": "Georgia",
            "font_size": 11,
            "line_spacing": 1.5,
            "margins": {"top": "25mm", "right": "25mm", "bottom": "25mm", "left": "40mm"},
            "paper_size": "a4",
            "language": "en-US",
            "citation_style": "numbered"
        }"#;
        let config: TemplateConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.margins.left, Length::from_mm(40.0));
        assert_eq!(config.language, Locale::EnUs);
        assert_eq!(config.citation_style, CitationStyle::Numbered);
        assert_eq!(config.title_size(), 15.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_margins_display() {
        assert_eq!(Margins::default().to_string(), "1in");
    }
}
