//! Paragraph and run-level types.

use super::{Length, RawXml, SectionProperties};
use serde::{Deserialize, Serialize};

/// Structural role of a paragraph, assigned by classification before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Manuscript title
    Title,
    /// Top-level section heading
    Heading1,
    /// Subsection heading
    Heading2,
    /// Sub-subsection heading
    Heading3,
    /// Caption placed directly above a table
    TableCaption,
    /// Ordinary body text
    Body,
}

impl ElementKind {
    /// Paragraph style id conventionally used for this role.
    pub fn style_id(self) -> Option<&'static str> {
        match self {
            ElementKind::Title => Some("Title"),
            ElementKind::Heading1 => Some("Heading1"),
            ElementKind::Heading2 => Some("Heading2"),
            ElementKind::Heading3 => Some("Heading3"),
            ElementKind::TableCaption => Some("Caption"),
            ElementKind::Body => None,
        }
    }

    /// Heading level (1-3) or None.
    pub fn heading_level(self) -> Option<u8> {
        match self {
            ElementKind::Heading1 => Some(1),
            ElementKind::Heading2 => Some(2),
            ElementKind::Heading3 => Some(3),
            _ => None,
        }
    }

    /// Check if this is the title or a heading.
    pub fn is_display(self) -> bool {
        matches!(
            self,
            ElementKind::Title
                | ElementKind::Heading1
                | ElementKind::Heading2
                | ElementKind::Heading3
        )
    }
}

/// A paragraph (`w:p`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Attributes of the `w:p` element (revision ids and the like)
    pub attributes: Vec<(String, String)>,

    /// Paragraph style id (`w:pStyle`)
    pub style_id: Option<String>,

    /// Paragraph formatting
    pub format: ParagraphFormat,

    /// Runs, hyperlinks, and preserved inline markup
    pub items: Vec<ParagraphItem>,

    /// Structural role, set by classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementKind>,
}

impl Paragraph {
    /// Create a new empty paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::new();
        p.add_text(text);
        p
    }

    /// Create a paragraph with a style id.
    pub fn styled(text: impl Into<String>, style_id: impl Into<String>) -> Self {
        let mut p = Self::with_text(text);
        p.style_id = Some(style_id.into());
        p
    }

    /// Add plain text as a new run. Newlines become line breaks.
    pub fn add_text(&mut self, text: impl Into<String>) {
        self.items.push(ParagraphItem::Run(Run::new(text)));
    }

    /// Add a run.
    pub fn add_run(&mut self, run: Run) {
        self.items.push(ParagraphItem::Run(run));
    }

    /// Iterate over all runs, including those inside hyperlinks.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.items.iter().flat_map(ParagraphItem::runs)
    }

    /// Iterate mutably over all runs, including those inside hyperlinks.
    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.items.iter_mut().flat_map(ParagraphItem::runs_mut)
    }

    /// Get plain text content of the paragraph.
    pub fn plain_text(&self) -> String {
        self.runs().map(Run::plain_text).collect()
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.plain_text().trim().is_empty()
    }

    /// Check if every run carrying text is bold.
    pub fn is_all_bold(&self) -> bool {
        let mut seen = false;
        for run in self.runs().filter(|r| !r.plain_text().trim().is_empty()) {
            if run.properties.bold != Some(true) {
                return false;
            }
            seen = true;
        }
        seen
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParagraphItem {
    /// A run of text
    Run(Run),

    /// A hyperlink wrapping runs
    Hyperlink {
        /// Attributes of the `w:hyperlink` element
        attributes: Vec<(String, String)>,
        /// Runs inside the link
        runs: Vec<Run>,
    },

    /// Inline markup kept verbatim (bookmarks, fields, revisions)
    Raw(RawXml),
}

impl ParagraphItem {
    /// Runs held by this item.
    pub fn runs(&self) -> &[Run] {
        match self {
            ParagraphItem::Run(run) => std::slice::from_ref(run),
            ParagraphItem::Hyperlink { runs, .. } => runs,
            ParagraphItem::Raw(_) => &[],
        }
    }

    /// Runs held by this item, mutably.
    pub fn runs_mut(&mut self) -> &mut [Run] {
        match self {
            ParagraphItem::Run(run) => std::slice::from_mut(run),
            ParagraphItem::Hyperlink { runs, .. } => runs,
            ParagraphItem::Raw(_) => &mut [],
        }
    }
}

/// Paragraph formatting (`w:pPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphFormat {
    /// Horizontal alignment (`w:jc`)
    pub alignment: Option<Alignment>,

    /// Space before the paragraph
    pub space_before: Option<Length>,

    /// Space after the paragraph
    pub space_after: Option<Length>,

    /// Line spacing
    pub line_spacing: Option<LineSpacing>,

    /// Section break carried by this paragraph
    pub section: Option<Box<SectionProperties>>,

    /// Other paragraph properties, kept verbatim
    pub extra: Vec<RawXml>,
}

/// Line spacing rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum LineSpacing {
    /// Multiple of single spacing (1.0 = single, 2.0 = double)
    Multiple(f32),
    /// Exact line height
    Exact(Length),
    /// Minimum line height
    AtLeast(Length),
}

/// Text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified alignment
    Justify,
}

impl Alignment {
    /// Value of `w:jc/@w:val`.
    pub fn as_ooxml(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }

    /// Parse a `w:jc/@w:val` value.
    pub fn from_ooxml(value: &str) -> Option<Self> {
        match value {
            "left" | "start" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" | "end" => Some(Alignment::Right),
            "both" | "distribute" => Some(Alignment::Justify),
            _ => None,
        }
    }
}

/// A run of text with consistent formatting (`w:r`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Attributes of the `w:r` element
    pub attributes: Vec<(String, String)>,

    /// Run formatting
    pub properties: RunProperties,

    /// Run content
    pub content: Vec<RunContent>,
}

impl Run {
    /// Create a run from text. Newlines become line breaks.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut content = Vec::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                content.push(RunContent::Break(BreakKind::Line));
            }
            if !line.is_empty() {
                content.push(RunContent::Text(line.to_string()));
            }
        }
        Self {
            attributes: Vec::new(),
            properties: RunProperties::default(),
            content,
        }
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        let mut run = Self::new(text);
        run.properties.bold = Some(true);
        run
    }

    /// Get plain text of the run. Tabs and line breaks map to `\t` and `\n`.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                RunContent::Text(t) => t.as_str(),
                RunContent::Tab => "\t",
                RunContent::Break(_) => "\n",
                RunContent::Raw(_) => "",
            })
            .collect()
    }
}

/// Content of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RunContent {
    /// Literal text (`w:t`)
    Text(String),
    /// Tab character (`w:tab`)
    Tab,
    /// Break (`w:br`)
    Break(BreakKind),
    /// Drawings, field characters, and other markup kept verbatim
    Raw(RawXml),
}

/// Kind of break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// Line break
    #[default]
    Line,
    /// Page break
    Page,
    /// Column break
    Column,
}

/// Run font assignment (`w:rFonts`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFonts {
    /// Font for ASCII characters
    pub ascii: Option<String>,
    /// Font for high ANSI characters
    pub high_ansi: Option<String>,
    /// Font for East Asian characters
    pub east_asia: Option<String>,
    /// Font for complex scripts
    pub complex: Option<String>,
    /// Remaining attributes (theme font references, `w:hint`)
    pub other: Vec<(String, String)>,
}

impl RunFonts {
    /// The same font for every script.
    pub fn uniform(font: &str) -> Self {
        Self {
            ascii: Some(font.to_string()),
            high_ansi: Some(font.to_string()),
            east_asia: Some(font.to_string()),
            complex: Some(font.to_string()),
            other: Vec::new(),
        }
    }

    /// The font applied to Latin text.
    pub fn latin(&self) -> Option<&str> {
        self.ascii.as_deref().or(self.high_ansi.as_deref())
    }
}

/// Run language (`w:lang`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLanguage {
    /// Language of Latin text
    pub latin: Option<String>,
    /// Language of East Asian text
    pub east_asia: Option<String>,
    /// Language of complex-script text
    pub bidi: Option<String>,
}

/// Run formatting (`w:rPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    /// Character style id
    pub style_id: Option<String>,

    /// Fonts
    pub fonts: Option<RunFonts>,

    /// Font size in points
    pub size: Option<f32>,

    /// Bold
    pub bold: Option<bool>,

    /// Italic
    pub italic: Option<bool>,

    /// Underline style (`single`, `none`, ...)
    pub underline: Option<String>,

    /// Text color as six hex digits (`000000`) or `auto`
    pub color: Option<String>,

    /// Proofing language
    pub language: Option<RunLanguage>,

    /// Other run properties, kept verbatim
    pub extra: Vec<RawXml>,
}

impl RunProperties {
    /// The Latin font, if set directly on the run.
    pub fn font_name(&self) -> Option<&str> {
        self.fonts.as_ref().and_then(RunFonts::latin)
    }
}
