//! Document-level types.

use super::{PageSize, Paragraph, SectionProperties, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The main story of a word-processing document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Body content in reading order
    pub body: Vec<Block>,

    /// Properties of the final section
    pub section: SectionProperties,

    /// Paragraph and character style names by style id
    pub style_names: BTreeMap<String, String>,

    /// Attributes of the root element (namespace declarations)
    pub root_attributes: Vec<(String, String)>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a paragraph to the body.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.body.push(Block::Paragraph(paragraph));
    }

    /// Add a table to the body.
    pub fn add_table(&mut self, table: Table) {
        self.body.push(Block::Table(table));
    }

    /// Iterate over body-level paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterate over body-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|block| match block {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Get the number of body-level paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Get the number of body-level tables.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Look up the display name of a style id.
    pub fn style_name(&self, style_id: &str) -> Option<&str> {
        self.style_names.get(style_id).map(String::as_str)
    }

    /// Every section in the document: paragraph-level section breaks in
    /// order, then the final section.
    pub fn sections_mut(&mut self) -> Vec<&mut SectionProperties> {
        let mut sections: Vec<&mut SectionProperties> = self
            .body
            .iter_mut()
            .filter_map(|block| match block {
                Block::Paragraph(p) => p.format.section.as_deref_mut(),
                _ => None,
            })
            .collect();
        sections.push(&mut self.section);
        sections
    }

    /// Page size of the final section.
    pub fn page_size(&self) -> Option<PageSize> {
        self.section.page_size
    }

    /// Check if the document has no body content.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p.plain_text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Raw(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A body-level content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// Markup the model does not interpret (content controls, bookmarks), kept verbatim
    Raw(super::RawXml),
}

impl Block {
    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Get the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }
}

/// Document metadata from the core properties part.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub creator: Option<String>,

    /// Document language tag (e.g., "en-GB")
    pub language: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

impl Metadata {
    /// Create metadata for a new document titled `title`, stamped now.
    pub fn for_new_document(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            title: Some(title.into()),
            created: Some(now),
            modified: Some(now),
            ..Default::default()
        }
    }
}
