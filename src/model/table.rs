//! Table types.

use super::{Block, Paragraph, RawXml};
use serde::{Deserialize, Serialize};

/// A table (`w:tbl`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table properties
    pub properties: TableProperties,

    /// Column grid (`w:tblGrid`), kept verbatim
    pub grid: Option<RawXml>,

    /// Table rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from rows of plain-text cells.
    pub fn from_text<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|cells| TableRow {
                properties: Vec::new(),
                cells: cells.into_iter().map(TableCell::with_text).collect(),
            })
            .collect();
        Self {
            rows,
            ..Default::default()
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate over every paragraph directly inside the table's cells.
    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.rows
            .iter_mut()
            .flat_map(|row| row.cells.iter_mut())
            .flat_map(|cell| cell.blocks.iter_mut())
            .filter_map(|block| match block {
                Block::Paragraph(p) => Some(p),
                _ => None,
            })
    }

    /// Get plain text of the table, one row per line with tab-separated cells.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(TableCell::plain_text)
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Table properties (`w:tblPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableProperties {
    /// Table style id
    pub style_id: Option<String>,

    /// Table-level borders
    pub borders: Option<BorderSet>,

    /// Other table properties, kept verbatim
    pub extra: Vec<RawXml>,
}

/// A table row (`w:tr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row-level markup (`w:trPr`, `w:tblPrEx`), kept verbatim
    pub properties: Vec<RawXml>,

    /// Cells in the row
    pub cells: Vec<TableCell>,
}

/// A table cell (`w:tc`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell properties
    pub properties: CellProperties,

    /// Cell content; always holds at least one paragraph when written
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create a cell holding one paragraph of text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            properties: CellProperties::default(),
            blocks: vec![Block::Paragraph(Paragraph::with_text(text))],
        }
    }

    /// Get plain text of the cell.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                Block::Table(t) => Some(t.plain_text()),
                Block::Raw(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Cell properties (`w:tcPr`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellProperties {
    /// Cell borders
    pub borders: Option<BorderSet>,

    /// Other cell properties, kept verbatim
    pub extra: Vec<RawXml>,
}

/// Borders on each edge of a table or cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSet {
    /// Top edge
    pub top: Option<Border>,
    /// Left edge
    pub left: Option<Border>,
    /// Bottom edge
    pub bottom: Option<Border>,
    /// Right edge
    pub right: Option<Border>,
    /// Inner horizontal edges
    pub inside_h: Option<Border>,
    /// Inner vertical edges
    pub inside_v: Option<Border>,
}

impl BorderSet {
    /// Every edge explicitly without a border.
    pub fn none() -> Self {
        Self {
            top: Some(Border::none()),
            left: Some(Border::none()),
            bottom: Some(Border::none()),
            right: Some(Border::none()),
            inside_h: Some(Border::none()),
            inside_v: Some(Border::none()),
        }
    }
}

/// A single border line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    /// Line style (`single`, `double`, `none`, ...)
    pub style: String,
    /// Line width in eighths of a point
    pub size: u32,
    /// Line color as six hex digits or `auto`
    pub color: String,
}

impl Border {
    /// No border.
    pub fn none() -> Self {
        Self {
            style: "none".to_string(),
            size: 0,
            color: "auto".to_string(),
        }
    }

    /// Single black rule of the given width in eighths of a point.
    pub fn single(size: u32) -> Self {
        Self {
            style: "single".to_string(),
            size,
            color: "000000".to_string(),
        }
    }

    /// Check if the border draws a line.
    pub fn is_visible(&self) -> bool {
        !matches!(self.style.as_str(), "none" | "nil")
    }
}
