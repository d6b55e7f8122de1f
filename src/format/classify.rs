//! Paragraph classification.
//!
//! Every body paragraph is tagged with an [`ElementKind`] before any
//! formatting is applied. Paragraph styles decide first; the heuristics
//! only look at paragraphs whose style says nothing about their role.

use crate::model::{Block, Document, ElementKind, Paragraph};
use regex::Regex;

/// Longest run of words still treated as a heading.
const MAX_HEADING_WORDS: usize = 12;
/// Longest text still treated as a heading.
const MAX_HEADING_CHARS: usize = 120;

/// Compiled text patterns used by classification and caption handling.
#[derive(Debug, Clone)]
pub(crate) struct Patterns {
    /// A leading table label such as "Table 3", "TABLE S2.1" or "Table 4b".
    /// The token after "Table" must contain its number.
    pub(crate) table_label: Regex,
    /// Dotted section numbering at the start of a heading, e.g. "2.1.3 "
    section_number: Regex,
}

impl Patterns {
    pub(crate) fn new() -> Self {
        Self {
            table_label: Regex::new(
                r"^\s*(?i:table)\s+[A-Za-z]?\d+[A-Za-z]?(?:[.\-]\d+[A-Za-z]?)*\b",
            )
            .unwrap(),
            section_number: Regex::new(r"^\s*(\d+(?:\.\d+)*)\.?\s+\S").unwrap(),
        }
    }
}

/// Counts from one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Classified {
    pub(crate) by_style: usize,
    pub(crate) by_heuristic: usize,
}

/// Tag every body paragraph with its role.
///
/// Paragraphs classified by heuristic get the matching style id, so a
/// second pass reaches the same result through the style.
pub(crate) fn classify(doc: &mut Document, patterns: &Patterns, heuristics: bool) -> Classified {
    let style_kinds: Vec<Option<Option<ElementKind>>> = doc
        .body
        .iter()
        .enumerate()
        .map(|(i, block)| {
            block.as_paragraph().map(|p| {
                let name = p.style_id.as_deref().and_then(|id| doc.style_name(id));
                let before_table = matches!(doc.body.get(i + 1), Some(Block::Table(_)));
                kind_from_style(p.style_id.as_deref(), name, before_table)
            })
        })
        .collect();
    let has_title_style = style_kinds
        .iter()
        .any(|k| matches!(k, Some(Some(ElementKind::Title))));

    let mut counts = Classified::default();
    let mut seen_text = false;

    for i in 0..doc.body.len() {
        let before_table = matches!(doc.body.get(i + 1), Some(Block::Table(_)));
        let Block::Paragraph(p) = &mut doc.body[i] else {
            continue;
        };
        let first_text = !seen_text && !p.is_empty();
        seen_text |= !p.is_empty();

        let kind = match style_kinds[i] {
            Some(Some(kind)) => {
                counts.by_style += 1;
                kind
            }
            _ if heuristics => {
                let kind = guess_kind(patterns, p, first_text && !has_title_style, before_table);
                if kind != ElementKind::Body {
                    log::debug!("Classified {:?} by heuristic: {:?}", kind, p.plain_text());
                    p.style_id = kind.style_id().map(str::to_string);
                    counts.by_heuristic += 1;
                }
                kind
            }
            _ => ElementKind::Body,
        };
        p.kind = Some(kind);
    }
    counts
}

/// Role implied by a paragraph style id or display name.
fn kind_from_style(
    style_id: Option<&str>,
    style_name: Option<&str>,
    before_table: bool,
) -> Option<ElementKind> {
    [style_id, style_name]
        .into_iter()
        .flatten()
        .find_map(|style| match normalize(style).as_str() {
            "title" => Some(ElementKind::Title),
            "heading1" => Some(ElementKind::Heading1),
            "heading2" => Some(ElementKind::Heading2),
            // Deeper levels format like level 3
            "heading3" | "heading4" | "heading5" | "heading6" | "heading7" | "heading8"
            | "heading9" => Some(ElementKind::Heading3),
            "caption" | "tablecaption" if before_table => Some(ElementKind::TableCaption),
            _ => None,
        })
}

fn normalize(style: &str) -> String {
    style
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn guess_kind(
    patterns: &Patterns,
    p: &Paragraph,
    may_be_title: bool,
    before_table: bool,
) -> ElementKind {
    let text = p.plain_text();
    let text = text.trim();
    if text.is_empty() {
        return ElementKind::Body;
    }

    if before_table && patterns.table_label.is_match(text) {
        return ElementKind::TableCaption;
    }
    if may_be_title {
        return ElementKind::Title;
    }
    if looks_like_heading(p, text) {
        return match patterns.section_number.captures(text) {
            Some(caps) => match caps[1].split('.').count() {
                1 => ElementKind::Heading1,
                2 => ElementKind::Heading2,
                _ => ElementKind::Heading3,
            },
            None => ElementKind::Heading1,
        };
    }
    ElementKind::Body
}

fn looks_like_heading(p: &Paragraph, text: &str) -> bool {
    text.split_whitespace().count() <= MAX_HEADING_WORDS
        && text.chars().count() <= MAX_HEADING_CHARS
        && !text.ends_with('.')
        && p.is_all_bold()
}
