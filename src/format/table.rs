//! APA-style tables and "Table N" captions.

use super::classify::Patterns;
use super::RunStyle;
use crate::model::{
    Alignment, Block, Border, BorderSet, Length, LineSpacing, Paragraph, ParagraphItem, Run, Table,
};

/// Width of the three rules in eighths of a point (½pt).
pub(crate) const RULE_SIZE: u32 = 4;

/// Apply the three-line table style: a rule above and below the header
/// row, one below the last row, and no other lines.
pub(crate) fn style_table(table: &mut Table, style: &RunStyle<'_>) {
    table.properties.borders = Some(BorderSet::none());

    let last = table.rows.len().saturating_sub(1);
    for (i, row) in table.rows.iter_mut().enumerate() {
        let header = i == 0;
        for cell in &mut row.cells {
            cell.properties.borders = Some(BorderSet {
                top: Some(if header { Border::single(RULE_SIZE) } else { Border::none() }),
                bottom: Some(if header || i == last {
                    Border::single(RULE_SIZE)
                } else {
                    Border::none()
                }),
                left: Some(Border::none()),
                right: Some(Border::none()),
                inside_h: None,
                inside_v: None,
            });

            for p in cell.blocks.iter_mut().filter_map(|b| match b {
                Block::Paragraph(p) => Some(p),
                _ => None,
            }) {
                p.format.alignment = Some(Alignment::Left);
                p.format.extra.retain(|raw| raw.name != "jc");
                p.format.space_before = Some(Length::ZERO);
                p.format.space_after = Some(Length::ZERO);
                p.format.line_spacing = Some(LineSpacing::Multiple(1.0));
                for run in p.runs_mut() {
                    style.apply(run, style.config.font_size);
                    if header {
                        run.properties.bold = Some(true);
                    }
                }
            }
        }
    }
}

/// Rebuild a caption paragraph as a bold italic "Table N" label, a line
/// break, and the italic caption text.
///
/// An existing label is kept; otherwise `number` is used.
pub(crate) fn style_caption(
    p: &mut Paragraph,
    number: usize,
    patterns: &Patterns,
    style: &RunStyle<'_>,
) {
    let text = p.plain_text();
    let text = text.trim();
    let (label, rest) = match patterns.table_label.find(text) {
        Some(m) => (m.as_str().trim().to_string(), &text[m.end()..]),
        None => (format!("Table {}", number), text),
    };
    let caption = rest
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '.' | '|' | '-'))
        .trim_end();

    // Non-run markup such as bookmarks stays in front of the rebuilt runs.
    p.items.retain(|item| matches!(item, ParagraphItem::Raw(_)));

    let mut label_run = Run::new(label);
    label_run.properties.bold = Some(true);
    label_run.properties.italic = Some(true);
    p.add_run(label_run);

    if !caption.is_empty() {
        let mut text_run = Run::new(format!("\n{}", caption));
        text_run.properties.bold = Some(false);
        text_run.properties.italic = Some(true);
        p.add_run(text_run);
    }

    for run in p.runs_mut() {
        style.apply(run, style.config.font_size);
    }

    p.format.alignment = Some(Alignment::Left);
    p.format.extra.retain(|raw| raw.name != "jc");
    p.format.space_before = Some(Length::from_pt(12.0));
    p.format.space_after = Some(Length::ZERO);
    p.format.line_spacing = Some(LineSpacing::Multiple(style.config.line_spacing));
}
