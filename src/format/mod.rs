//! Applying a journal template to a document.
//!
//! Formatting runs in two steps. Classification tags each body paragraph
//! with an [`ElementKind`]; the formatter then sets every controlled
//! attribute to an absolute value taken from the [`TemplateConfig`], so
//! applying the same template twice changes nothing the second time.
//!
//! # Example
//!
//! ```no_run
//! use paperdoc::docx::Docx;
//! use paperdoc::format::{FormatOptions, Formatter};
//! use paperdoc::template::TemplateRegistry;
//!
//! fn main() -> paperdoc::Result<()> {
//!     let registry = TemplateRegistry::builtin();
//!     let mut docx = Docx::open("paper.docx")?;
//!
//!     let formatter = Formatter::new(registry.resolve(Some("agu")))?
//!         .with_options(FormatOptions::new().with_heuristics(false));
//!     let report = formatter.apply(&mut docx.document);
//!     println!("{} headings", report.headings);
//!
//!     docx.save("paper.docx")
//! }
//! ```

mod classify;
mod table;

use crate::error::Result;
use crate::model::{
    Alignment, Block, Document, ElementKind, Length, LineSpacing, PageMargins, PageSize,
    Paragraph, Run, RunFonts, RunLanguage,
};
use crate::template::TemplateConfig;
use classify::Patterns;
use std::fmt;

/// Space after every paragraph.
const SPACE_AFTER_PT: f64 = 6.0;

/// Text color for all runs.
const TEXT_COLOR: &str = "000000";

/// Options controlling which formatting steps run.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Classify unstyled paragraphs by position and appearance
    pub heuristics: bool,

    /// Restyle tables and their captions
    pub tables: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            heuristics: true,
            tables: true,
        }
    }
}

impl FormatOptions {
    /// Create default options: heuristics and table styling on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable heuristic classification.
    pub fn with_heuristics(mut self, enabled: bool) -> Self {
        self.heuristics = enabled;
        self
    }

    /// Enable or disable table and caption styling.
    pub fn with_table_style(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self
    }
}

/// What one formatting pass touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatReport {
    /// Paragraphs formatted at body level, whatever their role; paragraphs
    /// inside table cells are not counted
    pub paragraphs: usize,
    /// Paragraphs formatted as the title
    pub titles: usize,
    /// Paragraphs formatted as headings
    pub headings: usize,
    /// Tables restyled
    pub tables: usize,
    /// Table captions rebuilt
    pub captions: usize,
    /// Sections given the template page geometry
    pub sections: usize,
    /// Paragraphs whose role came from heuristics rather than a style
    pub inferred: usize,
}

impl fmt::Display for FormatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} paragraphs ({} title, {} headings), {} tables, {} captions, {} sections",
            self.paragraphs, self.titles, self.headings, self.tables, self.captions, self.sections
        )
    }
}

/// Run-level settings shared by every paragraph kind.
pub(crate) struct RunStyle<'c> {
    pub(crate) config: &'c TemplateConfig,
}

impl<'c> RunStyle<'c> {
    pub(crate) fn new(config: &'c TemplateConfig) -> Self {
        Self { config }
    }

    /// Set font, size, color, and language on a run.
    pub(crate) fn apply(&self, run: &mut Run, size: f32) {
        let props = &mut run.properties;

        // Theme font references take precedence over named fonts, so only
        // the script hint survives.
        let hint: Vec<(String, String)> = props
            .fonts
            .take()
            .map(|f| f.other)
            .unwrap_or_default()
            .into_iter()
            .filter(|(key, _)| key.ends_with("hint"))
            .collect();
        let mut fonts = RunFonts::uniform(&self.config.font);
        fonts.other = hint;
        props.fonts = Some(fonts);

        props.size = Some(size);
        props.color = Some(TEXT_COLOR.to_string());

        let existing = props.language.take().unwrap_or_default();
        props.language = Some(RunLanguage {
            latin: Some(self.config.language.tag().to_string()),
            ..existing
        });
    }
}

/// Applies one template to documents.
#[derive(Debug, Clone)]
pub struct Formatter<'c> {
    config: &'c TemplateConfig,
    options: FormatOptions,
    patterns: Patterns,
}

impl<'c> Formatter<'c> {
    /// Create a formatter for `config`.
    ///
    /// Fails with [`Error::InvalidConfig`](crate::Error::InvalidConfig) when
    /// any value is out of range, before any document is touched.
    pub fn new(config: &'c TemplateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            options: FormatOptions::default(),
            patterns: Patterns::new(),
        })
    }

    /// Set formatting options.
    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    /// The template being applied.
    pub fn config(&self) -> &TemplateConfig {
        self.config
    }

    /// Format a document in place.
    pub fn apply(&self, doc: &mut Document) -> FormatReport {
        let classified = classify::classify(doc, &self.patterns, self.options.heuristics);
        let mut report = FormatReport {
            inferred: classified.by_heuristic,
            ..Default::default()
        };
        let style = RunStyle::new(self.config);
        let mut tables_seen = 0;

        for block in doc.body.iter_mut() {
            let p = match block {
                Block::Paragraph(p) => p,
                Block::Table(table) => {
                    tables_seen += 1;
                    if self.options.tables {
                        table::style_table(table, &style);
                        report.tables += 1;
                    }
                    continue;
                }
                Block::Raw(_) => continue,
            };

            let kind = p.kind.unwrap_or(ElementKind::Body);
            report.paragraphs += 1;
            match kind {
                // Captions sit directly above the table they number.
                ElementKind::TableCaption if self.options.tables => {
                    table::style_caption(p, tables_seen + 1, &self.patterns, &style);
                    report.captions += 1;
                }
                ElementKind::Title => {
                    self.format_paragraph(p, kind, &style);
                    report.titles += 1;
                }
                k if k.heading_level().is_some() => {
                    self.format_paragraph(p, kind, &style);
                    report.headings += 1;
                }
                _ => self.format_paragraph(p, kind, &style),
            }
        }

        report.sections = self.apply_page_geometry(doc);
        log::info!("Applied template '{}': {}", self.config.key, report);
        report
    }

    fn format_paragraph(&self, p: &mut Paragraph, kind: ElementKind, style: &RunStyle<'_>) {
        p.format.line_spacing = Some(LineSpacing::Multiple(self.config.line_spacing));
        p.format.space_before = Some(Length::ZERO);
        p.format.space_after = Some(Length::from_pt(SPACE_AFTER_PT));

        if kind.is_display() {
            p.format.alignment = Some(Alignment::Left);
            p.format.extra.retain(|raw| raw.name != "jc");
        }

        let size = self.config.size_for(kind);
        for run in p.runs_mut() {
            style.apply(run, size);
            if kind.is_display() {
                run.properties.bold = Some(true);
            }
        }
    }

    /// Give every section the template paper size and margins. Landscape
    /// sections keep their orientation.
    fn apply_page_geometry(&self, doc: &mut Document) -> usize {
        let (width, height) = self.config.page_dimensions();
        let margins = self.config.margins;
        let mut count = 0;

        for section in doc.sections_mut() {
            let landscape = section.page_size.is_some_and(|s| s.landscape);
            section.page_size = Some(if landscape {
                PageSize {
                    width: height,
                    height: width,
                    landscape: true,
                }
            } else {
                PageSize::portrait(width, height)
            });

            let existing = section.margins.unwrap_or_default();
            section.margins = Some(PageMargins {
                top: margins.top,
                right: margins.right,
                bottom: margins.bottom,
                left: margins.left,
                ..existing
            });
            count += 1;
        }
        count
    }
}

/// Format `doc` with `config` and default options.
///
/// The config is validated first; on failure the document is unchanged.
pub fn apply(doc: &mut Document, config: &TemplateConfig) -> Result<FormatReport> {
    Ok(Formatter::new(config)?.apply(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PaperSize, SectionProperties, Table};
    use crate::template::TemplateRegistry;
    use crate::Error;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text("Permafrost carbon"));
        let mut heading = Paragraph::new();
        heading.add_run(Run::bold("1 Introduction"));
        doc.add_paragraph(heading);
        let mut body = Paragraph::with_text("Thawing soils release ");
        let mut emphasis = Run::new("methane");
        emphasis.properties.italic = Some(true);
        emphasis.properties.size = Some(9.0);
        body.add_run(emphasis);
        body.format.alignment = Some(Alignment::Justify);
        doc.add_paragraph(body);
        doc.add_paragraph(Paragraph::with_text("Table 1 Fluxes"));
        doc.add_table(Table::from_text(vec![vec!["Site", "Flux"], vec!["A", "2"]]));
        doc
    }

    #[test]
    fn test_apply_sets_fonts_and_sizes() {
        let registry = TemplateRegistry::builtin();
        let config = registry.resolve(Some("nature"));
        let mut doc = sample();
        let report = apply(&mut doc, config).unwrap();

        assert_eq!(report.titles, 1);
        assert_eq!(report.headings, 1);
        assert_eq!(report.tables, 1);
        assert_eq!(report.captions, 1);
        assert_eq!(report.sections, 1);
        // Title, heading, body and caption.
        assert_eq!(report.paragraphs, 4);

        let paragraphs: Vec<&Paragraph> = doc.paragraphs().collect();
        let title_run = paragraphs[0].runs().next().unwrap();
        assert_eq!(title_run.properties.font_name(), Some("Arial"));
        assert_eq!(title_run.properties.size, Some(14.0));
        assert_eq!(title_run.properties.bold, Some(true));
        assert_eq!(paragraphs[0].format.alignment, Some(Alignment::Left));

        let body_runs: Vec<&Run> = paragraphs[2].runs().collect();
        assert_eq!(body_runs[1].properties.size, Some(12.0));
        assert_eq!(body_runs[1].properties.italic, Some(true));
        assert_eq!(body_runs[1].properties.bold, None);
        assert_eq!(body_runs[1].properties.color.as_deref(), Some("000000"));
        assert_eq!(
            body_runs[1].properties.language.as_ref().unwrap().latin.as_deref(),
            Some("en-GB")
        );
        assert_eq!(paragraphs[2].format.alignment, Some(Alignment::Justify));
        assert_eq!(paragraphs[2].format.line_spacing, Some(LineSpacing::Multiple(2.0)));
        assert_eq!(paragraphs[2].format.space_after, Some(Length::from_pt(6.0)));
    }

    #[test]
    fn test_apply_sets_page_geometry() {
        let registry = TemplateRegistry::builtin();
        let mut doc = sample();
        let mut p = Paragraph::with_text("Landscape appendix");
        let mut section = SectionProperties::new();
        section.page_size = Some(PageSize {
            width: Length::from_inches(11.0),
            height: Length::from_inches(8.5),
            landscape: true,
        });
        p.format.section = Some(Box::new(section));
        doc.body.insert(0, Block::Paragraph(p));

        let report = apply(&mut doc, registry.default_config()).unwrap();
        assert_eq!(report.sections, 2);

        let (width, height) = PaperSize::A4.dimensions();
        assert_eq!(doc.section.page_size, Some(PageSize::portrait(width, height)));
        let margins = doc.section.margins.unwrap();
        assert_eq!(margins.top, Length::from_inches(1.0));
        assert_eq!(margins.header, Length::from_inches(0.5));

        let first = doc.paragraphs().next().unwrap();
        let landscape = first.format.section.as_ref().unwrap().page_size.unwrap();
        assert!(landscape.landscape);
        assert_eq!(landscape.width, height);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let registry = TemplateRegistry::builtin();
        let config = registry.resolve(Some("agu"));
        let mut doc = sample();

        apply(&mut doc, config).unwrap();
        let once = doc.clone();
        let second = apply(&mut doc, config).unwrap();

        assert_eq!(doc, once);
        assert_eq!(second.inferred, 0);
    }

    #[test]
    fn test_invalid_config_leaves_document_unchanged() {
        let registry = TemplateRegistry::builtin();
        let mut config = registry.default_config().clone();
        config.font_size = 0.0;
        config.title_size = Some(16.0);

        let mut doc = sample();
        let before = doc.clone();
        let err = apply(&mut doc, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_tables_option_off() {
        let registry = TemplateRegistry::builtin();
        let formatter = Formatter::new(registry.default_config())
            .unwrap()
            .with_options(FormatOptions::new().with_table_style(false));
        let mut doc = sample();
        let report = formatter.apply(&mut doc);

        assert_eq!(report.tables, 0);
        assert_eq!(report.captions, 0);
        let table = doc.tables().next().unwrap();
        assert!(table.properties.borders.is_none());
    }
}
