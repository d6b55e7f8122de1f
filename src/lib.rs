//! # paperdoc
//!
//! Academic manuscript toolkit for `.docx` files.
//!
//! This library creates new manuscripts from journal templates, converts
//! LaTeX and Markdown sources to Word documents through pandoc, and
//! re-applies journal formatting rules to existing `.docx` files.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperdoc::{format_file, TemplateRegistry};
//!
//! fn main() -> paperdoc::Result<()> {
//!     let templates = TemplateRegistry::builtin();
//!     let report = format_file("paper.docx", "paper.docx", templates.resolve(Some("agu")))?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Journal templates**: AGU, Nature, Science and PNAS rules built in,
//!   more loadable from JSON
//! - **Structure detection**: titles, headings and table captions by style
//!   or by appearance
//! - **APA tables**: three-line rules and "Table N" captions
//! - **Lossless packages**: parts and markup the formatter does not touch
//!   are written back unchanged

pub mod convert;
pub mod detect;
pub mod docx;
pub mod error;
pub mod format;
pub mod init;
pub mod model;
pub mod template;

// Re-export commonly used types
pub use convert::{
    convert_file, ConvertOptions, ConvertReport, Converter, DocxTranslator, PandocTranslator,
    Translator, TranslatorRegistry,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, SourceFormat};
pub use docx::Docx;
pub use error::{Error, ErrorKind, Result};
pub use format::{FormatOptions, FormatReport, Formatter};
pub use init::{create, InitReport};
pub use model::{
    Alignment, Block, Document, ElementKind, Length, Metadata, PaperSize, Paragraph, Run, Table,
};
pub use template::{CitationStyle, Locale, Margins, TemplateConfig, TemplateRegistry};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Apply a template to the `.docx` at `source` and save it to `dest`.
///
/// `dest` may be the same path as `source`; the file is replaced only once
/// the formatted document has been written completely.
///
/// # Example
///
/// ```no_run
/// use paperdoc::{format_file, TemplateRegistry};
///
/// let templates = TemplateRegistry::builtin();
/// let report = format_file("draft.docx", "final.docx", templates.resolve(Some("nature"))).unwrap();
/// println!("{} headings", report.headings);
/// ```
pub fn format_file<S: AsRef<Path>, D: AsRef<Path>>(
    source: S,
    dest: D,
    config: &TemplateConfig,
) -> Result<FormatReport> {
    format_file_with_options(source, dest, config, FormatOptions::default())
}

/// Apply a template with custom formatting options.
///
/// # Example
///
/// ```no_run
/// use paperdoc::{format_file_with_options, FormatOptions, TemplateRegistry};
///
/// let templates = TemplateRegistry::builtin();
/// let options = FormatOptions::new().with_table_style(false);
/// format_file_with_options("paper.docx", "paper.docx", templates.default_config(), options).unwrap();
/// ```
pub fn format_file_with_options<S: AsRef<Path>, D: AsRef<Path>>(
    source: S,
    dest: D,
    config: &TemplateConfig,
    options: FormatOptions,
) -> Result<FormatReport> {
    let mut docx = Docx::open(source.as_ref())?;
    let formatter = Formatter::new(config)?.with_options(options);
    let report = formatter.apply(&mut docx.document);
    docx.save(dest.as_ref())?;
    log::info!("Formatted {}: {}", source.as_ref().display(), report);
    Ok(report)
}

/// Builder for running any operation with one set of templates and options.
///
/// # Example
///
/// ```no_run
/// use paperdoc::Paperdoc;
///
/// let paperdoc = Paperdoc::new()
///     .with_template("science")
///     .with_bibliography("refs/library.bib")
///     .with_pandoc("/opt/pandoc/bin/pandoc");
///
/// paperdoc.convert("paper.tex", "paper.docx")?;
/// paperdoc.format("paper.docx", "paper-final.docx")?;
/// # Ok::<(), paperdoc::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Paperdoc {
    templates: TemplateRegistry,
    template: Option<String>,
    format_options: FormatOptions,
    convert_options: ConvertOptions,
    translators: TranslatorRegistry,
}

impl Paperdoc {
    /// Create a builder with the built-in templates and default translators.
    pub fn new() -> Self {
        Self {
            templates: TemplateRegistry::builtin(),
            template: None,
            format_options: FormatOptions::default(),
            convert_options: ConvertOptions::default(),
            translators: TranslatorRegistry::with_defaults(),
        }
    }

    /// Use a different template registry.
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    /// Select a template by name. Unknown names fall back to `default`.
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.template = Some(name.into());
        self
    }

    /// Enable or disable heuristic classification.
    pub fn with_heuristics(mut self, enabled: bool) -> Self {
        self.format_options = self.format_options.with_heuristics(enabled);
        self
    }

    /// Enable or disable table and caption styling.
    pub fn with_table_style(mut self, enabled: bool) -> Self {
        self.format_options = self.format_options.with_table_style(enabled);
        self
    }

    /// Set the bibliography for conversions.
    pub fn with_bibliography(mut self, path: impl Into<PathBuf>) -> Self {
        self.convert_options = self.convert_options.with_bibliography(path);
        self
    }

    /// Set the conversion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.convert_options = self.convert_options.with_timeout(timeout);
        self
    }

    /// Run a specific pandoc executable.
    pub fn with_pandoc(mut self, program: impl Into<PathBuf>) -> Self {
        self.translators
            .register(Arc::new(PandocTranslator::with_program(program)));
        self
    }

    /// The selected template.
    pub fn config(&self) -> &TemplateConfig {
        self.templates.resolve(self.template.as_deref())
    }

    /// Create a new manuscript at `path`.
    pub fn create<P: AsRef<Path>>(&self, title: &str, path: P) -> Result<InitReport> {
        init::create(title, path, self.config())
    }

    /// Convert a LaTeX, Markdown or `.docx` source to a formatted `.docx`.
    pub fn convert<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        source: S,
        dest: D,
    ) -> Result<ConvertReport> {
        let options = self
            .convert_options
            .clone()
            .with_format_options(self.format_options);
        Converter::new()
            .with_translators(self.translators.clone())
            .with_options(options)
            .convert(source, dest, self.config())
    }

    /// Re-format an existing `.docx`.
    pub fn format<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        source: S,
        dest: D,
    ) -> Result<FormatReport> {
        format_file_with_options(source, dest, self.config(), self.format_options)
    }
}

impl Default for Paperdoc {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paperdoc_builder() {
        let paperdoc = Paperdoc::new()
            .with_template("PNAS")
            .with_heuristics(false)
            .with_timeout(Duration::from_secs(30));

        assert_eq!(paperdoc.config().key, "pnas");
        assert!(!paperdoc.format_options.heuristics);
        assert!(paperdoc.format_options.tables);
        assert_eq!(paperdoc.convert_options.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_paperdoc_builder_default() {
        let paperdoc = Paperdoc::default();
        assert_eq!(paperdoc.config().key, "default");
        assert!(paperdoc.translators.supports("tex"));
    }

    #[test]
    fn test_unknown_template_falls_back() {
        let paperdoc = Paperdoc::new().with_template("journal-of-nothing");
        assert_eq!(paperdoc.config().key, "default");
    }

    #[test]
    fn test_with_pandoc_replaces_translator() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.md");
        std::fs::write(&source, "# Heading\n\nText.").unwrap();

        let err = Paperdoc::new()
            .with_pandoc(dir.path().join("missing-pandoc"))
            .convert(&source, dir.path().join("paper.docx"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
    }

    #[test]
    fn test_create_then_format_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.docx");
        let paperdoc = Paperdoc::new().with_template("agu");

        paperdoc.create("Tidal mixing", &path).unwrap();
        let report = paperdoc.format(&path, &path).unwrap();
        assert_eq!(report.titles, 1);

        let docx = Docx::open(&path).unwrap();
        let run = docx.document.paragraphs().next().unwrap().runs().next().unwrap();
        assert_eq!(run.properties.font_name(), Some("Times New Roman"));
    }

    #[test]
    fn test_format_missing_source() {
        let templates = TemplateRegistry::builtin();
        let err = format_file("/no/such/paper.docx", "/tmp/out.docx", templates.default_config())
            .unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }
}
