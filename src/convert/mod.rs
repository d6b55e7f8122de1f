//! Converting manuscripts to formatted `.docx`.
//!
//! A [`Translator`] turns a source file into an unformatted [`Docx`]; the
//! [`Converter`] picks one by file extension, runs it, applies the template
//! and saves the result. Translators are registered in a
//! [`TranslatorRegistry`], so a different backend can stand in for pandoc.
//!
//! # Example
//!
//! ```no_run
//! use paperdoc::convert::{ConvertOptions, Converter};
//! use paperdoc::template::TemplateRegistry;
//! use std::time::Duration;
//!
//! fn main() -> paperdoc::Result<()> {
//!     let templates = TemplateRegistry::builtin();
//!     let converter = Converter::new()
//!         .with_options(ConvertOptions::new().with_timeout(Duration::from_secs(60)));
//!
//!     let report = converter.convert("paper.tex", "paper.docx", templates.resolve(Some("agu")))?;
//!     println!("{}", report.format);
//!     Ok(())
//! }
//! ```

mod docx;
mod pandoc;

pub use self::docx::DocxTranslator;
pub use self::pandoc::PandocTranslator;

use crate::detect::{detect_format_from_path, SourceFormat};
use crate::docx::Docx;
use crate::error::{Error, Result};
use crate::format::{FormatOptions, FormatReport, Formatter};
use crate::template::TemplateConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Bibliography picked up from the source directory when none is given.
pub const DEFAULT_BIBLIOGRAPHY: &str = "library.bib";

/// Default limit on one translator run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Options for document conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Bibliography database for citation processing
    pub bibliography: Option<PathBuf>,

    /// Look for `library.bib` beside the source when no bibliography is set
    pub auto_bibliography: bool,

    /// Limit on the external tool's run time
    pub timeout: Duration,

    /// Options for the formatting pass after translation
    pub format: FormatOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            bibliography: None,
            auto_bibliography: true,
            timeout: DEFAULT_TIMEOUT,
            format: FormatOptions::default(),
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this bibliography database.
    pub fn with_bibliography(mut self, path: impl Into<PathBuf>) -> Self {
        self.bibliography = Some(path.into());
        self
    }

    /// Enable or disable the `library.bib` lookup.
    pub fn with_auto_bibliography(mut self, enabled: bool) -> Self {
        self.auto_bibliography = enabled;
        self
    }

    /// Set the translator timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set formatting options.
    pub fn with_format_options(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// The bibliography to use for `source`, if any.
    pub fn bibliography_for(&self, source: &Path) -> Option<PathBuf> {
        if let Some(ref explicit) = self.bibliography {
            return Some(explicit.clone());
        }
        if !self.auto_bibliography {
            return None;
        }
        let candidate = source.with_file_name(DEFAULT_BIBLIOGRAPHY);
        if candidate.is_file() {
            log::debug!("Using bibliography {}", candidate.display());
            Some(candidate)
        } else {
            None
        }
    }
}

/// Trait for source translators.
///
/// Implement this trait to add support for a new source format. The result
/// is formatted by the [`Converter`], so a translator only has to get the
/// content into a package.
pub trait Translator: Send + Sync {
    /// Get the supported file extensions for this translator.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["tex"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this translator.
    fn name(&self) -> &str;

    /// Translate the file at `source` into an unformatted document.
    fn translate(
        &self,
        source: &Path,
        options: &ConvertOptions,
        config: &TemplateConfig,
    ) -> Result<Docx>;

    /// Check if this translator supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry mapping file extensions to translators.
#[derive(Clone)]
pub struct TranslatorRegistry {
    translators: HashMap<String, Arc<dyn Translator>>,
    by_name: HashMap<String, Arc<dyn Translator>>,
}

impl TranslatorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            translators: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the default translators (pandoc, docx).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PandocTranslator::new()));
        registry.register(Arc::new(DocxTranslator::new()));
        registry
    }

    /// Register a translator for all its supported extensions, replacing
    /// any earlier registration for them.
    pub fn register(&mut self, translator: Arc<dyn Translator>) {
        for ext in translator.supported_extensions() {
            self.translators
                .insert(ext.to_lowercase(), translator.clone());
        }
        self.by_name
            .insert(translator.name().to_lowercase(), translator);
    }

    /// Get a translator by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Translator>> {
        self.translators.get(&ext.to_lowercase()).cloned()
    }

    /// Get a translator by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Translator>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.translators.contains_key(&ext.to_lowercase())
    }

    /// All supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.translators.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// The translator for `path`.
    ///
    /// A registered extension decides, but an existing `.docx` must carry
    /// the ZIP signature. Existing files with other extensions are sniffed
    /// and given the translator of the detected format.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn Translator>> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if let Some(translator) = self.get_by_extension(ext) {
            if SourceFormat::from_extension(ext) == Some(SourceFormat::Docx) && path.is_file() {
                detect_format_from_path(path)?;
            }
            return Ok(translator);
        }

        let sniffed = if path.is_file() {
            detect_format_from_path(path).ok()
        } else {
            None
        };
        let by_content = sniffed.and_then(|format| {
            let translator = format
                .extensions()
                .iter()
                .find_map(|e| self.get_by_extension(e))?;
            log::debug!("{} looks like {}", path.display(), format);
            Some(translator)
        });
        by_content.ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "no translator for '{}' (supported: {})",
                path.display(),
                self.supported_extensions().join(", ")
            ))
        })
    }
}

impl Default for TranslatorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("extensions", &self.supported_extensions())
            .finish()
    }
}

/// Outcome of one conversion.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    /// Name of the translator that ran
    pub translator: String,
    /// Formatting applied to the translated document
    pub format: FormatReport,
    /// Where the result was written
    pub output: PathBuf,
}

/// Translate, format, and save in one step.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    translators: TranslatorRegistry,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter with the default translators and options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different translator registry.
    pub fn with_translators(mut self, translators: TranslatorRegistry) -> Self {
        self.translators = translators;
        self
    }

    /// Set conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// The registered translators.
    pub fn translators(&self) -> &TranslatorRegistry {
        &self.translators
    }

    /// Convert `source` into a formatted document at `dest`.
    ///
    /// The source is checked before anything runs, and `dest` is only
    /// written once translation and formatting have succeeded.
    pub fn convert<S: AsRef<Path>, D: AsRef<Path>>(
        &self,
        source: S,
        dest: D,
        config: &TemplateConfig,
    ) -> Result<ConvertReport> {
        let source = source.as_ref();
        let dest = dest.as_ref();
        if !source.is_file() {
            return Err(Error::InputNotFound(source.to_path_buf()));
        }
        let translator = self.translators.for_path(source)?;
        let formatter = Formatter::new(config)?.with_options(self.options.format);

        log::info!(
            "Converting {} with {} using template '{}'",
            source.display(),
            translator.name(),
            config.key
        );
        let mut docx = translator.translate(source, &self.options, config)?;
        let format = formatter.apply(&mut docx.document);
        docx.save(dest)?;

        Ok(ConvertReport {
            translator: translator.name().to_string(),
            format,
            output: dest.to_path_buf(),
        })
    }
}

/// Convert `source` to `dest` with the default translators.
pub fn convert_file<S: AsRef<Path>, D: AsRef<Path>>(
    source: S,
    dest: D,
    config: &TemplateConfig,
    options: ConvertOptions,
) -> Result<ConvertReport> {
    Converter::new().with_options(options).convert(source, dest, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, Paragraph};
    use crate::template::TemplateRegistry;

    struct FixedTranslator;

    impl Translator for FixedTranslator {
        fn supported_extensions(&self) -> &[&str] {
            &["txt"]
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn translate(&self, source: &Path, _: &ConvertOptions, _: &TemplateConfig) -> Result<Docx> {
            let text = std::fs::read_to_string(source)?;
            let mut doc = Document::new();
            for line in text.lines() {
                doc.add_paragraph(Paragraph::with_text(line));
            }
            Ok(Docx::new(doc))
        }
    }

    /// Stands in for pandoc: one paragraph per line of LaTeX source.
    struct LatexLines;

    impl Translator for LatexLines {
        fn supported_extensions(&self) -> &[&str] {
            SourceFormat::Latex.extensions()
        }

        fn name(&self) -> &str {
            "latex-lines"
        }

        fn translate(&self, source: &Path, o: &ConvertOptions, c: &TemplateConfig) -> Result<Docx> {
            FixedTranslator.translate(source, o, c)
        }
    }

    #[test]
    fn test_unknown_extension_is_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("draft.txt");
        std::fs::write(&source, "\\documentclass{article}\nBody").unwrap();

        let mut translators = TranslatorRegistry::new();
        translators.register(Arc::new(LatexLines));
        assert_eq!(translators.for_path(&source).unwrap().name(), "latex-lines");

        let templates = TemplateRegistry::builtin();
        let report = Converter::new()
            .with_translators(translators)
            .convert(&source, dir.path().join("draft.docx"), templates.default_config())
            .unwrap();
        assert_eq!(report.translator, "latex-lines");
    }

    #[test]
    fn test_docx_without_zip_signature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.docx");
        std::fs::write(&source, "# Actually Markdown").unwrap();
        let dest = dir.path().join("out.docx");

        let registry = TranslatorRegistry::with_defaults();
        assert!(matches!(
            registry.for_path(&source),
            Err(Error::UnsupportedFormat(_))
        ));
        // A path that does not exist yet still resolves by extension.
        assert_eq!(registry.for_path(&dest).unwrap().name(), "docx");

        let templates = TemplateRegistry::builtin();
        let err = Converter::new()
            .convert(&source, &dest, templates.default_config())
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedFormat);
        assert!(!dest.exists());
    }

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_bibliography("refs.bib")
            .with_timeout(Duration::from_secs(5))
            .with_format_options(FormatOptions::new().with_heuristics(false));

        assert_eq!(options.bibliography, Some(PathBuf::from("refs.bib")));
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert!(!options.format.heuristics);
        assert_eq!(ConvertOptions::default().timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_bibliography_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.tex");
        assert_eq!(ConvertOptions::new().bibliography_for(&source), None);

        std::fs::write(dir.path().join(DEFAULT_BIBLIOGRAPHY), "@article{a,}").unwrap();
        assert_eq!(
            ConvertOptions::new().bibliography_for(&source),
            Some(dir.path().join(DEFAULT_BIBLIOGRAPHY))
        );
        assert_eq!(
            ConvertOptions::new()
                .with_auto_bibliography(false)
                .bibliography_for(&source),
            None
        );
        assert_eq!(
            ConvertOptions::new()
                .with_bibliography("other.bib")
                .bibliography_for(&source),
            Some(PathBuf::from("other.bib"))
        );
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = TranslatorRegistry::with_defaults();
        for ext in ["tex", "TEX", "latex", "ltx", "md", "markdown", "docx"] {
            assert!(registry.supports(ext), "{}", ext);
        }
        assert!(!registry.supports("pdf"));
        assert_eq!(registry.get_by_extension("tex").unwrap().name(), "pandoc");
        assert_eq!(registry.get_by_extension("docx").unwrap().name(), "docx");
        assert!(registry.get_by_name("Pandoc").is_some());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("paper.rtf");
        std::fs::write(&source, "{\\rtf1}").unwrap();

        let templates = TemplateRegistry::builtin();
        let err = Converter::new()
            .convert(&source, dir.path().join("out.docx"), templates.default_config())
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_source_is_reported_first() {
        let templates = TemplateRegistry::builtin();
        let err = Converter::new()
            .convert("/no/such/paper.rtf", "/no/such/out.docx", templates.default_config())
            .unwrap_err();
        assert!(matches!(err, Error::InputNotFound(_)));
    }

    #[test]
    fn test_custom_translator_output_is_formatted() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, "Sea ice decline\nBody text.").unwrap();
        let dest = dir.path().join("notes.docx");

        let mut translators = TranslatorRegistry::new();
        translators.register(Arc::new(FixedTranslator));
        let templates = TemplateRegistry::builtin();
        let report = Converter::new()
            .with_translators(translators)
            .convert(&source, &dest, templates.resolve(Some("nature")))
            .unwrap();

        assert_eq!(report.translator, "fixed");
        assert_eq!(report.format.titles, 1);
        let docx = Docx::open(&dest).unwrap();
        let title = docx.document.paragraphs().next().unwrap();
        assert_eq!(title.plain_text(), "Sea ice decline");
        assert_eq!(
            title.runs().next().unwrap().properties.font_name(),
            Some("Arial")
        );
    }

    #[test]
    fn test_invalid_config_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, "Text").unwrap();
        let dest = dir.path().join("notes.docx");

        let mut translators = TranslatorRegistry::new();
        translators.register(Arc::new(FixedTranslator));
        let mut config = TemplateRegistry::builtin().default_config().clone();
        config.font_size = 0.0;

        let err = Converter::new()
            .with_translators(translators)
            .convert(&source, &dest, &config)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!dest.exists());
    }
}
