//! Integration tests for the converter module.

mod common;

use std::path::Path;
use std::sync::Arc;
use paperdoc::convert::{
    ConvertOptions, Converter, PandocTranslator, Translator, TranslatorRegistry,
};
use paperdoc::error::Result;
use paperdoc::model::{Document, Paragraph};
use paperdoc::{Docx, Error, ErrorKind, TemplateConfig, TemplateRegistry};

/// Mock translator for testing.
struct MockTranslator {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl MockTranslator {
    fn new(extensions: Vec<&'static str>, name: &'static str) -> Self {
        Self { extensions, name }
    }
}

impl Translator for MockTranslator {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn translate(&self, _: &Path, _: &ConvertOptions, config: &TemplateConfig) -> Result<Docx> {
        let mut doc = Document::new();
        doc.add_paragraph(Paragraph::with_text(format!("Translated by {}", self.name)));
        doc.add_paragraph(Paragraph::with_text(format!("Cite as {}.", config.csl_style)));
        Ok(Docx::new(doc))
    }
}

#[test]
fn test_translator_registry_new() {
    let registry = TranslatorRegistry::new();
    assert!(!registry.supports("tex"));
    assert!(registry.supported_extensions().is_empty());
}

#[test]
fn test_translator_registry_custom() {
    let mut registry = TranslatorRegistry::new();
    registry.register(Arc::new(MockTranslator::new(vec!["rst", "org"], "mock")));

    assert!(registry.supports("rst"));
    assert!(registry.supports("ORG"));
    assert_eq!(registry.supported_extensions(), vec!["org", "rst"]);
    assert_eq!(registry.get_by_name("MOCK").unwrap().name(), "mock");
}

#[test]
fn test_later_registration_wins() {
    let mut registry = TranslatorRegistry::with_defaults();
    registry.register(Arc::new(MockTranslator::new(vec!["md"], "mock")));

    assert_eq!(registry.get_by_extension("md").unwrap().name(), "mock");
    assert_eq!(registry.get_by_extension("tex").unwrap().name(), "pandoc");
}

#[test]
fn test_missing_source_before_tool() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = TranslatorRegistry::new();
    registry.register(Arc::new(PandocTranslator::with_program(
        dir.path().join("no-pandoc"),
    )));

    let templates = TemplateRegistry::builtin();
    let err = Converter::new()
        .with_translators(registry)
        .convert(
            dir.path().join("missing.tex"),
            dir.path().join("out.docx"),
            templates.default_config(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InputNotFound(_)));
    assert_eq!(err.kind().exit_code(), 2);
}

#[test]
fn test_missing_tool_is_distinct_from_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let tex = dir.path().join("paper.tex");
    std::fs::write(&tex, "\\documentclass{article}\n\\begin{document}Hi\\end{document}").unwrap();
    let odt = dir.path().join("paper.odt");
    std::fs::write(&odt, "PK").unwrap();

    let mut registry = TranslatorRegistry::with_defaults();
    registry.register(Arc::new(PandocTranslator::with_program(
        dir.path().join("no-pandoc"),
    )));
    let converter = Converter::new().with_translators(registry);
    let templates = TemplateRegistry::builtin();
    let config = templates.default_config();

    let missing_tool = converter
        .convert(&tex, dir.path().join("a.docx"), config)
        .unwrap_err();
    let unsupported = converter
        .convert(&odt, dir.path().join("b.docx"), config)
        .unwrap_err();

    assert_eq!(missing_tool.kind(), ErrorKind::ToolUnavailable);
    assert_eq!(unsupported.kind(), ErrorKind::UnsupportedFormat);
    assert!(!dir.path().join("a.docx").exists());
}

#[test]
fn test_docx_source_is_reformatted() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("draft.docx");
    let dest = dir.path().join("science.docx");
    common::write_draft(&source);

    let templates = TemplateRegistry::builtin();
    let report = Converter::new()
        .convert(&source, &dest, templates.resolve(Some("science")))
        .unwrap();

    assert_eq!(report.translator, "docx");
    assert_eq!(report.output, dest);
    assert_eq!(report.format.tables, 1);

    let docx = Docx::open(&dest).unwrap();
    let run = docx.document.paragraphs().next().unwrap().runs().next().unwrap();
    assert_eq!(run.properties.font_name(), Some("Times New Roman"));
}

#[test]
fn test_translator_receives_template() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("paper.rst");
    std::fs::write(&source, "Title\n=====").unwrap();
    let dest = dir.path().join("paper.docx");

    let mut registry = TranslatorRegistry::new();
    registry.register(Arc::new(MockTranslator::new(vec!["rst"], "mock")));
    let templates = TemplateRegistry::builtin();
    let config = templates.resolve(Some("pnas"));

    Converter::new()
        .with_translators(registry)
        .convert(&source, &dest, config)
        .unwrap();

    let text = Docx::open(&dest).unwrap().document.plain_text();
    assert!(text.contains("Translated by mock"));
    assert!(text.contains(&config.csl_style));
}
