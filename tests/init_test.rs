//! Integration tests for creating new manuscripts.

use paperdoc::{create, Docx, ErrorKind, Paperdoc, TemplateRegistry};

#[test]
fn test_create_nature_manuscript() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.docx");
    let templates = TemplateRegistry::builtin();

    create("Title X", &path, templates.resolve(Some("nature"))).unwrap();

    let docx = Docx::open(&path).unwrap();
    let first = docx.document.paragraphs().next().unwrap();
    assert_eq!(first.plain_text(), "Title X");
    assert!(first
        .runs()
        .all(|r| r.properties.font_name() == Some("Arial")));
}

#[test]
fn test_every_template_creates_its_sections() {
    let dir = tempfile::tempdir().unwrap();
    let templates = TemplateRegistry::builtin();

    for config in templates.iter() {
        let path = dir.path().join(format!("{}.docx", config.key));
        let report = create("Sediment transport", &path, config).unwrap();
        assert_eq!(report.template, config.key);

        let docx = Docx::open(&path).unwrap();
        let headings: Vec<String> = docx
            .document
            .paragraphs()
            .filter(|p| p.style_id.as_deref() == Some("Heading1"))
            .map(|p| p.plain_text())
            .collect();
        assert_eq!(headings, config.sections, "{}", config.key);
        assert_eq!(
            docx.document.metadata.language.as_deref(),
            Some(config.language.tag())
        );
    }
}

#[test]
fn test_created_manuscript_defines_its_styles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paper.docx");
    Paperdoc::new().with_template("science").create("T", &path).unwrap();

    let docx = Docx::open(&path).unwrap();
    assert_eq!(docx.document.style_name("Title"), Some("Title"));
    assert_eq!(docx.document.style_name("Heading1"), Some("heading 1"));
}

#[test]
fn test_create_into_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("paper.docx");
    let templates = TemplateRegistry::builtin();

    let err = create("Title", &path, templates.default_config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WriteFailure);
    assert_eq!(err.kind().exit_code(), 6);
}
