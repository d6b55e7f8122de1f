//! New manuscript skeletons.

use crate::docx::Docx;
use crate::error::Result;
use crate::format::{FormatOptions, FormatReport, Formatter};
use crate::model::{Document, Metadata, Paragraph};
use crate::template::TemplateConfig;
use std::path::{Path, PathBuf};

const AUTHOR_PLACEHOLDER: &str = "Author Name¹, Second Author², Third Author¹";
const AFFILIATION_PLACEHOLDER: &str =
    "¹ Department, Institution, City, Country\n² Department, Institution, City, Country";

/// What [`create`] wrote.
#[derive(Debug, Clone)]
pub struct InitReport {
    /// Where the manuscript was written
    pub path: PathBuf,
    /// Template key used
    pub template: String,
    /// Section headings in the skeleton
    pub sections: usize,
    /// Formatting applied to the skeleton
    pub format: FormatReport,
}

/// Placeholder body text for a section heading.
pub fn placeholder_for(section: &str) -> String {
    let lower = section.to_lowercase();
    let text = if lower == "abstract" {
        "[Write your abstract here. Typically 150-250 words.]"
    } else if lower.contains("introduction") {
        "[Introduce the research question and background.]"
    } else if lower.contains("method") {
        "[Describe your methodology.]"
    } else if lower.contains("result") {
        "[Present your findings.]"
    } else if lower.contains("discussion") {
        "[Interpret results and discuss implications.]"
    } else if lower.contains("conclusion") {
        "[Summarize main findings.]"
    } else if lower.contains("reference") {
        "[References will be added here.]"
    } else if lower.contains("competing") || lower.contains("conflict") {
        "The authors declare no competing interests."
    } else {
        return format!("[Content for {} section.]", section);
    };
    text.to_string()
}

/// Build the unformatted skeleton for `title`.
///
/// The title and byline are followed by one `Heading1` and a placeholder
/// paragraph per template section.
pub fn skeleton(title: &str, config: &TemplateConfig) -> Document {
    let mut doc = Document::new();
    doc.add_paragraph(Paragraph::styled(title, "Title"));
    doc.add_paragraph(Paragraph::with_text(AUTHOR_PLACEHOLDER));
    doc.add_paragraph(Paragraph::new());
    doc.add_paragraph(Paragraph::with_text(AFFILIATION_PLACEHOLDER));
    doc.add_paragraph(Paragraph::new());

    for section in &config.sections {
        doc.add_paragraph(Paragraph::styled(section.as_str(), "Heading1"));
        doc.add_paragraph(Paragraph::with_text(placeholder_for(section)));
    }
    doc
}

/// Create a formatted manuscript skeleton at `path`.
///
/// Nothing is written when the config is invalid; an unwritable destination
/// is reported as [`Error::WriteFailure`](crate::Error::WriteFailure).
pub fn create<P: AsRef<Path>>(title: &str, path: P, config: &TemplateConfig) -> Result<InitReport> {
    let path = path.as_ref();
    // Every role comes from a style, so there is nothing to infer.
    let formatter =
        Formatter::new(config)?.with_options(FormatOptions::new().with_heuristics(false));

    let mut doc = skeleton(title, config);
    doc.metadata = Metadata {
        language: Some(config.language.tag().to_string()),
        ..Metadata::for_new_document(title)
    };
    let format = formatter.apply(&mut doc);

    Docx::new(doc).save(path)?;
    log::info!(
        "Created {} with template '{}' ({} sections)",
        path.display(),
        config.key,
        config.sections.len()
    );

    Ok(InitReport {
        path: path.to_path_buf(),
        template: config.key.clone(),
        sections: config.sections.len(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElementKind;
    use crate::template::TemplateRegistry;
    use crate::ErrorKind;

    #[test]
    fn test_placeholders() {
        assert!(placeholder_for("Abstract").contains("150-250 words"));
        assert_eq!(placeholder_for("Materials and Methods"), "[Describe your methodology.]");
        assert_eq!(
            placeholder_for("Conflict of Interest"),
            "The authors declare no competing interests."
        );
        assert_eq!(
            placeholder_for("Data Availability"),
            "[Content for Data Availability section.]"
        );
    }

    #[test]
    fn test_skeleton_layout() {
        let registry = TemplateRegistry::builtin();
        let config = registry.resolve(Some("agu"));
        let doc = skeleton("Ocean heat uptake", config);

        assert_eq!(doc.paragraph_count(), 5 + 2 * config.sections.len());
        let paragraphs: Vec<&Paragraph> = doc.paragraphs().collect();
        assert_eq!(paragraphs[0].style_id.as_deref(), Some("Title"));
        assert!(paragraphs[2].is_empty());
        assert_eq!(paragraphs[5].plain_text(), config.sections[0]);
        assert_eq!(paragraphs[5].style_id.as_deref(), Some("Heading1"));
    }

    #[test]
    fn test_create_formats_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.docx");
        let registry = TemplateRegistry::builtin();
        let config = registry.resolve(Some("nature"));

        let report = create("Title X", &path, config).unwrap();
        assert_eq!(report.sections, config.sections.len());
        assert_eq!(report.format.titles, 1);
        assert_eq!(report.format.headings, config.sections.len());

        let docx = Docx::open(&path).unwrap();
        let doc = &docx.document;
        assert_eq!(doc.metadata.title.as_deref(), Some("Title X"));
        assert_eq!(doc.metadata.language.as_deref(), Some("en-GB"));
        assert!(doc.metadata.created.is_some());

        let title = doc.paragraphs().next().unwrap();
        assert_eq!(title.plain_text(), "Title X");
        let run = title.runs().next().unwrap();
        assert_eq!(run.properties.font_name(), Some("Arial"));
        assert_eq!(run.properties.bold, Some(true));
        // A4 is not a whole number of twips, so compare what was stored.
        let (width, height) = config.page_dimensions();
        let page = doc.page_size().unwrap();
        assert_eq!(page.width.twips(), width.twips());
        assert_eq!(page.height.twips(), height.twips());
        assert!(doc
            .paragraphs()
            .skip(5)
            .step_by(2)
            .all(|p| p.style_id.as_deref() == ElementKind::Heading1.style_id()));
    }

    #[test]
    fn test_create_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("paper.docx");
        let registry = TemplateRegistry::builtin();
        let err = create("Title", &path, registry.default_config()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
    }
}
