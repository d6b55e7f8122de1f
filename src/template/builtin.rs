//! Built-in journal templates.

use super::{CitationStyle, Locale, Margins, TemplateConfig};
use crate::model::PaperSize;

/// Key of the fallback template.
pub(crate) const DEFAULT_KEY: &str = "default";

struct Entry {
    key: &'static str,
    name: &'static str,
    font: &'static str,
    sizes: [f32; 5],
    line_spacing: f32,
    paper_size: PaperSize,
    language: Locale,
    citation_style: CitationStyle,
    csl: &'static str,
    sections: &'static [&'static str],
}

const TIMES: &str = "Times New Roman";

const ENTRIES: &[Entry] = &[
    Entry {
        key: DEFAULT_KEY,
        name: "Default (General Academic)",
        font: "Arial",
        sizes: [12.0, 16.0, 14.0, 12.0, 12.0],
        line_spacing: 1.5,
        paper_size: PaperSize::A4,
        language: Locale::EnGb,
        citation_style: CitationStyle::AuthorYear,
        csl: "https://www.zotero.org/styles/apa",
        sections: &[
            "Abstract",
            "Introduction",
            "Methods",
            "Results",
            "Discussion",
            "Conclusions",
            "Acknowledgements",
            "Data Availability",
            "Author Contributions",
            "Competing Interests",
            "References",
        ],
    },
    Entry {
        key: "agu",
        name: "American Geophysical Union (AGU)",
        font: TIMES,
        sizes: [12.0, 16.0, 14.0, 12.0, 12.0],
        line_spacing: 2.0,
        paper_size: PaperSize::Letter,
        language: Locale::EnUs,
        citation_style: CitationStyle::AuthorYear,
        csl: "https://www.zotero.org/styles/american-geophysical-union",
        sections: &[
            "Abstract",
            "Introduction",
            "Methods",
            "Results",
            "Discussion",
            "Conclusions",
            "Data Availability Statement",
            "Acknowledgments",
            "References",
        ],
    },
    Entry {
        key: "nature",
        name: "Nature",
        font: "Arial",
        sizes: [12.0, 14.0, 12.0, 12.0, 11.0],
        line_spacing: 2.0,
        paper_size: PaperSize::A4,
        language: Locale::EnGb,
        citation_style: CitationStyle::Numbered,
        csl: "https://www.zotero.org/styles/nature",
        sections: &[
            "Abstract",
            "Introduction",
            "Results",
            "Discussion",
            "Methods",
            "Data availability",
            "Code availability",
            "References",
            "Acknowledgements",
            "Author contributions",
            "Competing interests",
        ],
    },
    Entry {
        key: "science",
        name: "Science",
        font: TIMES,
        sizes: [12.0, 14.0, 12.0, 12.0, 11.0],
        line_spacing: 2.0,
        paper_size: PaperSize::Letter,
        language: Locale::EnUs,
        citation_style: CitationStyle::Numbered,
        csl: "https://www.zotero.org/styles/science",
        sections: &[
            "Abstract",
            "Introduction",
            "Results",
            "Discussion",
            "Materials and Methods",
            "References and Notes",
            "Acknowledgments",
            "Supplementary Materials",
        ],
    },
    Entry {
        key: "pnas",
        name: "Proceedings of the National Academy of Sciences (PNAS)",
        font: TIMES,
        sizes: [11.0, 13.0, 11.0, 11.0, 11.0],
        line_spacing: 2.0,
        paper_size: PaperSize::Letter,
        language: Locale::EnUs,
        citation_style: CitationStyle::Numbered,
        csl: "https://www.zotero.org/styles/pnas",
        sections: &[
            "Abstract",
            "Significance Statement",
            "Introduction",
            "Results",
            "Discussion",
            "Materials and Methods",
            "Acknowledgments",
            "References",
        ],
    },
];

/// Build the built-in template configs in display order.
pub(crate) fn templates() -> Vec<TemplateConfig> {
    ENTRIES
        .iter()
        .map(|e| {
            let [font_size, title, h1, h2, h3] = e.sizes;
            TemplateConfig {
                key: e.key.to_string(),
                name: e.name.to_string(),
                font: e.font.to_string(),
                font_size,
                title_size: Some(title),
                heading1_size: Some(h1),
                heading2_size: Some(h2),
                heading3_size: Some(h3),
                line_spacing: e.line_spacing,
                margins: Margins::default(),
                paper_size: e.paper_size,
                language: e.language,
                citation_style: e.citation_style,
                csl_style: e.csl.to_string(),
                sections: e.sections.iter().map(|s| s.to_string()).collect(),
            }
        })
        .collect()
}
