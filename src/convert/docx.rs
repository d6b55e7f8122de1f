//! Re-formatting an existing `.docx`.

use super::{ConvertOptions, Translator};
use crate::detect::SourceFormat;
use crate::docx::Docx;
use crate::error::Result;
use crate::template::TemplateConfig;
use std::path::Path;

/// Translator that loads a `.docx` package as it is.
#[derive(Debug, Clone, Default)]
pub struct DocxTranslator {
    _private: (),
}

impl DocxTranslator {
    /// Create a new docx translator.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Translator for DocxTranslator {
    fn supported_extensions(&self) -> &[&str] {
        SourceFormat::Docx.extensions()
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn translate(&self, source: &Path, _: &ConvertOptions, _: &TemplateConfig) -> Result<Docx> {
        Docx::open(source)
    }
}
