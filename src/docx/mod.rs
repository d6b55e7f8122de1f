//! Reading and writing `.docx` files.
//!
//! A [`Docx`] pairs the parsed main document with the package it came
//! from. Only the main document part and the core properties are rewritten
//! on save; every other part goes back out unchanged.

mod package;
mod reader;
mod writer;
mod xml;

pub use package::{Package, Part};

use crate::error::{Error, Result};
use crate::model::{Document, ElementKind, Metadata};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Paragraph styles the formatter assigns.
const FORMATTER_STYLES: [ElementKind; 5] = [
    ElementKind::Title,
    ElementKind::Heading1,
    ElementKind::Heading2,
    ElementKind::Heading3,
    ElementKind::TableCaption,
];

/// A `.docx` file: the document model plus its package.
#[derive(Debug, Clone)]
pub struct Docx {
    /// The main document
    pub document: Document,
    package: Package,
    main_part: String,
    /// Metadata as read, so unchanged core properties are not rewritten
    loaded_metadata: Option<Metadata>,
}

impl Docx {
    /// Wrap a document in a new blank package.
    pub fn new(document: Document) -> Self {
        Self {
            document,
            package: Package::blank(),
            main_part: "word/document.xml".to_string(),
            loaded_metadata: None,
        }
    }

    /// Open a `.docx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }
        log::debug!("Opening {}", path.display());
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Parse a `.docx` from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !crate::detect::is_zip(data) {
            return Err(Error::UnsupportedFormat(
                "not a .docx package (missing ZIP signature)".to_string(),
            ));
        }
        let package = Package::from_bytes(data)?;
        let main_part = package.main_part_name()?;

        let Some(xml) = package.part_str(&main_part)? else {
            return Err(Error::UnsupportedFormat(format!(
                "package has no main document part ({})",
                main_part
            )));
        };
        let parsed = reader::parse_document(xml)?;

        let style_names = match package.styles_part_name(&main_part)? {
            Some(name) => match package.part_str(&name)? {
                Some(styles) => reader::parse_style_names(styles)?,
                None => Default::default(),
            },
            None => Default::default(),
        };
        let metadata = match package.core_part_name()? {
            Some(name) => match package.part_str(&name)? {
                Some(core) => reader::parse_core_properties(core)?,
                None => Default::default(),
            },
            None => Default::default(),
        };

        let document = Document {
            metadata: metadata.clone(),
            body: parsed.body,
            section: parsed.section,
            style_names,
            root_attributes: parsed.root_attributes,
        };
        Ok(Self {
            document,
            package,
            main_part,
            loaded_metadata: Some(metadata),
        })
    }

    /// The underlying package.
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Consume and return the document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Serialize to `.docx` bytes.
    ///
    /// Styles the document references but the package does not define are
    /// added to the styles part first.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.sync_parts()?;
        self.package.to_bytes()
    }

    /// Write to `path` through a temporary file in the same directory, so a
    /// failed save leaves any existing file untouched.
    ///
    /// An existing file keeps its permissions; a new one gets the same
    /// permissions a plainly created file would.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let existing = fs::metadata(path)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.permissions());

        let mut builder = tempfile::Builder::new();
        builder.prefix(".paperdoc-");
        #[cfg(unix)]
        {
            // Masked by the umask, like File::create.
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut tmp = builder
            .tempfile_in(dir)
            .map_err(|e| Error::write_failure(path, e))?;
        tmp.write_all(&bytes)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::write_failure(path, e))?;

        if let Some(permissions) = existing {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| Error::write_failure(path, e))?;
        }

        tmp.persist(path)
            .map_err(|e| Error::write_failure(path, e.error))?;
        log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    fn sync_parts(&mut self) -> Result<()> {
        let xml = writer::write_document(&self.document);
        self.package.set_part(self.main_part.clone(), xml.into_bytes());

        let core = self
            .package
            .core_part_name()?
            .unwrap_or_else(|| "docProps/core.xml".to_string());
        if self.loaded_metadata.as_ref() != Some(&self.document.metadata) {
            let xml = writer::write_core_properties(&self.document.metadata);
            self.package.set_part(core, xml.into_bytes());
        }

        if let Some(styles) = self.package.styles_part_name(&self.main_part)? {
            let wanted: Vec<&str> = FORMATTER_STYLES
                .iter()
                .filter_map(|kind| kind.style_id())
                .filter(|id| self.document_uses_style(id))
                .collect();
            self.package.ensure_paragraph_styles(&styles, &wanted)?;
            for id in wanted {
                self.document
                    .style_names
                    .entry(id.to_string())
                    .or_insert_with(|| default_style_name(id).to_string());
            }
        }
        Ok(())
    }

    fn document_uses_style(&self, id: &str) -> bool {
        self.document
            .paragraphs()
            .any(|p| p.style_id.as_deref() == Some(id))
    }
}

fn default_style_name(id: &str) -> &str {
    match id {
        "Heading1" => "heading 1",
        "Heading2" => "heading 2",
        "Heading3" => "heading 3",
        "Caption" => "caption",
        other => other,
    }
}
