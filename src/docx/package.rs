//! OPC package: the ZIP container holding the parts of a `.docx`.

use super::xml::{attr, local};
use crate::error::{Error, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Relationship type suffix of the main document part.
const REL_OFFICE_DOCUMENT: &str = "/officeDocument";
/// Relationship type suffix of the styles part.
const REL_STYLES: &str = "/styles";
/// Relationship type suffix of the core properties part.
const REL_CORE_PROPERTIES: &str = "/core-properties";

/// One part (file) inside the package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Part name without a leading slash, e.g. `word/document.xml`
    pub name: String,
    /// Part content
    pub data: Vec<u8>,
}

/// A `.docx` package. Part order is kept as read.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    /// Read a package from ZIP bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Read a package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part { name, data });
        }

        log::debug!("Read package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// A minimal package for a new document: content types, relationships,
    /// styles and document properties. The main document part is left for
    /// the caller to set.
    pub fn blank() -> Self {
        let mut package = Self::default();
        for (name, xml) in BLANK_PARTS {
            package.set_part(*name, xml.as_bytes().to_vec());
        }
        package
    }

    /// Get the content of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    /// Get the content of a part as UTF-8 text.
    pub fn part_str(&self, name: &str) -> Result<Option<&str>> {
        match self.part(name) {
            None => Ok(None),
            Some(data) => std::str::from_utf8(data)
                .map(Some)
                .map_err(|e| Error::Xml(format!("{} is not UTF-8: {}", name, e))),
        }
    }

    /// Check if a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    /// Replace a part, or append it when missing.
    pub fn set_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part { name, data }),
        }
    }

    /// Iterate over part names in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Get the number of parts.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Name of the main document part, from the package relationships.
    pub fn main_part_name(&self) -> Result<String> {
        Ok(self
            .related_part("", REL_OFFICE_DOCUMENT)?
            .unwrap_or_else(|| "word/document.xml".to_string()))
    }

    /// Name of the styles part belonging to `main`.
    pub fn styles_part_name(&self, main: &str) -> Result<Option<String>> {
        self.related_part(main, REL_STYLES)
    }

    /// Name of the core properties part.
    pub fn core_part_name(&self) -> Result<Option<String>> {
        self.related_part("", REL_CORE_PROPERTIES)
    }

    /// Resolve the target of the first relationship of `source` whose type
    /// ends with `type_suffix`. An empty source means the package itself.
    fn related_part(&self, source: &str, type_suffix: &str) -> Result<Option<String>> {
        let (dir, file) = split_part_name(source);
        let rels_name = if dir.is_empty() {
            format!("_rels/{}.rels", file)
        } else {
            format!("{}/_rels/{}.rels", dir, file)
        };
        let Some(xml) = self.part_str(&rels_name)? else {
            return Ok(None);
        };

        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if local(&e) == b"Relationship" => {
                    let matches = attr(&e, b"Type")?.is_some_and(|t| t.ends_with(type_suffix));
                    let external = attr(&e, b"TargetMode")?.as_deref() == Some("External");
                    if matches && !external {
                        if let Some(target) = attr(&e, b"Target")? {
                            return Ok(Some(resolve_target(dir, &target)));
                        }
                    }
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Add paragraph style definitions for any of `wanted` that the styles
    /// part does not define. Packages without a styles part are left alone.
    pub(crate) fn ensure_paragraph_styles(&mut self, styles_part: &str, wanted: &[&str]) -> Result<()> {
        let Some(xml) = self.part_str(styles_part)? else {
            return Ok(());
        };

        let defined = super::reader::parse_style_names(xml)?;
        let missing: String = wanted
            .iter()
            .filter(|id| !defined.contains_key(**id))
            .filter_map(|id| style_definition(id))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }

        let Some(end) = xml.rfind("</w:styles>") else {
            log::debug!("{} has no </w:styles> end tag, not adding styles", styles_part);
            return Ok(());
        };
        let mut updated = String::with_capacity(xml.len() + missing.len());
        updated.push_str(&xml[..end]);
        updated.push_str(&missing);
        updated.push_str(&xml[end..]);
        self.set_part(styles_part.to_string(), updated.into_bytes());
        Ok(())
    }

    /// Write the package as a ZIP archive.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<W> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for part in &self.parts {
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(&part.data)?;
        }
        Ok(zip.finish()?)
    }

    /// Write the package to a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }
}

fn split_part_name(name: &str) -> (&str, &str) {
    match name.rfind('/') {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => ("", name),
    }
}

/// Resolve a relationship target relative to the source part's directory.
fn resolve_target(dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

fn style_definition(id: &str) -> Option<String> {
    let (name, outline) = match id {
        "Title" => ("Title", None),
        "Heading1" => ("heading 1", Some(0)),
        "Heading2" => ("heading 2", Some(1)),
        "Heading3" => ("heading 3", Some(2)),
        "Caption" => ("caption", None),
        _ => return None,
    };
    let ppr = match outline {
        Some(level) => format!(
            "<w:pPr><w:keepNext/><w:keepLines/><w:outlineLvl w:val=\"{}\"/></w:pPr>",
            level
        ),
        None => String::new(),
    };
    Some(format!(
        "<w:style w:type=\"paragraph\" w:styleId=\"{id}\"><w:name w:val=\"{name}\"/>\
         <w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>{ppr}</w:style>"
    ))
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:outlineLvl w:val="0"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:outlineLvl w:val="1"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:keepLines/><w:outlineLvl w:val="2"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Caption"><w:name w:val="caption"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/></w:style><w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/><w:tblPr><w:tblInd w:w="0" w:type="dxa"/><w:tblCellMar><w:top w:w="0" w:type="dxa"/><w:left w:w="108" w:type="dxa"/><w:bottom w:w="0" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style></w:styles>"#;

const APP_PROPERTIES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>paperdoc</Application></Properties>"#;

const BLANK_PARTS: &[(&str, &str)] = &[
    ("[Content_Types].xml", CONTENT_TYPES),
    ("_rels/.rels", PACKAGE_RELS),
    ("word/_rels/document.xml.rels", DOCUMENT_RELS),
    ("word/styles.xml", STYLES),
    ("docProps/app.xml", APP_PROPERTIES),
];
