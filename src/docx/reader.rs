//! WordprocessingML parser for the main document, styles and core properties parts.
//!
//! Elements the model interprets are parsed into model types. Everything
//! else is sliced out of the source text and kept as [`RawXml`] so that it
//! is written back byte for byte.

use super::xml::{all_attrs, attr, local, local_string, num_attr, toggle, unexpected_eof};
use crate::error::{Error, Result};
use crate::model::{
    Alignment, Block, Border, BorderSet, BreakKind, CellProperties, Length, LineSpacing, Metadata,
    PageMargins, PageSize, Paragraph, ParagraphItem, RawXml, Run, RunContent, RunFonts,
    RunLanguage, RunProperties, SectionProperties, Table, TableCell, TableProperties, TableRow,
};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// Parsed content of `word/document.xml`.
#[derive(Debug, Default)]
pub(crate) struct ParsedBody {
    pub(crate) root_attributes: Vec<(String, String)>,
    pub(crate) body: Vec<Block>,
    pub(crate) section: SectionProperties,
}

/// Parse the main document part.
pub(crate) fn parse_document(xml: &str) -> Result<ParsedBody> {
    let mut parser = BodyParser::new(xml);
    let mut parsed = ParsedBody::default();

    loop {
        match parser.reader.read_event()? {
            Event::Start(e) => match local(&e) {
                b"document" => parsed.root_attributes = all_attrs(&e)?,
                b"body" => {
                    let content = parser.parse_container(b"body")?;
                    parsed.body = content.blocks;
                    parsed.section = content.section.unwrap_or_default();
                }
                _ => {
                    log::debug!("Skipping <{}> outside the body", local_string(&e));
                    parser.reader.read_to_end(e.name())?;
                }
            },
            Event::Empty(e) if local(&e) == b"document" => {
                parsed.root_attributes = all_attrs(&e)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if parsed.root_attributes.is_empty() {
        return Err(Error::UnsupportedFormat(
            "main document part has no <w:document> root".to_string(),
        ));
    }
    log::debug!("Parsed {} body blocks", parsed.body.len());
    Ok(parsed)
}

/// Content of a block container (`w:body` or `w:tc`).
#[derive(Default)]
struct Container {
    blocks: Vec<Block>,
    section: Option<SectionProperties>,
    cell: Option<CellProperties>,
}

struct BodyParser<'a> {
    reader: Reader<&'a [u8]>,
    src: &'a str,
}

impl<'a> BodyParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            reader: Reader::from_str(src),
            src,
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    /// Next child element of the current element, or None at its end tag.
    ///
    /// Returns the byte offset of the child's start tag and whether it has
    /// content (a start tag rather than an empty element).
    fn next_child(&mut self, parent: &[u8]) -> Result<Option<(usize, BytesStart<'a>, bool)>> {
        loop {
            let start = self.position();
            match self.reader.read_event()? {
                Event::Start(e) => return Ok(Some((start, e, true))),
                Event::Empty(e) => return Ok(Some((start, e, false))),
                Event::End(_) => return Ok(None),
                Event::Eof => return Err(unexpected_eof(parent)),
                _ => {}
            }
        }
    }

    /// Skip the content of an element whose start tag was just read.
    fn finish(&mut self, e: &BytesStart<'_>, open: bool) -> Result<()> {
        if open {
            self.reader.read_to_end(e.name())?;
        }
        Ok(())
    }

    /// Capture an element verbatim, from its start tag through its end tag.
    fn raw(&mut self, start: usize, e: &BytesStart<'_>, open: bool) -> Result<RawXml> {
        self.finish(e, open)?;
        Ok(RawXml::new(
            local_string(e),
            &self.src[start..self.position()],
        ))
    }

    fn skip(&mut self, e: &BytesStart<'_>, open: bool, parent: &str) -> Result<()> {
        log::debug!("Dropping <{}> inside <{}>", local_string(e), parent);
        self.finish(e, open)
    }

    fn parse_container(&mut self, end: &[u8]) -> Result<Container> {
        let mut container = Container::default();
        while let Some((start, e, open)) = self.next_child(end)? {
            match local(&e) {
                b"p" => {
                    let p = self.parse_paragraph(&e, open)?;
                    container.blocks.push(Block::Paragraph(p));
                }
                b"tbl" if open => {
                    let table = self.parse_table()?;
                    container.blocks.push(Block::Table(table));
                }
                b"sectPr" => container.section = Some(self.parse_section(open)?),
                b"tcPr" => container.cell = Some(self.parse_cell_properties(open)?),
                _ => container.blocks.push(Block::Raw(self.raw(start, &e, open)?)),
            }
        }
        Ok(container)
    }

    fn parse_paragraph(&mut self, e: &BytesStart<'_>, open: bool) -> Result<Paragraph> {
        let mut p = Paragraph {
            attributes: all_attrs(e)?,
            ..Default::default()
        };
        if !open {
            return Ok(p);
        }

        while let Some((start, e, open)) = self.next_child(b"p")? {
            match local(&e) {
                b"pPr" if open => self.parse_paragraph_properties(&mut p)?,
                b"pPr" => {}
                b"r" => {
                    let run = self.parse_run(&e, open)?;
                    p.items.push(ParagraphItem::Run(run));
                }
                b"hyperlink" => {
                    let attributes = all_attrs(&e)?;
                    let runs = if open { self.parse_hyperlink()? } else { Vec::new() };
                    p.items.push(ParagraphItem::Hyperlink { attributes, runs });
                }
                _ => p.items.push(ParagraphItem::Raw(self.raw(start, &e, open)?)),
            }
        }
        Ok(p)
    }

    fn parse_hyperlink(&mut self) -> Result<Vec<Run>> {
        let mut runs = Vec::new();
        while let Some((_, e, open)) = self.next_child(b"hyperlink")? {
            match local(&e) {
                b"r" => runs.push(self.parse_run(&e, open)?),
                _ => self.skip(&e, open, "hyperlink")?,
            }
        }
        Ok(runs)
    }

    fn parse_paragraph_properties(&mut self, p: &mut Paragraph) -> Result<()> {
        while let Some((start, e, open)) = self.next_child(b"pPr")? {
            match local(&e) {
                b"pStyle" => {
                    p.style_id = attr(&e, b"val")?;
                    self.finish(&e, open)?;
                }
                b"jc" => {
                    let value = attr(&e, b"val")?.unwrap_or_default();
                    match Alignment::from_ooxml(&value) {
                        Some(alignment) => {
                            p.format.alignment = Some(alignment);
                            self.finish(&e, open)?;
                        }
                        None => p.format.extra.push(self.raw(start, &e, open)?),
                    }
                }
                b"spacing" => {
                    p.format.space_before = num_attr(&e, b"before")?.map(Length::from_twips);
                    p.format.space_after = num_attr(&e, b"after")?.map(Length::from_twips);
                    p.format.line_spacing = line_spacing(&e)?;
                    self.finish(&e, open)?;
                }
                b"sectPr" => {
                    let section = self.parse_section(open)?;
                    p.format.section = Some(Box::new(section));
                }
                _ => p.format.extra.push(self.raw(start, &e, open)?),
            }
        }
        Ok(())
    }

    fn parse_run(&mut self, e: &BytesStart<'_>, open: bool) -> Result<Run> {
        let mut run = Run {
            attributes: all_attrs(e)?,
            ..Default::default()
        };
        if !open {
            return Ok(run);
        }

        while let Some((start, e, open)) = self.next_child(b"r")? {
            match local(&e) {
                b"rPr" if open => run.properties = self.parse_run_properties()?,
                b"rPr" => {}
                b"t" => {
                    let text = if open {
                        let raw = self.reader.read_text(e.name())?;
                        quick_xml::escape::unescape(&raw)
                            .map_err(|err| Error::Xml(err.to_string()))?
                            .into_owned()
                    } else {
                        String::new()
                    };
                    run.content.push(RunContent::Text(text));
                }
                b"tab" => {
                    run.content.push(RunContent::Tab);
                    self.finish(&e, open)?;
                }
                b"br" | b"cr" => {
                    let kind = match attr(&e, b"type")?.as_deref() {
                        Some("page") => BreakKind::Page,
                        Some("column") => BreakKind::Column,
                        _ => BreakKind::Line,
                    };
                    run.content.push(RunContent::Break(kind));
                    self.finish(&e, open)?;
                }
                _ => run.content.push(RunContent::Raw(self.raw(start, &e, open)?)),
            }
        }
        Ok(run)
    }

    fn parse_run_properties(&mut self) -> Result<RunProperties> {
        let mut props = RunProperties::default();
        while let Some((start, e, open)) = self.next_child(b"rPr")? {
            match local(&e) {
                b"rStyle" => props.style_id = attr(&e, b"val")?,
                b"rFonts" => props.fonts = Some(run_fonts(&e)?),
                b"b" => props.bold = Some(toggle(&e)?),
                b"i" => props.italic = Some(toggle(&e)?),
                // Derived from b, i and sz when written.
                b"bCs" | b"iCs" | b"szCs" => {}
                b"u" => {
                    props.underline =
                        Some(attr(&e, b"val")?.unwrap_or_else(|| "single".to_string()));
                }
                b"color" => props.color = attr(&e, b"val")?,
                b"sz" => {
                    props.size = num_attr(&e, b"val")?.map(|half_points| half_points as f32 / 2.0);
                }
                b"lang" => {
                    props.language = Some(RunLanguage {
                        latin: attr(&e, b"val")?,
                        east_asia: attr(&e, b"eastAsia")?,
                        bidi: attr(&e, b"bidi")?,
                    });
                }
                _ => {
                    props.extra.push(self.raw(start, &e, open)?);
                    continue;
                }
            }
            self.finish(&e, open)?;
        }
        Ok(props)
    }

    fn parse_section(&mut self, open: bool) -> Result<SectionProperties> {
        let mut section = SectionProperties::default();
        if !open {
            return Ok(section);
        }

        while let Some((start, e, open)) = self.next_child(b"sectPr")? {
            match local(&e) {
                b"pgSz" => {
                    let width = num_attr(&e, b"w")?.map(Length::from_twips);
                    let height = num_attr(&e, b"h")?.map(Length::from_twips);
                    if let (Some(width), Some(height)) = (width, height) {
                        section.page_size = Some(PageSize {
                            width,
                            height,
                            landscape: attr(&e, b"orient")?.as_deref() == Some("landscape"),
                        });
                    }
                    self.finish(&e, open)?;
                }
                b"pgMar" => {
                    let defaults = PageMargins::default();
                    let edge = |name: &[u8], fallback: Length| -> Result<Length> {
                        Ok(num_attr(&e, name)?.map(Length::from_twips).unwrap_or(fallback))
                    };
                    section.margins = Some(PageMargins {
                        top: edge(b"top", defaults.top)?,
                        right: edge(b"right", defaults.right)?,
                        bottom: edge(b"bottom", defaults.bottom)?,
                        left: edge(b"left", defaults.left)?,
                        header: edge(b"header", defaults.header)?,
                        footer: edge(b"footer", defaults.footer)?,
                        gutter: edge(b"gutter", defaults.gutter)?,
                    });
                    self.finish(&e, open)?;
                }
                _ => section.extra.push(self.raw(start, &e, open)?),
            }
        }
        Ok(section)
    }

    fn parse_table(&mut self) -> Result<Table> {
        let mut table = Table::default();
        while let Some((start, e, open)) = self.next_child(b"tbl")? {
            match local(&e) {
                b"tblPr" => table.properties = self.parse_table_properties(open)?,
                b"tblGrid" => table.grid = Some(self.raw(start, &e, open)?),
                b"tr" => table.rows.push(self.parse_row(open)?),
                _ => self.skip(&e, open, "tbl")?,
            }
        }
        Ok(table)
    }

    fn parse_table_properties(&mut self, open: bool) -> Result<TableProperties> {
        let mut props = TableProperties::default();
        if !open {
            return Ok(props);
        }
        while let Some((start, e, open)) = self.next_child(b"tblPr")? {
            match local(&e) {
                b"tblStyle" => {
                    props.style_id = attr(&e, b"val")?;
                    self.finish(&e, open)?;
                }
                b"tblBorders" => props.borders = Some(self.parse_borders(open)?),
                _ => props.extra.push(self.raw(start, &e, open)?),
            }
        }
        Ok(props)
    }

    fn parse_row(&mut self, open: bool) -> Result<TableRow> {
        let mut row = TableRow::default();
        if !open {
            return Ok(row);
        }
        while let Some((start, e, open)) = self.next_child(b"tr")? {
            match local(&e) {
                b"trPr" | b"tblPrEx" => row.properties.push(self.raw(start, &e, open)?),
                b"tc" => {
                    let content = if open {
                        self.parse_container(b"tc")?
                    } else {
                        Container::default()
                    };
                    row.cells.push(TableCell {
                        properties: content.cell.unwrap_or_default(),
                        blocks: content.blocks,
                    });
                }
                _ => self.skip(&e, open, "tr")?,
            }
        }
        Ok(row)
    }

    fn parse_cell_properties(&mut self, open: bool) -> Result<CellProperties> {
        let mut props = CellProperties::default();
        if !open {
            return Ok(props);
        }
        while let Some((start, e, open)) = self.next_child(b"tcPr")? {
            match local(&e) {
                b"tcBorders" => props.borders = Some(self.parse_borders(open)?),
                _ => props.extra.push(self.raw(start, &e, open)?),
            }
        }
        Ok(props)
    }

    fn parse_borders(&mut self, open: bool) -> Result<BorderSet> {
        let mut borders = BorderSet::default();
        if !open {
            return Ok(borders);
        }
        while let Some((_, e, open)) = self.next_child(b"borders")? {
            let border = Border {
                style: attr(&e, b"val")?.unwrap_or_else(|| "none".to_string()),
                size: num_attr(&e, b"sz")?
                    .and_then(|s| u32::try_from(s).ok())
                    .unwrap_or(0),
                color: attr(&e, b"color")?.unwrap_or_else(|| "auto".to_string()),
            };
            match local(&e) {
                b"top" => borders.top = Some(border),
                b"left" | b"start" => borders.left = Some(border),
                b"bottom" => borders.bottom = Some(border),
                b"right" | b"end" => borders.right = Some(border),
                b"insideH" => borders.inside_h = Some(border),
                b"insideV" => borders.inside_v = Some(border),
                _ => log::debug!("Dropping diagonal border <{}>", local_string(&e)),
            }
            self.finish(&e, open)?;
        }
        Ok(borders)
    }
}

fn line_spacing(e: &BytesStart<'_>) -> Result<Option<LineSpacing>> {
    let Some(line) = num_attr(e, b"line")? else {
        return Ok(None);
    };
    Ok(Some(match attr(e, b"lineRule")?.as_deref() {
        Some("exact") => LineSpacing::Exact(Length::from_twips(line)),
        Some("atLeast") => LineSpacing::AtLeast(Length::from_twips(line)),
        _ => LineSpacing::Multiple(line as f32 / 240.0),
    }))
}

fn run_fonts(e: &BytesStart<'_>) -> Result<RunFonts> {
    let mut fonts = RunFonts::default();
    for (key, value) in all_attrs(e)? {
        let name = key.rsplit(':').next().unwrap_or(key.as_str());
        match name {
            "ascii" => fonts.ascii = Some(value),
            "hAnsi" => fonts.high_ansi = Some(value),
            "eastAsia" => fonts.east_asia = Some(value),
            "cs" => fonts.complex = Some(value),
            _ => fonts.other.push((key, value)),
        }
    }
    Ok(fonts)
}

/// Map style ids to display names from `word/styles.xml`.
pub(crate) fn parse_style_names(xml: &str) -> Result<BTreeMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut names = BTreeMap::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if local(&e) == b"style" => current = attr(&e, b"styleId")?,
            Event::Start(e) | Event::Empty(e) if local(&e) == b"name" => {
                if let (Some(id), Some(name)) = (current.as_ref(), attr(&e, b"val")?) {
                    names.insert(id.clone(), name);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"style" => current = None,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(names)
}

/// Read title, creator, language and dates from `docProps/core.xml`.
pub(crate) fn parse_core_properties(xml: &str) -> Result<Metadata> {
    let mut reader = Reader::from_str(xml);
    let mut metadata = Metadata::default();

    loop {
        match reader.read_event()? {
            Event::Start(e)
                if matches!(
                    local(&e),
                    b"title" | b"creator" | b"language" | b"created" | b"modified"
                ) =>
            {
                let field = local(&e).to_vec();
                let raw = reader.read_text(e.name())?;
                let text = quick_xml::escape::unescape(&raw)
                    .map_err(|err| Error::Xml(err.to_string()))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                match field.as_slice() {
                    b"title" => metadata.title = Some(text),
                    b"creator" => metadata.creator = Some(text),
                    b"language" => metadata.language = Some(text),
                    b"created" => metadata.created = parse_timestamp(&text),
                    b"modified" => metadata.modified = parse_timestamp(&text),
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(metadata)
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
