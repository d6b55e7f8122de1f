//! WordprocessingML serializer for the document model.

use super::xml::{
    Ordered, XmlBuf, NS_R, NS_W, PPR_ORDER, RPR_ORDER, SECTPR_ORDER, TBLPR_ORDER, TCPR_ORDER,
};
use crate::model::{
    Block, Border, BorderSet, BreakKind, CellProperties, Document, LineSpacing, Metadata,
    Paragraph, ParagraphFormat, ParagraphItem, Run, RunContent, RunProperties, SectionProperties,
    Table, TableCell, TableProperties,
};

/// Width used for generated column grids, in twips (6.25in).
const DEFAULT_GRID_WIDTH: i64 = 9000;

/// Serialize the main document part.
pub(crate) fn write_document(doc: &Document) -> String {
    let mut out = XmlBuf::new();
    out.declaration();

    let mut root: Vec<(&str, &str)> = doc
        .root_attributes
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    if !root.iter().any(|(k, _)| *k == "xmlns:w") {
        root.insert(0, ("xmlns:w", NS_W));
    }
    if !root.iter().any(|(k, _)| *k == "xmlns:r") {
        root.push(("xmlns:r", NS_R));
    }

    out.open_with("w:document", root);
    out.open("w:body");
    write_blocks(&mut out, &doc.body);
    write_section(&mut out, &doc.section);
    out.close("w:body");
    out.close("w:document");
    out.into_string()
}

fn write_blocks(out: &mut XmlBuf, blocks: &[Block]) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => write_paragraph(out, p),
            Block::Table(t) => write_table(out, t),
            Block::Raw(raw) => out.raw(&raw.xml),
        }
    }
}

fn pairs(attrs: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

fn write_paragraph(out: &mut XmlBuf, p: &Paragraph) {
    out.open_with("w:p", pairs(&p.attributes));
    write_paragraph_properties(out, p.style_id.as_deref(), &p.format);

    for item in &p.items {
        match item {
            ParagraphItem::Run(run) => write_run(out, run),
            ParagraphItem::Hyperlink { attributes, runs } => {
                out.open_with("w:hyperlink", pairs(attributes));
                for run in runs {
                    write_run(out, run);
                }
                out.close("w:hyperlink");
            }
            ParagraphItem::Raw(raw) => out.raw(&raw.xml),
        }
    }
    out.close("w:p");
}

fn write_paragraph_properties(out: &mut XmlBuf, style_id: Option<&str>, format: &ParagraphFormat) {
    let mut props = Ordered::new(PPR_ORDER);

    if let Some(style) = style_id {
        props.push("pStyle", |b| b.empty_with("w:pStyle", [("w:val", style)]));
    }

    let before = format.space_before.map(|l| l.twips().to_string());
    let after = format.space_after.map(|l| l.twips().to_string());
    let line = format.line_spacing.map(|spacing| match spacing {
        LineSpacing::Multiple(m) => (((m * 240.0).round() as i64).to_string(), "auto"),
        LineSpacing::Exact(l) => (l.twips().to_string(), "exact"),
        LineSpacing::AtLeast(l) => (l.twips().to_string(), "atLeast"),
    });
    if before.is_some() || after.is_some() || line.is_some() {
        props.push("spacing", |b| {
            let mut attrs = Vec::new();
            if let Some(v) = &before {
                attrs.push(("w:before", v.as_str()));
            }
            if let Some(v) = &after {
                attrs.push(("w:after", v.as_str()));
            }
            if let Some((v, rule)) = &line {
                attrs.push(("w:line", v.as_str()));
                attrs.push(("w:lineRule", *rule));
            }
            b.empty_with("w:spacing", attrs);
        });
    }

    if let Some(alignment) = format.alignment {
        props.push("jc", |b| b.empty_with("w:jc", [("w:val", alignment.as_ooxml())]));
    }
    if let Some(section) = &format.section {
        props.push("sectPr", |b| write_section(b, section));
    }
    for raw in &format.extra {
        props.push_raw(&raw.name, &raw.xml);
    }
    props.write("w:pPr", out);
}

fn write_run(out: &mut XmlBuf, run: &Run) {
    out.open_with("w:r", pairs(&run.attributes));
    write_run_properties(out, &run.properties);

    for content in &run.content {
        match content {
            RunContent::Text(text) => {
                out.open_with("w:t", [("xml:space", "preserve")]);
                out.text(text);
                out.close("w:t");
            }
            RunContent::Tab => out.empty("w:tab"),
            RunContent::Break(BreakKind::Line) => out.empty("w:br"),
            RunContent::Break(BreakKind::Page) => out.empty_with("w:br", [("w:type", "page")]),
            RunContent::Break(BreakKind::Column) => {
                out.empty_with("w:br", [("w:type", "column")])
            }
            RunContent::Raw(raw) => out.raw(&raw.xml),
        }
    }
    out.close("w:r");
}

fn on_off(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn write_run_properties(out: &mut XmlBuf, rpr: &RunProperties) {
    let mut props = Ordered::new(RPR_ORDER);

    if let Some(style) = &rpr.style_id {
        props.push("rStyle", |b| b.empty_with("w:rStyle", [("w:val", style.as_str())]));
    }
    if let Some(fonts) = &rpr.fonts {
        props.push("rFonts", |b| {
            let mut attrs = Vec::new();
            for (key, value) in [
                ("w:ascii", &fonts.ascii),
                ("w:hAnsi", &fonts.high_ansi),
                ("w:eastAsia", &fonts.east_asia),
                ("w:cs", &fonts.complex),
            ] {
                if let Some(v) = value {
                    attrs.push((key, v.as_str()));
                }
            }
            attrs.extend(pairs(&fonts.other));
            b.empty_with("w:rFonts", attrs);
        });
    }
    if let Some(bold) = rpr.bold {
        props.push("b", |b| b.empty_with("w:b", [("w:val", on_off(bold))]));
        props.push("bCs", |b| b.empty_with("w:bCs", [("w:val", on_off(bold))]));
    }
    if let Some(italic) = rpr.italic {
        props.push("i", |b| b.empty_with("w:i", [("w:val", on_off(italic))]));
        props.push("iCs", |b| b.empty_with("w:iCs", [("w:val", on_off(italic))]));
    }
    if let Some(color) = &rpr.color {
        props.push("color", |b| b.empty_with("w:color", [("w:val", color.as_str())]));
    }
    if let Some(size) = rpr.size {
        let half_points = ((size * 2.0).round() as i64).to_string();
        props.push("sz", |b| b.empty_with("w:sz", [("w:val", half_points.as_str())]));
        props.push("szCs", |b| b.empty_with("w:szCs", [("w:val", half_points.as_str())]));
    }
    if let Some(underline) = &rpr.underline {
        props.push("u", |b| b.empty_with("w:u", [("w:val", underline.as_str())]));
    }
    if let Some(lang) = &rpr.language {
        props.push("lang", |b| {
            let mut attrs = Vec::new();
            if let Some(v) = &lang.latin {
                attrs.push(("w:val", v.as_str()));
            }
            if let Some(v) = &lang.east_asia {
                attrs.push(("w:eastAsia", v.as_str()));
            }
            if let Some(v) = &lang.bidi {
                attrs.push(("w:bidi", v.as_str()));
            }
            b.empty_with("w:lang", attrs);
        });
    }
    for raw in &rpr.extra {
        props.push_raw(&raw.name, &raw.xml);
    }
    props.write("w:rPr", out);
}

fn write_section(out: &mut XmlBuf, section: &SectionProperties) {
    let mut props = Ordered::new(SECTPR_ORDER);

    if let Some(size) = section.page_size {
        let w = size.width.twips().to_string();
        let h = size.height.twips().to_string();
        props.push("pgSz", |b| {
            let mut attrs = vec![("w:w", w.as_str()), ("w:h", h.as_str())];
            if size.landscape {
                attrs.push(("w:orient", "landscape"));
            }
            b.empty_with("w:pgSz", attrs);
        });
    }
    if let Some(m) = section.margins {
        let values = [
            ("w:top", m.top),
            ("w:right", m.right),
            ("w:bottom", m.bottom),
            ("w:left", m.left),
            ("w:header", m.header),
            ("w:footer", m.footer),
            ("w:gutter", m.gutter),
        ]
        .map(|(key, len)| (key, len.twips().to_string()));
        props.push("pgMar", |b| {
            b.empty_with("w:pgMar", values.iter().map(|(k, v)| (*k, v.as_str())));
        });
    }
    for raw in &section.extra {
        props.push_raw(&raw.name, &raw.xml);
    }

    // An empty sectPr is still meaningful: it resets the section to defaults.
    let mut inner = XmlBuf::new();
    props.write("w:sectPr", &mut inner);
    if inner.is_empty() {
        out.empty("w:sectPr");
    } else {
        out.raw(&inner.into_string());
    }
}

fn write_table(out: &mut XmlBuf, table: &Table) {
    out.open("w:tbl");
    write_table_properties(out, &table.properties);

    match &table.grid {
        Some(grid) => out.raw(&grid.xml),
        None => {
            let columns = table.rows.iter().map(|r| r.cells.len()).max().unwrap_or(1).max(1);
            let width = (DEFAULT_GRID_WIDTH / columns as i64).to_string();
            out.open("w:tblGrid");
            for _ in 0..columns {
                out.empty_with("w:gridCol", [("w:w", width.as_str())]);
            }
            out.close("w:tblGrid");
        }
    }

    for row in &table.rows {
        out.open("w:tr");
        for raw in &row.properties {
            out.raw(&raw.xml);
        }
        for cell in &row.cells {
            write_cell(out, cell);
        }
        out.close("w:tr");
    }
    out.close("w:tbl");
}

fn write_table_properties(out: &mut XmlBuf, tpr: &TableProperties) {
    let mut props = Ordered::new(TBLPR_ORDER);
    if let Some(style) = &tpr.style_id {
        props.push("tblStyle", |b| b.empty_with("w:tblStyle", [("w:val", style.as_str())]));
    }
    if let Some(borders) = &tpr.borders {
        props.push("tblBorders", |b| write_borders(b, "w:tblBorders", borders));
    }
    for raw in &tpr.extra {
        props.push_raw(&raw.name, &raw.xml);
    }
    // tblPr is required, so write an empty one when there is nothing to say.
    let mut inner = XmlBuf::new();
    props.write("w:tblPr", &mut inner);
    if inner.is_empty() {
        out.empty("w:tblPr");
    } else {
        out.raw(&inner.into_string());
    }
}

fn write_cell(out: &mut XmlBuf, cell: &TableCell) {
    out.open("w:tc");
    write_cell_properties(out, &cell.properties);
    write_blocks(out, &cell.blocks);
    if !matches!(cell.blocks.last(), Some(Block::Paragraph(_))) {
        out.empty("w:p");
    }
    out.close("w:tc");
}

fn write_cell_properties(out: &mut XmlBuf, tcpr: &CellProperties) {
    let mut props = Ordered::new(TCPR_ORDER);
    if let Some(borders) = &tcpr.borders {
        props.push("tcBorders", |b| write_borders(b, "w:tcBorders", borders));
    }
    for raw in &tcpr.extra {
        props.push_raw(&raw.name, &raw.xml);
    }
    props.write("w:tcPr", out);
}

fn write_borders(out: &mut XmlBuf, name: &str, borders: &BorderSet) {
    out.open(name);
    for (edge, border) in [
        ("w:top", &borders.top),
        ("w:left", &borders.left),
        ("w:bottom", &borders.bottom),
        ("w:right", &borders.right),
        ("w:insideH", &borders.inside_h),
        ("w:insideV", &borders.inside_v),
    ] {
        if let Some(border) = border {
            write_border(out, edge, border);
        }
    }
    out.close(name);
}

fn write_border(out: &mut XmlBuf, edge: &str, border: &Border) {
    let size = border.size.to_string();
    out.empty_with(
        edge,
        [
            ("w:val", border.style.as_str()),
            ("w:sz", size.as_str()),
            ("w:space", "0"),
            ("w:color", border.color.as_str()),
        ],
    );
}

/// Serialize `docProps/core.xml`.
pub(crate) fn write_core_properties(metadata: &Metadata) -> String {
    let mut out = XmlBuf::new();
    out.declaration();
    out.open_with(
        "cp:coreProperties",
        [
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    );

    for (name, value) in [
        ("dc:title", &metadata.title),
        ("dc:creator", &metadata.creator),
        ("dc:language", &metadata.language),
    ] {
        if let Some(value) = value {
            out.open(name);
            out.text(value);
            out.close(name);
        }
    }
    for (name, value) in [
        ("dcterms:created", metadata.created),
        ("dcterms:modified", metadata.modified),
    ] {
        if let Some(value) = value {
            out.open_with(name, [("xsi:type", "dcterms:W3CDTF")]);
            out.text(&value.format("%Y-%m-%dT%H:%M:%SZ").to_string());
            out.close(name);
        }
    }

    out.close("cp:coreProperties");
    out.into_string()
}
