//! Small helpers shared by the WordprocessingML reader and writer.

use crate::error::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::BytesStart;

/// Namespace of the main WordprocessingML vocabulary.
pub(crate) const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// Namespace of relationship references.
pub(crate) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Schema order of `w:pPr` children.
pub(crate) const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl", "numPr",
    "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens", "kinsoku", "wordWrap",
    "overflowPunct", "topLinePunct", "autoSpaceDE", "autoSpaceDN", "bidi", "adjustRightInd",
    "snapToGrid", "spacing", "ind", "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc",
    "textDirection", "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

/// Schema order of `w:rPr` children.
pub(crate) const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike", "dstrike",
    "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid", "vanish", "webHidden",
    "color", "spacing", "w", "kern", "position", "sz", "szCs", "highlight", "u", "effect", "bdr",
    "shd", "fitText", "vertAlign", "rtl", "cs", "em", "lang", "eastAsianLayout", "specVanish",
    "oMath",
];

/// Schema order of `w:sectPr` children.
pub(crate) const SECTPR_ORDER: &[&str] = &[
    "headerReference", "footerReference", "footnotePr", "endnotePr", "type", "pgSz", "pgMar",
    "paperSrc", "pgBorders", "lnNumType", "pgNumType", "cols", "formProt", "vAlign", "noEndnote",
    "titlePg", "textDirection", "bidi", "rtlGutter", "docGrid", "printerSettings", "sectPrChange",
];

/// Schema order of `w:tblPr` children.
pub(crate) const TBLPR_ORDER: &[&str] = &[
    "tblStyle", "tblpPr", "tblOverlap", "bidiVisual", "tblStyleRowBandSize",
    "tblStyleColBandSize", "tblW", "jc", "tblCellSpacing", "tblInd", "tblBorders", "shd",
    "tblLayout", "tblCellMar", "tblLook", "tblCaption", "tblDescription", "tblPrChange",
];

/// Schema order of `w:tcPr` children.
pub(crate) const TCPR_ORDER: &[&str] = &[
    "cnfStyle", "tcW", "gridSpan", "hMerge", "vMerge", "tcBorders", "shd", "noWrap", "tcMar",
    "textDirection", "tcFitText", "vAlign", "hideMark", "headers", "cellIns", "cellDel",
    "cellMerge", "tcPrChange",
];

/// Local name of an element as a byte slice.
pub(crate) fn local<'b>(e: &'b BytesStart<'_>) -> &'b [u8] {
    e.local_name().into_inner()
}

/// Local name of an element as a string.
pub(crate) fn local_string(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(local(e)).into_owned()
}

/// Value of the attribute with the given local name, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for a in e.attributes() {
        let a = a?;
        if a.key.local_name().as_ref() == name {
            return Ok(Some(a.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Every attribute with its qualified name, unescaped.
pub(crate) fn all_attrs(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    e.attributes()
        .map(|a| {
            let a = a?;
            let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
            let value = a.unescape_value()?.into_owned();
            Ok((key, value))
        })
        .collect()
}

/// Numeric attribute, tolerating decimal notation. Unparseable values are ignored.
pub(crate) fn num_attr(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<i64>> {
    Ok(attr(e, name)?.and_then(|v| match v.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n.round() as i64),
        _ => {
            log::debug!("Ignoring non-numeric attribute value '{}'", v);
            None
        }
    }))
}

/// On/off property such as `<w:b/>` or `<w:b w:val="0"/>`.
pub(crate) fn toggle(e: &BytesStart<'_>) -> Result<bool> {
    Ok(match attr(e, b"val")? {
        None => true,
        Some(v) => !matches!(v.as_str(), "0" | "false" | "off" | "none"),
    })
}

pub(crate) fn unexpected_eof(inside: &[u8]) -> Error {
    Error::Xml(format!(
        "unexpected end of document inside <{}>",
        String::from_utf8_lossy(inside)
    ))
}

/// Append-only XML text builder.
#[derive(Debug, Default)]
pub(crate) struct XmlBuf {
    out: String,
}

impl XmlBuf {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn declaration(&mut self) {
        self.out
            .push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n");
    }

    fn tag<'k, I>(&mut self, name: &str, attrs: I)
    where
        I: IntoIterator<Item = (&'k str, &'k str)>,
    {
        self.out.push('<');
        self.out.push_str(name);
        for (key, value) in attrs {
            self.out.push(' ');
            self.out.push_str(key);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
    }

    pub(crate) fn open(&mut self, name: &str) {
        self.open_with(name, []);
    }

    pub(crate) fn open_with<'k, I>(&mut self, name: &str, attrs: I)
    where
        I: IntoIterator<Item = (&'k str, &'k str)>,
    {
        self.tag(name, attrs);
        self.out.push('>');
    }

    pub(crate) fn empty(&mut self, name: &str) {
        self.empty_with(name, []);
    }

    pub(crate) fn empty_with<'k, I>(&mut self, name: &str, attrs: I)
    where
        I: IntoIterator<Item = (&'k str, &'k str)>,
    {
        self.tag(name, attrs);
        self.out.push_str("/>");
    }

    pub(crate) fn close(&mut self, name: &str) {
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    pub(crate) fn text(&mut self, text: &str) {
        self.out.push_str(&escape(text));
    }

    pub(crate) fn raw(&mut self, xml: &str) {
        self.out.push_str(xml);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub(crate) fn into_string(self) -> String {
        self.out
    }
}

/// Property children collected out of order and emitted in schema order.
pub(crate) struct Ordered<'o> {
    order: &'o [&'o str],
    children: Vec<(usize, String)>,
}

impl<'o> Ordered<'o> {
    pub(crate) fn new(order: &'o [&'o str]) -> Self {
        Self {
            order,
            children: Vec::new(),
        }
    }

    fn rank(&self, name: &str) -> usize {
        self.order
            .iter()
            .position(|n| *n == name)
            .unwrap_or(self.order.len())
    }

    /// Add a child built with an [`XmlBuf`].
    pub(crate) fn push(&mut self, name: &str, build: impl FnOnce(&mut XmlBuf)) {
        let mut buf = XmlBuf::new();
        build(&mut buf);
        self.children.push((self.rank(name), buf.into_string()));
    }

    /// Add a child that is already serialized.
    pub(crate) fn push_raw(&mut self, name: &str, xml: &str) {
        self.children.push((self.rank(name), xml.to_string()));
    }

    /// Write the children wrapped in `<wrapper>`, or nothing when there are none.
    pub(crate) fn write(mut self, wrapper: &str, out: &mut XmlBuf) {
        if self.children.is_empty() {
            return;
        }
        self.children.sort_by_key(|(rank, _)| *rank);
        out.open(wrapper);
        for (_, xml) in &self.children {
            out.raw(xml);
        }
        out.close(wrapper);
    }
}
