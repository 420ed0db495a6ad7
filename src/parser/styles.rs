//! Cell format (`cellXfs`) reading from xl/styles.xml.
//!
//! A cell's locked flag lives on the `xf` record its `s` attribute points at.
//! The records are kept attribute-for-attribute so the styles writer can
//! re-emit them (and synthesized locked/unlocked twins) without losing any
//! formatting.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::{Result, XlprotectError};

/// One `<xf>` record from `<cellXfs>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct XfRecord {
    /// All attributes in document order, verbatim.
    pub attrs: Vec<(String, String)>,
    /// Attributes of the `<alignment>` child, if present.
    pub alignment: Option<Vec<(String, String)>>,
    /// Whether cells using this format are locked (Excel default true).
    pub locked: bool,
    /// Whether formulas in cells using this format are hidden.
    pub hidden: bool,
}

impl XfRecord {
    /// A bare default format (numFmtId/fontId/fillId/borderId 0), used when a
    /// stylesheet declares no cellXfs at all.
    pub fn base() -> Self {
        Self {
            attrs: vec![
                ("numFmtId".to_string(), "0".to_string()),
                ("fontId".to_string(), "0".to_string()),
                ("fillId".to_string(), "0".to_string()),
                ("borderId".to_string(), "0".to_string()),
            ],
            alignment: None,
            locked: true,
            hidden: false,
        }
    }

    /// Identity of this record with the protection state factored out.
    ///
    /// Two records with equal keys differ at most in their locked flag and
    /// the `applyProtection` marker, so a synthesized twin can be
    /// deduplicated against an existing record.
    pub fn twin_key(&self) -> (Vec<(String, String)>, Option<Vec<(String, String)>>, bool) {
        let attrs = self
            .attrs
            .iter()
            .filter(|(k, _)| k != "applyProtection")
            .cloned()
            .collect();
        (attrs, self.alignment.clone(), self.hidden)
    }

    /// Copy of this record with the opposite locked state.
    pub fn flipped(&self) -> Self {
        Self {
            locked: !self.locked,
            ..self.clone()
        }
    }
}

fn collect_attrs(e: &BytesStart) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = String::from_utf8_lossy(&attr.value).to_string();
        attrs.push((key, value));
    }
    attrs
}

fn xf_from_start(e: &BytesStart) -> XfRecord {
    XfRecord {
        attrs: collect_attrs(e),
        alignment: None,
        // Excel default: locked unless a protection child says otherwise
        locked: true,
        hidden: false,
    }
}

/// Parse the `<cellXfs>` records from the styles part.
///
/// A stylesheet without `<cellXfs>` yields a single default record, since
/// cells without an `s` attribute implicitly use format 0.
pub(crate) fn parse_cell_xfs<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    styles_path: &str,
) -> Result<Vec<XfRecord>> {
    let file = archive
        .by_name(styles_path)
        .map_err(|_| XlprotectError::FileFormat(format!("missing styles part: {styles_path}")))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut records: Vec<XfRecord> = Vec::new();
    let mut in_cell_xfs = false;
    let mut current_xf: Option<XfRecord> = None;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => current_xf = Some(xf_from_start(e)),
                b"alignment" | b"protection" if current_xf.is_some() => {
                    apply_child(current_xf.as_mut(), e);
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"xf" if in_cell_xfs => records.push(xf_from_start(e)),
                b"alignment" | b"protection" if current_xf.is_some() => {
                    apply_child(current_xf.as_mut(), e);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"xf" if in_cell_xfs => {
                    if let Some(xf) = current_xf.take() {
                        records.push(xf);
                    }
                }
                b"cellXfs" => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    if records.is_empty() {
        records.push(XfRecord::base());
    }

    Ok(records)
}

fn apply_child(current: Option<&mut XfRecord>, e: &BytesStart) {
    let Some(xf) = current else {
        return;
    };
    match e.local_name().as_ref() {
        b"alignment" => xf.alignment = Some(collect_attrs(e)),
        b"protection" => {
            for attr in e.attributes().flatten() {
                match attr.key.as_ref() {
                    b"locked" => {
                        // locked="0" means unlocked, locked="1" or absent means locked
                        xf.locked = std::str::from_utf8(&attr.value).unwrap_or("1") != "0";
                    }
                    b"hidden" => {
                        xf.hidden = std::str::from_utf8(&attr.value).unwrap_or("0") == "1";
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}
