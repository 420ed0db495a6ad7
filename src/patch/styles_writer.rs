//! Stream-rewrites xl/styles.xml with the planned cell format table.
//!
//! Everything outside `<cellXfs>` passes through untouched. The cellXfs
//! block itself is re-emitted from the plan's records (originals plus
//! synthesized twins), each with an explicit `<protection>` child so every
//! format the sheets reference has a definite locked state.

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use crate::error::Result;
use crate::parser::styles::XfRecord;

/// Rewrite the styles part, replacing the `<cellXfs>` block with `records`.
///
/// A stylesheet without a `<cellXfs>` element gets one inserted before
/// `</styleSheet>`.
pub(crate) fn rewrite_styles(original: &[u8], records: &[XfRecord]) -> Result<Vec<u8>> {
    let mut xml = Reader::from_reader(original);
    let mut writer = Writer::new(Vec::with_capacity(original.len()));

    let mut in_cell_xfs = false;
    let mut emitted = false;
    let mut buf = Vec::new();

    loop {
        let event = xml.read_event_into(&mut buf)?;
        match event {
            Event::Start(ref e) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = true;
                emit_cell_xfs(&mut writer, tag_name(e.name().as_ref()), records)?;
                emitted = true;
            }
            Event::Empty(ref e) if e.local_name().as_ref() == b"cellXfs" => {
                emit_cell_xfs(&mut writer, tag_name(e.name().as_ref()), records)?;
                emitted = true;
            }
            Event::End(ref e) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Event::End(ref e) if e.local_name().as_ref() == b"styleSheet" => {
                if !emitted {
                    let name = prefixed(e.name().as_ref(), b"styleSheet", "cellXfs");
                    emit_cell_xfs(&mut writer, name, records)?;
                    emitted = true;
                }
                writer.write_event(Event::End(e.to_owned()))?;
            }
            Event::Eof => break,
            // Original cellXfs content is replaced wholesale
            _ if in_cell_xfs => {}
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

fn tag_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).to_string()
}

/// Build a sibling tag name with the same namespace prefix as `known`
/// (e.g. "x:styleSheet" -> "x:cellXfs").
fn prefixed(known: &[u8], known_local: &[u8], local: &str) -> String {
    let prefix = known
        .strip_suffix(known_local)
        .map(|p| String::from_utf8_lossy(p).to_string())
        .unwrap_or_default();
    format!("{prefix}{local}")
}

fn emit_cell_xfs(writer: &mut Writer<Vec<u8>>, name: String, records: &[XfRecord]) -> Result<()> {
    let xf_name = prefixed(name.as_bytes(), b"cellXfs", "xf");
    let alignment_name = prefixed(name.as_bytes(), b"cellXfs", "alignment");
    let protection_name = prefixed(name.as_bytes(), b"cellXfs", "protection");

    let mut open = BytesStart::new(name.clone());
    let count = records.len().to_string();
    open.push_attribute(("count", count.as_str()));
    writer.write_event(Event::Start(open))?;

    for record in records {
        let mut xf = BytesStart::new(xf_name.clone());
        for (k, v) in &record.attrs {
            if k == "applyProtection" {
                continue;
            }
            // Captured attribute values are still in their escaped form
            push_raw_attribute(&mut xf, k, v);
        }
        xf.push_attribute(("applyProtection", "1"));
        writer.write_event(Event::Start(xf))?;

        if let Some(alignment) = &record.alignment {
            let mut elem = BytesStart::new(alignment_name.clone());
            for (k, v) in alignment {
                push_raw_attribute(&mut elem, k, v);
            }
            writer.write_event(Event::Empty(elem))?;
        }

        let mut protection = BytesStart::new(protection_name.clone());
        protection.push_attribute(("locked", if record.locked { "1" } else { "0" }));
        if record.hidden {
            protection.push_attribute(("hidden", "1"));
        }
        writer.write_event(Event::Empty(protection))?;

        writer.write_event(Event::End(quick_xml::events::BytesEnd::new(
            xf_name.clone(),
        )))?;
    }

    writer.write_event(Event::End(quick_xml::events::BytesEnd::new(name)))?;
    Ok(())
}

/// Push an attribute whose value is already XML-escaped, without re-escaping.
fn push_raw_attribute(elem: &mut BytesStart<'_>, key: &str, value: &str) {
    elem.push_attribute(Attribute {
        key: QName(key.as_bytes()),
        value: value.as_bytes().into(),
    });
}
