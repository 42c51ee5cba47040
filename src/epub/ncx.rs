//! Table of contents truncation.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use super::xml::{cut_ranges, local_name, resolve_entity};
use crate::error::{Error, Result};

/// Label of the first table-of-contents entry belonging to the license.
pub const FULL_LICENSE_MARKER: &str = "*** START: FULL LICENSE ***";

/// Cut the NCX navigation map at the full-license entry.
///
/// The `navPoint` owning the first `<text>` label that contains `marker` is
/// removed together with every sibling that follows it. Returns `None` when
/// no label matches.
pub fn truncate_ncx(ncx: &str, marker: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(ncx);
    // (local name, byte offset of the start tag)
    let mut stack: Vec<(Vec<u8>, usize)> = Vec::new();
    let mut label: Option<String> = None;
    // (start of the cut, stack index of the element holding the siblings)
    let mut cut: Option<(usize, usize)> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let local = local_name(e.name().as_ref()).to_vec();
                if cut.is_none() && local == b"text" {
                    label = Some(String::new());
                }
                stack.push((local, pos));
            }
            Ok(Event::Text(e)) => {
                if let Some(text) = &mut label {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(text) = &mut label {
                    text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if let Some(text) = &mut label {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some((start, container)) = cut
                    && stack.len() == container + 1
                {
                    debug!(removed = pos - start, "truncated navigation map");
                    return Ok(Some(cut_ranges(ncx, &[start..pos])));
                }

                let Some((local, _)) = stack.pop() else {
                    return Err(Error::MissingManifestEntry("unbalanced NCX".to_string()));
                };
                if local == b"text"
                    && let Some(text) = label.take()
                    && text.contains(marker)
                {
                    // stack: [.., container, navPoint, navLabel]
                    let depth = stack.len();
                    if depth < 3 || stack[depth - 2].0 != b"navPoint" {
                        return Err(Error::MissingManifestEntry(
                            "license label outside a navPoint".to_string(),
                        ));
                    }
                    cut = Some((stack[depth - 2].1, depth - 3));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    match cut {
        Some(_) => Err(Error::MissingManifestEntry("unterminated navMap".to_string())),
        None => Ok(None),
    }
}
