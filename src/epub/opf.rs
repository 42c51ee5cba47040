//! Package document edits.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::xml::{cut_ranges, local_name};
use crate::error::{Error, Result};

fn has_href(e: &BytesStart<'_>, href: &str) -> bool {
    e.attributes()
        .flatten()
        .any(|attr| local_name(attr.key.as_ref()) == b"href" && attr.value.as_ref() == href.as_bytes())
}

/// Remove every element whose `href` attribute equals `href`.
///
/// Returns the edited document and the number of elements removed.
pub fn remove_href_elements(opf: &str, href: &str) -> Result<(String, usize)> {
    let mut reader = Reader::from_str(opf);
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut depth = 0usize;
    // (depth of the element being removed, start offset)
    let mut open: Option<(usize, usize)> = None;

    loop {
        let pos = reader.buffer_position() as usize;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if open.is_none() && has_href(&e, href) {
                    open = Some((depth, pos));
                }
            }
            Ok(Event::Empty(e)) => {
                if open.is_none() && has_href(&e, href) {
                    ranges.push(pos..reader.buffer_position() as usize);
                }
            }
            Ok(Event::End(_)) => {
                if let Some((at, start)) = open
                    && at == depth
                {
                    ranges.push(start..reader.buffer_position() as usize);
                    open = None;
                }
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| Error::MissingManifestEntry("unbalanced OPF".to_string()))?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok((cut_ranges(opf, &ranges), ranges.len()))
}
