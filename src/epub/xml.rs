//! Helpers shared by the NCX and OPF editors and the XHTML reader.
//!
//! The editors locate elements with a quick-xml event stream and cut the
//! original source by byte range, so everything they do not remove is
//! written back byte for byte.

use std::ops::Range;

/// Strip a namespace prefix: `opf:item` -> `item`.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve an entity reference reported as a separate event.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32).map(|c| c.to_string())
}

/// Copy `source` leaving out the given byte ranges.
///
/// Ranges must be sorted; a range starting inside a previous one is ignored.
pub(crate) fn cut_ranges(source: &str, ranges: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(source.len());
    let mut pos = 0;
    for range in ranges {
        if range.start < pos {
            continue;
        }
        out.push_str(&source[pos..range.start]);
        pos = range.end;
    }
    out.push_str(&source[pos..]);
    out
}
