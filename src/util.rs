//! Text decoding and small naming helpers.

use std::borrow::Cow;

/// Decode bytes to a string, handling the encodings found in old ebooks.
///
/// 1. UTF-8 (BOM handled by encoding_rs)
/// 2. the hinted encoding, from an XML declaration or a `<meta>` charset
/// 3. Windows-1252, a superset of ISO-8859-1
///
/// Valid UTF-8 input is borrowed, not copied.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Decode an HTML page, sniffing the declared charset first.
pub fn decode_html(bytes: &[u8]) -> Cow<'_, str> {
    let hint = extract_xml_encoding(bytes).or_else(|| extract_meta_charset(bytes));
    decode_text(bytes, hint)
}

/// Extract the encoding from an XML declaration (`<?xml ... encoding="..."?>`).
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    quoted_value(&after_xml[enc_pos + 9..])
}

/// Extract the charset from a `<meta charset>` or `<meta http-equiv>` tag in
/// the first kilobyte.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(1024);
    let prefix = &bytes[..check_len];

    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;
    let rest = &prefix[pos + 8..];
    if let Some(value) = quoted_value(rest) {
        return Some(value);
    }
    let end = rest
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())?;
    std::str::from_utf8(&rest[..end]).ok().filter(|s| !s.is_empty())
}

fn quoted_value(bytes: &[u8]) -> Option<&str> {
    let quote = *bytes.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = bytes[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&bytes[1..end]).ok()
}

/// Escape text for inclusion in HTML/XML content or attribute values.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// File extension of a path-like name, lowercased, without the dot.
pub fn extension(name: &str) -> Option<String> {
    let file = name.rsplit('/').next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_image_name(name: &str) -> bool {
    matches!(
        extension(name).as_deref(),
        Some("png" | "jpg" | "jpeg" | "gif")
    )
}

pub fn is_html_name(name: &str) -> bool {
    matches!(extension(name).as_deref(), Some("html" | "htm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_borrowed() {
        let text = decode_text("Café".as_bytes(), None);
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, "Café");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        let bytes = b"Caf\xe9";
        assert_eq!(decode_text(bytes, None), "Café");
        assert_eq!(decode_text(bytes, Some("iso-8859-1")), "Café");
    }

    #[test]
    fn test_extract_xml_encoding() {
        assert_eq!(
            extract_xml_encoding(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><html/>"),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_xml_encoding(b"<html></html>"), None);
    }

    #[test]
    fn test_extract_meta_charset() {
        assert_eq!(
            extract_meta_charset(
                b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-1\" /></head>"
            ),
            Some("iso-8859-1")
        );
        assert_eq!(
            extract_meta_charset(b"<meta charset=\"utf-8\">"),
            Some("utf-8")
        );
        assert_eq!(extract_meta_charset(b"<p>no charset</p>"), None);
    }

    #[test]
    fn test_decode_html_uses_meta_hint() {
        let bytes = b"<meta charset=\"windows-1250\"><p>\x9a</p>";
        assert!(decode_html(bytes).contains('š'));
    }

    #[test]
    fn test_extension_helpers() {
        assert_eq!(extension("12345/images/Cover.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension("mimetype"), None);
        assert_eq!(extension(".hidden"), None);
        assert!(is_image_name("a/b/c.gif"));
        assert!(is_html_name("12345-h.htm"));
        assert!(!is_html_name("toc.ncx"));
    }
}
