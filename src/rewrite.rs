//! Reference rewriting for standalone book pages.
//!
//! In the download cache a book's pages and images sit next to each other as
//! `{id}_{name}` files. Pages refer to them as `images/fig1.png` or
//! `chap2.html#sec`, so those references are renamed to the flat layout.

use tracing::debug;

use crate::dom::{Document, NodeId, parse_fragment};

/// Rewrite an `<img src>` from the `images/` subfolder to a prefixed sibling.
///
/// `rewrite_img_src(7, "images/fig1.png") == "7_fig1.png"`
pub fn rewrite_img_src(book_id: u32, src: &str) -> String {
    src.replace("images/", &format!("{book_id}_"))
}

/// Rewrite a same-directory `<a href>` to its prefixed sibling page.
///
/// Returns `None` when the link must be left alone: paths containing `/`
/// (external or nested), and paths already carrying the book prefix.
pub fn rewrite_link(book_id: u32, href: &str) -> Option<String> {
    let (path, anchor) = match href.rsplit_once('#') {
        Some((path, anchor)) => (path, Some(anchor)),
        None => (href, None),
    };
    if path.contains('/') {
        return None;
    }

    let prefix = format!("{book_id}_");
    if path.starts_with(&prefix) {
        return None;
    }

    let path = path.trim();
    let new_path = format!("{prefix}{path}");
    Some(match anchor {
        Some(anchor) => format!("{new_path}#{anchor}"),
        None => new_path,
    })
}

/// Apply [`rewrite_img_src`] and [`rewrite_link`] to every `<img>` and `<a>`.
pub fn rewrite_references(doc: &mut Document, book_id: u32) {
    let mut changed = 0usize;

    for img in doc.find_all_by_tag("img") {
        if let Some(src) = doc.get_attr(img, "src") {
            let new_src = rewrite_img_src(book_id, src);
            if new_src != src {
                doc.set_attr(img, "src", new_src);
                changed += 1;
            }
        }
    }

    for link in doc.find_all_by_tag("a") {
        let Some(href) = doc.get_attr(link, "href") else {
            continue;
        };
        if href.is_empty() {
            continue;
        }
        if let Some(new_href) = rewrite_link(book_id, href) {
            doc.set_attr(link, "href", new_href);
            changed += 1;
        }
    }

    debug!(book = book_id, changed, "rewrote references");
}

/// Replace the document title, creating `<title>` when missing.
pub fn set_title(doc: &mut Document, title: &str) {
    let title_node = match doc.find_by_tag("title") {
        Some(node) => node,
        None => {
            let Some(head) = doc.find_by_tag("head") else {
                return;
            };
            let node = doc.create_html_element("title", &[]);
            doc.append(head, node);
            node
        }
    };
    doc.set_text(title_node, title);
}

fn is_charset_meta(doc: &Document, meta: NodeId) -> bool {
    if doc.get_attr(meta, "charset").is_some() {
        return true;
    }
    doc.get_attr(meta, "http-equiv")
        .is_some_and(|v| v.eq_ignore_ascii_case("content-type"))
        && doc
            .get_attr(meta, "content")
            .is_some_and(|c| c.to_ascii_lowercase().contains("charset="))
}

/// Whether the document declares its character encoding in a `<meta>`.
pub fn declares_charset(doc: &Document) -> bool {
    doc.find_all_by_tag("meta")
        .into_iter()
        .any(|meta| is_charset_meta(doc, meta))
}

/// Point every charset declaration at UTF-8, the only output encoding.
pub fn normalize_charset(doc: &mut Document) {
    for meta in doc.find_all_by_tag("meta") {
        if doc.get_attr(meta, "charset").is_some() {
            doc.set_attr(meta, "charset", "UTF-8");
        } else if is_charset_meta(doc, meta)
            && let Some(content) = doc.get_attr(meta, "content")
        {
            let lower = content.to_ascii_lowercase();
            if let Some(pos) = lower.find("charset=") {
                let value_start = pos + "charset=".len();
                let value_end = content[value_start..]
                    .find(|c: char| c == ';' || c.is_whitespace())
                    .map(|i| value_start + i)
                    .unwrap_or(content.len());
                let updated = format!(
                    "{}UTF-8{}",
                    &content[..value_start],
                    &content[value_end..]
                );
                doc.set_attr(meta, "content", updated);
            }
        }
    }
}

/// Insert a UTF-8 `<meta http-equiv>` as the first child of `<head>`.
pub fn insert_charset_meta(doc: &mut Document) {
    let Some(head) = doc.find_by_tag("head") else {
        return;
    };
    let meta = doc.create_html_element(
        "meta",
        &[
            ("http-equiv", "Content-Type"),
            ("content", "text/html; charset=UTF-8"),
        ],
    );
    doc.prepend(head, meta);
}

/// Insert the first `<div>` of a rendered fragment as the first child of
/// `<body>`. Returns `false` when there is nothing to insert.
pub fn insert_info_box(doc: &mut Document, fragment_html: &str) -> bool {
    let Some(body) = doc.find_by_tag("body") else {
        return false;
    };
    let (fragment, _) = parse_fragment(fragment_html);
    let Some(div) = fragment.find_by_tag("div") else {
        return false;
    };
    let copy = doc.import(&fragment, div);
    doc.prepend(body, copy);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Flavor, parse_html, serialize_document};
    use proptest::prelude::*;

    #[test]
    fn test_rewrite_link_cases() {
        assert_eq!(
            rewrite_link(42, "chap1.html#sec2").as_deref(),
            Some("42_chap1.html#sec2")
        );
        assert_eq!(rewrite_link(42, "sub/chap1.html"), None);
        assert_eq!(rewrite_link(42, "#sec2").as_deref(), Some("42_#sec2"));
        assert_eq!(rewrite_link(42, "chap1.html").as_deref(), Some("42_chap1.html"));
        assert_eq!(rewrite_link(42, "http://example.com/a#b"), None);
    }

    #[test]
    fn test_rewrite_link_splits_on_last_hash() {
        assert_eq!(rewrite_link(1, "a#b#c").as_deref(), Some("1_a#b#c"));
    }

    #[test]
    fn test_rewrite_img_src() {
        assert_eq!(rewrite_img_src(7, "images/fig1.png"), "7_fig1.png");
        assert_eq!(rewrite_img_src(7, "fig1.png"), "fig1.png");
        assert_eq!(rewrite_img_src(7, "../images/fig1.png"), "../7_fig1.png");
    }

    #[test]
    fn test_rewrite_references_in_document() {
        let mut doc = parse_html(
            r##"<html><body><img src="images/a.png"><a href="b.html#x">b</a><a href="http://x.org/">x</a><a name="top">t</a></body></html>"##,
        );
        rewrite_references(&mut doc, 5);
        let out = serialize_document(&doc, Flavor::Html);
        assert!(out.contains(r#"<img src="5_a.png">"#));
        assert!(out.contains(r#"<a href="5_b.html#x">"#));
        assert!(out.contains(r#"<a href="http://x.org/">"#));
        assert!(out.contains(r#"<a name="top">"#));
    }

    #[test]
    fn test_title_and_charset() {
        let mut doc = parse_html("<html><head></head><body><p>x</p></body></html>");
        assert!(!declares_charset(&doc));
        set_title(&mut doc, "Emma");
        insert_charset_meta(&mut doc);
        assert!(declares_charset(&doc));

        let out = serialize_document(&doc, Flavor::Html);
        assert!(out.contains(
            r#"<head><meta http-equiv="Content-Type" content="text/html; charset=UTF-8"><title>Emma</title></head>"#
        ), "{out}");
    }

    #[test]
    fn test_normalize_charset() {
        let mut doc = parse_html(
            r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1"><meta charset="latin1"></head><body></body></html>"#,
        );
        assert!(declares_charset(&doc));
        normalize_charset(&mut doc);
        let out = serialize_document(&doc, Flavor::Html);
        assert!(out.contains(r#"content="text/html; charset=UTF-8""#));
        assert!(out.contains(r#"<meta charset="UTF-8">"#));
    }

    #[test]
    fn test_insert_info_box_first() {
        let mut doc = parse_html("<html><body><p>text</p></body></html>");
        assert!(insert_info_box(&mut doc, r#"<div class="infobox"><b>Emma</b></div>"#));
        let out = serialize_document(&doc, Flavor::Html);
        assert!(out.contains(r#"<body><div class="infobox"><b>Emma</b></div><p>text</p>"#));
    }

    proptest! {
        #[test]
        fn prop_rewrite_link_single_prefix(
            id in 1u32..100_000,
            name in "[a-z0-9_.-]{0,12}",
            anchor in proptest::option::of("[a-z0-9]{1,6}"),
        ) {
            let href = match &anchor {
                Some(a) => format!("{name}#{a}"),
                None => name.clone(),
            };
            let once = rewrite_link(id, &href).unwrap_or_else(|| href.clone());
            let twice = rewrite_link(id, &once).unwrap_or_else(|| once.clone());
            let prefix = format!("{}_", id);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.starts_with(&prefix));
        }

        #[test]
        fn prop_rewrite_img_src_idempotent(id in 1u32..100_000, name in "[a-z0-9]{1,10}\\.png") {
            let once = rewrite_img_src(id, &format!("images/{name}"));
            prop_assert_eq!(rewrite_img_src(id, &once), once.clone());
            prop_assert_eq!(once, format!("{id}_{name}"));
        }
    }
}
