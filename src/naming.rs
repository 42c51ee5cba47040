//! Output file names.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::catalog::{Book, Format};

/// Characters left as-is when a file name is used in a URL.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'/');

/// Title usable as a file name: trimmed, no `/`, at most 230 characters.
pub fn book_name_for_fs(book: &Book) -> String {
    book.title
        .trim()
        .replace('/', "-")
        .chars()
        .take(230)
        .collect()
}

/// `{title}.{id}.html`, or `{title}_cover.{id}.html` for the cover page.
pub fn article_name_for(book: &Book, cover: bool) -> String {
    let cover = if cover { "_cover" } else { "" };
    format!("{}{cover}.{}.html", book_name_for_fs(book), book.id)
}

/// Cache and export name of a format file: `{id}.{format}`.
pub fn fname_for(book: &Book, format: Format) -> String {
    format!("{}.{}", book.id, format)
}

/// Prefix shared by every companion file of a book.
pub fn companion_prefix(book_id: u32) -> String {
    format!("{book_id}_")
}

/// Percent-encode a file name for use in an `href`.
pub fn urlencode(name: &str) -> String {
    utf8_percent_encode(name, URL_SAFE).to_string()
}
