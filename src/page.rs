//! Per-page pipeline from raw cached markup to exported markup.

use tracing::{debug, info, warn};

use crate::catalog::Book;
use crate::cleanup::{MarkerTable, StripOutcome, Unchanged, strip_boilerplate};
use crate::dom::{Flavor, parse_html, parse_xhtml, serialize_document};
use crate::error::Error;
use crate::render::Renderer;
use crate::rewrite::{
    declares_charset, insert_charset_meta, insert_info_box, normalize_charset,
    rewrite_references, set_title,
};
use crate::util::decode_html;

/// Where the page will live.
#[derive(Clone, Copy)]
pub enum PageMode<'a> {
    /// A page of the static site. References are flattened, the title set and
    /// the info box inserted.
    Standalone {
        book: &'a Book,
        renderer: &'a dyn Renderer,
    },
    /// A content document inside an EPUB. Only boilerplate is removed and the
    /// output stays XHTML. Well-formed documents are read as XML so empty
    /// elements stay empty.
    Epub,
}

impl PageMode<'_> {
    fn flavor(&self) -> Flavor {
        match self {
            PageMode::Standalone { .. } => Flavor::Html,
            PageMode::Epub => Flavor::Xhtml,
        }
    }
}

/// Output of [`prepare_page`].
#[derive(Debug, Clone)]
pub struct PreparedPage {
    /// UTF-8 markup.
    pub html: String,
    pub outcome: StripOutcome,
}

/// Run a cached page through rewriting and boilerplate stripping.
///
/// When stripping fails the decoded original is returned unmodified.
pub fn prepare_page(raw: &[u8], mode: PageMode<'_>, markers: &MarkerTable) -> PreparedPage {
    let source = decode_html(raw);
    let mut doc = match mode {
        PageMode::Standalone { .. } => parse_html(&source),
        PageMode::Epub => parse_xhtml(&source).unwrap_or_else(|err| {
            debug!("not well-formed XHTML, parsing as HTML: {err}");
            parse_html(&source)
        }),
    };

    let had_charset = declares_charset(&doc);
    normalize_charset(&mut doc);

    if let PageMode::Standalone { book, .. } = mode {
        rewrite_references(&mut doc, book.id);
        set_title(&mut doc, &book.title);
    }

    let outcome = strip_boilerplate(&mut doc, markers);
    match &outcome {
        StripOutcome::Failed(reason) => {
            let err = Error::MarkupParse(reason.clone());
            warn!("keeping original markup: {err}");
            return PreparedPage {
                html: source.into_owned(),
                outcome,
            };
        }
        StripOutcome::Unchanged(Unchanged::SingleWrapper) => {
            if let PageMode::Standalone { book, .. } = mode {
                info!(book = book.id, title = %book.title, "body is a single wrapper, left as is");
            }
        }
        StripOutcome::Unchanged(Unchanged::NoMarker) => debug!("no boilerplate marker found"),
        StripOutcome::Stripped { .. } => {}
    }

    if let PageMode::Standalone { book, renderer } = mode {
        if !insert_info_box(&mut doc, &renderer.info_box(book)) {
            warn!(book = book.id, "info box has no <div>, not inserted");
        }
        if !had_charset {
            insert_charset_meta(&mut doc);
        }
    }

    PreparedPage {
        html: serialize_document(&doc, mode.flavor()),
        outcome,
    }
}
