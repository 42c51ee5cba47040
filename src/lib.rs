//! # gutenberg-export
//!
//! Turns a catalog of public-domain ebooks into a static website.
//!
//! ## Features
//!
//! - Strip distributor boilerplate from book pages with a table of legacy
//!   start/end markers
//! - Flatten image and page references for static hosting
//! - Patch catalog EPUBs: boilerplate, license TOC entries, placeholder covers
//! - Rank books by downloads into 1 to 5 stars
//! - Write the JS data files, cover pages and home page of the site
//!
//! ## Quick Start
//!
//! ```no_run
//! use gutenberg_export::{Catalog, Exporter, load_config};
//!
//! let config = load_config("export.toml".as_ref());
//! let catalog = Catalog::open(&config.database)?;
//! let summary = Exporter::new(&config).export_all_books(&catalog)?;
//! println!("{} pages stripped", summary.pages_stripped);
//! # Ok::<(), gutenberg_export::Error>(())
//! ```
//!
//! ## Working with Pages
//!
//! Individual pages go through [`prepare_page`]:
//!
//! ```
//! use gutenberg_export::{MarkerTable, PageMode, prepare_page};
//!
//! let html = b"<html><body>\
//!     <p>*** START OF THE PROJECT GUTENBERG EBOOK X ***</p>\
//!     <p>Call me Ishmael.</p>\
//!     <p>*** END OF THE PROJECT GUTENBERG EBOOK X ***</p>\
//!     </body></html>";
//! let page = prepare_page(html, PageMode::Epub, &MarkerTable::gutenberg());
//! assert!(page.outcome.is_stripped());
//! assert!(!page.html.contains("START OF THE PROJECT"));
//! ```

pub mod cache;
pub mod catalog;
pub mod cleanup;
pub mod config;
pub mod datafiles;
pub mod dom;
pub mod epub;
pub mod error;
pub mod export;
pub mod media;
pub mod naming;
pub mod page;
pub mod popularity;
pub mod render;
pub mod rewrite;
pub(crate) mod util;

pub use catalog::{Author, Book, BookFilter, Catalog, Format, License};
pub use cleanup::{MarkerPair, MarkerTable, StripOutcome, strip_boilerplate};
pub use config::{ExportConfig, load_config};
pub use epub::{EpubPatcher, PatchReport};
pub use error::{Error, Result};
pub use export::{ExportSummary, Exporter};
pub use media::{BadCoverList, ImageOptimizer};
pub use page::{PageMode, PreparedPage, prepare_page};
pub use popularity::PopularityThresholds;
pub use render::{HtmlRenderer, Renderer};
pub use rewrite::{rewrite_img_src, rewrite_link};
