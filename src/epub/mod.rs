//! EPUB post-processing for the exported catalog.
//!
//! Catalog EPUBs carry the same distributor boilerplate as the HTML pages,
//! plus a license section in the table of contents and sometimes a generic
//! placeholder cover. [`EpubPatcher`] removes all three and repacks the
//! archive.

mod ncx;
mod opf;
mod patcher;
pub(crate) mod xml;

pub use ncx::{FULL_LICENSE_MARKER, truncate_ncx};
pub use opf::remove_href_elements;
pub use patcher::{EpubPatcher, PatchReport};
