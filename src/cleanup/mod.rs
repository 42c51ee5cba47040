//! Removal of distributor boilerplate from book markup.
//!
//! Legacy ebooks wrap the authored text in legal headers and footers whose
//! wording changed many times over the decades. A [`MarkerTable`] lists the
//! known delimiters; [`strip_boilerplate`] applies the first one that fits.

mod markers;
mod strip;

pub use markers::{MarkerPair, MarkerTable};
pub use strip::{StripMode, StripOutcome, Unchanged, removal_plan, strip_boilerplate};
