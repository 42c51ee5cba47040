//! Known boilerplate delimiters.

use serde::Deserialize;

/// A pair of literal substrings bracketing the authored text of a book.
///
/// Everything before the node holding `start` and everything from the node
/// holding `end` onward is distributor boilerplate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkerPair {
    pub start: String,
    pub end: String,
}

impl MarkerPair {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Ordered, immutable list of marker pairs. The first pair found in a
/// document wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    pairs: Vec<MarkerPair>,
}

const GUTENBERG_MARKERS: &[(&str, &str)] = &[
    (
        "*** START OF THE PROJECT GUTENBERG EBOOK",
        "*** END OF THE PROJECT GUTENBERG EBOOK",
    ),
    (
        "***START OF THE PROJECT GUTENBERG EBOOK",
        "***END OF THE PROJECT GUTENBERG EBOOK",
    ),
    (
        "<><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><>",
        "<><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><><>",
    ),
    // Seen in EPUB content documents
    (
        "*** START OF THIS PROJECT GUTENBERG EBOOK",
        "*** START: FULL LICENSE ***",
    ),
    (
        "*END THE SMALL PRINT! FOR PUBLIC DOMAIN ETEXT",
        "——————————————————————————-",
    ),
    (
        "*** START OF THIS PROJECT GUTENBERG EBOOK",
        "*** END OF THIS PROJECT GUTENBERG EBOOK",
    ),
    (
        "***START OF THE PROJECT GUTENBERG",
        "***END OF THE PROJECT GUTENBERG EBOOK",
    ),
    (
        "COPYRIGHT PROTECTED ETEXTS*END*",
        "===========================================================",
    ),
    (
        "Nous remercions la Bibliothèque Nationale de France qui a mis à",
        "The Project Gutenberg Etext of",
    ),
    (
        "Nous remercions la Bibliothèque Nationale de France qui a mis à",
        "End of The Project Gutenberg EBook",
    ),
    (
        "=========================================================================",
        "——————————————————————————-",
    ),
    ("Project Gutenberg Etext", "End of Project Gutenberg Etext"),
    ("Text encoding is iso-8859-1", "Fin de Project Gutenberg Etext"),
    (
        "—————————————————-",
        "Encode an ISO 8859/1 Etext into LaTeX or HTML",
    ),
];

impl MarkerTable {
    pub fn new(pairs: Vec<MarkerPair>) -> Self {
        Self { pairs }
    }

    /// The historical Project Gutenberg header/footer conventions.
    pub fn gutenberg() -> Self {
        Self::new(
            GUTENBERG_MARKERS
                .iter()
                .map(|&(start, end)| MarkerPair::new(start, end))
                .collect(),
        )
    }

    /// A new table with `extra` pairs tried after the existing ones.
    pub fn extended(&self, extra: impl IntoIterator<Item = MarkerPair>) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.extend(extra);
        Self::new(pairs)
    }

    pub fn pairs(&self) -> &[MarkerPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// First pair with at least one marker occurring in `text`.
    pub fn first_match(&self, text: &str) -> Option<(usize, &MarkerPair)> {
        self.pairs
            .iter()
            .enumerate()
            .find(|(_, pair)| text.contains(&pair.start) || text.contains(&pair.end))
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::gutenberg()
    }
}
