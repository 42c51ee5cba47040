//! Boilerplate removal over the top level of `<body>`.
//!
//! Only direct element children of `<body>` are ever removed. Text and
//! comment nodes sitting directly under `<body>` are left in place.

use tracing::debug;

use super::markers::{MarkerPair, MarkerTable};
use crate::dom::{Document, NodeId};

/// Which markers of the matching pair were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripMode {
    /// Both markers: keep what lies between them.
    Both,
    /// Only the start marker: drop the header.
    StartOnly,
    /// Only the end marker: drop the footer.
    EndOnly,
}

/// Why a document came back untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unchanged {
    /// The body is a single wrapping element; treated as already clean.
    SingleWrapper,
    /// No marker pair occurs in the body text.
    NoMarker,
}

/// Result of [`strip_boilerplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripOutcome {
    Stripped {
        /// Index of the matching pair in the marker table.
        pair: usize,
        mode: StripMode,
        removed: usize,
    },
    Unchanged(Unchanged),
    Failed(String),
}

impl StripOutcome {
    pub fn is_stripped(&self) -> bool {
        matches!(self, StripOutcome::Stripped { .. })
    }
}

/// Remove distributor boilerplate from the document body in place.
///
/// The first pair of `markers` with either marker present in the body text
/// decides what goes; later pairs are not consulted.
pub fn strip_boilerplate(doc: &mut Document, markers: &MarkerTable) -> StripOutcome {
    let Some(body) = doc.find_by_tag("body") else {
        return StripOutcome::Failed("document has no <body>".to_string());
    };

    let children: Vec<NodeId> = doc
        .children(body)
        .filter(|&child| doc.is_element(child))
        .collect();

    if children.len() == 1 {
        return StripOutcome::Unchanged(Unchanged::SingleWrapper);
    }

    let body_text = doc.text(body);
    let Some((index, pair)) = markers.first_match(&body_text) else {
        return StripOutcome::Unchanged(Unchanged::NoMarker);
    };

    let mode = match (body_text.contains(&pair.start), body_text.contains(&pair.end)) {
        (true, true) => StripMode::Both,
        (true, false) => StripMode::StartOnly,
        _ => StripMode::EndOnly,
    };

    let texts: Vec<String> = children.iter().map(|&child| doc.text(child)).collect();
    let plan = removal_plan(&texts, pair, mode);

    let mut removed = 0;
    for (&child, remove) in children.iter().zip(plan) {
        if remove {
            doc.detach(child);
            removed += 1;
        }
    }

    debug!(pair = index, ?mode, removed, "stripped boilerplate");
    StripOutcome::Stripped {
        pair: index,
        mode,
        removed,
    }
}

/// Decide, for each top-level element (given by its text), whether it goes.
pub fn removal_plan(texts: &[String], pair: &MarkerPair, mode: StripMode) -> Vec<bool> {
    let mut plan = Vec::with_capacity(texts.len());
    match mode {
        StripMode::Both => {
            // The end check runs before the start check, so a node holding
            // both markers is removed and resets `removing` to false.
            let mut removing = true;
            for text in texts {
                if text.contains(&pair.end) {
                    removing = true;
                }
                if text.contains(&pair.start) {
                    plan.push(true);
                    removing = false;
                    continue;
                }
                plan.push(removing);
            }
        }
        StripMode::StartOnly => {
            let mut removing = true;
            for text in texts {
                if text.contains(&pair.start) {
                    plan.push(true);
                    removing = false;
                    continue;
                }
                plan.push(removing);
            }
        }
        StripMode::EndOnly => {
            let mut removing = false;
            for text in texts {
                if text.contains(&pair.end) {
                    removing = true;
                }
                plan.push(removing);
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Flavor, parse_html, serialize_document};
    use crate::util::escape_xml;
    use proptest::prelude::*;

    fn pair() -> MarkerPair {
        MarkerPair::new("START", "END")
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn body_of(doc: &Document) -> String {
        let body = doc.find_by_tag("body").unwrap();
        doc.children(body)
            .filter(|&c| doc.is_element(c))
            .map(|c| doc.text(c))
            .collect::<Vec<_>>()
            .join("|")
    }

    #[test]
    fn test_plan_both_keeps_between() {
        let plan = removal_plan(
            &texts(&["header", "*** START", "one", "two", "END ***", "license"]),
            &pair(),
            StripMode::Both,
        );
        assert_eq!(plan, vec![true, true, false, false, true, true]);
    }

    #[test]
    fn test_plan_both_same_node() {
        // The node holding both markers is removed and everything after it kept.
        let plan = removal_plan(
            &texts(&["header", "START ... END", "one", "two"]),
            &pair(),
            StripMode::Both,
        );
        assert_eq!(plan, vec![true, true, false, false]);
    }

    #[test]
    fn test_plan_both_end_before_start() {
        let plan = removal_plan(
            &texts(&["a", "END", "b", "START", "c"]),
            &pair(),
            StripMode::Both,
        );
        assert_eq!(plan, vec![true, true, true, true, false]);
    }

    #[test]
    fn test_plan_start_only() {
        let plan = removal_plan(
            &texts(&["a", "b START", "c", "d"]),
            &pair(),
            StripMode::StartOnly,
        );
        assert_eq!(plan, vec![true, true, false, false]);
    }

    #[test]
    fn test_plan_end_only() {
        let plan = removal_plan(
            &texts(&["a", "b", "END c", "d"]),
            &pair(),
            StripMode::EndOnly,
        );
        assert_eq!(plan, vec![false, false, true, true]);
    }

    #[test]
    fn test_strip_both_markers() {
        let mut doc = parse_html(
            "<html><body>\
             <p>The Project Gutenberg EBook of Foo</p>\
             <pre>*** START OF THE PROJECT GUTENBERG EBOOK FOO ***</pre>\
             <h1>Foo</h1>\
             <p>Once upon a time.</p>\
             <pre>*** END OF THE PROJECT GUTENBERG EBOOK FOO ***</pre>\
             <p>Full license</p>\
             </body></html>",
        );
        let outcome = strip_boilerplate(&mut doc, &MarkerTable::gutenberg());
        assert_eq!(
            outcome,
            StripOutcome::Stripped {
                pair: 0,
                mode: StripMode::Both,
                removed: 4
            }
        );
        assert_eq!(body_of(&doc), "Foo|Once upon a time.");
    }

    #[test]
    fn test_strip_keeps_body_text_nodes() {
        let mut doc = parse_html(
            "<html><body>loose<p>x</p><p>START</p><p>kept</p></body></html>",
        );
        let table = MarkerTable::new(vec![pair()]);
        strip_boilerplate(&mut doc, &table);
        let out = serialize_document(&doc, Flavor::Html);
        assert!(out.contains("<body>loose<p>kept</p></body>"), "{out}");
    }

    #[test]
    fn test_single_wrapper_is_untouched() {
        let html = "<html><head></head><body>\n<div><p>*** START OF THE PROJECT GUTENBERG EBOOK X</p><p>text</p></div>\n</body></html>";
        let mut doc = parse_html(html);
        let before = serialize_document(&doc, Flavor::Html);
        let outcome = strip_boilerplate(&mut doc, &MarkerTable::gutenberg());
        assert_eq!(outcome, StripOutcome::Unchanged(Unchanged::SingleWrapper));
        assert_eq!(serialize_document(&doc, Flavor::Html), before);
    }

    #[test]
    fn test_no_marker_is_untouched() {
        let mut doc = parse_html("<html><body><p>a</p><p>b</p></body></html>");
        let outcome = strip_boilerplate(&mut doc, &MarkerTable::gutenberg());
        assert_eq!(outcome, StripOutcome::Unchanged(Unchanged::NoMarker));
        assert_eq!(body_of(&doc), "a|b");
    }

    #[test]
    fn test_first_matching_pair_wins() {
        // Pair 0 has only its end marker present; pair 11 would match both, but
        // is never consulted.
        let mut doc = parse_html(
            "<html><body>\
             <p>Project Gutenberg Etext intro</p>\
             <p>story</p>\
             <p>*** END OF THE PROJECT GUTENBERG EBOOK</p>\
             <p>End of Project Gutenberg Etext</p>\
             </body></html>",
        );
        let outcome = strip_boilerplate(&mut doc, &MarkerTable::gutenberg());
        assert_eq!(
            outcome,
            StripOutcome::Stripped {
                pair: 0,
                mode: StripMode::EndOnly,
                removed: 2
            }
        );
        assert_eq!(body_of(&doc), "Project Gutenberg Etext intro|story");
    }

    /// Built-in pairs that a document holding exactly their two markers
    /// resolves to, and whose markers can sit in separate nodes.
    fn reachable_pairs() -> Vec<usize> {
        let table = MarkerTable::gutenberg();
        table
            .pairs()
            .iter()
            .enumerate()
            .filter(|(i, pair)| {
                let text = format!("{}\n{}", pair.start, pair.end);
                table.first_match(&text).map(|(found, _)| found) == Some(*i)
                    && !pair.start.contains(&pair.end)
                    && !pair.end.contains(&pair.start)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn paragraphs(texts: &[String]) -> String {
        texts.iter().map(|t| format!("<p>{}</p>\n", escape_xml(t))).collect()
    }

    #[test]
    fn test_reachable_pairs_skip_shadowed() {
        let pairs = reachable_pairs();
        assert!(pairs.contains(&0));
        assert!(pairs.contains(&3));
        // Same start marker as pair 3
        assert!(!pairs.contains(&5));
        // Start equals end
        assert!(!pairs.contains(&2));
    }

    proptest! {
        #[test]
        fn prop_both_markers_keep_only_between(
            index in proptest::sample::select(reachable_pairs()),
            prefix in proptest::collection::vec("[a-z]{1,8}", 0..4),
            middle in proptest::collection::vec("[a-z]{1,8}", 0..4),
            suffix in proptest::collection::vec("[a-z]{1,8}", 0..4),
        ) {
            let table = MarkerTable::gutenberg();
            let pair = &table.pairs()[index];
            let html = format!(
                "<html><body>\n{}<p>{}</p>\n{}<p>{}</p>\n{}</body></html>",
                paragraphs(&prefix),
                escape_xml(&pair.start),
                paragraphs(&middle),
                escape_xml(&pair.end),
                paragraphs(&suffix),
            );
            let mut doc = parse_html(&html);

            let outcome = strip_boilerplate(&mut doc, &table);
            prop_assert_eq!(
                outcome,
                StripOutcome::Stripped {
                    pair: index,
                    mode: StripMode::Both,
                    removed: prefix.len() + suffix.len() + 2,
                }
            );
            prop_assert_eq!(body_of(&doc), middle.join("|"));
        }
    }
}
