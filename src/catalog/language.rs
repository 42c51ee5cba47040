//! Language names and language statistics over a book collection.

use std::collections::HashMap;

use serde_json::{Value, json};

use super::model::Book;

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("eo", "Esperanto"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("fy", "Western Frisian"),
    ("ga", "Irish"),
    ("gl", "Galician"),
    ("he", "Hebrew"),
    ("hu", "Hungarian"),
    ("ia", "Interlingua"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("la", "Latin"),
    ("lt", "Lithuanian"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("tl", "Tagalog"),
    ("zh", "Chinese"),
];

/// English name of an ISO-639-1 code, or the code itself when unknown.
pub fn language_name(code: &str) -> String {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// How many books of a collection are in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCount {
    pub name: String,
    pub code: String,
    pub count: usize,
}

impl LanguageCount {
    pub fn to_array(&self) -> Value {
        json!([self.name, self.code, self.count])
    }
}

/// Languages present in `books`, most common first (ties by code).
pub fn languages_with_count(books: &[Book]) -> Vec<LanguageCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for book in books {
        *counts.entry(book.language.as_str()).or_default() += 1;
    }

    let mut langs: Vec<LanguageCount> = counts
        .into_iter()
        .map(|(code, count)| LanguageCount {
            name: language_name(code),
            code: code.to_string(),
            count,
        })
        .collect();
    langs.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.code.cmp(&b.code)));
    langs
}

/// Split languages into the main group shown up front and the rest.
///
/// Up to ten languages are all "main"; beyond that the nine most common are.
pub fn language_groups(books: &[Book]) -> (Vec<LanguageCount>, Vec<LanguageCount>) {
    let mut langs = languages_with_count(books);
    if langs.len() <= 10 {
        return (langs, Vec::new());
    }
    let rest = langs.split_off(9);
    (langs, rest)
}
