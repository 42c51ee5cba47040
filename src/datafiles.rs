//! JS data files read by the client-side book lists.
//!
//! Each file assigns one global: `var json_data = [...];`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::catalog::{Author, Book, LanguageCount, language_groups, languages_with_count};
use crate::error::Result;

const BOOKS_VAR: &str = "json_data";
const AUTHORS_VAR: &str = "authors_json_data";

/// Write `var {var} = {json};` to `dir/file_name`.
pub fn write_js(dir: &Path, file_name: &str, var: &str, value: &Value) -> Result<()> {
    let json = serde_json::to_string(value)?;
    fs::write(dir.join(file_name), format!("var {var} = {json};"))?;
    debug!(file = file_name, "wrote data file");
    Ok(())
}

/// Books ordered by descending downloads, ties by id.
pub fn by_popularity<'a>(books: impl IntoIterator<Item = &'a Book>) -> Vec<&'a Book> {
    let mut sorted: Vec<&Book> = books.into_iter().collect();
    sorted.sort_by(|a, b| b.downloads.cmp(&a.downloads).then(a.id.cmp(&b.id)));
    sorted
}

/// Books ordered by title, ties by id.
pub fn by_title<'a>(books: impl IntoIterator<Item = &'a Book>) -> Vec<&'a Book> {
    let mut sorted: Vec<&Book> = books.into_iter().collect();
    sorted.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
    sorted
}

/// Distinct authors of `books`, ordered by last then first names.
pub fn authors_of<'a>(books: impl IntoIterator<Item = &'a Book>) -> Vec<&'a Author> {
    let mut seen = HashSet::new();
    let mut authors: Vec<&Author> = books
        .into_iter()
        .map(|b| &b.author)
        .filter(|a| seen.insert(a.id.clone()))
        .collect();
    authors.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_names.cmp(&b.first_names))
            .then_with(|| a.id.cmp(&b.id))
    });
    authors
}

fn book_records(books: &[&Book]) -> Value {
    Value::Array(books.iter().map(|b| b.to_array()).collect())
}

fn author_records(authors: &[&Author]) -> Value {
    Value::Array(authors.iter().map(|a| a.to_array()).collect())
}

fn language_records(langs: &[LanguageCount]) -> Value {
    Value::Array(langs.iter().map(LanguageCount::to_array).collect())
}

/// Write the full family of data files. Returns how many were written.
pub fn export_data_files(books: &[Book], dir: &Path) -> Result<usize> {
    let mut written = 0;
    let mut write = |file: &str, var: &str, value: Value| -> Result<()> {
        write_js(dir, file, var, &value)?;
        written += 1;
        Ok(())
    };

    write("full_by_popularity.js", BOOKS_VAR, book_records(&by_popularity(books)))?;
    write("full_by_title.js", BOOKS_VAR, book_records(&by_title(books)))?;

    let languages = languages_with_count(books);
    for lang in &languages {
        let in_lang = || books.iter().filter(|b| b.language == lang.code);
        write(
            &format!("lang_{}_by_popularity.js", lang.code),
            BOOKS_VAR,
            book_records(&by_popularity(in_lang())),
        )?;
        write(
            &format!("lang_{}_by_title.js", lang.code),
            BOOKS_VAR,
            book_records(&by_title(in_lang())),
        )?;
        write(
            &format!("authors_lang_{}.js", lang.code),
            AUTHORS_VAR,
            author_records(&authors_of(in_lang())),
        )?;
    }

    let authors = authors_of(books);
    for author in &authors {
        let by_author = || books.iter().filter(|b| b.author.id == author.id);
        write(
            &format!("auth_{}_by_popularity.js", author.id),
            BOOKS_VAR,
            book_records(&by_popularity(by_author())),
        )?;
        write(
            &format!("auth_{}_by_title.js", author.id),
            BOOKS_VAR,
            book_records(&by_title(by_author())),
        )?;
    }
    write("authors.js", AUTHORS_VAR, author_records(&authors))?;

    write("languages.js", "languages_json_data", language_records(&languages))?;
    let (main, other) = language_groups(books);
    write("main_languages.js", "main_languages_json_data", language_records(&main))?;
    write("other_languages.js", "other_languages_json_data", language_records(&other))?;

    info!(files = written, "wrote data files");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{author, book};
    use serde_json::json;
    use tempfile::TempDir;

    fn collection() -> Vec<Book> {
        let mut candide = book(2, "Candide", "fr", 80);
        candide.author = author("9", None, "Voltaire");
        vec![
            book(1, "Emma", "en", 50),
            candide,
            book(3, "Persuasion", "en", 90),
        ]
    }

    #[test]
    fn test_write_js_format() {
        let dir = TempDir::new().unwrap();
        write_js(dir.path(), "x.js", "json_data", &json!([1, "a"])).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("x.js")).unwrap(),
            r#"var json_data = [1,"a"];"#
        );
    }

    #[test]
    fn test_orderings() {
        let books = collection();
        let ids = |v: Vec<&Book>| v.iter().map(|b| b.id).collect::<Vec<_>>();
        assert_eq!(ids(by_popularity(&books)), vec![3, 2, 1]);
        assert_eq!(ids(by_title(&books)), vec![2, 1, 3]);
        let names: Vec<_> = authors_of(&books).iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Jane Austen", "Voltaire"]);
    }

    #[test]
    fn test_export_data_files() {
        let dir = TempDir::new().unwrap();
        let books = collection();
        let written = export_data_files(&books, dir.path()).unwrap();
        // 2 full + 3 per language * 2 + 2 per author * 2 + authors + 3 language files
        assert_eq!(written, 2 + 6 + 4 + 1 + 3);

        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(read("lang_en_by_popularity.js").starts_with("var json_data = [[\"Persuasion\""));
        assert!(read("auth_9_by_title.js").contains("Candide"));
        assert!(read("authors_lang_fr.js").starts_with("var authors_json_data = [[\"Voltaire\",\"9\""));
        assert_eq!(
            read("languages.js"),
            r#"var languages_json_data = [["English","en",2],["French","fr",1]];"#
        );
        assert_eq!(read("other_languages.js"), "var other_languages_json_data = [];");
    }
}
