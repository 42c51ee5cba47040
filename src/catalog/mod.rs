//! Book metadata store.
//!
//! The catalog lives in a SQLite database. An export run loads the filtered
//! collection once with [`Catalog::filtered_books`] and works in memory from
//! there on.

mod language;
mod model;

pub use language::{LanguageCount, language_groups, language_name, languages_with_count};
pub use model::{Author, Book, Format, License};

#[cfg(test)]
pub(crate) use model::fixtures;

use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use tracing::debug;

use crate::error::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS authors (
    gut_id TEXT PRIMARY KEY,
    last_name TEXT NOT NULL,
    first_names TEXT,
    birth_year INTEGER,
    death_year INTEGER
);
CREATE TABLE IF NOT EXISTS licenses (
    slug TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    subtitle TEXT,
    author_id TEXT NOT NULL REFERENCES authors(gut_id),
    license_slug TEXT NOT NULL REFERENCES licenses(slug),
    language TEXT NOT NULL,
    downloads INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS book_formats (
    book_id INTEGER NOT NULL REFERENCES books(id),
    mime TEXT NOT NULL,
    PRIMARY KEY (book_id, mime)
);
";

/// Criteria for [`Catalog::filtered_books`]. Empty lists do not filter.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub languages: Vec<String>,
    /// Keep books available in at least one of these formats.
    pub formats: Vec<Format>,
    pub only_books: Vec<u32>,
}

/// Connection to the catalog database.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open an existing catalog, creating missing tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// A throwaway in-memory catalog.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA encoding = 'UTF-8'", [])?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn insert_author(&self, author: &Author) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO authors (gut_id, last_name, first_names, birth_year, death_year)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                author.id,
                author.last_name,
                author.first_names,
                author.birth_year,
                author.death_year
            ],
        )?;
        Ok(())
    }

    pub fn insert_license(&self, license: &License) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO licenses (slug, name) VALUES (?1, ?2)",
            params![license.slug, license.name],
        )?;
        Ok(())
    }

    /// Insert a book along with its author, license and formats.
    pub fn insert_book(&self, book: &Book) -> Result<()> {
        self.insert_author(&book.author)?;
        self.insert_license(&book.license)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO books (id, title, subtitle, author_id, license_slug, language, downloads)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                book.id,
                book.title,
                book.subtitle,
                book.author.id,
                book.license.slug,
                book.language,
                book.downloads as i64
            ],
        )?;
        self.conn
            .execute("DELETE FROM book_formats WHERE book_id = ?1", params![book.id])?;
        for format in &book.formats {
            self.conn.execute(
                "INSERT INTO book_formats (book_id, mime) VALUES (?1, ?2)",
                params![book.id, format.mime()],
            )?;
        }
        Ok(())
    }

    pub fn author(&self, id: &str) -> Result<Option<Author>> {
        let author = self
            .conn
            .query_row(
                "SELECT gut_id, last_name, first_names, birth_year, death_year
                 FROM authors WHERE gut_id = ?1",
                params![id],
                |row| {
                    Ok(Author {
                        id: row.get(0)?,
                        last_name: row.get(1)?,
                        first_names: row.get(2)?,
                        birth_year: row.get(3)?,
                        death_year: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(author)
    }

    /// All languages present in the catalog, unfiltered.
    pub fn all_languages(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT language FROM books ORDER BY language")?;
        let langs = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(langs)
    }

    /// Books matching `filter`, ordered by id.
    pub fn filtered_books(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        let mut sql = String::from(
            "SELECT b.id, b.title, b.subtitle, b.language, b.downloads,
                    a.gut_id, a.last_name, a.first_names, a.birth_year, a.death_year,
                    l.slug, l.name
             FROM books b
             JOIN authors a ON a.gut_id = b.author_id
             JOIN licenses l ON l.slug = b.license_slug",
        );
        let mut clauses = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if !filter.languages.is_empty() {
            clauses.push(format!(
                "b.language IN ({})",
                placeholders(filter.languages.len())
            ));
            values.extend(filter.languages.iter().cloned().map(SqlValue::Text));
        }
        if !filter.only_books.is_empty() {
            clauses.push(format!("b.id IN ({})", placeholders(filter.only_books.len())));
            values.extend(filter.only_books.iter().map(|&id| SqlValue::Integer(id.into())));
        }
        if !filter.formats.is_empty() {
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM book_formats f WHERE f.book_id = b.id AND f.mime IN ({}))",
                placeholders(filter.formats.len())
            ));
            values.extend(
                filter
                    .formats
                    .iter()
                    .map(|f| SqlValue::Text(f.mime().to_string())),
            );
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY b.id");

        let formats = self.formats_by_book()?;
        let mut stmt = self.conn.prepare(&sql)?;
        let books = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                let id: u32 = row.get(0)?;
                let downloads: i64 = row.get(4)?;
                Ok(Book {
                    id,
                    title: row.get(1)?,
                    subtitle: row.get(2)?,
                    language: row.get(3)?,
                    downloads: downloads.max(0) as u64,
                    author: Author {
                        id: row.get(5)?,
                        last_name: row.get(6)?,
                        first_names: row.get(7)?,
                        birth_year: row.get(8)?,
                        death_year: row.get(9)?,
                    },
                    license: License {
                        slug: row.get(10)?,
                        name: row.get(11)?,
                    },
                    formats: formats.get(&id).cloned().unwrap_or_default(),
                    popularity: 0,
                })
            })?
            .collect::<rusqlite::Result<Vec<Book>>>()?;

        debug!(count = books.len(), "loaded filtered book collection");
        Ok(books)
    }

    fn formats_by_book(&self) -> Result<HashMap<u32, Vec<Format>>> {
        let mut stmt = self.conn.prepare("SELECT book_id, mime FROM book_formats")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)))?;

        let mut map: HashMap<u32, Vec<Format>> = HashMap::new();
        for row in rows {
            let (book_id, mime) = row?;
            if let Some(format) = Format::from_mime(&mime) {
                map.entry(book_id).or_default().push(format);
            }
        }
        for formats in map.values_mut() {
            formats.sort();
            formats.dedup();
        }
        Ok(map)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::fixtures::{author, book};
    use super::*;

    fn seeded() -> Catalog {
        let catalog = Catalog::in_memory().unwrap();
        let mut b1 = book(1, "Emma", "en", 50);
        b1.formats = vec![Format::Html];
        let mut b2 = book(2, "Candide", "fr", 80);
        b2.author = author("9", Some("Voltaire"), "");
        b2.formats = vec![Format::Epub, Format::Pdf];
        let mut b3 = book(3, "Persuasion", "en", 10);
        b3.formats = vec![Format::Pdf];
        for b in [&b1, &b2, &b3] {
            catalog.insert_book(b).unwrap();
        }
        catalog
    }

    fn ids(books: &[Book]) -> Vec<u32> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_unfiltered() {
        let catalog = seeded();
        let books = catalog.filtered_books(&BookFilter::default()).unwrap();
        assert_eq!(ids(&books), vec![1, 2, 3]);
        assert_eq!(books[1].author.name(), "Voltaire");
        assert_eq!(books[1].formats, vec![Format::Epub, Format::Pdf]);
        assert_eq!(books[1].downloads, 80);
    }

    #[test]
    fn test_filters_combine() {
        let catalog = seeded();
        let by_lang = catalog
            .filtered_books(&BookFilter {
                languages: vec!["en".into()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&by_lang), vec![1, 3]);

        let by_format = catalog
            .filtered_books(&BookFilter {
                formats: vec![Format::Html, Format::Epub],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&by_format), vec![1, 2]);

        let by_id = catalog
            .filtered_books(&BookFilter {
                languages: vec!["en".into()],
                only_books: vec![2, 3],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(ids(&by_id), vec![3]);
    }

    #[test]
    fn test_author_lookup_and_languages() {
        let catalog = seeded();
        assert_eq!(catalog.author("9").unwrap().unwrap().name(), "Voltaire");
        assert!(catalog.author("404").unwrap().is_none());
        assert_eq!(catalog.all_languages().unwrap(), vec!["en", "fr"]);
    }
}
