//! Catalog records.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::{Value, json};

/// Content formats the exporter knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Format {
    Html,
    Epub,
    Pdf,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Html, Format::Epub, Format::Pdf];

    pub fn mime(self) -> &'static str {
        match self {
            Format::Html => "text/html",
            Format::Epub => "application/epub+zip",
            Format::Pdf => "application/pdf",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Format> {
        Format::ALL.into_iter().find(|f| f.mime() == mime)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Epub => "epub",
            Format::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Format::Html),
            "epub" => Ok(Format::Epub),
            "pdf" => Ok(Format::Pdf),
            other => Err(format!("unknown format `{other}`")),
        }
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    /// Catalog author id, used in data file names.
    pub id: String,
    pub last_name: String,
    pub first_names: Option<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

impl Author {
    /// Display name: first names then last name, either may be missing.
    pub fn name(&self) -> String {
        let first = self.first_names.as_deref().map(str::trim).unwrap_or("");
        let last = self.last_name.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            _ => last.to_string(),
        }
    }

    /// Summary record used by the author data files.
    pub fn to_array(&self) -> Value {
        json!([self.name(), self.id, self.birth_year, self.death_year])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct License {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u32,
    pub title: String,
    pub subtitle: Option<String>,
    pub language: String,
    pub author: Author,
    pub license: License,
    pub downloads: u64,
    /// Available formats, in [`Format::ALL`] order.
    pub formats: Vec<Format>,
    /// Star rating (1..=5), set during export.
    pub popularity: u8,
}

impl Book {
    pub fn has_format(&self, format: Format) -> bool {
        self.formats.contains(&format)
    }

    /// `"101"`-style availability flags for html, epub and pdf.
    pub fn format_flags(&self) -> String {
        Format::ALL
            .iter()
            .map(|&f| if self.has_format(f) { '1' } else { '0' })
            .collect()
    }

    /// Summary record used by the book data files.
    pub fn to_array(&self) -> Value {
        json!([
            self.title,
            self.author.name(),
            self.author.id,
            self.format_flags(),
            self.id
        ])
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_author_name_variants() {
        assert_eq!(author("1", Some("Jane"), "Austen").name(), "Jane Austen");
        assert_eq!(author("2", None, "Anonymous").name(), "Anonymous");
        assert_eq!(author("3", Some("Homer"), "").name(), "Homer");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("EPUB".parse::<Format>(), Ok(Format::Epub));
        assert!("mobi".parse::<Format>().is_err());
        assert_eq!(Format::from_mime("application/pdf"), Some(Format::Pdf));
    }

    #[test]
    fn test_book_to_array() {
        let book = book(1342, "Pride and Prejudice", "en", 100);
        assert_eq!(
            book.to_array(),
            json!(["Pride and Prejudice", "Jane Austen", "1", "110", 1342])
        );
    }
}
