//! HTML fragments and pages generated from catalog data.
//!
//! The exporter only talks to the [`Renderer`] trait; [`HtmlRenderer`] is the
//! built-in implementation used by the CLI.

use std::fmt::Write;

use serde_json::{Value, json};

use crate::catalog::{Book, Format, LanguageCount};
use crate::naming::{article_name_for, fname_for, urlencode};
use crate::util::escape_xml;

/// Data shared by every full page.
#[derive(Debug, Clone)]
pub struct SiteContext {
    /// Localised UI strings, serialized as JSON for the client scripts.
    pub l10n_strings: String,
    pub ui_languages: Vec<String>,
    pub languages: Vec<LanguageCount>,
}

impl SiteContext {
    pub fn new(languages: Vec<LanguageCount>) -> Self {
        Self {
            l10n_strings: l10n_strings().to_string(),
            ui_languages: vec!["en".to_string(), "fr".to_string()],
            languages,
        }
    }
}

/// Everything the cover page of one book needs.
#[derive(Debug, Clone)]
pub struct CoverPage<'a> {
    pub site: &'a SiteContext,
    pub book: &'a Book,
    /// `{id}_cover.jpg` when that image was exported.
    pub cover_img: Option<String>,
    pub formats: Vec<Format>,
    /// l10n id for generic author names such as "Anonymous".
    pub translate_author: Option<String>,
    /// l10n id for generic license slugs such as "PD".
    pub translate_license: Option<String>,
}

impl<'a> CoverPage<'a> {
    pub fn new(site: &'a SiteContext, book: &'a Book, cover_img: Option<String>) -> Self {
        let author_name = book.author.name();
        let translate_author = matches!(author_name.as_str(), "Anonymous" | "Various")
            .then(|| format!("author-{}", author_name.to_lowercase()));
        let translate_license = matches!(book.license.slug.as_str(), "PD" | "Copyright")
            .then(|| format!("license-{}", book.license.slug.to_lowercase()));
        Self {
            site,
            book,
            cover_img,
            formats: book.formats.clone(),
            translate_author,
            translate_license,
        }
    }
}

/// Produces the HTML the exporter writes or injects.
pub trait Renderer {
    /// Metadata box inserted at the top of every book page. Must contain a
    /// `<div>`.
    fn info_box(&self, book: &Book) -> String;

    fn cover_page(&self, page: &CoverPage<'_>) -> String;

    /// The `Home.html` landing page.
    fn home_page(&self, site: &SiteContext) -> String;
}

/// Font Awesome icon class for a format link.
pub fn fa_for_format(format: &str) -> &'static str {
    match format {
        "html" => "",
        "info" => "fa-info-circle",
        "epub" => "fa-book",
        "pdf" => "fa-file-pdf-o",
        _ => "fa-file-o",
    }
}

/// Built-in renderer producing the pages of the static site.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    fn page_head(out: &mut String, title: &str, site: &SiteContext) {
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\" />\n");
        let _ = writeln!(out, "<title>{}</title>", escape_xml(title));
        out.push_str("<link rel=\"stylesheet\" href=\"css/style.css\" />\n");
        out.push_str("<link rel=\"stylesheet\" href=\"jquery-ui/jquery-ui.min.css\" />\n");
        out.push_str("<link rel=\"stylesheet\" href=\"datatables/datatables.min.css\" />\n");
        out.push_str("<link rel=\"stylesheet\" href=\"fonts/font-awesome.min.css\" />\n");
        out.push_str("<script src=\"jquery/jquery.min.js\"></script>\n");
        out.push_str("<script src=\"jquery-ui/jquery-ui.min.js\"></script>\n");
        out.push_str("<script src=\"datatables/datatables.min.js\"></script>\n");
        let _ = writeln!(
            out,
            "<script>var l10n_strings = {}; var ui_languages = {};</script>",
            site.l10n_strings,
            Value::from(site.ui_languages.clone())
        );
        out.push_str("<script src=\"js/tools.js\"></script>\n");
        out.push_str("</head>\n");
    }

    fn language_selector(out: &mut String, site: &SiteContext) {
        out.push_str("<select id=\"language_filter\">\n");
        out.push_str("<option value=\"\" data-l10n-id=\"all-languages\">All languages</option>\n");
        for lang in &site.languages {
            let _ = writeln!(
                out,
                "<option value=\"{}\">{} ({})</option>",
                escape_xml(&lang.code),
                escape_xml(&lang.name),
                lang.count
            );
        }
        out.push_str("</select>\n");
    }
}

impl Renderer for HtmlRenderer {
    fn info_box(&self, book: &Book) -> String {
        let mut out = String::new();
        out.push_str("<div id=\"book_infobox\" class=\"infobox\">\n");
        let _ = writeln!(
            out,
            "<a class=\"fa {}\" href=\"{}\" title=\"{}\"></a>",
            fa_for_format("info"),
            urlencode(&article_name_for(book, true)),
            escape_xml(&book.title)
        );
        let _ = writeln!(out, "<h1>{}</h1>", escape_xml(&book.title));
        if let Some(subtitle) = &book.subtitle {
            let _ = writeln!(out, "<h2>{}</h2>", escape_xml(subtitle));
        }
        let _ = writeln!(
            out,
            "<p class=\"author\"><a href=\"Home.html#author={}\">{}</a></p>",
            escape_xml(&book.author.id),
            escape_xml(&book.author.name())
        );
        out.push_str("</div>");
        out
    }

    fn cover_page(&self, page: &CoverPage<'_>) -> String {
        let book = page.book;
        let mut out = String::new();
        Self::page_head(&mut out, &book.title, page.site);
        out.push_str("<body class=\"cover\">\n<div id=\"cover_article\">\n");

        if let Some(img) = &page.cover_img {
            let _ = writeln!(
                out,
                "<img class=\"cover\" src=\"{}\" alt=\"{}\" />",
                urlencode(img),
                escape_xml(&book.title)
            );
        }
        let _ = writeln!(out, "<h1>{}</h1>", escape_xml(&book.title));
        if let Some(subtitle) = &book.subtitle {
            let _ = writeln!(out, "<h2>{}</h2>", escape_xml(subtitle));
        }

        let author_l10n = page
            .translate_author
            .as_ref()
            .map(|id| format!(" data-l10n-id=\"{id}\""))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<p class=\"author\"{author_l10n}>{}</p>",
            escape_xml(&book.author.name())
        );
        let license_l10n = page
            .translate_license
            .as_ref()
            .map(|id| format!(" data-l10n-id=\"{id}\""))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "<p class=\"license\"{license_l10n}>{}</p>",
            escape_xml(&book.license.name)
        );
        let _ = writeln!(
            out,
            "<p class=\"popularity\" data-stars=\"{0}\">{1}</p>",
            book.popularity,
            "★".repeat(book.popularity as usize)
        );

        out.push_str("<ul class=\"formats\">\n");
        for &format in &page.formats {
            let href = match format {
                Format::Html => article_name_for(book, false),
                other => fname_for(book, other),
            };
            let _ = writeln!(
                out,
                "<li><a class=\"fa {}\" href=\"{}\">{}</a></li>",
                fa_for_format(format.as_str()),
                urlencode(&href),
                format.as_str().to_uppercase()
            );
        }
        out.push_str("</ul>\n</div>\n</body>\n</html>\n");
        out
    }

    fn home_page(&self, site: &SiteContext) -> String {
        let mut out = String::new();
        Self::page_head(&mut out, "Library", site);
        out.push_str("<body class=\"home\">\n<div id=\"books_table_container\">\n");
        Self::language_selector(&mut out, site);
        out.push_str(
            "<table id=\"books_table\" data-source=\"full_by_popularity.js\">\n\
             <thead><tr><th data-l10n-id=\"title\">Title</th><th data-l10n-id=\"author\">Author</th></tr></thead>\n\
             <tbody></tbody>\n</table>\n",
        );
        out.push_str("</div>\n<script src=\"js/index.js\"></script>\n</body>\n</html>\n");
        out
    }
}

/// UI strings for the languages in [`SiteContext::ui_languages`].
pub fn l10n_strings() -> Value {
    json!({
        "en": {
            "all-languages": "All languages",
            "title": "Title",
            "author": "Author",
            "author-anonymous": "Anonymous",
            "author-various": "Various",
            "license-pd": "Public domain in the USA.",
            "license-copyright": "Copyrighted. Read the copyright notice inside this book for details.",
        },
        "fr": {
            "all-languages": "Toutes les langues",
            "title": "Titre",
            "author": "Auteur",
            "author-anonymous": "Anonyme",
            "author-various": "Divers",
            "license-pd": "Domaine public aux États-Unis.",
            "license-copyright": "Protégé par le droit d'auteur. Lisez la notice à l'intérieur du livre.",
        },
    })
}
