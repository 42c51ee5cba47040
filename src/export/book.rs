//! Export of a single book.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::files::Handled;
use super::{ExportSummary, Exporter};
use crate::cache::companions_in;
use crate::catalog::{Book, Format};
use crate::cleanup::{StripOutcome, Unchanged};
use crate::error::{Error, Result};
use crate::naming::{article_name_for, fname_for};
use crate::page::{PageMode, prepare_page};
use crate::render::{CoverPage, SiteContext};
use crate::util::is_html_name;

impl Exporter<'_> {
    /// Write the article, companions, format files and cover page of `book`.
    ///
    /// `listing` is the sorted cache listing from [`DownloadCache::list`].
    /// A missing source skips that one file; companion failures skip that
    /// companion. Other errors end this book.
    ///
    /// [`DownloadCache::list`]: crate::cache::DownloadCache::list
    pub fn export_book(
        &self,
        book: &Book,
        listing: &[String],
        site: &SiteContext,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        info!(book = book.id, title = %book.title, "exporting book");

        match self.cache.existing(book, Format::Html) {
            Ok(src) => {
                let dst = self.config.static_folder.join(article_name_for(book, false));
                self.export_page(book, &fs::read(src)?, &dst, summary)?;
            }
            Err(Error::MissingSource(path)) => {
                warn!(book = book.id, path = %path.display(), "missing HTML content");
                summary.missing_sources += 1;
            }
            Err(err) => return Err(err),
        }

        self.export_companions(book, listing, summary);
        self.export_formats(book, summary)?;
        self.export_cover_page(book, site)?;
        summary.books += 1;
        Ok(())
    }

    fn export_page(
        &self,
        book: &Book,
        raw: &[u8],
        dst: &Path,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        let mode = PageMode::Standalone {
            book,
            renderer: self.renderer.as_ref(),
        };
        let page = prepare_page(raw, mode, &self.markers);
        fs::write(dst, page.html)?;
        summary.record_page(&page.outcome);
        info!(dst = %dst.display(), "wrote page");
        Ok(())
    }

    fn export_companions(&self, book: &Book, listing: &[String], summary: &mut ExportSummary) {
        for name in companions_in(listing, book.id) {
            let src = self.cache.root().join(name);
            let dst = self.config.static_folder.join(name);

            let handled = if is_html_name(name) {
                self.export_companion_page(book, &src, &dst, summary).map(|()| None)
            } else {
                self.handle_companion_file(&src, &dst).map(Some)
            };
            match handled {
                Ok(Some(handled)) => summary.record_file(handled),
                Ok(None) => {}
                Err(err) => {
                    warn!(book = book.id, file = %name, "companion file skipped: {err}");
                    summary.skipped_files += 1;
                }
            }
        }
    }

    fn export_companion_page(
        &self,
        book: &Book,
        src: &Path,
        dst: &Path,
        summary: &mut ExportSummary,
    ) -> Result<()> {
        let raw = fs::read(src)?;
        self.export_page(book, &raw, dst, summary)
    }

    fn export_formats(&self, book: &Book, summary: &mut ExportSummary) -> Result<()> {
        for format in self.config.export_formats() {
            if format == Format::Html || !book.has_format(format) {
                continue;
            }
            let src = self.cache.path_for(book, format);
            let dst = self.config.static_folder.join(fname_for(book, format));
            match self.handle_companion_file(&src, &dst) {
                Ok(handled) => summary.record_file(handled),
                Err(Error::MissingSource(path)) => {
                    warn!(book = book.id, %format, path = %path.display(), "missing format file");
                    summary.missing_sources += 1;
                }
                Err(err) => {
                    warn!(book = book.id, %format, "format file skipped: {err}");
                    summary.skipped_files += 1;
                }
            }
        }
        Ok(())
    }

    fn export_cover_page(&self, book: &Book, site: &SiteContext) -> Result<()> {
        let cover_img = format!("{}_cover.jpg", book.id);
        let cover_img = self
            .config
            .static_folder
            .join(&cover_img)
            .is_file()
            .then_some(cover_img);

        let page = CoverPage::new(site, book, cover_img);
        let dst = self.config.static_folder.join(article_name_for(book, true));
        fs::write(&dst, self.renderer.cover_page(&page))?;
        info!(dst = %dst.display(), "wrote cover page");
        Ok(())
    }
}

impl ExportSummary {
    pub(crate) fn record_page(&mut self, outcome: &StripOutcome) {
        self.pages += 1;
        match outcome {
            StripOutcome::Stripped { .. } => self.pages_stripped += 1,
            StripOutcome::Unchanged(Unchanged::SingleWrapper) => self.already_clean += 1,
            StripOutcome::Unchanged(Unchanged::NoMarker) => self.pages_unchanged += 1,
            StripOutcome::Failed(_) => self.pages_failed += 1,
        }
    }

    pub(crate) fn record_file(&mut self, handled: Handled) {
        match handled {
            Handled::Image => self.images += 1,
            Handled::Epub => self.epubs_patched += 1,
            Handled::Linked => self.files_linked += 1,
            Handled::Skipped => self.skipped_files += 1,
        }
    }
}
