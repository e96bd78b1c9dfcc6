//! PDF rasterisation: render every page to a normalised PNG in scratch storage.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations.
//!
//! ## Naming
//!
//! Page *n* (1-indexed) is written as `slide_<n>.png`. The pipeline recovers
//! slide order by parsing that number back out of the name, never from
//! directory listing order, so `slide_10` sorts after `slide_2`.
//!
//! ## Failure policy
//!
//! A page that fails to render is logged and skipped. A document that cannot
//! be opened at all (or a pdfium library that cannot be bound) yields an
//! empty list rather than an error: "zero slides" is a deck-level outcome the
//! pipeline reports on its own.

use crate::pipeline::normalize::Canvas;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use pdfium_render::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File-name prefix of rendered slide images.
pub const SLIDE_PREFIX: &str = "slide_";

static SLIDE_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^slide_(\d+)\.(?:png|jpe?g)$").unwrap()
});

/// Turns a PDF into one image file per page.
///
/// Implementations write into `scratch_dir` and return the produced image
/// paths. They never fail as a whole: pages that cannot be produced are
/// left out and an unreadable document gives an empty list.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    async fn rasterize(&self, pdf_path: &Path, scratch_dir: &Path) -> Vec<PathBuf>;
}

/// The file name used for 1-indexed page `page_num`.
pub fn slide_file_name(page_num: usize) -> String {
    format!("{SLIDE_PREFIX}{page_num}.png")
}

/// Parse the 1-indexed page number out of a slide image path.
pub fn slide_number(path: &Path) -> Option<usize> {
    let name = path.file_name()?.to_str()?;
    SLIDE_FILE_RE
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Sort slide images by their parsed page number, ascending.
///
/// Names that do not follow the slide naming scheme keep their relative
/// order and go last.
pub fn sort_by_slide_number(paths: &mut [PathBuf]) {
    paths.sort_by_key(|p| slide_number(p).unwrap_or(usize::MAX));
}

/// pdfium-backed [`PageRasterizer`].
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    canvas: Canvas,
    library_path: Option<PathBuf>,
}

impl PdfiumRasterizer {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            library_path: None,
        }
    }

    /// Bind to an explicit pdfium shared library instead of the default lookup.
    pub fn with_library(mut self, path: Option<PathBuf>) -> Self {
        self.library_path = path;
        self
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn rasterize(&self, pdf_path: &Path, scratch_dir: &Path) -> Vec<PathBuf> {
        let pdf = pdf_path.to_path_buf();
        let out_dir = scratch_dir.to_path_buf();
        let canvas = self.canvas;
        let library = self.library_path.clone();

        match tokio::task::spawn_blocking(move || {
            render_pages_blocking(&pdf, &out_dir, canvas, library.as_deref())
        })
        .await
        {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Render task for {} panicked: {}", pdf_path.display(), e);
                Vec::new()
            }
        }
    }
}

/// Bind to pdfium: explicit path, then `PDFIUM_LIB_PATH`, then the system library.
fn bind_pdfium(library: Option<&Path>) -> Result<Pdfium, PdfiumError> {
    let explicit = library
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match explicit {
        Some(path) => Pdfium::bind_to_library(&path)?,
        None => Pdfium::bind_to_system_library()?,
    };
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf_path: &Path,
    out_dir: &Path,
    canvas: Canvas,
    library: Option<&Path>,
) -> Vec<PathBuf> {
    let pdfium = match bind_pdfium(library) {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to bind to pdfium library: {:?}", e);
            return Vec::new();
        }
    };

    let document = match pdfium.load_pdf_from_file(pdf_path, None) {
        Ok(d) => d,
        Err(e) => {
            warn!("Cannot open PDF {}: {:?}", pdf_path.display(), e);
            return Vec::new();
        }
    };

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut results = Vec::with_capacity(pages.len() as usize);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        match render_page(&page, page_num, out_dir, canvas) {
            Ok(path) => results.push(path),
            Err(detail) => warn!("Skipping page {}: rasterisation failed: {}", page_num, detail),
        }
    }

    results
}

/// Render one page at its fit scale, letterbox it and save it as PNG.
fn render_page(
    page: &PdfPage,
    page_num: usize,
    out_dir: &Path,
    canvas: Canvas,
) -> Result<PathBuf, String> {
    let scale = canvas.fit_scale(page.width().value, page.height().value);
    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| format!("{:?}", e))?;
    let image = bitmap.as_image();
    debug!(
        "Rendered page {} at scale {:.3} → {}x{} px",
        page_num,
        scale,
        image.width(),
        image.height()
    );

    let normalised = canvas.letterbox(&image);
    let path = out_dir.join(slide_file_name(page_num));
    normalised.save(&path).map_err(|e| e.to_string())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_round_trips_page_number() {
        assert_eq!(slide_file_name(7), "slide_7.png");
        assert_eq!(slide_number(Path::new("/tmp/x/slide_7.png")), Some(7));
        assert_eq!(slide_number(Path::new("slide_120.png")), Some(120));
    }

    #[test]
    fn slide_number_rejects_foreign_names() {
        assert_eq!(slide_number(Path::new("deck.pdf")), None);
        assert_eq!(slide_number(Path::new("slide_.png")), None);
        assert_eq!(slide_number(Path::new("myslide_3.png")), None);
        assert_eq!(slide_number(Path::new("slide_3.png.bak")), None);
    }

    #[test]
    fn sorting_is_numeric_not_lexical() {
        let mut paths: Vec<PathBuf> = ["slide_2.png", "slide_10.png", "slide_1.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_by_slide_number(&mut paths);
        let names: Vec<_> = paths.iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(names, ["slide_1.png", "slide_2.png", "slide_10.png"]);
    }

    #[test]
    fn unnumbered_names_go_last() {
        let mut paths: Vec<PathBuf> = ["cover.png", "slide_3.png", "slide_1.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_by_slide_number(&mut paths);
        assert_eq!(paths[0], PathBuf::from("slide_1.png"));
        assert_eq!(paths[2], PathBuf::from("cover.png"));
    }

    #[tokio::test]
    async fn unreadable_pdf_yields_no_pages() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("broken.pdf");
        std::fs::write(&pdf, b"not a pdf at all").unwrap();

        let pages = PdfiumRasterizer::default().rasterize(&pdf, dir.path()).await;
        assert!(pages.is_empty());
    }
}
