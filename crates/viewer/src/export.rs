//! Export Adapter.
//!
//! Captures slides through a [`Rasterizer`] one at a time and hands the
//! images to an output: a PDF [`PageAssembler`], a single PNG, or a ZIP of
//! PNGs. While a slide is captured the deck is in capture mode with only
//! that slide shown; the [`CaptureGuard`] puts the deck back when dropped,
//! whether the capture succeeded, failed, or was cancelled.
//!
//! Any failure aborts the whole export. Outputs are only produced after
//! every capture succeeded.

use std::future::Future;
use std::io::{Cursor, Write};

use pitchdeck_core::merge::SlideView;
use tokio_util::sync::CancellationToken;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::render::{render_capture, render_slide, RenderError};

/// A4 landscape page size in millimetres.
pub const PAGE_WIDTH_MM: f64 = 297.0;
pub const PAGE_HEIGHT_MM: f64 = 210.0;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("Export cancelled")]
    Cancelled,

    #[error("No slide at index {0}")]
    UnknownSlide(usize),

    #[error("Capture of slide {number} failed: {source}")]
    Capture { number: usize, source: RasterError },

    #[error("Page assembly failed: {0}")]
    Assemble(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Archive write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// A captured slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels.
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct RasterError(pub String);

/// Turns a full page of HTML into pixels.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, page_html: &str) -> impl Future<Output = Result<RasterImage, RasterError>> + Send;
}

/// Where an image sits on a page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Builds a paged document. `finish` is only called once every page has
/// been added.
pub trait PageAssembler {
    fn add_page(&mut self, image: &RasterImage, placement: Placement) -> Result<(), ExportError>;

    fn finish(self) -> Result<Vec<u8>, ExportError>;
}

/// Scale `width_px` x `height_px` to fit the page, keeping aspect ratio,
/// and centre it. `None` for an empty image.
pub fn fit_page(width_px: u32, height_px: u32, page_width_mm: f64, page_height_mm: f64) -> Option<Placement> {
    if width_px == 0 || height_px == 0 {
        return None;
    }
    let (w, h) = (f64::from(width_px), f64::from(height_px));
    let ratio = (page_width_mm / w).min(page_height_mm / h);
    let (width_mm, height_mm) = (w * ratio, h * ratio);
    Some(Placement {
        x_mm: (page_width_mm - width_mm) / 2.0,
        y_mm: (page_height_mm - height_mm) / 2.0,
        width_mm,
        height_mm,
    })
}

// ---------------------------------------------------------------------------
// Capture mode
// ---------------------------------------------------------------------------

/// The rendered deck as seen by the exporter.
pub struct DeckView {
    views: Vec<SlideView>,
    capturing: Option<usize>,
}

impl DeckView {
    pub fn new(views: Vec<SlideView>) -> Self {
        Self {
            views,
            capturing: None,
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Index of the slide currently isolated for capture.
    pub fn capturing(&self) -> Option<usize> {
        self.capturing
    }

    /// Isolate slide `index`. The deck returns to normal display when the
    /// guard is dropped.
    pub fn capture(&mut self, index: usize) -> Result<CaptureGuard<'_>, ExportError> {
        let view = self.views.get(index).ok_or(ExportError::UnknownSlide(index))?;
        let slide = render_slide(view, false, true)?;
        let page_html = render_capture(&slide)?;
        self.capturing = Some(index);
        Ok(CaptureGuard {
            deck: self,
            page_html,
        })
    }
}

pub struct CaptureGuard<'a> {
    deck: &'a mut DeckView,
    page_html: String,
}

impl CaptureGuard<'_> {
    pub fn page_html(&self) -> &str {
        &self.page_html
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.deck.capturing = None;
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// A finished export ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// ZIP archive of slide PNGs named `slide-01.png`, `slide-02.png`, ...
pub struct ZipBundle {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl Default for ZipBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipBundle {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add the PNG for one-based slide `number`. PNG data is already
    /// compressed, so entries are stored.
    pub fn add_png(&mut self, number: usize, png: &[u8]) -> Result<(), ExportError> {
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        self.writer.start_file(format!("slide-{number:02}.png"), options)?;
        self.writer.write_all(png)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

pub struct Exporter<R> {
    rasterizer: R,
    deck_name: String,
}

impl<R: Rasterizer> Exporter<R> {
    /// `deck_name` prefixes every output file name.
    pub fn new(rasterizer: R, deck_name: impl Into<String>) -> Self {
        Self {
            rasterizer,
            deck_name: deck_name.into(),
        }
    }

    async fn capture_one(&self, deck: &mut DeckView, index: usize) -> Result<RasterImage, ExportError> {
        let guard = deck.capture(index)?;
        self.rasterizer
            .rasterize(guard.page_html())
            .await
            .map_err(|source| ExportError::Capture {
                number: index + 1,
                source,
            })
    }

    /// Capture every slide in order, strictly one at a time. Cancellation
    /// is checked before each capture.
    pub async fn capture_all(
        &self,
        deck: &mut DeckView,
        cancel: &CancellationToken,
    ) -> Result<Vec<RasterImage>, ExportError> {
        if deck.is_empty() {
            return Err(ExportError::Empty);
        }
        let total = deck.len();
        let mut images = Vec::with_capacity(total);
        for index in 0..total {
            if cancel.is_cancelled() {
                tracing::info!(captured = index, total, "Export cancelled");
                return Err(ExportError::Cancelled);
            }
            images.push(self.capture_one(deck, index).await?);
            tracing::debug!(slide = index + 1, total, "Slide captured");
        }
        Ok(images)
    }

    /// One A4 landscape page per slide.
    pub async fn export_pdf<P: PageAssembler>(
        &self,
        deck: &mut DeckView,
        mut assembler: P,
        cancel: &CancellationToken,
    ) -> Result<ExportFile, ExportError> {
        let images = self.capture_all(deck, cancel).await?;
        for (index, image) in images.iter().enumerate() {
            let placement = fit_page(image.width, image.height, PAGE_WIDTH_MM, PAGE_HEIGHT_MM)
                .ok_or_else(|| ExportError::Assemble(format!("Slide {} captured as an empty image", index + 1)))?;
            assembler.add_page(image, placement)?;
        }
        Ok(ExportFile {
            name: format!("{}.pdf", self.deck_name),
            bytes: assembler.finish()?,
        })
    }

    /// PNG of the slide at `index`.
    pub async fn export_png(&self, deck: &mut DeckView, index: usize) -> Result<ExportFile, ExportError> {
        let image = self.capture_one(deck, index).await?;
        Ok(ExportFile {
            name: format!("{}-slide-{}.png", self.deck_name, index + 1),
            bytes: image.png,
        })
    }

    /// Every slide as a PNG, bundled in one ZIP.
    pub async fn export_bundle(
        &self,
        deck: &mut DeckView,
        cancel: &CancellationToken,
    ) -> Result<ExportFile, ExportError> {
        let images = self.capture_all(deck, cancel).await?;
        let mut bundle = ZipBundle::new();
        for (index, image) in images.iter().enumerate() {
            bundle.add_png(index + 1, &image.png)?;
        }
        Ok(ExportFile {
            name: format!("{}-slides.zip", self.deck_name),
            bytes: bundle.finish()?,
        })
    }
}
