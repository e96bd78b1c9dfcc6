//! The slide pipeline: one deck in, one deck document out.
//!
//! ```text
//! deck ──▶ PDF ──▶ slide_<n>.png … ──▶ (prompt, image) ──▶ SlideRecord … ──▶ <stem>.json
//! ```
//!
//! All intermediate files live in a scratch directory created for the deck
//! and removed when the deck is done, whichever way it ends. Only two things
//! end a deck early: conversion failure and a rasteriser that produced no
//! slides. A failed generation call costs exactly one slide, which is
//! recorded with [`ERROR_SENTINEL`](crate::output::ERROR_SENTINEL) while
//! numbering carries on.

use crate::config::DescribeConfig;
use crate::error::{DeckError, Ppt2DescError};
use crate::output::{deck_name, DeckDocument, DeckSummary, SlideRecord};
use crate::pipeline::convert::{DeckConverter, LibreOfficeConverter};
use crate::pipeline::llm::{GenerationClient, LlmGenerationClient};
use crate::pipeline::normalize::Canvas;
use crate::pipeline::rate_limit::RateLimiter;
use crate::pipeline::render::{sort_by_slide_number, PageRasterizer, PdfiumRasterizer};
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Converter, rasteriser and generation client composed for sequential use.
#[derive(Clone)]
pub struct SlidePipeline {
    converter: Arc<dyn DeckConverter>,
    rasterizer: Arc<dyn PageRasterizer>,
    client: Arc<dyn GenerationClient>,
    progress: Option<ProgressCallback>,
}

impl SlidePipeline {
    pub fn new(
        converter: Arc<dyn DeckConverter>,
        rasterizer: Arc<dyn PageRasterizer>,
        client: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            converter,
            rasterizer,
            client,
            progress: None,
        }
    }

    /// LibreOffice + pdfium + the provider the config resolves to.
    pub fn from_config(config: &DescribeConfig) -> Result<Self, Ppt2DescError> {
        let canvas = Canvas {
            width: config.canvas_width,
            height: config.canvas_height,
            background: config.background,
        };
        let converter = LibreOfficeConverter::from_config(config);
        debug!("Using converter {}", converter.executable().display());

        let rasterizer = PdfiumRasterizer::new(canvas).with_library(config.pdfium_library.clone());
        let client = LlmGenerationClient::from_config(config)?;

        Ok(Self::new(Arc::new(converter), Arc::new(rasterizer), Arc::new(client))
            .with_progress(config.progress_callback.clone()))
    }

    pub fn with_progress(mut self, progress: Option<ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> Option<&ProgressCallback> {
        self.progress.as_ref()
    }

    /// Model identifier written into deck documents.
    pub fn model_id(&self) -> &str {
        self.client.model_id()
    }

    /// Describe one deck and write `<deck-stem>.json` into `output_dir`.
    ///
    /// `limiter` paces generation calls; pass the same limiter for every deck
    /// to keep one budget across a batch.
    pub async fn process(
        &self,
        deck_path: &Path,
        output_dir: &Path,
        prompt: &str,
        limiter: &mut RateLimiter,
    ) -> Result<DeckSummary, DeckError> {
        let deck = deck_name(deck_path);
        let scratch = tempfile::Builder::new()
            .prefix("ppt2desc-")
            .tempdir()
            .map_err(|e| DeckError::Internal(format!("cannot create scratch directory: {e}")))?;

        let result = self
            .process_in(&deck, deck_path, output_dir, prompt, limiter, scratch.path())
            .await;

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(
                "{}: failed to remove scratch directory {}: {}",
                deck,
                scratch_path.display(),
                e
            );
        }
        result
    }

    async fn process_in(
        &self,
        deck: &str,
        deck_path: &Path,
        output_dir: &Path,
        prompt: &str,
        limiter: &mut RateLimiter,
        scratch_dir: &Path,
    ) -> Result<DeckSummary, DeckError> {
        let start = Instant::now();

        // ── Step 1: Deck → PDF ──────────────────────────────────────────────
        let pdf_path = self.converter.convert(deck_path, scratch_dir).await?;

        // ── Step 2: PDF → slide images ──────────────────────────────────────
        let mut images = self.rasterizer.rasterize(&pdf_path, scratch_dir).await;
        if images.is_empty() {
            return Err(DeckError::NoPages {
                pdf: pdf_path
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| pdf_path.clone()),
            });
        }
        sort_by_slide_number(&mut images);
        let total = images.len();
        info!("{}: rasterised {} slides", deck, total);

        if let Some(cb) = self.progress() {
            cb.on_deck_start(deck, total);
        }

        // ── Step 3: Describe each slide in order ────────────────────────────
        let mut slides = Vec::with_capacity(total);
        for (idx, image) in images.iter().enumerate() {
            let number = idx + 1;
            limiter.acquire().await;

            if let Some(cb) = self.progress() {
                cb.on_slide_start(deck, number, total);
            }

            match self.client.generate(prompt, image).await {
                Ok(content) => {
                    if let Some(cb) = self.progress() {
                        cb.on_slide_complete(deck, number, total, content.len());
                    }
                    slides.push(SlideRecord { number, content });
                }
                Err(e) => {
                    error!("{}: error generating content for slide {}: {}", deck, number, e);
                    if let Some(cb) = self.progress() {
                        cb.on_slide_error(deck, number, total, &e.to_string());
                    }
                    slides.push(SlideRecord::failed(number));
                }
            }
        }

        // ── Step 4: Assemble and persist ────────────────────────────────────
        let document = DeckDocument {
            deck: deck.to_string(),
            model: self.client.model_id().to_string(),
            slides,
        };
        let failed_slides = document.failed_slides();
        let output_path = document.write_to(output_dir).await?;

        info!(
            "{}: described {} slides ({} failed) in {}ms",
            deck,
            total,
            failed_slides,
            start.elapsed().as_millis()
        );

        Ok(DeckSummary {
            deck: deck.to_string(),
            output_path,
            images: images.iter().map(|p| deck_name(p)).collect(),
            failed_slides,
        })
    }
}
