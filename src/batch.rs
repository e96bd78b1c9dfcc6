//! Batch driver: run the slide pipeline over every deck an input names.
//!
//! Decks are processed one at a time in sorted order. A deck that fails is
//! logged with its name and the stage that failed, recorded in the
//! [`BatchReport`], and the batch moves on. Only problems that stop the
//! run from starting at all (missing input, unwritable output directory,
//! unresolvable provider) are returned as `Err`.
//!
//! Two decks that share a stem (`deck.ppt`, `deck.pptx`) map to the same
//! `<stem>.json`. The first one in sorted order keeps it; later ones fail
//! with [`DeckError::OutputCollision`] before any conversion or generation
//! call is made.

use crate::config::{DescribeConfig, RateLimitScope};
use crate::describe::SlidePipeline;
use crate::error::{DeckError, Ppt2DescError};
use crate::output::{deck_name, document_file_name, BatchReport, DeckOutcome, DeckSummary};
use crate::pipeline::input::resolve_decks;
use crate::pipeline::rate_limit::RateLimiter;
use crate::prompts::assemble_prompt;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Describe every deck under `input`, writing one JSON document per deck
/// into `output_dir`.
///
/// This is the primary entry point for the library. It builds the default
/// pipeline (LibreOffice, pdfium, the configured provider) from `config`.
///
/// # Errors
/// Returns `Err` only for run-fatal problems; per-deck failures are in the
/// returned report.
pub async fn run_batch(
    input: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &DescribeConfig,
) -> Result<BatchReport, Ppt2DescError> {
    let pipeline = SlidePipeline::from_config(config)?;
    run_batch_with(&pipeline, input.as_ref(), output_dir.as_ref(), config).await
}

/// [`run_batch`] with a caller-supplied pipeline.
///
/// Only the prompt and rate-limit settings of `config` are read here; the
/// pipeline carries everything else.
pub async fn run_batch_with(
    pipeline: &SlidePipeline,
    input: &Path,
    output_dir: &Path,
    config: &DescribeConfig,
) -> Result<BatchReport, Ppt2DescError> {
    let start = Instant::now();
    let decks = resolve_decks(input)?;
    if decks.is_empty() {
        warn!("No presentation decks found in {}", input.display());
    }

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|source| Ppt2DescError::OutputDirFailed {
            path: output_dir.to_path_buf(),
            source,
        })?;

    info!(
        "Describing {} deck(s) with {} into {}",
        decks.len(),
        pipeline.model_id(),
        output_dir.display()
    );
    if let Some(cb) = pipeline.progress() {
        cb.on_batch_start(decks.len());
    }

    let mut batch_limiter = RateLimiter::new(config.rate_limit);
    let mut report = BatchReport::default();
    // output file name -> deck that wrote it
    let mut written: HashMap<String, String> = HashMap::new();

    for deck_path in decks {
        let name = deck_name(&deck_path);
        info!("Processing {}", name);

        let file_name = document_file_name(&name);
        let result = if let Some(earlier) = written.get(&file_name) {
            warn!(
                "{} would overwrite {}, already written for {}",
                name, file_name, earlier
            );
            Err(DeckError::OutputCollision {
                path: output_dir.join(&file_name),
                earlier: earlier.clone(),
            })
        } else {
            match config.rate_limit_scope {
                RateLimitScope::Batch => {
                    describe_deck(pipeline, &deck_path, output_dir, config, &mut batch_limiter)
                        .await
                }
                RateLimitScope::PerDeck => {
                    let mut limiter = RateLimiter::new(config.rate_limit);
                    describe_deck(pipeline, &deck_path, output_dir, config, &mut limiter).await
                }
            }
        };
        if result.is_ok() {
            written.insert(file_name, name.clone());
        }

        match &result {
            Ok(summary) => info!(
                "Successfully processed {}: {} slides written to {}",
                name,
                summary.slide_count(),
                summary.output_path.display()
            ),
            Err(e) => error!("Failed to process {}: {}", name, e),
        }
        if let Some(cb) = pipeline.progress() {
            let err = result.as_ref().err().map(|e| e.to_string());
            cb.on_deck_complete(&name, err.as_deref());
        }

        report.decks.push(DeckOutcome { deck_path, result });
    }

    info!(
        "Batch complete: {} succeeded, {} failed, {} slide(s) with errors in {:.1}s",
        report.succeeded(),
        report.failed(),
        report.failed_slides(),
        start.elapsed().as_secs_f64()
    );
    if let Some(cb) = pipeline.progress() {
        cb.on_batch_complete(report.succeeded(), report.failed());
    }

    Ok(report)
}

/// Prompt assembly is per deck so a bad template fails decks, not the run.
async fn describe_deck(
    pipeline: &SlidePipeline,
    deck_path: &Path,
    output_dir: &Path,
    config: &DescribeConfig,
    limiter: &mut RateLimiter,
) -> Result<DeckSummary, DeckError> {
    let prompt = assemble_prompt(config).await?;
    pipeline.process(deck_path, output_dir, &prompt, limiter).await
}
