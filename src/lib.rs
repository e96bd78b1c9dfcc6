//! # ppt2desc
//!
//! Turn presentation decks into structured, per-slide descriptions using
//! Vision Language Models (VLMs).
//!
//! Speaker notes and slide XML miss most of what a slide says: charts,
//! diagrams, screenshots and layout. This crate renders every slide to an
//! image and asks a VLM to describe it, producing one JSON document per deck
//! with one entry per slide.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck (.pptx, .ppt, .odp, …)
//!  │
//!  ├─ 1. Input     resolve a deck file or scan a directory of decks
//!  ├─ 2. Convert   deck → PDF with headless LibreOffice
//!  ├─ 3. Render    PDF pages → fixed-size PNGs via pdfium (spawn_blocking)
//!  ├─ 4. Pace      minimum interval between generation calls
//!  ├─ 5. VLM       one call per slide to gpt-4.1-nano / claude / gemini / …
//!  └─ 6. Output    <deck-stem>.json with { deck, model, slides: [...] }
//! ```
//!
//! Decks are processed sequentially and slides in page order. A failed deck
//! does not stop the batch; a failed slide does not stop its deck.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ppt2desc::{run_batch, DescribeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = DescribeConfig::builder().rate_limit(30).build()?;
//!     let report = run_batch("decks/", "out/", &config).await?;
//!     eprintln!("{} succeeded, {} failed", report.succeeded(), report.failed());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ppt2desc` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Runtime Requirements
//!
//! * LibreOffice (`soffice`) on `PATH`, in a standard install location, or
//!   passed explicitly.
//! * The pdfium shared library, found through `PDFIUM_LIB_PATH` or the
//!   system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod describe;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, run_batch_with};
pub use config::{DescribeConfig, DescribeConfigBuilder, RateLimitScope, DEFAULT_MODEL};
pub use describe::SlidePipeline;
pub use error::{ConversionError, DeckError, GenerationError, Ppt2DescError};
pub use output::{BatchReport, DeckDocument, DeckOutcome, DeckSummary, SlideRecord, ERROR_SENTINEL};
pub use pipeline::convert::{DeckConverter, LibreOfficeConverter};
pub use pipeline::llm::{GenerationClient, LlmGenerationClient};
pub use pipeline::normalize::Canvas;
pub use pipeline::rate_limit::RateLimiter;
pub use pipeline::render::{PageRasterizer, PdfiumRasterizer};
pub use progress::{DescribeProgressCallback, NoopProgressCallback, ProgressCallback};
