//! Error types for the ppt2desc library.
//!
//! Failures are split by how far they reach:
//!
//! * [`Ppt2DescError`] — **Run-fatal**: the batch cannot start at all
//!   (input path missing, output directory unwritable, provider not
//!   configured). Returned as `Err` from [`crate::batch::run_batch`].
//!
//! * [`DeckError`] — **Deck-fatal**: one deck could not be described
//!   (conversion failed, zero pages rendered, prompt unreadable). The batch
//!   driver logs it, records it in the deck's [`crate::output::DeckOutcome`]
//!   and moves on to the next deck.
//!
//! * [`GenerationError`] — **Slide-recoverable**: the model call for one
//!   slide failed. The slide gets the error sentinel as its content and the
//!   deck continues with the next slide.
//!
//! [`ConversionError`] is the Deck Converter's own error and surfaces as
//! [`DeckError::Conversion`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a whole run before any deck is processed.
#[derive(Debug, Error)]
pub enum Ppt2DescError {
    /// The input file or directory does not exist.
    #[error("Input not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The input is a file, but not a recognised presentation deck.
    #[error("'{path}' is not a presentation deck (expected .ppt, .pptx, .pptm, .pps, .ppsx or .odp)")]
    NotADeck { path: PathBuf },

    /// The output directory could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failures of the external deck-to-PDF conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The converter executable does not exist at the configured path.
    #[error("Converter executable not found: '{path}'\nInstall LibreOffice or pass --libreoffice-path.")]
    ConverterNotFound { path: PathBuf },

    /// The deck file does not exist.
    #[error("Deck file not found: '{path}'")]
    DeckNotFound { path: PathBuf },

    /// The deck file has an extension the converter is not asked to handle.
    #[error("Unsupported deck format: '{path}'")]
    UnsupportedDeck { path: PathBuf },

    /// The scratch profile directory cannot be expressed as a `file://` URL.
    #[error("Cannot build a file URL for converter profile '{path}'")]
    ProfileUrl { path: PathBuf },

    /// The converter process could not be started.
    #[error("Failed to launch converter '{path}': {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but exited with a failure status.
    #[error("Converter exited with status {exit_code:?}: {stderr}")]
    ProcessFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The converter exited successfully but did not produce the PDF.
    #[error("Converter reported success but '{expected}' was not produced")]
    OutputMissing { expected: PathBuf },
}

/// A failure that ends processing of a single deck.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Deck → PDF conversion failed.
    #[error("conversion stage failed: {0}")]
    Conversion(#[from] ConversionError),

    /// The PDF was produced but no page could be rasterised.
    #[error("rasterisation stage produced no slides from '{pdf}'")]
    NoPages { pdf: PathBuf },

    /// The prompt template could not be read.
    #[error("prompt stage failed: cannot read template '{path}': {source}")]
    PromptLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The deck document could not be serialised.
    #[error("output stage failed: cannot serialise deck document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The deck document could not be written.
    #[error("output stage failed: cannot write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An earlier deck in the same batch already wrote this output file.
    #[error("output stage failed: '{path}' was already written for '{earlier}' in this batch")]
    OutputCollision { path: PathBuf, earlier: String },

    /// Unexpected internal error (scratch storage, task join).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single slide's generation call.
///
/// Never propagated past the slide loop; the slide is recorded with
/// [`crate::output::ERROR_SENTINEL`] instead.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The rendered slide image could not be read or encoded.
    #[error("cannot read slide image '{path}': {detail}")]
    ImageUnreadable { path: PathBuf, detail: String },

    /// The provider returned an error (transport, auth, model).
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider did not answer within the configured timeout.
    #[error("generation call timed out after {secs}s")]
    Timeout { secs: u64 },
}
