//! Deck → PDF conversion through an external LibreOffice process.
//!
//! LibreOffice is driven headless in convert-to-PDF mode and writes
//! `<deck-stem>.pdf` into the scratch directory. Three things can go wrong
//! and each is reported separately: the executable is missing, the process
//! exits non-zero, or it exits zero without writing the PDF (which
//! LibreOffice does for decks it cannot open).
//!
//! Every conversion gets its own LibreOffice user profile inside the scratch
//! directory. A shared profile makes a second `soffice` hand its work to an
//! already-running instance and exit immediately with nothing produced.

use crate::config::DescribeConfig;
use crate::error::ConversionError;
use crate::pipeline::input::DeckFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info, warn};
use url::Url;

/// Executable names tried on `PATH` when no converter is configured.
const CONVERTER_NAMES: &[&str] = &["soffice", "libreoffice"];

/// Install locations that are usually not on `PATH`.
const CONVERTER_INSTALL_PATHS: &[&str] = &[
    "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    "/usr/lib/libreoffice/program/soffice",
    "/opt/libreoffice/program/soffice",
    "C:\\Program Files\\LibreOffice\\program\\soffice.exe",
];

/// Converts a presentation deck into a PDF inside a scratch directory.
#[async_trait]
pub trait DeckConverter: Send + Sync {
    /// Convert `deck_path`, writing into `scratch_dir`, and return the PDF path.
    async fn convert(&self, deck_path: &Path, scratch_dir: &Path) -> Result<PathBuf, ConversionError>;
}

/// [`DeckConverter`] backed by the LibreOffice command line.
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    executable: PathBuf,
}

impl LibreOfficeConverter {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Use the configured executable, or the first one [`locate_converter`] finds.
    ///
    /// When nothing is found the bare name `soffice` is kept, so every deck
    /// reports [`ConversionError::ConverterNotFound`] with a usable hint.
    pub fn from_config(config: &DescribeConfig) -> Self {
        let executable = config
            .converter_path
            .clone()
            .or_else(locate_converter)
            .unwrap_or_else(|| PathBuf::from(CONVERTER_NAMES[0]));
        Self::new(executable)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

#[async_trait]
impl DeckConverter for LibreOfficeConverter {
    async fn convert(&self, deck_path: &Path, scratch_dir: &Path) -> Result<PathBuf, ConversionError> {
        convert_deck(deck_path, &self.executable, scratch_dir).await
    }
}

/// Find a LibreOffice executable on `PATH` or in a standard install location.
pub fn locate_converter() -> Option<PathBuf> {
    let on_path = std::env::var_os("PATH").into_iter().flat_map(|paths| {
        std::env::split_paths(&paths)
            .flat_map(|dir| CONVERTER_NAMES.iter().map(move |name| dir.join(name)))
            .collect::<Vec<_>>()
    });

    on_path
        .chain(CONVERTER_INSTALL_PATHS.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}

/// The PDF path LibreOffice writes for `deck_path` inside `out_dir`.
pub fn expected_pdf_path(deck_path: &Path, out_dir: &Path) -> PathBuf {
    let stem = deck_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{stem}.pdf"))
}

/// Percent-encoded `file://` URL for a LibreOffice user profile directory.
///
/// Relative paths are resolved against the current directory first; the URL
/// form has no meaning for them.
pub fn profile_url(profile_dir: &Path) -> Result<Url, ConversionError> {
    let absolute = if profile_dir.is_absolute() {
        profile_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(profile_dir))
            .map_err(|_| ConversionError::ProfileUrl {
                path: profile_dir.to_path_buf(),
            })?
    };
    Url::from_file_path(&absolute).map_err(|()| ConversionError::ProfileUrl { path: absolute })
}

/// Convert `deck_path` to PDF with `converter`, writing into `scratch_dir`.
///
/// Single attempt; the only side effect outside `scratch_dir` is the spawned
/// process itself.
pub async fn convert_deck(
    deck_path: &Path,
    converter: &Path,
    scratch_dir: &Path,
) -> Result<PathBuf, ConversionError> {
    if !converter.is_file() {
        return Err(ConversionError::ConverterNotFound {
            path: converter.to_path_buf(),
        });
    }
    if !deck_path.is_file() {
        return Err(ConversionError::DeckNotFound {
            path: deck_path.to_path_buf(),
        });
    }
    if DeckFormat::from_path(deck_path).is_none() {
        return Err(ConversionError::UnsupportedDeck {
            path: deck_path.to_path_buf(),
        });
    }

    let profile_url = profile_url(&scratch_dir.join("lo_profile"))?;
    debug!(
        "Running {} --headless --convert-to pdf on {}",
        converter.display(),
        deck_path.display()
    );

    let output = tokio::process::Command::new(converter)
        .arg(format!("-env:UserInstallation={profile_url}"))
        .args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(scratch_dir)
        .arg(deck_path)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ConversionError::Spawn {
            path: converter.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(
            "Converter failed on {} (status {:?})",
            deck_path.display(),
            output.status.code()
        );
        return Err(ConversionError::ProcessFailed {
            exit_code: output.status.code(),
            stderr,
        });
    }

    let pdf_path = expected_pdf_path(deck_path, scratch_dir);
    if !pdf_path.is_file() {
        return Err(ConversionError::OutputMissing { expected: pdf_path });
    }

    info!(
        "Converted {} to {}",
        deck_path.display(),
        pdf_path.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(pdf_path)
}
