//! Input resolution: turn a user-supplied file or directory into deck paths.
//!
//! A file must itself be a deck. A directory is scanned non-recursively for
//! decks (extension match is case-insensitive) and the result is sorted by
//! file name, so two runs over the same directory process decks in the same
//! order whatever the filesystem's listing order is.

use crate::error::Ppt2DescError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Presentation formats handed to the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckFormat {
    /// PowerPoint 97–2003.
    Ppt,
    /// PowerPoint Open XML.
    Pptx,
    /// PowerPoint Open XML, macro-enabled.
    Pptm,
    /// PowerPoint 97–2003 slide show.
    Pps,
    /// PowerPoint Open XML slide show.
    Ppsx,
    /// OpenDocument presentation.
    Odp,
}

impl DeckFormat {
    /// Recognise a deck from its file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ppt" => Some(Self::Ppt),
            "pptx" => Some(Self::Pptx),
            "pptm" => Some(Self::Pptm),
            "pps" => Some(Self::Pps),
            "ppsx" => Some(Self::Ppsx),
            "odp" => Some(Self::Odp),
            _ => None,
        }
    }
}

/// True if `path` names a file with a recognised deck extension.
pub fn is_deck(path: &Path) -> bool {
    path.is_file() && DeckFormat::from_path(path).is_some()
}

/// Resolve `input` to the decks it names.
///
/// An empty directory is not an error; it yields an empty list.
pub fn resolve_decks(input: &Path) -> Result<Vec<PathBuf>, Ppt2DescError> {
    if !input.exists() {
        return Err(Ppt2DescError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        if DeckFormat::from_path(input).is_none() {
            return Err(Ppt2DescError::NotADeck {
                path: input.to_path_buf(),
            });
        }
        return Ok(vec![input.to_path_buf()]);
    }

    let entries = std::fs::read_dir(input).map_err(|_| Ppt2DescError::InputNotFound {
        path: input.to_path_buf(),
    })?;

    let mut decks: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_deck(p))
        .collect();
    decks.sort();

    debug!("Found {} decks in {}", decks.len(), input.display());
    Ok(decks)
}
