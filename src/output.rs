//! Output types: the per-deck JSON document and the batch report.
//!
//! [`DeckDocument`] is the durable artifact, one `<deck-stem>.json` per
//! input deck. [`DeckOutcome`] and [`BatchReport`] are the in-memory record
//! of a run that the CLI summarises.

use crate::error::DeckError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Content recorded for a slide whose generation call failed.
pub const ERROR_SENTINEL: &str = "ERROR: Failed to process slide";

/// One slide's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// 1-indexed slide number, matching page order.
    pub number: usize,
    /// Generated description, or [`ERROR_SENTINEL`].
    pub content: String,
}

impl SlideRecord {
    /// A record for a slide whose generation call failed.
    pub fn failed(number: usize) -> Self {
        Self {
            number,
            content: ERROR_SENTINEL.to_string(),
        }
    }

    /// True if this slide carries the error sentinel.
    pub fn is_error(&self) -> bool {
        self.content == ERROR_SENTINEL
    }
}

/// The complete structured output for one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDocument {
    /// Source file name, e.g. `quarterly.pptx`.
    pub deck: String,
    /// Identifier of the model that generated the descriptions.
    pub model: String,
    /// Slides in ascending `number` order.
    pub slides: Vec<SlideRecord>,
}

impl DeckDocument {
    /// File name the document is persisted under: `<deck-stem>.json`.
    pub fn file_name(&self) -> String {
        document_file_name(&self.deck)
    }

    /// Number of slides recorded with the error sentinel.
    pub fn failed_slides(&self) -> usize {
        self.slides.iter().filter(|s| s.is_error()).count()
    }

    /// Serialise to pretty-printed JSON (2-space indent).
    pub fn to_json(&self) -> Result<String, DeckError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document into `output_dir` and return the written path.
    ///
    /// Uses atomic write (temp file + rename) so an interrupted run never
    /// leaves a truncated document behind.
    pub async fn write_to(&self, output_dir: &Path) -> Result<PathBuf, DeckError> {
        let path = output_dir.join(self.file_name());
        let json = self.to_json()?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json.as_bytes())
            .await
            .map_err(|e| DeckError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| DeckError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;

        info!("Output written to {}", path.display());
        Ok(path)
    }
}

/// What a successful pipeline run returns for one deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckSummary {
    /// Source file name.
    pub deck: String,
    /// Where the deck document was written.
    pub output_path: PathBuf,
    /// File names of the rendered slide images, in slide order.
    ///
    /// The images themselves lived in scratch storage and are already deleted.
    pub images: Vec<String>,
    /// Slides recorded with the error sentinel.
    pub failed_slides: usize,
}

impl DeckSummary {
    /// Number of slides in the deck document.
    pub fn slide_count(&self) -> usize {
        self.images.len()
    }
}

/// The outcome of one deck within a batch.
#[derive(Debug, Serialize)]
pub struct DeckOutcome {
    /// The deck file that was processed.
    pub deck_path: PathBuf,
    /// `Ok` with the summary, or the deck-fatal error rendered as text.
    #[serde(with = "outcome_serde")]
    pub result: Result<DeckSummary, DeckError>,
}

impl DeckOutcome {
    /// Source file name of the deck.
    pub fn deck_name(&self) -> String {
        deck_name(&self.deck_path)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    /// Per-deck outcomes in processing order.
    pub decks: Vec<DeckOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.decks.iter().filter(|d| d.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.decks.len() - self.succeeded()
    }

    /// Slides recorded with the error sentinel across all successful decks.
    pub fn failed_slides(&self) -> usize {
        self.decks
            .iter()
            .filter_map(|d| d.result.as_ref().ok())
            .map(|s| s.failed_slides)
            .sum()
    }
}

/// `<stem>.json` for a deck file name; decks differing only in extension share it.
pub fn document_file_name(deck: &str) -> String {
    let stem = Path::new(deck)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| deck.to_string());
    format!("{stem}.json")
}

/// The file name component of a deck path, as recorded in documents.
pub fn deck_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

mod outcome_serde {
    use super::DeckSummary;
    use crate::error::DeckError;
    use serde::ser::{SerializeMap, Serializer};

    pub fn serialize<S: Serializer>(
        result: &Result<DeckSummary, DeckError>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match result {
            Ok(summary) => map.serialize_entry("ok", summary)?,
            Err(e) => map.serialize_entry("error", &e.to_string())?,
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeckDocument {
        DeckDocument {
            deck: "quarterly.pptx".into(),
            model: "gemini-1.5-flash".into(),
            slides: vec![
                SlideRecord {
                    number: 1,
                    content: "Title slide".into(),
                },
                SlideRecord::failed(2),
            ],
        }
    }

    #[test]
    fn json_shape() {
        let json = sample().to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["deck"], "quarterly.pptx");
        assert_eq!(v["model"], "gemini-1.5-flash");
        assert_eq!(v["slides"][0]["number"], 1);
        assert_eq!(v["slides"][1]["content"], ERROR_SENTINEL);
        assert!(json.contains("\n  \"deck\""), "expected 2-space indent: {json}");
    }

    #[test]
    fn file_name_uses_stem() {
        assert_eq!(sample().file_name(), "quarterly.json");
        let mut d = sample();
        d.deck = "archive.v2.PPTX".into();
        assert_eq!(d.file_name(), "archive.v2.json");
    }

    #[test]
    fn failed_slides_counts_sentinels() {
        assert_eq!(sample().failed_slides(), 1);
    }

    #[tokio::test]
    async fn write_to_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample().write_to(dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("quarterly.json"));

        let back: DeckDocument =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, sample());
        assert!(!dir.path().join("quarterly.json.tmp").exists());
    }

    #[tokio::test]
    async fn write_to_missing_dir_fails() {
        let err = sample()
            .write_to(Path::new("/definitely/not/a/dir"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::OutputWriteFailed { .. }));
    }

    #[test]
    fn batch_report_counts() {
        let ok = DeckOutcome {
            deck_path: PathBuf::from("a.pptx"),
            result: Ok(DeckSummary {
                deck: "a.pptx".into(),
                output_path: PathBuf::from("out/a.json"),
                images: vec!["slide_1.png".into(), "slide_2.png".into()],
                failed_slides: 1,
            }),
        };
        let failed = DeckOutcome {
            deck_path: PathBuf::from("dir/b.pptx"),
            result: Err(DeckError::NoPages {
                pdf: PathBuf::from("b.pdf"),
            }),
        };
        assert_eq!(failed.deck_name(), "b.pptx");

        let report = BatchReport {
            decks: vec![ok, failed],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failed_slides(), 1);

        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["decks"][0]["result"]["ok"]["images"][1], "slide_2.png");
        assert!(v["decks"][1]["result"]["error"]
            .as_str()
            .unwrap()
            .contains("rasterisation"));
    }
}
