//! Prompt text for slide description.
//!
//! The prompt sent with every slide of a deck is assembled once, from a base
//! template plus optional user instructions, and then reused unchanged for
//! every slide of that deck.
//!
//! Callers can replace the template via [`crate::config::DescribeConfig::prompt_path`];
//! [`DEFAULT_BASE_PROMPT`] is used only when no template file is configured.

use crate::config::DescribeConfig;
use crate::error::DeckError;
use std::path::Path;
use tracing::debug;

/// Built-in base template for describing a single slide image.
pub const DEFAULT_BASE_PROMPT: &str = r#"You are an expert at reading presentation slides. You will be given an image of a single slide from a slide deck.

Describe the slide so that someone who cannot see it understands everything it communicates:

1. TEXT
   - Transcribe the title and all visible text faithfully, in reading order
   - Keep bullet hierarchy and numbering

2. VISUALS
   - Describe charts, graphs and diagrams: type, axes, series, trends and key values
   - Describe tables row by row when they carry data
   - Mention images and icons only when they carry meaning

3. LAYOUT
   - Note how content is grouped and how elements relate (arrows, flows, columns)

4. OUTPUT
   - Plain prose and lists only, no preamble or commentary
   - Do not speculate about content that is not on the slide"#;

/// Label placed between the base template and the user's instructions.
pub const INSTRUCTIONS_LABEL: &str = "Additional instructions to follow:";

/// Instructions value meaning "no additional instructions".
///
/// Compared case-insensitively, so the CLI default "None Provided" matches.
pub const NO_INSTRUCTIONS: &str = "none provided";

/// Combine a base template with optional additional instructions.
///
/// Instructions that are empty or equal to [`NO_INSTRUCTIONS`] leave the
/// template unchanged.
pub fn build_prompt(base: &str, instructions: Option<&str>) -> String {
    match instructions.map(str::trim) {
        Some(extra) if !extra.is_empty() && !extra.eq_ignore_ascii_case(NO_INSTRUCTIONS) => {
            format!("{base}\n\n{INSTRUCTIONS_LABEL}\n{extra}")
        }
        _ => base.to_string(),
    }
}

/// Read a template file and apply [`build_prompt`].
pub async fn load_prompt(path: &Path, instructions: Option<&str>) -> Result<String, DeckError> {
    let base = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DeckError::PromptLoad {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded prompt template from {} ({} bytes)", path.display(), base.len());
    Ok(build_prompt(base.trim_end(), instructions))
}

/// Assemble the prompt a deck will use, from the configured template and
/// instructions.
pub async fn assemble_prompt(config: &DescribeConfig) -> Result<String, DeckError> {
    match config.prompt_path {
        Some(ref path) => load_prompt(path, config.instructions.as_deref()).await,
        None => Ok(build_prompt(DEFAULT_BASE_PROMPT, config.instructions.as_deref())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_instructions_keeps_template() {
        assert_eq!(build_prompt("Describe.", None), "Describe.");
        assert_eq!(build_prompt("Describe.", Some("")), "Describe.");
        assert_eq!(build_prompt("Describe.", Some("None Provided")), "Describe.");
        assert_eq!(build_prompt("Describe.", Some("NONE PROVIDED")), "Describe.");
    }

    #[test]
    fn instructions_are_appended_after_label() {
        let p = build_prompt("Describe.", Some("Focus on the charts."));
        assert_eq!(
            p,
            "Describe.\n\nAdditional instructions to follow:\nFocus on the charts."
        );
    }

    #[tokio::test]
    async fn load_prompt_reads_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Base template.\n").unwrap();

        let p = load_prompt(&path, Some("Be brief.")).await.unwrap();
        assert_eq!(p, "Base template.\n\nAdditional instructions to follow:\nBe brief.");
    }

    #[tokio::test]
    async fn missing_template_is_prompt_load_error() {
        let err = load_prompt(Path::new("/definitely/not/prompt.txt"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::PromptLoad { .. }));
    }

    #[tokio::test]
    async fn assemble_without_template_uses_default() {
        let config = DescribeConfig::default();
        let p = assemble_prompt(&config).await.unwrap();
        assert_eq!(p, DEFAULT_BASE_PROMPT);
    }
}
