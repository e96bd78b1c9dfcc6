//! CLI binary for ppt2desc.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `DescribeConfig` and prints a batch summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ppt2desc::{
    run_batch, DescribeConfig, DescribeProgressCallback, ProgressCallback, RateLimitScope,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar per deck, sized once the deck has
/// been rasterised, plus a log line per failed slide and per finished deck.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the slide currently being described.
    slide_started: Mutex<Option<Instant>>,
    /// Slides that errored in the current deck.
    deck_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let cb = Arc::new(Self {
            bar: ProgressBar::new(0),
            slide_started: Mutex::new(None),
            deck_errors: AtomicUsize::new(0),
        });
        cb.spinner();
        cb.bar.enable_steady_tick(Duration::from_millis(80));
        cb
    }

    /// Back to spinner-only style while the next deck is converted.
    fn spinner(&self) {
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        self.bar.set_style(spinner_style);
        self.bar.set_prefix("Preparing");
        self.bar.set_message("Converting deck…");
    }

    /// Switch to the full progress-bar style once the slide count is known.
    fn activate_bar(&self, deck: &str, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} slides  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_position(0);
        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(deck.to_string());
        self.bar.reset_eta();
    }

    fn slide_elapsed(&self) -> f64 {
        self.slide_started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl DescribeProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_decks: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Describing {total_decks} deck(s)…"))
        ));
    }

    fn on_deck_start(&self, deck: &str, total_slides: usize) {
        self.deck_errors.store(0, Ordering::SeqCst);
        self.activate_bar(deck, total_slides);
    }

    fn on_slide_start(&self, _deck: &str, slide: usize, _total: usize) {
        *self.slide_started.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(format!("slide {slide}"));
    }

    fn on_slide_complete(&self, _deck: &str, _slide: usize, _total: usize, _content_len: usize) {
        self.slide_started.lock().unwrap().take();
        self.bar.inc(1);
    }

    fn on_slide_error(&self, _deck: &str, slide: usize, total: usize, error: &str) {
        let secs = self.slide_elapsed();
        self.deck_errors.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} Slide {:>3}/{:<3}  {}  {}",
            red("✗"),
            slide,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_deck_complete(&self, deck: &str, error: Option<&str>) {
        let line = match error {
            None => {
                let failed = self.deck_errors.load(Ordering::SeqCst);
                if failed == 0 {
                    format!("{} {}", green("✔"), bold(deck))
                } else {
                    format!(
                        "{} {}  {}",
                        cyan("⚠"),
                        bold(deck),
                        red(&format!("{failed} slide(s) failed"))
                    )
                }
            }
            Some(e) => format!("{} {}  {}", red("✘"), bold(deck), red(e)),
        };
        self.bar.println(line);
        self.spinner();
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Describe every deck in a directory
  ppt2desc --input-dir decks/ --output-dir out/

  # A single deck with extra instructions
  ppt2desc --input-dir talk.pptx --output-dir out/ \
    --instructions "Focus on the numbers in charts"

  # Gemini, 15 calls per minute
  ppt2desc --provider gemini --model gemini-2.0-flash --rate-limit 15 \
    --input-dir decks/ --output-dir out/

  # Machine-readable batch report
  ppt2desc --json --input-dir decks/ --output-dir out/ > report.json

OUTPUT:
  One <deck-stem>.json per deck:
    { "deck": "talk.pptx", "model": "...", "slides": [ { "number": 1, "content": "..." }, ... ] }
  A slide whose model call failed has content "ERROR: Failed to process slide".

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  PPT2DESC_PROVIDER       Provider, used together with PPT2DESC_MODEL
  PPT2DESC_MODEL          Model ID
  PDFIUM_LIB_PATH         Path to libpdfium

REQUIREMENTS:
  LibreOffice (soffice) for deck → PDF conversion and the pdfium shared
  library for rendering.
"#;

/// Describe PowerPoint/Impress decks slide by slide using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "ppt2desc",
    version,
    about = "Describe presentation decks slide by slide using Vision LLMs",
    long_about = "Convert presentation decks (.pptx, .ppt, .odp, …) to PDF with LibreOffice, \
render every slide, and ask a Vision Language Model to describe it. Writes one JSON document \
per deck. Supports OpenAI, Anthropic, Google Gemini, Vertex AI, Azure OpenAI and any \
OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// A deck file or a directory of decks.
    #[arg(short, long, alias = "input_dir", env = "PPT2DESC_INPUT")]
    input_dir: PathBuf,

    /// Directory the deck documents are written to (created if missing).
    #[arg(short, long, alias = "output_dir", env = "PPT2DESC_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// LLM model ID (e.g. gpt-4.1-nano, gemini-2.0-flash, claude-sonnet-4-20250514).
    #[arg(long, env = "PPT2DESC_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, vertexai, azure, ollama.
    #[arg(
        long,
        env = "PPT2DESC_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, vertexai, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Additional instructions appended to the prompt.
    #[arg(long, env = "PPT2DESC_INSTRUCTIONS", default_value = "None Provided")]
    instructions: String,

    /// Path to the LibreOffice executable.
    #[arg(long, alias = "libreoffice_path", env = "PPT2DESC_LIBREOFFICE_PATH")]
    libreoffice_path: Option<PathBuf>,

    /// Generation calls per minute (0 = unlimited).
    #[arg(long, alias = "rate_limit", env = "PPT2DESC_RATE_LIMIT", default_value_t = 60)]
    rate_limit: u32,

    /// Restart the rate limiter for every deck instead of sharing it.
    #[arg(long, env = "PPT2DESC_PER_DECK_RATE_LIMIT")]
    per_deck_rate_limit: bool,

    /// Path to a base prompt template file.
    #[arg(long, alias = "prompt_path", env = "PPT2DESC_PROMPT_PATH")]
    prompt_path: Option<PathBuf>,

    /// Width of the rendered slide images in pixels.
    #[arg(long, env = "PPT2DESC_WIDTH", default_value_t = 1920)]
    width: u32,

    /// Height of the rendered slide images in pixels.
    #[arg(long, env = "PPT2DESC_HEIGHT", default_value_t = 1080)]
    height: u32,

    /// Path to the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Max LLM output tokens per slide.
    #[arg(long, env = "PPT2DESC_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "PPT2DESC_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Per-slide LLM call timeout in seconds.
    #[arg(long, env = "PPT2DESC_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "PPT2DESC_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PPT2DESC_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PPT2DESC_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PPT2DESC_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs when it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn DescribeProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let start = Instant::now();

    let report = run_batch(&cli.input_dir, &cli.output_dir, &config)
        .await
        .context("Batch failed to start")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    }

    // Deck failures are reported, not raised: the exit status stays zero.
    if !cli.quiet {
        let failed = report.failed();
        eprintln!(
            "{}  {} succeeded, {} failed  {}  →  {}",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            report.succeeded(),
            failed,
            dim(&format!("{:.1}s", start.elapsed().as_secs_f64())),
            bold(&cli.output_dir.display().to_string()),
        );
        if report.failed_slides() > 0 {
            eprintln!(
                "   {} slide(s) recorded with the error sentinel",
                red(&report.failed_slides().to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `DescribeConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DescribeConfig> {
    let scope = if cli.per_deck_rate_limit {
        RateLimitScope::PerDeck
    } else {
        RateLimitScope::Batch
    };

    let mut builder = DescribeConfig::builder()
        .rate_limit(cli.rate_limit)
        .rate_limit_scope(scope)
        .canvas(cli.width, cli.height)
        .instructions(cli.instructions.clone())
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref path) = cli.libreoffice_path {
        builder = builder.converter_path(path.clone());
    }
    if let Some(ref path) = cli.prompt_path {
        builder = builder.prompt_path(path.clone());
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library(path.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
