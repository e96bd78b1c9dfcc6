//! Pipeline stages for slide description.
//!
//! Each submodule implements exactly one step. The three stages that touch
//! the outside world (converter process, pdfium, model API) sit behind
//! traits so the orchestration in [`crate::describe`] can be exercised with
//! stand-ins.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ convert ──▶ render ──▶ normalize ──▶ rate_limit ──▶ llm
//! (decks)  (soffice)   (pdfium)   (canvas fit)   (pacing)     (VLM)
//! ```
//!
//! 1. [`input`]      — resolve a file or directory to deck paths
//! 2. [`convert`]    — deck → PDF via headless LibreOffice ([`convert::DeckConverter`])
//! 3. [`render`]     — PDF → `slide_<n>.png` per page ([`render::PageRasterizer`]);
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 4. [`normalize`]  — aspect-preserving fit onto a fixed canvas
//! 5. [`rate_limit`] — minimum interval between generation calls
//! 6. [`llm`]        — the generation capability ([`llm::GenerationClient`]);
//!    [`encode`] base64-wraps slide images for it

pub mod convert;
pub mod encode;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod rate_limit;
pub mod render;
