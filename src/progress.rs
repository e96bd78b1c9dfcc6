//! Progress-callback trait for deck and slide events.
//!
//! Inject an [`Arc<dyn DescribeProgressCallback>`] via
//! [`crate::config::DescribeConfigBuilder::progress_callback`] to receive
//! events as the batch driver and slide pipeline run. The library never
//! reaches for process-wide state to report progress; everything a caller
//! sees flows through this trait or through `tracing`.
//!
//! # Example
//!
//! ```rust
//! use ppt2desc::{DescribeConfig, DescribeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FailureCounter {
//!     failures: AtomicUsize,
//! }
//!
//! impl DescribeProgressCallback for FailureCounter {
//!     fn on_slide_error(&self, deck: &str, slide: usize, _total: usize, error: &str) {
//!         self.failures.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{deck} slide {slide}: {error}");
//!     }
//! }
//!
//! let counter = Arc::new(FailureCounter { failures: AtomicUsize::new(0) });
//! let config = DescribeConfig::builder()
//!     .progress_callback(counter as Arc<dyn DescribeProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch driver and slide pipeline as work progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Processing is sequential, so calls never overlap,
/// but the trait is `Send + Sync` so one callback can be shared with other
/// tasks the host application runs.
pub trait DescribeProgressCallback: Send + Sync {
    /// Called once with the number of decks about to be processed.
    fn on_batch_start(&self, total_decks: usize) {
        let _ = total_decks;
    }

    /// Called after a deck was rasterised, before its first generation call.
    ///
    /// # Arguments
    /// * `deck`         — source file name
    /// * `total_slides` — number of slide images that will be described
    fn on_deck_start(&self, deck: &str, total_slides: usize) {
        let _ = (deck, total_slides);
    }

    /// Called just before the generation request for a slide is sent
    /// (after any rate-limit wait).
    fn on_slide_start(&self, deck: &str, slide: usize, total_slides: usize) {
        let _ = (deck, slide, total_slides);
    }

    /// Called when a slide was described successfully.
    ///
    /// `content_len` is the byte length of the generated description.
    fn on_slide_complete(&self, deck: &str, slide: usize, total_slides: usize, content_len: usize) {
        let _ = (deck, slide, total_slides, content_len);
    }

    /// Called when a slide's generation call failed and the error sentinel
    /// was recorded instead.
    fn on_slide_error(&self, deck: &str, slide: usize, total_slides: usize, error: &str) {
        let _ = (deck, slide, total_slides, error);
    }

    /// Called once per deck with its final outcome.
    ///
    /// `error` is `None` when the deck document was written.
    fn on_deck_complete(&self, deck: &str, error: Option<&str>) {
        let _ = (deck, error);
    }

    /// Called once after every deck has been attempted.
    fn on_batch_complete(&self, succeeded: usize, failed: usize) {
        let _ = (succeeded, failed);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DescribeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DescribeConfig`].
pub type ProgressCallback = Arc<dyn DescribeProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        slides_started: AtomicUsize,
        slides_completed: AtomicUsize,
        slide_errors: AtomicUsize,
        decks_failed: AtomicUsize,
    }

    impl DescribeProgressCallback for TrackingCallback {
        fn on_slide_start(&self, _deck: &str, _slide: usize, _total: usize) {
            self.slides_started.fetch_add(1, Ordering::SeqCst);
        }

        fn on_slide_complete(&self, _deck: &str, _slide: usize, _total: usize, _len: usize) {
            self.slides_completed.fetch_add(1, Ordering::SeqCst);
        }

        fn on_slide_error(&self, _deck: &str, _slide: usize, _total: usize, _error: &str) {
            self.slide_errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_deck_complete(&self, _deck: &str, error: Option<&str>) {
            if error.is_some() {
                self.decks_failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_deck_start("a.pptx", 3);
        cb.on_slide_start("a.pptx", 1, 3);
        cb.on_slide_complete("a.pptx", 1, 3, 42);
        cb.on_slide_error("a.pptx", 2, 3, "timeout");
        cb.on_deck_complete("a.pptx", None);
        cb.on_batch_complete(1, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_slide_start("a.pptx", 1, 2);
        tracker.on_slide_complete("a.pptx", 1, 2, 100);
        tracker.on_slide_start("a.pptx", 2, 2);
        tracker.on_slide_error("a.pptx", 2, 2, "provider error");
        tracker.on_deck_complete("a.pptx", None);
        tracker.on_deck_complete("b.pptx", Some("conversion stage failed"));

        assert_eq!(tracker.slides_started.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.slides_completed.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.slide_errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.decks_failed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_deck_start("deck.pptx", 10);
        cb.on_slide_start("deck.pptx", 1, 10);
    }
}
