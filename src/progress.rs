//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline copies assets, converts notes and relinks files.
//! The library itself never prints; the CLI turns these events into its
//! `Converted …` / `Fixed links in …` lines or a progress bar.
//!
//! # Example
//!
//! ```rust
//! use obsidian2org::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     converted: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, relative: &Path, _done: usize, total: usize) {
//!         let n = self.converted.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{n}/{total} {}", relative.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { converted: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionStats;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events are delivered from the orchestrating task,
/// one at a time; document completions arrive in completion order, not walk
/// order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after the input walk, before any file is written.
    fn on_conversion_start(&self, total_documents: usize, total_assets: usize) {
        let _ = (total_documents, total_assets);
    }

    /// Called after an asset has been mirrored into the output tree.
    fn on_asset_copied(&self, relative: &Path) {
        let _ = relative;
    }

    /// Called when a note has been fully converted and stamped.
    ///
    /// # Arguments
    /// * `relative`  — source path relative to the input root
    /// * `completed` — documents finished so far, including this one
    /// * `total`     — documents in the run
    fn on_document_complete(&self, relative: &Path, completed: usize, total: usize) {
        let _ = (relative, completed, total);
    }

    /// Called once after every job has finished, before relinking.
    fn on_relink_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called after one output file has been relinked and rewritten.
    fn on_file_relinked(&self, path: &Path, resolved: usize) {
        let _ = (path, resolved);
    }

    /// Called once at the end of a successful run.
    fn on_conversion_complete(&self, stats: &ConversionStats) {
        let _ = stats;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
