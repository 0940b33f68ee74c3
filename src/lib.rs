//! # obsidian2org
//!
//! Convert an Obsidian vault (a directory tree of Markdown notes) into an
//! Org-roam style tree of Org documents, using pandoc for the markup
//! conversion.
//!
//! Every converted note gets a property drawer with a fresh `:ID:` and a
//! `#+title:` line. Wiki links between notes are first rewritten into
//! filename links, then, once every note has been written, into `id:` links
//! that survive renames and moves.
//!
//! ## Pipeline Overview
//!
//! ```text
//! vault/
//!  │
//!  ├─ 1. Walk      collect notes and assets in sorted order
//!  ├─ 2. Register  mint one ID per note name (complete before any job runs)
//!  ├─ 3. Assets    mirror non-Markdown files unchanged
//!  ├─ 4. Convert   concurrent jobs: prepare ─▶ pandoc ─▶ finish ─▶ stamp
//!  ├─ 5. Barrier   wait for every job
//!  └─ 6. Relink    filename links ─▶ id: links in every .org file
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use obsidian2org::{convert_directory, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert_directory("vault", "org-roam", &config).await?;
//!     eprintln!(
//!         "{} notes, {} links resolved",
//!         output.stats.documents, output.stats.links_resolved
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `obsidian2org` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! obsidian2org = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod registry;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_directory, convert_directory_sync, relink_directory};
pub use error::Obsidian2OrgError;
pub use output::{ConversionOutput, ConversionStats, DocumentResult, RelinkResult};
pub use pipeline::pandoc::{MarkupConverter, PandocConverter};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use registry::{normalize_name, IdRegistry, NodeId};
