//! Configuration types for vault conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The defaults reproduce a plain
//! `obsidian2org <in> <out>` run: pandoc from `PATH`, one job per CPU,
//! embeds resolved against `../attachments`, `.DS_Store` skipped.

use crate::error::Obsidian2OrgError;
use crate::pipeline::links::DEFAULT_ATTACHMENTS_DIR;
use crate::pipeline::pandoc::MarkupConverter;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Extension of the notes that get converted.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Extension of converted documents.
pub const ORG_EXTENSION: &str = "org";

/// File names skipped during the walk unless overridden.
pub const DEFAULT_IGNORED_NAMES: &[&str] = &[".DS_Store"];

/// Configuration for a vault conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use obsidian2org::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .concurrency(4)
///     .attachments_dir("../assets")
///     .build()
///     .unwrap();
/// assert_eq!(config.concurrency, 4);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Pre-constructed converter. Takes precedence over `pandoc_path`.
    pub converter: Option<Arc<dyn MarkupConverter>>,

    /// pandoc executable. If None, `pandoc` is looked up on `PATH`.
    pub pandoc_path: Option<PathBuf>,

    /// Number of documents converted at once. Default: available parallelism.
    pub concurrency: usize,

    /// Directory embeds point to, relative to each converted note.
    /// Default: `../attachments`.
    pub attachments_dir: String,

    /// Exact file names skipped during the walk. Default: `.DS_Store`.
    pub ignored_names: Vec<String>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            converter: None,
            pandoc_path: None,
            concurrency: default_concurrency(),
            attachments_dir: DEFAULT_ATTACHMENTS_DIR.to_string(),
            ignored_names: DEFAULT_IGNORED_NAMES.iter().map(|s| s.to_string()).collect(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("converter", &self.converter.as_ref().map(|c| c.name().to_string()))
            .field("pandoc_path", &self.pandoc_path)
            .field("concurrency", &self.concurrency)
            .field("attachments_dir", &self.attachments_dir)
            .field("ignored_names", &self.ignored_names)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether `file_name` is on the ignore list.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.ignored_names.iter().any(|n| n == file_name)
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn converter(mut self, converter: Arc<dyn MarkupConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = Some(path.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn attachments_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.attachments_dir = dir.into();
        self
    }

    /// Skip files with this exact name, in addition to the defaults.
    pub fn ignore_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.config.is_ignored(&name) {
            self.config.ignored_names.push(name);
        }
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Obsidian2OrgError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(Obsidian2OrgError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.attachments_dir.trim().is_empty() {
            return Err(Obsidian2OrgError::InvalidConfig(
                "Attachments directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
