//! External converter: Markdown file in, Org file out.
//!
//! The prose conversion itself is delegated to pandoc. The pipeline only
//! talks to it through [`MarkupConverter`], so tests (and callers with their
//! own converter) can swap it out without touching the worker.
//!
//! pandoc is invoked as
//!
//! ```text
//! pandoc --from=markdown-auto_identifiers --to=org --wrap=preserve --output <dest> <scratch>
//! ```
//!
//! `-auto_identifiers` stops pandoc from adding `:CUSTOM_ID:` drawers to
//! every heading, and `--wrap=preserve` keeps the author's line breaks so
//! the line-based rewriting that follows sees the same lines as the source.

use crate::error::Obsidian2OrgError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Reader format passed to pandoc.
pub const PANDOC_FROM: &str = "markdown-auto_identifiers";

/// Writer format passed to pandoc.
pub const PANDOC_TO: &str = "org";

/// Line-wrap mode passed to pandoc.
pub const PANDOC_WRAP: &str = "preserve";

/// Converts one Markdown file into one Org file.
///
/// Implementations must be `Send + Sync`: a single converter is shared by
/// every concurrent job.
#[async_trait]
pub trait MarkupConverter: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Convert the Markdown at `input` and write Org to `output`.
    ///
    /// A failure here is fatal for the whole run.
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), Obsidian2OrgError>;
}

/// [`MarkupConverter`] backed by a pandoc executable.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
}

impl PandocConverter {
    /// Use `program` as the pandoc executable, verifying it can be found.
    ///
    /// A bare name is looked up on `PATH`; a path must point at an
    /// executable file.
    pub fn locate(program: impl AsRef<Path>) -> Result<Self, Obsidian2OrgError> {
        let program = program.as_ref();
        let resolved = which::which(program).map_err(|e| Obsidian2OrgError::ConverterNotFound {
            program: program.display().to_string(),
            hint: format!(
                "Install pandoc (https://pandoc.org/installing.html) or point \
                 --pandoc / OBSIDIAN2ORG_PANDOC at the executable.\nError: {e}"
            ),
        })?;
        debug!("Using pandoc at {}", resolved.display());
        Ok(Self { program: resolved })
    }

    /// Use `program` as-is, without checking it exists.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one conversion, in invocation order.
    pub fn args(input: &Path, output: &Path) -> Vec<std::ffi::OsString> {
        vec![
            format!("--from={PANDOC_FROM}").into(),
            format!("--to={PANDOC_TO}").into(),
            format!("--wrap={PANDOC_WRAP}").into(),
            "--output".into(),
            output.as_os_str().to_owned(),
            input.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl MarkupConverter for PandocConverter {
    fn name(&self) -> &str {
        "pandoc"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), Obsidian2OrgError> {
        let program = self.program.display().to_string();
        let result = Command::new(&self.program)
            .args(Self::args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Obsidian2OrgError::ConverterSpawnFailed {
                program: program.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(Obsidian2OrgError::ConverterFailed {
                path: output.to_path_buf(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        debug!("{} wrote {}", program, output.display());
        Ok(())
    }
}
