//! Input tree walk: split a vault into Markdown documents and assets.
//!
//! The walk is done eagerly, before anything is written, so the registry can
//! be built from the complete list of documents. Entries are sorted by file
//! name inside each directory; registration order, and therefore which note
//! wins a name collision, is the same on every run over the same tree.

use crate::config::{ConversionConfig, MARKDOWN_EXTENSION, ORG_EXTENSION};
use crate::error::Obsidian2OrgError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A Markdown note found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Absolute (or root-joined) path of the note.
    pub source: PathBuf,
    /// Path relative to the input root.
    pub relative: PathBuf,
    /// Relative output path (`.md` swapped for `.org`).
    pub output_relative: PathBuf,
}

impl SourceDocument {
    /// Display name: the stem of the relative output path.
    pub fn name(&self) -> String {
        self.output_relative
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A non-Markdown file, mirrored into the output tree unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    pub source: PathBuf,
    pub relative: PathBuf,
}

/// Everything found under the input root, in walk order.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    pub documents: Vec<SourceDocument>,
    pub assets: Vec<SourceAsset>,
}

/// Check that `root` exists, is a directory, and can be read.
pub fn validate_input_root(root: &Path) -> Result<(), Obsidian2OrgError> {
    let meta = std::fs::metadata(root).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Obsidian2OrgError::PermissionDenied {
            path: root.to_path_buf(),
        },
        _ => Obsidian2OrgError::InputNotFound {
            path: root.to_path_buf(),
        },
    })?;
    if !meta.is_dir() {
        return Err(Obsidian2OrgError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    match std::fs::read_dir(root) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Obsidian2OrgError::PermissionDenied {
                path: root.to_path_buf(),
            })
        }
        Err(e) => Err(Obsidian2OrgError::ReadFailed {
            path: root.to_path_buf(),
            source: e,
        }),
    }
}

/// Whether `path` has exactly the Markdown extension.
pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == MARKDOWN_EXTENSION)
}

/// Whether `path` has exactly the Org extension.
pub fn is_org(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == ORG_EXTENSION)
}

/// Walk `root` and classify every file.
///
/// Directories are descended into but never yielded, symlinks are followed,
/// names on the config's ignore list are skipped, and `exclude` (typically
/// the output root when it sits inside the input root) is not entered.
pub fn scan_tree(
    root: &Path,
    exclude: Option<&Path>,
    config: &ConversionConfig,
) -> Result<SourceTree, Obsidian2OrgError> {
    let mut tree = SourceTree::default();

    for file in walk_files(root, exclude)? {
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if config.is_ignored(&name) {
            debug!("Skipping ignored file {}", file.display());
            continue;
        }

        let relative = match file.strip_prefix(root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                warn!("Skipping {} (outside input root)", file.display());
                continue;
            }
        };

        if is_markdown(&file) {
            tree.documents.push(SourceDocument {
                output_relative: relative.with_extension(ORG_EXTENSION),
                source: file,
                relative,
            });
        } else {
            tree.assets.push(SourceAsset {
                source: file,
                relative,
            });
        }
    }

    debug!(
        "Scanned {}: {} documents, {} assets",
        root.display(),
        tree.documents.len(),
        tree.assets.len()
    );
    Ok(tree)
}

/// Every regular file under `root` in sorted walk order.
pub fn walk_files(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, Obsidian2OrgError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| exclude.is_none_or(|ex| e.path() != ex));

    for entry in walker {
        let entry = entry.map_err(|source| Obsidian2OrgError::WalkFailed {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
