//! Conversion worker: one Markdown note → one stamped Org document.
//!
//! A job owns its source path, its destination path and one scratch file, and
//! receives its pre-assigned ID by value. Nothing is shared with other jobs
//! except the read-only converter, so any number of jobs can run at once.

use crate::error::Obsidian2OrgError;
use crate::output::DocumentResult;
use crate::pipeline::links::rewrite_wiki_links;
use crate::pipeline::normalize::{finish_org, prepare_markdown, restore_comments};
use crate::pipeline::pandoc::MarkupConverter;
use crate::registry::NodeId;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Everything one job needs.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Source note on disk.
    pub source: PathBuf,
    /// Source path relative to the input root.
    pub relative: PathBuf,
    /// Destination `.org` file on disk.
    pub output: PathBuf,
    /// Destination relative to the output root.
    pub output_relative: PathBuf,
    /// ID minted for this note before any job started.
    pub id: NodeId,
}

/// Convert one note.
///
/// 1. read and [`prepare_markdown`]
/// 2. write the prepared text to a scratch file
/// 3. run the converter from the scratch file to the destination
/// 4. read the destination back; restore comments, rewrite wiki links,
///    apply the finishing stages
/// 5. rewrite the destination with the property drawer and title on top
pub async fn convert_document(
    job: ConversionJob,
    converter: &dyn MarkupConverter,
    attachments_dir: &str,
) -> Result<DocumentResult, Obsidian2OrgError> {
    let start = Instant::now();
    debug!("Converting {}", job.relative.display());

    let markdown = read_text(&job.source).await?;
    let prepared = prepare_markdown(&markdown);

    if let Some(parent) = job.output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Obsidian2OrgError::CreateDirFailed {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    // Removed when `scratch` is dropped at the end of this function.
    let scratch = tempfile::Builder::new()
        .prefix("obsidian2org-")
        .suffix(".md")
        .tempfile()
        .map_err(|e| Obsidian2OrgError::Internal(format!("scratch file: {e}")))?;
    tokio::fs::write(scratch.path(), prepared.as_bytes())
        .await
        .map_err(|source| Obsidian2OrgError::WriteFailed {
            path: scratch.path().to_path_buf(),
            source,
        })?;

    converter.convert(scratch.path(), &job.output).await?;

    let org = read_text(&job.output).await?;
    let org = restore_comments(&org);
    let org = rewrite_wiki_links(&org, attachments_dir);
    let body = finish_org(&org);

    let title = document_title(&job.output);
    let document = format!("{}{}", org_header(&job.id, &title), body);
    tokio::fs::write(&job.output, document.as_bytes())
        .await
        .map_err(|source| Obsidian2OrgError::WriteFailed {
            path: job.output.clone(),
            source,
        })?;

    Ok(DocumentResult {
        name: title,
        source: job.relative,
        output: job.output_relative,
        id: job.id,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Property drawer with the node ID, the title line, and one blank line.
pub fn org_header(id: &NodeId, title: &str) -> String {
    format!(":PROPERTIES:\n:ID: {id}\n:END:\n#+title: {title}\n\n")
}

/// Title of a converted document: its output file stem, unnormalized.
pub fn document_title(output: &Path) -> String {
    output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn read_text(path: &Path) -> Result<String, Obsidian2OrgError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| Obsidian2OrgError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}
