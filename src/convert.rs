//! Vault conversion entry points.
//!
//! [`convert_directory`] drives the whole run:
//!
//! ```text
//! validate ─▶ walk ─▶ register ids ─▶ copy assets ─▶ worker pool ─▶ barrier ─▶ relink
//! ```
//!
//! The registry is complete before the first job is dispatched and is only
//! read afterwards, so jobs need no locking. The relink pass cannot start
//! before every job has finished: it needs every target document to exist.

use crate::config::ConversionConfig;
use crate::error::Obsidian2OrgError;
use crate::output::{ConversionOutput, ConversionStats, RelinkResult};
use crate::pipeline::document::{self, ConversionJob};
use crate::pipeline::links::resolve_links;
use crate::pipeline::pandoc::{MarkupConverter, PandocConverter};
use crate::pipeline::walk::{self, SourceTree};
use crate::registry::IdRegistry;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Environment variable naming the pandoc executable.
pub const PANDOC_ENV: &str = "OBSIDIAN2ORG_PANDOC";

/// Convert every note under `input_dir` into an Org document under
/// `output_dir`, mirroring the directory layout.
///
/// # Arguments
/// * `input_dir`  — root of the Markdown vault
/// * `output_dir` — root of the Org tree; created (with parents) if absent
/// * `config`     — conversion configuration
///
/// # Errors
/// Every error is fatal and stops the run where it happened. Files written
/// before the failure are left in place.
pub async fn convert_directory(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Obsidian2OrgError> {
    let total_start = Instant::now();
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();
    info!(
        "Starting conversion: {} → {}",
        input_dir.display(),
        output_dir.display()
    );

    // ── Step 1: Validate roots ───────────────────────────────────────────
    walk::validate_input_root(input_dir)?;
    create_dir_all(output_dir).await?;
    let in_root = canonicalize(input_dir).await?;
    let out_root = canonicalize(output_dir).await?;

    // ── Step 2: Resolve converter ────────────────────────────────────────
    let converter = resolve_converter(config)?;
    debug!("Using converter '{}'", converter.name());

    // ── Step 3: Walk input ───────────────────────────────────────────────
    let exclude = (out_root != in_root && out_root.starts_with(&in_root)).then(|| out_root.clone());
    let tree = scan(in_root.clone(), exclude, config.clone()).await?;
    info!(
        "Found {} notes and {} other files",
        tree.documents.len(),
        tree.assets.len()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(tree.documents.len(), tree.assets.len());
    }

    // ── Step 4: Assign ids ───────────────────────────────────────────────
    let (registry, jobs) = build_registry(&tree, &out_root);
    debug!("Registered {} note names", registry.len());

    // ── Step 5: Mirror assets ────────────────────────────────────────────
    let convert_start = Instant::now();
    let mut assets = Vec::with_capacity(tree.assets.len());
    for asset in &tree.assets {
        let target = out_root.join(&asset.relative);
        copy_asset(&asset.source, &target).await?;
        if let Some(ref cb) = config.progress_callback {
            cb.on_asset_copied(&asset.relative);
        }
        assets.push(asset.relative.clone());
    }

    // ── Step 6: Convert notes ────────────────────────────────────────────
    let total = jobs.len();
    let attachments_dir = config.attachments_dir.as_str();
    let converter_ref: &dyn MarkupConverter = converter.as_ref();
    let mut pending = stream::iter(
        jobs.into_iter()
            .map(|job| document::convert_document(job, converter_ref, attachments_dir)),
    )
    .buffer_unordered(config.concurrency);

    let mut documents = Vec::with_capacity(total);
    while let Some(result) = pending.next().await {
        // Dropping `pending` on error kills the converters still running.
        let doc = result?;
        debug!("Converted {} in {}ms", doc.source.display(), doc.duration_ms);
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_complete(&doc.source, documents.len() + 1, total);
        }
        documents.push(doc);
    }
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;
    info!("Converted {} notes in {}ms", documents.len(), convert_duration_ms);

    // ── Step 7: Relink (after every job has finished) ────────────────────
    let relink_start = Instant::now();
    let relinked = relink_directory(&out_root, &registry, config).await?;
    let relink_duration_ms = relink_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        documents: documents.len(),
        assets_copied: assets.len(),
        files_relinked: relinked.len(),
        links_resolved: relinked.iter().map(|r| r.resolved).sum(),
        links_unresolved: relinked.iter().map(|r| r.unresolved).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        convert_duration_ms,
        relink_duration_ms,
    };

    info!(
        "Conversion complete: {} notes, {} assets, {} links resolved, {}ms total",
        stats.documents, stats.assets_copied, stats.links_resolved, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(&stats);
    }

    Ok(ConversionOutput {
        documents,
        assets,
        relinked,
        stats,
    })
}

/// Synchronous wrapper around [`convert_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_directory_sync(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Obsidian2OrgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Obsidian2OrgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_directory(input_dir, output_dir, config))
}

/// Rewrite filename links to `id:` links in every `.org` file under
/// `output_dir`.
///
/// Every Org file is rewritten, including ones that were copied rather than
/// converted. Running it again with the same registry changes nothing.
pub async fn relink_directory(
    output_dir: impl AsRef<Path>,
    registry: &IdRegistry,
    config: &ConversionConfig,
) -> Result<Vec<RelinkResult>, Obsidian2OrgError> {
    let root = output_dir.as_ref().to_path_buf();
    let walk_root = root.clone();
    let files = tokio::task::spawn_blocking(move || walk::walk_files(&walk_root, None))
        .await
        .map_err(|e| Obsidian2OrgError::Internal(format!("Walk task panicked: {}", e)))??;
    let org_files: Vec<PathBuf> = files.into_iter().filter(|p| walk::is_org(p)).collect();

    if let Some(ref cb) = config.progress_callback {
        cb.on_relink_start(org_files.len());
    }

    let mut results = Vec::with_capacity(org_files.len());
    for path in org_files {
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| Obsidian2OrgError::ReadFailed {
                path: path.clone(),
                source,
            })?;
        let outcome = resolve_links(&text, registry);
        tokio::fs::write(&path, outcome.text.as_bytes())
            .await
            .map_err(|source| Obsidian2OrgError::WriteFailed {
                path: path.clone(),
                source,
            })?;

        let relative = path.strip_prefix(&root).unwrap_or(&path).to_path_buf();
        debug!(
            "Fixed links in {} ({} resolved, {} unresolved)",
            relative.display(),
            outcome.resolved,
            outcome.unresolved
        );
        if let Some(ref cb) = config.progress_callback {
            cb.on_file_relinked(&relative, outcome.resolved);
        }
        results.push(RelinkResult {
            path: relative,
            resolved: outcome.resolved,
            unresolved: outcome.unresolved,
        });
    }

    Ok(results)
}

/// Mint one id per walked note and build the job list, in walk order.
///
/// Later notes overwrite earlier ones that normalize to the same name.
pub fn build_registry(tree: &SourceTree, out_root: &Path) -> (IdRegistry, Vec<ConversionJob>) {
    let mut registry = IdRegistry::new();
    let jobs = tree
        .documents
        .iter()
        .map(|doc| {
            let id = registry.register(&doc.name());
            ConversionJob {
                source: doc.source.clone(),
                relative: doc.relative.clone(),
                output: out_root.join(&doc.output_relative),
                output_relative: doc.output_relative.clone(),
                id,
            }
        })
        .collect();
    (registry, jobs)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the converter, from most-specific to least-specific:
///
/// 1. **Pre-built converter** (`config.converter`), used as-is.
/// 2. **Explicit pandoc path** (`config.pandoc_path`).
/// 3. **Environment** (`OBSIDIAN2ORG_PANDOC`).
/// 4. **`pandoc` on `PATH`**.
fn resolve_converter(config: &ConversionConfig) -> Result<Arc<dyn MarkupConverter>, Obsidian2OrgError> {
    if let Some(ref converter) = config.converter {
        return Ok(Arc::clone(converter));
    }

    if let Some(ref path) = config.pandoc_path {
        return Ok(Arc::new(PandocConverter::locate(path)?));
    }

    if let Ok(program) = std::env::var(PANDOC_ENV) {
        if !program.is_empty() {
            return Ok(Arc::new(PandocConverter::locate(program)?));
        }
    }

    Ok(Arc::new(PandocConverter::locate("pandoc")?))
}

async fn scan(
    root: PathBuf,
    exclude: Option<PathBuf>,
    config: ConversionConfig,
) -> Result<SourceTree, Obsidian2OrgError> {
    tokio::task::spawn_blocking(move || walk::scan_tree(&root, exclude.as_deref(), &config))
        .await
        .map_err(|e| Obsidian2OrgError::Internal(format!("Walk task panicked: {}", e)))?
}

/// Copy one asset, leaving it alone when `to` already is `from`.
async fn copy_asset(from: &Path, to: &Path) -> Result<(), Obsidian2OrgError> {
    if is_same_file(from, to).await {
        debug!("{} is already in place", to.display());
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        create_dir_all(parent).await?;
    }
    tokio::fs::copy(from, to)
        .await
        .map_err(|source| Obsidian2OrgError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
    Ok(())
}

/// Whether both paths exist and resolve to the same file.
///
/// `tokio::fs::copy` truncates its destination first, so copying a file onto
/// itself would empty it.
async fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

async fn create_dir_all(path: &Path) -> Result<(), Obsidian2OrgError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| Obsidian2OrgError::CreateDirFailed {
            path: path.to_path_buf(),
            source,
        })
}

async fn canonicalize(path: &Path) -> Result<PathBuf, Obsidian2OrgError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|source| Obsidian2OrgError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}
