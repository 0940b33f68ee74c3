//! CLI binary for obsidian2org.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use obsidian2org::{
    convert_directory, ConversionConfig, ConversionProgressCallback, ConversionStats,
    ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the conversion phase, reused for
/// the relink phase, with a log line per file printed above it.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning vault…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, prefix: &'static str, unit: &str, total: usize) {
        let progress_style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>4}}/{{len}} {unit}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_position(0);
        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix);
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_documents: usize, total_assets: usize) {
        self.activate_bar("Converting", "notes", total_documents);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Converting {total_documents} notes ({total_assets} other files)…"
            ))
        ));
    }

    fn on_document_complete(&self, relative: &Path, _completed: usize, _total: usize) {
        self.bar.println(format!(
            "  {} Converted {}",
            green("✓"),
            file_label(relative)
        ));
        self.bar.inc(1);
    }

    fn on_relink_start(&self, total_files: usize) {
        self.activate_bar("Relinking", "files", total_files);
    }

    fn on_file_relinked(&self, path: &Path, resolved: usize) {
        self.bar.println(format!(
            "  {} Fixed links in {}  {}",
            green("✓"),
            path.display(),
            dim(&format!("{resolved} links"))
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, stats: &ConversionStats) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} notes converted, {} links resolved",
            green("✔"),
            bold(&stats.documents.to_string()),
            bold(&stats.links_resolved.to_string()),
        );
    }
}

/// Plain per-file lines, used with `--no-progress`.
struct PlainProgressCallback {
    to_stderr: bool,
}

impl PlainProgressCallback {
    fn emit(&self, line: String) {
        if self.to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

impl ConversionProgressCallback for PlainProgressCallback {
    fn on_document_complete(&self, relative: &Path, _completed: usize, _total: usize) {
        self.emit(format!("Converted {}", file_label(relative)));
    }

    fn on_file_relinked(&self, path: &Path, _resolved: usize) {
        self.emit(format!("Fixed links in {}", path.display()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a vault
  obsidian2org ~/vault ~/org-roam

  # Use a specific pandoc build, four jobs at a time
  obsidian2org --pandoc /opt/pandoc/bin/pandoc -j 4 ~/vault ~/org-roam

  # Embeds live in ../assets relative to each note
  obsidian2org --attachments ../assets ~/vault ~/org-roam

  # Skip extra litter files
  obsidian2org --ignore Thumbs.db --ignore .gitkeep ~/vault ~/org-roam

  # JSON report on stdout
  obsidian2org --json ~/vault ~/org-roam > report.json

ENVIRONMENT VARIABLES:
  OBSIDIAN2ORG_PANDOC       pandoc executable (default: pandoc on PATH)
  OBSIDIAN2ORG_CONCURRENCY  Worker pool size
  OBSIDIAN2ORG_ATTACHMENTS  Embed target directory (default: ../attachments)
  RUST_LOG                  Override the log filter

SETUP:
  pandoc must be installed: https://pandoc.org/installing.html
"#;

/// Convert an Obsidian vault to an Org-roam tree.
#[derive(Parser, Debug)]
#[command(
    name = "obsidian2org",
    version,
    about = "Convert an Obsidian Markdown vault into Org-roam documents",
    long_about = "Convert every Markdown note in a directory tree into an Org document with \
a property-drawer ID and title, copy every other file unchanged, and rewrite links between \
notes into id: links. pandoc does the markup conversion.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Root of the Markdown vault.
    markdown_directory: PathBuf,

    /// Root of the Org output tree (created if missing).
    output_directory: PathBuf,

    /// pandoc executable.
    #[arg(long, env = "OBSIDIAN2ORG_PANDOC")]
    pandoc: Option<PathBuf>,

    /// Number of notes converted at once (default: available parallelism).
    #[arg(short = 'j', long, env = "OBSIDIAN2ORG_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Directory embeds point to, relative to each note.
    #[arg(long, env = "OBSIDIAN2ORG_ATTACHMENTS", default_value = "../attachments")]
    attachments: String,

    /// Extra file names to skip (repeatable).
    #[arg(long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Output structured JSON (ConversionOutput) on stdout.
    #[arg(long, env = "OBSIDIAN2ORG_JSON")]
    json: bool,

    /// Disable progress bar; print one line per file instead.
    #[arg(long, env = "OBSIDIAN2ORG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OBSIDIAN2ORG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OBSIDIAN2ORG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active.
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ConversionProgressCallback>)
    } else if !cli.quiet {
        Some(Arc::new(PlainProgressCallback { to_stderr: cli.json }))
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_directory(&cli.markdown_directory, &cli.output_directory, &config)
        .await
        .with_context(|| {
            format!(
                "Conversion of {} failed",
                cli.markdown_directory.display()
            )
        })?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "Converted {} notes and copied {} files in {}ms ({} links resolved, {} unresolved)",
            output.stats.documents,
            output.stats.assets_copied,
            output.stats.total_duration_ms,
            output.stats.links_resolved,
            output.stats.links_unresolved,
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder().attachments_dir(cli.attachments.clone());

    if let Some(ref pandoc) = cli.pandoc {
        builder = builder.pandoc_path(pandoc.clone());
    }
    if let Some(n) = cli.concurrency {
        builder = builder.concurrency(n);
    }
    for name in &cli.ignore {
        builder = builder.ignore_name(name.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
