//! Integration tests for the full vault conversion.
//!
//! pandoc is replaced by an in-process converter that copies its input, so
//! these tests exercise everything except the markup conversion itself and
//! run without any external tool.

use async_trait::async_trait;
use obsidian2org::{
    convert_directory, relink_directory, ConversionConfig, ConversionProgressCallback,
    IdRegistry, MarkupConverter, Obsidian2OrgError,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Copies the prepared Markdown through unchanged.
struct PassThrough;

#[async_trait]
impl MarkupConverter for PassThrough {
    fn name(&self) -> &str {
        "pass-through"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), Obsidian2OrgError> {
        tokio::fs::copy(input, output)
            .await
            .map(|_| ())
            .map_err(|source| Obsidian2OrgError::WriteFailed {
                path: output.to_path_buf(),
                source,
            })
    }
}

/// Fails on every note whose prepared text contains `BROKEN`.
struct FailOnMarker;

#[async_trait]
impl MarkupConverter for FailOnMarker {
    fn name(&self) -> &str {
        "fail-on-marker"
    }

    async fn convert(&self, input: &Path, output: &Path) -> Result<(), Obsidian2OrgError> {
        let text = tokio::fs::read_to_string(input).await.unwrap();
        if text.contains("BROKEN") {
            return Err(Obsidian2OrgError::ConverterFailed {
                path: output.to_path_buf(),
                status: "exit status: 64".into(),
                stderr: "unexpected input".into(),
            });
        }
        PassThrough.convert(input, output).await
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let p = root.join(rel);
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(p, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}

fn config() -> ConversionConfig {
    ConversionConfig::builder()
        .converter(Arc::new(PassThrough))
        .concurrency(4)
        .build()
        .unwrap()
}

fn header(id: &str, title: &str) -> String {
    format!(":PROPERTIES:\n:ID: {id}\n:END:\n#+title: {title}\n\n")
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_two_notes_and_an_attachment() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Notes/A.md", "See [[B]] and ![[img.png]]\n");
    write(vault.path(), "Notes/B.md", "Hello\n");
    write(vault.path(), "attachments/img.png", "\u{89}PNG");

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();

    let a = output.document("Notes/A.md").unwrap();
    let b = output.document("Notes/B.md").unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.output, PathBuf::from("Notes/A.org"));

    assert_eq!(
        read(out.path(), "Notes/A.org"),
        format!(
            "{}See [[id:{}][B]] and [[file:../attachments/img.png]]\n",
            header(a.id.as_str(), "A"),
            b.id
        )
    );
    assert_eq!(
        read(out.path(), "Notes/B.org"),
        format!("{}Hello\n", header(b.id.as_str(), "B"))
    );
    assert_eq!(read(out.path(), "attachments/img.png"), "\u{89}PNG");

    assert_eq!(output.stats.documents, 2);
    assert_eq!(output.stats.assets_copied, 1);
    assert_eq!(output.stats.files_relinked, 2);
    assert_eq!(output.stats.links_resolved, 1);
    assert_eq!(output.stats.links_unresolved, 0);
}

#[tokio::test]
async fn test_ids_are_upper_case_uuids() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Note.md", "text\n");

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();
    let id = output.documents[0].id.as_str();
    assert_eq!(id.len(), 36);
    assert_eq!(id, id.to_uppercase());
    assert_eq!(id.matches('-').count(), 4);
}

#[tokio::test]
async fn test_litter_is_skipped() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Note.md", "text\n");
    write(vault.path(), ".DS_Store", "junk");
    write(vault.path(), "Sub/.DS_Store", "junk");
    write(vault.path(), "Sub/Thumbs.db", "junk");

    let config = ConversionConfig::builder()
        .converter(Arc::new(PassThrough))
        .ignore_name("Thumbs.db")
        .build()
        .unwrap();
    let output = convert_directory(vault.path(), out.path(), &config)
        .await
        .unwrap();

    assert!(output.assets.is_empty());
    assert!(!out.path().join(".DS_Store").exists());
    assert!(!out.path().join("Sub/Thumbs.db").exists());
}

#[tokio::test]
async fn test_name_collision_resolves_to_last_in_walk_order() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Archive/Topic.md", "old\n");
    write(vault.path(), "Inbox/Topic.md", "new\n");
    write(vault.path(), "Ref.md", "[[Topic]]\n");

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();

    // Both notes are converted with their own ids...
    let archive = output.document("Archive/Topic.md").unwrap();
    let inbox = output.document("Inbox/Topic.md").unwrap();
    assert_ne!(archive.id, inbox.id);
    assert!(read(out.path(), "Archive/Topic.org").contains(archive.id.as_str()));

    // ...but links resolve to the one registered last.
    let reference = read(out.path(), "Ref.org");
    assert!(reference.contains(&format!("[[id:{}][Topic]]", inbox.id)));
    assert!(!reference.contains(archive.id.as_str()));
}

#[tokio::test]
async fn test_unresolvable_and_qualified_links_untouched() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(
        vault.path(),
        "Note.md",
        "[[https://example.com]] [[sub/page]] [[Missing]] [[Other|label]]\n",
    );
    write(vault.path(), "Other.md", "x\n");

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();
    let other = output.document("Other.md").unwrap();

    let text = read(out.path(), "Note.org");
    assert!(text.contains("[[https://example.com]]"));
    assert!(text.contains("[[sub/page]]"));
    assert!(text.contains("[[file:Missing.org][Missing]]"));
    assert!(text.contains(&format!("[[id:{}][label]]", other.id)));
    assert_eq!(output.stats.links_resolved, 1);
    assert!(output.stats.links_unresolved >= 1);
}

#[tokio::test]
async fn test_copied_org_files_are_relinked() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Target.md", "x\n");
    write(vault.path(), "legacy/Old.org", "* Heading\nsee [[Target]]\n");

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();
    let target = output.document("Target.md").unwrap();

    assert_eq!(output.assets, vec![PathBuf::from("legacy/Old.org")]);
    assert_eq!(
        read(out.path(), "legacy/Old.org"),
        format!("* Heading\nsee [[id:{}][Target]]\n", target.id)
    );
}

#[tokio::test]
async fn test_relink_is_idempotent() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "A.md", "[[B]] [[B|bee]] [[Nowhere]]\n");
    write(vault.path(), "B.md", "[[A]]\n");

    let config = config();
    let output = convert_directory(vault.path(), out.path(), &config)
        .await
        .unwrap();
    let first_a = read(out.path(), "A.org");
    let first_b = read(out.path(), "B.org");

    let mut registry = IdRegistry::new();
    for doc in &output.documents {
        registry.insert(&doc.name, doc.id.clone());
    }
    let again = relink_directory(out.path(), &registry, &config)
        .await
        .unwrap();

    assert_eq!(read(out.path(), "A.org"), first_a);
    assert_eq!(read(out.path(), "B.org"), first_b);
    assert!(again.iter().all(|r| r.resolved == 0));
}

#[tokio::test]
async fn test_comments_and_quotes_survive_conversion() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(
        vault.path(),
        "Q.md",
        "> > be kind\n%%\nnote to self\n%%\ninline %%hidden%% text\n",
    );

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();
    let id = &output.documents[0].id;

    assert_eq!(
        read(out.path(), "Q.org"),
        format!(
            "{}> \"be kind\"\n# note to self\n\ninline <!--hidden--> text\n",
            header(id.as_str(), "Q")
        )
    );
}

#[tokio::test]
async fn test_output_inside_input_is_not_walked() {
    let vault = tempfile::tempdir().unwrap();
    write(vault.path(), "Note.md", "x\n");
    write(vault.path(), "org/Stale.org", "stale\n");
    let out = vault.path().join("org");

    let output = convert_directory(vault.path(), &out, &config())
        .await
        .unwrap();

    assert_eq!(output.stats.documents, 1);
    assert!(output.assets.is_empty());
    assert!(out.join("Note.org").exists());
    assert!(!out.join("org").exists());
}

#[tokio::test]
async fn test_output_equal_to_input_keeps_assets() {
    let vault = tempfile::tempdir().unwrap();
    write(vault.path(), "Note.md", "See ![[img.png]]\n");
    write(vault.path(), "attachments/img.png", "PNGDATA");

    let output = convert_directory(vault.path(), vault.path(), &config())
        .await
        .unwrap();

    assert_eq!(
        std::fs::read(vault.path().join("attachments/img.png")).unwrap(),
        b"PNGDATA"
    );
    assert_eq!(output.assets, vec![PathBuf::from("attachments/img.png")]);
    assert_eq!(output.stats.documents, 1);
    assert!(read(vault.path(), "Note.org").contains("[[file:../attachments/img.png]]"));
    assert_eq!(read(vault.path(), "Note.md"), "See ![[img.png]]\n");
}

#[tokio::test]
async fn test_converter_failure_aborts_run() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Good.md", "fine\n");
    write(vault.path(), "Bad.md", "BROKEN\n");

    let config = ConversionConfig::builder()
        .converter(Arc::new(FailOnMarker))
        .concurrency(1)
        .build()
        .unwrap();
    let err = convert_directory(vault.path(), out.path(), &config)
        .await
        .unwrap_err();

    match err {
        Obsidian2OrgError::ConverterFailed { path, stderr, .. } => {
            assert_eq!(path.file_name().unwrap(), "Bad.org");
            assert_eq!(stderr, "unexpected input");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_input_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert_directory(dir.path().join("nope"), dir.path().join("out"), &config())
        .await
        .unwrap_err();
    assert!(matches!(err, Obsidian2OrgError::InputNotFound { .. }));
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_missing_pandoc_reported_before_writing() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Note.md", "x\n");
    write(vault.path(), "img.png", "x");

    let config = ConversionConfig::builder()
        .pandoc_path("/nonexistent/bin/pandoc")
        .build()
        .unwrap();
    let err = convert_directory(vault.path(), out.path(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, Obsidian2OrgError::ConverterNotFound { .. }));
    assert!(!out.path().join("img.png").exists());
}

// ── Progress callback ────────────────────────────────────────────────────────

#[derive(Default)]
struct Counting {
    started: AtomicUsize,
    assets: AtomicUsize,
    documents: AtomicUsize,
    relinked: AtomicUsize,
    finished: AtomicUsize,
}

impl ConversionProgressCallback for Counting {
    fn on_conversion_start(&self, total_documents: usize, _total_assets: usize) {
        self.started.store(total_documents, Ordering::SeqCst);
    }

    fn on_asset_copied(&self, _relative: &Path) {
        self.assets.fetch_add(1, Ordering::SeqCst);
    }

    fn on_document_complete(&self, _relative: &Path, completed: usize, total: usize) {
        assert!(completed <= total);
        self.documents.fetch_add(1, Ordering::SeqCst);
    }

    fn on_file_relinked(&self, _path: &Path, _resolved: usize) {
        self.relinked.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_complete(&self, _stats: &obsidian2org::ConversionStats) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_progress_events() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    for name in ["A", "B", "C"] {
        write(vault.path(), &format!("{name}.md"), "x\n");
    }
    write(vault.path(), "pic.jpg", "x");

    let counter = Arc::new(Counting::default());
    let config = ConversionConfig::builder()
        .converter(Arc::new(PassThrough))
        .progress_callback(counter.clone())
        .build()
        .unwrap();
    convert_directory(vault.path(), out.path(), &config)
        .await
        .unwrap();

    assert_eq!(counter.started.load(Ordering::SeqCst), 3);
    assert_eq!(counter.assets.load(Ordering::SeqCst), 1);
    assert_eq!(counter.documents.load(Ordering::SeqCst), 3);
    assert_eq!(counter.relinked.load(Ordering::SeqCst), 3);
    assert_eq!(counter.finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_output_serialises_to_json() {
    let vault = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write(vault.path(), "Note.md", "x\n");

    let output = convert_directory(vault.path(), out.path(), &config())
        .await
        .unwrap();
    let json = serde_json::to_value(&output).unwrap();
    assert_eq!(json["stats"]["documents"], 1);
    assert_eq!(json["documents"][0]["name"], "Note");
    assert_eq!(json["documents"][0]["id"], output.documents[0].id.as_str());
}
