//! Error types for the obsidian2org library.
//!
//! There is a single error type, [`Obsidian2OrgError`], and every variant is
//! **fatal**: the run stops at the first one. Conversion jobs do not retry and
//! there is no per-file partial-failure mode, so a converter crash on one note
//! aborts the whole vault and leaves already-written output in place.
//!
//! Things that are *not* errors: unresolvable links (left as they were) and
//! odd input text such as unbalanced `%%` comment delimiters (appended
//! verbatim). Those never reach this module.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the obsidian2org library.
#[derive(Debug, Error)]
pub enum Obsidian2OrgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input directory was not found at the given path.
    #[error("Markdown directory not found: '{path}'\nCheck the path exists and is readable.")]
    InputNotFound { path: PathBuf },

    /// The input path exists but is a file.
    #[error("'{path}' is not a directory\nPass the root folder of the vault, not a single note.")]
    NotADirectory { path: PathBuf },

    /// Process does not have read permission on the input root.
    #[error("Permission denied reading '{path}'\nTry: chmod -R +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Walking the input or output tree failed part-way.
    #[error("Failed to walk '{path}': {source}")]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter executable could not be located.
    #[error("Converter '{program}' not found.\n{hint}")]
    ConverterNotFound { program: String, hint: String },

    /// The converter process could not be started.
    #[error("Failed to start converter '{program}': {source}")]
    ConverterSpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The converter ran but exited unsuccessfully for a document.
    #[error("Converter failed on '{path}' ({status})\n{stderr}")]
    ConverterFailed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read a source note or a converted document.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create an output directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not mirror an asset into the output tree.
    #[error("Failed to copy '{from}' to '{to}': {source}")]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converter_failed_display() {
        let e = Obsidian2OrgError::ConverterFailed {
            path: PathBuf::from("Notes/A.md"),
            status: "exit status: 64".into(),
            stderr: "pandoc: unknown option".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Notes/A.md"), "got: {msg}");
        assert!(msg.contains("exit status: 64"), "got: {msg}");
        assert!(msg.contains("unknown option"), "got: {msg}");
    }

    #[test]
    fn converter_not_found_display() {
        let e = Obsidian2OrgError::ConverterNotFound {
            program: "pandoc".into(),
            hint: "Install pandoc or pass --pandoc.".into(),
        };
        assert!(e.to_string().contains("pandoc"));
        assert!(e.to_string().contains("--pandoc"));
    }

    #[test]
    fn write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Obsidian2OrgError::WriteFailed {
            path: PathBuf::from("out/A.org"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("out/A.org"));
        assert!(e.source().is_some());
    }
}
