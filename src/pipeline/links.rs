//! Link rewriting: Obsidian wiki syntax → Org `file:` links → Org `id:` links.
//!
//! Links are rewritten in two passes because the second needs information the
//! first does not have:
//!
//! 1. [`rewrite_wiki_links`] runs inside each conversion job, right after
//!    pandoc. It only changes *syntax*: embeds point into the attachments
//!    folder and wiki links become `file:` links to the sibling `.org` file.
//! 2. [`resolve_links`] runs once every job has finished. It looks each
//!    target name up in the [`IdRegistry`] and swaps the `file:` (or leftover
//!    bare `[[…]]`) link for an `id:` link.
//!
//! Neither pass can fail. A link that does not match, or whose target is not
//! in the registry, is left exactly as it was. None of the patterns can cross
//! a `]`, so one link never swallows its neighbour.

use crate::config::ORG_EXTENSION;
use crate::registry::{normalize_name, IdRegistry};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use tracing::debug;

/// Default folder embeds are resolved against, relative to each note.
pub const DEFAULT_ATTACHMENTS_DIR: &str = "../attachments";

// ── Pass 1: wiki syntax → file links ─────────────────────────────────────────

/// `![[name]]` or `![[name|size]]`.
static RE_EMBED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").unwrap());

/// `[[page|label]]`.
static RE_WIKI_LABELLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]|]+)\|([^\]]+)\]\]").unwrap());

/// `[[page]]`; also the bare-link pattern for pass 2.
static RE_WIKI_SIMPLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\]|\[]+)\]\]").unwrap());

/// Rewrite embeds and wiki links into Org `file:` links.
///
/// Rules (applied in order):
/// 1. `![[name|size]]` → `[[file:<attachments_dir>/name]]` (size hint dropped)
/// 2. `[[page|label]]` → `[[file:page.org][label]]`
/// 3. `[[page]]` → `[[file:page.org][page]]`, unless `page` looks like a URL,
///    a path or a file name with an extension
pub fn rewrite_wiki_links(org: &str, attachments_dir: &str) -> String {
    let dir = attachments_dir.trim_end_matches('/');

    let s = RE_EMBED.replace_all(org, |caps: &Captures<'_>| {
        format!("[[file:{}/{}]]", dir, &caps[1])
    });

    let s = RE_WIKI_LABELLED.replace_all(&s, |caps: &Captures<'_>| {
        format!("[[file:{}.{}][{}]]", &caps[1], ORG_EXTENSION, &caps[2])
    });

    RE_WIKI_SIMPLE
        .replace_all(&s, |caps: &Captures<'_>| {
            let page = &caps[1];
            if is_qualified_target(page) {
                caps[0].to_string()
            } else {
                format!("[[file:{}.{}][{}]]", page, ORG_EXTENSION, page)
            }
        })
        .to_string()
}

/// A wiki target that is already a URL, a path, or carries an extension.
///
/// Such targets are left alone: rewriting them to `<target>.org` would break
/// external links and links to attachments.
pub fn is_qualified_target(page: &str) -> bool {
    page.starts_with("http://")
        || page.starts_with("https://")
        || page.contains('/')
        || page.contains('.')
}

// ── Pass 2: file / bare links → id links ─────────────────────────────────────

/// `[[file:<raw>][<label>]]`.
static RE_FILE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[file:([^\]]*)\]\[([^\]]*)\]\]").unwrap());

/// Result of resolving the links of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelinkOutcome {
    /// Rewritten document text.
    pub text: String,
    /// Links replaced by an `id:` link.
    pub resolved: usize,
    /// Link candidates whose target is not in the registry.
    pub unresolved: usize,
}

/// Replace filename-based links with `id:` links using `registry`.
///
/// 1. `[[file:<raw>][<label>]]`: the file stem of `<raw>`, normalized, is
///    looked up; on a hit the link becomes `[[id:<ID>][<label>]]` with every
///    whitespace character of the label mapped to an ASCII space.
/// 2. Bare `[[text]]`: `text` is normalized and looked up; on a hit the link
///    becomes `[[id:<ID>][<text>]]`, the label whitespace-mapped but not
///    trimmed.
///
/// Embeds (`[[file:…]]` without a label) are not candidates.
pub fn resolve_links(org: &str, registry: &IdRegistry) -> RelinkOutcome {
    let mut resolved = 0usize;
    let mut unresolved = 0usize;

    let s = RE_FILE_LINK.replace_all(org, |caps: &Captures<'_>| {
        let raw = &caps[1];
        let stem = Path::new(raw)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        match registry.get(&normalize_name(&stem)) {
            Some(id) => {
                resolved += 1;
                id_link(id.as_str(), &map_whitespace(&caps[2]))
            }
            None => {
                unresolved += 1;
                debug!("Unresolved file link target '{}'", raw);
                caps[0].to_string()
            }
        }
    });

    let text = RE_WIKI_SIMPLE
        .replace_all(&s, |caps: &Captures<'_>| {
            let target = &caps[1];
            if target.starts_with("file:") {
                return caps[0].to_string();
            }
            match registry.lookup(target) {
                Some(id) => {
                    resolved += 1;
                    id_link(id.as_str(), &map_whitespace(target))
                }
                None => {
                    unresolved += 1;
                    debug!("Unresolved link target '{}'", target);
                    caps[0].to_string()
                }
            }
        })
        .to_string();

    RelinkOutcome {
        text,
        resolved,
        unresolved,
    }
}

/// Format an Org `id:` link.
pub fn id_link(id: &str, label: &str) -> String {
    format!("[[id:{}][{}]]", id, label)
}

/// Map every Unicode whitespace character to an ASCII space, one for one.
fn map_whitespace(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────
