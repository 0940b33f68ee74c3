//! Text normalization around the external converter.
//!
//! pandoc is a faithful Markdown → Org translator but it does not know about
//! Obsidian's dialect, and a few of its choices differ from what an Org
//! reader expects. The fixes are split in two groups:
//!
//! - **prepare** stages run on the raw note before pandoc sees it
//!   ([`PREPARE_STAGES`]);
//! - **finish** stages run on pandoc's Org output, after comment restoration
//!   and link pass 1 ([`FINISH_STAGES`]).
//!
//! Every stage is a total `&str → String` function: it never fails and is a
//! no-op on input it does not match.
//!
//! ## Stage Order
//!
//! Double blockquotes are folded before comment markers are inserted, so a
//! `> >` inside a `%%` region is still folded; ruler spacing runs last so the
//! `---` it looks at is the final text pandoc will read.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

/// Obsidian's comment delimiter.
pub const COMMENT_DELIMITER: &str = "%%";

/// Private line prefix for multi-line comment regions. pandoc passes it
/// through as plain paragraph text; [`restore_comments`] turns it into an
/// Org comment afterwards.
pub const COMMENT_MARKER: &str = "#!#comment:";

/// A single text-rewriting stage.
pub type Stage = fn(&str) -> String;

/// Stages applied to Markdown before conversion, in order.
pub const PREPARE_STAGES: &[(&str, Stage)] = &[
    ("double-blockquotes", fold_double_blockquotes),
    ("comment-regions", mark_comment_regions),
    ("ruler-spacing", space_rulers),
];

/// Stages applied to Org output after link pass 1, in order.
pub const FINISH_STAGES: &[(&str, Stage)] = &[
    ("end-quote", fix_end_quote_spacing),
    ("list-indent", double_list_indent),
    ("attribution", space_attribution_dash),
];

/// Run every stage of `stages` over `input`.
pub fn run_stages(input: &str, stages: &[(&str, Stage)]) -> String {
    stages.iter().fold(input.to_string(), |text, (name, stage)| {
        trace!("normalize stage '{}'", name);
        stage(&text)
    })
}

/// Make a raw note safe for the external converter.
pub fn prepare_markdown(input: &str) -> String {
    run_stages(input, PREPARE_STAGES)
}

/// Apply the Org-side cleanups that follow link pass 1.
pub fn finish_org(input: &str) -> String {
    run_stages(input, FINISH_STAGES)
}

// ── Prepare 1: Double blockquotes ────────────────────────────────────────────

static RE_DOUBLE_BLOCKQUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^> >[ \t]?(.*)$").unwrap());

/// `> > text` → `> "text"`.
pub fn fold_double_blockquotes(input: &str) -> String {
    RE_DOUBLE_BLOCKQUOTE
        .replace_all(input, "> \"${1}\"")
        .to_string()
}

// ── Prepare 2: %% comment regions ────────────────────────────────────────────

/// Rewrite Obsidian `%%` comment regions.
///
/// Spans alternate non-comment / comment, starting with non-comment. A
/// multi-line comment loses one leading blank line and has every line
/// prefixed with [`COMMENT_MARKER`]; a single-line comment becomes an inline
/// `<!--…-->`. An unclosed trailing region is kept verbatim, delimiter and
/// all.
pub fn mark_comment_regions(input: &str) -> String {
    let chunks: Vec<&str> = input.split(COMMENT_DELIMITER).collect();
    // An even chunk count means an odd number of delimiters.
    let unclosed = chunks.len() % 2 == 0;
    let last = chunks.len() - 1;
    let mut out = String::with_capacity(input.len() + 32);

    for (i, chunk) in chunks.iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(chunk);
        } else if unclosed && i == last {
            out.push_str(COMMENT_DELIMITER);
            out.push_str(chunk);
        } else if chunk.contains('\n') {
            let mut lines = chunk.split_inclusive('\n').peekable();
            if lines.peek().is_some_and(|l| l.trim().is_empty()) {
                lines.next();
            }
            for line in lines {
                out.push_str(COMMENT_MARKER);
                out.push_str(line);
            }
        } else {
            out.push_str("<!--");
            out.push_str(chunk);
            out.push_str("-->");
        }
    }

    out
}

// ── Prepare 3: Ruler spacing ─────────────────────────────────────────────────

static RE_GLUED_RULER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---\n(.+)").unwrap());

/// Insert a blank line between a `---` ruler and text glued to it, which
/// pandoc would otherwise read as a setext heading or front matter.
pub fn space_rulers(input: &str) -> String {
    RE_GLUED_RULER.replace_all(input, "---\n\n${1}").to_string()
}

// ── Post: comment restoration ────────────────────────────────────────────────

static RE_COMMENT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?m)^([ \t]*){}", regex::escape(COMMENT_MARKER))).unwrap());

/// Turn line-leading [`COMMENT_MARKER`]s back into Org `# ` comments.
pub fn restore_comments(input: &str) -> String {
    RE_COMMENT_MARKER.replace_all(input, "${1}# ").to_string()
}

// ── Finish 1: End-quote spacing ──────────────────────────────────────────────

static RE_END_QUOTE_GAP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\n[ \t]*\n(#\+end_quote)").unwrap());

/// Drop the blank line pandoc leaves right before `#+end_quote`.
pub fn fix_end_quote_spacing(input: &str) -> String {
    RE_END_QUOTE_GAP.replace_all(input, "\n${1}").to_string()
}

// ── Finish 2: List indentation ───────────────────────────────────────────────

static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)- ").unwrap());

/// Double the leading indent of every `- ` list item (2 → 4, 4 → 8).
pub fn double_list_indent(input: &str) -> String {
    RE_LIST_ITEM
        .replace_all(input, |caps: &Captures<'_>| {
            let width = caps[1].chars().count() * 2;
            format!("{}- ", " ".repeat(width))
        })
        .to_string()
}

// ── Finish 3: Attribution dash ───────────────────────────────────────────────

static RE_ATTRIBUTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^―(\S)").unwrap());

/// `―Author` → `― Author` at the start of a line.
pub fn space_attribution_dash(input: &str) -> String {
    RE_ATTRIBUTION.replace_all(input, "― ${1}").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
