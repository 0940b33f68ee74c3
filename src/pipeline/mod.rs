//! Pipeline stages for Markdown-to-Org conversion.
//!
//! ## Data Flow
//!
//! ```text
//! walk ──▶ normalize ──▶ pandoc ──▶ normalize ──▶ links ──▶ normalize ──▶ document
//! (tree)   (prepare)     (convert)  (restore)     (pass 1)   (finish)      (stamp)
//!
//!                      ═══ barrier ═══ ──▶ links (pass 2, every .org file)
//! ```
//!
//! 1. [`walk`]      — split the input tree into notes and assets, in sorted order
//! 2. [`normalize`] — line-oriented text stages run before and after pandoc
//! 3. [`pandoc`]    — the [`pandoc::MarkupConverter`] seam and its pandoc
//!    implementation; the only stage that spawns a process
//! 4. [`links`]     — wiki links to `file:` links, then `file:` links to `id:`
//!    links once every note has been written
//! 5. [`document`]  — one conversion job, from source note to stamped Org file

pub mod document;
pub mod links;
pub mod normalize;
pub mod pandoc;
pub mod walk;
