//! Identifier registry: normalized document name → minted node ID.
//!
//! Every converted note must reference its siblings by ID, and the IDs only
//! exist once the whole input tree has been scanned. The registry is
//! therefore filled in one sequential pass before any conversion job starts,
//! then frozen behind an `Arc` and only read from.
//!
//! ## Name collisions
//!
//! Two notes whose stems normalize to the same name (`Foo.md` in two folders,
//! or `A\u{00A0}B.md` next to `A B.md`) share one registry slot. The later
//! registration wins and links to that name resolve to the later note. This
//! is known and intentional; the tests pin it down.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

static RE_WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every run of Unicode whitespace (NBSP included) to a single
/// ASCII space and trim both ends.
///
/// This is the matching key for link resolution.
pub fn normalize_name(name: &str) -> String {
    RE_WHITESPACE_RUN
        .replace_all(name, " ")
        .trim()
        .to_string()
}

/// An org-roam node identifier: an upper-case UUID v4, unique per run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Mint a fresh identifier.
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from normalized display name to [`NodeId`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdRegistry {
    entries: HashMap<String, NodeId>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint an ID for `name` and store it under the normalized name,
    /// replacing any earlier entry for the same normalized name.
    pub fn register(&mut self, name: &str) -> NodeId {
        let id = NodeId::mint();
        self.insert(name, id.clone());
        id
    }

    /// Store a known ID under the normalized form of `name`.
    pub fn insert(&mut self, name: &str, id: NodeId) {
        let key = normalize_name(name);
        if let Some(previous) = self.entries.insert(key.clone(), id) {
            tracing::warn!(
                "Duplicate note name '{}': links now resolve to the later note (replaced {})",
                key,
                previous
            );
        }
    }

    /// Exact lookup by an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&NodeId> {
        self.entries.get(key)
    }

    /// Normalize `name` and look it up.
    pub fn lookup(&self, name: &str) -> Option<&NodeId> {
        self.entries.get(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeId)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
