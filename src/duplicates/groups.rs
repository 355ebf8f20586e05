//! Grouping keys, duplicate groups, and the index that accumulates them.
//!
//! # Overview
//!
//! Every entry that survives the walk is filed under a [`GroupKey`]: its
//! bare name, or for files in content mode, its content fingerprint. The
//! [`DuplicateIndex`] keeps one group per key in first-seen order and, once
//! the scan is over, [`DuplicateIndex::finalize`] keeps only the groups with
//! two or more members.
//!
//! ## Key scope
//!
//! With [`KeyScope::PerKind`] (the default) a file and a directory that
//! happen to share a name land in different groups. [`KeyScope::Shared`]
//! puts every key in one namespace, so such a pair becomes a single
//! [`GroupKind::Mixed`] group.
//!
//! # Example
//!
//! ```
//! use dupescan::duplicates::{DuplicateIndex, GroupKey, KeyScope};
//! use dupescan::scanner::{Entry, EntryKind};
//!
//! let mut index = DuplicateIndex::new();
//! for path in ["/a/temp", "/b/temp", "/c/other"] {
//!     let entry = Entry::directory(path);
//!     let key = GroupKey::for_name(KeyScope::PerKind, EntryKind::Directory, entry.file_name());
//!     index.add(entry, key);
//! }
//!
//! let groups = index.finalize();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].key.to_string_lossy(), "temp");
//! assert_eq!(groups[0].len(), 2);
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::scanner::{Entry, EntryKind, Fingerprint};

/// Namespace used for group keys.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum KeyScope {
    /// Files and directories never share a key
    #[default]
    PerKind,
    /// One namespace for every entry kind
    Shared,
}

impl fmt::Display for KeyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PerKind => write!(f, "per-kind"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// Equality key under which entries are considered duplicates.
///
/// Names are kept as raw OS strings and compare byte for byte: never
/// case-folded, trimmed or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    /// Name or fingerprint in the shared namespace.
    Shared(OsString),
    /// Bare name scoped to one entry kind.
    Name(EntryKind, OsString),
    /// Content fingerprint of a file.
    Content(Fingerprint),
}

impl GroupKey {
    /// Key for an entry grouped by its bare name.
    #[must_use]
    pub fn for_name(scope: KeyScope, kind: EntryKind, name: impl Into<OsString>) -> Self {
        match scope {
            KeyScope::PerKind => Self::Name(kind, name.into()),
            KeyScope::Shared => Self::Shared(name.into()),
        }
    }

    /// Key for a file grouped by its content fingerprint.
    #[must_use]
    pub fn for_content(scope: KeyScope, fingerprint: Fingerprint) -> Self {
        match scope {
            KeyScope::PerKind => Self::Content(fingerprint),
            KeyScope::Shared => Self::Shared(fingerprint.into_string().into()),
        }
    }

    /// The raw key: a name or a hex fingerprint.
    #[must_use]
    pub fn as_os_str(&self) -> &OsStr {
        match self {
            Self::Shared(s) | Self::Name(_, s) => s,
            Self::Content(fp) => OsStr::new(fp.as_str()),
        }
    }

    /// The key for display, with non-UTF-8 bytes replaced.
    #[must_use]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.as_os_str().to_string_lossy()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Kind of the entries in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// Every entry is a file
    File,
    /// Every entry is a directory
    Directory,
    /// Files and directories sharing a key (shared scope only)
    Mixed,
}

impl GroupKind {
    /// Human-readable label used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
            Self::Mixed => "Mixed",
        }
    }
}

/// Entries sharing one [`GroupKey`], in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The shared key
    pub key: GroupKey,
    /// Members, in the order they were discovered
    pub entries: Vec<Entry>,
}

impl DuplicateGroup {
    /// Create an empty group for `key`.
    #[must_use]
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            entries: Vec::new(),
        }
    }

    /// Number of entries in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A group is reportable once it has two or more members.
    #[must_use]
    pub fn is_reportable(&self) -> bool {
        self.entries.len() > 1
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Kind of the members, derived from all of them rather than the first.
    #[must_use]
    pub fn kind(&self) -> GroupKind {
        let has_files = self.entries.iter().any(|e| e.kind == EntryKind::File);
        let has_dirs = self.entries.iter().any(|e| e.kind == EntryKind::Directory);
        match (has_files, has_dirs) {
            (true, true) => GroupKind::Mixed,
            (false, true) => GroupKind::Directory,
            _ => GroupKind::File,
        }
    }

    /// Get just the paths of entries in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

/// Accumulates entries by key while a scan is running.
///
/// Groups are kept in the order their key was first seen; entries within a
/// group stay in insertion order. Nothing is ever removed or merged.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    /// Position of each key's group in `groups`
    slots: HashMap<GroupKey, usize>,
    /// Groups in first-seen order
    groups: Vec<DuplicateGroup>,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry` to the group for `key`, creating the group if needed.
    pub fn add(&mut self, entry: Entry, key: GroupKey) {
        match self.slots.get(&key) {
            Some(&slot) => self.groups[slot].entries.push(entry),
            None => {
                let mut group = DuplicateGroup::new(key.clone());
                group.entries.push(entry);
                self.slots.insert(key, self.groups.len());
                self.groups.push(group);
            }
        }
    }

    /// Number of distinct keys seen so far.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Check if nothing has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Look up the (possibly singleton) group for `key`.
    #[must_use]
    pub fn get(&self, key: &GroupKey) -> Option<&DuplicateGroup> {
        self.slots.get(key).map(|&slot| &self.groups[slot])
    }

    /// Consume the index, keeping only groups with two or more members.
    #[must_use]
    pub fn finalize(self) -> Vec<DuplicateGroup> {
        let total = self.groups.len();
        let reportable: Vec<DuplicateGroup> = self
            .groups
            .into_iter()
            .filter(|group| {
                if group.is_reportable() {
                    log::debug!("Group '{}': {} entries", group.key, group.len());
                    true
                } else {
                    log::trace!("Eliminated unique key '{}'", group.key);
                    false
                }
            })
            .collect();

        log::debug!(
            "Index finalized: {} keys, {} reportable groups",
            total,
            reportable.len()
        );
        reportable
    }
}
