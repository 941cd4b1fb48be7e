//! File-diff entries and file-list comparison.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a single path changed between a revision and its comparison base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileChangeType {
    /// Path was added.
    Added,
    /// Path content was modified.
    Modified,
    /// Path was deleted.
    Deleted,
    /// Path was renamed.
    Renamed,
    /// Path was copied from another path.
    Copied,
    /// Path content was rewritten wholesale.
    Rewritten,
}

impl FileChangeType {
    /// One-letter status code.
    pub fn code(&self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
            Self::Renamed => 'R',
            Self::Copied => 'C',
            Self::Rewritten => 'W',
        }
    }
}

impl fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One changed path in a revision's diff against its comparison base.
///
/// `path` is the final name: the new name when a rename or copy occurred,
/// otherwise the only name the file ever had.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiffEntry {
    /// Final path of the file.
    pub path: String,
    /// Pre-rename (or copy-source) path, when different from `path`.
    pub old_path: Option<String>,
    /// Change classification for this path.
    pub change_type: FileChangeType,
}

impl FileDiffEntry {
    /// An added file.
    pub fn added<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            change_type: FileChangeType::Added,
        }
    }

    /// A modified file.
    pub fn modified<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            change_type: FileChangeType::Modified,
        }
    }

    /// A deleted file.
    pub fn deleted<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            change_type: FileChangeType::Deleted,
        }
    }

    /// A renamed file; the entry is keyed under the new name.
    pub fn renamed<S: Into<String>, T: Into<String>>(old_path: S, new_path: T) -> Self {
        Self {
            path: new_path.into(),
            old_path: Some(old_path.into()),
            change_type: FileChangeType::Renamed,
        }
    }

    /// A copied file; the entry is keyed under the destination name.
    pub fn copied<S: Into<String>, T: Into<String>>(source: S, dest: T) -> Self {
        Self {
            path: dest.into(),
            old_path: Some(source.into()),
            change_type: FileChangeType::Copied,
        }
    }

    /// A rewritten file.
    pub fn rewritten<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            change_type: FileChangeType::Rewritten,
        }
    }
}

/// The set of changed paths for one revision against its comparison base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Changed paths, in provider order.
    pub entries: Vec<FileDiffEntry>,
}

impl FileDiff {
    /// Create a diff from its entries.
    pub fn new(entries: Vec<FileDiffEntry>) -> Self {
        Self { entries }
    }

    /// An empty diff.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Map from final path to change type.
    pub fn file_map(&self) -> BTreeMap<&str, FileChangeType> {
        self.entries
            .iter()
            .map(|e| (e.path.as_str(), e.change_type))
            .collect()
    }

    /// True iff both diffs touch the same final paths with the same change
    /// types. Entry order is irrelevant. A pure rename counts as unchanged
    /// only when the other side classifies the same final path as a rename
    /// too.
    pub fn same_file_list(&self, other: &FileDiff) -> bool {
        self.file_map() == other.file_map()
    }
}
