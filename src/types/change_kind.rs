//! Classification of the relationship between two consecutive revisions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How two consecutive commits of a change relate.
///
/// The enum is closed on purpose: every consumer matches exhaustively, so
/// adding a kind forces every call site to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Content changed; no copy rule applies on kind alone.
    Rework,
    /// Only the base commit changed, not the content.
    TrivialRebase,
    /// Code is identical; only the commit message or similar changed.
    NoCodeChange,
    /// Nothing changed at all.
    NoChange,
    /// A merge commit whose first parent was updated.
    MergeFirstParentUpdate,
}

impl ChangeKind {
    /// Parse a kind from its wire name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rework" => Some(Self::Rework),
            "trivial_rebase" => Some(Self::TrivialRebase),
            "no_code_change" => Some(Self::NoCodeChange),
            "no_change" => Some(Self::NoChange),
            "merge_first_parent_update" => Some(Self::MergeFirstParentUpdate),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rework => write!(f, "rework"),
            Self::TrivialRebase => write!(f, "trivial_rebase"),
            Self::NoCodeChange => write!(f, "no_code_change"),
            Self::NoChange => write!(f, "no_change"),
            Self::MergeFirstParentUpdate => write!(f, "merge_first_parent_update"),
        }
    }
}
