//! Label names and per-project copy-policy records.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::OnceLock;

fn label_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z][A-Za-z0-9-]*$").expect("valid pattern"))
}

/// Error when constructing a label name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LabelNameError {
    /// The name does not match `[A-Za-z][A-Za-z0-9-]*`.
    #[error("invalid label name: {0:?}")]
    Invalid(String),
}

/// A validated label name, e.g. `Code-Review`.
///
/// Names must start with a letter and contain only letters, digits and
/// hyphens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LabelName(String);

impl LabelName {
    /// Create a validated label name.
    pub fn new<S: Into<String>>(name: S) -> Result<Self, LabelNameError> {
        let name = name.into();
        if label_name_pattern().is_match(&name) {
            Ok(Self(name))
        } else {
            Err(LabelNameError::Invalid(name))
        }
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-project copy policy and score range for one label.
///
/// A label may be removed from project configuration after votes on it
/// were cast; the policy store then reports it as absent and candidate
/// votes on it are no longer copied forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelType {
    /// Minimum permitted score.
    pub min_value: i16,
    /// Maximum permitted score.
    pub max_value: i16,
    /// Copy a vote equal to the minimum permitted score.
    #[serde(default)]
    pub copy_min_score: bool,
    /// Copy a vote equal to the maximum permitted score.
    #[serde(default)]
    pub copy_max_score: bool,
    /// Copy any vote regardless of value or change kind.
    #[serde(default)]
    pub copy_any_score: bool,
    /// Copy all votes when the file lists of the two revisions are equal.
    #[serde(default)]
    pub copy_all_scores_if_list_of_files_did_not_change: bool,
    /// Copy all votes across a trivial rebase.
    #[serde(default)]
    pub copy_all_scores_on_trivial_rebase: bool,
    /// Copy all votes when only non-code content changed.
    #[serde(default)]
    pub copy_all_scores_if_no_code_change: bool,
    /// Copy all votes across a first-parent update of a merge.
    #[serde(default)]
    pub copy_all_scores_on_merge_first_parent_update: bool,
    /// Copy all votes when nothing changed at all.
    #[serde(default)]
    pub copy_all_scores_if_no_change: bool,
    /// Specific values that are always copied.
    #[serde(default)]
    pub copy_values: BTreeSet<i16>,
}

impl LabelType {
    /// Create a policy with the given score range and every copy flag off.
    pub fn new(min_value: i16, max_value: i16) -> Self {
        Self {
            min_value,
            max_value,
            copy_min_score: false,
            copy_max_score: false,
            copy_any_score: false,
            copy_all_scores_if_list_of_files_did_not_change: false,
            copy_all_scores_on_trivial_rebase: false,
            copy_all_scores_if_no_code_change: false,
            copy_all_scores_on_merge_first_parent_update: false,
            copy_all_scores_if_no_change: false,
            copy_values: BTreeSet::new(),
        }
    }

    /// True if `value` is the minimum permitted score.
    pub fn is_min(&self, value: i16) -> bool {
        value == self.min_value
    }

    /// True if `value` is the maximum permitted score.
    pub fn is_max(&self, value: i16) -> bool {
        value == self.max_value
    }
}
