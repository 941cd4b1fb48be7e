//! Approval (vote) types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::label::LabelName;
use super::patch_set::PatchSetId;

/// Identifier of the account that cast a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(u64);

impl AccountId {
    /// Create a new AccountId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key identifying at most one approval in an effective set.
pub type ApprovalKey = (LabelName, AccountId);

/// A vote on one label by one account, attached to one patch set.
///
/// A directly-stored approval is an immutable fact about the patch set it
/// was cast on. An inferred approval is a copy re-keyed to a later patch
/// set; label, account, value and grant time are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    /// The label voted on.
    pub label: LabelName,
    /// The voting account.
    pub account: AccountId,
    /// The vote value, unclamped.
    pub value: i16,
    /// The patch set this approval applies to.
    pub patch_set: PatchSetId,
    /// When the vote was originally cast.
    pub granted_at: DateTime<Utc>,
}

impl Approval {
    /// Create a new approval.
    pub fn new(
        label: LabelName,
        account: AccountId,
        value: i16,
        patch_set: PatchSetId,
        granted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            label,
            account,
            value,
            patch_set,
            granted_at,
        }
    }

    /// The (label, account) key this approval occupies in an effective set.
    pub fn key(&self) -> ApprovalKey {
        (self.label.clone(), self.account)
    }

    /// Copy this approval forward to another patch set.
    ///
    /// Label, account, value and grant time are preserved.
    pub fn copied_to(&self, patch_set: PatchSetId) -> Self {
        Self {
            patch_set,
            ..self.clone()
        }
    }
}
