//! # approval-inference
//!
//! Policy-driven inference of review approvals across the patch sets of a
//! change.
//!
//! The kernel answers one question:
//!
//! > Given a target patch set, which votes — cast on it directly or on
//! > earlier patch sets — are **in effect** on it?
//!
//! ## Core Contract
//!
//! 1. Direct votes on the target always appear in the result unchanged
//! 2. A prior vote is inherited only when the label's copy policy and the
//!    change kind between the two adjacent revisions permit it
//! 3. The result holds at most one approval per (label, account) pair,
//!    values unclamped (a downstream normalizer clamps and filters)
//!
//! ## Architecture
//!
//! ```text
//! HistoryRead ─┐
//! LabelPolicyRead ─┤
//! ChangeKindCache ─┼─→ ApprovalInference ─→ effective approvals
//! FileDiffCache ───┘
//! ```
//!
//! ## Inheritance Guarantees
//!
//! - Votes move forward one patch set at a time; a vote held back at one
//!   step never reappears at a later one
//! - Resolving every patch set of a change costs one classification and at
//!   most two diffs per adjacent revision pair, in any request order
//! - Collaborator failures are fatal and propagated; no vote is silently
//!   dropped or kept because a diff or classification was unreadable

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod classify;
pub mod diff;
pub mod engine;
pub mod policy;
pub mod store;
pub mod types;

// Re-exports
pub use types::{AccountId, Approval, ApprovalKey, ChangeKind, FileChangeType, FileDiff,
    FileDiffEntry, LabelName, LabelNameError, LabelType};
pub use types::{ChangeId, ChangeSnapshot, CommitId, CommitIdError, PatchSet, PatchSetId,
    ProjectName};
pub use cache::{CacheConfig, CacheStats};
pub use classify::{ChangeKindCache, ChangeKindClassifier, InMemoryChangeKinds};
pub use diff::{DiffBase, FileDiffCache, FileDiffProvider, InMemoryDiffs};
pub use engine::{ApprovalInference, InferenceError};
pub use policy::can_copy;
pub use store::{HistoryRead, InMemoryHistory, InMemoryLabels, LabelPolicyRead};
