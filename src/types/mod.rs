//! Core types for the approval inference kernel.

pub mod approval;
pub mod change_kind;
pub mod diff;
pub mod label;
pub mod patch_set;

pub use approval::{AccountId, Approval, ApprovalKey};
pub use change_kind::ChangeKind;
pub use diff::{FileChangeType, FileDiff, FileDiffEntry};
pub use label::{LabelName, LabelNameError, LabelType};
pub use patch_set::{
    ChangeId, ChangeSnapshot, CommitId, CommitIdError, PatchSet, PatchSetId, ProjectName,
};
