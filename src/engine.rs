//! The approval inference engine.
//!
//! Derives the effective approval set for a target patch set by combining
//! the approvals stored directly on it with approvals inherited from the
//! immediately preceding patch set, gated by the change kind between the
//! two revisions and the per-project copy policy of each label.
//!
//! The resolver is written as an iterative pass over patch sets in
//! ascending id order with an explicit per-patch-set result table, rather
//! than a recursive call chain. Candidates move forward one patch set at a
//! time: a vote held back at one step is absent from that step's result
//! and is therefore never considered again by any later step.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::classify::{ChangeKindCache, ChangeKindClassifier};
use crate::diff::{FileDiffCache, FileDiffProvider};
use crate::policy::can_copy;
use crate::store::{HistoryRead, LabelPolicyRead};
use crate::types::{Approval, ApprovalKey, ChangeId, ChangeSnapshot, PatchSet, PatchSetId};

/// Error type for inference operations.
///
/// Every variant is fatal to the call that produced it; no approval is
/// ever silently dropped because a collaborator failed.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The change is unknown to the history reader.
    #[error("change not found: {0}")]
    ChangeNotFound(ChangeId),
    /// History read failed.
    #[error("history read failed: {0}")]
    History(String),
    /// Label policy read failed.
    #[error("label policy read failed: {0}")]
    LabelStore(String),
    /// Change-kind classification failed.
    #[error("change kind classification failed: {0}")]
    ChangeKind(String),
    /// File-diff computation failed, so votes gated on the file list
    /// cannot be decided.
    #[error("file diff unavailable: {0}")]
    DiffUnavailable(String),
}

impl InferenceError {
    /// Wrap a history reader error.
    pub fn from_history<E: std::error::Error>(e: E) -> Self {
        Self::History(e.to_string())
    }

    /// Wrap a label policy store error.
    pub fn from_labels<E: std::error::Error>(e: E) -> Self {
        Self::LabelStore(e.to_string())
    }

    /// Wrap a classifier error.
    pub fn from_change_kind<E: std::error::Error>(e: E) -> Self {
        Self::ChangeKind(e.to_string())
    }

    /// Wrap a diff provider error.
    pub fn from_diff<E: std::error::Error>(e: E) -> Self {
        Self::DiffUnavailable(e.to_string())
    }
}

/// Computes effective approvals for patch sets.
///
/// A pure read computation: collaborators are read-only, results are
/// returned by value, and concurrent calls for different changes are fully
/// independent. The change-kind and file-diff caches are shared across all
/// calls so that resolving every patch set of a change costs one
/// classification and at most two diffs per adjacent pair, in whatever
/// order the patch sets are requested.
///
/// Output values are unclamped; a downstream normalizer applies permission
/// filtering and range clamping.
pub struct ApprovalInference<H, L, C, D> {
    history: Arc<H>,
    labels: Arc<L>,
    change_kinds: ChangeKindCache<C>,
    file_diffs: FileDiffCache<D>,
}

impl<H, L, C, D> ApprovalInference<H, L, C, D>
where
    H: HistoryRead,
    L: LabelPolicyRead,
    C: ChangeKindClassifier,
    D: FileDiffProvider,
{
    /// Create an engine from its collaborators.
    pub fn new(
        history: Arc<H>,
        labels: Arc<L>,
        change_kinds: ChangeKindCache<C>,
        file_diffs: FileDiffCache<D>,
    ) -> Self {
        Self {
            history,
            labels,
            change_kinds,
            file_diffs,
        }
    }

    /// Effective approvals for `target`, one per (label, account), direct
    /// votes first-class and inherited votes filling the gaps.
    ///
    /// An unknown change is an error; an unknown patch set on a known
    /// change yields an empty result.
    pub async fn effective_approvals(
        &self,
        change: &ChangeId,
        target: PatchSetId,
    ) -> Result<Vec<Approval>, InferenceError> {
        let snapshot = self
            .history
            .load(change)
            .await
            .map_err(InferenceError::from_history)?
            .ok_or(InferenceError::ChangeNotFound(*change))?;
        self.effective_approvals_in(&snapshot, target).await
    }

    /// Effective approvals for `target` within an already-loaded snapshot.
    ///
    /// All patch sets with ids up to the target are resolved in ascending
    /// order; each step inherits only from the result of the step before
    /// it. The per-step results live in an explicit table, so the chain
    /// never grows the call stack and the work per step is visible to
    /// tests.
    pub async fn effective_approvals_in(
        &self,
        snapshot: &ChangeSnapshot,
        target: PatchSetId,
    ) -> Result<Vec<Approval>, InferenceError> {
        if snapshot.patch_set(target).is_none() {
            return Ok(Vec::new());
        }

        let mut resolved: BTreeMap<PatchSetId, BTreeMap<ApprovalKey, Approval>> = BTreeMap::new();

        for patch_set in snapshot.patch_sets_up_to(target) {
            let mut result: BTreeMap<ApprovalKey, Approval> = BTreeMap::new();

            // Direct votes seed the result and are never displaced.
            for approval in snapshot.approvals_on(patch_set.id) {
                result.insert(approval.key(), approval.clone());
            }

            if let Some(preceding) = snapshot.preceding(patch_set.id) {
                // Table invariant: the preceding id was resolved by an
                // earlier iteration of this ascending pass.
                let prior = &resolved[&preceding.id];
                if !prior.is_empty() {
                    self.inherit(snapshot, preceding, patch_set, prior, &mut result)
                        .await?;
                }
            }

            resolved.insert(patch_set.id, result);
        }

        let result = resolved.remove(&target).unwrap_or_default();
        // BTreeMap iteration gives deterministic (label, account) order.
        Ok(result.into_values().collect())
    }

    /// Evaluate every prior-result candidate against the copy policy and
    /// insert the survivors re-keyed to `patch_set`.
    async fn inherit(
        &self,
        snapshot: &ChangeSnapshot,
        preceding: &PatchSet,
        patch_set: &PatchSet,
        prior: &BTreeMap<ApprovalKey, Approval>,
        result: &mut BTreeMap<ApprovalKey, Approval>,
    ) -> Result<(), InferenceError> {
        let project = &snapshot.project;
        let kind = self
            .change_kinds
            .get(project, &preceding.commit, &patch_set.commit)
            .await
            .map_err(InferenceError::from_change_kind)?;
        debug!(
            %project,
            from = %preceding.id,
            to = %patch_set.id,
            %kind,
            "change kind between consecutive patch sets"
        );

        // Diffs are expensive: compute them only when the first candidate
        // whose label sets the file-list flag needs them, then reuse the
        // answer for the rest of the batch.
        let mut files_unchanged: Option<bool> = None;

        for (key, candidate) in prior {
            if result.contains_key(key) {
                continue;
            }

            let label_type = self
                .labels
                .label_type(project, &candidate.label)
                .await
                .map_err(InferenceError::from_labels)?;

            if files_unchanged.is_none()
                && label_type
                    .as_ref()
                    .is_some_and(|lt| lt.copy_all_scores_if_list_of_files_did_not_change)
            {
                let current = self
                    .file_diffs
                    .get(project, patch_set)
                    .await
                    .map_err(InferenceError::from_diff)?;
                let prior_diff = self
                    .file_diffs
                    .get(project, preceding)
                    .await
                    .map_err(InferenceError::from_diff)?;
                files_unchanged = Some(current.same_file_list(&prior_diff));
            }

            if can_copy(
                label_type.as_ref(),
                candidate,
                patch_set.id,
                kind,
                files_unchanged,
            ) {
                result.insert(key.clone(), candidate.copied_to(patch_set.id));
            }
        }
        Ok(())
    }
}
