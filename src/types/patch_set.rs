//! Patch-set and change identity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::approval::Approval;

/// Unique identifier for a change under review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChangeId(u64);

impl ChangeId {
    /// Create a new ChangeId.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a patch set within a change.
///
/// Ids are strictly increasing per change but not necessarily contiguous:
/// deleting a patch set leaves a gap that is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PatchSetId(u32);

impl PatchSetId {
    /// Create a new PatchSetId.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the inner value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PatchSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error when parsing a commit id from hex.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommitIdError {
    /// The string is not valid hex.
    #[error("invalid hex in commit id: {0}")]
    InvalidHex(String),
    /// The decoded bytes are not exactly 20 bytes long.
    #[error("commit id must be 20 bytes, got {0}")]
    BadLength(usize),
}

/// A 20-byte commit identifier, displayed as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommitId([u8; 20]);

impl CommitId {
    /// Create a CommitId from raw bytes.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse a CommitId from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CommitIdError> {
        let bytes = hex::decode(s).map_err(|_| CommitIdError::InvalidHex(s.to_string()))?;
        let arr: [u8; 20] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CommitIdError::BadLength(bytes.len()))?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Name of the project a change belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectName(String);

impl ProjectName {
    /// Create a new project name.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One uploaded revision of a change.
///
/// Immutable once uploaded. The parent list is the commit's parents in
/// order; the first parent is the comparison base for diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchSet {
    /// Identifier within the change.
    pub id: PatchSetId,
    /// The commit this patch set points at.
    pub commit: CommitId,
    /// Parent commit ids, first parent first.
    pub parents: Vec<CommitId>,
    /// Upload time.
    pub created_at: DateTime<Utc>,
}

impl PatchSet {
    /// Create a new patch set.
    pub fn new(
        id: PatchSetId,
        commit: CommitId,
        parents: Vec<CommitId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            commit,
            parents,
            created_at,
        }
    }

    /// True if the commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Immutable per-change snapshot of patch-set history and stored approvals.
///
/// All inference for one call runs against a single snapshot, so a history
/// rewrite concurrent with the read is invisible within that call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSnapshot {
    /// Project the change belongs to.
    pub project: ProjectName,
    /// Patch sets keyed by id (ascending iteration order).
    patch_sets: BTreeMap<PatchSetId, PatchSet>,
    /// Directly-stored approvals keyed by the patch set they were cast on.
    approvals: BTreeMap<PatchSetId, Vec<Approval>>,
}

impl ChangeSnapshot {
    /// Create an empty snapshot for a project.
    pub fn new(project: ProjectName) -> Self {
        Self {
            project,
            patch_sets: BTreeMap::new(),
            approvals: BTreeMap::new(),
        }
    }

    /// Add a patch set.
    pub fn add_patch_set(&mut self, patch_set: PatchSet) {
        self.patch_sets.insert(patch_set.id, patch_set);
    }

    /// Record an approval stored directly on a patch set.
    pub fn add_approval(&mut self, approval: Approval) {
        self.approvals
            .entry(approval.patch_set)
            .or_default()
            .push(approval);
    }

    /// Look up a patch set by id.
    pub fn patch_set(&self, id: PatchSetId) -> Option<&PatchSet> {
        self.patch_sets.get(&id)
    }

    /// The patch set with the greatest id strictly less than `id`, if any.
    ///
    /// Ids may have gaps, so this is a range lookup, not `id - 1`.
    pub fn preceding(&self, id: PatchSetId) -> Option<&PatchSet> {
        self.patch_sets.range(..id).next_back().map(|(_, ps)| ps)
    }

    /// Patch sets with id less than or equal to `id`, ascending.
    pub fn patch_sets_up_to(&self, id: PatchSetId) -> impl Iterator<Item = &PatchSet> {
        self.patch_sets.range(..=id).map(|(_, ps)| ps)
    }

    /// Approvals stored directly on a patch set.
    pub fn approvals_on(&self, id: PatchSetId) -> &[Approval] {
        self.approvals.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of patch sets in the snapshot.
    pub fn num_patch_sets(&self) -> usize {
        self.patch_sets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn commit(n: u8) -> CommitId {
        CommitId::new([n; 20])
    }

    fn ps(id: u32, c: u8) -> PatchSet {
        PatchSet::new(
            PatchSetId::new(id),
            commit(c),
            vec![commit(0)],
            Utc.timestamp_opt(1000, 0).unwrap(),
        )
    }

    #[test]
    fn test_commit_id_hex_round_trip() {
        let id = CommitId::from_hex("0123456789abcdef0123456789abcdef01234567").unwrap();
        assert_eq!(id.to_string(), "0123456789abcdef0123456789abcdef01234567");
    }

    #[test]
    fn test_commit_id_rejects_bad_input() {
        assert!(CommitId::from_hex("zzzz").is_err());
        assert!(CommitId::from_hex("abcd").is_err());
    }

    #[test]
    fn test_preceding_with_gaps() {
        let mut snap = ChangeSnapshot::new(ProjectName::new("demo"));
        snap.add_patch_set(ps(1, 1));
        snap.add_patch_set(ps(4, 4));
        snap.add_patch_set(ps(9, 9));

        // Gap between 4 and 9: the predecessor of 9 is 4, not 8.
        assert_eq!(
            snap.preceding(PatchSetId::new(9)).unwrap().id,
            PatchSetId::new(4)
        );
        assert_eq!(
            snap.preceding(PatchSetId::new(4)).unwrap().id,
            PatchSetId::new(1)
        );
        assert!(snap.preceding(PatchSetId::new(1)).is_none());
        // Predecessor lookups work for ids not present in the snapshot.
        assert_eq!(
            snap.preceding(PatchSetId::new(7)).unwrap().id,
            PatchSetId::new(4)
        );
    }

    #[test]
    fn test_patch_sets_up_to_is_ascending() {
        let mut snap = ChangeSnapshot::new(ProjectName::new("demo"));
        snap.add_patch_set(ps(5, 5));
        snap.add_patch_set(ps(1, 1));
        snap.add_patch_set(ps(3, 3));

        let ids: Vec<u32> = snap
            .patch_sets_up_to(PatchSetId::new(3))
            .map(|p| p.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_is_merge() {
        let single = ps(1, 1);
        assert!(!single.is_merge());

        let merge = PatchSet::new(
            PatchSetId::new(2),
            commit(2),
            vec![commit(0), commit(7)],
            Utc.timestamp_opt(1000, 0).unwrap(),
        );
        assert!(merge.is_merge());
    }
}
