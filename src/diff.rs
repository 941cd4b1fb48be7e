//! File-diff provider seam, diff-base selection and cache.
//!
//! A revision's file list is always computed against the same base: the
//! first parent for ordinary commits, the first parent again for merge
//! commits (the destination-branch side, never the second parent), or the
//! empty tree for parentless commits. Because the base is a deterministic
//! function of the commit, the cache is keyed by `(project, commit)`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStats, SingleFlightCache};
use crate::types::{CommitId, FileDiff, PatchSet, ProjectName};

/// The comparison base for a revision's file diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffBase {
    /// Compare against a parent commit.
    Commit(CommitId),
    /// Compare against the empty tree (parentless commit).
    EmptyTree,
}

impl DiffBase {
    /// Select the base for a commit with the given parents: the first
    /// parent when one exists, the empty tree otherwise.
    pub fn select(parents: &[CommitId]) -> Self {
        match parents.first() {
            Some(parent) => Self::Commit(*parent),
            None => Self::EmptyTree,
        }
    }
}

/// Computes the set of changed paths for a commit against a base.
///
/// A diff that cannot be computed is a domain error; the inference engine
/// propagates it unmodified. Guessing "unchanged" or "changed" would
/// corrupt the copy decision.
#[async_trait]
pub trait FileDiffProvider: Send + Sync {
    /// Error type for diff failures.
    type Error: std::error::Error + Send + Sync;

    /// Compute the file diff of `commit` against `base`.
    async fn diff(
        &self,
        project: &ProjectName,
        commit: &CommitId,
        base: &DiffBase,
    ) -> Result<FileDiff, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DiffKey {
    project: ProjectName,
    commit: CommitId,
}

/// Single-flight memoization in front of a [`FileDiffProvider`].
pub struct FileDiffCache<D> {
    provider: Arc<D>,
    cache: SingleFlightCache<DiffKey, Arc<FileDiff>>,
}

impl<D: FileDiffProvider> FileDiffCache<D> {
    /// Create a cache in front of a provider.
    pub fn new(provider: Arc<D>, config: CacheConfig) -> Self {
        Self {
            provider,
            cache: SingleFlightCache::new(config),
        }
    }

    /// Get the file diff for a patch set against its selected base.
    pub async fn get(
        &self,
        project: &ProjectName,
        patch_set: &PatchSet,
    ) -> Result<Arc<FileDiff>, D::Error> {
        let key = DiffKey {
            project: project.clone(),
            commit: patch_set.commit,
        };
        let base = DiffBase::select(&patch_set.parents);
        self.cache
            .get_or_try_init(key, || async {
                let diff = self.provider.diff(project, &patch_set.commit, &base).await?;
                tracing::trace!(
                    %project,
                    commit = %patch_set.commit,
                    files = diff.entries.len(),
                    "computed file diff"
                );
                Ok(Arc::new(diff))
            })
            .await
    }

    /// Cache statistics, `None` when caching is disabled.
    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.stats()
    }
}

/// Error type for the in-memory diff provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryDiffError {
    /// No diff registered for the commit.
    #[error("file diff unavailable for commit {0}")]
    Unavailable(CommitId),
}

/// In-memory diff provider keyed by commit, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiffs {
    diffs: BTreeMap<CommitId, FileDiff>,
}

impl InMemoryDiffs {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the diff for a commit.
    pub fn insert(&mut self, commit: CommitId, diff: FileDiff) {
        self.diffs.insert(commit, diff);
    }
}

#[async_trait]
impl FileDiffProvider for InMemoryDiffs {
    type Error = InMemoryDiffError;

    async fn diff(
        &self,
        _project: &ProjectName,
        commit: &CommitId,
        _base: &DiffBase,
    ) -> Result<FileDiff, Self::Error> {
        self.diffs
            .get(commit)
            .cloned()
            .ok_or(InMemoryDiffError::Unavailable(*commit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileDiffEntry, PatchSetId};
    use chrono::{TimeZone, Utc};

    fn commit(n: u8) -> CommitId {
        CommitId::new([n; 20])
    }

    fn ps(id: u32, c: u8, parents: Vec<CommitId>) -> PatchSet {
        PatchSet::new(
            PatchSetId::new(id),
            commit(c),
            parents,
            Utc.timestamp_opt(1000, 0).unwrap(),
        )
    }

    #[test]
    fn test_base_is_first_parent_for_ordinary_commit() {
        assert_eq!(
            DiffBase::select(&[commit(1)]),
            DiffBase::Commit(commit(1))
        );
    }

    #[test]
    fn test_base_is_first_parent_for_merge_commit() {
        // Merge commits compare against the destination-branch side.
        assert_eq!(
            DiffBase::select(&[commit(1), commit(2)]),
            DiffBase::Commit(commit(1))
        );
    }

    #[test]
    fn test_base_is_empty_tree_for_parentless_commit() {
        assert_eq!(DiffBase::select(&[]), DiffBase::EmptyTree);
    }

    #[tokio::test]
    async fn test_cache_round_trip() {
        let mut diffs = InMemoryDiffs::new();
        diffs.insert(
            commit(2),
            FileDiff::new(vec![FileDiffEntry::modified("src/lib.rs")]),
        );

        let cache = FileDiffCache::new(Arc::new(diffs), CacheConfig::default());
        let project = ProjectName::new("demo");
        let patch_set = ps(1, 2, vec![commit(1)]);

        let diff = cache.get(&project, &patch_set).await.unwrap();
        assert_eq!(diff.entries.len(), 1);
        assert_eq!(cache.stats().unwrap().len, 1);
    }

    #[tokio::test]
    async fn test_missing_diff_is_an_error() {
        let cache = FileDiffCache::new(Arc::new(InMemoryDiffs::new()), CacheConfig::default());
        let project = ProjectName::new("demo");
        let patch_set = ps(1, 2, vec![commit(1)]);

        assert!(cache.get(&project, &patch_set).await.is_err());
    }
}
