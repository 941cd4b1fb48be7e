//! Change-kind classification seam and cache.
//!
//! Classifying the relationship between two commits requires reading commit
//! content and parentage from the repository, which is expensive. The
//! classifier is therefore deterministic and memoized by
//! `(project, old_commit, new_commit)`; repeated requests for the same
//! change reuse the cached kind.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStats, SingleFlightCache};
use crate::types::{ChangeKind, CommitId, ProjectName};

/// Classifies the relationship between two consecutive revisions' commits.
///
/// Must be a pure function of commit content and parentage. Unreadable
/// commit data is a storage error; the inference engine propagates it and
/// never retries.
#[async_trait]
pub trait ChangeKindClassifier: Send + Sync {
    /// Error type for classification failures.
    type Error: std::error::Error + Send + Sync;

    /// Classify the relationship between `old_commit` and `new_commit`.
    async fn classify(
        &self,
        project: &ProjectName,
        old_commit: &CommitId,
        new_commit: &CommitId,
    ) -> Result<ChangeKind, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct KindKey {
    project: ProjectName,
    old_commit: CommitId,
    new_commit: CommitId,
}

/// Single-flight memoization in front of a [`ChangeKindClassifier`].
///
/// Shared across all changes of the process; two concurrent requests for
/// the same commit pair run the classification once.
pub struct ChangeKindCache<C> {
    classifier: Arc<C>,
    cache: SingleFlightCache<KindKey, ChangeKind>,
}

impl<C: ChangeKindClassifier> ChangeKindCache<C> {
    /// Create a cache in front of a classifier.
    pub fn new(classifier: Arc<C>, config: CacheConfig) -> Self {
        Self {
            classifier,
            cache: SingleFlightCache::new(config),
        }
    }

    /// Get the change kind for a commit pair, classifying on a miss.
    pub async fn get(
        &self,
        project: &ProjectName,
        old_commit: &CommitId,
        new_commit: &CommitId,
    ) -> Result<ChangeKind, C::Error> {
        let key = KindKey {
            project: project.clone(),
            old_commit: *old_commit,
            new_commit: *new_commit,
        };
        self.cache
            .get_or_try_init(key, || async {
                let kind = self
                    .classifier
                    .classify(project, old_commit, new_commit)
                    .await?;
                tracing::trace!(
                    %project,
                    old = %old_commit,
                    new = %new_commit,
                    %kind,
                    "classified change kind"
                );
                Ok(kind)
            })
            .await
    }

    /// Cache statistics, `None` when caching is disabled.
    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.stats()
    }
}

/// Error type for the in-memory classifier.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryClassifyError {
    /// No kind registered for the commit pair.
    #[error("no change kind registered for {old}..{new}")]
    UnknownCommitPair {
        /// Old side of the pair.
        old: CommitId,
        /// New side of the pair.
        new: CommitId,
    },
}

/// In-memory classifier keyed by commit pair, for tests and embedding.
///
/// An unregistered pair fails the way an unreadable commit would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChangeKinds {
    kinds: BTreeMap<(CommitId, CommitId), ChangeKind>,
}

impl InMemoryChangeKinds {
    /// Create an empty classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the kind for a commit pair.
    pub fn insert(&mut self, old_commit: CommitId, new_commit: CommitId, kind: ChangeKind) {
        self.kinds.insert((old_commit, new_commit), kind);
    }
}

#[async_trait]
impl ChangeKindClassifier for InMemoryChangeKinds {
    type Error = InMemoryClassifyError;

    async fn classify(
        &self,
        _project: &ProjectName,
        old_commit: &CommitId,
        new_commit: &CommitId,
    ) -> Result<ChangeKind, Self::Error> {
        self.kinds
            .get(&(*old_commit, *new_commit))
            .copied()
            .ok_or(InMemoryClassifyError::UnknownCommitPair {
                old: *old_commit,
                new: *new_commit,
            })
    }
}
