//! Read-only collaborator traits.
//!
//! The kernel never writes: history and label configuration come in through
//! these traits and results go out by value. All methods are async to
//! support backing stores that live behind I/O.

pub mod memory;

use async_trait::async_trait;

use crate::types::{ChangeId, ChangeSnapshot, LabelName, LabelType, ProjectName};

/// Read access to a change's patch-set history and stored approvals.
///
/// Implementations must return an internally consistent snapshot: the
/// patch sets and approvals of one `load` call describe a single point in
/// time, even if history is being rewritten concurrently.
#[async_trait]
pub trait HistoryRead: Send + Sync {
    /// Error type for history reads.
    type Error: std::error::Error + Send + Sync;

    /// Load the snapshot for a change, or `None` if the change is unknown.
    async fn load(&self, change: &ChangeId) -> Result<Option<ChangeSnapshot>, Self::Error>;
}

/// Read access to per-project label configuration.
#[async_trait]
pub trait LabelPolicyRead: Send + Sync {
    /// Error type for policy reads.
    type Error: std::error::Error + Send + Sync;

    /// Look up the copy policy for a label on a project.
    ///
    /// A label that was removed from the project after votes on it were
    /// cast is reported as `Ok(None)`, not as an error.
    async fn label_type(
        &self,
        project: &ProjectName,
        label: &LabelName,
    ) -> Result<Option<LabelType>, Self::Error>;
}

pub use memory::{InMemoryHistory, InMemoryLabels};
