//! In-memory stores for tests and embedding.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::convert::Infallible;

use super::{HistoryRead, LabelPolicyRead};
use crate::types::{ChangeId, ChangeSnapshot, LabelName, LabelType, ProjectName};

/// In-memory change history.
///
/// Uses BTreeMap for deterministic iteration order. Build it mutably,
/// then share it behind an `Arc`; reads never mutate.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    changes: BTreeMap<ChangeId, ChangeSnapshot>,
}

impl InMemoryHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the snapshot for a change.
    pub fn insert(&mut self, change: ChangeId, snapshot: ChangeSnapshot) {
        self.changes.insert(change, snapshot);
    }

    /// Number of changes stored.
    pub fn num_changes(&self) -> usize {
        self.changes.len()
    }
}

#[async_trait]
impl HistoryRead for InMemoryHistory {
    type Error = Infallible;

    async fn load(&self, change: &ChangeId) -> Result<Option<ChangeSnapshot>, Self::Error> {
        Ok(self.changes.get(change).cloned())
    }
}

/// In-memory label policy store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLabels {
    labels: BTreeMap<(ProjectName, LabelName), LabelType>,
}

impl InMemoryLabels {
    /// Create a new empty policy store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a label on a project.
    pub fn insert(&mut self, project: ProjectName, label: LabelName, label_type: LabelType) {
        self.labels.insert((project, label), label_type);
    }

    /// Remove a label from a project, as when a label is deleted from
    /// project configuration after votes on it were cast.
    pub fn remove(&mut self, project: &ProjectName, label: &LabelName) {
        self.labels.remove(&(project.clone(), label.clone()));
    }
}

#[async_trait]
impl LabelPolicyRead for InMemoryLabels {
    type Error = Infallible;

    async fn label_type(
        &self,
        project: &ProjectName,
        label: &LabelName,
    ) -> Result<Option<LabelType>, Self::Error> {
        Ok(self
            .labels
            .get(&(project.clone(), label.clone()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CommitId, PatchSet, PatchSetId};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_history_load_unknown_change() {
        let history = InMemoryHistory::new();
        let loaded = history.load(&ChangeId::new(1)).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_history_round_trip() {
        let mut snapshot = ChangeSnapshot::new(ProjectName::new("demo"));
        snapshot.add_patch_set(PatchSet::new(
            PatchSetId::new(1),
            CommitId::new([1; 20]),
            vec![],
            Utc.timestamp_opt(1000, 0).unwrap(),
        ));

        let mut history = InMemoryHistory::new();
        history.insert(ChangeId::new(7), snapshot);

        let loaded = history.load(&ChangeId::new(7)).await.unwrap().unwrap();
        assert_eq!(loaded.num_patch_sets(), 1);
        assert_eq!(history.num_changes(), 1);
    }

    #[tokio::test]
    async fn test_labels_absent_after_removal() {
        let project = ProjectName::new("demo");
        let label = LabelName::new("Code-Review").unwrap();

        let mut labels = InMemoryLabels::new();
        labels.insert(project.clone(), label.clone(), LabelType::new(-2, 2));
        assert!(labels
            .label_type(&project, &label)
            .await
            .unwrap()
            .is_some());

        labels.remove(&project, &label);
        assert!(labels
            .label_type(&project, &label)
            .await
            .unwrap()
            .is_none());
    }
}
