//! Storage contract for workflow records.
//!
//! Each operation is individually atomic; the orchestrator never needs
//! multi-record transactions because every workflow mutates independently.

use crate::error::RepositoryError;
use crate::workflow::Workflow;
use async_trait::async_trait;
use linklet_core::{OwnerId, WorkflowId};
use std::sync::{Arc, RwLock};

/// Storage for workflow records, scoped by owner.
#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Persists a new record. The caller supplies all fields.
    async fn insert(&self, workflow: &Workflow) -> Result<(), RepositoryError>;

    /// Finds a record by id.
    async fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>, RepositoryError>;

    /// Lists an owner's records in creation order.
    async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Workflow>, RepositoryError>;

    /// Full-record replace; used for trigger and activation changes.
    async fn update(&self, workflow: &Workflow) -> Result<(), RepositoryError>;

    /// Deletes a record.
    async fn delete(&self, id: WorkflowId) -> Result<(), RepositoryError>;
}

/// In-memory repository for tests and embedding.
///
/// Insertion order is creation order, so `find_by_owner` matches the
/// contract without sorting. Clones share state.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowRepository {
    records: Arc<RwLock<Vec<Workflow>>>,
}

impl InMemoryWorkflowRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clone for InMemoryWorkflowRepository {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn insert(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let mut records = self.records.write().unwrap();
        records.push(workflow.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>, RepositoryError> {
        let records = self.records.read().unwrap();
        Ok(records.iter().find(|w| w.id == id).cloned())
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Workflow>, RepositoryError> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|w| w.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let mut records = self.records.write().unwrap();
        let Some(slot) = records.iter_mut().find(|w| w.id == workflow.id) else {
            return Err(RepositoryError::backend(format!(
                "no record for workflow {}",
                workflow.id
            )));
        };
        *slot = workflow.clone();
        Ok(())
    }

    async fn delete(&self, id: WorkflowId) -> Result<(), RepositoryError> {
        let mut records = self.records.write().unwrap();
        records.retain(|w| w.id != id);
        Ok(())
    }
}
