//! Postgres workflow repository.
//!
//! The trigger is stored as its tagged serde form in a JSONB column;
//! values are only ever produced from and decoded back through the
//! `Trigger` enum, so malformed configuration cannot enter the domain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linklet_core::{OwnerId, WorkflowId};
use linklet_workflow::{RepositoryError, Trigger, Workflow, WorkflowRepository};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Row type for workflow queries.
#[derive(FromRow)]
struct WorkflowRow {
    id: String,
    owner_id: i64,
    name: String,
    description: Option<String>,
    remote_id: String,
    trigger: Option<serde_json::Value>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl WorkflowRow {
    fn try_into_record(self) -> Result<Workflow, RepositoryError> {
        let id = WorkflowId::from_str(&self.id).map_err(|e| {
            RepositoryError::backend(format!("invalid workflow id '{}': {}", self.id, e))
        })?;

        let trigger = self
            .trigger
            .map(serde_json::from_value::<Trigger>)
            .transpose()
            .map_err(|e| RepositoryError::backend(format!("invalid trigger for '{id}': {e}")))?;

        Ok(Workflow {
            id,
            owner_id: OwnerId::from_i64(self.owner_id),
            name: self.name,
            description: self.description,
            remote_id: self.remote_id.into(),
            trigger,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

fn trigger_json(workflow: &Workflow) -> Result<Option<serde_json::Value>, RepositoryError> {
    workflow
        .trigger
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| RepositoryError::backend(format!("trigger serialization failed: {e}")))
}

/// Repository for workflow records.
pub struct PgWorkflowRepository {
    pool: PgPool,
}

impl PgWorkflowRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowRepository for PgWorkflowRepository {
    async fn insert(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let trigger = trigger_json(workflow)?;

        sqlx::query(
            r#"
            INSERT INTO workflows
                (id, owner_id, name, description, remote_id, trigger, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(workflow.id.to_string())
        .bind(workflow.owner_id.as_i64())
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(workflow.remote_id.as_str())
        .bind(&trigger)
        .bind(workflow.is_active)
        .bind(workflow.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::backend(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: WorkflowId) -> Result<Option<Workflow>, RepositoryError> {
        let row: Option<WorkflowRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, description, remote_id, trigger, is_active, created_at
            FROM workflows
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::backend(e.to_string()))?;

        row.map(WorkflowRow::try_into_record).transpose()
    }

    async fn find_by_owner(&self, owner_id: OwnerId) -> Result<Vec<Workflow>, RepositoryError> {
        let rows: Vec<WorkflowRow> = sqlx::query_as(
            r#"
            SELECT id, owner_id, name, description, remote_id, trigger, is_active, created_at
            FROM workflows
            WHERE owner_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(owner_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::backend(e.to_string()))?;

        rows.into_iter().map(WorkflowRow::try_into_record).collect()
    }

    async fn update(&self, workflow: &Workflow) -> Result<(), RepositoryError> {
        let trigger = trigger_json(workflow)?;

        sqlx::query(
            r#"
            UPDATE workflows
            SET name = $2, description = $3, remote_id = $4, trigger = $5, is_active = $6
            WHERE id = $1
            "#,
        )
        .bind(workflow.id.to_string())
        .bind(&workflow.name)
        .bind(&workflow.description)
        .bind(workflow.remote_id.as_str())
        .bind(&trigger)
        .bind(workflow.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::backend(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: WorkflowId) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            DELETE FROM workflows
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::backend(e.to_string()))?;

        Ok(())
    }
}
