use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::evidence;

#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub case_id: String,
    pub title: String,
    pub filename: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EvidenceUpdate {
    pub title: Option<String>,
    pub filename: Option<String>,
    pub tags: Option<Vec<String>>,
    pub summary: Option<String>,
}

pub struct EvidenceRepository {
    conn: DatabaseConnection,
}

impl EvidenceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        new_evidence: NewEvidence,
        uploaded_by: &str,
    ) -> Result<evidence::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let tags = new_evidence
            .tags
            .map(|t| serde_json::to_string(&t))
            .transpose()
            .context("Failed to serialize tags")?;

        let model = evidence::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            case_id: Set(new_evidence.case_id),
            title: Set(new_evidence.title),
            filename: Set(new_evidence.filename),
            tags: Set(tags),
            summary: Set(new_evidence.summary),
            uploaded_by: Set(Some(uploaded_by.to_string())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert evidence")
    }

    /// List all evidence, optionally narrowed to one case.
    pub async fn list(&self, case_id: Option<&str>) -> Result<Vec<evidence::Model>> {
        let mut query = evidence::Entity::find();
        if let Some(case_id) = case_id {
            query = query.filter(evidence::Column::CaseId.eq(case_id));
        }

        query
            .order_by_desc(evidence::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list evidence")
    }

    pub async fn get(&self, id: &str) -> Result<Option<evidence::Model>> {
        evidence::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query evidence")
    }

    pub async fn update(&self, id: &str, update: EvidenceUpdate) -> Result<Option<evidence::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let tags = update
            .tags
            .map(|t| serde_json::to_string(&t))
            .transpose()
            .context("Failed to serialize tags")?;

        let mut active: evidence::ActiveModel = existing.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(filename) = update.filename {
            active.filename = Set(Some(filename));
        }
        if let Some(tags) = tags {
            active.tags = Set(Some(tags));
        }
        if let Some(summary) = update.summary {
            active.summary = Set(Some(summary));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update evidence")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = evidence::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete evidence")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        evidence::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count evidence")
    }
}
