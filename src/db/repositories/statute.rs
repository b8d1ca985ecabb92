use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::statutes;

#[derive(Debug, Clone)]
pub struct NewStatute {
    pub title: String,
    pub section_number: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StatuteUpdate {
    pub title: Option<String>,
    pub section_number: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
}

pub struct StatuteRepository {
    conn: DatabaseConnection,
}

impl StatuteRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_statute: NewStatute, created_by: &str) -> Result<statutes::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = statutes::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            title: Set(new_statute.title),
            section_number: Set(new_statute.section_number),
            description: Set(new_statute.description),
            content: Set(new_statute.content),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert statute")
    }

    pub async fn list(&self) -> Result<Vec<statutes::Model>> {
        statutes::Entity::find()
            .order_by_asc(statutes::Column::Title)
            .all(&self.conn)
            .await
            .context("Failed to list statutes")
    }

    pub async fn get(&self, id: &str) -> Result<Option<statutes::Model>> {
        statutes::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query statute")
    }

    pub async fn update(&self, id: &str, update: StatuteUpdate) -> Result<Option<statutes::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: statutes::ActiveModel = existing.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(section_number) = update.section_number {
            active.section_number = Set(Some(section_number));
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(content) = update.content {
            active.content = Set(Some(content));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update statute")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = statutes::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete statute")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let count = statutes::Entity::find()
            .filter(statutes::Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to check statute existence")?;

        Ok(count > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        statutes::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count statutes")
    }
}
