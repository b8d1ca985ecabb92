use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::crimes;

#[derive(Debug, Clone)]
pub struct NewCrime {
    pub criminal_id: String,
    pub statute_id: String,
    pub case_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub charge_level: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CrimeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub charge_level: Option<String>,
    pub status: Option<String>,
}

pub struct CrimeRepository {
    conn: DatabaseConnection,
}

impl CrimeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_crime: NewCrime, created_by: &str) -> Result<crimes::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = crimes::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            criminal_id: Set(new_crime.criminal_id),
            statute_id: Set(new_crime.statute_id),
            case_id: Set(new_crime.case_id),
            name: Set(new_crime.name),
            description: Set(new_crime.description),
            charge_level: Set(new_crime.charge_level),
            status: Set("pending".to_string()),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert crime")
    }

    pub async fn list(&self) -> Result<Vec<crimes::Model>> {
        crimes::Entity::find()
            .order_by_desc(crimes::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list crimes")
    }

    pub async fn list_for_criminal(&self, criminal_id: &str) -> Result<Vec<crimes::Model>> {
        crimes::Entity::find()
            .filter(crimes::Column::CriminalId.eq(criminal_id))
            .order_by_desc(crimes::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list crimes for criminal")
    }

    pub async fn get(&self, id: &str) -> Result<Option<crimes::Model>> {
        crimes::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query crime")
    }

    pub async fn update(&self, id: &str, update: CrimeUpdate) -> Result<Option<crimes::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: crimes::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description));
        }
        if let Some(charge_level) = update.charge_level {
            active.charge_level = Set(Some(charge_level));
        }
        if let Some(status) = update.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update crime")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = crimes::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete crime")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        crimes::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count crimes")
    }
}
