use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::criminals;

#[derive(Debug, Clone)]
pub struct NewCriminal {
    pub first_name: String,
    pub last_name: String,
    pub aliases: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub threat_level: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CriminalUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub threat_level: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

pub struct CriminalRepository {
    conn: DatabaseConnection,
}

impl CriminalRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        new_criminal: NewCriminal,
        created_by: &str,
    ) -> Result<criminals::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let aliases = new_criminal
            .aliases
            .map(|a| serde_json::to_string(&a))
            .transpose()
            .context("Failed to serialize aliases")?;

        let model = criminals::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            first_name: Set(new_criminal.first_name),
            last_name: Set(new_criminal.last_name),
            aliases: Set(aliases),
            date_of_birth: Set(new_criminal.date_of_birth),
            address: Set(new_criminal.address),
            threat_level: Set(new_criminal
                .threat_level
                .unwrap_or_else(|| "low".to_string())),
            status: Set("active".to_string()),
            notes: Set(new_criminal.notes),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert criminal")
    }

    pub async fn list(&self) -> Result<Vec<criminals::Model>> {
        criminals::Entity::find()
            .order_by_asc(criminals::Column::LastName)
            .all(&self.conn)
            .await
            .context("Failed to list criminals")
    }

    pub async fn get(&self, id: &str) -> Result<Option<criminals::Model>> {
        criminals::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query criminal")
    }

    pub async fn update(
        &self,
        id: &str,
        update: CriminalUpdate,
    ) -> Result<Option<criminals::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let aliases = update
            .aliases
            .map(|a| serde_json::to_string(&a))
            .transpose()
            .context("Failed to serialize aliases")?;

        let mut active: criminals::ActiveModel = existing.into();
        if let Some(first_name) = update.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(aliases) = aliases {
            active.aliases = Set(Some(aliases));
        }
        if let Some(date_of_birth) = update.date_of_birth {
            active.date_of_birth = Set(Some(date_of_birth));
        }
        if let Some(address) = update.address {
            active.address = Set(Some(address));
        }
        if let Some(threat_level) = update.threat_level {
            active.threat_level = Set(threat_level);
        }
        if let Some(status) = update.status {
            active.status = Set(status);
        }
        if let Some(notes) = update.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update criminal")?;

        Ok(Some(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = criminals::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete criminal")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, id: &str) -> Result<bool> {
        let count = criminals::Entity::find()
            .filter(criminals::Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to check criminal existence")?;

        Ok(count > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        criminals::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count criminals")
    }
}
