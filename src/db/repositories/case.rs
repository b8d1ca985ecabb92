use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::cases;

/// Fields accepted on case creation.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub title: String,
    pub description: String,
    pub status: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CaseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

pub struct CaseRepository {
    conn: DatabaseConnection,
}

impl CaseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new_case: NewCase, created_by: &str) -> Result<cases::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = cases::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            case_number: Set(generate_case_number()),
            title: Set(new_case.title),
            description: Set(new_case.description),
            status: Set(new_case.status.unwrap_or_else(|| "open".to_string())),
            created_by: Set(created_by.to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        model.insert(&self.conn).await.context("Failed to insert case")
    }

    /// All cases owned by a user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<cases::Model>> {
        cases::Entity::find()
            .filter(cases::Column::CreatedBy.eq(user_id))
            .order_by_desc(cases::Column::UpdatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list cases")
    }

    /// Fetch a case only if it is owned by the caller. Missing and
    /// not-owned are indistinguishable to the caller.
    pub async fn get_owned(&self, id: &str, user_id: &str) -> Result<Option<cases::Model>> {
        cases::Entity::find()
            .filter(cases::Column::Id.eq(id))
            .filter(cases::Column::CreatedBy.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query case")
    }

    pub async fn update_owned(
        &self,
        id: &str,
        user_id: &str,
        update: CaseUpdate,
    ) -> Result<Option<cases::Model>> {
        let Some(existing) = self.get_owned(id, user_id).await? else {
            return Ok(None);
        };

        let mut active: cases::ActiveModel = existing.into();
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(description) = update.description {
            active.description = Set(description);
        }
        if let Some(status) = update.status {
            active.status = Set(status);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update case")?;

        Ok(Some(updated))
    }

    /// Returns false when the case does not exist or is not owned by the
    /// caller.
    pub async fn delete_owned(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = cases::Entity::delete_many()
            .filter(cases::Column::Id.eq(id))
            .filter(cases::Column::CreatedBy.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete case")?;

        Ok(result.rows_affected > 0)
    }

    /// Existence check regardless of owner, for foreign-key validation.
    pub async fn exists(&self, id: &str) -> Result<bool> {
        let count = cases::Entity::find()
            .filter(cases::Column::Id.eq(id))
            .count(&self.conn)
            .await
            .context("Failed to check case existence")?;

        Ok(count > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        cases::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count cases")
    }
}

/// Generate a human-readable case number (`CASE-#####`).
#[must_use]
pub fn generate_case_number() -> String {
    use rand::Rng;

    let n: u32 = rand::rng().random_range(10_000..100_000);
    format!("CASE-{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_number_shape() {
        let number = generate_case_number();
        assert!(number.starts_with("CASE-"));
        assert_eq!(number.len(), 10);
    }
}
