//! # Tag Repository
//!
//! Database operations for catalog tags.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use market_core::Tag;

/// Repository for tag database operations.
#[derive(Debug, Clone)]
pub struct TagRepository {
    pool: SqlitePool,
}

impl TagRepository {
    /// Creates a new TagRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TagRepository { pool }
    }

    /// Lists all tags ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(tags)
    }

    /// Gets a tag by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    /// Creates a new tag.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - tag name already exists
    pub async fn create(&self, name: &str) -> DbResult<Tag> {
        debug!(name = %name, "Creating tag");

        let result = sqlx::query("INSERT INTO tags (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Deletes a tag. Products keep existing; only the link rows go away
    /// (ON DELETE CASCADE on product_tags).
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Deleting tag");

        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Tag", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_tag_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tags = db.tags();

        let fruit = tags.create("fruit").await.unwrap();
        tags.create("snack").await.unwrap();

        let all = tags.list().await.unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by name
        assert_eq!(all[0].name, "fruit");
        assert_eq!(all[1].name, "snack");

        let fetched = tags.get_by_id(fruit.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "fruit");

        // Duplicate name hits the UNIQUE constraint
        assert!(tags.create("fruit").await.unwrap_err().is_unique_violation());

        tags.delete(fruit.id).await.unwrap();
        assert!(tags.get_by_id(fruit.id).await.unwrap().is_none());
        assert!(tags.delete(fruit.id).await.is_err());
    }
}
