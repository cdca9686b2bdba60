use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    categories::repo_types::Category,
    store::{CategoryStore, StoreError},
};

#[derive(Clone)]
pub struct PgCategoryStore {
    db: PgPool,
}

impl PgCategoryStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        sqlx::query(r#"INSERT INTO categories (id, name, created_at) VALUES ($1, $2, $3)"#)
            .bind(category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, created_at FROM categories WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query_as::<_, Category>(
            r#"SELECT id, name, created_at FROM categories ORDER BY name ASC"#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        let res = sqlx::query(r#"UPDATE categories SET name = $2 WHERE id = $1"#)
            .bind(category.id)
            .bind(&category.name)
            .execute(&self.db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM categories WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
