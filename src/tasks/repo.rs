use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    store::{StoreError, TaskStore},
    tasks::repo_types::{Task, TaskRow},
};

#[derive(Clone)]
pub struct PgTaskStore {
    db: PgPool,
}

impl PgTaskStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (id, owner_id, title, description, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            // owner_id references a user that is gone
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(StoreError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Task::try_from).transpose()
    }

    async fn find_tasks_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, owner_id, title, description, status, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Task::try_from).collect()
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(task.updated_at)
        .execute(&self.db)
        .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM tasks WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }
}
