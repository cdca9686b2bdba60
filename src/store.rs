//! Storage contracts. Handlers only see these traits; the Postgres
//! implementations live next to each feature's `repo.rs`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{auth::repo_types::User, categories::repo_types::Category, tasks::repo_types::Task};

#[cfg(test)]
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("duplicate {0}")]
    Duplicate(&'static str),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Credential store. `insert_user` must fail with `Duplicate` when the
/// email is already taken, atomically with respect to concurrent inserts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Removes the account together with the tasks it owns.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// `NotFound` when the owner no longer exists.
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError>;
    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    async fn find_tasks_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError>;
    /// Writes the mutable fields only; `owner_id` and `created_at` are never
    /// touched. Returns `NotFound` when the row no longer exists.
    async fn update_task(&self, task: &Task) -> Result<(), StoreError>;
    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError>;
    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError>;
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn update_category(&self, category: &Category) -> Result<(), StoreError>;
    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError>;
}
