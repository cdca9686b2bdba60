//! In-process store used by tests; mirrors the Postgres semantics
//! (unique email, cascade on user delete, owner-scoped listing).

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::{CategoryStore, StoreError, TaskStore, UserStore};
use crate::{auth::repo_types::User, categories::repo_types::Category, tasks::repo_types::Task};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
    categories: HashMap<Uuid, Category>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        let mut tables = self.tables.lock().expect("memory store lock poisoned");
        f(&mut tables)
    }

    pub fn user_count(&self) -> usize {
        self.with(|t| t.users.len())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.with(|t| {
            if t.users.values().any(|u| u.email == user.email) {
                return Err(StoreError::Duplicate("email"));
            }
            t.users.insert(user.id, user.clone());
            Ok(())
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.with(|t| t.users.values().find(|u| u.email == email).cloned()))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.with(|t| t.users.get(&id).cloned()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        self.with(|t| {
            t.users.remove(&id);
            t.tasks.retain(|_, task| task.owner_id != id);
        });
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.with(|t| {
            // stands in for the owner_id foreign key
            if !t.users.contains_key(&task.owner_id) {
                return Err(StoreError::NotFound);
            }
            t.tasks.insert(task.id, task.clone());
            Ok(())
        })
    }

    async fn find_task_by_id(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.with(|t| t.tasks.get(&id).cloned()))
    }

    async fn find_tasks_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self.with(|t| {
            t.tasks
                .values()
                .filter(|task| task.owner_id == owner_id)
                .cloned()
                .collect()
        });
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<(), StoreError> {
        self.with(|t| {
            let stored = t.tasks.get_mut(&task.id).ok_or(StoreError::NotFound)?;
            stored.title = task.title.clone();
            stored.description = task.description.clone();
            stored.status = task.status;
            stored.updated_at = task.updated_at;
            Ok(())
        })
    }

    async fn delete_task(&self, id: Uuid) -> Result<(), StoreError> {
        self.with(|t| t.tasks.remove(&id));
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        self.with(|t| t.categories.insert(category.id, category.clone()));
        Ok(())
    }

    async fn find_category_by_id(&self, id: Uuid) -> Result<Option<Category>, StoreError> {
        Ok(self.with(|t| t.categories.get(&id).cloned()))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut rows: Vec<Category> = self.with(|t| t.categories.values().cloned().collect());
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        self.with(|t| {
            let stored = t
                .categories
                .get_mut(&category.id)
                .ok_or(StoreError::NotFound)?;
            stored.name = category.name.clone();
            Ok(())
        })
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        self.with(|t| t.categories.remove(&id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repo_types::TaskStatus;

    fn user(email: &str) -> User {
        User::new("someone".into(), email.into(), "$argon2id$stub".into())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@example.com")).await.unwrap();
        let err = store.insert_user(&user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn deleting_user_removes_their_tasks() {
        let store = MemoryStore::new();
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");
        store.insert_user(&alice).await.unwrap();
        store.insert_user(&bob).await.unwrap();
        let a = Task::new(alice.id, "a".into(), String::new(), TaskStatus::Pending);
        let b = Task::new(bob.id, "b".into(), String::new(), TaskStatus::Pending);
        store.insert_task(&a).await.unwrap();
        store.insert_task(&b).await.unwrap();

        store.delete_user(alice.id).await.unwrap();

        assert!(store.find_task_by_id(a.id).await.unwrap().is_none());
        assert!(store.find_task_by_id(b.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn task_needs_an_existing_owner() {
        let store = MemoryStore::new();
        let ghost = Task::new(Uuid::new_v4(), "t".into(), String::new(), TaskStatus::Pending);
        let err = store.insert_task(&ghost).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        assert!(store.find_task_by_id(ghost.id).await.unwrap().is_none());

        let alice = user("alice@example.com");
        store.insert_user(&alice).await.unwrap();
        store.delete_user(alice.id).await.unwrap();
        let late = Task::new(alice.id, "t".into(), String::new(), TaskStatus::Pending);
        assert!(matches!(
            store.insert_task(&late).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_of_missing_task_is_not_found() {
        let store = MemoryStore::new();
        let task = Task::new(Uuid::new_v4(), "gone".into(), String::new(), TaskStatus::Pending);
        let err = store.update_task(&task).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }
}
