use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::Store;
use crate::{
    auth::repo_types::{NewUser, User},
    categories::repo_types::Category,
    tasks::repo_types::{NewTask, Task, TaskStatus},
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<Category>,
    tasks: Vec<Task>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Volatile store with serial ids, shared by all three tables.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_by(row_owner: i32, owner: Option<i32>) -> bool {
    owner.map_or(true, |o| o == row_owner)
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.users.push(User {
            id,
            username: user.username,
            password: user.password,
            first_name: user.first_name,
            last_name: user.last_name,
            account_created: user.account_created,
        });
        Ok(1)
    }

    async fn users_by_id(&self, user_id: i32) -> anyhow::Result<Vec<User>> {
        let t = self.tables.read().await;
        Ok(t.users.iter().filter(|u| u.id == user_id).cloned().collect())
    }

    async fn insert_category(&self, user_id: i32, category: &str) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.categories.push(Category {
            id,
            user_id,
            category: category.to_string(),
        });
        Ok(1)
    }

    async fn list_categories(&self, user_id: i32) -> anyhow::Result<Vec<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_category(&self, id: i32, owner: Option<i32>) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let before = t.categories.len();
        t.categories
            .retain(|c| !(c.id == id && owned_by(c.user_id, owner)));
        let removed = (before - t.categories.len()) as u64;
        // Mirrors `ON DELETE SET NULL` on tasks.category_id.
        if removed > 0 {
            for task in t.tasks.iter_mut().filter(|task| task.category_id == Some(id)) {
                task.category_id = None;
            }
        }
        Ok(removed)
    }

    async fn insert_task(&self, user_id: i32, task: NewTask) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let id = t.next_id();
        t.tasks.push(Task {
            id,
            user_id,
            category_id: task.category_id,
            task: task.task,
            status: TaskStatus::Pending,
            due: task.due,
        });
        Ok(1)
    }

    async fn list_tasks(&self, user_id: i32) -> anyhow::Result<Vec<Task>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Task> = t
            .tasks
            .iter()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|task| task.id);
        Ok(rows)
    }

    async fn set_task_status(
        &self,
        id: i32,
        status: TaskStatus,
        owner: Option<i32>,
    ) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let mut touched = 0;
        for task in t
            .tasks
            .iter_mut()
            .filter(|task| task.id == id && owned_by(task.user_id, owner))
        {
            task.status = status;
            touched += 1;
        }
        Ok(touched)
    }

    async fn edit_task(
        &self,
        id: i32,
        text: &str,
        due: Option<OffsetDateTime>,
        owner: Option<i32>,
    ) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let mut touched = 0;
        for task in t
            .tasks
            .iter_mut()
            .filter(|task| task.id == id && owned_by(task.user_id, owner))
        {
            task.task = text.to_string();
            task.due = due;
            touched += 1;
        }
        Ok(touched)
    }

    async fn delete_task(&self, id: i32, owner: Option<i32>) -> anyhow::Result<u64> {
        let mut t = self.tables.write().await;
        let before = t.tasks.len();
        t.tasks
            .retain(|task| !(task.id == id && owned_by(task.user_id, owner)));
        Ok((before - t.tasks.len()) as u64)
    }
}
