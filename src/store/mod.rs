//! Datastore seam. Handlers only talk to [`Store`]; the relational engine sits
//! behind [`PgStore`], and [`MemoryStore`] keeps everything in process.

use async_trait::async_trait;

use crate::{
    auth::repo_types::{NewUser, User},
    categories::repo_types::Category,
    tasks::repo_types::{NewTask, Task, TaskStatus},
};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Every mutation returns the number of rows it touched. `owner` narrows a
/// record mutation to the given user; `None` matches on record id alone.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn insert_user(&self, user: NewUser) -> anyhow::Result<u64>;
    async fn users_by_id(&self, user_id: i32) -> anyhow::Result<Vec<User>>;

    async fn insert_category(&self, user_id: i32, category: &str) -> anyhow::Result<u64>;
    async fn list_categories(&self, user_id: i32) -> anyhow::Result<Vec<Category>>;
    async fn delete_category(&self, id: i32, owner: Option<i32>) -> anyhow::Result<u64>;

    async fn insert_task(&self, user_id: i32, task: NewTask) -> anyhow::Result<u64>;
    async fn list_tasks(&self, user_id: i32) -> anyhow::Result<Vec<Task>>;
    async fn set_task_status(
        &self,
        id: i32,
        status: TaskStatus,
        owner: Option<i32>,
    ) -> anyhow::Result<u64>;
    async fn edit_task(
        &self,
        id: i32,
        task: &str,
        due: Option<time::OffsetDateTime>,
        owner: Option<i32>,
    ) -> anyhow::Result<u64>;
    async fn delete_task(&self, id: i32, owner: Option<i32>) -> anyhow::Result<u64>;
}
