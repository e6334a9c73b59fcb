use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::OffsetDateTime;

use super::Store;
use crate::{
    auth::repo_types::{NewUser, User},
    categories::repo_types::Category,
    config::DatabaseConfig,
    tasks::repo_types::{NewTask, Task, TaskStatus},
};

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(config.connect_options()?)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, first_name, last_name, account_created
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> anyhow::Result<u64> {
        let done = sqlx::query(
            r#"
            INSERT INTO users (username, password, first_name, last_name, account_created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.account_created)
        .execute(&self.db)
        .await
        .context("insert user")?;
        Ok(done.rows_affected())
    }

    async fn users_by_id(&self, user_id: i32) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, first_name, last_name, account_created
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("select user by id")?;
        Ok(rows)
    }

    async fn insert_category(&self, user_id: i32, category: &str) -> anyhow::Result<u64> {
        let done = sqlx::query(r#"INSERT INTO categories (user_id, category) VALUES ($1, $2)"#)
            .bind(user_id)
            .bind(category)
            .execute(&self.db)
            .await
            .context("insert category")?;
        Ok(done.rows_affected())
    }

    async fn list_categories(&self, user_id: i32) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, user_id, category
            FROM categories
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list categories")?;
        Ok(rows)
    }

    async fn delete_category(&self, id: i32, owner: Option<i32>) -> anyhow::Result<u64> {
        let done = sqlx::query(
            r#"
            DELETE FROM categories
            WHERE id = $1 AND ($2::int IS NULL OR user_id = $2)
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("delete category")?;
        Ok(done.rows_affected())
    }

    async fn insert_task(&self, user_id: i32, task: NewTask) -> anyhow::Result<u64> {
        let done = sqlx::query(
            r#"
            INSERT INTO tasks (user_id, category_id, task, status, due)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(task.category_id)
        .bind(&task.task)
        .bind(TaskStatus::Pending.as_str())
        .bind(task.due)
        .execute(&self.db)
        .await
        .context("insert task")?;
        Ok(done.rows_affected())
    }

    async fn list_tasks(&self, user_id: i32) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, category_id, task, status, due
            FROM tasks
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list tasks")?;
        Ok(rows)
    }

    async fn set_task_status(
        &self,
        id: i32,
        status: TaskStatus,
        owner: Option<i32>,
    ) -> anyhow::Result<u64> {
        let done = sqlx::query(
            r#"
            UPDATE tasks SET status = $2
            WHERE id = $1 AND ($3::int IS NULL OR user_id = $3)
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(owner)
        .execute(&self.db)
        .await
        .with_context(|| format!("set task status {status}"))?;
        Ok(done.rows_affected())
    }

    async fn edit_task(
        &self,
        id: i32,
        task: &str,
        due: Option<OffsetDateTime>,
        owner: Option<i32>,
    ) -> anyhow::Result<u64> {
        let done = sqlx::query(
            r#"
            UPDATE tasks SET task = $2, due = $3
            WHERE id = $1 AND ($4::int IS NULL OR user_id = $4)
            "#,
        )
        .bind(id)
        .bind(task)
        .bind(due)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("edit task")?;
        Ok(done.rows_affected())
    }

    async fn delete_task(&self, id: i32, owner: Option<i32>) -> anyhow::Result<u64> {
        let done = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND ($2::int IS NULL OR user_id = $2)
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("delete task")?;
        Ok(done.rows_affected())
    }
}
