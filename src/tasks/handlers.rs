use axum::{
    extract::State,
    routing::{delete, post},
    Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AddTaskRequest, EditTaskRequest, TaskIdRequest, Tasks},
    repo_types::{NewTask, TaskStatus},
};
use crate::{
    auth::gate::AuthUser,
    error::ApiError,
    response::{ApiResult, Envelope, Payload},
    state::AppState,
    validation::{parse_due, required},
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/add-task", post(add_task))
        .route("/get-tasks", post(get_tasks))
        .route("/complete-task", post(complete_task))
        .route("/undo-task", post(undo_task))
        .route("/edit-task", post(edit_task))
        .route("/delete-task", delete(delete_task))
}

/// Mutation outcome check shared by every writer: zero rows is a failure,
/// otherwise the caller's whole list is read back.
async fn after_mutation(
    state: &AppState,
    user_id: i32,
    touched: u64,
    failure: &'static str,
) -> ApiResult<Tasks> {
    if touched == 0 {
        warn!(user_id, failure, "task mutation touched no rows");
        return Err(ApiError::Rejected(failure));
    }
    info!(user_id, touched, "task mutation applied");
    let tasks = state.store.list_tasks(user_id).await?;
    Ok(Envelope::ok(Tasks { tasks }))
}

#[instrument(skip(state, payload))]
pub async fn add_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<AddTaskRequest>,
) -> ApiResult<Tasks> {
    let task = required(payload.task)?;
    let category_id = payload.category_id.optional()?;
    let due = parse_due(payload.due)?;
    let touched = state
        .store
        .insert_task(
            user_id,
            NewTask {
                category_id,
                task,
                due,
            },
        )
        .await?;
    after_mutation(&state, user_id, touched, "Unable to add the task").await
}

#[instrument(skip(state))]
pub async fn get_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Tasks> {
    let tasks = state.store.list_tasks(user_id).await?;
    Ok(Envelope::ok(Tasks { tasks }))
}

#[instrument(skip(state, payload))]
pub async fn complete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<TaskIdRequest>,
) -> ApiResult<Tasks> {
    set_status(&state, user_id, payload, TaskStatus::Finished).await
}

#[instrument(skip(state, payload))]
pub async fn undo_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<TaskIdRequest>,
) -> ApiResult<Tasks> {
    set_status(&state, user_id, payload, TaskStatus::Pending).await
}

async fn set_status(
    state: &AppState,
    user_id: i32,
    payload: TaskIdRequest,
    status: TaskStatus,
) -> ApiResult<Tasks> {
    let id = payload.id.required()?;
    let touched = state
        .store
        .set_task_status(id, status, state.mutation_owner(user_id))
        .await?;
    after_mutation(state, user_id, touched, "Unable to update the task").await
}

#[instrument(skip(state, payload))]
pub async fn edit_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<EditTaskRequest>,
) -> ApiResult<Tasks> {
    let id = payload.id.required()?;
    let task = required(payload.task)?;
    let due = parse_due(payload.due)?;
    let touched = state
        .store
        .edit_task(id, &task, due, state.mutation_owner(user_id))
        .await?;
    after_mutation(&state, user_id, touched, "Unable to edit the task").await
}

#[instrument(skip(state, payload))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<TaskIdRequest>,
) -> ApiResult<Tasks> {
    let id = payload.id.required()?;
    let touched = state
        .store
        .delete_task(id, state.mutation_owner(user_id))
        .await?;
    after_mutation(&state, user_id, touched, "Unable to delete the task").await
}
