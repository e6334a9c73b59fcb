use axum::{
    extract::State,
    routing::{delete, post},
    Router,
};
use tracing::{info, instrument, warn};

use super::dto::{AddCategoryRequest, Categories, DeleteCategoryRequest};
use crate::{
    auth::gate::AuthUser,
    error::ApiError,
    response::{ApiResult, Envelope, Payload},
    state::AppState,
    validation::required,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/add-category", post(add_category))
        .route("/get-categories", post(get_categories))
        .route("/delete-category", delete(delete_category))
}

async fn reread(state: &AppState, user_id: i32) -> ApiResult<Categories> {
    let categories = state.store.list_categories(user_id).await?;
    Ok(Envelope::ok(Categories { categories }))
}

#[instrument(skip(state, payload))]
pub async fn add_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<AddCategoryRequest>,
) -> ApiResult<Categories> {
    let category = required(payload.category)?;
    if state.store.insert_category(user_id, &category).await? == 0 {
        warn!(user_id, "category insert touched no rows");
        return Err(ApiError::Rejected("Unable to add a category"));
    }
    info!(user_id, "category added");
    reread(&state, user_id).await
}

#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Categories> {
    reread(&state, user_id).await
}

#[instrument(skip(state, payload))]
pub async fn delete_category(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Payload(payload): Payload<DeleteCategoryRequest>,
) -> ApiResult<Categories> {
    let id = payload.id.required()?;
    let owner = state.mutation_owner(user_id);
    if state.store.delete_category(id, owner).await? == 0 {
        warn!(user_id, id, "category delete touched no rows");
        return Err(ApiError::Rejected("Unable to delete the category"));
    }
    info!(user_id, id, "category deleted");
    reread(&state, user_id).await
}
