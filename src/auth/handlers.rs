use axum::{extract::State, routing::post, Router};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use super::{
    dto::{LoginRequest, RegisterRequest, TokenData, UserInfo},
    gate::AuthUser,
    password::{hash_password, verify_password},
    repo_types::NewUser,
};
use crate::{
    error::ApiError,
    response::{ApiResult, Envelope, NoData, Payload},
    state::AppState,
    validation::required,
};

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register-user", post(register))
        .route("/user-login", post(login))
}

/// Routes mounted behind the auth gate.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/authorize-user-to-proceed", post(authorize))
        .route("/logout", post(logout))
        .route("/get-user-info", post(get_user_info))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Payload(payload): Payload<RegisterRequest>,
) -> ApiResult<NoData> {
    let username = required(payload.username)?;
    let password = required(payload.password)?;
    let first_name = required(payload.first_name)?;
    let last_name = required(payload.last_name)?;

    // Check-then-insert: two concurrent registrations can both pass this check.
    if state.store.find_user_by_username(&username).await?.is_some() {
        warn!(%username, "username already exists");
        return Err(ApiError::Rejected("The username already exists"));
    }

    let hash = hash_password(&password)?;
    let inserted = state
        .store
        .insert_user(NewUser {
            username: username.clone(),
            password: hash,
            first_name,
            last_name,
            account_created: OffsetDateTime::now_utc(),
        })
        .await?;
    if inserted == 0 {
        return Err(ApiError::Rejected("Error occured while registering the user"));
    }

    info!(%username, "user registered");
    Ok(Envelope::message("User has been registered successfully"))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Payload(payload): Payload<LoginRequest>,
) -> ApiResult<TokenData> {
    let username = required(payload.username)?;
    let password = required(payload.password)?;

    let Some(user) = state.store.find_user_by_username(&username).await? else {
        warn!(%username, "login unknown username");
        return Err(ApiError::Rejected("No such username"));
    };

    if !verify_password(&password, &user.password)? {
        warn!(%username, user_id = user.id, "login wrong password");
        return Err(ApiError::Rejected("Wrong password"));
    }

    let token = state.keys.sign(user.id)?;
    info!(user_id = user.id, "user logged in");
    let mut body = Envelope::ok(TokenData { token });
    body.msg = Some("User Found");
    Ok(body)
}

#[instrument]
pub async fn authorize(AuthUser(user_id): AuthUser) -> ApiResult<NoData> {
    debug!(user_id, "token accepted");
    Ok(Envelope::message("User authorized"))
}

/// Tokens are not tracked server-side; the client forgets its token.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> ApiResult<NoData> {
    info!(user_id, "user logged out");
    Ok(Envelope::message("Logged out successfully"))
}

#[instrument(skip(state))]
pub async fn get_user_info(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<UserInfo> {
    let users = state.store.users_by_id(user_id).await?;
    if users.len() != 1 {
        return Err(ApiError::Internal(anyhow::anyhow!(
            "expected one user row for id {user_id}, found {}",
            users.len()
        )));
    }
    Ok(Envelope::ok(UserInfo { user_info: users }))
}
