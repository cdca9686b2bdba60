use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest},
        extractors::AuthUser,
        services,
    },
    extract::{ApiJson, ApiPath},
    response::{self, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/users/:id", get(get_user).delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<PublicUser> {
    let user = services::register(&state, payload).await?;
    response::created(user)
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let res = services::login(&state, payload).await?;
    response::ok(res)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<PublicUser> {
    let user = services::load_own_account(&state, user_id, user_id).await?;
    response::ok(user.into())
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<PublicUser> {
    let user = services::load_own_account(&state, id, user_id).await?;
    response::ok(user.into())
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    services::delete_account(&state, id, user_id).await?;
    response::message("User deleted successfully")
}
