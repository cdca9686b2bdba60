//! Category CRUD. Categories are a shared namespace: no token, no owner.

use axum::{extract::State, routing::get, Router};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{dto::CategoryRequest, repo_types::Category};
use crate::{
    error::AppError,
    extract::{ApiJson, ApiPath},
    response::{self, ApiResult},
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

fn required_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::malformed("name is required"));
    }
    Ok(name.to_string())
}

async fn load(state: &AppState, id: Uuid) -> Result<Category, AppError> {
    state
        .categories
        .find_category_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Category not found"))
}

#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let rows = state.categories.list_categories().await?;
    response::ok(rows)
}

#[instrument(skip(state, body))]
pub async fn create_category(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> ApiResult<Category> {
    let category = Category::new(required_name(&body.name)?);
    state.categories.insert_category(&category).await?;
    info!(category_id = %category.id, "category created");
    response::created(category)
}

#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Category> {
    response::ok(load(&state, id).await?)
}

#[instrument(skip(state, body))]
pub async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<CategoryRequest>,
) -> ApiResult<Category> {
    let name = required_name(&body.name)?;
    let mut category = load(&state, id).await?;
    category.name = name;
    state.categories.update_category(&category).await?;
    response::updated(category, "Category updated successfully")
}

#[instrument(skip(state))]
pub async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<()> {
    let category = load(&state, id).await?;
    state.categories.delete_category(category.id).await?;
    info!(category_id = %id, "category deleted");
    response::message("Category deleted successfully")
}
