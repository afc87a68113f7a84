use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::instrument;

use crate::{error::AppError, state::AppState};

use super::dto::{ApiResponse, DeletedFoodResponse};
use super::repo_types::{Food, FoodSummary};
use super::rules::{food_rules, FoodRules};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(create_food))
        .route("/foods/rules", get(get_rules))
        .route(
            "/foods/:id",
            get(get_food).put(update_food).delete(delete_food),
        )
}

#[instrument(skip(state))]
pub async fn list_foods(State(state): State<AppState>) -> Json<ApiResponse<Vec<FoodSummary>>> {
    Json(ApiResponse::ok(state.foods.list()))
}

/// POST /foods, answers 201 with a Location header.
#[instrument(skip(state, body))]
pub async fn create_food(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<Food>>), AppError> {
    let Json(body) = body?;
    let food = state.foods.create(&body)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        format!("/api/v1/foods/{}", food.id)
            .parse::<HeaderValue>()
            .context("build Location header")?,
    );

    Ok((StatusCode::CREATED, headers, Json(ApiResponse::ok(food))))
}

#[instrument(skip(state))]
pub async fn get_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Food>>, AppError> {
    let food = state.foods.get(&Value::String(id))?;
    Ok(Json(ApiResponse::ok(food)))
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<Food>>, AppError> {
    let Json(body) = body?;
    let food = state.foods.update(&Value::String(id), &body)?;
    Ok(Json(ApiResponse::ok(food)))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedFoodResponse>>, AppError> {
    let deleted = state.foods.delete(&Value::String(id))?;
    Ok(Json(ApiResponse::ok(deleted)))
}

/// Limits and enumerations, for clients that validate before submitting.
pub async fn get_rules() -> Json<ApiResponse<FoodRules>> {
    Json(ApiResponse::ok(food_rules()))
}
