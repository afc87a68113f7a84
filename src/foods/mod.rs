mod dto;
pub mod handlers;
mod repo;
mod repo_types;
mod rules;
mod services;
mod validation;

use crate::state::AppState;
use axum::Router;

pub use repo::FoodStore;
pub use services::FoodService;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::food_routes())
}
