use crate::config::AppConfig;
use crate::foods::{FoodService, FoodStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub foods: FoodService,
}

impl AppState {
    /// The store lives for the whole process; nothing is persisted.
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(FoodStore::new());
        Self {
            config: Arc::new(config),
            foods: FoodService::new(store),
        }
    }

    pub fn fake() -> Self {
        Self::new(AppConfig::default())
    }
}
