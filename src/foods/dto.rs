use serde::Serialize;

use crate::foods::repo_types::{FoodCategory, Micronutrient, ServingUnit};

/// A create/update body that passed every rule.
///
/// `vitamins`/`minerals` stay `None` when the body omitted them so the
/// service can tell "absent" from "explicitly empty".
#[derive(Debug, Clone, PartialEq)]
pub struct FoodPayload {
    pub name: String,
    pub description: Option<String>,
    pub serving_size: f64,
    pub unit: ServingUnit,
    pub calories: f64,
    pub carbohydrates: f64,
    pub protein: f64,
    pub total_fat: f64,
    pub saturated_fat: Option<f64>,
    pub trans_fat: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub sugars: Option<f64>,
    pub vitamins: Option<Vec<Micronutrient>>,
    pub minerals: Option<Vec<Micronutrient>>,
    pub category: FoodCategory,
    pub source: Option<String>,
    pub barcode: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedFoodResponse {
    pub message: String,
}
