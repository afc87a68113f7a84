use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type FoodId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServingUnit {
    G,
    Ml,
    Unit,
}

impl ServingUnit {
    pub const ALL: [ServingUnit; 3] = [ServingUnit::G, ServingUnit::Ml, ServingUnit::Unit];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServingUnit::G => "g",
            ServingUnit::Ml => "ml",
            ServingUnit::Unit => "unit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    Fruits,
    Vegetables,
    Meats,
    Dairy,
    Grains,
    Beverages,
    Processed,
    Other,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 8] = [
        FoodCategory::Fruits,
        FoodCategory::Vegetables,
        FoodCategory::Meats,
        FoodCategory::Dairy,
        FoodCategory::Grains,
        FoodCategory::Beverages,
        FoodCategory::Processed,
        FoodCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::Fruits => "fruits",
            FoodCategory::Vegetables => "vegetables",
            FoodCategory::Meats => "meats",
            FoodCategory::Dairy => "dairy",
            FoodCategory::Grains => "grains",
            FoodCategory::Beverages => "beverages",
            FoodCategory::Processed => "processed",
            FoodCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// A vitamin or mineral entry. Owned by the food that lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Micronutrient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    pub id: FoodId,
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
    pub vitamins: Vec<Micronutrient>,
    pub minerals: Vec<Micronutrient>,
    pub category: FoodCategory,
    pub source: Option<String>,
    pub barcode: Option<String>,
    pub brand: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
}

/// Condensed view returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSummary {
    pub id: FoodId,
    pub name: String,
    pub calories: f64,
    pub category: FoodCategory,
    #[serde(with = "time::serde::rfc3339")]
    pub registered_at: OffsetDateTime,
}

impl From<&Food> for FoodSummary {
    fn from(f: &Food) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
            calories: f.calories,
            category: f.category,
            registered_at: f.registered_at,
        }
    }
}
