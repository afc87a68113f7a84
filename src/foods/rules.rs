//! The one definition of what makes a food record admissible.
//!
//! The validator reads its limits from here and the `/foods/rules` route
//! publishes the same values, so clients never keep a private copy.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::repo_types::{FoodCategory, ServingUnit};

pub const NAME_MIN_LEN: usize = 3;
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;
pub const SOURCE_MAX_LEN: usize = 200;
pub const BARCODE_MAX_LEN: usize = 50;
pub const BRAND_MAX_LEN: usize = 100;

pub const BARCODE_PATTERN: &str = r"^[0-9]*$";

pub const MICRONUTRIENT_NAME_MAX_LEN: usize = 100;
pub const MICRONUTRIENT_UNIT_MAX_LEN: usize = 20;

pub(crate) fn is_digits_only(barcode: &str) -> bool {
    lazy_static! {
        static ref BARCODE_RE: Regex = Regex::new(BARCODE_PATTERN).unwrap();
    }
    BARCODE_RE.is_match(barcode)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LengthRule {
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRules {
    pub name: LengthRule,
    pub description: LengthRule,
    pub source: LengthRule,
    pub barcode: LengthRule,
    pub barcode_pattern: &'static str,
    pub brand: LengthRule,
    pub micronutrient_name: LengthRule,
    pub micronutrient_unit: LengthRule,
    pub units: Vec<ServingUnit>,
    pub categories: Vec<FoodCategory>,
}

/// Snapshot of every limit and enumeration, in wire form.
pub fn food_rules() -> FoodRules {
    FoodRules {
        name: LengthRule {
            min: NAME_MIN_LEN,
            max: NAME_MAX_LEN,
        },
        description: LengthRule {
            min: 0,
            max: DESCRIPTION_MAX_LEN,
        },
        source: LengthRule {
            min: 0,
            max: SOURCE_MAX_LEN,
        },
        barcode: LengthRule {
            min: 0,
            max: BARCODE_MAX_LEN,
        },
        barcode_pattern: BARCODE_PATTERN,
        brand: LengthRule {
            min: 0,
            max: BRAND_MAX_LEN,
        },
        micronutrient_name: LengthRule {
            min: 1,
            max: MICRONUTRIENT_NAME_MAX_LEN,
        },
        micronutrient_unit: LengthRule {
            min: 1,
            max: MICRONUTRIENT_UNIT_MAX_LEN,
        },
        units: ServingUnit::ALL.to_vec(),
        categories: FoodCategory::ALL.to_vec(),
    }
}
