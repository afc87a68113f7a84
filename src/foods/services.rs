use std::sync::Arc;

use serde_json::Value;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::{FieldError, ServiceError};
use crate::foods::dto::{DeletedFoodResponse, FoodPayload};
use crate::foods::repo::FoodStore;
use crate::foods::repo_types::{Food, FoodId, FoodSummary, Micronutrient};
use crate::foods::validation::{validate_create, validate_id, validate_update};

const INVALID_ID: &str = "Invalid ID";
const VALIDATION_FAILED: &str = "Validation failed";
const FOOD_NOT_FOUND: &str = "Food not found";

/// Food use cases: validate the raw input, then touch the store.
///
/// Every operation runs to completion synchronously; the store's lock is
/// the only serialisation point.
#[derive(Debug, Clone, Default)]
pub struct FoodService {
    store: Arc<FoodStore>,
}

impl FoodService {
    pub fn new(store: Arc<FoodStore>) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub fn store(&self) -> &FoodStore {
        &self.store
    }

    pub fn list(&self) -> Vec<FoodSummary> {
        self.store.get_all().iter().map(FoodSummary::from).collect()
    }

    pub fn create(&self, body: &Value) -> Result<Food, ServiceError> {
        let payload = validate_create(body).map_err(|e| invalid(VALIDATION_FAILED, e))?;

        let id = self.store.next_id();
        let food = build_food(id, OffsetDateTime::now_utc(), payload, Vec::new(), Vec::new());
        let food = self.store.insert(food);

        info!(food_id = food.id, name = %food.name, total = self.store.count(), "food created");
        Ok(food)
    }

    pub fn get(&self, raw_id: &Value) -> Result<Food, ServiceError> {
        let id = parse_id(raw_id)?;
        self.store.get_by_id(id).ok_or_else(|| not_found(id))
    }

    /// Full replacement of everything except `id` and `registeredAt`.
    /// Omitted micronutrient lists keep their stored value.
    pub fn update(&self, raw_id: &Value, body: &Value) -> Result<Food, ServiceError> {
        let id = parse_id(raw_id)?;
        let payload = validate_update(body).map_err(|e| invalid(VALIDATION_FAILED, e))?;

        let updated = self
            .store
            .update_with(id, |existing| {
                build_food(
                    existing.id,
                    existing.registered_at,
                    payload,
                    existing.vitamins.clone(),
                    existing.minerals.clone(),
                )
            })
            .ok_or_else(|| not_found(id))?;

        info!(food_id = id, "food updated");
        Ok(updated)
    }

    pub fn delete(&self, raw_id: &Value) -> Result<DeletedFoodResponse, ServiceError> {
        let id = parse_id(raw_id)?;
        if !self.store.delete(id) {
            return Err(not_found(id));
        }

        info!(food_id = id, "food deleted");
        Ok(DeletedFoodResponse {
            message: "Food deleted successfully".into(),
        })
    }
}

fn parse_id(raw: &Value) -> Result<FoodId, ServiceError> {
    validate_id(raw).map_err(|e| invalid(INVALID_ID, e))
}

fn invalid(message: &str, details: Vec<FieldError>) -> ServiceError {
    warn!(
        reason = message,
        errors = details.len(),
        first = %details.first().map(ToString::to_string).unwrap_or_default(),
        "food input rejected"
    );
    ServiceError::validation(message, details)
}

fn not_found(id: FoodId) -> ServiceError {
    warn!(food_id = id, "food not found");
    ServiceError::not_found(FOOD_NOT_FOUND)
}

fn build_food(
    id: FoodId,
    registered_at: OffsetDateTime,
    p: FoodPayload,
    fallback_vitamins: Vec<Micronutrient>,
    fallback_minerals: Vec<Micronutrient>,
) -> Food {
    Food {
        id,
        name: p.name,
        description: p.description,
        serving_size: p.serving_size,
        unit: p.unit,
        calories: p.calories,
        carbohydrates: p.carbohydrates,
        protein: p.protein,
        total_fat: p.total_fat,
        saturated_fat: p.saturated_fat,
        trans_fat: p.trans_fat,
        fiber: p.fiber,
        sodium: p.sodium,
        sugars: p.sugars,
        vitamins: p.vitamins.unwrap_or(fallback_vitamins),
        minerals: p.minerals.unwrap_or(fallback_minerals),
        category: p.category,
        source: p.source,
        barcode: p.barcode,
        brand: p.brand,
        registered_at,
    }
}

#[cfg(test)]
mod service_tests {
    use super::*;
    use crate::foods::repo_types::{FoodCategory, ServingUnit};
    use serde_json::json;

    fn banana() -> Value {
        json!({
            "name": "Banana",
            "description": null,
            "servingSize": 100,
            "unit": "g",
            "calories": 89,
            "carbohydrates": 23,
            "protein": 1.1,
            "totalFat": 0.3,
            "saturatedFat": null,
            "transFat": null,
            "fiber": null,
            "sodium": null,
            "sugars": null,
            "category": "fruits",
            "source": null,
            "barcode": null,
            "brand": null
        })
    }

    fn whole_milk() -> Value {
        json!({
            "name": "Whole milk",
            "description": "Pasteurised",
            "servingSize": 200,
            "unit": "ml",
            "calories": 122,
            "carbohydrates": 9.6,
            "protein": 6.4,
            "totalFat": 6.6,
            "saturatedFat": 3.8,
            "transFat": 0.2,
            "fiber": 0,
            "sodium": 98,
            "sugars": 9.6,
            "vitamins": [{ "name": "D", "quantity": 2.4, "unit": "mcg" }],
            "minerals": [{ "name": "Calcium", "quantity": 240, "unit": "mg" }],
            "category": "dairy",
            "source": "Label",
            "barcode": "7891000100103",
            "brand": "Acme"
        })
    }

    fn assert_not_found<T: std::fmt::Debug>(r: Result<T, ServiceError>) {
        match r {
            Err(ServiceError::NotFound { message }) => assert_eq!(message, "Food not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn banana_scenario() {
        let svc = FoodService::default();

        let first = svc.create(&banana()).expect("create banana");
        assert_eq!(first.id, 1);
        assert_eq!(first.unit, ServingUnit::G);
        assert!(first.vitamins.is_empty());
        assert!(first.minerals.is_empty());

        let milk = svc.create(&whole_milk()).expect("create milk");
        assert_eq!(milk.id, 2);

        let list = svc.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Banana");
        assert_eq!(list[0].calories, 89.0);
        assert_eq!(list[0].category, FoodCategory::Fruits);
        assert_eq!(list[1].id, 2);

        svc.delete(&json!(1)).expect("delete banana");
        assert_not_found(svc.get(&json!(1)));
    }

    #[test]
    fn create_stamps_registration_time() {
        let svc = FoodService::default();
        let before = OffsetDateTime::now_utc();
        let food = svc.create(&banana()).unwrap();
        assert!(food.registered_at >= before);
        assert!(food.registered_at <= OffsetDateTime::now_utc());
    }

    #[test]
    fn ids_increase_monotonically() {
        let svc = FoodService::default();
        let mut last = 0;
        for _ in 0..5 {
            let id = svc.create(&banana()).unwrap().id;
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn get_returns_what_create_returned() {
        let svc = FoodService::default();
        let created = svc.create(&whole_milk()).unwrap();
        let fetched = svc.get(&json!(created.id.to_string())).unwrap();
        assert_eq!(created, fetched);
    }

    #[test]
    fn create_failure_carries_all_field_errors() {
        let svc = FoodService::default();
        let mut body = banana();
        body["name"] = json!("ab");
        body["servingSize"] = json!(-1);

        match svc.create(&body) {
            Err(ServiceError::Validation { message, details }) => {
                assert_eq!(message, "Validation failed");
                assert_eq!(details.len(), 2);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(svc.store().count(), 0);
    }

    #[test]
    fn rejected_create_does_not_consume_an_id() {
        let svc = FoodService::default();
        let mut bad = banana();
        bad["unit"] = json!("kg");
        assert!(svc.create(&bad).is_err());
        assert_eq!(svc.create(&banana()).unwrap().id, 1);
    }

    #[test]
    fn create_rejects_fat_invariant() {
        let svc = FoodService::default();
        let mut body = banana();
        body["totalFat"] = json!(5);
        body["saturatedFat"] = json!(10);
        let err = svc.create(&body).unwrap_err();
        assert_eq!(err.details()[0].field(), "saturatedFat");
    }

    #[test]
    fn get_with_malformed_id_is_validation_error() {
        let svc = FoodService::default();
        match svc.get(&json!("abc")) {
            Err(ServiceError::Validation { message, details }) => {
                assert_eq!(message, "Invalid ID");
                assert_eq!(details[0].field(), "id");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_not_found(svc.get(&json!(99)));
    }

    #[test]
    fn update_preserves_identity_and_registration() {
        let svc = FoodService::default();
        let original = svc.create(&banana()).unwrap();

        let updated = svc.update(&json!(original.id), &whole_milk()).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.registered_at, original.registered_at);
        assert_eq!(updated.name, "Whole milk");
        assert_eq!(updated.category, FoodCategory::Dairy);
        assert_eq!(svc.get(&json!(original.id)).unwrap(), updated);
    }

    #[test]
    fn update_without_lists_keeps_stored_lists() {
        let svc = FoodService::default();
        let milk = svc.create(&whole_milk()).unwrap();

        let mut body = whole_milk();
        body["name"] = json!("Semi-skimmed milk");
        body.as_object_mut().unwrap().remove("vitamins");
        body.as_object_mut().unwrap().remove("minerals");

        let updated = svc.update(&json!(milk.id), &body).unwrap();
        assert_eq!(updated.vitamins, milk.vitamins);
        assert_eq!(updated.minerals, milk.minerals);
        assert_eq!(updated.name, "Semi-skimmed milk");
    }

    #[test]
    fn update_with_empty_lists_clears_them() {
        let svc = FoodService::default();
        let milk = svc.create(&whole_milk()).unwrap();

        let mut body = whole_milk();
        body["vitamins"] = json!([]);
        body["minerals"] = json!([]);

        let updated = svc.update(&json!(milk.id), &body).unwrap();
        assert!(updated.vitamins.is_empty());
        assert!(updated.minerals.is_empty());
    }

    #[test]
    fn update_clears_omitted_nullable_fields() {
        let svc = FoodService::default();
        let milk = svc.create(&whole_milk()).unwrap();
        assert_eq!(milk.brand.as_deref(), Some("Acme"));

        let mut body = whole_milk();
        body.as_object_mut().unwrap().remove("brand");
        let updated = svc.update(&json!(milk.id), &body).unwrap();
        assert!(updated.brand.is_none());
    }

    #[test]
    fn update_checks_id_before_body() {
        let svc = FoodService::default();
        let err = svc.update(&json!("nope"), &json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid ID");
        assert_eq!(err.details().len(), 1);
    }

    #[test]
    fn update_checks_body_before_existence() {
        let svc = FoodService::default();
        let err = svc.update(&json!(42), &json!({ "name": "x" })).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_not_found(svc.update(&json!(42), &banana()));
    }

    #[test]
    fn update_enforces_invariants() {
        let svc = FoodService::default();
        let food = svc.create(&banana()).unwrap();
        let mut body = banana();
        body["sugars"] = json!(30);
        let err = svc.update(&json!(food.id), &body).unwrap_err();
        assert_eq!(err.details()[0].field(), "sugars");
        assert_eq!(svc.get(&json!(food.id)).unwrap().sugars, None);
    }

    #[test]
    fn delete_then_everything_is_not_found() {
        let svc = FoodService::default();
        let food = svc.create(&banana()).unwrap();

        let msg = svc.delete(&json!(food.id)).unwrap();
        assert_eq!(msg.message, "Food deleted successfully");
        assert!(!svc.store().exists(food.id));

        assert_not_found(svc.delete(&json!(food.id)));
        assert_not_found(svc.get(&json!(food.id)));
        assert_not_found(svc.update(&json!(food.id), &banana()));
    }

    #[test]
    fn racing_deletes_succeed_exactly_once() {
        use std::sync::{Arc, Barrier};

        for _ in 0..50 {
            let svc = FoodService::default();
            let id = svc.create(&banana()).unwrap().id;
            let barrier = Arc::new(Barrier::new(8));

            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let svc = svc.clone();
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        svc.delete(&json!(id)).is_ok()
                    })
                })
                .collect();

            let successes = handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count();
            assert_eq!(successes, 1);
            assert!(!svc.store().exists(id));
        }
    }

    #[test]
    fn racing_updates_never_lose_the_record() {
        use std::sync::{Arc, Barrier};

        let svc = FoodService::default();
        let milk = svc.create(&whole_milk()).unwrap();
        let id = milk.id;
        let barrier = Arc::new(Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let svc = svc.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let mut body = whole_milk();
                    body["name"] = json!(format!("Milk batch {i}"));
                    body.as_object_mut().unwrap().remove("vitamins");
                    barrier.wait();
                    svc.update(&json!(id), &body).unwrap()
                })
            })
            .collect();
        for h in handles {
            let updated = h.join().unwrap();
            assert_eq!(updated.id, milk.id);
            assert_eq!(updated.vitamins, milk.vitamins);
        }
        assert_eq!(svc.store().count(), 1);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let svc = FoodService::default();
        let first = svc.create(&banana()).unwrap();
        svc.delete(&json!(first.id)).unwrap();
        let second = svc.create(&banana()).unwrap();
        assert!(second.id > first.id);
    }
}
