//! Rule checks for untrusted food input.
//!
//! Every function here is pure: it looks at a JSON value and either returns a
//! typed payload or the full list of violated constraints. Structural checks
//! run first; the nutrient invariants are only evaluated once the shape is
//! known to be sound.

use serde_json::{Map, Value};

use crate::error::{FieldError, PathSegment};
use crate::foods::dto::FoodPayload;
use crate::foods::repo_types::{FoodCategory, FoodId, Micronutrient, ServingUnit};
use crate::foods::rules;

/// Largest id that survives a round trip through an IEEE double.
const MAX_SAFE_ID: f64 = 9_007_199_254_740_991.0;

pub type Validated<T> = Result<T, Vec<FieldError>>;

/// Coerces a path/query id into a positive integer.
pub fn validate_id(raw: &Value) -> Validated<FoodId> {
    let fail = |message: String| Err(vec![FieldError::new(vec!["id".into()], message)]);

    let n = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => coerce_number(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    };
    let Some(n) = n else {
        return fail("Expected number, received nan".into());
    };

    if n.fract() != 0.0 {
        return fail("Expected integer, received float".into());
    }
    if n <= 0.0 {
        return fail("Number must be greater than 0".into());
    }
    if n > MAX_SAFE_ID {
        return fail(format!(
            "Number must be less than or equal to {}",
            MAX_SAFE_ID as u64
        ));
    }
    Ok(n as FoodId)
}

pub fn validate_create(raw: &Value) -> Validated<FoodPayload> {
    validate_payload(raw)
}

/// Updates take the complete payload; there is no partial form.
pub fn validate_update(raw: &Value) -> Validated<FoodPayload> {
    validate_payload(raw)
}

fn validate_payload(raw: &Value) -> Validated<FoodPayload> {
    let Value::Object(obj) = raw else {
        return Err(vec![FieldError::new(
            Vec::new(),
            format!("Expected object, received {}", type_name(raw)),
        )]);
    };

    let mut c = Checker::new(obj, Vec::new());

    let name = c.required_string("name", rules::NAME_MIN_LEN, rules::NAME_MAX_LEN);
    let description = c.nullable_string("description", rules::DESCRIPTION_MAX_LEN);
    let serving_size = c.required_number("servingSize", NumberRule::Positive);
    let unit = c.required_enum("unit", ServingUnit::parse, &ServingUnit::ALL.map(|u| u.as_str()));
    let calories = c.required_number("calories", NumberRule::NonNegative);
    let carbohydrates = c.required_number("carbohydrates", NumberRule::NonNegative);
    let protein = c.required_number("protein", NumberRule::NonNegative);
    let total_fat = c.required_number("totalFat", NumberRule::NonNegative);
    let saturated_fat = c.nullable_number("saturatedFat");
    let trans_fat = c.nullable_number("transFat");
    let fiber = c.nullable_number("fiber");
    let sodium = c.nullable_number("sodium");
    let sugars = c.nullable_number("sugars");
    let vitamins = c.micronutrients("vitamins");
    let minerals = c.micronutrients("minerals");
    let category = c.required_enum(
        "category",
        FoodCategory::parse,
        &FoodCategory::ALL.map(|cat| cat.as_str()),
    );
    let source = c.nullable_string("source", rules::SOURCE_MAX_LEN);
    let barcode = c.barcode("barcode");
    let brand = c.nullable_string("brand", rules::BRAND_MAX_LEN);

    let (
        Some(name),
        Some(description),
        Some(serving_size),
        Some(unit),
        Some(calories),
        Some(carbohydrates),
        Some(protein),
        Some(total_fat),
        Some(saturated_fat),
        Some(trans_fat),
        Some(fiber),
        Some(sodium),
        Some(sugars),
        Some(vitamins),
        Some(minerals),
        Some(category),
        Some(source),
        Some(barcode),
        Some(brand),
    ) = (
        name,
        description,
        serving_size,
        unit,
        calories,
        carbohydrates,
        protein,
        total_fat,
        saturated_fat,
        trans_fat,
        fiber,
        sodium,
        sugars,
        vitamins,
        minerals,
        category,
        source,
        barcode,
        brand,
    )
    else {
        return Err(c.errors);
    };

    let payload = FoodPayload {
        name,
        description,
        serving_size,
        unit,
        calories,
        carbohydrates,
        protein,
        total_fat,
        saturated_fat,
        trans_fat,
        fiber,
        sodium,
        sugars,
        vitamins,
        minerals,
        category,
        source,
        barcode,
        brand,
    };

    let violations = check_nutrient_invariants(&payload);
    if violations.is_empty() {
        Ok(payload)
    } else {
        Err(violations)
    }
}

/// Parts of a nutrient can never exceed the whole they belong to.
/// Violations are reported against the dependent field.
fn check_nutrient_invariants(p: &FoodPayload) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if matches!(p.saturated_fat, Some(v) if v > p.total_fat) {
        errors.push(FieldError::new(
            vec!["saturatedFat".into()],
            "Saturated fats cannot exceed total fats",
        ));
    }
    if matches!(p.trans_fat, Some(v) if v > p.total_fat) {
        errors.push(FieldError::new(
            vec!["transFat".into()],
            "Trans fats cannot exceed total fats",
        ));
    }
    if matches!(p.sugars, Some(v) if v > p.carbohydrates) {
        errors.push(FieldError::new(
            vec!["sugars".into()],
            "Sugars cannot exceed carbohydrates",
        ));
    }
    errors
}

#[derive(Debug, Clone, Copy)]
enum NumberRule {
    NonNegative,
    Positive,
}

impl NumberRule {
    fn check(self, n: f64) -> Option<&'static str> {
        match self {
            NumberRule::NonNegative if n < 0.0 => Some("Number must be greater than or equal to 0"),
            NumberRule::Positive if n <= 0.0 => Some("Number must be greater than 0"),
            _ => None,
        }
    }
}

/// Walks one JSON object, recording every failure instead of stopping at the first.
///
/// Each accessor returns `None` when the field failed; nullable accessors
/// return `Some(None)` for an absent or `null` value.
struct Checker<'a> {
    obj: &'a Map<String, Value>,
    base: Vec<PathSegment>,
    errors: Vec<FieldError>,
}

impl<'a> Checker<'a> {
    fn new(obj: &'a Map<String, Value>, base: Vec<PathSegment>) -> Self {
        Self {
            obj,
            base,
            errors: Vec::new(),
        }
    }

    fn fail(&mut self, key: &str, message: impl Into<String>) {
        let mut path = self.base.clone();
        path.push(key.into());
        self.errors.push(FieldError::new(path, message));
    }

    fn required(&mut self, key: &str) -> Option<&'a Value> {
        match self.obj.get(key) {
            Some(v) => Some(v),
            None => {
                self.fail(key, "Required");
                None
            }
        }
    }

    fn required_string(&mut self, key: &str, min: usize, max: usize) -> Option<String> {
        let v = self.required(key)?;
        self.string_value(key, v, min, max)
    }

    fn nullable_string(&mut self, key: &str, max: usize) -> Option<Option<String>> {
        match self.obj.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(v) => self.string_value(key, v, 0, max).map(Some),
        }
    }

    fn barcode(&mut self, key: &str) -> Option<Option<String>> {
        let barcode = self.nullable_string(key, rules::BARCODE_MAX_LEN)?;
        match barcode {
            Some(code) if !rules::is_digits_only(&code) => {
                self.fail(key, "Barcode must contain only digits");
                None
            }
            other => Some(other),
        }
    }

    fn string_value(&mut self, key: &str, v: &Value, min: usize, max: usize) -> Option<String> {
        let Value::String(s) = v else {
            self.fail(key, format!("Expected string, received {}", type_name(v)));
            return None;
        };
        let len = s.chars().count();
        if len < min {
            self.fail(key, format!("String must contain at least {min} character(s)"));
            return None;
        }
        if len > max {
            self.fail(key, format!("String must contain at most {max} character(s)"));
            return None;
        }
        Some(s.clone())
    }

    fn required_number(&mut self, key: &str, rule: NumberRule) -> Option<f64> {
        let v = self.required(key)?;
        self.number_value(key, v, rule)
    }

    fn nullable_number(&mut self, key: &str) -> Option<Option<f64>> {
        match self.obj.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(v) => self.number_value(key, v, NumberRule::NonNegative).map(Some),
        }
    }

    fn number_value(&mut self, key: &str, v: &Value, rule: NumberRule) -> Option<f64> {
        let Some(n) = v.as_f64() else {
            self.fail(key, format!("Expected number, received {}", type_name(v)));
            return None;
        };
        if let Some(message) = rule.check(n) {
            self.fail(key, message);
            return None;
        }
        Some(n)
    }

    fn required_enum<T>(
        &mut self,
        key: &str,
        parse: fn(&str) -> Option<T>,
        options: &[&str],
    ) -> Option<T> {
        let v = self.required(key)?;
        let expected = options
            .iter()
            .map(|o| format!("'{o}'"))
            .collect::<Vec<_>>()
            .join(" | ");
        let Value::String(s) = v else {
            self.fail(key, format!("Expected {expected}, received {}", type_name(v)));
            return None;
        };
        match parse(s) {
            Some(t) => Some(t),
            None => {
                self.fail(
                    key,
                    format!("Invalid enum value. Expected {expected}, received '{s}'"),
                );
                None
            }
        }
    }

    /// Absent lists stay `Some(None)`; `null` is not accepted.
    fn micronutrients(&mut self, key: &str) -> Option<Option<Vec<Micronutrient>>> {
        let Some(v) = self.obj.get(key) else {
            return Some(None);
        };
        let Value::Array(items) = v else {
            self.fail(key, format!("Expected array, received {}", type_name(v)));
            return None;
        };

        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            let mut base = self.base.clone();
            base.push(key.into());
            base.push(i.into());

            let Value::Object(entry) = item else {
                self.errors
                    .push(FieldError::new(base, format!("Expected object, received {}", type_name(item))));
                ok = false;
                continue;
            };

            let mut inner = Checker::new(entry, base);
            let name = inner.required_string("name", 1, rules::MICRONUTRIENT_NAME_MAX_LEN);
            let quantity = inner.required_number("quantity", NumberRule::NonNegative);
            let unit = inner.required_string("unit", 1, rules::MICRONUTRIENT_UNIT_MAX_LEN);
            self.errors.append(&mut inner.errors);

            match (name, quantity, unit) {
                (Some(name), Some(quantity), Some(unit)) => out.push(Micronutrient {
                    name,
                    quantity,
                    unit,
                }),
                _ => ok = false,
            }
        }

        ok.then_some(Some(out))
    }
}

/// Number-literal coercion: blank is 0, `0x`/`0o`/`0b` prefixes switch radix,
/// `Infinity` is the only spelled-out value.
fn coerce_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        let digits = t
            .strip_prefix(prefix)
            .or_else(|| t.strip_prefix(prefix.to_ascii_uppercase().as_str()));
        if let Some(digits) = digits {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if t.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    t.parse::<f64>().ok()
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
