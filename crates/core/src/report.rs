//! Carbon footprint report types and response parsing.
//!
//! These types mirror the JSON document the Gemini API is instructed to
//! produce. Parsing fails closed: a response with missing, extra, or
//! mistyped fields is rejected rather than partially accepted, since the
//! API's schema compliance is best-effort, not guaranteed.

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One ingredient identified in the meal photo.
///
/// Immutable once produced by the API; owned by the enclosing report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ingredient {
    /// Ingredient name as identified by the model.
    pub name: String,
    /// Free-form quantity with unit, e.g. "100g".
    pub amount: String,
    /// Estimated footprint for this ingredient, in kg CO2e.
    pub carbon_footprint: f64,
}

/// The structured result of one analysis attempt.
///
/// Created wholesale from a single API response and discarded when the user
/// resets or selects a new image. `total_carbon_footprint` should roughly
/// equal the sum of the ingredient footprints, but that is the model's
/// responsibility and is not validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CarbonFootprintReport {
    pub dish_name: String,
    /// Total footprint of the dish, in kg CO2e.
    pub total_carbon_footprint: f64,
    /// Ingredients in the order the model listed them (display order).
    pub ingredients: Vec<Ingredient>,
    /// Short free-text analysis of the footprint.
    pub summary: String,
}

/// Parses the textual payload of a model response into a report.
///
/// Incidental whitespace around the document is trimmed first. Any parse
/// failure or shape violation is a [`AppError::MalformedResponse`]; there is
/// no partial result.
pub fn parse_report(text: &str) -> Result<CarbonFootprintReport> {
    let trimmed = text.trim();
    serde_json::from_str(trimmed)
        .map_err(|e| AppError::malformed(format!("response is not a valid report: {}", e)))
}

/// The strict output schema sent with every generation request.
///
/// Declares exactly the fields of [`CarbonFootprintReport`], all mandatory,
/// in the Gemini `responseSchema` dialect.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "dishName": { "type": "STRING", "description": "Name of the dish" },
            "totalCarbonFootprint": { "type": "NUMBER", "description": "Total carbon footprint (kg CO2e)" },
            "ingredients": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Ingredient name" },
                        "amount": { "type": "STRING", "description": "Ingredient amount (e.g. 100g)" },
                        "carbonFootprint": { "type": "NUMBER", "description": "Footprint of this ingredient (kg CO2e)" }
                    },
                    "required": ["name", "amount", "carbonFootprint"]
                }
            },
            "summary": { "type": "STRING", "description": "A short analysis of the carbon footprint" }
        },
        "required": ["dishName", "totalCarbonFootprint", "ingredients", "summary"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRIED_RICE: &str = r#"{
        "dishName": "Fried Rice",
        "totalCarbonFootprint": 1.25,
        "ingredients": [
            {"name": "Rice", "amount": "200g", "carbonFootprint": 0.3},
            {"name": "Egg", "amount": "50g", "carbonFootprint": 0.2},
            {"name": "Oil", "amount": "10g", "carbonFootprint": 0.75}
        ],
        "summary": "Moderate footprint, mostly from oil."
    }"#;

    #[test]
    fn parses_conforming_response() {
        let report = parse_report(FRIED_RICE).unwrap();
        assert_eq!(report.dish_name, "Fried Rice");
        assert_eq!(report.total_carbon_footprint, 1.25);
        assert_eq!(report.ingredients.len(), 3);
        assert_eq!(report.ingredients[0].name, "Rice");
        assert_eq!(report.ingredients[0].amount, "200g");
        assert_eq!(report.ingredients[2].carbon_footprint, 0.75);
        assert_eq!(report.summary, "Moderate footprint, mostly from oil.");
    }

    #[test]
    fn preserves_ingredient_order() {
        let report = parse_report(FRIED_RICE).unwrap();
        let names: Vec<&str> = report.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Rice", "Egg", "Oil"]);
    }

    #[test]
    fn trims_incidental_whitespace() {
        let padded = format!("\n  {}\n\t", FRIED_RICE);
        assert!(parse_report(&padded).is_ok());
    }

    #[test]
    fn rejects_non_json_text() {
        let err = parse_report("I could not identify the dish.").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn rejects_missing_required_field() {
        // No summary.
        let text = r#"{"dishName": "Toast", "totalCarbonFootprint": 0.1, "ingredients": []}"#;
        assert!(matches!(parse_report(text), Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn rejects_unknown_fields() {
        let text = r#"{
            "dishName": "Toast",
            "totalCarbonFootprint": 0.1,
            "ingredients": [],
            "summary": "Tiny.",
            "confidence": 0.9
        }"#;
        assert!(matches!(parse_report(text), Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn rejects_mistyped_ingredient() {
        // carbonFootprint must be a number.
        let text = r#"{
            "dishName": "Toast",
            "totalCarbonFootprint": 0.1,
            "ingredients": [{"name": "Bread", "amount": "80g", "carbonFootprint": "0.1"}],
            "summary": "Tiny."
        }"#;
        assert!(matches!(parse_report(text), Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn schema_declares_all_required_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            ["dishName", "totalCarbonFootprint", "ingredients", "summary"]
        );

        let item_required: Vec<&str> = schema["properties"]["ingredients"]["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(item_required, ["name", "amount", "carbonFootprint"]);
    }
}
