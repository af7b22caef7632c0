//! Per-entry nutrition from grams and per-100g values
//!
//! The same function serves previews and stored entries, so an entry never
//! shows one number while editing and another after saving.

use serde::Serialize;

use crate::models::{NutrientsPer100g, Nutrition};

use super::converter::{to_grams, ConversionError, FoodMetrics};
use super::units::ServingUnit;

/// Nutrition consumed for `grams` of a food.
///
/// Calories are rounded to a whole number, everything else to one decimal.
/// Missing optional nutrients count as zero.
pub fn calculate_nutrition(grams: f64, per_100g: &NutrientsPer100g) -> Nutrition {
    Nutrition::from(per_100g).scale(grams / 100.0).rounded()
}

/// Resolved serving: grams plus the nutrition they carry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServingNutrition {
    pub grams: f64,
    pub nutrition: Nutrition,
}

/// Convert a serving to grams, then compute its nutrition
pub fn calculate_serving(
    quantity: f64,
    unit: ServingUnit,
    metrics: &FoodMetrics,
    piece_override: Option<f64>,
    per_100g: &NutrientsPer100g,
) -> Result<ServingNutrition, ConversionError> {
    let grams = to_grams(quantity, unit, metrics, piece_override)?;
    Ok(ServingNutrition {
        grams,
        nutrition: calculate_nutrition(grams, per_100g),
    })
}
