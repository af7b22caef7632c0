//! Serving-to-grams conversion
//!
//! Resolves a quantity in one of the supported serving units to grams using
//! whatever per-food metadata is available. Piece counts never fall back to a
//! guessed weight: without a piece weight the conversion fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::units::{ServingUnit, DEFAULT_GRAMS_PER_CUP, DEFAULT_GRAMS_PER_ML};

/// Per-food metadata used to convert non-gram units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodMetrics {
    /// Weight of one piece (e.g. one egg)
    pub grams_per_piece: Option<f64>,
    /// Density
    pub grams_per_ml: Option<f64>,
    pub grams_per_cup: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("missing piece weight: set grams per piece or choose a different unit")]
    MissingPieceWeight,

    #[error("unknown serving unit '{0}'")]
    UnknownUnit(String),

    #[error("invalid quantity {0}")]
    InvalidQuantity(f64),
}

impl ConversionError {
    /// Stable machine-readable reason
    pub fn reason(&self) -> &'static str {
        match self {
            ConversionError::MissingPieceWeight => "missing_piece_weight",
            ConversionError::UnknownUnit(_) => "unknown_unit",
            ConversionError::InvalidQuantity(_) => "invalid_quantity",
        }
    }
}

/// Metadata values that are zero, negative or NaN count as unknown
fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Convert `quantity` of `unit` to grams.
///
/// `piece_override` is a user-supplied grams-per-piece used only when the
/// food itself has no piece weight.
pub fn to_grams(
    quantity: f64,
    unit: ServingUnit,
    metrics: &FoodMetrics,
    piece_override: Option<f64>,
) -> Result<f64, ConversionError> {
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(ConversionError::InvalidQuantity(quantity));
    }

    match unit {
        ServingUnit::Grams => Ok(quantity),
        ServingUnit::Milliliters => {
            let density = known(metrics.grams_per_ml).unwrap_or(DEFAULT_GRAMS_PER_ML);
            Ok(quantity * density)
        }
        ServingUnit::Pieces => known(metrics.grams_per_piece)
            .or_else(|| known(piece_override))
            .map(|per_piece| quantity * per_piece)
            .ok_or(ConversionError::MissingPieceWeight),
        ServingUnit::Cups => {
            let per_cup = known(metrics.grams_per_cup).unwrap_or(DEFAULT_GRAMS_PER_CUP);
            Ok(quantity * per_cup)
        }
    }
}

/// Same as [`to_grams`] but starting from a stored unit tag
pub fn tag_to_grams(
    quantity: f64,
    unit_tag: &str,
    metrics: &FoodMetrics,
    piece_override: Option<f64>,
) -> Result<f64, ConversionError> {
    let unit = ServingUnit::parse(unit_tag)
        .ok_or_else(|| ConversionError::UnknownUnit(unit_tag.to_string()))?;
    to_grams(quantity, unit, metrics, piece_override)
}
