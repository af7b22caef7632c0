//! Food lookup
//!
//! Remote product search with a bundled table of common foods as fallback.

pub mod local;
pub mod remote;
pub mod search;

use serde::{Deserialize, Serialize};

use crate::models::NutrientsPer100g;
use crate::nutrition::FoodMetrics;

pub use local::{popular_foods, search_local, MIN_QUERY_LEN};
pub use remote::{FoodSource, LookupError, OpenFoodFacts};
pub use search::{FoodSearch, Origin, SearchOutcome};

/// A food as returned by a lookup, ready to be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub brand: Option<String>,
    pub per_100g: NutrientsPer100g,
    #[serde(default)]
    pub metrics: FoodMetrics,
}
