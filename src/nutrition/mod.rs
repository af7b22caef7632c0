//! Nutrition math
//!
//! Unit conversion, per-entry calculation, aggregation and goal progress.

pub mod aggregate;
pub mod calculator;
pub mod converter;
pub mod energy;
pub mod progress;
pub mod units;

pub use aggregate::{sum_entries, totals_for_date, totals_for_range, Totals};
pub use calculator::{calculate_nutrition, calculate_serving, ServingNutrition};
pub use converter::{tag_to_grams, to_grams, ConversionError, FoodMetrics};
pub use energy::{estimate_daily_calories, EnergyEstimate};
pub use progress::{
    percent_of_goal, period_progress, progress_window, MacroProgress, MacroTargets,
    NutritionProgress, Period, PeriodProgress,
};
pub use units::{ServingUnit, DEFAULT_GRAMS_PER_CUP, DEFAULT_GRAMS_PER_ML};
