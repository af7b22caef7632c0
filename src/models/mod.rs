//! Data models
//!
//! Rust structs for the stored rows. Every query is scoped by `user_id`.

mod food_entry;
mod goals;
mod meal;
mod nutrition;
mod preferences;
mod profile;

pub use food_entry::{FoodEntry, FoodEntryCreate, FoodEntryUpdate};
pub use goals::{UserGoals, UserGoalsUpdate};
pub use meal::{Meal, MealUpdate, DEFAULT_MEALS};
pub use nutrition::{round_to, NutrientsPer100g, Nutrition};
pub use preferences::{UserPreferences, UserPreferencesUpdate};
pub use profile::{ActivityLevel, Gender, Profile, ProfileUpdate, WeightGoal};

#[cfg(test)]
pub(crate) use food_entry::tests::entry_fixture;
