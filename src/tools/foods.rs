//! Food lookup tools

use serde::Serialize;

use crate::db::Database;
use crate::lookup::{self, FoodItem, FoodSearch, SearchOutcome};
use crate::models::FoodEntry;

const DEFAULT_RECENT_LIMIT: i64 = 10;

#[derive(Debug, Serialize)]
pub struct FoodListResponse {
    pub foods: Vec<FoodItem>,
    pub total: usize,
}

impl From<Vec<FoodItem>> for FoodListResponse {
    fn from(foods: Vec<FoodItem>) -> Self {
        Self {
            total: foods.len(),
            foods,
        }
    }
}

pub async fn search_foods(search: &FoodSearch, query: &str) -> SearchOutcome {
    search.search(query).await
}

pub fn popular_foods() -> FoodListResponse {
    lookup::popular_foods().into()
}

/// Foods the user logged most recently, one per distinct name and brand
pub fn recent_foods(
    db: &Database,
    user_id: &str,
    limit: Option<i64>,
) -> Result<FoodListResponse, String> {
    let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT).clamp(1, 50);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entries = FoodEntry::recent_distinct(&conn, user_id, limit)
        .map_err(|e| format!("Failed to load recent foods: {}", e))?;

    let foods: Vec<FoodItem> = entries
        .into_iter()
        .map(|entry| FoodItem {
            name: entry.food_name,
            brand: entry.brand,
            per_100g: entry.per_100g,
            metrics: entry.metrics,
        })
        .collect();

    Ok(foods.into())
}
