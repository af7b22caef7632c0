//! Meal tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{Meal, MealUpdate};

#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<Meal>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// The user's meals in order, creating the defaults on first use
pub fn list_meals(db: &Database, user_id: &str) -> Result<ListMealsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::ensure_defaults(&conn, user_id)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    Ok(ListMealsResponse {
        total: meals.len(),
        meals,
    })
}

pub fn add_meal(db: &Database, user_id: &str, name: &str) -> Result<Meal, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Meal name cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::create(&conn, user_id, name)
        .map_err(|e| format!("Failed to create meal: {}", e))?;

    tracing::info!(meal_id = meal.id, name = %meal.name, "meal added");
    Ok(meal)
}

pub fn update_meal(
    db: &Database,
    user_id: &str,
    id: i64,
    data: MealUpdate,
) -> Result<Meal, String> {
    if data.name.as_deref().map(str::trim) == Some("") {
        return Err("Meal name cannot be empty".to_string());
    }
    if data.order_index.map(|i| i < 0).unwrap_or(false) {
        return Err("order_index cannot be negative".to_string());
    }

    let data = MealUpdate {
        name: data.name.map(|n| n.trim().to_string()),
        order_index: data.order_index,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::update(&conn, user_id, id, &data)
        .map_err(|e| format!("Failed to update meal: {}", e))?
        .ok_or_else(|| format!("Meal not found with id: {}", id))
}

/// Remove a meal; its entries stay in the diary as unassigned
pub fn delete_meal(db: &Database, user_id: &str, id: i64) -> Result<DeleteMealResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted =
        Meal::delete(&conn, user_id, id).map_err(|e| format!("Failed to delete meal: {}", e))?;

    if !deleted {
        return Err(format!("Meal not found with id: {}", id));
    }

    tracing::info!(meal_id = id, "meal deleted");
    Ok(DeleteMealResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_MEALS;

    #[test]
    fn test_list_creates_defaults() {
        let db = Database::in_memory().unwrap();
        let response = list_meals(&db, "u1").unwrap();
        assert_eq!(response.total, DEFAULT_MEALS.len());
        assert_eq!(response.meals[0].name, "Breakfast");
    }

    #[test]
    fn test_add_update_delete() {
        let db = Database::in_memory().unwrap();
        list_meals(&db, "u1").unwrap();

        let meal = add_meal(&db, "u1", "  Pre-workout ").unwrap();
        assert_eq!(meal.name, "Pre-workout");
        assert_eq!(meal.order_index, DEFAULT_MEALS.len() as i64);

        let meal = update_meal(
            &db,
            "u1",
            meal.id,
            MealUpdate {
                name: None,
                order_index: Some(0),
            },
        )
        .unwrap();
        assert_eq!(meal.order_index, 0);

        assert!(delete_meal(&db, "u1", meal.id).unwrap().success);
        assert!(delete_meal(&db, "u1", meal.id).is_err());
    }

    #[test]
    fn test_rejects_empty_name() {
        let db = Database::in_memory().unwrap();
        assert!(add_meal(&db, "u1", "   ").is_err());
    }
}
