//! Goal tools: daily targets and progress against them

use chrono::NaiveDate;

use crate::db::Database;
use crate::models::{FoodEntry, UserGoals, UserGoalsUpdate};
use crate::nutrition::{period_progress, progress_window, PeriodProgress};

use super::diary::resolve_date;

pub fn get_goals(db: &Database, user_id: &str) -> Result<UserGoals, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserGoals::get_or_create(&conn, user_id).map_err(|e| format!("Failed to load goals: {}", e))
}

pub fn update_goals(
    db: &Database,
    user_id: &str,
    data: UserGoalsUpdate,
) -> Result<UserGoals, String> {
    for (name, value) in [
        ("daily_calories", data.daily_calories),
        ("daily_protein", data.daily_protein),
        ("daily_carbs", data.daily_carbs),
        ("daily_fats", data.daily_fats),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v <= 0.0 {
                return Err(format!("{} must be greater than 0", name));
            }
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let goals = UserGoals::update(&conn, user_id, &data)
        .map_err(|e| format!("Failed to update goals: {}", e))?;

    tracing::info!(
        calories = goals.daily_calories,
        protein = goals.daily_protein,
        carbs = goals.daily_carbs,
        fats = goals.daily_fats,
        "goals updated"
    );
    Ok(goals)
}

/// Daily, weekly and monthly progress for the period containing `date`
pub fn get_progress(
    db: &Database,
    user_id: &str,
    date: Option<&str>,
) -> Result<PeriodProgress, String> {
    let anchor = NaiveDate::parse_from_str(&resolve_date(date)?, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date: {}", e))?;

    let (start, end) = progress_window(anchor);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let goals = UserGoals::get_or_create(&conn, user_id)
        .map_err(|e| format!("Failed to load goals: {}", e))?;
    let entries = FoodEntry::list_for_range(
        &conn,
        user_id,
        &start.format("%Y-%m-%d").to_string(),
        &end.format("%Y-%m-%d").to_string(),
    )
    .map_err(|e| format!("Failed to load entries: {}", e))?;

    Ok(period_progress(&entries, anchor, &goals.targets()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutrientsPer100g;
    use crate::nutrition::FoodMetrics;
    use crate::tools::diary::{add_food_entry, EntryInput};

    fn log(db: &Database, date: &str, grams: f64, kcal: f64) {
        add_food_entry(
            db,
            "u1",
            EntryInput {
                meal_id: None,
                food_name: "Food".into(),
                brand: None,
                serving_size: grams,
                serving_unit: "g".into(),
                per_100g: NutrientsPer100g {
                    calories: kcal,
                    ..Default::default()
                },
                metrics: FoodMetrics::default(),
                piece_weight: None,
                consumed_date: Some(date.into()),
                consumed_at: None,
            },
        )
        .unwrap()
        .unwrap();
    }

    #[test]
    fn test_update_rejects_non_positive() {
        let db = Database::in_memory().unwrap();
        let result = update_goals(
            &db,
            "u1",
            UserGoalsUpdate {
                daily_fats: Some(0.0),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(get_goals(&db, "u1").unwrap().daily_fats, 67.0);
    }

    #[test]
    fn test_progress_uses_goals() {
        let db = Database::in_memory().unwrap();
        update_goals(
            &db,
            "u1",
            UserGoalsUpdate {
                daily_calories: Some(1000.0),
                ..Default::default()
            },
        )
        .unwrap();

        log(&db, "2025-03-12", 100.0, 500.0);
        log(&db, "2025-03-11", 100.0, 700.0);
        log(&db, "2025-04-01", 100.0, 900.0);

        let progress = get_progress(&db, "u1", Some("2025-03-12")).unwrap();
        assert_eq!(progress.daily.progress.calories.percentage, 50.0);
        assert_eq!(progress.weekly.progress.calories.current, 1200.0);
        assert_eq!(progress.weekly.progress.calories.target, 7000.0);
        assert_eq!(progress.monthly.progress.calories.current, 1200.0);
    }

    #[test]
    fn test_progress_over_goal_is_clamped() {
        let db = Database::in_memory().unwrap();
        log(&db, "2025-03-12", 1000.0, 300.0);
        let progress = get_progress(&db, "u1", Some("2025-03-12")).unwrap();
        assert_eq!(progress.daily.progress.calories.current, 3000.0);
        assert_eq!(progress.daily.progress.calories.percentage, 100.0);
    }
}
