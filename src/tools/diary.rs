//! Food diary tools
//!
//! Logging, editing and reading food entries. Servings are converted to grams
//! before anything is written, and a serving that cannot be converted blocks
//! the write instead of storing a guess.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::models::{
    FoodEntry, FoodEntryCreate, FoodEntryUpdate, Meal, NutrientsPer100g, Nutrition,
};
use crate::nutrition::{
    calculate_nutrition, sum_entries, tag_to_grams, ConversionError, FoodMetrics, ServingUnit,
    Totals,
};

/// A food to log, in any supported unit
#[derive(Debug, Clone, Deserialize)]
pub struct EntryInput {
    pub meal_id: Option<i64>,
    pub food_name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    /// g, ml, pz or cup
    pub serving_unit: String,
    pub per_100g: NutrientsPer100g,
    #[serde(default)]
    pub metrics: FoodMetrics,
    /// Grams per piece supplied by the user when the food has none
    pub piece_weight: Option<f64>,
    /// YYYY-MM-DD, defaults to today
    pub consumed_date: Option<String>,
    pub consumed_at: Option<String>,
}

/// `None` leaves a field as it is. `Some(None)` unassigns the meal or removes the brand.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub meal_id: Option<Option<i64>>,
    pub food_name: Option<String>,
    pub brand: Option<Option<String>>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub piece_weight: Option<f64>,
    pub per_100g: Option<NutrientsPer100g>,
    pub consumed_date: Option<String>,
}

/// Returned instead of writing when the input cannot be used as given
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryBlocked {
    pub blocked: bool,
    pub reason: String,
    pub message: String,
    /// What to ask the user for
    pub prompt: String,
}

impl EntryBlocked {
    fn new(reason: &str, message: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: reason.to_string(),
            message: message.into(),
            prompt: prompt.into(),
        }
    }

    fn from_conversion(e: &ConversionError) -> Self {
        let prompt = match e {
            ConversionError::MissingPieceWeight => {
                "How many grams does one piece weigh? Provide piece_weight or log the food in grams."
                    .to_string()
            }
            ConversionError::UnknownUnit(_) => format!(
                "Use one of: {}",
                ServingUnit::ALL
                    .iter()
                    .map(|u| u.as_tag())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ConversionError::InvalidQuantity(_) => {
                "Provide a serving size greater than zero.".to_string()
            }
        };
        Self::new(e.reason(), e.to_string(), prompt)
    }
}

/// Entry with its derived numbers
#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    #[serde(flatten)]
    pub entry: FoodEntry,
    pub grams: Option<f64>,
    pub nutrition: Option<Nutrition>,
    /// Set when the stored serving cannot be converted
    pub issue: Option<String>,
}

impl From<FoodEntry> for EntryView {
    fn from(entry: FoodEntry) -> Self {
        match entry.grams() {
            Ok(grams) => {
                let nutrition = calculate_nutrition(grams, &entry.per_100g);
                Self {
                    entry,
                    grams: Some(grams),
                    nutrition: Some(nutrition),
                    issue: None,
                }
            }
            Err(e) => Self {
                entry,
                grams: None,
                nutrition: None,
                issue: Some(e.reason().to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub grams: f64,
    pub nutrition: Nutrition,
}

#[derive(Debug, Serialize)]
pub struct DeleteEntryResponse {
    pub success: bool,
    pub deleted_id: i64,
}

#[derive(Debug, Serialize)]
pub struct MealSection {
    /// None for entries not assigned to a meal
    pub meal_id: Option<i64>,
    pub name: String,
    pub entries: Vec<EntryView>,
    pub totals: Totals,
}

#[derive(Debug, Serialize)]
pub struct DiaryResponse {
    pub date: String,
    pub meals: Vec<MealSection>,
    pub totals: Totals,
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accept YYYY-MM-DD or default to today
pub fn resolve_date(date: Option<&str>) -> Result<String, String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string())
            .map_err(|_| format!("Invalid date '{}': expected YYYY-MM-DD", d)),
        None => Ok(today().format("%Y-%m-%d").to_string()),
    }
}

fn check_nutrients(per_100g: &NutrientsPer100g) -> Option<EntryBlocked> {
    let values = [
        ("calories", Some(per_100g.calories)),
        ("protein", Some(per_100g.protein)),
        ("carbs", Some(per_100g.carbs)),
        ("fats", Some(per_100g.fats)),
        ("fiber", per_100g.fiber),
        ("sugar", per_100g.sugar),
        ("sodium", per_100g.sodium),
    ];

    values
        .iter()
        .find(|(_, v)| v.map(|v| !v.is_finite() || v < 0.0).unwrap_or(false))
        .map(|(name, _)| {
            EntryBlocked::new(
                "invalid_nutrients",
                format!("{} per 100g must be a non-negative number", name),
                format!("Provide a valid {} value per 100g.", name),
            )
        })
}

/// Serving converted to grams, ready to store
struct NormalizedServing {
    grams: f64,
    metrics: FoodMetrics,
}

/// Convert to grams and fold a piece override into the stored metrics
fn normalize_serving(
    quantity: f64,
    unit: &str,
    metrics: FoodMetrics,
    piece_weight: Option<f64>,
) -> Result<NormalizedServing, EntryBlocked> {
    let grams = tag_to_grams(quantity, unit, &metrics, piece_weight)
        .map_err(|e| EntryBlocked::from_conversion(&e))?;

    if grams <= 0.0 {
        return Err(EntryBlocked::from_conversion(
            &ConversionError::InvalidQuantity(quantity),
        ));
    }

    let mut metrics = metrics;
    let has_piece_weight = metrics.grams_per_piece.map(|g| g > 0.0).unwrap_or(false);
    if !has_piece_weight {
        metrics.grams_per_piece = piece_weight.filter(|g| g.is_finite() && *g > 0.0);
    }

    Ok(NormalizedServing { grams, metrics })
}

fn check_meal(db: &Database, user_id: &str, meal_id: Option<i64>) -> Result<Option<EntryBlocked>, String> {
    let Some(meal_id) = meal_id else {
        return Ok(None);
    };
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::get_by_id(&conn, user_id, meal_id)
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(meal.is_none().then(|| {
        EntryBlocked::new(
            "unknown_meal",
            format!("Meal {} does not exist", meal_id),
            "Pick one of the meals from list_meals, or omit meal_id.",
        )
    }))
}

/// Compute grams and nutrition for a serving without saving it
pub fn preview_food_entry(input: &EntryInput) -> Result<PreviewResponse, EntryBlocked> {
    if let Some(blocked) = check_nutrients(&input.per_100g) {
        return Err(blocked);
    }
    let serving = normalize_serving(
        input.serving_size,
        &input.serving_unit,
        input.metrics,
        input.piece_weight,
    )?;

    Ok(PreviewResponse {
        grams: serving.grams,
        nutrition: calculate_nutrition(serving.grams, &input.per_100g),
    })
}

/// Log a food. The stored entry is always in grams.
pub fn add_food_entry(
    db: &Database,
    user_id: &str,
    input: EntryInput,
) -> Result<Result<EntryView, EntryBlocked>, String> {
    let food_name = input.food_name.trim().to_string();
    if food_name.is_empty() {
        return Ok(Err(EntryBlocked::new(
            "missing_name",
            "Food name cannot be empty",
            "What food was eaten?",
        )));
    }
    if let Some(blocked) = check_nutrients(&input.per_100g) {
        return Ok(Err(blocked));
    }

    let serving = match normalize_serving(
        input.serving_size,
        &input.serving_unit,
        input.metrics,
        input.piece_weight,
    ) {
        Ok(s) => s,
        Err(blocked) => {
            tracing::info!(food = %food_name, reason = %blocked.reason, "food entry blocked");
            return Ok(Err(blocked));
        }
    };

    if let Some(blocked) = check_meal(db, user_id, input.meal_id)? {
        return Ok(Err(blocked));
    }

    let consumed_date = resolve_date(input.consumed_date.as_deref())?;

    let data = FoodEntryCreate {
        meal_id: input.meal_id,
        food_name,
        brand: input.brand.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
        serving_size: serving.grams,
        serving_unit: ServingUnit::Grams.as_tag().to_string(),
        per_100g: input.per_100g,
        metrics: serving.metrics,
        consumed_date,
        consumed_at: input.consumed_at,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entry = FoodEntry::create(&conn, user_id, &data)
        .map_err(|e| format!("Failed to create food entry: {}", e))?;

    tracing::info!(entry_id = entry.id, food = %entry.food_name, grams = entry.serving_size, "food entry added");
    Ok(Ok(entry.into()))
}

/// Change an entry. A new serving is converted to grams like on add.
pub fn update_food_entry(
    db: &Database,
    user_id: &str,
    id: i64,
    changes: EntryChanges,
) -> Result<Result<EntryView, EntryBlocked>, String> {
    let existing = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        FoodEntry::get_by_id(&conn, user_id, id)
            .map_err(|e| format!("Database error: {}", e))?
            .ok_or_else(|| format!("Food entry not found with id: {}", id))?
    };

    let mut update = FoodEntryUpdate {
        meal_id: changes.meal_id,
        food_name: changes.food_name.map(|n| n.trim().to_string()),
        brand: changes
            .brand
            .map(|b| b.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())),
        ..Default::default()
    };

    if update.food_name.as_deref() == Some("") {
        return Ok(Err(EntryBlocked::new(
            "missing_name",
            "Food name cannot be empty",
            "What food was eaten?",
        )));
    }

    if let Some(per_100g) = changes.per_100g {
        if let Some(blocked) = check_nutrients(&per_100g) {
            return Ok(Err(blocked));
        }
        update.calories_per_100g = Some(per_100g.calories);
        update.protein_per_100g = Some(per_100g.protein);
        update.carbs_per_100g = Some(per_100g.carbs);
        update.fats_per_100g = Some(per_100g.fats);
        update.fiber_per_100g = Some(per_100g.fiber);
        update.sugar_per_100g = Some(per_100g.sugar);
        update.sodium_per_100g = Some(per_100g.sodium);
    }

    if changes.serving_size.is_some() || changes.serving_unit.is_some() {
        let quantity = changes.serving_size.unwrap_or(existing.serving_size);
        let unit = changes
            .serving_unit
            .unwrap_or_else(|| existing.serving_unit.clone());

        let serving = match normalize_serving(quantity, &unit, existing.metrics, changes.piece_weight) {
            Ok(s) => s,
            Err(blocked) => {
                tracing::info!(entry_id = id, reason = %blocked.reason, "food entry update blocked");
                return Ok(Err(blocked));
            }
        };

        update.serving_size = Some(serving.grams);
        update.serving_unit = Some(ServingUnit::Grams.as_tag().to_string());
        if serving.metrics.grams_per_piece != existing.metrics.grams_per_piece {
            update.serving_weight_grams = serving.metrics.grams_per_piece;
        }
    } else if let Some(weight) = changes.piece_weight.filter(|w| w.is_finite() && *w > 0.0) {
        update.serving_weight_grams = Some(weight);
    }

    if let Some(ref date) = changes.consumed_date {
        update.consumed_date = Some(resolve_date(Some(date))?);
    }

    if let Some(blocked) = check_meal(db, user_id, changes.meal_id.flatten())? {
        return Ok(Err(blocked));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let entry = FoodEntry::update(&conn, user_id, id, &update)
        .map_err(|e| format!("Failed to update food entry: {}", e))?
        .ok_or_else(|| format!("Food entry not found with id: {}", id))?;

    tracing::info!(entry_id = id, "food entry updated");
    Ok(Ok(entry.into()))
}

pub fn delete_food_entry(
    db: &Database,
    user_id: &str,
    id: i64,
) -> Result<DeleteEntryResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let deleted = FoodEntry::delete(&conn, user_id, id)
        .map_err(|e| format!("Failed to delete food entry: {}", e))?;

    if !deleted {
        return Err(format!("Food entry not found with id: {}", id));
    }

    tracing::info!(entry_id = id, "food entry deleted");
    Ok(DeleteEntryResponse {
        success: true,
        deleted_id: id,
    })
}

/// A day's entries grouped by meal, with totals per meal and for the day
pub fn get_diary(db: &Database, user_id: &str, date: Option<&str>) -> Result<DiaryResponse, String> {
    let date = resolve_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meals = Meal::ensure_defaults(&conn, user_id)
        .map_err(|e| format!("Failed to load meals: {}", e))?;
    let entries = FoodEntry::list_for_date(&conn, user_id, &date)
        .map_err(|e| format!("Failed to load entries: {}", e))?;

    let totals = sum_entries(&entries);

    let mut sections: Vec<MealSection> = meals
        .into_iter()
        .map(|meal| {
            let in_meal: Vec<&FoodEntry> = entries
                .iter()
                .filter(|e| e.meal_id == Some(meal.id))
                .collect();
            MealSection {
                meal_id: Some(meal.id),
                name: meal.name,
                totals: sum_entries(in_meal.iter().copied()),
                entries: in_meal.into_iter().cloned().map(EntryView::from).collect(),
            }
        })
        .collect();

    let assigned: Vec<i64> = sections.iter().filter_map(|s| s.meal_id).collect();
    let unassigned: Vec<&FoodEntry> = entries
        .iter()
        .filter(|e| e.meal_id.map(|id| !assigned.contains(&id)).unwrap_or(true))
        .collect();

    if !unassigned.is_empty() {
        sections.push(MealSection {
            meal_id: None,
            name: "Unassigned".to_string(),
            totals: sum_entries(unassigned.iter().copied()),
            entries: unassigned.into_iter().cloned().map(EntryView::from).collect(),
        });
    }

    Ok(DiaryResponse {
        date,
        meals: sections,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken(serving_size: f64, unit: &str) -> EntryInput {
        EntryInput {
            meal_id: None,
            food_name: "Petto di pollo".into(),
            brand: None,
            serving_size,
            serving_unit: unit.into(),
            per_100g: NutrientsPer100g {
                calories: 165.0,
                protein: 31.0,
                carbs: 0.0,
                fats: 3.6,
                fiber: None,
                sugar: None,
                sodium: None,
            },
            metrics: FoodMetrics::default(),
            piece_weight: None,
            consumed_date: Some("2025-03-10".into()),
            consumed_at: None,
        }
    }

    #[test]
    fn test_add_in_grams() {
        let db = Database::in_memory().unwrap();
        let view = add_food_entry(&db, "u1", chicken(150.0, "g")).unwrap().unwrap();
        assert_eq!(view.entry.serving_unit, "g");
        assert_eq!(view.nutrition.unwrap().calories, 248.0);
    }

    #[test]
    fn test_pieces_without_weight_blocked() {
        let db = Database::in_memory().unwrap();
        let blocked = add_food_entry(&db, "u1", chicken(2.0, "pz")).unwrap().unwrap_err();
        assert!(blocked.blocked);
        assert_eq!(blocked.reason, "missing_piece_weight");

        let diary = get_diary(&db, "u1", Some("2025-03-10")).unwrap();
        assert_eq!(diary.totals.entry_count, 0);
    }

    #[test]
    fn test_pieces_with_override_normalized_to_grams() {
        let db = Database::in_memory().unwrap();
        let mut input = chicken(2.0, "pz");
        input.piece_weight = Some(120.0);
        let view = add_food_entry(&db, "u1", input).unwrap().unwrap();
        assert_eq!(view.entry.serving_size, 240.0);
        assert_eq!(view.entry.serving_unit, "g");
        assert_eq!(view.entry.metrics.grams_per_piece, Some(120.0));
        assert_eq!(view.grams, Some(240.0));
    }

    #[test]
    fn test_unknown_unit_blocked() {
        let db = Database::in_memory().unwrap();
        let blocked = add_food_entry(&db, "u1", chicken(1.0, "spoon")).unwrap().unwrap_err();
        assert_eq!(blocked.reason, "unknown_unit");
    }

    #[test]
    fn test_preview_matches_saved_entry() {
        let db = Database::in_memory().unwrap();
        let mut input = chicken(1.5, "cup");
        input.metrics.grams_per_cup = Some(140.0);
        let preview = preview_food_entry(&input).unwrap();
        let saved = add_food_entry(&db, "u1", input).unwrap().unwrap();
        assert_eq!(preview.grams, 210.0);
        assert_eq!(Some(preview.nutrition), saved.nutrition);
    }

    #[test]
    fn test_unknown_meal_blocked() {
        let db = Database::in_memory().unwrap();
        let mut input = chicken(100.0, "g");
        input.meal_id = Some(999);
        let blocked = add_food_entry(&db, "u1", input).unwrap().unwrap_err();
        assert_eq!(blocked.reason, "unknown_meal");
    }

    #[test]
    fn test_update_serving_reconverts() {
        let db = Database::in_memory().unwrap();
        let view = add_food_entry(&db, "u1", chicken(100.0, "g")).unwrap().unwrap();

        let blocked = update_food_entry(
            &db,
            "u1",
            view.entry.id,
            EntryChanges {
                serving_size: Some(3.0),
                serving_unit: Some("pz".into()),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap_err();
        assert_eq!(blocked.reason, "missing_piece_weight");

        let updated = update_food_entry(
            &db,
            "u1",
            view.entry.id,
            EntryChanges {
                serving_size: Some(3.0),
                serving_unit: Some("pz".into()),
                piece_weight: Some(50.0),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.entry.serving_size, 150.0);
        assert_eq!(updated.nutrition.unwrap().calories, 248.0);
    }

    #[test]
    fn test_update_replaces_all_nutrients() {
        let db = Database::in_memory().unwrap();
        let mut banana = chicken(100.0, "g");
        banana.food_name = "Banana".into();
        banana.per_100g = NutrientsPer100g {
            calories: 89.0,
            protein: 1.1,
            carbs: 22.8,
            fats: 0.3,
            fiber: Some(2.6),
            sugar: Some(12.2),
            sodium: Some(0.001),
        };
        let view = add_food_entry(&db, "u1", banana).unwrap().unwrap();

        let updated = update_food_entry(
            &db,
            "u1",
            view.entry.id,
            EntryChanges {
                food_name: Some("Petto di pollo".into()),
                per_100g: Some(chicken(100.0, "g").per_100g),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.entry.per_100g.fiber, None);
        assert_eq!(updated.entry.per_100g.sugar, None);
        assert_eq!(updated.entry.per_100g.sodium, None);

        let nutrition = updated.nutrition.unwrap();
        assert_eq!(nutrition.calories, 165.0);
        assert_eq!(nutrition.fiber, 0.0);
        assert_eq!(nutrition.sugar, 0.0);
    }

    #[test]
    fn test_update_unassigns_meal_and_clears_brand() {
        let db = Database::in_memory().unwrap();
        let meal_id = {
            let conn = db.get_conn().unwrap();
            Meal::create(&conn, "u1", "Lunch").unwrap().id
        };
        let mut input = chicken(100.0, "g");
        input.meal_id = Some(meal_id);
        input.brand = Some("Amadori".into());
        let view = add_food_entry(&db, "u1", input).unwrap().unwrap();

        let updated = update_food_entry(
            &db,
            "u1",
            view.entry.id,
            EntryChanges {
                meal_id: Some(None),
                brand: Some(None),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.entry.meal_id, None);
        assert_eq!(updated.entry.brand, None);

        let diary = get_diary(&db, "u1", Some("2025-03-10")).unwrap();
        let unassigned = diary.meals.iter().find(|m| m.meal_id.is_none()).unwrap();
        assert_eq!(unassigned.entries.len(), 1);
    }

    #[test]
    fn test_update_missing_entry_is_error() {
        let db = Database::in_memory().unwrap();
        assert!(update_food_entry(&db, "u1", 42, EntryChanges::default()).is_err());
    }

    #[test]
    fn test_diary_groups_by_meal() {
        let db = Database::in_memory().unwrap();
        let meals = {
            let conn = db.get_conn().unwrap();
            Meal::ensure_defaults(&conn, "u1").unwrap()
        };
        let lunch = meals.iter().find(|m| m.name == "Lunch").unwrap().id;

        let mut input = chicken(150.0, "g");
        input.meal_id = Some(lunch);
        add_food_entry(&db, "u1", input).unwrap().unwrap();
        add_food_entry(&db, "u1", chicken(100.0, "g")).unwrap().unwrap();
        let mut other_day = chicken(100.0, "g");
        other_day.consumed_date = Some("2025-03-11".into());
        add_food_entry(&db, "u1", other_day).unwrap().unwrap();

        let diary = get_diary(&db, "u1", Some("2025-03-10")).unwrap();
        assert_eq!(diary.totals.entry_count, 2);
        assert_eq!(diary.totals.nutrition.calories, 248.0 + 165.0);

        let lunch_section = diary.meals.iter().find(|s| s.meal_id == Some(lunch)).unwrap();
        assert_eq!(lunch_section.entries.len(), 1);
        assert_eq!(lunch_section.totals.nutrition.calories, 248.0);

        let unassigned = diary.meals.last().unwrap();
        assert_eq!(unassigned.meal_id, None);
        assert_eq!(unassigned.entries.len(), 1);
    }

    #[test]
    fn test_delete() {
        let db = Database::in_memory().unwrap();
        let view = add_food_entry(&db, "u1", chicken(100.0, "g")).unwrap().unwrap();
        assert!(delete_food_entry(&db, "u1", view.entry.id).unwrap().success);
        assert!(delete_food_entry(&db, "u1", view.entry.id).is_err());
    }

    #[test]
    fn test_invalid_date_is_error() {
        assert!(resolve_date(Some("10/03/2025")).is_err());
        assert_eq!(resolve_date(Some("2025-03-10")).unwrap(), "2025-03-10");
    }
}
