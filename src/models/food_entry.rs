//! Food entry model
//!
//! A food logged on a date, optionally inside a meal. Only per-100g values and
//! the serving are stored; nutrition is derived on read.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::{calculate_nutrition, tag_to_grams, ConversionError, FoodMetrics};

use super::{NutrientsPer100g, Nutrition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: i64,
    pub user_id: String,
    pub meal_id: Option<i64>,
    pub food_name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    /// Unit tag: g, ml, pz, cup
    pub serving_unit: String,
    pub per_100g: NutrientsPer100g,
    pub metrics: FoodMetrics,
    pub consumed_date: String, // ISO date: "2025-01-09"
    pub consumed_at: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntryCreate {
    pub meal_id: Option<i64>,
    pub food_name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    pub per_100g: NutrientsPer100g,
    #[serde(default)]
    pub metrics: FoodMetrics,
    pub consumed_date: String,
    /// Defaults to now
    pub consumed_at: Option<String>,
}

/// Fields left `None` are unchanged. For nullable columns `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodEntryUpdate {
    pub meal_id: Option<Option<i64>>,
    pub food_name: Option<String>,
    pub brand: Option<Option<String>>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fats_per_100g: Option<f64>,
    pub fiber_per_100g: Option<Option<f64>>,
    pub sugar_per_100g: Option<Option<f64>>,
    pub sodium_per_100g: Option<Option<f64>>,
    pub serving_weight_grams: Option<f64>,
    pub grams_per_ml: Option<f64>,
    pub cup_grams: Option<f64>,
    pub consumed_date: Option<String>,
}

impl FoodEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            meal_id: row.get("meal_id")?,
            food_name: row.get("food_name")?,
            brand: row.get("brand")?,
            serving_size: row.get("serving_size")?,
            serving_unit: row.get("serving_unit")?,
            per_100g: NutrientsPer100g {
                calories: row.get("calories_per_100g")?,
                protein: row.get("protein_per_100g")?,
                carbs: row.get("carbs_per_100g")?,
                fats: row.get("fats_per_100g")?,
                fiber: row.get("fiber_per_100g")?,
                sugar: row.get("sugar_per_100g")?,
                sodium: row.get("sodium_per_100g")?,
            },
            metrics: FoodMetrics {
                grams_per_piece: row.get("serving_weight_grams")?,
                grams_per_ml: row.get("grams_per_ml")?,
                grams_per_cup: row.get("cup_grams")?,
            },
            consumed_date: row.get("consumed_date")?,
            consumed_at: row.get("consumed_at")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Stored serving resolved to grams
    pub fn grams(&self) -> Result<f64, ConversionError> {
        tag_to_grams(self.serving_size, &self.serving_unit, &self.metrics, None)
    }

    /// Nutrition consumed for this entry
    pub fn nutrition(&self) -> Result<Nutrition, ConversionError> {
        let grams = self.grams()?;
        Ok(calculate_nutrition(grams, &self.per_100g))
    }

    pub fn create(conn: &Connection, user_id: &str, data: &FoodEntryCreate) -> DbResult<Self> {
        let consumed_at = data
            .consumed_at
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));

        conn.execute(
            r#"
            INSERT INTO food_entries (
                user_id, meal_id, food_name, brand, serving_size, serving_unit,
                calories_per_100g, protein_per_100g, carbs_per_100g, fats_per_100g,
                fiber_per_100g, sugar_per_100g, sodium_per_100g,
                serving_weight_grams, grams_per_ml, cup_grams,
                consumed_date, consumed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                user_id,
                data.meal_id,
                data.food_name,
                data.brand,
                data.serving_size,
                data.serving_unit,
                data.per_100g.calories,
                data.per_100g.protein,
                data.per_100g.carbs,
                data.per_100g.fats,
                data.per_100g.fiber,
                data.per_100g.sugar,
                data.per_100g.sodium,
                data.metrics.grams_per_piece,
                data.metrics.grams_per_ml,
                data.metrics.grams_per_cup,
                data.consumed_date,
                consumed_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, user_id, id)?
            .ok_or_else(|| DbError::NotFound(format!("food entry {}", id)))
    }

    pub fn get_by_id(conn: &Connection, user_id: &str, id: i64) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM food_entries WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row(params![id, user_id], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries consumed on `date`, in the order they were eaten
    pub fn list_for_date(conn: &Connection, user_id: &str, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_entries
            WHERE user_id = ?1 AND consumed_date = ?2
            ORDER BY consumed_at, id
            "#,
        )?;

        let entries = stmt
            .query_map(params![user_id, date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Entries with `start <= consumed_date <= end`
    pub fn list_for_range(
        conn: &Connection,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_entries
            WHERE user_id = ?1 AND consumed_date >= ?2 AND consumed_date <= ?3
            ORDER BY consumed_date, consumed_at, id
            "#,
        )?;

        let entries = stmt
            .query_map(params![user_id, start, end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Latest entry for each distinct food (name + brand), newest first
    pub fn recent_distinct(conn: &Connection, user_id: &str, limit: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM food_entries
            WHERE id IN (
                SELECT MAX(id) FROM food_entries
                WHERE user_id = ?1
                GROUP BY lower(food_name), IFNULL(lower(brand), '')
            )
            ORDER BY consumed_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![user_id, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    pub fn update(
        conn: &Connection,
        user_id: &str,
        id: i64,
        data: &FoodEntryUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(meal_id, "meal_id");
        add_update!(food_name, "food_name");
        add_update!(brand, "brand");
        add_update!(serving_size, "serving_size");
        add_update!(serving_unit, "serving_unit");
        add_update!(calories_per_100g, "calories_per_100g");
        add_update!(protein_per_100g, "protein_per_100g");
        add_update!(carbs_per_100g, "carbs_per_100g");
        add_update!(fats_per_100g, "fats_per_100g");
        add_update!(fiber_per_100g, "fiber_per_100g");
        add_update!(sugar_per_100g, "sugar_per_100g");
        add_update!(sodium_per_100g, "sodium_per_100g");
        add_update!(serving_weight_grams, "serving_weight_grams");
        add_update!(grams_per_ml, "grams_per_ml");
        add_update!(cup_grams, "cup_grams");
        add_update!(consumed_date, "consumed_date");

        if updates.is_empty() {
            return Self::get_by_id(conn, user_id, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE food_entries SET {} WHERE id = ?{} AND user_id = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2
        );
        params_vec.push(Box::new(id));
        params_vec.push(Box::new(user_id.to_string()));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, user_id, id)
    }

    pub fn delete(conn: &Connection, user_id: &str, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM food_entries WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::Meal;

    /// Detached entry with only calories set
    pub(crate) fn entry_fixture(
        id: i64,
        date: &str,
        serving_size: f64,
        unit: &str,
        calories_per_100g: f64,
    ) -> FoodEntry {
        FoodEntry {
            id,
            user_id: "u1".into(),
            meal_id: None,
            food_name: format!("food {}", id),
            brand: None,
            serving_size,
            serving_unit: unit.into(),
            per_100g: NutrientsPer100g {
                calories: calories_per_100g,
                ..Default::default()
            },
            metrics: FoodMetrics::default(),
            consumed_date: date.into(),
            consumed_at: format!("{}T12:00:00Z", date),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create_data(name: &str, date: &str, grams: f64) -> FoodEntryCreate {
        FoodEntryCreate {
            meal_id: None,
            food_name: name.into(),
            brand: None,
            serving_size: grams,
            serving_unit: "g".into(),
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
            consumed_date: date.into(),
            consumed_at: None,
        }
    }

    #[test]
    fn test_create_and_derive_nutrition() {
        let conn = conn();
        let entry = FoodEntry::create(&conn, "u1", &create_data("Chicken", "2025-03-10", 150.0))
            .unwrap();
        assert_eq!(entry.per_100g.fiber, None);
        let n = entry.nutrition().unwrap();
        assert_eq!(n.calories, 248.0);
        assert_eq!(n.protein, 46.5);
        assert!(!entry.consumed_at.is_empty());
    }

    #[test]
    fn test_list_for_date_and_range() {
        let conn = conn();
        FoodEntry::create(&conn, "u1", &create_data("A", "2025-03-10", 100.0)).unwrap();
        FoodEntry::create(&conn, "u1", &create_data("B", "2025-03-11", 100.0)).unwrap();
        FoodEntry::create(&conn, "u2", &create_data("C", "2025-03-10", 100.0)).unwrap();

        let day = FoodEntry::list_for_date(&conn, "u1", "2025-03-10").unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].food_name, "A");

        let range = FoodEntry::list_for_range(&conn, "u1", "2025-03-01", "2025-03-31").unwrap();
        assert_eq!(range.len(), 2);
    }

    #[test]
    fn test_update_partial() {
        let conn = conn();
        let entry =
            FoodEntry::create(&conn, "u1", &create_data("A", "2025-03-10", 100.0)).unwrap();
        let updated = FoodEntry::update(
            &conn,
            "u1",
            entry.id,
            &FoodEntryUpdate {
                serving_size: Some(200.0),
                fiber_per_100g: Some(Some(1.5)),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.serving_size, 200.0);
        assert_eq!(updated.per_100g.fiber, Some(1.5));
        assert_eq!(updated.food_name, "A");
    }

    #[test]
    fn test_update_clears_nullable_columns() {
        let conn = conn();
        let meal = Meal::create(&conn, "u1", "Lunch").unwrap();
        let mut data = create_data("A", "2025-03-10", 100.0);
        data.meal_id = Some(meal.id);
        data.brand = Some("Acme".into());
        data.per_100g.sugar = Some(4.0);
        let entry = FoodEntry::create(&conn, "u1", &data).unwrap();

        let updated = FoodEntry::update(
            &conn,
            "u1",
            entry.id,
            &FoodEntryUpdate {
                meal_id: Some(None),
                brand: Some(None),
                sugar_per_100g: Some(None),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.meal_id, None);
        assert_eq!(updated.brand, None);
        assert_eq!(updated.per_100g.sugar, None);
        assert_eq!(updated.serving_size, 100.0);
    }

    #[test]
    fn test_update_other_user_is_noop() {
        let conn = conn();
        let entry =
            FoodEntry::create(&conn, "u1", &create_data("A", "2025-03-10", 100.0)).unwrap();
        let result = FoodEntry::update(
            &conn,
            "u2",
            entry.id,
            &FoodEntryUpdate {
                serving_size: Some(1.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(result.is_none());
        let unchanged = FoodEntry::get_by_id(&conn, "u1", entry.id).unwrap().unwrap();
        assert_eq!(unchanged.serving_size, 100.0);
    }

    #[test]
    fn test_deleting_meal_keeps_entries() {
        let conn = conn();
        let meal = Meal::create(&conn, "u1", "Lunch").unwrap();
        let mut data = create_data("A", "2025-03-10", 100.0);
        data.meal_id = Some(meal.id);
        let entry = FoodEntry::create(&conn, "u1", &data).unwrap();

        assert!(Meal::delete(&conn, "u1", meal.id).unwrap());
        let entry = FoodEntry::get_by_id(&conn, "u1", entry.id).unwrap().unwrap();
        assert_eq!(entry.meal_id, None);
    }

    #[test]
    fn test_recent_distinct() {
        let conn = conn();
        FoodEntry::create(&conn, "u1", &create_data("Oats", "2025-03-10", 50.0)).unwrap();
        FoodEntry::create(&conn, "u1", &create_data("oats", "2025-03-11", 60.0)).unwrap();
        FoodEntry::create(&conn, "u1", &create_data("Banana", "2025-03-11", 120.0)).unwrap();

        let recent = FoodEntry::recent_distinct(&conn, "u1", 10).unwrap();
        assert_eq!(recent.len(), 2);
        let oats = recent.iter().find(|e| e.food_name.eq_ignore_ascii_case("oats")).unwrap();
        assert_eq!(oats.serving_size, 60.0);
    }

    #[test]
    fn test_delete() {
        let conn = conn();
        let entry =
            FoodEntry::create(&conn, "u1", &create_data("A", "2025-03-10", 100.0)).unwrap();
        assert!(FoodEntry::delete(&conn, "u1", entry.id).unwrap());
        assert!(!FoodEntry::delete(&conn, "u1", entry.id).unwrap());
    }
}
