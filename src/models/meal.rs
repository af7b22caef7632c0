//! Meal model
//!
//! Named, ordered groupings of food entries (breakfast, lunch, ...).

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Meals created for a user that has none yet
pub const DEFAULT_MEALS: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snacks"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub order_index: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealUpdate {
    pub name: Option<String>,
    pub order_index: Option<i64>,
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            order_index: row.get("order_index")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Append a meal after the user's existing ones
    pub fn create(conn: &Connection, user_id: &str, name: &str) -> DbResult<Self> {
        let order_index = Self::count(conn, user_id)?;
        conn.execute(
            "INSERT INTO meals (user_id, name, order_index) VALUES (?1, ?2, ?3)",
            params![user_id, name, order_index],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, user_id, id)?
            .ok_or_else(|| DbError::NotFound(format!("meal {}", id)))
    }

    pub fn get_by_id(conn: &Connection, user_id: &str, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1 AND user_id = ?2")?;

        match stmt.query_row(params![id, user_id], Self::from_row) {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All of a user's meals in display order
    pub fn list(conn: &Connection, user_id: &str) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM meals WHERE user_id = ?1 ORDER BY order_index, id")?;

        let meals = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    pub fn count(conn: &Connection, user_id: &str) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meals WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Create the default meals if the user has none. Returns the user's meals.
    pub fn ensure_defaults(conn: &Connection, user_id: &str) -> DbResult<Vec<Self>> {
        if Self::count(conn, user_id)? == 0 {
            for name in DEFAULT_MEALS {
                Self::create(conn, user_id, name)?;
            }
            tracing::info!(user_id, "created default meals");
        }
        Self::list(conn, user_id)
    }

    pub fn update(
        conn: &Connection,
        user_id: &str,
        id: i64,
        data: &MealUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(order_index) = data.order_index {
            updates.push(format!("order_index = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(order_index));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, user_id, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE meals SET {} WHERE id = ?{} AND user_id = ?{}",
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

    /// Delete a meal. Its entries stay in the diary without a meal.
    pub fn delete(conn: &Connection, user_id: &str, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM meals WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_appends_in_order() {
        let conn = conn();
        let a = Meal::create(&conn, "u1", "Breakfast").unwrap();
        let b = Meal::create(&conn, "u1", "Lunch").unwrap();
        assert_eq!(a.order_index, 0);
        assert_eq!(b.order_index, 1);

        let names: Vec<_> = Meal::list(&conn, "u1")
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Breakfast", "Lunch"]);
    }

    #[test]
    fn test_ensure_defaults_only_once() {
        let conn = conn();
        let meals = Meal::ensure_defaults(&conn, "u1").unwrap();
        assert_eq!(meals.len(), DEFAULT_MEALS.len());
        let again = Meal::ensure_defaults(&conn, "u1").unwrap();
        assert_eq!(again.len(), DEFAULT_MEALS.len());
    }

    #[test]
    fn test_scoped_by_user() {
        let conn = conn();
        let meal = Meal::create(&conn, "u1", "Brunch").unwrap();
        assert!(Meal::get_by_id(&conn, "u2", meal.id).unwrap().is_none());
        assert!(!Meal::delete(&conn, "u2", meal.id).unwrap());
        assert!(Meal::list(&conn, "u2").unwrap().is_empty());
    }

    #[test]
    fn test_update_reorders() {
        let conn = conn();
        let meal = Meal::create(&conn, "u1", "Snack").unwrap();
        let updated = Meal::update(
            &conn,
            "u1",
            meal.id,
            &MealUpdate {
                name: Some("Afternoon snack".into()),
                order_index: Some(5),
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.name, "Afternoon snack");
        assert_eq!(updated.order_index, 5);
    }
}
