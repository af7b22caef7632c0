//! Daily nutrition goals

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::MacroTargets;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserGoals {
    pub user_id: String,
    pub daily_calories: f64,
    pub daily_protein: f64,
    pub daily_carbs: f64,
    pub daily_fats: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserGoalsUpdate {
    pub daily_calories: Option<f64>,
    pub daily_protein: Option<f64>,
    pub daily_carbs: Option<f64>,
    pub daily_fats: Option<f64>,
}

impl UserGoals {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            daily_calories: row.get("daily_calories")?,
            daily_protein: row.get("daily_protein")?,
            daily_carbs: row.get("daily_carbs")?,
            daily_fats: row.get("daily_fats")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn targets(&self) -> MacroTargets {
        MacroTargets {
            calories: self.daily_calories,
            protein: self.daily_protein,
            carbs: self.daily_carbs,
            fats: self.daily_fats,
        }
    }

    /// Goals for the user, inserting the defaults on first access
    pub fn get_or_create(conn: &Connection, user_id: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT OR IGNORE INTO user_goals (user_id) VALUES (?1)",
            params![user_id],
        )?;

        let mut stmt = conn.prepare("SELECT * FROM user_goals WHERE user_id = ?1")?;
        match stmt.query_row([user_id], Self::from_row) {
            Ok(goals) => Ok(goals),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DbError::NotFound(format!("goals {}", user_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(conn: &Connection, user_id: &str, data: &UserGoalsUpdate) -> DbResult<Self> {
        Self::get_or_create(conn, user_id)?;

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        for (col, val) in [
            ("daily_calories", data.daily_calories),
            ("daily_protein", data.daily_protein),
            ("daily_carbs", data.daily_carbs),
            ("daily_fats", data.daily_fats),
        ] {
            if let Some(v) = val {
                updates.push(format!("{} = ?{}", col, params_vec.len() + 1));
                params_vec.push(Box::new(v));
            }
        }

        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')".to_string());
            let sql = format!(
                "UPDATE user_goals SET {} WHERE user_id = ?{}",
                updates.join(", "),
                params_vec.len() + 1
            );
            params_vec.push(Box::new(user_id.to_string()));

            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|p| p.as_ref()).collect();
            conn.execute(&sql, params_refs.as_slice())?;
        }

        Self::get_or_create(conn, user_id)
    }
}
