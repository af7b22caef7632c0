//! Display preferences

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    /// light, dark or system
    pub theme: String,
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferencesUpdate {
    pub theme: Option<String>,
    pub language: Option<String>,
}

impl UserPreferences {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            user_id: row.get("user_id")?,
            theme: row.get("theme")?,
            language: row.get("language")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get_or_create(conn: &Connection, user_id: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT OR IGNORE INTO user_preferences (user_id) VALUES (?1)",
            params![user_id],
        )?;

        let mut stmt = conn.prepare("SELECT * FROM user_preferences WHERE user_id = ?1")?;
        match stmt.query_row([user_id], Self::from_row) {
            Ok(prefs) => Ok(prefs),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(DbError::NotFound(format!("preferences {}", user_id)))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(
        conn: &Connection,
        user_id: &str,
        data: &UserPreferencesUpdate,
    ) -> DbResult<Self> {
        Self::get_or_create(conn, user_id)?;

        conn.execute(
            r#"
            UPDATE user_preferences SET
                theme = COALESCE(?1, theme),
                language = COALESCE(?2, language),
                updated_at = datetime('now')
            WHERE user_id = ?3
            "#,
            params![data.theme, data.language, user_id],
        )?;

        Self::get_or_create(conn, user_id)
    }
}
