//! Schema migrations

use rusqlite::Connection;

use super::connection::DbResult;

const SCHEMA_VERSION: i32 = 2;

/// Bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied migration");
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
        tracing::info!(version = 2, "applied migration");
    }

    Ok(())
}

/// v1: meals, food entries, profile, goals, preferences
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- Named, ordered groupings (breakfast, lunch, ...)
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            order_index INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meals_user ON meals(user_id, order_index);

        -- What was eaten. Nutrient totals are never stored, only per-100g values.
        CREATE TABLE food_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            meal_id INTEGER REFERENCES meals(id) ON DELETE SET NULL,
            food_name TEXT NOT NULL,
            brand TEXT,
            serving_size REAL NOT NULL DEFAULT 0,
            serving_unit TEXT NOT NULL DEFAULT 'g',

            calories_per_100g REAL NOT NULL DEFAULT 0,
            protein_per_100g REAL NOT NULL DEFAULT 0,
            carbs_per_100g REAL NOT NULL DEFAULT 0,
            fats_per_100g REAL NOT NULL DEFAULT 0,
            fiber_per_100g REAL,
            sugar_per_100g REAL,
            sodium_per_100g REAL,

            consumed_date TEXT NOT NULL,         -- ISO date: "2025-01-09"
            consumed_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_entries_user_date ON food_entries(user_id, consumed_date);
        CREATE INDEX idx_food_entries_meal ON food_entries(meal_id);

        CREATE TABLE profiles (
            user_id TEXT PRIMARY KEY,
            email TEXT,
            display_name TEXT,
            avatar_url TEXT,
            height REAL,                         -- cm
            weight REAL,                         -- kg
            age INTEGER,
            gender TEXT CHECK(gender IN ('male', 'female', 'other')),
            activity_level TEXT CHECK(activity_level IN (
                'sedentary', 'lightly_active', 'moderately_active', 'very_active', 'extremely_active'
            )),
            goal TEXT CHECK(goal IN ('lose_weight', 'maintain_weight', 'gain_weight')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE user_goals (
            user_id TEXT PRIMARY KEY,
            daily_calories REAL NOT NULL DEFAULT 2000,
            daily_protein REAL NOT NULL DEFAULT 150,
            daily_carbs REAL NOT NULL DEFAULT 250,
            daily_fats REAL NOT NULL DEFAULT 67,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE user_preferences (
            user_id TEXT PRIMARY KEY,
            theme TEXT NOT NULL DEFAULT 'system',
            language TEXT NOT NULL DEFAULT 'it',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// v2: unit-conversion metadata on food entries
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        ALTER TABLE food_entries ADD COLUMN serving_weight_grams REAL;  -- grams per piece
        ALTER TABLE food_entries ADD COLUMN grams_per_ml REAL;          -- density
        ALTER TABLE food_entries ADD COLUMN cup_grams REAL;
        "#,
    )?;

    Ok(())
}

/// Highest applied schema version, 0 for a fresh database
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
