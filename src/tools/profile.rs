//! Profile and preference tools

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    Profile, ProfileUpdate, UserGoals, UserGoalsUpdate, UserPreferences, UserPreferencesUpdate,
};
use crate::nutrition::{estimate_daily_calories, EnergyEstimate};

const THEMES: [&str; 3] = ["light", "dark", "system"];

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub estimate: Option<EnergyEstimate>,
    /// Profile fields needed before an estimate can be made
    pub missing_fields: Vec<String>,
    pub applied: bool,
    pub goals: Option<UserGoals>,
}

pub fn get_profile(db: &Database, user_id: &str) -> Result<Option<Profile>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Profile::get(&conn, user_id).map_err(|e| format!("Failed to load profile: {}", e))
}

pub fn update_profile(
    db: &Database,
    user_id: &str,
    data: ProfileUpdate,
) -> Result<Profile, String> {
    if let Some(h) = data.height {
        if !h.is_finite() || h <= 0.0 || h > 300.0 {
            return Err("height must be between 0 and 300 cm".to_string());
        }
    }
    if let Some(w) = data.weight {
        if !w.is_finite() || w <= 0.0 || w > 700.0 {
            return Err("weight must be between 0 and 700 kg".to_string());
        }
    }
    if let Some(age) = data.age {
        if age == 0 || age > 130 {
            return Err("age must be between 1 and 130".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::upsert(&conn, user_id, &data)
        .map_err(|e| format!("Failed to update profile: {}", e))?;

    tracing::info!(user_id, "profile updated");
    Ok(profile)
}

pub fn get_preferences(db: &Database, user_id: &str) -> Result<UserPreferences, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserPreferences::get_or_create(&conn, user_id)
        .map_err(|e| format!("Failed to load preferences: {}", e))
}

pub fn update_preferences(
    db: &Database,
    user_id: &str,
    data: UserPreferencesUpdate,
) -> Result<UserPreferences, String> {
    let theme = data.theme.map(|t| t.trim().to_lowercase());
    if let Some(ref t) = theme {
        if !THEMES.contains(&t.as_str()) {
            return Err(format!("theme must be one of: {}", THEMES.join(", ")));
        }
    }
    let language = data.language.map(|l| l.trim().to_lowercase());
    if language.as_deref() == Some("") {
        return Err("language cannot be empty".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    UserPreferences::update(&conn, user_id, &UserPreferencesUpdate { theme, language })
        .map_err(|e| format!("Failed to update preferences: {}", e))
}

/// Estimate daily calories from the profile. With `apply`, the estimate
/// becomes the daily calorie goal.
pub fn estimate_calories(
    db: &Database,
    user_id: &str,
    apply: bool,
) -> Result<EstimateResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let profile = Profile::get(&conn, user_id)
        .map_err(|e| format!("Failed to load profile: {}", e))?;

    let Some(profile) = profile else {
        return Ok(EstimateResponse {
            estimate: None,
            missing_fields: vec!["weight".into(), "height".into(), "age".into()],
            applied: false,
            goals: None,
        });
    };

    let estimate = match estimate_daily_calories(&profile) {
        Ok(estimate) => estimate,
        Err(missing) => {
            return Ok(EstimateResponse {
                estimate: None,
                missing_fields: missing.into_iter().map(String::from).collect(),
                applied: false,
                goals: None,
            });
        }
    };

    let goals = if apply {
        let goals = UserGoals::update(
            &conn,
            user_id,
            &UserGoalsUpdate {
                daily_calories: Some(estimate.daily_calories),
                ..Default::default()
            },
        )
        .map_err(|e| format!("Failed to update goals: {}", e))?;
        tracing::info!(daily_calories = estimate.daily_calories, "calorie goal set from estimate");
        Some(goals)
    } else {
        None
    };

    Ok(EstimateResponse {
        estimate: Some(estimate),
        missing_fields: Vec::new(),
        applied: apply,
        goals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender, WeightGoal};

    #[test]
    fn test_estimate_without_profile() {
        let db = Database::in_memory().unwrap();
        let response = estimate_calories(&db, "u1", true).unwrap();
        assert!(response.estimate.is_none());
        assert_eq!(response.missing_fields, vec!["weight", "height", "age"]);
        assert!(!response.applied);
    }

    #[test]
    fn test_estimate_applied_to_goals() {
        let db = Database::in_memory().unwrap();
        update_profile(
            &db,
            "u1",
            ProfileUpdate {
                height: Some(180.0),
                weight: Some(80.0),
                age: Some(30),
                gender: Some(Gender::Male),
                activity_level: Some(ActivityLevel::ModeratelyActive),
                goal: Some(WeightGoal::LoseWeight),
                ..Default::default()
            },
        )
        .unwrap();

        let preview = estimate_calories(&db, "u1", false).unwrap();
        assert_eq!(preview.estimate.as_ref().unwrap().daily_calories, 2259.0);
        assert!(preview.goals.is_none());

        let applied = estimate_calories(&db, "u1", true).unwrap();
        assert_eq!(applied.goals.unwrap().daily_calories, 2259.0);
    }

    #[test]
    fn test_update_profile_validates() {
        let db = Database::in_memory().unwrap();
        let result = update_profile(
            &db,
            "u1",
            ProfileUpdate {
                age: Some(0),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert!(get_profile(&db, "u1").unwrap().is_none());
    }

    #[test]
    fn test_preferences() {
        let db = Database::in_memory().unwrap();
        assert_eq!(get_preferences(&db, "u1").unwrap().theme, "system");
        let prefs = update_preferences(
            &db,
            "u1",
            UserPreferencesUpdate {
                theme: Some("Dark".into()),
                language: Some("en".into()),
            },
        )
        .unwrap();
        assert_eq!(prefs.theme, "dark");
        assert_eq!(prefs.language, "en");

        assert!(update_preferences(
            &db,
            "u1",
            UserPreferencesUpdate {
                theme: Some("neon".into()),
                language: None,
            },
        )
        .is_err());
    }
}
