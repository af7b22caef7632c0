//! Service status and usage guide

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info;

/// How to log food with these tools, for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# Nutrilog Food Logging Guide

## Workflow

1. Find the food: `search_foods` (remote with local fallback), `recent_foods`
   or `popular_foods`. Every result carries per-100g values.
2. Check the numbers: `preview_food_entry` converts the serving and returns
   grams plus nutrition without saving anything.
3. Save: `add_food_entry` with the same input. Pass `meal_id` from
   `list_meals` to file it under a meal.
4. Read back: `get_diary` for a day, `get_progress` for day/week/month
   progress against the goals.

## Units

| Tag   | Meaning      | Conversion                                         |
|-------|--------------|----------------------------------------------------|
| `g`   | grams        | as given                                           |
| `ml`  | milliliters  | × `metrics.grams_per_ml`, else 1 g/ml              |
| `pz`  | pieces       | × `metrics.grams_per_piece`, else `piece_weight`   |
| `cup` | cups         | × `metrics.grams_per_cup`, else 240 g              |

Pieces are never guessed. Without a piece weight the entry is **blocked**:

```json
{ "blocked": true, "reason": "missing_piece_weight", "prompt": "How many grams does one piece weigh? ..." }
```

Ask the user, then retry with `piece_weight` or switch to grams.

Saved entries are always stored in grams (`serving_unit: "g"`). A
`piece_weight` you supplied is remembered on the entry and shows up again
in `recent_foods`.

## Other blocked reasons

- `unknown_unit`: use one of g, ml, pz, cup
- `invalid_quantity`: serving must be greater than zero
- `invalid_nutrients`: per-100g values must be non-negative
- `unknown_meal`: the meal id does not exist
- `missing_name`: the food needs a name

## Search

- Queries under 2 characters return `too_short`.
- `superseded` means a newer search replaced this one; use the newer result.
- `origin: local` with a `notice` means the food service was unreachable and
  the bundled table was searched instead. Tell the user; nothing is retried.

## Goals

- Defaults: 2000 kcal, 150 g protein, 250 g carbs, 67 g fats per day.
- Weekly targets are 7× daily (Monday to Sunday), monthly 30× daily.
- Percentages are capped at 100.
- `estimate_daily_calories` needs weight, height and age in the profile;
  with `apply: true` it sets the daily calorie goal.

## Notes

- Dates are YYYY-MM-DD and default to today.
- Deleting a meal keeps its entries; they show as "Unassigned" in the diary.
- `update_food_entry` with `unassign_meal: true` moves an entry to "Unassigned";
  `clear_brand: true` removes its brand.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct NutrilogStatus {
    pub version: String,
    pub build_timestamp: &'static str,

    pub user_id: String,
    pub food_api_url: String,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    user_id: String,
    food_api_url: String,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, user_id: String, food_api_url: String) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            user_id,
            food_api_url,
        }
    }

    pub fn get_status(&self) -> NutrilogStatus {
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutrilogStatus {
            version: build_info::version_label(),
            build_timestamp: build_info::BUILD_TIMESTAMP,
            user_id: self.user_id.clone(),
            food_api_url: self.food_api_url.clone(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_without_database_file() {
        let tracker = StatusTracker::new(
            PathBuf::from("/nonexistent/nutrilog.db"),
            "u1".into(),
            "http://localhost".into(),
        );
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.user_id, "u1");
    }

    #[test]
    fn test_instructions_cover_units() {
        for tag in ["`g`", "`ml`", "`pz`", "`cup`", "missing_piece_weight"] {
            assert!(LOGGING_INSTRUCTIONS.contains(tag), "missing {}", tag);
        }
    }
}
