//! Goal progress for a day, a week and a month

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{round_to, FoodEntry, Nutrition};

use super::aggregate::{totals_for_range, Totals};

/// Daily macro targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Share of `target` reached by `current`, as a percentage in [0, 100].
///
/// A target that is zero, negative or not finite yields 0.
pub fn percent_of_goal(current: f64, target: f64) -> f64 {
    if !target.is_finite() || target <= 0.0 || !current.is_finite() {
        return 0.0;
    }
    (current / target * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub current: f64,
    pub target: f64,
    pub percentage: f64,
}

impl MacroProgress {
    fn new(current: f64, target: f64) -> Self {
        Self {
            current,
            target,
            percentage: round_to(percent_of_goal(current, target), 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutritionProgress {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fats: MacroProgress,
}

impl NutritionProgress {
    pub fn new(current: &Nutrition, daily: &MacroTargets, days: f64) -> Self {
        Self {
            calories: MacroProgress::new(current.calories, daily.calories * days),
            protein: MacroProgress::new(current.protein, daily.protein * days),
            carbs: MacroProgress::new(current.carbs, daily.carbs * days),
            fats: MacroProgress::new(current.fats, daily.fats * days),
        }
    }
}

/// Window a progress figure is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    /// ISO week, Monday to Sunday
    Week,
    /// Calendar month
    Month,
}

impl Period {
    /// Inclusive date bounds of the period containing `anchor`
    pub fn bounds(&self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Day => (anchor, anchor),
            Period::Week => {
                let start =
                    anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
                (start, start + Duration::days(6))
            }
            Period::Month => {
                let start = anchor.with_day(1).unwrap_or(anchor);
                let next_month = if anchor.month() == 12 {
                    NaiveDate::from_ymd_opt(anchor.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(anchor.year(), anchor.month() + 1, 1)
                };
                let end = next_month
                    .and_then(|d| d.pred_opt())
                    .unwrap_or(anchor);
                (start, end)
            }
        }
    }

    /// How many daily targets make up the period target
    pub fn target_days(&self) -> f64 {
        match self {
            Period::Day => 1.0,
            Period::Week => 7.0,
            Period::Month => 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub start: String,
    pub end: String,
    pub totals: Totals,
    pub progress: NutritionProgress,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodProgress {
    pub daily: PeriodSummary,
    pub weekly: PeriodSummary,
    pub monthly: PeriodSummary,
}

fn summarize(
    entries: &[FoodEntry],
    period: Period,
    anchor: NaiveDate,
    targets: &MacroTargets,
) -> PeriodSummary {
    let (start, end) = period.bounds(anchor);
    let start = start.format("%Y-%m-%d").to_string();
    let end = end.format("%Y-%m-%d").to_string();
    let totals = totals_for_range(entries, &start, &end);
    let progress = NutritionProgress::new(&totals.nutrition, targets, period.target_days());

    PeriodSummary {
        start,
        end,
        totals,
        progress,
    }
}

/// Daily, weekly and monthly progress around `anchor`.
///
/// `entries` should cover at least the union of the week and month containing
/// `anchor`; entries outside a period are ignored for that period.
pub fn period_progress(
    entries: &[FoodEntry],
    anchor: NaiveDate,
    targets: &MacroTargets,
) -> PeriodProgress {
    PeriodProgress {
        daily: summarize(entries, Period::Day, anchor, targets),
        weekly: summarize(entries, Period::Week, anchor, targets),
        monthly: summarize(entries, Period::Month, anchor, targets),
    }
}

/// Widest date span needed to compute [`period_progress`] for `anchor`
pub fn progress_window(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (week_start, week_end) = Period::Week.bounds(anchor);
    let (month_start, month_end) = Period::Month.bounds(anchor);
    (week_start.min(month_start), week_end.max(month_end))
}
