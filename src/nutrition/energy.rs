//! Daily energy estimate from body metrics
//!
//! Mifflin-St Jeor BMR, an activity multiplier, and a goal adjustment.

use serde::Serialize;

use crate::models::{ActivityLevel, Gender, Profile, WeightGoal};

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtremelyActive => 1.9,
        }
    }
}

impl WeightGoal {
    /// kcal added to maintenance
    pub fn adjustment(&self) -> f64 {
        match self {
            WeightGoal::LoseWeight => -500.0,
            WeightGoal::MaintainWeight => 0.0,
            WeightGoal::GainWeight => 300.0,
        }
    }
}

/// Basal metabolic rate in kcal/day
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    let offset = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
        Gender::Other => (5.0 - 161.0) / 2.0,
    };
    base + offset
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyEstimate {
    pub bmr: f64,
    pub maintenance_calories: f64,
    pub daily_calories: f64,
    pub activity_level: ActivityLevel,
    pub goal: WeightGoal,
}

/// Estimate daily calories for a profile.
///
/// Weight, height and age are required; gender defaults to `other`,
/// activity to sedentary and the goal to maintenance. On failure the names
/// of the missing fields are returned.
pub fn estimate_daily_calories(profile: &Profile) -> Result<EnergyEstimate, Vec<&'static str>> {
    let mut missing = Vec::new();
    let weight = profile.weight.filter(|w| *w > 0.0);
    let height = profile.height.filter(|h| *h > 0.0);
    let age = profile.age.filter(|a| *a > 0);

    if weight.is_none() {
        missing.push("weight");
    }
    if height.is_none() {
        missing.push("height");
    }
    if age.is_none() {
        missing.push("age");
    }

    let (Some(weight), Some(height), Some(age)) = (weight, height, age) else {
        return Err(missing);
    };

    let gender = profile.gender.unwrap_or(Gender::Other);
    let activity_level = profile.activity_level.unwrap_or(ActivityLevel::Sedentary);
    let goal = profile.goal.unwrap_or(WeightGoal::MaintainWeight);

    let bmr = bmr(weight, height, age, gender);
    let maintenance = bmr * activity_level.multiplier();
    let daily = (maintenance + goal.adjustment()).max(0.0);

    Ok(EnergyEstimate {
        bmr: bmr.round(),
        maintenance_calories: maintenance.round(),
        daily_calories: daily.round(),
        activity_level,
        goal,
    })
}
