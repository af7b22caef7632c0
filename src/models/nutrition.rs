//! Shared nutrition value types
//!
//! `NutrientsPer100g` is what gets stored; `Nutrition` is always derived.

use serde::{Deserialize, Serialize};

/// Nutrient values per 100 grams of a food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientsPer100g {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fats: f64,    // grams
    #[serde(default)]
    pub fiber: Option<f64>, // grams
    #[serde(default)]
    pub sugar: Option<f64>, // grams
    #[serde(default)]
    pub sodium: Option<f64>, // grams
}

/// Consumed nutrition for an entry, a meal, or a period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl Nutrition {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fats: self.fats + other.fats,
            fiber: self.fiber + other.fiber,
            sugar: self.sugar + other.sugar,
            sodium: self.sodium + other.sodium,
        }
    }

    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fats: self.fats * multiplier,
            fiber: self.fiber * multiplier,
            sugar: self.sugar * multiplier,
            sodium: self.sodium * multiplier,
        }
    }

    /// Display rounding: whole calories, one decimal for everything else
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: round_to(self.protein, 1),
            carbs: round_to(self.carbs, 1),
            fats: round_to(self.fats, 1),
            fiber: round_to(self.fiber, 1),
            sugar: round_to(self.sugar, 1),
            sodium: round_to(self.sodium, 1),
        }
    }
}

/// The nutrition of exactly 100 g; missing optionals count as zero
impl From<&NutrientsPer100g> for Nutrition {
    fn from(per_100g: &NutrientsPer100g) -> Self {
        Self {
            calories: per_100g.calories,
            protein: per_100g.protein,
            carbs: per_100g.carbs,
            fats: per_100g.fats,
            fiber: per_100g.fiber.unwrap_or(0.0),
            sugar: per_100g.sugar.unwrap_or(0.0),
            sodium: per_100g.sodium.unwrap_or(0.0),
        }
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}
