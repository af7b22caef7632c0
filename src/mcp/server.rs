//! Nutrilog MCP server
//!
//! Registers every tool and adapts parameters to the tool functions.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::Database;
use crate::lookup::{FoodSearch, FoodSource};
use crate::models::{
    ActivityLevel, Gender, MealUpdate, NutrientsPer100g, ProfileUpdate, UserGoalsUpdate,
    UserPreferencesUpdate, WeightGoal,
};
use crate::nutrition::FoodMetrics;
use crate::tools::diary::{self, EntryChanges, EntryInput};
use crate::tools::status::StatusTracker;
use crate::tools::{foods, goals, meals, profile};

#[derive(Clone)]
pub struct NutrilogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    user_id: Arc<str>,
    food_search: Arc<FoodSearch>,
    tool_router: ToolRouter<NutrilogService>,
}

impl NutrilogService {
    pub fn new(config: &Config, database: Database, source: Arc<dyn FoodSource>) -> Self {
        let tracker = StatusTracker::new(
            config.database_path.clone(),
            config.user_id.clone(),
            config.food_api_url.clone(),
        );

        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            database,
            user_id: Arc::from(config.user_id.as_str()),
            food_search: Arc::new(FoodSearch::new(source, config.search_debounce)),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_enum<T>(value: Option<String>, field: &str, parse: fn(&str) -> Option<T>) -> Result<Option<T>, McpError> {
    match value {
        None => Ok(None),
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| McpError::invalid_params(format!("Invalid {}: '{}'", field, s), None)),
    }
}

// ============================================================================
// Diary Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodEntryParams {
    pub food_name: String,
    pub brand: Option<String>,
    /// Quantity in `serving_unit`
    pub serving_size: f64,
    /// g, ml, pz (pieces) or cup
    #[serde(default = "default_unit")]
    pub serving_unit: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fats_per_100g: f64,
    pub fiber_per_100g: Option<f64>,
    pub sugar_per_100g: Option<f64>,
    pub sodium_per_100g: Option<f64>,
    /// Known weight of one piece of this food
    pub serving_weight_grams: Option<f64>,
    pub grams_per_ml: Option<f64>,
    pub cup_grams: Option<f64>,
    /// User-supplied grams per piece when the food has none
    pub piece_weight: Option<f64>,
    pub meal_id: Option<i64>,
    /// YYYY-MM-DD, defaults to today
    pub consumed_date: Option<String>,
    /// ISO timestamp, defaults to now
    pub consumed_at: Option<String>,
}

fn default_unit() -> String { "g".to_string() }

impl From<FoodEntryParams> for EntryInput {
    fn from(p: FoodEntryParams) -> Self {
        EntryInput {
            meal_id: p.meal_id,
            food_name: p.food_name,
            brand: p.brand,
            serving_size: p.serving_size,
            serving_unit: p.serving_unit,
            per_100g: NutrientsPer100g {
                calories: p.calories_per_100g,
                protein: p.protein_per_100g,
                carbs: p.carbs_per_100g,
                fats: p.fats_per_100g,
                fiber: p.fiber_per_100g,
                sugar: p.sugar_per_100g,
                sodium: p.sodium_per_100g,
            },
            metrics: FoodMetrics {
                grams_per_piece: p.serving_weight_grams,
                grams_per_ml: p.grams_per_ml,
                grams_per_cup: p.cup_grams,
            },
            piece_weight: p.piece_weight,
            consumed_date: p.consumed_date,
            consumed_at: p.consumed_at,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodEntryParams {
    pub id: i64,
    pub food_name: Option<String>,
    pub brand: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_unit: Option<String>,
    pub piece_weight: Option<f64>,
    pub meal_id: Option<i64>,
    /// Move the entry out of its meal
    pub unassign_meal: Option<bool>,
    /// Remove the brand
    pub clear_brand: Option<bool>,
    pub consumed_date: Option<String>,
    /// Replace the per-100g values; all four macros are required together.
    /// Fiber, sugar and sodium left out are cleared.
    pub calories_per_100g: Option<f64>,
    pub protein_per_100g: Option<f64>,
    pub carbs_per_100g: Option<f64>,
    pub fats_per_100g: Option<f64>,
    pub fiber_per_100g: Option<f64>,
    pub sugar_per_100g: Option<f64>,
    pub sodium_per_100g: Option<f64>,
}

impl UpdateFoodEntryParams {
    fn per_100g(&self) -> Result<Option<NutrientsPer100g>, McpError> {
        let macros = [
            self.calories_per_100g,
            self.protein_per_100g,
            self.carbs_per_100g,
            self.fats_per_100g,
        ];
        let any_nutrient = macros.iter().any(Option::is_some)
            || self.fiber_per_100g.is_some()
            || self.sugar_per_100g.is_some()
            || self.sodium_per_100g.is_some();

        if !any_nutrient {
            return Ok(None);
        }

        match macros {
            [Some(calories), Some(protein), Some(carbs), Some(fats)] => Ok(Some(NutrientsPer100g {
                calories,
                protein,
                carbs,
                fats,
                fiber: self.fiber_per_100g,
                sugar: self.sugar_per_100g,
                sodium: self.sodium_per_100g,
            })),
            _ => Err(McpError::invalid_params(
                "calories, protein, carbs and fats per 100g must be given together",
                None,
            )),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddMealParams {
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealParams {
    pub id: i64,
    pub name: Option<String>,
    pub order_index: Option<i64>,
}

// ============================================================================
// Goal / Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalsParams {
    pub daily_calories: Option<f64>,
    pub daily_protein: Option<f64>,
    pub daily_carbs: Option<f64>,
    pub daily_fats: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateProfileParams {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// cm
    pub height: Option<f64>,
    /// kg
    pub weight: Option<f64>,
    pub age: Option<u32>,
    /// male, female or other
    pub gender: Option<String>,
    /// sedentary, lightly_active, moderately_active, very_active, extremely_active
    pub activity_level: Option<String>,
    /// lose_weight, maintain_weight or gain_weight
    pub goal: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePreferencesParams {
    /// light, dark or system
    pub theme: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimateCaloriesParams {
    /// Write the estimate into the daily calorie goal
    #[serde(default)]
    pub apply: bool,
}

// ============================================================================
// Food Lookup Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecentFoodsParams {
    pub limit: Option<i64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutrilogService {
    // --- Status ---

    #[tool(description = "Get the current status of the nutrilog service including build info, database status, and process information")]
    async fn nutrilog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        json_result(&tracker.get_status())
    }

    #[tool(description = "Get the food logging guide: units, piece weights, blocked responses and goals. Call this when starting a logging session.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    // --- Diary ---

    #[tool(description = "Log a food. The serving is converted to grams before saving; servings in pieces without a known piece weight are blocked and ask for one.")]
    fn add_food_entry(&self, Parameters(p): Parameters<FoodEntryParams>) -> Result<CallToolResult, McpError> {
        let result = diary::add_food_entry(&self.database, &self.user_id, p.into())
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(entry) => json_result(&entry),
            Err(blocked) => json_result(&blocked),
        }
    }

    #[tool(description = "Compute grams and nutrition for a serving without saving it")]
    fn preview_food_entry(&self, Parameters(p): Parameters<FoodEntryParams>) -> Result<CallToolResult, McpError> {
        match diary::preview_food_entry(&p.into()) {
            Ok(preview) => json_result(&preview),
            Err(blocked) => json_result(&blocked),
        }
    }

    #[tool(description = "Update a food entry. A new serving size or unit is converted to grams like on add.")]
    fn update_food_entry(&self, Parameters(p): Parameters<UpdateFoodEntryParams>) -> Result<CallToolResult, McpError> {
        let per_100g = p.per_100g()?;
        let meal_id = if p.unassign_meal.unwrap_or(false) {
            Some(None)
        } else {
            p.meal_id.map(Some)
        };
        let brand = if p.clear_brand.unwrap_or(false) {
            Some(None)
        } else {
            p.brand.map(Some)
        };
        let changes = EntryChanges {
            meal_id,
            food_name: p.food_name,
            brand,
            serving_size: p.serving_size,
            serving_unit: p.serving_unit,
            piece_weight: p.piece_weight,
            per_100g,
            consumed_date: p.consumed_date,
        };
        let result = diary::update_food_entry(&self.database, &self.user_id, p.id, changes)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(entry) => json_result(&entry),
            Err(blocked) => json_result(&blocked),
        }
    }

    #[tool(description = "Delete a food entry")]
    fn delete_food_entry(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = diary::delete_food_entry(&self.database, &self.user_id, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a day's entries grouped by meal with per-entry, per-meal and daily nutrition totals")]
    fn get_diary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = diary::get_diary(&self.database, &self.user_id, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Meals ---

    #[tool(description = "List meals in display order. Creates Breakfast, Lunch, Dinner and Snacks on first use.")]
    fn list_meals(&self) -> Result<CallToolResult, McpError> {
        let result = meals::list_meals(&self.database, &self.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add a meal after the existing ones")]
    fn add_meal(&self, Parameters(p): Parameters<AddMealParams>) -> Result<CallToolResult, McpError> {
        let result = meals::add_meal(&self.database, &self.user_id, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Rename or reorder a meal")]
    fn update_meal(&self, Parameters(p): Parameters<UpdateMealParams>) -> Result<CallToolResult, McpError> {
        let data = MealUpdate {
            name: p.name,
            order_index: p.order_index,
        };
        let result = meals::update_meal(&self.database, &self.user_id, p.id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a meal. Its entries stay in the diary as unassigned.")]
    fn delete_meal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal(&self.database, &self.user_id, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Goals ---

    #[tool(description = "Get daily calorie and macro goals")]
    fn get_goals(&self) -> Result<CallToolResult, McpError> {
        let result = goals::get_goals(&self.database, &self.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update daily calorie and macro goals. Omitted fields are unchanged.")]
    fn update_goals(&self, Parameters(p): Parameters<UpdateGoalsParams>) -> Result<CallToolResult, McpError> {
        let data = UserGoalsUpdate {
            daily_calories: p.daily_calories,
            daily_protein: p.daily_protein,
            daily_carbs: p.daily_carbs,
            daily_fats: p.daily_fats,
        };
        let result = goals::update_goals(&self.database, &self.user_id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Daily, weekly (Monday to Sunday) and monthly intake against goals for the period containing a date")]
    fn get_progress(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_progress(&self.database, &self.user_id, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Profile ---

    #[tool(description = "Get the user profile (body metrics, activity level, weight goal)")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database, &self.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(p) => json_result(&p),
            None => json_result(&serde_json::json!({ "profile": null, "user_id": &*self.user_id })),
        }
    }

    #[tool(description = "Update profile fields. Omitted fields are unchanged.")]
    fn update_profile(&self, Parameters(p): Parameters<UpdateProfileParams>) -> Result<CallToolResult, McpError> {
        let data = ProfileUpdate {
            email: p.email,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
            height: p.height,
            weight: p.weight,
            age: p.age,
            gender: parse_enum(p.gender, "gender", Gender::parse)?,
            activity_level: parse_enum(p.activity_level, "activity_level", ActivityLevel::parse)?,
            goal: parse_enum(p.goal, "goal", WeightGoal::parse)?,
        };
        let result = profile::update_profile(&self.database, &self.user_id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get display preferences (theme, language)")]
    fn get_preferences(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_preferences(&self.database, &self.user_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update display preferences")]
    fn update_preferences(&self, Parameters(p): Parameters<UpdatePreferencesParams>) -> Result<CallToolResult, McpError> {
        let data = UserPreferencesUpdate {
            theme: p.theme,
            language: p.language,
        };
        let result = profile::update_preferences(&self.database, &self.user_id, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Estimate daily calories from the profile (Mifflin-St Jeor, activity level, weight goal). With apply=true the estimate becomes the daily calorie goal.")]
    fn estimate_daily_calories(&self, Parameters(p): Parameters<EstimateCaloriesParams>) -> Result<CallToolResult, McpError> {
        let result = profile::estimate_calories(&self.database, &self.user_id, p.apply)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Food Lookup ---

    #[tool(description = "Search foods by name or brand. Uses the online food database and falls back to a bundled table of common foods.")]
    async fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let outcome = foods::search_foods(&self.food_search, &p.query).await;
        json_result(&outcome)
    }

    #[tool(description = "Commonly logged foods for quick picks")]
    fn popular_foods(&self) -> Result<CallToolResult, McpError> {
        json_result(&foods::popular_foods())
    }

    #[tool(description = "Foods this user logged recently, newest first, one per food")]
    fn recent_foods(&self, Parameters(p): Parameters<RecentFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::recent_foods(&self.database, &self.user_id, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for NutrilogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrilog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutrilog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutrilog - food diary with calorie and macro goals. \
                 IMPORTANT: Call logging_instructions before logging food. \
                 Diary: add/preview/update/delete_food_entry, get_diary. \
                 Meals: list_meals, add/update/delete_meal. \
                 Goals: get/update_goals, get_progress. \
                 Profile: get/update_profile, get/update_preferences, estimate_daily_calories. \
                 Foods: search_foods, popular_foods, recent_foods. \
                 Blocked responses (\"blocked\": true) carry a prompt: ask the user, then retry."
                    .into(),
            ),
        }
    }
}
