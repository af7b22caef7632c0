//! Remote food lookup
//!
//! `FoodSource` is the seam the search coordinator talks to; `OpenFoodFacts`
//! is the production implementation.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::NutrientsPer100g;
use crate::nutrition::FoodMetrics;

use super::FoodItem;

const PAGE_SIZE: &str = "20";
const MAX_REMOTE_RESULTS: usize = 10;
const KJ_PER_KCAL: f64 = 4.184;

#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}")]
    Http { status: u16 },
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_decode() {
            LookupError::Malformed(e.to_string())
        } else {
            LookupError::Transport(e.to_string())
        }
    }
}

#[async_trait]
pub trait FoodSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<Vec<FoodItem>, LookupError>;
}

/// OpenFoodFacts product search
#[derive(Debug, Clone)]
pub struct OpenFoodFacts {
    http: Client,
    base_url: String,
}

impl OpenFoodFacts {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nutrilog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl FoodSource for OpenFoodFacts {
    fn name(&self) -> &'static str {
        "openfoodfacts"
    }

    async fn search(&self, query: &str) -> Result<Vec<FoodItem>, LookupError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("search_terms", query),
                ("search_simple", "1"),
                ("action", "process"),
                ("json", "1"),
                ("page_size", PAGE_SIZE),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Http {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(map_products(body.products))
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Product {
    product_name_it: Option<String>,
    product_name: Option<String>,
    generic_name_it: Option<String>,
    generic_name: Option<String>,
    brands: Option<String>,
    #[serde(default)]
    nutriments: HashMap<String, Value>,
}

/// Nutriment values arrive as numbers or numeric strings
fn number(nutriments: &HashMap<String, Value>, key: &str) -> Option<f64> {
    let value = match nutriments.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    Some(value).filter(|v| v.is_finite() && *v != 0.0)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Product {
    fn display_name(&self) -> Option<String> {
        non_empty(&self.product_name_it)
            .or_else(|| non_empty(&self.product_name))
            .or_else(|| non_empty(&self.generic_name_it))
            .or_else(|| non_empty(&self.generic_name))
            .map(str::to_string)
    }

    fn first_brand(&self) -> Option<String> {
        self.brands
            .as_deref()
            .and_then(|b| b.split(',').next())
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string)
    }

    fn calories(&self) -> f64 {
        number(&self.nutriments, "energy-kcal_100g")
            .or_else(|| number(&self.nutriments, "energy_100g").map(|kj| kj / KJ_PER_KCAL))
            .unwrap_or(0.0)
    }

    fn into_item(self) -> Option<FoodItem> {
        let name = self.display_name()?;
        let calories = self.calories();
        if calories <= 0.0 {
            return None;
        }

        let n = &self.nutriments;
        Some(FoodItem {
            name,
            brand: self.first_brand(),
            per_100g: NutrientsPer100g {
                calories,
                protein: number(n, "proteins_100g").unwrap_or(0.0),
                carbs: number(n, "carbohydrates_100g").unwrap_or(0.0),
                fats: number(n, "fat_100g").unwrap_or(0.0),
                fiber: number(n, "fiber_100g"),
                sugar: number(n, "sugars_100g"),
                sodium: number(n, "sodium_100g"),
            },
            metrics: FoodMetrics::default(),
        })
    }
}

/// Keep named products with positive calories, at most ten of the first page
pub(crate) fn map_products(products: Vec<Product>) -> Vec<FoodItem> {
    products
        .into_iter()
        .take(MAX_REMOTE_RESULTS)
        .filter_map(Product::into_item)
        .collect()
}
