//! Bundled table of common Italian foods
//!
//! Used when the remote service fails or has nothing for a query.

use crate::models::NutrientsPer100g;
use crate::nutrition::FoodMetrics;

use super::FoodItem;

/// Queries shorter than this return nothing
pub const MIN_QUERY_LEN: usize = 2;

const MAX_LOCAL_RESULTS: usize = 20;

struct LocalFood {
    name: &'static str,
    brand: Option<&'static str>,
    calories: f64,
    protein: f64,
    carbs: f64,
    fats: f64,
    fiber: Option<f64>,
    sugar: Option<f64>,
    grams_per_piece: Option<f64>,
    grams_per_ml: Option<f64>,
}

impl LocalFood {
    const fn new(name: &'static str, calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            name,
            brand: None,
            calories,
            protein,
            carbs,
            fats,
            fiber: None,
            sugar: None,
            grams_per_piece: None,
            grams_per_ml: None,
        }
    }

    const fn brand(mut self, brand: &'static str) -> Self {
        self.brand = Some(brand);
        self
    }

    const fn fiber(mut self, fiber: f64) -> Self {
        self.fiber = Some(fiber);
        self
    }

    const fn sugar(mut self, sugar: f64) -> Self {
        self.sugar = Some(sugar);
        self
    }

    const fn piece(mut self, grams: f64) -> Self {
        self.grams_per_piece = Some(grams);
        self
    }

    const fn density(mut self, grams_per_ml: f64) -> Self {
        self.grams_per_ml = Some(grams_per_ml);
        self
    }

    fn to_item(&self) -> FoodItem {
        FoodItem {
            name: self.name.to_string(),
            brand: self.brand.map(str::to_string),
            per_100g: NutrientsPer100g {
                calories: self.calories,
                protein: self.protein,
                carbs: self.carbs,
                fats: self.fats,
                fiber: self.fiber,
                sugar: self.sugar,
                sodium: None,
            },
            metrics: FoodMetrics {
                grams_per_piece: self.grams_per_piece,
                grams_per_ml: self.grams_per_ml,
                grams_per_cup: None,
            },
        }
    }
}

static FOODS: &[LocalFood] = &[
    // Cereals
    LocalFood::new("Avena integrale", 389.0, 16.9, 66.3, 6.9).brand("Quaker").fiber(10.6),
    LocalFood::new("Pasta di semola", 371.0, 13.0, 74.7, 1.5).brand("Barilla").fiber(3.2),
    LocalFood::new("Riso integrale", 349.0, 7.5, 72.2, 2.2).fiber(2.2),
    LocalFood::new("Pane integrale", 247.0, 13.0, 41.0, 4.0).fiber(7.0),
    LocalFood::new("Farro", 340.0, 15.1, 67.1, 2.5).fiber(6.8),
    // Animal protein
    LocalFood::new("Petto di pollo", 165.0, 31.0, 0.0, 3.6),
    LocalFood::new("Salmone", 208.0, 25.4, 0.0, 12.4),
    LocalFood::new("Tonno al naturale", 103.0, 25.2, 0.0, 0.6).brand("Rio Mare"),
    LocalFood::new("Uova", 155.0, 13.0, 0.7, 11.0).piece(50.0),
    LocalFood::new("Manzo magro", 158.0, 26.4, 0.0, 5.4),
    // Dairy
    LocalFood::new("Yogurt greco 0%", 59.0, 10.3, 3.6, 0.4).brand("Fage"),
    LocalFood::new("Latte scremato", 36.0, 3.6, 5.0, 0.2).density(1.03),
    LocalFood::new("Ricotta vaccina", 146.0, 8.8, 4.3, 10.9),
    LocalFood::new("Parmigiano Reggiano", 387.0, 33.0, 0.0, 28.0),
    // Fruit
    LocalFood::new("Banana", 89.0, 1.1, 23.0, 0.3).fiber(2.6).sugar(12.2).piece(120.0),
    LocalFood::new("Mela", 52.0, 0.3, 14.0, 0.2).fiber(2.4).sugar(10.4).piece(180.0),
    LocalFood::new("Arancia", 47.0, 0.9, 12.0, 0.1).fiber(2.4).sugar(9.4).piece(150.0),
    LocalFood::new("Fragole", 32.0, 0.7, 8.0, 0.3).fiber(2.0).sugar(4.9),
    LocalFood::new("Kiwi", 61.0, 1.1, 15.0, 0.5).fiber(3.0).sugar(9.0).piece(75.0),
    // Vegetables
    LocalFood::new("Broccoli", 25.0, 3.0, 5.0, 0.4).fiber(3.0),
    LocalFood::new("Spinaci", 23.0, 2.9, 3.6, 0.4).fiber(2.2),
    LocalFood::new("Pomodori", 18.0, 0.9, 3.9, 0.2).fiber(1.2).sugar(2.6),
    LocalFood::new("Zucchine", 17.0, 1.2, 3.1, 0.3).fiber(1.0),
    LocalFood::new("Carote", 41.0, 0.9, 10.0, 0.2).fiber(2.8).sugar(4.7),
    // Legumes
    LocalFood::new("Fagioli cannellini", 91.0, 6.7, 16.0, 0.5).fiber(6.2),
    LocalFood::new("Lenticchie", 93.0, 6.9, 16.0, 0.4).fiber(7.9),
    LocalFood::new("Ceci", 100.0, 7.0, 17.0, 1.4).fiber(5.8),
    // Nuts and seeds
    LocalFood::new("Mandorle", 579.0, 21.2, 21.6, 49.9).fiber(12.5),
    LocalFood::new("Noci", 654.0, 15.2, 13.7, 65.2).fiber(6.7),
    LocalFood::new("Semi di girasole", 584.0, 20.8, 20.0, 51.5).fiber(8.6),
    // Oils and condiments
    LocalFood::new("Olio extravergine di oliva", 884.0, 0.0, 0.0, 100.0).density(0.91),
    LocalFood::new("Aceto balsamico", 88.0, 0.5, 17.0, 0.0).sugar(14.9),
    // Drinks
    LocalFood::new("Acqua", 0.0, 0.0, 0.0, 0.0).density(1.0),
    LocalFood::new("Caffè", 2.0, 0.1, 0.3, 0.0),
    LocalFood::new("Tè verde", 1.0, 0.0, 0.3, 0.0),
];

const POPULAR: [&str; 6] = [
    "Pasta di semola",
    "Petto di pollo",
    "Riso integrale",
    "Banana",
    "Yogurt greco 0%",
    "Olio extravergine di oliva",
];

/// Case-insensitive substring match on name or brand
pub fn search_local(query: &str) -> Vec<FoodItem> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    FOODS
        .iter()
        .filter(|food| {
            food.name.to_lowercase().contains(&query)
                || food
                    .brand
                    .map(|b| b.to_lowercase().contains(&query))
                    .unwrap_or(false)
        })
        .take(MAX_LOCAL_RESULTS)
        .map(LocalFood::to_item)
        .collect()
}

/// Commonly logged foods, for quick picks
pub fn popular_foods() -> Vec<FoodItem> {
    POPULAR
        .iter()
        .filter_map(|name| FOODS.iter().find(|f| f.name == *name))
        .map(LocalFood::to_item)
        .collect()
}
