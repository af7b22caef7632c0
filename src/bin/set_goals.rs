//! Set the configured user's daily goals
//!
//! Usage: set_goals <kcal> <protein> <carbs> <fats>

use nutrilog::config::Config;
use nutrilog::db::{migrations, Database};
use nutrilog::models::{UserGoals, UserGoalsUpdate};

fn parse_positive(name: &str, value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("{} must be a number greater than 0, got '{}'", name, value)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [kcal, protein, carbs, fats] = args.as_slice() else {
        eprintln!("Usage: set_goals <kcal> <protein> <carbs> <fats>");
        std::process::exit(2);
    };

    let update = UserGoalsUpdate {
        daily_calories: Some(parse_positive("kcal", kcal)?),
        daily_protein: Some(parse_positive("protein", protein)?),
        daily_carbs: Some(parse_positive("carbs", carbs)?),
        daily_fats: Some(parse_positive("fats", fats)?),
    };

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(migrations::run_migrations)?;

    database.with_conn(|conn| {
        let goals = UserGoals::update(conn, &config.user_id, &update)?;
        println!("Goals set for {}:", goals.user_id);
        println!("  Calories: {} kcal", goals.daily_calories);
        println!("  Protein:  {} g", goals.daily_protein);
        println!("  Carbs:    {} g", goals.daily_carbs);
        println!("  Fats:     {} g", goals.daily_fats);
        Ok(())
    })?;

    Ok(())
}
