//! Summing entry nutrition over a day or a date range

use serde::Serialize;

use crate::models::{FoodEntry, Nutrition};

/// Aggregated nutrition for a set of entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub nutrition: Nutrition,
    pub entry_count: usize,
    /// Entries whose stored unit could not be resolved to grams; they add nothing
    pub unresolved: usize,
}

/// Sum per-entry nutrition. Each entry contributes the same rounded values it
/// displays, and the total is rounded again to drop float noise.
pub fn sum_entries<'a, I>(entries: I) -> Totals
where
    I: IntoIterator<Item = &'a FoodEntry>,
{
    let mut totals = Totals::default();

    for entry in entries {
        totals.entry_count += 1;
        match entry.nutrition() {
            Ok(n) => totals.nutrition = totals.nutrition + n,
            Err(e) => {
                tracing::debug!(entry_id = entry.id, error = %e, "entry excluded from totals");
                totals.unresolved += 1;
            }
        }
    }

    totals.nutrition = totals.nutrition.rounded();
    totals
}

/// Totals for entries consumed on `date` (YYYY-MM-DD); other dates are ignored
pub fn totals_for_date(entries: &[FoodEntry], date: &str) -> Totals {
    sum_entries(entries.iter().filter(|e| e.consumed_date == date))
}

/// Totals for entries with `start <= consumed_date <= end`
pub fn totals_for_range(entries: &[FoodEntry], start: &str, end: &str) -> Totals {
    sum_entries(
        entries
            .iter()
            .filter(|e| e.consumed_date.as_str() >= start && e.consumed_date.as_str() <= end),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry_fixture;

    #[test]
    fn test_daily_total_is_sum_of_entries() {
        let entries = vec![
            entry_fixture(1, "2025-03-10", 150.0, "g", 165.0),
            entry_fixture(2, "2025-03-10", 80.0, "g", 389.0),
            entry_fixture(3, "2025-03-11", 500.0, "g", 100.0),
        ];

        let totals = totals_for_date(&entries, "2025-03-10");
        let expected: Nutrition = entries[..2]
            .iter()
            .map(|e| e.nutrition().unwrap())
            .sum();

        assert_eq!(totals.entry_count, 2);
        assert_eq!(totals.nutrition.calories, expected.calories);
        assert_eq!(totals.nutrition.calories, 248.0 + 311.0);
    }

    #[test]
    fn test_other_dates_excluded() {
        let entries = vec![entry_fixture(1, "2025-03-09", 100.0, "g", 200.0)];
        let totals = totals_for_date(&entries, "2025-03-10");
        assert_eq!(totals.entry_count, 0);
        assert_eq!(totals.nutrition, Nutrition::zero());
    }

    #[test]
    fn test_unresolved_entries_counted_not_summed() {
        let entries = vec![
            entry_fixture(1, "2025-03-10", 100.0, "g", 200.0),
            entry_fixture(2, "2025-03-10", 2.0, "pz", 155.0),
        ];
        let totals = totals_for_date(&entries, "2025-03-10");
        assert_eq!(totals.entry_count, 2);
        assert_eq!(totals.unresolved, 1);
        assert_eq!(totals.nutrition.calories, 200.0);
    }

    #[test]
    fn test_range_is_inclusive() {
        let entries = vec![
            entry_fixture(1, "2025-03-09", 100.0, "g", 100.0),
            entry_fixture(2, "2025-03-10", 100.0, "g", 100.0),
            entry_fixture(3, "2025-03-16", 100.0, "g", 100.0),
            entry_fixture(4, "2025-03-17", 100.0, "g", 100.0),
        ];
        let totals = totals_for_range(&entries, "2025-03-10", "2025-03-16");
        assert_eq!(totals.entry_count, 2);
        assert_eq!(totals.nutrition.calories, 200.0);
    }
}
