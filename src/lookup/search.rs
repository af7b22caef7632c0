//! Debounced food search
//!
//! Every call takes a generation number. A call that is no longer the newest
//! after the debounce, or after the remote answers, reports `Superseded` and
//! its results are dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::local::{search_local, MIN_QUERY_LEN};
use super::remote::FoodSource;
use super::FoodItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    TooShort,
    /// A newer search started before this one finished
    Superseded,
    Results {
        origin: Origin,
        foods: Vec<FoodItem>,
        /// Set when the remote failed and local results are shown instead
        notice: Option<String>,
    },
}

pub struct FoodSearch {
    source: Arc<dyn FoodSource>,
    debounce: Duration,
    generation: AtomicU64,
}

impl FoodSearch {
    pub fn new(source: Arc<dyn FoodSource>, debounce: Duration) -> Self {
        Self {
            source,
            debounce,
            generation: AtomicU64::new(0),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return SearchOutcome::TooShort;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(generation) {
            tracing::debug!(query, generation, "search superseded before request");
            return SearchOutcome::Superseded;
        }

        let remote = self.source.search(query).await;

        if !self.is_current(generation) {
            tracing::debug!(query, generation, "stale search response dropped");
            return SearchOutcome::Superseded;
        }

        match remote {
            Ok(foods) if !foods.is_empty() => SearchOutcome::Results {
                origin: Origin::Remote,
                foods,
                notice: None,
            },
            Ok(_) => {
                tracing::info!(query, source = self.source.name(), "no remote results, using local foods");
                SearchOutcome::Results {
                    origin: Origin::Local,
                    foods: search_local(query),
                    notice: None,
                }
            }
            Err(e) => {
                tracing::warn!(query, source = self.source.name(), error = %e, "remote lookup failed, using local foods");
                SearchOutcome::Results {
                    origin: Origin::Local,
                    foods: search_local(query),
                    notice: Some(format!("Food service unavailable ({}), showing local results", e)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::LookupError;
    use crate::models::NutrientsPer100g;
    use crate::nutrition::FoodMetrics;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Answers with one item named after the query. "slow" queries take 100ms.
    #[derive(Default)]
    struct FakeSource {
        calls: AtomicUsize,
        fail: bool,
        empty: bool,
    }

    #[async_trait]
    impl FoodSource for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn search(&self, query: &str) -> Result<Vec<FoodItem>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.starts_with("slow") {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            if self.fail {
                return Err(LookupError::Http { status: 503 });
            }
            if self.empty {
                return Ok(Vec::new());
            }
            Ok(vec![FoodItem {
                name: format!("remote {}", query),
                brand: None,
                per_100g: NutrientsPer100g {
                    calories: 100.0,
                    ..Default::default()
                },
                metrics: FoodMetrics::default(),
            }])
        }
    }

    fn search_with(source: FakeSource, debounce_ms: u64) -> (Arc<FakeSource>, FoodSearch) {
        let source = Arc::new(source);
        let search = FoodSearch::new(source.clone(), Duration::from_millis(debounce_ms));
        (source, search)
    }

    #[tokio::test]
    async fn test_too_short() {
        let (source, search) = search_with(FakeSource::default(), 0);
        assert_eq!(search.search("a").await, SearchOutcome::TooShort);
        assert_eq!(search.search(" ").await, SearchOutcome::TooShort);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_results() {
        let (_, search) = search_with(FakeSource::default(), 0);
        match search.search("pasta").await {
            SearchOutcome::Results { origin, foods, notice } => {
                assert_eq!(origin, Origin::Remote);
                assert_eq!(foods[0].name, "remote pasta");
                assert!(notice.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_local() {
        let (_, search) = search_with(
            FakeSource {
                fail: true,
                ..Default::default()
            },
            0,
        );
        match search.search("pollo").await {
            SearchOutcome::Results { origin, foods, notice } => {
                assert_eq!(origin, Origin::Local);
                assert_eq!(foods[0].name, "Petto di pollo");
                assert!(notice.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_remote_falls_back_to_local() {
        let (_, search) = search_with(
            FakeSource {
                empty: true,
                ..Default::default()
            },
            0,
        );
        match search.search("banana").await {
            SearchOutcome::Results { origin, foods, notice } => {
                assert_eq!(origin, Origin::Local);
                assert_eq!(foods.len(), 1);
                assert!(notice.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_debounce_coalesces_keystrokes() {
        let (source, search) = search_with(FakeSource::default(), 50);

        let first = search.search("ban");
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            search.search("banana").await
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(first, SearchOutcome::Superseded);
        assert!(matches!(second, SearchOutcome::Results { .. }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_response_dropped() {
        let (source, search) = search_with(FakeSource::default(), 0);

        let slow = search.search("slow query");
        let fast = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            search.search("fast query").await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(slow, SearchOutcome::Superseded);
        match fast {
            SearchOutcome::Results { foods, .. } => assert_eq!(foods[0].name, "remote fast query"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
