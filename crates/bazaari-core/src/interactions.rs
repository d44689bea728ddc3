//! Interaction store and per-segment popularity ranking.
//!
//! The interaction log is append-only at load time and strictly read-only
//! at request time. [`PopularityRanker`] aggregates it once at startup,
//! joined with segment assignments, and serves as the demographic
//! candidate source.

use crate::catalog::ProductId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// One logged (user, product) event with its rating or implicit signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// User identifier (email or opaque id from the external layer).
    pub user_id: String,
    /// The product interacted with.
    pub product_id: ProductId,
    /// Explicit rating, or the implicit-signal strength mapped to the
    /// rating scale by the ingestion layer.
    pub rating: f32,
    /// Event time, when the ingestion layer has one.
    pub timestamp: Option<i64>,
}

impl Interaction {
    /// Convenience constructor without a timestamp.
    #[must_use]
    pub fn new(user_id: impl Into<String>, product_id: ProductId, rating: f32) -> Self {
        Self {
            user_id: user_id.into(),
            product_id,
            rating,
            timestamp: None,
        }
    }
}

/// Read-only view over the full interaction log.
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    interactions: Vec<Interaction>,
    by_user: FxHashMap<String, Vec<usize>>,
}

impl InteractionLog {
    /// Builds the log from loaded events.
    #[must_use]
    pub fn new(interactions: Vec<Interaction>) -> Self {
        let mut by_user: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (idx, interaction) in interactions.iter().enumerate() {
            by_user
                .entry(interaction.user_id.clone())
                .or_default()
                .push(idx);
        }
        Self {
            interactions,
            by_user,
        }
    }

    /// Total number of logged events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether the log holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// All events, in log order.
    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.interactions.iter()
    }

    /// Number of events logged for a user.
    #[must_use]
    pub fn count_for(&self, user_id: &str) -> usize {
        self.by_user.get(user_id).map_or(0, Vec::len)
    }

    /// Distinct product ids a user has interacted with, in first-interaction
    /// order.
    #[must_use]
    pub fn products_of(&self, user_id: &str) -> Vec<ProductId> {
        let mut seen = FxHashSet::default();
        let mut products = Vec::new();
        if let Some(indices) = self.by_user.get(user_id) {
            for &idx in indices {
                let product_id = self.interactions[idx].product_id;
                if seen.insert(product_id) {
                    products.push(product_id);
                }
            }
        }
        products
    }
}

/// Precomputed per-segment popularity ordering.
#[derive(Debug, Clone)]
pub struct PopularityRanker {
    top_by_segment: Vec<Vec<ProductId>>,
}

impl PopularityRanker {
    /// Aggregates interaction counts per (segment, product) and keeps the
    /// per-segment top `top_n` by count descending, ties broken by product
    /// id ascending for determinism.
    ///
    /// `segment_of` joins a user id to its segment; events whose user is
    /// absent from the user table are skipped.
    pub fn fit<F>(log: &InteractionLog, num_segments: usize, segment_of: F, top_n: usize) -> Self
    where
        F: Fn(&str) -> Option<usize>,
    {
        let mut counts: Vec<FxHashMap<ProductId, u32>> = vec![FxHashMap::default(); num_segments];
        let mut skipped = 0usize;
        for interaction in log.iter() {
            match segment_of(&interaction.user_id) {
                Some(segment) if segment < num_segments => {
                    *counts[segment].entry(interaction.product_id).or_insert(0) += 1;
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "interactions without a segmentable user");
        }

        let top_by_segment = counts
            .into_iter()
            .map(|segment_counts| {
                let mut ranked: Vec<(ProductId, u32)> = segment_counts.into_iter().collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
                ranked.truncate(top_n);
                ranked.into_iter().map(|(id, _)| id).collect()
            })
            .collect();

        Self { top_by_segment }
    }

    /// The precomputed top products for a segment, most popular first.
    #[must_use]
    pub fn top_for_segment(&self, segment: usize) -> &[ProductId] {
        self.top_by_segment
            .get(segment)
            .map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> InteractionLog {
        InteractionLog::new(vec![
            Interaction::new("u1", 101, 5.0),
            Interaction::new("u1", 102, 4.0),
            Interaction::new("u1", 101, 3.0), // repeat view of 101
            Interaction::new("u2", 102, 5.0),
            Interaction::new("u2", 103, 3.0),
            Interaction::new("u3", 104, 4.0),
        ])
    }

    #[test]
    fn test_products_of_distinct_first_seen() {
        let log = log();
        assert_eq!(log.products_of("u1"), vec![101, 102]);
        assert_eq!(log.count_for("u1"), 3);
        assert!(log.products_of("nobody").is_empty());
    }

    #[test]
    fn test_popularity_counts_and_order() {
        let log = log();
        // u1, u2 in segment 0; u3 in segment 1.
        let ranker = PopularityRanker::fit(
            &log,
            2,
            |user| match user {
                "u1" | "u2" => Some(0),
                "u3" => Some(1),
                _ => None,
            },
            10,
        );
        // Segment 0 counts: 101 -> 2, 102 -> 2, 103 -> 1.
        // 101 and 102 tie on count; lower id first.
        assert_eq!(ranker.top_for_segment(0), &[101, 102, 103]);
        assert_eq!(ranker.top_for_segment(1), &[104]);
        assert!(ranker.top_for_segment(9).is_empty());
    }

    #[test]
    fn test_popularity_truncates_to_top_n() {
        let log = log();
        let ranker = PopularityRanker::fit(&log, 1, |_| Some(0), 2);
        assert_eq!(ranker.top_for_segment(0).len(), 2);
    }

    #[test]
    fn test_unsegmentable_users_are_skipped() {
        let log = log();
        let ranker = PopularityRanker::fit(&log, 1, |u| (u == "u3").then_some(0), 10);
        assert_eq!(ranker.top_for_segment(0), &[104]);
    }
}
