//! Offline evaluation metrics for recommendation lists.
//!
//! Standard ranking metrics computed against held-out interactions:
//! - **Precision@k**: proportion of recommended products the user actually
//!   interacted with
//! - **Recall@k**: proportion of held-out products that were recommended
//! - **MRR**: reciprocal rank of the first relevant recommendation
//! - **Hit rate**: proportion of users with at least one relevant
//!   recommendation in their top-k
//!
//! # Example
//!
//! ```rust
//! use bazaari_core::metrics::{precision_at_k, recall_at_k, mrr};
//!
//! let held_out = vec![1u64, 2, 3, 4, 5];
//! let recommended = vec![1u64, 3, 6, 2, 7];
//!
//! assert!((recall_at_k(&held_out, &recommended) - 0.6).abs() < 1e-9);
//! assert!((precision_at_k(&held_out, &recommended) - 0.6).abs() < 1e-9);
//! assert!((mrr(&held_out, &recommended) - 1.0).abs() < 1e-9);
//! ```

use rustc_hash::FxHashSet;
use std::hash::Hash;

/// Number of recommended items that appear in the relevant set.
fn overlap<T: Eq + Hash + Copy>(relevant: &[T], recommended: &[T]) -> usize {
    let relevant_set: FxHashSet<T> = relevant.iter().copied().collect();
    recommended
        .iter()
        .filter(|id| relevant_set.contains(id))
        .count()
}

#[allow(clippy::cast_precision_loss)] // list lengths are far below 2^52
fn ratio(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}

/// Recall@k: the proportion of held-out relevant items that appear in the
/// recommendation list. Returns 0.0 when `relevant` is empty.
#[must_use]
pub fn recall_at_k<T: Eq + Hash + Copy>(relevant: &[T], recommended: &[T]) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    ratio(overlap(relevant, recommended), relevant.len())
}

/// Precision@k: the proportion of recommended items that are relevant.
/// Returns 0.0 when `recommended` is empty.
#[must_use]
pub fn precision_at_k<T: Eq + Hash + Copy>(relevant: &[T], recommended: &[T]) -> f64 {
    if recommended.is_empty() {
        return 0.0;
    }
    ratio(overlap(relevant, recommended), recommended.len())
}

/// Mean Reciprocal Rank: `1 / rank` of the first relevant recommendation,
/// or 0.0 when none of the recommendations is relevant.
#[must_use]
pub fn mrr<T: Eq + Hash + Copy>(relevant: &[T], recommended: &[T]) -> f64 {
    let relevant_set: FxHashSet<T> = relevant.iter().copied().collect();
    recommended
        .iter()
        .position(|id| relevant_set.contains(id))
        .map_or(0.0, |rank| ratio(1, rank + 1))
}

/// Hit rate: the proportion of users whose top-k recommendations contain
/// at least one relevant item. Each pair is `(relevant, recommended)` for
/// one user.
#[must_use]
pub fn hit_rate<T: Eq + Hash + Copy>(per_user: &[(Vec<T>, Vec<T>)], k: usize) -> f64 {
    if per_user.is_empty() {
        return 0.0;
    }
    let hits = per_user
        .iter()
        .filter(|(relevant, recommended)| {
            let top = &recommended[..k.min(recommended.len())];
            overlap(relevant, top) > 0
        })
        .count();
    ratio(hits, per_user.len())
}

/// Averages recall, precision and MRR over multiple users.
///
/// Returns `(avg_recall, avg_precision, avg_mrr)`; zeros when either input
/// is empty. Extra entries in the longer list are ignored.
#[must_use]
pub fn average_metrics<T: Eq + Hash + Copy>(
    relevant_lists: &[Vec<T>],
    recommended_lists: &[Vec<T>],
) -> (f64, f64, f64) {
    let paired = relevant_lists.len().min(recommended_lists.len());
    if paired == 0 {
        return (0.0, 0.0, 0.0);
    }

    let (recall_sum, precision_sum, mrr_sum) = relevant_lists
        .iter()
        .zip(recommended_lists)
        .fold((0.0, 0.0, 0.0), |(r, p, m), (relevant, recommended)| {
            (
                r + recall_at_k(relevant, recommended),
                p + precision_at_k(relevant, recommended),
                m + mrr(relevant, recommended),
            )
        });

    #[allow(clippy::cast_precision_loss)]
    let paired = paired as f64;
    (
        recall_sum / paired,
        precision_sum / paired,
        mrr_sum / paired,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recall_perfect() {
        let relevant = vec![1u64, 2, 3, 4, 5];
        let recommended = vec![1u64, 2, 3, 4, 5];
        assert!((recall_at_k(&relevant, &recommended) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_recall_partial() {
        let relevant = vec![1u64, 2, 3, 4, 5];
        let recommended = vec![1u64, 3, 6, 2, 7];
        assert!((recall_at_k(&relevant, &recommended) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_recall_empty_relevant() {
        let relevant: Vec<u64> = vec![];
        assert!((recall_at_k(&relevant, &[1, 2, 3]) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_precision_partial() {
        let relevant = vec![1u64, 2, 3];
        let recommended = vec![1u64, 4, 5, 6, 7];
        assert!((precision_at_k(&relevant, &recommended) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_precision_empty_recommendations() {
        let relevant = vec![1u64, 2, 3];
        let recommended: Vec<u64> = vec![];
        assert!((precision_at_k(&relevant, &recommended) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_mrr_positions() {
        let relevant = vec![1u64, 2, 3];
        assert!((mrr(&relevant, &[1u64, 4, 5]) - 1.0).abs() < 1e-9);
        assert!((mrr(&relevant, &[4u64, 1, 5]) - 0.5).abs() < 1e-9);
        assert!((mrr(&relevant, &[4u64, 5, 6]) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate() {
        let per_user = vec![
            (vec![1u64, 2], vec![1u64, 9, 9]),
            (vec![3u64], vec![9u64, 9, 9]),
        ];
        assert!((hit_rate(&per_user, 3) - 0.5).abs() < 1e-9);
        // First user's hit is at rank 1, so k=1 still counts it.
        assert!((hit_rate(&per_user, 1) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate_k_beyond_list_length() {
        let per_user = vec![(vec![1u64], vec![2u64, 1])];
        assert!((hit_rate(&per_user, 50) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_metrics() {
        let relevant = vec![vec![1u64, 2], vec![3u64]];
        let recommended = vec![vec![1u64, 2], vec![9u64]];
        let (recall, precision, reciprocal) = average_metrics(&relevant, &recommended);
        assert!((recall - 0.5).abs() < 1e-9);
        assert!((precision - 0.5).abs() < 1e-9);
        assert!((reciprocal - 0.5).abs() < 1e-9);
    }
}
