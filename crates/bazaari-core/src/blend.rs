//! Hybrid blending of ranked candidate lists.
//!
//! Each source list carries a fixed weight reflecting how personalized its
//! signal is (demographic < content < collaborative). A product's score is
//! the sum of the weights of the lists it appears in; the final ordering
//! is score descending. Equal scores resolve in favor of the product whose
//! strongest source is more personalized, then by first appearance across
//! the concatenated lists. The score map is transient and discarded once
//! the ordered list is produced.

use crate::catalog::ProductId;
use indexmap::IndexMap;

/// Fixed blend weights for the three candidate sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendWeights {
    /// Weight for segment-popularity candidates.
    pub demographic: u32,
    /// Weight for content-similarity candidates.
    pub content: u32,
    /// Weight for collaborative-filtering candidates.
    pub collaborative: u32,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            demographic: 1,
            content: 2,
            collaborative: 3,
        }
    }
}

/// Fuses weighted candidate lists into one deduplicated ordering.
///
/// Every product appearing in any list starts at score zero and gains each
/// list's weight once per list it is a member of (duplicate entries within
/// one list do not double-count). Ordering: total score descending, then
/// the highest single-source weight descending (a product backed by the
/// collaborative list outranks an equal-scored product backed only by
/// weaker sources), then first-seen order over the lists as given.
/// Truncated to `limit`.
#[must_use]
pub fn fuse(lists: &[(&[ProductId], u32)], limit: usize) -> Vec<ProductId> {
    // IndexMap keeps first-seen order, the final tie-break.
    let mut scores: IndexMap<ProductId, (u32, u32)> = IndexMap::new();
    for &(list, weight) in lists {
        let mut counted: Vec<ProductId> = Vec::new();
        for &product_id in list {
            if counted.contains(&product_id) {
                continue;
            }
            counted.push(product_id);
            let entry = scores.entry(product_id).or_insert((0, 0));
            entry.0 += weight;
            entry.1 = entry.1.max(weight);
        }
    }

    let mut ranked: Vec<(ProductId, (u32, u32))> = scores.into_iter().collect();
    // Stable sort: remaining ties keep insertion (first-seen) order.
    ranked.sort_by(|a, b| (b.1).cmp(&a.1));
    ranked.truncate(limit);
    ranked.into_iter().map(|(id, _)| id).collect()
}

/// Convenience wrapper applying [`BlendWeights`] to the two- or three-way
/// blend. Pass `collaborative: None` for the two-way variant.
#[must_use]
pub fn blend(
    weights: BlendWeights,
    demographic: &[ProductId],
    content: &[ProductId],
    collaborative: Option<&[ProductId]>,
    limit: usize,
) -> Vec<ProductId> {
    match collaborative {
        Some(collab) => fuse(
            &[
                (demographic, weights.demographic),
                (content, weights.content),
                (collab, weights.collaborative),
            ],
            limit,
        ),
        None => fuse(
            &[
                (demographic, weights.demographic),
                (content, weights.content),
            ],
            limit,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_example() {
        // demographic [A,B], content [B,C], collaborative [C,D], weights
        // 1/2/3: scores A=1, B=1+2=3, C=2+3=5, D=3. B and D tie on score;
        // D's strongest source (collaborative, 3) beats B's (content, 2).
        let (a, b, c, d) = (1u64, 2u64, 3u64, 4u64);
        let result = blend(
            BlendWeights::default(),
            &[a, b],
            &[b, c],
            Some(&[c, d]),
            10,
        );
        assert_eq!(result, vec![c, d, b, a]);
    }

    #[test]
    fn test_membership_counts_once_per_list() {
        // A product repeated inside one list gains that list's weight once.
        let result = fuse(&[(&[1, 1, 1], 2), (&[2], 3)], 10);
        assert_eq!(result, vec![2, 1]);
    }

    #[test]
    fn test_full_tie_keeps_first_seen_order() {
        let result = fuse(&[(&[10, 20], 1), (&[30], 1)], 10);
        assert_eq!(result, vec![10, 20, 30]);
    }

    #[test]
    fn test_truncation() {
        let result = fuse(&[(&[1, 2, 3, 4], 1)], 2);
        assert_eq!(result, vec![1, 2]);
    }

    #[test]
    fn test_two_way_blend() {
        let result = blend(BlendWeights::default(), &[1], &[2], None, 10);
        // content weight 2 beats demographic weight 1.
        assert_eq!(result, vec![2, 1]);
    }

    #[test]
    fn test_no_duplicates_in_output() {
        let result = fuse(&[(&[1, 2], 1), (&[2, 1], 2), (&[1], 3)], 10);
        assert_eq!(result.len(), 2);
        assert_eq!(result, vec![1, 2]);
    }

    #[test]
    fn test_empty_lists_yield_empty_result() {
        let result = blend(BlendWeights::default(), &[], &[], Some(&[]), 5);
        assert!(result.is_empty());
    }
}
