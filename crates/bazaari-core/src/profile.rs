//! User content-profile construction.
//!
//! A profile is the element-wise mean of the content vectors of the
//! products a user has interacted with, taken in the fitted vector space.
//! Callers must branch on interaction count before calling in here: an
//! empty history is a contract violation, not a degraded input.

use crate::catalog::ProductId;
use crate::content::{SparseVector, TfidfModel};
use crate::error::{Error, Result};

/// Mean content vector over the user's interacted products.
///
/// Ids without a fitted vector (products gone from the catalog snapshot)
/// are skipped; if every id is unknown the profile is the zero vector and
/// downstream similarity ranking comes back empty.
///
/// # Errors
///
/// Returns [`Error::EmptyProfile`] when `product_ids` is empty.
pub fn build_profile(model: &TfidfModel, product_ids: &[ProductId]) -> Result<SparseVector> {
    if product_ids.is_empty() {
        return Err(Error::EmptyProfile);
    }

    let mut pairs: Vec<(u32, f32)> = Vec::new();
    let mut known = 0u32;
    for &id in product_ids {
        if let Some(vector) = model.vector_of(id) {
            pairs.extend_from_slice(vector.terms());
            known += 1;
        }
    }

    let mut profile = SparseVector::from_pairs(pairs);
    if known > 0 {
        #[allow(clippy::cast_precision_loss)] // interaction counts are small
        profile.scale(1.0 / known as f32);
    }
    Ok(profile)
}
