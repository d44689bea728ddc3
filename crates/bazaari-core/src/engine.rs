//! Recommendation orchestrator and the fitted-model context.
//!
//! [`Recommender`] is the explicitly constructed context object owning the
//! normalized catalog, interaction log and every fitted model. It is built
//! once at process initialization via [`Recommender::fit`]; all request
//! methods take `&self` and only read. A fresh process (and a fresh
//! `fit`) is the only way to incorporate new catalog or interaction data.

use crate::blend::blend;
use crate::catalog::{Catalog, Gender, Product, ProductId};
use crate::collab::SvdModel;
use crate::config::RecoConfig;
use crate::content::TfidfModel;
use crate::eligibility::{eligible_products, parse_gender, Eligible, UserContext};
use crate::error::{Error, Result};
use crate::interactions::{Interaction, InteractionLog, PopularityRanker};
use crate::profile::build_profile;
use crate::segment::{UserAttributes, UserSegmenter};
use chrono::Datelike;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Sentinel for numeric fields the scraper could not read.
const UNAVAILABLE: &str = "N/A";
/// Placeholder shown when a product has no scraped image.
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x300?text=No+Image";
/// Placeholder link for products without a scraped page URL.
const PLACEHOLDER_URL: &str = "#";

/// A user as presented by the external layer: identifier plus demographic
/// attributes. Constructed per request, never persisted by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque user identifier (the legacy layer passes the email).
    pub user_id: String,
    /// Demographic attributes used for segmentation and eligibility.
    pub attributes: UserAttributes,
}

impl UserRecord {
    /// Convenience constructor.
    #[must_use]
    pub fn new(user_id: impl Into<String>, attributes: UserAttributes) -> Self {
        Self {
            user_id: user_id.into(),
            attributes,
        }
    }
}

/// One recommended product, shaped for the external JSON layer.
///
/// Missing numeric fields carry the `"N/A"` sentinel rather than null,
/// matching the legacy convention; missing image/product URLs get
/// placeholder defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Display title.
    pub title: String,
    /// Price or `"N/A"`.
    pub price: String,
    /// Rating or `"N/A"`.
    pub rating: String,
    /// Review count or `"N/A"`.
    pub review_count: String,
    /// Image URL, placeholder when missing.
    pub image_url: String,
    /// Product page URL, placeholder when missing.
    pub product_url: String,
}

impl ProductRecord {
    fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product
                .price
                .map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string()),
            rating: product
                .rating
                .map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string()),
            review_count: product
                .review_count
                .map_or_else(|| UNAVAILABLE.to_string(), |v| v.to_string()),
            image_url: product
                .image_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            product_url: product
                .product_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_URL.to_string()),
        }
    }
}

/// Fitted recommendation engine: immutable model artifacts plus the
/// request-time orchestration over them.
#[derive(Debug)]
pub struct Recommender {
    catalog: Catalog,
    log: InteractionLog,
    tfidf: TfidfModel,
    segmenter: UserSegmenter,
    popularity: PopularityRanker,
    svd: SvdModel,
    config: RecoConfig,
}

impl Recommender {
    /// Fits every model over the static data snapshot.
    ///
    /// The catalog is normalized in place before the vector space is
    /// fitted. Fitting happens exactly once per process lifetime; any fit
    /// failure is fatal and the process must not serve requests.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] for invalid configuration and
    /// [`crate::Error::ModelFit`] for degenerate training data (empty
    /// catalog, empty user table, empty interaction log, fewer users than
    /// segments).
    pub fn fit(
        products: Vec<Product>,
        users: &[UserRecord],
        interactions: Vec<Interaction>,
        config: RecoConfig,
    ) -> Result<Self> {
        config.validate()?;

        let mut catalog = Catalog::new(products);
        catalog.normalize();

        let tfidf = TfidfModel::fit(&catalog)?;

        let attributes: Vec<UserAttributes> =
            users.iter().map(|u| u.attributes.clone()).collect();
        let segmenter = UserSegmenter::fit(&attributes, config.num_segments, config.seed)?;

        let segment_by_user: rustc_hash::FxHashMap<String, usize> = users
            .iter()
            .map(|u| (u.user_id.clone(), segmenter.assign(&u.attributes)))
            .collect();

        let log = InteractionLog::new(interactions);
        let popularity = PopularityRanker::fit(
            &log,
            config.num_segments,
            |user_id| segment_by_user.get(user_id).copied(),
            config.top_n_per_segment,
        );

        let svd = SvdModel::fit(&log, &config.collab)?;

        tracing::info!(
            products = catalog.len(),
            users = users.len(),
            interactions = log.len(),
            segments = config.num_segments,
            "recommender fitted"
        );

        Ok(Self {
            catalog,
            log,
            tfidf,
            segmenter,
            popularity,
            svd,
            config,
        })
    }

    /// Demographic segment for a set of user attributes.
    ///
    /// Deterministic for a fitted model; always in `[0, num_segments)`.
    #[must_use]
    pub fn segment_for(&self, attributes: &UserAttributes) -> usize {
        self.segmenter.assign(attributes)
    }

    /// Recommends products for the current calendar month.
    ///
    /// Thin wrapper over [`Self::recommend_at`]; see there for semantics.
    ///
    /// # Errors
    ///
    /// Propagates errors from the warm path's profile construction.
    pub fn recommend(
        &self,
        user: &UserRecord,
        login_count: u32,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<Vec<ProductRecord>> {
        let month = chrono::Utc::now().month();
        self.recommend_at(user, login_count, month, page, page_size)
    }

    /// Recommends products for an explicit 1-based month.
    ///
    /// Cold path (first visit or no logged interactions): eligibility-
    /// filtered segment popularity, padded with other eligible products in
    /// catalog order. Warm path: content profile similarity blended with
    /// demographic (and, when enabled, collaborative) candidates. Both
    /// paths exclude products the user has interacted with, deduplicate,
    /// and slice the requested page.
    ///
    /// # Errors
    ///
    /// Propagates errors from the warm path's profile construction.
    pub fn recommend_at(
        &self,
        user: &UserRecord,
        login_count: u32,
        month: u32,
        page: usize,
        page_size: Option<usize>,
    ) -> Result<Vec<ProductRecord>> {
        let size = page_size.unwrap_or(self.config.items_per_page);
        let context = UserContext::derive(&user.attributes, month, self.config.kids_age_cutoff);
        let segment = self.segmenter.assign(&user.attributes);
        let eligible = eligible_products(&self.catalog, &context);
        let interacted = self.log.products_of(&user.user_id);

        let ordered = if login_count == 0 || interacted.is_empty() {
            tracing::debug!(user = %user.user_id, segment, "cold recommendation path");
            self.cold_candidates(segment, &eligible, &interacted)
        } else {
            tracing::debug!(user = %user.user_id, segment, "warm recommendation path");
            self.warm_candidates(user, segment, &eligible, &interacted, size)?
        };

        Ok(paginate(&ordered, page, size)
            .iter()
            .filter_map(|&id| self.catalog.get(id))
            .map(ProductRecord::from_product)
            .collect())
    }

    /// Cold path: segment-popular eligible products first, then the
    /// remaining eligible products in catalog order.
    fn cold_candidates(
        &self,
        segment: usize,
        eligible: &Eligible,
        interacted: &[ProductId],
    ) -> Vec<ProductId> {
        let eligible_set: FxHashSet<ProductId> = eligible.product_ids.iter().copied().collect();
        let interacted_set: FxHashSet<ProductId> = interacted.iter().copied().collect();

        let mut selected: Vec<ProductId> = Vec::new();
        let mut seen: FxHashSet<ProductId> = FxHashSet::default();
        for &id in self.popularity.top_for_segment(segment) {
            if eligible_set.contains(&id) && !interacted_set.contains(&id) && seen.insert(id) {
                selected.push(id);
            }
        }
        for &id in &eligible.product_ids {
            if !interacted_set.contains(&id) && seen.insert(id) {
                selected.push(id);
            }
        }
        selected
    }

    /// Warm path: content similarity + demographic popularity (+
    /// collaborative estimates when enabled) over eligible, non-interacted
    /// products, fused by the hybrid blender.
    fn warm_candidates(
        &self,
        user: &UserRecord,
        segment: usize,
        eligible: &Eligible,
        interacted: &[ProductId],
        page_size: usize,
    ) -> Result<Vec<ProductId>> {
        let interacted_set: FxHashSet<ProductId> = interacted.iter().copied().collect();
        let pool: Vec<ProductId> = eligible
            .product_ids
            .iter()
            .copied()
            .filter(|id| !interacted_set.contains(id))
            .collect();
        let pool_set: FxHashSet<ProductId> = pool.iter().copied().collect();

        // Each source contributes up to twice the page size, mirroring the
        // candidate oversampling of the original pipeline.
        let per_source = page_size.saturating_mul(2);

        let profile = build_profile(&self.tfidf, interacted)?;
        let content: Vec<ProductId> = self
            .tfidf
            .similarity_rank(&profile, &pool)
            .into_iter()
            .take(per_source)
            .map(|(id, _)| id)
            .collect();

        let demographic: Vec<ProductId> = self
            .popularity
            .top_for_segment(segment)
            .iter()
            .copied()
            .filter(|id| pool_set.contains(id))
            .take(per_source)
            .collect();

        let collaborative: Option<Vec<ProductId>> =
            self.config.blend.enable_collaborative.then(|| {
                self.svd
                    .rank(&user.user_id, &pool)
                    .into_iter()
                    .take(per_source)
                    .map(|(id, _)| id)
                    .collect()
            });

        Ok(blend(
            self.config.blend.weights(),
            &demographic,
            &content,
            collaborative.as_deref(),
            usize::MAX,
        ))
    }

    /// Popularity-only pagination path, used before any catalog/interest
    /// match exists for the user: gender-compatible products ordered by
    /// `rating * ln(1 + review_count)` and sliced into pages. Out-of-range
    /// pages return an empty list, never an error.
    #[must_use]
    pub fn recommend_popular(
        &self,
        attributes: &UserAttributes,
        page: usize,
        page_size: Option<usize>,
    ) -> Vec<ProductRecord> {
        let size = page_size.unwrap_or(self.config.items_per_page);
        let gender = parse_gender(&attributes.gender);

        let mut candidates: Vec<&Product> = self
            .catalog
            .iter()
            .filter(|p| match gender {
                Gender::Unisex => true,
                g => p.gender == Some(g) || p.gender == Some(Gender::Unisex),
            })
            .collect();
        if candidates.is_empty() {
            tracing::warn!(
                gender = gender.as_str(),
                "no gender-compatible products; falling back to full catalog"
            );
            candidates = self.catalog.iter().collect();
        }

        // Stable sort keeps catalog order between equal scores.
        candidates.sort_by(|a, b| b.popularity_score().total_cmp(&a.popularity_score()));

        let start = page.saturating_mul(size);
        candidates
            .into_iter()
            .skip(start)
            .take(size)
            .map(ProductRecord::from_product)
            .collect()
    }

    /// JSON-ready record for a single catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownProduct`] when the id is not in the catalog
    /// snapshot.
    pub fn product_record(&self, id: ProductId) -> Result<ProductRecord> {
        self.catalog
            .get(id)
            .map(ProductRecord::from_product)
            .ok_or(Error::UnknownProduct(id))
    }

    /// The normalized catalog snapshot.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The interaction log snapshot.
    #[must_use]
    pub fn interaction_log(&self) -> &InteractionLog {
        &self.log
    }

    /// The effective configuration.
    #[must_use]
    pub fn config(&self) -> &RecoConfig {
        &self.config
    }
}

/// Slice of `ids` for the requested page; empty past the end.
fn paginate(ids: &[ProductId], page: usize, size: usize) -> &[ProductId] {
    let start = page.saturating_mul(size);
    if start >= ids.len() {
        return &[];
    }
    let end = (start + size).min(ids.len());
    &ids[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_windows() {
        let ids: Vec<ProductId> = (0..5).collect();
        assert_eq!(paginate(&ids, 0, 2), &[0, 1]);
        assert_eq!(paginate(&ids, 1, 2), &[2, 3]);
        assert_eq!(paginate(&ids, 2, 2), &[4]);
        assert!(paginate(&ids, 3, 2).is_empty());
        assert!(paginate(&ids, 100, 2).is_empty());
    }

    #[test]
    fn test_product_record_sentinels() {
        let product = Product::new(1, "Bare", "no numbers here");
        let record = ProductRecord::from_product(&product);
        assert_eq!(record.price, "N/A");
        assert_eq!(record.rating, "N/A");
        assert_eq!(record.review_count, "N/A");
        assert_eq!(record.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(record.product_url, PLACEHOLDER_URL);
    }

    #[test]
    fn test_product_record_values_pass_through() {
        let mut product = Product::new(1, "Full", "details");
        product.price = Some(199.0);
        product.rating = Some(4.5);
        product.review_count = Some(37);
        product.image_url = Some("https://img.example/1.jpg".to_string());
        product.product_url = Some("https://shop.example/1".to_string());
        let record = ProductRecord::from_product(&product);
        assert_eq!(record.price, "199");
        assert_eq!(record.rating, "4.5");
        assert_eq!(record.review_count, "37");
        assert_eq!(record.image_url, "https://img.example/1.jpg");
    }

    #[test]
    fn test_product_record_json_shape() {
        // The external layer consumes these records as JSON; field names
        // and sentinel values are part of the contract.
        let record = ProductRecord::from_product(&Product::new(1, "Bare", "no numbers"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["title"], "Bare");
        assert_eq!(json["price"], "N/A");
        assert_eq!(json["product_url"], "#");
        assert!(json["image_url"].as_str().unwrap().starts_with("https://"));
    }
}
