//! Product catalog and attribute normalization.
//!
//! The ingestion layer hands the engine a flat table of products with, at
//! minimum, an id and a free-text detail field. [`Catalog::normalize`]
//! derives the categorical attributes (age group, season, gender) that the
//! eligibility filter needs, by keyword matching against the detail text,
//! and is idempotent: attributes already present are never overwritten.
//!
//! After normalization the catalog is immutable for the process lifetime;
//! every model is fitted against this frozen snapshot.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Product identifier.
pub type ProductId = u64;

/// Age group a product is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    /// Products for children.
    Kids,
    /// Products for adults.
    Adult,
    /// No age restriction.
    All,
}

/// Season a product is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    /// December through February in most supported regions.
    Winter,
    /// The hot months.
    Summer,
    /// The rainy season.
    Monsoon,
    /// Post-monsoon months.
    Autumn,
    /// Pre-summer months.
    Spring,
    /// Season-agnostic products.
    All,
}

impl Season {
    /// Lowercase keyword form used in feature strings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Summer => "summer",
            Season::Monsoon => "monsoon",
            Season::Autumn => "autumn",
            Season::Spring => "spring",
            Season::All => "all",
        }
    }
}

/// Gender a product is marketed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Products marketed to men.
    Male,
    /// Products marketed to women.
    Female,
    /// Products without a gender association.
    Unisex,
}

impl Gender {
    /// Lowercase keyword form used in feature strings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unisex => "unisex",
        }
    }
}

/// A single catalog entry.
///
/// Numeric fields are optional: the upstream scraper emits `"N/A"` for
/// ratings and review counts it could not read, and those parse to `None`.
/// Scoring treats missing numerics as zero contribution rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Free-text product details used for attribute derivation and TF-IDF.
    pub details: String,
    /// Listed price, if known.
    pub price: Option<f32>,
    /// Average rating, if known.
    pub rating: Option<f32>,
    /// Number of reviews, if known.
    pub review_count: Option<u32>,
    /// Product image URL, if scraped.
    pub image_url: Option<String>,
    /// Product page URL, if scraped.
    pub product_url: Option<String>,
    /// Derived or ingested age group.
    pub age_group: Option<AgeGroup>,
    /// Derived or ingested season.
    pub season: Option<Season>,
    /// Derived or ingested gender.
    pub gender: Option<Gender>,
}

impl Product {
    /// Creates a product with only the mandatory fields set.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            details: details.into(),
            price: None,
            rating: None,
            review_count: None,
            image_url: None,
            product_url: None,
            age_group: None,
            season: None,
            gender: None,
        }
    }

    /// Textual feature string for the content vector space: detail text
    /// plus the derived season and gender keywords.
    ///
    /// Call [`Catalog::normalize`] first; un-derived attributes contribute
    /// nothing to the string.
    #[must_use]
    pub fn combined_features(&self) -> String {
        let season = self.season.map_or("", Season::as_str);
        let gender = self.gender.map_or("", Gender::as_str);
        format!("{} {} {}", self.details, season, gender)
    }

    /// Popularity score `rating * ln(1 + review_count)`.
    ///
    /// Missing rating or review count contributes zero instead of failing,
    /// matching the legacy `"N/A"` convention.
    #[must_use]
    pub fn popularity_score(&self) -> f64 {
        let rating = f64::from(self.rating.unwrap_or(0.0));
        let reviews = f64::from(self.review_count.unwrap_or(0));
        rating * (1.0 + reviews).ln()
    }
}

/// Parses a scraped numeric field, treating `"N/A"` and garbage as absent.
#[must_use]
pub fn parse_numeric_field(raw: &str) -> Option<f32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }
    trimmed.parse().ok()
}

/// Season keywords in derivation priority order. First match wins.
const SEASON_KEYWORDS: [(&str, Season); 5] = [
    ("winter", Season::Winter),
    ("summer", Season::Summer),
    ("monsoon", Season::Monsoon),
    ("autumn", Season::Autumn),
    ("spring", Season::Spring),
];

fn derive_season(details: &str) -> Season {
    let lower = details.to_lowercase();
    for (keyword, season) in SEASON_KEYWORDS {
        if lower.contains(keyword) {
            return season;
        }
    }
    Season::All
}

fn derive_gender(details: &str) -> Gender {
    let lower = details.to_lowercase();
    // "woman"/"women" contain "man"/"men", so the female check must come
    // first for the match to be unambiguous.
    if lower.contains("woman") || lower.contains("women") {
        Gender::Female
    } else if lower.contains("man") || lower.contains("men") {
        Gender::Male
    } else {
        Gender::Unisex
    }
}

fn derive_age_group(details: &str) -> AgeGroup {
    if details.to_lowercase().contains("kid") {
        AgeGroup::Kids
    } else {
        AgeGroup::Adult
    }
}

/// In-memory product table with id lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index_of: FxHashMap<ProductId, usize>,
}

impl Catalog {
    /// Builds a catalog from product rows. Later rows win on duplicate ids.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let index_of = products
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id, idx))
            .collect();
        Self { products, index_of }
    }

    /// Derives missing age group, season and gender attributes from the
    /// detail text. Idempotent: already-set attributes are left untouched,
    /// so re-running on annotated data changes nothing.
    pub fn normalize(&mut self) {
        for product in &mut self.products {
            if product.season.is_none() {
                product.season = Some(derive_season(&product.details));
            }
            if product.gender.is_none() {
                product.gender = Some(derive_gender(&product.details));
            }
            if product.age_group.is_none() {
                product.age_group = Some(derive_age_group(&product.details));
            }
        }
    }

    /// Looks up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index_of.get(&id).map(|&idx| &self.products[idx])
    }

    /// Dense position of a product in catalog order.
    #[must_use]
    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Product ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.products.iter().map(|p| p.id)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.products.iter()
    }
}
