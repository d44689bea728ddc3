//! # `Bazaari` Core
//!
//! Hybrid product recommendation engine written in Rust.
//!
//! `Bazaari` ranks catalog products for a user by fusing three signals:
//! what their demographic segment buys, what resembles their own history
//! in TF-IDF space, and what a collaborative rating estimator expects
//! them to like. Rankings are deterministic for a fixed data snapshot,
//! configuration and seed.
//!
//! ## Features
//!
//! - **Demographic segmentation**: seeded k-means over one-hot encoded
//!   user attributes, with per-segment popularity tables
//! - **Content similarity**: TF-IDF vector space over product text with
//!   cosine ranking against the user's interaction profile
//! - **Collaborative estimates**: SGD-trained matrix factorization with
//!   user/item biases and a global-mean cold fallback
//! - **Eligibility gate**: season/age/gender compatibility with an
//!   explicit full-catalog fallback
//! - **Hybrid blend**: weighted score fusion producing one deduplicated,
//!   paginated ranking
//!
//! ## Quick Start
//!
//! ```rust
//! use bazaari_core::{
//!     Interaction, Product, RecoConfig, Recommender, UserAttributes, UserRecord,
//! };
//!
//! fn main() -> bazaari_core::Result<()> {
//!     let products = vec![
//!         Product::new(1, "Wool Scarf", "warm winter scarf for men"),
//!         Product::new(2, "Linen Shirt", "light summer shirt for men"),
//!         Product::new(3, "Rain Poncho", "monsoon poncho"),
//!     ];
//!     let users = vec![
//!         UserRecord::new("ravi@example.com", UserAttributes::new(29, "male", "Delhi")),
//!         UserRecord::new("meera@example.com", UserAttributes::new(34, "female", "Mumbai")),
//!     ];
//!     let interactions = vec![
//!         Interaction::new("ravi@example.com", 1, 5.0),
//!         Interaction::new("meera@example.com", 3, 4.0),
//!     ];
//!
//!     let config = RecoConfig {
//!         num_segments: 2,
//!         ..RecoConfig::default()
//!     };
//!     let engine = Recommender::fit(products, &users, interactions, config)?;
//!
//!     // January in Delhi: winter-compatible products, Ravi's scarf excluded.
//!     let page = engine.recommend_at(&users[0], 3, 1, 0, Some(10))?;
//!     assert!(page.iter().all(|r| r.title != "Wool Scarf"));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
// Clippy lints configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(
        clippy::doc_markdown,
        clippy::uninlined_format_args,
        clippy::single_match_else,
        clippy::cast_lossless,
        clippy::manual_assert,
        clippy::float_cmp
    )
)]

pub mod blend;
pub mod catalog;
pub mod collab;
#[cfg(test)]
mod collab_tests;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod content;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod interactions;
pub mod metrics;
pub mod profile;
pub mod segment;

pub use blend::{blend, fuse, BlendWeights};
pub use catalog::{AgeGroup, Catalog, Gender, Product, ProductId, Season};
pub use collab::{CollabConfig, SvdModel};
pub use config::{BlendConfig, RecoConfig};
pub use content::{SparseVector, TfidfModel};
pub use eligibility::{eligible_products, parse_gender, season_for, Eligible, UserContext};
pub use engine::{ProductRecord, Recommender, UserRecord};
pub use error::{Error, Result};
pub use interactions::{Interaction, InteractionLog, PopularityRanker};
pub use profile::build_profile;
pub use segment::{KMeans, OneHotSchema, UserAttributes, UserSegmenter};
