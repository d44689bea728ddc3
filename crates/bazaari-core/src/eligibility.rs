//! Eligibility filtering: season/age/gender compatibility gate.
//!
//! A user's context (age group, season, gender) is derived from their
//! attributes plus the current month, then products are filtered to the
//! compatible subset. An empty result falls back to the full catalog —
//! the fallback is explicit in the return value so callers and logs can
//! tell a degraded result from a matched one.

use crate::catalog::{AgeGroup, Catalog, Gender, ProductId, Season};
use crate::segment::UserAttributes;

/// Age (in years) at or below which a user shops the Kids range.
pub const DEFAULT_KIDS_AGE_CUTOFF: u32 = 12;

/// Per-city month-to-season table. Months are 1-based; unknown cities and
/// months map to [`Season::All`].
const SEASON_TABLE: [(&str, [Season; 12]); 3] = {
    use Season::{Autumn, Monsoon, Spring, Summer, Winter};
    [
        (
            "delhi",
            [
                Winter, Winter, Spring, Spring, Summer, Summer, Monsoon, Monsoon, Autumn, Autumn,
                Autumn, Winter,
            ],
        ),
        (
            "mumbai",
            [
                Winter, Winter, Summer, Summer, Summer, Monsoon, Monsoon, Monsoon, Monsoon,
                Autumn, Autumn, Winter,
            ],
        ),
        (
            "chennai",
            [
                Winter, Winter, Summer, Summer, Summer, Summer, Monsoon, Monsoon, Monsoon,
                Autumn, Autumn, Winter,
            ],
        ),
    ]
};

/// Season for a location and 1-based month. Unknown locations or
/// out-of-range months yield [`Season::All`].
#[must_use]
pub fn season_for(location: &str, month: u32) -> Season {
    if !(1..=12).contains(&month) {
        return Season::All;
    }
    let location = location.to_lowercase();
    for (city, months) in &SEASON_TABLE {
        if *city == location {
            return months[(month - 1) as usize];
        }
    }
    Season::All
}

/// Parses the free-text gender attribute; anything unrecognized is
/// [`Gender::Unisex`].
#[must_use]
pub fn parse_gender(raw: &str) -> Gender {
    match raw.to_lowercase().as_str() {
        "male" | "m" => Gender::Male,
        "female" | "f" => Gender::Female,
        _ => Gender::Unisex,
    }
}

/// A user's inferred shopping context for eligibility filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    /// Kids at or below the cutoff age, Adult above.
    pub age_group: AgeGroup,
    /// Season inferred from location and month.
    pub season: Season,
    /// Gender parsed from the free-text attribute; unknown values are
    /// Unisex.
    pub gender: Gender,
}

impl UserContext {
    /// Derives the context from user attributes and the 1-based month.
    #[must_use]
    pub fn derive(attributes: &UserAttributes, month: u32, kids_age_cutoff: u32) -> Self {
        let age_group = if attributes.age <= kids_age_cutoff {
            AgeGroup::Kids
        } else {
            AgeGroup::Adult
        };
        Self {
            age_group,
            season: season_for(&attributes.location, month),
            gender: parse_gender(&attributes.gender),
        }
    }
}

/// Result of the eligibility filter. `fell_back` is true when no product
/// matched and the full catalog was returned instead.
#[derive(Debug, Clone)]
pub struct Eligible {
    /// Eligible product ids in catalog order.
    pub product_ids: Vec<ProductId>,
    /// Whether the empty-set fallback fired.
    pub fell_back: bool,
}

fn matches(product_attr: Option<Season>, user: Season) -> bool {
    matches!(product_attr, Some(s) if s == user || s == Season::All)
}

fn matches_age(product_attr: Option<AgeGroup>, user: AgeGroup) -> bool {
    matches!(product_attr, Some(a) if a == user || a == AgeGroup::All)
}

fn matches_gender(product_attr: Option<Gender>, user: Gender) -> bool {
    matches!(product_attr, Some(g) if g == user || g == Gender::Unisex)
}

/// Filters the catalog to products compatible with the user's context.
///
/// A product is eligible when its season, age group and gender each match
/// the user's or are the catch-all value. An empty result falls back to
/// every product id, flagged and logged as a degraded condition. Call
/// after [`Catalog::normalize`]; products with underived attributes never
/// match.
#[must_use]
pub fn eligible_products(catalog: &Catalog, context: &UserContext) -> Eligible {
    let product_ids: Vec<ProductId> = catalog
        .iter()
        .filter(|p| {
            matches(p.season, context.season)
                && matches_age(p.age_group, context.age_group)
                && matches_gender(p.gender, context.gender)
        })
        .map(|p| p.id)
        .collect();

    if product_ids.is_empty() {
        tracing::warn!(
            season = ?context.season,
            age_group = ?context.age_group,
            gender = ?context.gender,
            "eligibility filter matched nothing; falling back to full catalog"
        );
        return Eligible {
            product_ids: catalog.ids().collect(),
            fell_back: true,
        };
    }

    Eligible {
        product_ids,
        fell_back: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Product;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new(vec![
            Product::new(1, "P1", "winter jacket for men"),
            Product::new(2, "P2", "summer dress for women"),
            Product::new(3, "P3", "plain scarf"),
            Product::new(4, "P4", "winter boots for kids"),
        ]);
        catalog.normalize();
        catalog
    }

    #[test]
    fn test_season_table() {
        assert_eq!(season_for("Delhi", 1), Season::Winter);
        assert_eq!(season_for("delhi", 7), Season::Monsoon);
        assert_eq!(season_for("Mumbai", 4), Season::Summer);
        assert_eq!(season_for("Chennai", 10), Season::Autumn);
        assert_eq!(season_for("Atlantis", 5), Season::All);
        assert_eq!(season_for("Delhi", 0), Season::All);
        assert_eq!(season_for("Delhi", 13), Season::All);
    }

    #[test]
    fn test_parse_gender() {
        assert_eq!(parse_gender("Male"), Gender::Male);
        assert_eq!(parse_gender("m"), Gender::Male);
        assert_eq!(parse_gender("FEMALE"), Gender::Female);
        assert_eq!(parse_gender("f"), Gender::Female);
        assert_eq!(parse_gender(""), Gender::Unisex);
        assert_eq!(parse_gender("nonbinary"), Gender::Unisex);
    }

    #[test]
    fn test_context_derivation() {
        let attrs = UserAttributes::new(10, "MALE", "Delhi");
        let ctx = UserContext::derive(&attrs, 1, DEFAULT_KIDS_AGE_CUTOFF);
        assert_eq!(ctx.age_group, AgeGroup::Kids);
        assert_eq!(ctx.season, Season::Winter);
        assert_eq!(ctx.gender, Gender::Male);

        let attrs = UserAttributes::new(13, "weird", "Nowhere");
        let ctx = UserContext::derive(&attrs, 6, DEFAULT_KIDS_AGE_CUTOFF);
        assert_eq!(ctx.age_group, AgeGroup::Adult);
        assert_eq!(ctx.season, Season::All);
        assert_eq!(ctx.gender, Gender::Unisex);
    }

    #[test]
    fn test_filter_matches_season_age_gender() {
        let catalog = catalog();
        let ctx = UserContext {
            age_group: AgeGroup::Adult,
            season: Season::Winter,
            gender: Gender::Male,
        };
        let eligible = eligible_products(&catalog, &ctx);
        assert!(!eligible.fell_back);
        // 1: winter/adult/male. 3: all/adult/unisex. 2 is summer+female,
        // 4 is kids.
        assert_eq!(eligible.product_ids, vec![1, 3]);
    }

    #[test]
    fn test_empty_filter_falls_back_to_full_catalog() {
        let mut catalog = Catalog::new(vec![Product::new(1, "P1", "summer dress for women")]);
        catalog.normalize();
        let ctx = UserContext {
            age_group: AgeGroup::Adult,
            season: Season::Winter,
            gender: Gender::Male,
        };
        let eligible = eligible_products(&catalog, &ctx);
        assert!(eligible.fell_back);
        assert_eq!(eligible.product_ids, vec![1]);
    }
}
