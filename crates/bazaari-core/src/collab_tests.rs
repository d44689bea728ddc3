//! Tests for the collaborative estimator.

use crate::collab::{CollabConfig, SvdModel};
use crate::interactions::{Interaction, InteractionLog};

fn training_log() -> InteractionLog {
    InteractionLog::new(vec![
        Interaction::new("u1", 101, 5.0),
        Interaction::new("u1", 102, 4.0),
        Interaction::new("u2", 102, 5.0),
        Interaction::new("u2", 103, 3.0),
        Interaction::new("u3", 101, 4.0),
        Interaction::new("u3", 104, 2.0),
        Interaction::new("u4", 105, 5.0),
        Interaction::new("u4", 103, 4.0),
        Interaction::new("u5", 104, 3.0),
        Interaction::new("u5", 105, 4.0),
    ])
}

#[test]
fn test_fit_rejects_empty_log() {
    let err = SvdModel::fit(&InteractionLog::default(), &CollabConfig::default());
    assert!(err.is_err());
}

#[test]
fn test_fit_rejects_zero_factors() {
    let config = CollabConfig {
        latent_factors: 0,
        ..CollabConfig::default()
    };
    assert!(SvdModel::fit(&training_log(), &config).is_err());
}

#[test]
fn test_predictions_stay_in_rating_scale() {
    let model = SvdModel::fit(&training_log(), &CollabConfig::default()).unwrap();
    for user in ["u1", "u2", "u3", "u4", "u5", "stranger"] {
        for product in [101, 102, 103, 104, 105, 999] {
            let estimate = model.predict(user, product);
            assert!((1.0..=5.0).contains(&estimate), "{user}/{product}: {estimate}");
        }
    }
}

#[test]
fn test_cold_user_and_product_fall_back_to_global_mean() {
    let model = SvdModel::fit(&training_log(), &CollabConfig::default()).unwrap();
    let estimate = model.predict("stranger", 999);
    assert!((estimate - model.global_mean()).abs() < 1e-6);
}

#[test]
fn test_global_mean_matches_log() {
    let model = SvdModel::fit(&training_log(), &CollabConfig::default()).unwrap();
    // (5+4+5+3+4+2+5+4+3+4) / 10 = 3.9
    assert!((model.global_mean() - 3.9).abs() < 1e-5);
}

#[test]
fn test_fit_is_deterministic_for_a_seed() {
    let log = training_log();
    let a = SvdModel::fit(&log, &CollabConfig::default()).unwrap();
    let b = SvdModel::fit(&log, &CollabConfig::default()).unwrap();
    for product in [101, 102, 103, 104, 105] {
        assert_eq!(a.predict("u1", product), b.predict("u1", product));
    }
}

#[test]
fn test_rank_orders_by_estimate_then_id() {
    let model = SvdModel::fit(&training_log(), &CollabConfig::default()).unwrap();
    let ranked = model.rank("u1", &[103, 104, 105]);
    assert_eq!(ranked.len(), 3);
    for pair in ranked.windows(2) {
        assert!(
            pair[0].1 > pair[1].1 || (pair[0].1 == pair[1].1 && pair[0].0 < pair[1].0),
            "ranking out of order: {pair:?}"
        );
    }

    // Two fully cold products get identical (global mean) estimates: the
    // tie must resolve by ascending id.
    let cold = model.rank("stranger", &[901, 900]);
    assert_eq!(cold[0].0, 900);
    assert_eq!(cold[1].0, 901);
}

#[test]
fn test_liked_products_rank_above_disliked_for_similar_users() {
    // u1 and u3 both rate 101 highly; u3 rates 104 poorly. For u1 the model
    // should prefer 102 (liked by u1's neighbor u2) over 104.
    let config = CollabConfig {
        epochs: 80,
        ..CollabConfig::default()
    };
    let model = SvdModel::fit(&training_log(), &config).unwrap();
    assert!(model.predict("u1", 102) > model.predict("u1", 104));
}
