//! User segmentation: one-hot demographic encoding + k-means clustering.
//!
//! The encoding schema is explicit and versioned by construction: an
//! ordered list of feature columns fixed at fit time. Encoding a new user
//! is a pure alignment against that list — category values unseen at fit
//! time contribute an all-zero encoding for their feature, and no new
//! column is ever created at inference time. Column order always matches
//! the fitted order, so centroids and encodings stay comparable.

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Demographic attributes of a user, as supplied by the external layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAttributes {
    /// Age in years.
    pub age: u32,
    /// Free-text gender value ("Male", "Female", anything else).
    pub gender: String,
    /// Free-text city name.
    pub location: String,
}

impl UserAttributes {
    /// Convenience constructor.
    #[must_use]
    pub fn new(age: u32, gender: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            age,
            gender: gender.into(),
            location: location.into(),
        }
    }
}

/// Ordered one-hot encoding schema fixed at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotSchema {
    columns: Vec<String>,
}

impl OneHotSchema {
    /// Builds the schema from the training users: a numeric `age` column
    /// followed by one `gender=<value>` and `location=<value>` column per
    /// distinct value, in first-seen order.
    #[must_use]
    pub fn fit(users: &[UserAttributes]) -> Self {
        let mut columns = vec!["age".to_string()];
        let mut push_unique = |columns: &mut Vec<String>, column: String| {
            if !columns.contains(&column) {
                columns.push(column);
            }
        };
        for user in users {
            push_unique(&mut columns, format!("gender={}", user.gender));
        }
        for user in users {
            push_unique(&mut columns, format!("location={}", user.location));
        }
        Self { columns }
    }

    /// The fitted column names, in encoding order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Encodes a user against the fitted schema.
    ///
    /// Pure alignment: every fitted column gets a value (zero-filled when
    /// the user's category differs), and unseen category values add no
    /// column — they simply leave their feature all-zero.
    #[must_use]
    pub fn encode(&self, user: &UserAttributes) -> Vec<f32> {
        let gender_column = format!("gender={}", user.gender);
        let location_column = format!("location={}", user.location);
        self.columns
            .iter()
            .map(|column| {
                if column == "age" {
                    #[allow(clippy::cast_precision_loss)] // ages are tiny
                    {
                        user.age as f32
                    }
                } else if *column == gender_column || *column == location_column {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Lloyd's k-means with seeded k-means++ initialization.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    max_iter: usize,
    tol: f32,
    seed: u64,
    centroids: Vec<Vec<f32>>,
}

impl KMeans {
    /// Creates an unfitted model.
    #[must_use]
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            max_iter: 100,
            tol: 1e-4,
            seed,
            centroids: Vec::new(),
        }
    }

    /// Fits centroids over the sample rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelFit`] when there are no samples, `k == 0`, or
    /// fewer samples than clusters.
    pub fn fit(&mut self, samples: &[Vec<f32>]) -> Result<()> {
        if self.k == 0 {
            return Err(Error::ModelFit("k-means requires k >= 1".to_string()));
        }
        if samples.len() < self.k {
            return Err(Error::ModelFit(format!(
                "k-means requires at least k samples (k={}, samples={})",
                self.k,
                samples.len()
            )));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.centroids = Self::init_plus_plus(samples, self.k, &mut rng);

        let dims = samples[0].len();
        for _ in 0..self.max_iter {
            // Assignment step.
            let labels: Vec<usize> = samples
                .iter()
                .map(|s| self.nearest_centroid(s))
                .collect();

            // Update step.
            let mut sums = vec![vec![0.0f32; dims]; self.k];
            let mut counts = vec![0usize; self.k];
            for (sample, &label) in samples.iter().zip(&labels) {
                counts[label] += 1;
                for (acc, value) in sums[label].iter_mut().zip(sample) {
                    *acc += value;
                }
            }

            let mut shift = 0.0f32;
            for (cluster, sum) in sums.into_iter().enumerate() {
                if counts[cluster] == 0 {
                    // Empty cluster keeps its previous centroid.
                    continue;
                }
                #[allow(clippy::cast_precision_loss)] // cluster sizes are small
                let inv = 1.0 / counts[cluster] as f32;
                let new_centroid: Vec<f32> = sum.into_iter().map(|v| v * inv).collect();
                shift += squared_distance(&self.centroids[cluster], &new_centroid);
                self.centroids[cluster] = new_centroid;
            }

            if shift < self.tol {
                break;
            }
        }

        Ok(())
    }

    fn init_plus_plus(samples: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
        let first = rng.gen_range(0..samples.len());
        let mut centroids = vec![samples[first].clone()];

        while centroids.len() < k {
            // Weight each sample by distance to its nearest chosen centroid.
            let weights: Vec<f32> = samples
                .iter()
                .map(|s| {
                    centroids
                        .iter()
                        .map(|c| squared_distance(s, c))
                        .fold(f32::INFINITY, f32::min)
                })
                .collect();
            let total: f32 = weights.iter().sum();
            let chosen = if total > 0.0 {
                let mut target = rng.gen_range(0.0..total);
                let mut index = 0;
                for (i, w) in weights.iter().enumerate() {
                    if target < *w {
                        index = i;
                        break;
                    }
                    target -= w;
                }
                index
            } else {
                // All samples coincide with existing centroids.
                rng.gen_range(0..samples.len())
            };
            centroids.push(samples[chosen].clone());
        }

        centroids
    }

    /// Index of the nearest centroid (lowest index wins ties).
    #[must_use]
    pub fn nearest_centroid(&self, sample: &[f32]) -> usize {
        let mut best = 0;
        let mut best_dist = f32::INFINITY;
        for (idx, centroid) in self.centroids.iter().enumerate() {
            let dist = squared_distance(sample, centroid);
            if dist < best_dist {
                best_dist = dist;
                best = idx;
            }
        }
        best
    }

    /// Number of clusters.
    #[must_use]
    pub fn num_clusters(&self) -> usize {
        self.k
    }
}

/// Fitted demographic segmenter: encoding schema + cluster centroids.
///
/// Assignment is a pure function of the user's attributes and the fitted
/// state; it is never refit per request.
#[derive(Debug, Clone)]
pub struct UserSegmenter {
    schema: OneHotSchema,
    kmeans: KMeans,
}

impl UserSegmenter {
    /// Fits the encoding schema and clusters over the existing users.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelFit`] when there are no users or fewer users
    /// than requested segments.
    pub fn fit(users: &[UserAttributes], num_segments: usize, seed: u64) -> Result<Self> {
        if users.is_empty() {
            return Err(Error::ModelFit(
                "cannot segment an empty user table".to_string(),
            ));
        }
        let schema = OneHotSchema::fit(users);
        let samples: Vec<Vec<f32>> = users.iter().map(|u| schema.encode(u)).collect();
        let mut kmeans = KMeans::new(num_segments, seed);
        kmeans.fit(&samples)?;

        tracing::info!(
            users = users.len(),
            segments = num_segments,
            features = schema.columns().len(),
            "user segmenter fitted"
        );

        Ok(Self { schema, kmeans })
    }

    /// Assigns a user (existing or new) to the nearest fitted segment.
    ///
    /// Always returns a value in `[0, num_segments)`. Unseen gender or
    /// location values zero-encode and still map to some segment.
    #[must_use]
    pub fn assign(&self, user: &UserAttributes) -> usize {
        self.kmeans.nearest_centroid(&self.schema.encode(user))
    }

    /// Number of fitted segments.
    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.kmeans.num_clusters()
    }

    /// The fitted encoding schema.
    #[must_use]
    pub fn schema(&self) -> &OneHotSchema {
        &self.schema
    }
}
