//! Content vector space: TF-IDF term vectors over product feature strings.
//!
//! The model is fitted once over the whole catalog at startup. Vocabulary
//! and document-frequency statistics are frozen at fit time; user profile
//! vectors and ad-hoc queries are embedded against the same vocabulary
//! without refitting, so every vector lives in the same space.

use crate::catalog::{Catalog, ProductId};
use crate::error::{Error, Result};
use rustc_hash::FxHashMap;

/// Common English words removed before vocabulary construction.
const STOP_WORDS: [&str; 36] = [
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "is",
    "it", "its", "of", "on", "or", "that", "the", "their", "this", "to", "was", "were", "will",
    "with", "you", "your", "not", "no", "but", "they", "them", "then",
];

/// Sparse weighted-term vector.
///
/// Terms are stored as `(term_index, weight)` pairs sorted by term index,
/// which keeps dot products a linear merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    terms: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Builds a vector from unsorted `(term, weight)` pairs, dropping zero
    /// weights and summing duplicates.
    #[must_use]
    pub fn from_pairs(mut pairs: Vec<(u32, f32)>) -> Self {
        pairs.sort_unstable_by_key(|&(idx, _)| idx);
        let mut terms: Vec<(u32, f32)> = Vec::with_capacity(pairs.len());
        for (idx, weight) in pairs {
            if weight == 0.0 {
                continue;
            }
            match terms.last_mut() {
                Some((last_idx, last_weight)) if *last_idx == idx => *last_weight += weight,
                _ => terms.push((idx, weight)),
            }
        }
        Self { terms }
    }

    /// The stored `(term_index, weight)` pairs, sorted by term index.
    #[must_use]
    pub fn terms(&self) -> &[(u32, f32)] {
        &self.terms
    }

    /// Whether the vector has no non-zero components.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Dot product with another sparse vector.
    #[must_use]
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.terms.len() && j < other.terms.len() {
            let (a_idx, a_w) = self.terms[i];
            let (b_idx, b_w) = other.terms[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Euclidean norm.
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.terms
            .iter()
            .map(|&(_, w)| w * w)
            .sum::<f32>()
            .sqrt()
    }

    /// Scales every component in place.
    pub fn scale(&mut self, factor: f32) {
        for (_, w) in &mut self.terms {
            *w *= factor;
        }
    }

    fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            self.scale(1.0 / norm);
        }
    }
}

/// Lowercase alphanumeric tokens of `text`, stop words removed.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// TF-IDF model over the product catalog.
///
/// One L2-normalized vector per product; `idf(t) = ln((1+n)/(1+df)) + 1`
/// (smoothed so fit-time terms never get a zero weight).
#[derive(Debug, Clone)]
pub struct TfidfModel {
    vocabulary: Vec<String>,
    term_index: FxHashMap<String, u32>,
    idf: Vec<f32>,
    vectors: FxHashMap<ProductId, SparseVector>,
}

impl TfidfModel {
    /// Fits vocabulary, document frequencies and per-product vectors over
    /// the normalized catalog's feature strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelFit`] for an empty catalog or a catalog whose
    /// feature strings yield no vocabulary at all.
    pub fn fit(catalog: &Catalog) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::ModelFit(
                "cannot fit TF-IDF on an empty catalog".to_string(),
            ));
        }

        let documents: Vec<(ProductId, Vec<String>)> = catalog
            .iter()
            .map(|p| (p.id, tokenize(&p.combined_features())))
            .collect();

        // Vocabulary in first-seen order; document frequency per term.
        let mut term_index: FxHashMap<String, u32> = FxHashMap::default();
        let mut vocabulary = Vec::new();
        let mut doc_freq: Vec<u32> = Vec::new();
        for (_, tokens) in &documents {
            let mut seen_in_doc = vec![false; vocabulary.len()];
            for token in tokens {
                let idx = *term_index.entry(token.clone()).or_insert_with(|| {
                    vocabulary.push(token.clone());
                    doc_freq.push(0);
                    seen_in_doc.push(false);
                    u32::try_from(vocabulary.len() - 1).unwrap_or(u32::MAX)
                });
                let idx = idx as usize;
                if !seen_in_doc[idx] {
                    seen_in_doc[idx] = true;
                    doc_freq[idx] += 1;
                }
            }
        }

        if vocabulary.is_empty() {
            return Err(Error::ModelFit(
                "catalog feature strings produced an empty vocabulary".to_string(),
            ));
        }

        #[allow(clippy::cast_precision_loss)] // document counts are far below 2^23
        let n_docs = documents.len() as f32;
        let idf: Vec<f32> = doc_freq
            .iter()
            .map(|&df| {
                #[allow(clippy::cast_precision_loss)]
                let df = df as f32;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut vectors = FxHashMap::default();
        for (product_id, tokens) in &documents {
            let mut counts: FxHashMap<u32, f32> = FxHashMap::default();
            for token in tokens {
                if let Some(&idx) = term_index.get(token) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
            let pairs = counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * idf[idx as usize]))
                .collect();
            let mut vector = SparseVector::from_pairs(pairs);
            vector.l2_normalize();
            vectors.insert(*product_id, vector);
        }

        tracing::info!(
            products = documents.len(),
            vocabulary = vocabulary.len(),
            "TF-IDF model fitted"
        );

        Ok(Self {
            vocabulary,
            term_index,
            idf,
            vectors,
        })
    }

    /// Number of terms in the fitted vocabulary.
    #[must_use]
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// The fitted vector for a product, if the product was in the catalog
    /// at fit time.
    #[must_use]
    pub fn vector_of(&self, product_id: ProductId) -> Option<&SparseVector> {
        self.vectors.get(&product_id)
    }

    /// Embeds arbitrary text into the fitted vector space.
    ///
    /// Uses the fit-time vocabulary and idf weights without refitting;
    /// terms unseen at fit time contribute nothing.
    #[must_use]
    pub fn embed(&self, text: &str) -> SparseVector {
        let mut counts: FxHashMap<u32, f32> = FxHashMap::default();
        for token in tokenize(text) {
            if let Some(&idx) = self.term_index.get(&token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }
        let pairs = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx as usize]))
            .collect();
        let mut vector = SparseVector::from_pairs(pairs);
        vector.l2_normalize();
        vector
    }

    /// Ranks `candidates` by cosine similarity to `query`, descending.
    ///
    /// The sort is stable, so ties keep the candidate order the caller
    /// passed in (catalog order for full-catalog queries). Candidates with
    /// no fitted vector are skipped. An all-zero query yields an empty
    /// ranking rather than dividing by zero.
    #[must_use]
    pub fn similarity_rank(
        &self,
        query: &SparseVector,
        candidates: &[ProductId],
    ) -> Vec<(ProductId, f32)> {
        let query_norm = query.norm();
        if query_norm == 0.0 {
            return Vec::new();
        }

        let mut ranked: Vec<(ProductId, f32)> = candidates
            .iter()
            .filter_map(|&id| {
                self.vectors.get(&id).map(|v| {
                    // Stored vectors are unit length; only the query norm
                    // needs dividing out.
                    (id, query.dot(v) / query_norm)
                })
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}
