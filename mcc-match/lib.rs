use log::{debug, trace};
use mcc_core::{CylinderDescriptor, MccError, MccResult};
use rayon::prelude::*;

/// Similarity of one descriptor pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairSimilarity {
    pub index_a: usize,
    pub index_b: usize,
    pub similarity: f64,
}

/// Scores two descriptor sets by the mean of their `top_k` best pair similarities.
///
/// Every pair takes part (no one-to-one assignment), so a fingerprint that
/// shares several strongly similar neighbourhoods scores high regardless of
/// how many unmatched minutiae either side carries.
#[derive(Debug, Clone)]
pub struct DescriptorMatcher {
    top_k: usize,
}

impl DescriptorMatcher {
    pub fn new(top_k: usize) -> MccResult<Self> {
        if top_k == 0 {
            return Err(MccError::InvalidTopK(top_k));
        }
        Ok(Self { top_k })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// All retained pair similarities, ordered by `(index_a, index_b)`.
    ///
    /// Zero-magnitude descriptors on either side, pairs of unequal length and
    /// non-finite similarities are left out.
    pub fn pair_similarities(&self, desc_a: &[CylinderDescriptor], desc_b: &[CylinderDescriptor]) -> Vec<PairSimilarity> {
        let norms_b: Vec<f64> = desc_b.iter().map(|d| d.norm()).collect();

        desc_a
            .par_iter()
            .enumerate()
            .flat_map_iter(|(index_a, d1)| {
                let n1 = d1.norm();
                let mut sims = Vec::new();
                if n1 == 0.0 {
                    return sims;
                }
                for (index_b, (d2, &n2)) in desc_b.iter().zip(norms_b.iter()).enumerate() {
                    if n2 == 0.0 {
                        continue;
                    }
                    if d1.len() != d2.len() {
                        trace!("skipping pair ({}, {}): lengths {} vs {}", index_a, index_b, d1.len(), d2.len());
                        continue;
                    }
                    let similarity = 1.0 - cosine_distance(d1.as_slice(), d2.as_slice());
                    if !similarity.is_finite() {
                        trace!("skipping pair ({}, {}): non-finite similarity", index_a, index_b);
                        continue;
                    }
                    sims.push(PairSimilarity {
                        index_a,
                        index_b,
                        similarity,
                    });
                }
                sims
            })
            .collect()
    }

    /// Mean of the `top_k` highest pair similarities; exactly 0.0 when no pair qualifies.
    pub fn score(&self, desc_a: &[CylinderDescriptor], desc_b: &[CylinderDescriptor]) -> f64 {
        let mut pool: Vec<f64> = self
            .pair_similarities(desc_a, desc_b)
            .into_iter()
            .map(|p| p.similarity)
            .collect();
        let score = top_k_mean(&mut pool, self.top_k);

        debug!(
            "DescriptorMatcher: {}x{} descriptors, pool {}, top {} -> {:.6}",
            desc_a.len(),
            desc_b.len(),
            pool.len(),
            self.top_k.min(pool.len()),
            score
        );
        score
    }
}

impl Default for DescriptorMatcher {
    fn default() -> Self {
        Self {
            top_k: mcc_core::DEFAULT_TOP_K,
        }
    }
}

/// Sorts `pool` descending and averages its first `k` values.
pub fn top_k_mean(pool: &mut [f64], k: usize) -> f64 {
    if pool.is_empty() || k == 0 {
        return 0.0;
    }
    pool.sort_by(|a, b| b.total_cmp(a));
    let best = &pool[..k.min(pool.len())];
    best.iter().sum::<f64>() / best.len() as f64
}

/// Cosine distance `1 − u·v / sqrt(|u|²·|v|²)`, clamped to `[0, 2]`.
///
/// NaN when either vector has zero magnitude.
pub fn cosine_distance(u: &[f64], v: &[f64]) -> f64 {
    let mut uv = 0.0;
    let mut uu = 0.0;
    let mut vv = 0.0;
    for (&a, &b) in u.iter().zip(v.iter()) {
        uv += a * b;
        uu += a * a;
        vv += b * b;
    }
    let dist = 1.0 - uv / (uu * vv).sqrt();
    if dist.is_nan() {
        return dist;
    }
    dist.clamp(0.0, 2.0)
}

/// Cosine similarity, `1 − cosine_distance`
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> f64 {
    1.0 - cosine_distance(u, v)
}
