use serde::{Deserialize, Serialize};

/// Per-label centroid model over tf-idf vectors. Scores are cosine
/// similarities against each centroid, floored at zero and renormalized into
/// a pseudo-probability distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CentroidClassifier {
    centroids: Vec<Vec<f32>>,
}

impl CentroidClassifier {
    pub fn fit(vectors: &[Vec<f32>], classes: &[usize], class_count: usize) -> Self {
        let dims = vectors.first().map(Vec::len).unwrap_or(0);
        let mut sums = vec![vec![0.0_f32; dims]; class_count];
        let mut counts = vec![0_usize; class_count];

        for (vector, class) in vectors.iter().zip(classes) {
            counts[*class] += 1;
            for (acc, value) in sums[*class].iter_mut().zip(vector) {
                *acc += value;
            }
        }

        for (sum, count) in sums.iter_mut().zip(&counts) {
            if *count > 0 {
                for value in sum.iter_mut() {
                    *value /= *count as f32;
                }
            }
            normalize(sum);
        }

        Self { centroids: sums }
    }

    /// Returns one score per class, summing to 1.0, or all zeros when the
    /// query shares nothing with any centroid.
    pub fn probabilities(&self, query: &[f32]) -> Vec<f32> {
        let scores: Vec<f32> = self
            .centroids
            .iter()
            .map(|centroid| cosine_similarity(query, centroid).max(0.0))
            .collect();

        let total: f32 = scores.iter().sum();
        if total <= f32::EPSILON {
            return vec![0.0; scores.len()];
        }

        scores.iter().map(|score| score / total).collect()
    }

    pub fn class_count(&self) -> usize {
        self.centroids.len()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut a_norm = 0.0;
    let mut b_norm = 0.0;
    for (lhs, rhs) in a.iter().zip(b.iter()) {
        dot += lhs * rhs;
        a_norm += lhs * lhs;
        b_norm += rhs * rhs;
    }

    if a_norm == 0.0 || b_norm == 0.0 {
        0.0
    } else {
        dot / (a_norm.sqrt() * b_norm.sqrt())
    }
}

fn normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in values.iter_mut() {
            *value /= norm;
        }
    }
}
