use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

const MAX_FEATURES: usize = 5000;

/// Corpus-fitted tf-idf weighting over unigrams and bigrams of whitespace
/// tokens. Terms unseen at fit time are ignored at transform time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
}

impl TermVectorizer {
    pub fn fit(corpus: &[String]) -> Self {
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for document in corpus {
            let mut seen: HashSet<String> = HashSet::new();
            for term in terms(document) {
                if seen.insert(term.clone()) {
                    *document_frequency.entry(term).or_insert(0) += 1;
                }
            }
        }

        let mut ordered: Vec<(String, usize)> = document_frequency.into_iter().collect();
        if ordered.len() > MAX_FEATURES {
            ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ordered.truncate(MAX_FEATURES);
        }
        // alphabetical index assignment keeps fits reproducible
        ordered.sort_by(|a, b| a.0.cmp(&b.0));

        let document_count = corpus.len() as f32;
        let mut vocabulary = HashMap::with_capacity(ordered.len());
        let mut idf = Vec::with_capacity(ordered.len());
        for (index, (term, frequency)) in ordered.into_iter().enumerate() {
            vocabulary.insert(term, index);
            idf.push(((1.0 + document_count) / (1.0 + frequency as f32)).ln() + 1.0);
        }

        Self { vocabulary, idf }
    }

    pub fn transform(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.idf.len()];
        for term in terms(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                vector[index] += self.idf[index];
            }
        }
        normalize(&mut vector);
        vector
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }
}

fn terms(text: &str) -> Vec<String> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();

    let mut terms = tokens.clone();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

fn normalize(values: &mut [f32]) {
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in values.iter_mut() {
            *value /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn captures_unigrams_and_bigrams() {
        let vectorizer = TermVectorizer::fit(&corpus(&["hello there machan"]));
        // 3 unigrams + 2 bigrams
        assert_eq!(vectorizer.vocabulary_len(), 5);
    }

    #[test]
    fn transform_is_unit_length_for_known_text() {
        let vectorizer = TermVectorizer::fit(&corpus(&["kohomada machan", "hello there"]));
        let vector = vectorizer.transform("kohomada machan");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unseen_terms_produce_a_zero_vector() {
        let vectorizer = TermVectorizer::fit(&corpus(&["kohomada machan"]));
        let vector = vectorizer.transform("completely different words");
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn tokens_are_lowercased() {
        let vectorizer = TermVectorizer::fit(&corpus(&["kohomada"]));
        let upper = vectorizer.transform("KOHOMADA");
        let lower = vectorizer.transform("kohomada");
        assert_eq!(upper, lower);
        assert!(upper.iter().any(|v| *v > 0.0));
    }
}
