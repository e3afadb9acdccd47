//! Hashed TF-IDF provider.
//!
//! Terms are hashed into fixed-dimension buckets and weighted by term
//! frequency with a length-based IDF approximation. Deterministic and always
//! available, with no network or model files.

use std::collections::HashMap;

use docweave_core::errors::EmbeddingError;
use docweave_core::traits::IEmbeddingProvider;
use xxhash_rust::xxh3::xxh3_64;

pub struct TfIdfProvider {
    dimensions: usize,
}

impl TfIdfProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Lowercase identifier-ish terms. camelCase and snake_case parts are
    /// emitted alongside the whole identifier.
    fn tokenize(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        for word in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if word.len() < 2 {
                continue;
            }
            out.push(word.to_lowercase());
            let parts = split_identifier(word);
            if parts.len() > 1 {
                out.extend(parts.into_iter().filter(|p| p.len() >= 2));
            }
        }
        out
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let tokens = Self::tokenize(text);
        let mut vec = vec![0.0f32; self.dimensions];
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        let total = tokens.len() as f32;
        for (term, count) in tf {
            let idf = 1.0 + (term.len() as f32).ln();
            let bucket = (xxh3_64(term.as_bytes()) % self.dimensions as u64) as usize;
            vec[bucket] += (count / total) * idf;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

fn split_identifier(word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in word.chars() {
        if c == '_' {
            if !current.is_empty() {
                parts.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

impl IEmbeddingProvider for TfIdfProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "tfidf"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosine_similarity;

    #[test]
    fn empty_text_returns_zero_vector() {
        let p = TfIdfProvider::new(128);
        let v = p.embed("").unwrap();
        assert_eq!(v.len(), 128);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn output_is_normalized() {
        let p = TfIdfProvider::new(256);
        let v = p.embed("fn parse_config(raw: &str) -> Config").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "expected unit norm, got {norm}");
    }

    #[test]
    fn deterministic_and_batch_consistent() {
        let p = TfIdfProvider::new(128);
        let texts = vec!["load the store".to_string(), "rank candidates".to_string()];
        let batch = p.embed_batch(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(batch[i], p.embed(text).unwrap());
        }
    }

    #[test]
    fn identifier_parts_match_prose() {
        let p = TfIdfProvider::new(256);
        let code = p.embed("def parseConfig(raw): return validate_fields(raw)").unwrap();
        let prose = p.embed("parse config and validate fields").unwrap();
        let other = p.embed("render html template widgets").unwrap();
        assert!(cosine_similarity(&code, &prose) > cosine_similarity(&code, &other));
    }

    #[test]
    fn splits_identifiers() {
        assert_eq!(split_identifier("parseConfig"), vec!["parse", "config"]);
        assert_eq!(split_identifier("get_edges_by"), vec!["get", "edges", "by"]);
        assert_eq!(split_identifier("HTTPServer"), vec!["httpserver"]);
    }
}
