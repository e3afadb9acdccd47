//! Three-factor scorer.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use docweave_core::config::RankWeights;
use docweave_core::models::ChunkRecord;
use docweave_core::traits::IEmbeddingProvider;
use docweave_embeddings::cosine_similarity;
use docweave_storage::FtsHit;
use serde::Serialize;
use tracing::warn;

/// A candidate chunk with its combined and per-factor scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: ChunkRecord,
    pub score: f64,
    pub lexical: f64,
    pub graph: f64,
    pub embedding: f64,
}

/// Divide by the maximum; all-zero inputs stay zero.
fn normalize(values: &mut [f64]) {
    let max = values.iter().copied().fold(0.0f64, f64::max);
    if max > f64::EPSILON {
        for v in values.iter_mut() {
            *v = (*v / max).clamp(0.0, 1.0);
        }
    }
}

/// Lowercased query words, for matching symbol names.
pub fn query_terms(query: &str) -> HashSet<String> {
    query
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.len() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Cosine of each candidate against the query, or `None` when the
/// provider fails.
fn embedding_scores(
    embedder: &dyn IEmbeddingProvider,
    query: &str,
    candidates: &[FtsHit],
) -> Option<Vec<f64>> {
    let mut texts = Vec::with_capacity(candidates.len() + 1);
    texts.push(query.to_string());
    texts.extend(candidates.iter().map(|c| c.chunk.text.clone()));
    match embedder.embed_batch(&texts) {
        Ok(vectors) if vectors.len() == texts.len() => Some(
            vectors[1..]
                .iter()
                .map(|v| cosine_similarity(&vectors[0], v).max(0.0))
                .collect(),
        ),
        Ok(vectors) => {
            warn!(expected = texts.len(), got = vectors.len(), "embedding batch size mismatch, ranking without embeddings");
            None
        }
        Err(e) => {
            warn!(error = %e, "embedding failed, ranking without embeddings");
            None
        }
    }
}

/// Combine the factors and order best first. Equal scores order by file
/// path then start line.
pub fn rank(
    query: &str,
    candidates: Vec<FtsHit>,
    graph_links: &HashMap<i64, f64>,
    embedder: Option<&dyn IEmbeddingProvider>,
    weights: &RankWeights,
) -> Vec<ScoredChunk> {
    let mut lexical: Vec<f64> = candidates.iter().map(|c| c.score.max(0.0)).collect();
    if lexical.iter().all(|s| *s <= f64::EPSILON) {
        // Substring-scan hits carry no relevance; treat them as equal.
        lexical.iter_mut().for_each(|s| *s = 1.0);
    }
    normalize(&mut lexical);

    let mut graph: Vec<f64> = candidates
        .iter()
        .map(|c| graph_links.get(&c.chunk.id).copied().unwrap_or(0.0))
        .collect();
    normalize(&mut graph);

    let embedding = embedder.and_then(|e| embedding_scores(e, query, &candidates));
    let weights = if embedding.is_some() {
        *weights
    } else {
        weights.without_embedding()
    };
    let embedding = embedding.unwrap_or_else(|| vec![0.0; candidates.len()]);

    let mut scored: Vec<ScoredChunk> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, hit)| {
            let score = weights.lexical * lexical[i]
                + weights.graph * graph[i]
                + weights.embedding * embedding[i];
            ScoredChunk {
                chunk: hit.chunk,
                score,
                lexical: lexical[i],
                graph: graph[i],
                embedding: embedding[i],
            }
        })
        .collect();

    scored.sort_by(compare);
    scored
}

fn compare(a: &ScoredChunk, b: &ScoredChunk) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.chunk.file_path.cmp(&b.chunk.file_path))
        .then_with(|| a.chunk.start_line.cmp(&b.chunk.start_line))
        .then_with(|| a.chunk.end_line.cmp(&b.chunk.end_line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hit(id: i64, path: &str, start: u32, score: f64) -> FtsHit {
        FtsHit {
            chunk: ChunkRecord {
                id,
                file_path: path.to_string(),
                language: "python".to_string(),
                start_line: start,
                end_line: start + 4,
                content_hash: "h".to_string(),
                text: format!("chunk {id}"),
            },
            score,
        }
    }

    #[test]
    fn ties_break_by_path_then_line() {
        let hits = vec![hit(1, "b.py", 1, 2.0), hit(2, "a.py", 9, 2.0), hit(3, "a.py", 1, 2.0)];
        let ranked = rank("q", hits, &HashMap::new(), None, &RankWeights::default());
        let order: Vec<i64> = ranked.iter().map(|s| s.chunk.id).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn graph_links_lift_a_candidate() {
        let hits = vec![hit(1, "a.py", 1, 1.0), hit(2, "b.py", 1, 0.9)];
        let links = HashMap::from([(2, 3.0)]);
        let ranked = rank("q", hits, &links, None, &RankWeights::default());
        assert_eq!(ranked[0].chunk.id, 2);
        assert!((ranked[0].graph - 1.0).abs() < 1e-9);
    }

    #[test]
    fn without_embedder_weight_is_redistributed() {
        let ranked = rank(
            "q",
            vec![hit(1, "a.py", 1, 3.0)],
            &HashMap::from([(1, 1.0)]),
            None,
            &RankWeights::default(),
        );
        // Lexical and graph both max out, so the full weight is reached.
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert_eq!(ranked[0].embedding, 0.0);
    }

    #[test]
    fn query_terms_split_on_punctuation() {
        let terms = query_terms("parseConfig(raw) -> a");
        assert!(terms.contains("parseconfig"));
        assert!(terms.contains("raw"));
        assert!(!terms.contains("a"));
    }

    proptest! {
        #[test]
        fn ranking_ignores_input_order(
            scores in proptest::collection::vec(0u8..4, 1..12),
            rotate in 0usize..12,
        ) {
            let hits: Vec<FtsHit> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| hit(i as i64, &format!("f{}.py", i % 3), (i as u32) * 10 + 1, f64::from(*s)))
                .collect();
            let mut rotated = hits.clone();
            let len = rotated.len();
            rotated.rotate_left(rotate % len);

            let weights = RankWeights::default();
            let a: Vec<i64> = rank("q", hits, &HashMap::new(), None, &weights)
                .into_iter().map(|s| s.chunk.id).collect();
            let b: Vec<i64> = rank("q", rotated, &HashMap::new(), None, &weights)
                .into_iter().map(|s| s.chunk.id).collect();
            prop_assert_eq!(a, b);
        }
    }
}
