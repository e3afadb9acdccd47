//! RetrievalEngine: the read API used by agent tools and the citation
//! pipeline. Borrowing the store keeps one engine per run cheap to share
//! across section workers.

use std::collections::{BTreeMap, HashMap};

use docweave_core::config::{RankWeights, RunConfig};
use docweave_core::errors::RetrievalError;
use docweave_core::models::{ChunkRecord, Direction, EdgeKind, SymbolKind, SymbolRecord};
use docweave_core::traits::IEmbeddingProvider;
use docweave_storage::{FtsHit, StoreEngine, SymbolFilter};
use tracing::debug;

use crate::ranking::{graph, rank, scorer, ScoredChunk};

/// Lexical candidates fetched per requested result before re-ranking.
const CANDIDATE_FACTOR: usize = 3;

pub struct RetrievalEngine<'a> {
    store: &'a StoreEngine,
    embedder: Option<&'a dyn IEmbeddingProvider>,
    weights: RankWeights,
    search_limit: usize,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(store: &'a StoreEngine, weights: RankWeights, search_limit: usize) -> Self {
        Self {
            store,
            embedder: None,
            weights,
            search_limit: search_limit.max(1),
        }
    }

    /// Weights and result limit from the resolved run configuration.
    pub fn from_run_config(store: &'a StoreEngine, config: &RunConfig) -> Self {
        Self::new(store, config.weights, config.search_limit)
    }

    pub fn with_embedder(mut self, embedder: Option<&'a dyn IEmbeddingProvider>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn store(&self) -> &'a StoreEngine {
        self.store
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    /// Lexical search re-ranked by `hybrid_rank`, best first.
    pub fn search_text(&self, query: &str, limit: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let limit = limit.max(1);
        let hits = self.store.query_fts(query, limit * CANDIDATE_FACTOR)?;
        let mut ranked = self.hybrid_rank(query, hits)?;
        ranked.truncate(limit);
        debug!(query, results = ranked.len(), "search_text");
        Ok(ranked)
    }

    /// Reorder candidates by the weighted combination of lexical score,
    /// graph proximity, and embedding similarity. Deterministic for a given
    /// store, query, candidate set, and weights.
    pub fn hybrid_rank(&self, query: &str, candidates: Vec<FtsHit>) -> Result<Vec<ScoredChunk>, RetrievalError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let mut by_file: BTreeMap<&str, Vec<SymbolRecord>> = BTreeMap::new();
        for hit in &candidates {
            if !by_file.contains_key(hit.chunk.file_path.as_str()) {
                let symbols = self
                    .store
                    .get_symbols(SymbolFilter::File(&hit.chunk.file_path))?;
                by_file.insert(hit.chunk.file_path.as_str(), symbols);
            }
        }
        let candidate_symbols: HashMap<i64, Vec<SymbolRecord>> = candidates
            .iter()
            .map(|hit| {
                let symbols = by_file
                    .get(hit.chunk.file_path.as_str())
                    .map(|all| {
                        all.iter()
                            .filter(|s| s.chunk_id == hit.chunk.id && s.kind != SymbolKind::Module)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                (hit.chunk.id, symbols)
            })
            .collect();

        let terms = scorer::query_terms(query);
        let links = graph::link_counts(self.store, &candidate_symbols, &terms);
        Ok(rank(query, candidates, &links, self.embedder, &self.weights))
    }

    /// The best definition for `name`: classes and types before functions,
    /// functions before methods, then by path and line. `Class.method`
    /// narrows to methods of that class.
    pub fn get_definition(&self, name: &str) -> Result<Option<SymbolRecord>, RetrievalError> {
        let (parent, bare) = match name.rsplit_once('.') {
            Some((parent, bare)) if !parent.is_empty() && !bare.is_empty() => (Some(parent), bare),
            _ => (None, name),
        };
        let mut candidates: Vec<SymbolRecord> = self
            .store
            .get_symbols(SymbolFilter::Name(bare))?
            .into_iter()
            .filter(|s| s.kind != SymbolKind::Module)
            .filter(|s| parent.map_or(true, |p| s.parent.as_deref() == Some(p)))
            .collect();
        candidates.sort_by(|a, b| {
            a.kind
                .definition_rank()
                .cmp(&b.kind.definition_rank())
                .then_with(|| a.file_path.cmp(&b.file_path))
                .then_with(|| a.start_line.cmp(&b.start_line))
        });
        Ok(candidates.into_iter().next())
    }

    /// Symbols that reference `name`, whether the edge was resolved to a
    /// definition or left dangling under the name.
    pub fn get_references(&self, name: &str) -> Result<Vec<SymbolRecord>, RetrievalError> {
        let mut from_ids: Vec<i64> = self
            .store
            .get_edges_by_target_name(name, EdgeKind::References)?
            .into_iter()
            .map(|e| e.from_symbol_id)
            .collect();
        for def in self.store.get_symbols(SymbolFilter::Name(name))? {
            from_ids.extend(
                self.store
                    .get_edges(def.id, Direction::Incoming)?
                    .into_iter()
                    .filter(|e| e.kind == EdgeKind::References)
                    .map(|e| e.from_symbol_id),
            );
        }
        from_ids.sort_unstable();
        from_ids.dedup();

        let mut referrers = Vec::with_capacity(from_ids.len());
        for id in from_ids {
            if let Some(symbol) = self.store.get_symbol(id)? {
                referrers.push(symbol);
            }
        }
        referrers.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then_with(|| a.start_line.cmp(&b.start_line))
        });
        Ok(referrers)
    }

    /// Declared symbols of a file in declaration order.
    pub fn get_structure(&self, path: &str) -> Result<Vec<SymbolRecord>, RetrievalError> {
        Ok(self
            .store
            .get_symbols(SymbolFilter::File(path))?
            .into_iter()
            .filter(|s| s.kind != SymbolKind::Module)
            .collect())
    }

    pub fn get_symbols(
        &self,
        path: &str,
        kind: Option<SymbolKind>,
    ) -> Result<Vec<SymbolRecord>, RetrievalError> {
        let mut symbols = self.get_structure(path)?;
        if let Some(kind) = kind {
            symbols.retain(|s| s.kind == kind);
        }
        Ok(symbols)
    }

    /// Module names imported by a file.
    pub fn get_imports(&self, path: &str) -> Result<Vec<String>, RetrievalError> {
        let module = self
            .store
            .get_symbols(SymbolFilter::File(path))?
            .into_iter()
            .find(|s| s.kind == SymbolKind::Module);
        let Some(module) = module else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .get_edges(module.id, Direction::Outgoing)?
            .into_iter()
            .filter(|e| e.kind == EdgeKind::Imports)
            .map(|e| e.to_name)
            .collect())
    }

    /// Definition-kind symbols across `paths`, for coverage scoping.
    pub fn scope_symbols(&self, paths: &[String]) -> Result<Vec<SymbolRecord>, RetrievalError> {
        let mut scoped = Vec::new();
        for path in paths {
            scoped.extend(
                self.get_structure(path)?
                    .into_iter()
                    .filter(|s| s.kind.is_definition()),
            );
        }
        scoped.sort_by(|a, b| {
            a.file_path
                .cmp(&b.file_path)
                .then_with(|| a.start_line.cmp(&b.start_line))
        });
        scoped.dedup_by_key(|s| s.id);
        Ok(scoped)
    }

    /// The narrowest stored chunk containing `line` of `path`.
    pub fn get_chunk_at(&self, path: &str, line: u32) -> Result<Option<ChunkRecord>, RetrievalError> {
        Ok(self
            .store
            .get_chunks_overlapping(path, line, line)?
            .into_iter()
            .min_by_key(|c| (c.end_line - c.start_line, c.start_line)))
    }
}
