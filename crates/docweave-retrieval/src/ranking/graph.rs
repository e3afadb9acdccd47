//! Graph proximity: how strongly a candidate's symbols connect to the rest
//! of the candidate set and to symbols the query names.

use std::collections::{HashMap, HashSet};

use docweave_core::models::{Direction, SymbolRecord};
use docweave_storage::StoreEngine;
use tracing::debug;

/// Raw link counts per candidate chunk id. Lookup failures count as zero
/// links.
pub fn link_counts(
    store: &StoreEngine,
    candidate_symbols: &HashMap<i64, Vec<SymbolRecord>>,
    query_terms: &HashSet<String>,
) -> HashMap<i64, f64> {
    let owner: HashMap<i64, i64> = candidate_symbols
        .iter()
        .flat_map(|(chunk_id, symbols)| symbols.iter().map(move |s| (s.id, *chunk_id)))
        .collect();

    let mut counts = HashMap::with_capacity(candidate_symbols.len());
    for (chunk_id, symbols) in candidate_symbols {
        let mut links = 0.0;
        for symbol in symbols {
            if query_terms.contains(&symbol.name.to_lowercase()) {
                links += 1.0;
            }
            for direction in [Direction::Outgoing, Direction::Incoming] {
                let edges = match store.get_edges(symbol.id, direction) {
                    Ok(edges) => edges,
                    Err(e) => {
                        debug!(symbol = symbol.id, error = %e, "edge lookup failed");
                        continue;
                    }
                };
                for edge in edges {
                    let other = match direction {
                        Direction::Outgoing => edge.to_symbol_id,
                        Direction::Incoming => Some(edge.from_symbol_id),
                    };
                    let shares_candidate = other
                        .and_then(|id| owner.get(&id))
                        .is_some_and(|c| c != chunk_id);
                    let names_query = direction == Direction::Outgoing
                        && query_terms.contains(&edge.to_name.to_lowercase());
                    if shares_candidate || names_query {
                        links += 1.0;
                    }
                }
            }
        }
        counts.insert(*chunk_id, links);
    }
    counts
}
