//! Symbol-level tools over the retrieval engine.

use std::str::FromStr;

use docweave_core::models::{SymbolKind, SymbolRecord};
use docweave_retrieval::RetrievalEngine;
use serde_json::{json, Value};

use super::ToolError;

/// Characters of chunk text shown per search hit.
const SNIPPET_CHARS: usize = 240;

fn symbol_json(symbol: &SymbolRecord) -> Value {
    json!({
        "name": symbol.name,
        "kind": symbol.kind.as_str(),
        "path": symbol.file_path,
        "line": symbol.start_line,
        "end_line": symbol.end_line,
        "signature": symbol.signature,
        "parent": symbol.parent,
    })
}

pub fn get_symbols(
    retrieval: &RetrievalEngine<'_>,
    path: &str,
    kind: Option<&str>,
) -> Result<Value, ToolError> {
    let kind = kind
        .map(|k| {
            SymbolKind::from_str(k).map_err(|reason| ToolError::BadArguments {
                tool: "get_symbols".to_string(),
                reason,
            })
        })
        .transpose()?;
    let symbols = retrieval.get_symbols(path, kind)?;
    Ok(json!({
        "path": path,
        "symbols": symbols.iter().map(symbol_json).collect::<Vec<_>>(),
    }))
}

pub fn get_imports(retrieval: &RetrievalEngine<'_>, path: &str) -> Result<Value, ToolError> {
    Ok(json!({ "path": path, "imports": retrieval.get_imports(path)? }))
}

pub fn get_definition(retrieval: &RetrievalEngine<'_>, name: &str) -> Result<Value, ToolError> {
    match retrieval.get_definition(name)? {
        Some(symbol) => Ok(symbol_json(&symbol)),
        None => Err(ToolError::SymbolNotFound {
            name: name.to_string(),
        }),
    }
}

pub fn get_references(retrieval: &RetrievalEngine<'_>, name: &str) -> Result<Value, ToolError> {
    let refs = retrieval.get_references(name)?;
    Ok(json!({
        "name": name,
        "count": refs.len(),
        "references": refs.iter().map(symbol_json).collect::<Vec<_>>(),
    }))
}

/// Imports, classes with nested methods, and top-level functions.
pub fn get_structure(retrieval: &RetrievalEngine<'_>, path: &str) -> Result<Value, ToolError> {
    let symbols = retrieval.get_structure(path)?;
    let imports = retrieval.get_imports(path)?;

    let mut classes: Vec<Value> = Vec::new();
    let mut functions: Vec<Value> = Vec::new();
    let mut variables: Vec<Value> = Vec::new();
    for symbol in &symbols {
        match symbol.kind {
            SymbolKind::Class | SymbolKind::Type => {
                let methods: Vec<Value> = symbols
                    .iter()
                    .filter(|s| {
                        s.kind == SymbolKind::Method && s.parent.as_deref() == Some(symbol.name.as_str())
                    })
                    .map(|m| json!({ "name": m.name, "line": m.start_line, "end_line": m.end_line }))
                    .collect();
                classes.push(json!({
                    "name": symbol.name,
                    "kind": symbol.kind.as_str(),
                    "line": symbol.start_line,
                    "end_line": symbol.end_line,
                    "methods": methods,
                }));
            }
            SymbolKind::Function => functions.push(json!({
                "name": symbol.name,
                "line": symbol.start_line,
                "end_line": symbol.end_line,
                "signature": symbol.signature,
            })),
            SymbolKind::Variable => variables.push(json!({
                "name": symbol.name,
                "line": symbol.start_line,
            })),
            SymbolKind::Method | SymbolKind::Module => {}
        }
    }
    Ok(json!({
        "path": path,
        "imports": imports,
        "classes": classes,
        "functions": functions,
        "variables": variables,
    }))
}

pub fn search_text(retrieval: &RetrievalEngine<'_>, query: &str) -> Result<Value, ToolError> {
    let hits = retrieval.search_text(query, retrieval.search_limit())?;
    let results: Vec<Value> = hits
        .iter()
        .map(|hit| {
            let snippet: String = hit.chunk.text.chars().take(SNIPPET_CHARS).collect();
            json!({
                "path": hit.chunk.file_path,
                "start_line": hit.chunk.start_line,
                "end_line": hit.chunk.end_line,
                "score": (hit.score * 1000.0).round() / 1000.0,
                "snippet": snippet,
            })
        })
        .collect();
    Ok(json!({ "query": query, "count": results.len(), "results": results }))
}
