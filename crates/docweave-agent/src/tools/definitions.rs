//! JSON-schema tool definitions sent with each request.

use docweave_core::models::ToolDefinition;
use serde_json::{json, Value};

use super::ToolKind;

fn object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn path_only(description: &str) -> Value {
    object(json!({ "path": { "type": "string", "description": description } }), &["path"])
}

pub fn definition(kind: ToolKind) -> ToolDefinition {
    let (description, parameters) = match kind {
        ToolKind::ListFiles => (
            "List repository files matching a glob pattern. Use it to learn the directory layout.",
            object(
                json!({
                    "pattern": {
                        "type": "string",
                        "description": "Glob pattern such as '**/*.py', 'src/*.js' or '*.md'"
                    },
                    "path": {
                        "type": "string",
                        "description": "Directory to search from, relative to the repository root (default: the root)"
                    }
                }),
                &["pattern"],
            ),
        ),
        ToolKind::ReadFile => (
            "Read a file's content, optionally a line range. Read a file before citing it.",
            object(
                json!({
                    "path": { "type": "string", "description": "File path relative to the repository root" },
                    "start_line": { "type": "integer", "description": "First line to return (1-indexed)" },
                    "end_line": { "type": "integer", "description": "Last line to return (inclusive)" }
                }),
                &["path"],
            ),
        ),
        ToolKind::GetSymbols => (
            "List the functions, classes and methods declared in a file with their line ranges, without reading the whole file.",
            object(
                json!({
                    "path": { "type": "string", "description": "File path" },
                    "kind": {
                        "type": "string",
                        "enum": ["function", "class", "method", "type", "variable"],
                        "description": "Only return symbols of this kind"
                    }
                }),
                &["path"],
            ),
        ),
        ToolKind::GetImports => (
            "List the modules a file imports.",
            path_only("File path"),
        ),
        ToolKind::GetDefinition => (
            "Find where a function, class or type is defined. 'Class.method' narrows to a method.",
            object(
                json!({ "name": { "type": "string", "description": "Symbol name" } }),
                &["name"],
            ),
        ),
        ToolKind::GetReferences => (
            "Find the symbols that use a given symbol.",
            object(
                json!({ "name": { "type": "string", "description": "Symbol name" } }),
                &["name"],
            ),
        ),
        ToolKind::GetStructure => (
            "Structural overview of a file: imports, classes with their methods, and functions, with line ranges.",
            path_only("File path"),
        ),
        ToolKind::SearchText => (
            "Full-text search over the indexed code, ranked by relevance.",
            object(
                json!({ "query": { "type": "string", "description": "Search terms" } }),
                &["query"],
            ),
        ),
        ToolKind::FinishExploration => (
            "Signal that you understand the codebase well enough to write the documentation.",
            object(
                json!({
                    "understanding": {
                        "type": "string",
                        "description": "Summary of what you learned about the codebase"
                    }
                }),
                &["understanding"],
            ),
        ),
    };
    ToolDefinition {
        name: kind.name().to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// Definitions for `kinds`, in the order given.
pub fn definitions_for(kinds: &[ToolKind]) -> Vec<ToolDefinition> {
    kinds.iter().copied().map(definition).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tool_has_an_object_schema() {
        for def in definitions_for(&ToolKind::ALL) {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(!def.description.is_empty());
            assert!(def.parameters["required"].is_array());
        }
    }

    #[test]
    fn section_subset_keeps_order() {
        let names: Vec<String> = definitions_for(&ToolKind::SECTION)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["read_file", "get_symbols", "get_structure", "get_imports", "search_text"]
        );
    }
}
