//! Structural chunker over tree-sitter grammars.
//!
//! Top-level declarations become chunks; runs of other top-level nodes
//! (imports, statements, constants) merge into interstitial chunks so every
//! line stays citeable. Large classes split into a header chunk plus one
//! chunk per method.

use std::collections::BTreeSet;
use std::path::Path;

use docweave_core::errors::IngestError;
use docweave_core::models::{EdgeKind, SymbolKind};
use docweave_storage::{ChunkWrite, EdgeWrite, SymbolWrite};
use tree_sitter::{Node, Parser};

use super::extract::{self, Declared};
use super::{Chunker, FileChunks};
use crate::language::Language;

/// Interstitial runs are cut before exceeding this many lines.
const MAX_RUN_LINES: u32 = 80;
/// Containers longer than this split into per-method chunks.
const LARGE_CONTAINER_LINES: u32 = 150;

pub struct TreeSitterChunker {
    language: Language,
}

impl TreeSitterChunker {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Chunker for TreeSitterChunker {
    fn language(&self) -> Language {
        self.language
    }

    fn extensions(&self) -> &[&str] {
        self.language.extensions()
    }

    fn chunk(&self, path: &Path, source: &str) -> Result<FileChunks, IngestError> {
        let ext = path.extension().and_then(|e| e.to_str());
        let mut parser = Parser::new();
        parser
            .set_language(&self.language.grammar(ext))
            .map_err(|e| IngestError::ChunkFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| IngestError::ChunkFailed {
                path: path.display().to_string(),
                reason: "parser produced no tree".to_string(),
            })?;

        let module_name = path_key(path);
        let mut builder = Builder::new(self.language, source, module_name);
        builder.walk(tree.root_node());
        Ok(builder.finish())
    }
}

/// One chunk covering the whole file plus the module symbol. Used for files
/// without declarations and when parsing fails.
pub fn whole_file_chunks(path: &Path, source: &str) -> FileChunks {
    let line_count = line_count(source);
    FileChunks {
        chunks: vec![ChunkWrite {
            start_line: 1,
            end_line: line_count,
            text: source.to_string(),
        }],
        symbols: vec![module_symbol(path_key(path), line_count)],
        edges: Vec::new(),
    }
}

fn path_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn line_count(source: &str) -> u32 {
    (source.lines().count() as u32).max(1)
}

fn module_symbol(name: String, line_count: u32) -> SymbolWrite {
    SymbolWrite {
        chunk_index: 0,
        signature: name.clone(),
        name,
        kind: SymbolKind::Module,
        parent: None,
        start_line: 1,
        end_line: line_count,
    }
}

const MODULE_INDEX: usize = 0;

struct Builder<'s> {
    lang: Language,
    source: &'s str,
    lines: Vec<&'s str>,
    out: FileChunks,
    imports: BTreeSet<String>,
    /// Methods of containers without their own symbol (Rust impls), linked
    /// to a same-file type of the parent name at the end.
    detached_methods: Vec<(usize, String)>,
}

impl<'s> Builder<'s> {
    fn new(lang: Language, source: &'s str, module_name: String) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let total = (lines.len() as u32).max(1);
        Self {
            lang,
            source,
            lines,
            out: FileChunks {
                symbols: vec![module_symbol(module_name, total)],
                ..Default::default()
            },
            imports: BTreeSet::new(),
            detached_methods: Vec::new(),
        }
    }

    fn total_lines(&self) -> u32 {
        (self.lines.len() as u32).max(1)
    }

    fn start_line(&self, node: Node<'_>) -> u32 {
        (node.start_position().row as u32 + 1).min(self.total_lines())
    }

    /// A node ending at column 0 ends on the previous line.
    fn end_line(&self, node: Node<'_>) -> u32 {
        let end = node.end_position();
        let start = node.start_position();
        let row = if end.column == 0 && end.row > start.row {
            end.row
        } else {
            end.row + 1
        };
        (row as u32).clamp(self.start_line(node), self.total_lines())
    }

    fn push_chunk(&mut self, start: u32, end: u32) -> usize {
        let from = (start as usize).saturating_sub(1).min(self.lines.len());
        let to = (end as usize).min(self.lines.len()).max(from);
        self.out.chunks.push(ChunkWrite {
            start_line: start,
            end_line: end,
            text: self.lines[from..to].join("\n"),
        });
        self.out.chunks.len() - 1
    }

    fn push_symbol(&mut self, declared: &Declared<'_>, chunk_index: usize) -> usize {
        let symbol = SymbolWrite {
            chunk_index,
            name: declared.name.clone(),
            kind: declared.kind,
            signature: extract::signature(declared.node, self.source),
            parent: declared.parent.clone(),
            start_line: self.start_line(declared.node),
            end_line: self.end_line(declared.node),
        };
        self.out.symbols.push(symbol);
        self.out.symbols.len() - 1
    }

    fn push_edge(&mut self, from_index: usize, to_name: String, to_local: Option<usize>, kind: EdgeKind) {
        self.out.edges.push(EdgeWrite {
            from_index,
            to_name,
            to_local,
            kind,
        });
    }

    fn walk(&mut self, root: Node<'_>) {
        let mut cursor = root.walk();
        let children: Vec<Node<'_>> = root.named_children(&mut cursor).collect();
        let mut pending: Vec<Node<'_>> = Vec::new();

        for child in children {
            let decl = extract::unwrap_wrapper(self.lang, child);
            if extract::is_declaration(self.lang, decl, self.source) {
                // Comments and attributes directly above stay with the declaration.
                let mut start = self.start_line(child);
                let mut leading = 0;
                for node in pending.iter().rev() {
                    if !extract::is_attachable(*node) || self.end_line(*node) + 1 < start {
                        break;
                    }
                    start = self.start_line(*node);
                    leading += 1;
                }
                pending.truncate(pending.len() - leading);
                self.flush_run(&mut pending);
                self.emit_declaration(child, decl, start);
            } else {
                self.imports
                    .extend(extract::import_targets(self.lang, child, self.source));
                if let Some(first) = pending.first() {
                    if self.end_line(child) - self.start_line(*first) + 1 > MAX_RUN_LINES {
                        self.flush_run(&mut pending);
                    }
                }
                pending.push(child);
            }
        }
        self.flush_run(&mut pending);
    }

    fn flush_run(&mut self, pending: &mut Vec<Node<'_>>) {
        if let (Some(first), Some(last)) = (pending.first(), pending.last()) {
            let (start, end) = (self.start_line(*first), self.end_line(*last));
            self.push_chunk(start, end);
        }
        pending.clear();
    }

    fn emit_declaration(&mut self, outer: Node<'_>, decl: Node<'_>, start: u32) {
        let end = self.end_line(outer);
        let declared = extract::declared_symbols(self.lang, decl, self.source);
        let is_container = extract::is_container(self.lang, decl);
        let methods = if is_container {
            extract::methods(self.lang, decl)
        } else {
            Vec::new()
        };

        let split = !methods.is_empty() && end - start + 1 > LARGE_CONTAINER_LINES;
        let header_chunk = if split {
            let first_method = self.start_line(methods[0]);
            self.push_chunk(start, first_method.saturating_sub(1).max(start))
        } else {
            self.push_chunk(start, end)
        };

        let mut own_symbols = Vec::with_capacity(declared.len());
        for d in &declared {
            let index = self.push_symbol(d, header_chunk);
            own_symbols.push(index);
            let skip_methods = |n: Node<'_>| methods.iter().any(|m| m.id() == n.id());
            let mut calls = BTreeSet::new();
            extract::collect_calls(self.lang, d.node, self.source, &skip_methods, &mut calls);
            self.push_references(index, &d.name, calls);
        }

        if methods.is_empty() {
            return;
        }
        let parent = extract::container_name(self.lang, decl, self.source);
        let container_symbol = own_symbols.first().copied();
        let mut prev_end = self.out.chunks[header_chunk].end_line;

        for (i, method) in methods.iter().enumerate() {
            let Some(name) = extract::method_name(*method, self.source) else {
                continue;
            };
            let chunk_index = if split {
                let chunk_start = (prev_end + 1).min(self.start_line(*method));
                let chunk_end = if i + 1 == methods.len() {
                    end
                } else {
                    self.end_line(*method)
                };
                prev_end = chunk_end;
                self.push_chunk(chunk_start, chunk_end.max(chunk_start))
            } else {
                header_chunk
            };
            let index = self.push_symbol(
                &Declared {
                    name: name.clone(),
                    kind: SymbolKind::Method,
                    parent: parent.clone(),
                    node: *method,
                },
                chunk_index,
            );
            match (container_symbol, &parent) {
                (Some(owner), _) => {
                    self.push_edge(owner, name.clone(), Some(index), EdgeKind::Defines)
                }
                (None, Some(parent)) => self.detached_methods.push((index, parent.clone())),
                (None, None) => {}
            }
            let mut calls = BTreeSet::new();
            extract::collect_calls(self.lang, *method, self.source, &|_| false, &mut calls);
            self.push_references(index, &name, calls);
        }
    }

    fn push_references(&mut self, from: usize, own_name: &str, calls: BTreeSet<String>) {
        for callee in calls {
            if callee != own_name {
                self.push_edge(from, callee, None, EdgeKind::References);
            }
        }
    }

    fn finish(mut self) -> FileChunks {
        if self.out.chunks.is_empty() {
            let end = self.total_lines();
            self.push_chunk(1, end);
        }

        for target in std::mem::take(&mut self.imports) {
            self.push_edge(MODULE_INDEX, target, None, EdgeKind::Imports);
        }

        for (method, parent) in std::mem::take(&mut self.detached_methods) {
            let owner = self.out.symbols.iter().position(|s| {
                s.name == parent && matches!(s.kind, SymbolKind::Type | SymbolKind::Class)
            });
            if let Some(owner) = owner {
                let name = self.out.symbols[method].name.clone();
                self.push_edge(owner, name, Some(method), EdgeKind::Defines);
            }
        }
        self.out
    }
}
