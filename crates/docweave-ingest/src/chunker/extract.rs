//! Per-language node classification over tree-sitter parse trees:
//! which top-level nodes are declarations, what symbols they declare,
//! which nodes hold methods, imports, and call sites.

use std::collections::BTreeSet;

use docweave_core::models::SymbolKind;
use tree_sitter::Node;

use crate::language::Language;

const SIGNATURE_MAX_CHARS: usize = 200;

/// A symbol declared by a node, with the node that spans it.
pub(super) struct Declared<'t> {
    pub name: String,
    pub kind: SymbolKind,
    pub parent: Option<String>,
    pub node: Node<'t>,
}

pub(super) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

fn field_text<'s>(node: Node<'_>, field: &str, source: &'s str) -> Option<&'s str> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// First line of the node text, trimmed and capped.
pub(super) fn signature(node: Node<'_>, source: &str) -> String {
    let first = text(node, source).lines().next().unwrap_or("").trim();
    match first.char_indices().nth(SIGNATURE_MAX_CHARS) {
        Some((cut, _)) => first[..cut].to_string(),
        None => first.to_string(),
    }
}

/// Strip export/decorator wrappers down to the declaration they carry.
pub(super) fn unwrap_wrapper<'t>(lang: Language, node: Node<'t>) -> Node<'t> {
    match (lang, node.kind()) {
        (Language::JavaScript | Language::TypeScript, "export_statement") => node
            .child_by_field_name("declaration")
            .unwrap_or(node),
        (Language::Python, "decorated_definition") => {
            node.child_by_field_name("definition").unwrap_or(node)
        }
        _ => node,
    }
}

/// Comments and attributes that belong to the declaration they precede.
pub(super) fn is_attachable(node: Node<'_>) -> bool {
    let kind = node.kind();
    kind.contains("comment") || kind == "attribute_item" || kind == "decorator"
}

/// Whether a node holds methods that get their own symbols.
pub(super) fn is_container(lang: Language, node: Node<'_>) -> bool {
    matches!(
        (lang, node.kind()),
        (Language::Python, "class_definition")
            | (
                Language::JavaScript | Language::TypeScript,
                "class_declaration" | "abstract_class_declaration"
            )
            | (
                Language::Java,
                "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration"
            )
            | (Language::Rust, "impl_item" | "trait_item")
    )
}

pub(super) fn is_declaration(lang: Language, node: Node<'_>, source: &str) -> bool {
    is_container(lang, node) || !declared_symbols(lang, node, source).is_empty()
}

/// The name methods of this container record as their parent.
pub(super) fn container_name(lang: Language, node: Node<'_>, source: &str) -> Option<String> {
    let field = match (lang, node.kind()) {
        (Language::Rust, "impl_item") => "type",
        _ => "name",
    };
    field_text(node, field, source).map(str::to_string)
}

/// Symbols declared directly by a top-level node (not its methods).
pub(super) fn declared_symbols<'t>(
    lang: Language,
    node: Node<'t>,
    source: &str,
) -> Vec<Declared<'t>> {
    let single = |kind: SymbolKind| -> Vec<Declared<'t>> {
        field_text(node, "name", source)
            .map(|name| Declared {
                name: name.to_string(),
                kind,
                parent: None,
                node,
            })
            .into_iter()
            .collect()
    };

    match (lang, node.kind()) {
        (Language::Python, "function_definition") => single(SymbolKind::Function),
        (Language::Python, "class_definition") => single(SymbolKind::Class),

        (Language::JavaScript | Language::TypeScript, kind) => match kind {
            "function_declaration" | "generator_function_declaration" => {
                single(SymbolKind::Function)
            }
            "class_declaration" | "abstract_class_declaration" => single(SymbolKind::Class),
            "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
                single(SymbolKind::Type)
            }
            "lexical_declaration" | "variable_declaration" => named_children(node)
                .into_iter()
                .filter(|c| c.kind() == "variable_declarator")
                .filter_map(|decl| {
                    let name = decl.child_by_field_name("name")?;
                    if name.kind() != "identifier" {
                        return None;
                    }
                    let is_fn = decl.child_by_field_name("value").is_some_and(|v| {
                        matches!(
                            v.kind(),
                            "arrow_function" | "function_expression" | "function"
                        )
                    });
                    Some(Declared {
                        name: text(name, source).to_string(),
                        kind: if is_fn {
                            SymbolKind::Function
                        } else {
                            SymbolKind::Variable
                        },
                        parent: None,
                        node: decl,
                    })
                })
                .collect(),
            _ => Vec::new(),
        },

        (Language::Rust, kind) => match kind {
            "function_item" => single(SymbolKind::Function),
            "struct_item" | "enum_item" | "union_item" | "type_item" | "trait_item" => {
                single(SymbolKind::Type)
            }
            "const_item" | "static_item" => single(SymbolKind::Variable),
            _ => Vec::new(),
        },

        (Language::Go, kind) => match kind {
            "function_declaration" => single(SymbolKind::Function),
            "method_declaration" => field_text(node, "name", source)
                .map(|name| Declared {
                    name: name.to_string(),
                    kind: SymbolKind::Method,
                    parent: go_receiver_type(node, source),
                    node,
                })
                .into_iter()
                .collect(),
            "type_declaration" => named_children(node)
                .into_iter()
                .filter(|c| matches!(c.kind(), "type_spec" | "type_alias"))
                .filter_map(|spec| {
                    Some(Declared {
                        name: field_text(spec, "name", source)?.to_string(),
                        kind: SymbolKind::Type,
                        parent: None,
                        node: spec,
                    })
                })
                .collect(),
            _ => Vec::new(),
        },

        (Language::Java, kind) => match kind {
            "class_declaration" | "record_declaration" => single(SymbolKind::Class),
            "interface_declaration" | "enum_declaration" | "annotation_type_declaration" => {
                single(SymbolKind::Type)
            }
            _ => Vec::new(),
        },

        _ => Vec::new(),
    }
}

/// `(s *Server)` -> `Server`
fn go_receiver_type(node: Node<'_>, source: &str) -> Option<String> {
    let receiver = field_text(node, "receiver", source)?;
    let inner = receiver.trim().trim_start_matches('(').trim_end_matches(')');
    let ty = inner.split_whitespace().last()?;
    let ty = ty.trim_start_matches('*');
    let ty = ty.split('[').next().unwrap_or(ty);
    (!ty.is_empty()).then(|| ty.to_string())
}

/// Method nodes inside a container, unwrapped, in source order.
pub(super) fn methods<'t>(lang: Language, container: Node<'t>) -> Vec<Node<'t>> {
    let Some(body) = container.child_by_field_name("body") else {
        return Vec::new();
    };
    let mut members = Vec::new();
    for child in named_children(body) {
        // Java enums keep their methods one level down.
        if child.kind() == "enum_body_declarations" {
            members.extend(named_children(child));
        } else {
            members.push(child);
        }
    }
    members
        .into_iter()
        .map(|m| unwrap_wrapper(lang, m))
        .filter(|m| is_method(lang, *m))
        .collect()
}

fn is_method(lang: Language, node: Node<'_>) -> bool {
    matches!(
        (lang, node.kind()),
        (Language::Python, "function_definition")
            | (Language::JavaScript | Language::TypeScript, "method_definition")
            | (Language::Java, "method_declaration" | "constructor_declaration")
            | (Language::Rust, "function_item" | "function_signature_item")
    )
}

pub(super) fn method_name(node: Node<'_>, source: &str) -> Option<String> {
    field_text(node, "name", source).map(str::to_string)
}

/// Module names a top-level import node pulls in.
pub(super) fn import_targets(lang: Language, node: Node<'_>, source: &str) -> Vec<String> {
    let unquote = |s: &str| s.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string();
    match (lang, node.kind()) {
        (Language::Python, "import_statement") => named_children(node)
            .into_iter()
            .filter_map(|c| match c.kind() {
                "dotted_name" => Some(text(c, source).to_string()),
                "aliased_import" => field_text(c, "name", source).map(str::to_string),
                _ => None,
            })
            .collect(),
        (Language::Python, "import_from_statement") => field_text(node, "module_name", source)
            .map(str::to_string)
            .into_iter()
            .collect(),
        (Language::JavaScript | Language::TypeScript, "import_statement" | "export_statement") => {
            field_text(node, "source", source)
                .map(unquote)
                .into_iter()
                .collect()
        }
        (Language::Rust, "use_declaration") => field_text(node, "argument", source)
            .map(str::to_string)
            .into_iter()
            .collect(),
        (Language::Rust, "extern_crate_declaration") => field_text(node, "name", source)
            .map(str::to_string)
            .into_iter()
            .collect(),
        (Language::Go, "import_declaration") => {
            let mut specs = Vec::new();
            collect_kind(node, "import_spec", &mut specs);
            specs
                .into_iter()
                .filter_map(|spec| field_text(spec, "path", source).map(unquote))
                .collect()
        }
        (Language::Java, "import_declaration") => {
            let target = text(node, source)
                .trim()
                .trim_start_matches("import")
                .trim()
                .trim_start_matches("static ")
                .trim_end_matches(';')
                .trim();
            if target.is_empty() {
                Vec::new()
            } else {
                vec![target.to_string()]
            }
        }
        _ => Vec::new(),
    }
}

fn collect_kind<'t>(node: Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    for child in named_children(node) {
        if child.kind() == kind {
            out.push(child);
        } else {
            collect_kind(child, kind, out);
        }
    }
}

/// Names called within `node`. Subtrees for which `skip` holds are not
/// descended into.
pub(super) fn collect_calls(
    lang: Language,
    node: Node<'_>,
    source: &str,
    skip: &dyn Fn(Node<'_>) -> bool,
    out: &mut BTreeSet<String>,
) {
    for child in named_children(node) {
        if skip(child) {
            continue;
        }
        if let Some(name) = callee(lang, child, source) {
            out.insert(name);
        }
        collect_calls(lang, child, source, skip, out);
    }
}

fn callee(lang: Language, node: Node<'_>, source: &str) -> Option<String> {
    let target = match (lang, node.kind()) {
        (Language::Python, "call")
        | (Language::JavaScript | Language::TypeScript, "call_expression")
        | (Language::Rust, "call_expression")
        | (Language::Go, "call_expression") => node.child_by_field_name("function")?,
        (Language::JavaScript | Language::TypeScript, "new_expression") => {
            node.child_by_field_name("constructor")?
        }
        (Language::Java, "method_invocation") => node.child_by_field_name("name")?,
        (Language::Java, "object_creation_expression") => node.child_by_field_name("type")?,
        _ => return None,
    };
    callee_name(target, source)
}

fn callee_name(node: Node<'_>, source: &str) -> Option<String> {
    let name_node = match node.kind() {
        "identifier" | "type_identifier" | "property_identifier" | "field_identifier" => node,
        "attribute" => node.child_by_field_name("attribute")?,
        "member_expression" => node.child_by_field_name("property")?,
        "field_expression" | "selector_expression" => node.child_by_field_name("field")?,
        "scoped_identifier" | "scoped_type_identifier" => node.child_by_field_name("name")?,
        "generic_function" | "generic_type" => {
            return callee_name(
                node.child_by_field_name("function")
                    .or_else(|| node.named_child(0))?,
                source,
            )
        }
        _ => return None,
    };
    let name = text(name_node, source);
    (!name.is_empty()).then(|| name.to_string())
}
