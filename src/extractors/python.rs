//! Python AST extractor — authoritative for Python. Walks the tree over
//! `function_definition`/`class_definition`/`import_statement` node kinds
//! with a thread-local cached parser, tracking a class stack for nested
//! classes and methods plus module-level constant/type-alias detection,
//! docstrings, and decorators.

use std::cell::RefCell;
use std::path::Path;

use tree_sitter::{Node, Parser};
use tracing::warn;

use crate::extractors::patterns::PYTHON_COMMON_TYPES;
use crate::models::{CodeEntity, CodeFile, EntityKind, Language, Location};

thread_local! {
    static PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

fn with_parser<F, R>(f: F) -> Option<R>
where
    F: FnOnce(&mut Parser) -> R,
{
    PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            let mut parser = Parser::new();
            if parser.set_language(&tree_sitter_python::LANGUAGE.into()).is_err() {
                return None;
            }
            *slot = Some(parser);
        }
        slot.as_mut().map(f)
    })
}

fn node_text(node: Node, content: &str) -> String {
    content[node.byte_range()].to_string()
}

fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    node.children(&mut node.walk()).find(|c| c.kind() == kind)
}

fn location_for(path: &Path, node: Node) -> Location {
    Location::with_end(
        path.to_path_buf(),
        node.start_position().row + 1,
        node.end_position().row + 1,
    )
}

/// Extract entities and top-level imports from Python source. On a syntax
/// error the result is an empty `CodeFile` with a warning: no partial
/// entities are ever emitted for a file that failed to parse.
pub fn extract(path: &Path, content: &str) -> CodeFile {
    let mut file = CodeFile::new(path, Language::Python);

    let tree = match with_parser(|p| p.parse(content, None)) {
        Some(Some(tree)) => tree,
        _ => {
            warn!("python extractor: failed to initialize parser for {}", path.display());
            return file;
        }
    };

    if tree.root_node().has_error() {
        warn!("python extractor: syntax error in {}, emitting empty result", path.display());
        return file;
    }

    let mut state = WalkState::default();
    let mut entities = Vec::new();
    let mut imports = Vec::new();
    walk_node(tree.root_node(), path, content, &mut state, &mut entities, &mut imports);

    file.entities = entities;
    file.imports = imports;
    file
}

#[derive(Default)]
struct WalkState {
    class_stack: Vec<String>,
    function_depth: usize,
}

fn walk_node(
    node: Node,
    path: &Path,
    content: &str,
    state: &mut WalkState,
    entities: &mut Vec<CodeEntity>,
    imports: &mut Vec<String>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_statement" | "import_from_statement" => {
                collect_import(child, content, imports);
            }
            "decorated_definition" => {
                handle_decorated(child, path, content, state, entities, imports);
            }
            "class_definition" => {
                handle_class(child, path, content, state, entities, imports, &[]);
            }
            "function_definition" => {
                handle_function(child, path, content, state, entities, imports, &[]);
            }
            "expression_statement" => {
                handle_expression_statement(child, path, content, state, entities);
                // Still recurse in case of nested structures we don't special-case.
            }
            _ => {
                walk_node(child, path, content, state, entities, imports);
            }
        }
    }
}

fn handle_decorated(
    node: Node,
    path: &Path,
    content: &str,
    state: &mut WalkState,
    entities: &mut Vec<CodeEntity>,
    imports: &mut Vec<String>,
) {
    let decorators: Vec<String> = node
        .children(&mut node.walk())
        .filter(|c| c.kind() == "decorator")
        .map(|d| format!("@{}", decorator_name(d, content)))
        .collect();

    if let Some(def) = node.children(&mut node.walk()).find(|c| {
        c.kind() == "function_definition" || c.kind() == "class_definition"
    }) {
        match def.kind() {
            "function_definition" => handle_function(def, path, content, state, entities, imports, &decorators),
            "class_definition" => handle_class(def, path, content, state, entities, imports, &decorators),
            _ => {}
        }
    }
}

fn decorator_name(node: Node, content: &str) -> String {
    let text = node_text(node, content);
    let without_at = text.trim_start_matches('@').trim();
    without_at.split(['(', ' ']).next().unwrap_or(without_at).to_string()
}

fn handle_class(
    node: Node,
    path: &Path,
    content: &str,
    state: &mut WalkState,
    entities: &mut Vec<CodeEntity>,
    imports: &mut Vec<String>,
    decorators: &[String],
) {
    let Some(name) = find_child_by_kind(node, "identifier").map(|n| node_text(n, content)) else {
        return;
    };

    let location = location_for(path, node);
    let docstring = extract_docstring(node, content);
    let signature = render_class_signature(&name, node, content, decorators);

    let mut entity = CodeEntity::new(name.clone(), EntityKind::Class, location).with_signature(signature);
    if let Some(parent) = state.class_stack.last() {
        entity = entity.with_parent(parent.clone());
    }
    if let Some(doc) = docstring {
        entity = entity.with_docstring(doc);
    }
    entities.push(entity);

    state.class_stack.push(name);
    if let Some(body) = find_child_by_kind(node, "block") {
        walk_node(body, path, content, state, entities, imports);
    }
    state.class_stack.pop();
}

fn handle_function(
    node: Node,
    path: &Path,
    content: &str,
    state: &mut WalkState,
    entities: &mut Vec<CodeEntity>,
    imports: &mut Vec<String>,
    decorators: &[String],
) {
    let Some(name) = find_child_by_kind(node, "identifier").map(|n| node_text(n, content)) else {
        return;
    };

    let is_async = node.children(&mut node.walk()).any(|c| c.kind() == "async");
    let kind = if state.class_stack.is_empty() {
        EntityKind::Function
    } else {
        EntityKind::Method
    };

    let location = location_for(path, node);
    let docstring = extract_docstring(node, content);
    let signature = render_function_signature(&name, node, content, is_async, decorators);

    let mut entity = CodeEntity::new(name, kind, location).with_signature(signature);
    if let Some(parent) = state.class_stack.last() {
        entity = entity.with_parent(parent.clone());
    }
    if let Some(doc) = docstring {
        entity = entity.with_docstring(doc);
    }
    entities.push(entity);

    state.function_depth += 1;
    if let Some(body) = find_child_by_kind(node, "block") {
        walk_node(body, path, content, state, entities, imports);
    }
    state.function_depth -= 1;
}

fn render_function_signature(
    name: &str,
    node: Node,
    content: &str,
    is_async: bool,
    decorators: &[String],
) -> String {
    let mut sig = String::new();
    for d in decorators {
        sig.push_str(d);
        sig.push('\n');
    }
    if is_async {
        sig.push_str("async ");
    }
    sig.push_str("def ");
    sig.push_str(name);
    if let Some(params) = find_child_by_kind(node, "parameters") {
        sig.push_str(&node_text(params, content));
    } else {
        sig.push_str("()");
    }
    if let Some(ret) = find_child_by_kind(node, "type") {
        sig.push_str(" -> ");
        sig.push_str(&node_text(ret, content));
    }
    sig
}

fn render_class_signature(name: &str, node: Node, content: &str, decorators: &[String]) -> String {
    let mut sig = String::new();
    for d in decorators {
        sig.push_str(d);
        sig.push('\n');
    }
    sig.push_str("class ");
    sig.push_str(name);
    if let Some(bases) = find_child_by_kind(node, "argument_list") {
        sig.push_str(&node_text(bases, content));
    }
    sig
}

fn extract_docstring(def_node: Node, content: &str) -> Option<String> {
    let body = find_child_by_kind(def_node, "block")?;
    first_statement_docstring(body, content)
}

fn first_statement_docstring(body: Node, content: &str) -> Option<String> {
    let first = body.children(&mut body.walk()).next()?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string_node = find_child_by_kind(first, "string")?;
    Some(clean_docstring_text(&node_text(string_node, content)))
}

fn clean_docstring_text(raw: &str) -> String {
    let mut text = raw.trim();
    for prefix in ["r", "R", "b", "B", "u", "U", "f", "F"] {
        if let Some(rest) = text.strip_prefix(prefix) {
            if rest.starts_with(['"', '\'']) {
                text = rest;
            }
        }
    }
    let stripped = text
        .trim_start_matches("\"\"\"")
        .trim_start_matches("'''")
        .trim_end_matches("\"\"\"")
        .trim_end_matches("'''")
        .trim_start_matches('"')
        .trim_start_matches('\'')
        .trim_end_matches('"')
        .trim_end_matches('\'');
    stripped.trim().to_string()
}

fn is_module_docstring(root: Node, content: &str) -> Option<String> {
    first_statement_docstring(root, content)
}

fn collect_import(node: Node, content: &str, imports: &mut Vec<String>) {
    let text = node_text(node, content);
    if node.kind() == "import_from_statement" {
        let rest = text.trim_start_matches("from ");
        let module = rest.split(" import").next().unwrap_or("").trim();
        if let Some(root) = top_level_root(module) {
            push_unique(imports, root);
        }
    } else {
        let rest = text.trim_start_matches("import ").trim();
        for part in rest.split(',') {
            let name_part = part.split(" as ").next().unwrap_or(part).trim();
            if let Some(root) = top_level_root(name_part) {
                push_unique(imports, root);
            }
        }
    }
}

fn top_level_root(module: &str) -> Option<String> {
    let trimmed = module.trim_start_matches('.');
    let first = trimmed.split('.').next().unwrap_or("");
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

fn push_unique(imports: &mut Vec<String>, name: String) {
    if !imports.contains(&name) {
        imports.push(name);
    }
}

fn is_constant_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => {}
        _ => return false,
    }
    name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn is_type_alias_name(name: &str) -> bool {
    if name.len() < 2 {
        return false;
    }
    let first_upper = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    let has_lower = name.chars().any(|c| c.is_ascii_lowercase());
    first_upper && has_lower
}

fn looks_like_type_expression(node: Node, content: &str) -> bool {
    match node.kind() {
        "none" => true,
        "subscript" => true,
        "attribute" => true,
        "binary_operator" => node_text(node, content).contains('|'),
        "identifier" => {
            let text = node_text(node, content);
            matches!(
                text.as_str(),
                "str" | "int" | "float" | "bool" | "bytes" | "list" | "dict" | "set" | "tuple" | "frozenset"
            ) || PYTHON_COMMON_TYPES.contains(text.as_str())
        }
        _ => false,
    }
}

fn handle_expression_statement(
    node: Node,
    path: &Path,
    content: &str,
    state: &mut WalkState,
    entities: &mut Vec<CodeEntity>,
) {
    if state.function_depth > 0 {
        return;
    }
    let Some(assignment) = find_child_by_kind(node, "assignment") else {
        return;
    };
    let Some(left) = assignment.child_by_field_name("left") else {
        return;
    };
    if left.kind() != "identifier" {
        return;
    }
    let name = node_text(left, content);
    let location = location_for(path, node);

    if let Some(type_node) = assignment.child_by_field_name("type") {
        // Annotated assignment.
        let annotation_text = node_text(type_node, content);
        if annotation_text == "TypeAlias" || annotation_text.ends_with(".TypeAlias") {
            let rhs = assignment
                .child_by_field_name("right")
                .map(|r| node_text(r, content))
                .unwrap_or_default();
            let signature = format!("{name}: TypeAlias = {rhs}");
            entities.push(CodeEntity::new(name, EntityKind::Variable, location).with_signature(signature));
        } else if is_constant_name(&name) {
            let signature = format!("{name}: {annotation_text}");
            entities.push(CodeEntity::new(name, EntityKind::Constant, location).with_signature(signature));
        }
        return;
    }

    let Some(right) = assignment.child_by_field_name("right") else {
        return;
    };

    if is_type_alias_name(&name) && looks_like_type_expression(right, content) {
        let signature = format!("{name} = {}", node_text(right, content));
        entities.push(CodeEntity::new(name, EntityKind::Variable, location).with_signature(signature));
    } else if is_constant_name(&name) {
        let signature = format!("{name} = {}", node_text(right, content));
        entities.push(CodeEntity::new(name, EntityKind::Constant, location).with_signature(signature));
    }
}
