//! Regex-based JavaScript/TypeScript extractor. Unlike the
//! Python extractor this does not build a syntax tree — function and class
//! declarations, arrow-function assignments, and imports/exports are matched
//! line-by-line with a battery of compiled patterns.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{CodeEntity, CodeFile, EntityKind, Language, Location};

struct Patterns {
    function_decl: Regex,
    arrow_assignment: Regex,
    function_expression: Regex,
    class_decl: Regex,
    method: Regex,
    import_from: Regex,
    bare_import: Regex,
    export_named: Regex,
}

fn patterns() -> &'static Patterns {
    static CELL: OnceLock<Patterns> = OnceLock::new();
    CELL.get_or_init(|| Patterns {
        function_decl: Regex::new(
            r"^\s*(?:export\s+(?:default\s+)?)?(?P<async>async\s+)?function\s*\*?\s+(?P<name>[A-Za-z_$][\w$]*)\s*\((?P<params>[^)]*)\)",
        )
        .unwrap(),
        arrow_assignment: Regex::new(
            r"^\s*(?:export\s+(?:default\s+)?)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*(?::\s*[^=]+)?=\s*(?P<async>async\s+)?\((?P<params>[^)]*)\)\s*(?::\s*[^=]+)?=>",
        )
        .unwrap(),
        function_expression: Regex::new(
            r"^\s*(?:export\s+(?:default\s+)?)?(?:const|let|var)\s+(?P<name>[A-Za-z_$][\w$]*)\s*=\s*(?P<async>async\s+)?function\s*\*?\s*\((?P<params>[^)]*)\)",
        )
        .unwrap(),
        class_decl: Regex::new(
            r"^\s*(?:export\s+(?:default\s+)?)?(?:abstract\s+)?class\s+(?P<name>[A-Za-z_$][\w$]*)(?:\s+extends\s+(?P<parent>[A-Za-z_$][\w$.]*))?",
        )
        .unwrap(),
        method: Regex::new(
            r"^\s*(?P<async>async\s+)?(?P<star>\*\s*)?(?P<name>[A-Za-z_$][\w$]*)\s*\((?P<params>[^)]*)\)\s*(?::\s*[^{]+)?\{",
        )
        .unwrap(),
        import_from: Regex::new(r#"^\s*import\s+.*?\sfrom\s+['"](?P<module>[^'"]+)['"]"#).unwrap(),
        bare_import: Regex::new(r#"^\s*import\s+['"](?P<module>[^'"]+)['"]"#).unwrap(),
        export_named: Regex::new(r#"^\s*export\s+\{[^}]*\}\s+from\s+['"](?P<module>[^'"]+)['"]"#).unwrap(),
    })
}

const METHOD_SKIP_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "function", "return"];

/// Extract entities and imports from JavaScript or TypeScript source.
pub fn extract(path: &Path, content: &str, language: Language) -> CodeFile {
    let mut file = CodeFile::new(path, language);
    let pats = patterns();
    let lines: Vec<&str> = content.lines().collect();

    let mut imports = Vec::new();
    let mut brace_depth: i64 = 0;
    let mut class_stack: Vec<(String, i64)> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let lineno = idx + 1;

        if let Some(module) = import_module(pats, line) {
            push_unique(&mut imports, module);
        }

        if let Some(caps) = pats.class_decl.captures(line) {
            let name = caps["name"].to_string();
            let location = Location::new(path, lineno);
            let mut entity = CodeEntity::new(name.clone(), EntityKind::Class, location)
                .with_signature(line.trim().trim_end_matches('{').trim().to_string());
            if let Some((parent, _)) = class_stack.last() {
                entity = entity.with_parent(parent.clone());
            }
            file.entities.push(entity);
            class_stack.push((name, brace_depth));
        } else if let Some(caps) = pats.function_decl.captures(line) {
            push_function(&mut file, path, lineno, &caps, line, &class_stack, EntityKind::Function);
        } else if let Some(caps) = pats.arrow_assignment.captures(line) {
            push_function(&mut file, path, lineno, &caps, line, &[], EntityKind::Function);
        } else if let Some(caps) = pats.function_expression.captures(line) {
            push_function(&mut file, path, lineno, &caps, line, &[], EntityKind::Function);
        } else if !class_stack.is_empty() {
            if let Some(caps) = pats.method.captures(line) {
                let name = &caps["name"];
                if !METHOD_SKIP_KEYWORDS.contains(&name) {
                    push_function(&mut file, path, lineno, &caps, line, &class_stack, EntityKind::Method);
                }
            }
        }

        for ch in line.chars() {
            match ch {
                '{' => brace_depth += 1,
                '}' => {
                    brace_depth -= 1;
                    class_stack.retain(|(_, depth)| *depth < brace_depth);
                }
                _ => {}
            }
        }
    }

    file.imports = imports;
    file
}

fn import_module(pats: &Patterns, line: &str) -> Option<String> {
    pats.import_from
        .captures(line)
        .or_else(|| pats.bare_import.captures(line))
        .or_else(|| pats.export_named.captures(line))
        .map(|c| c["module"].to_string())
}

fn push_function(
    file: &mut CodeFile,
    path: &Path,
    lineno: usize,
    caps: &regex::Captures,
    raw_line: &str,
    class_stack: &[(String, i64)],
    kind: EntityKind,
) {
    let name = caps["name"].to_string();
    let location = Location::new(path, lineno);
    let mut entity = CodeEntity::new(name, kind, location).with_signature(raw_line.trim().to_string());
    if let Some((parent, _)) = class_stack.last() {
        entity = entity.with_parent(parent.clone());
    }
    file.entities.push(entity);
}

fn push_unique(imports: &mut Vec<String>, module: String) {
    if !imports.contains(&module) {
        imports.push(module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract_js(src: &str) -> CodeFile {
        extract(&PathBuf::from("src/app.js"), src, Language::JavaScript)
    }

    #[test]
    fn function_declaration_extracted() {
        let file = extract_js("function greet(name) {\n  return `hi ${name}`;\n}\n");
        assert_eq!(file.entities.len(), 1);
        assert_eq!(file.entities[0].name, "greet");
        assert_eq!(file.entities[0].kind, EntityKind::Function);
    }

    #[test]
    fn arrow_function_assignment_extracted() {
        let file = extract_js("const add = (a, b) => a + b;\n");
        assert_eq!(file.entities.len(), 1);
        assert_eq!(file.entities[0].name, "add");
    }

    #[test]
    fn async_function_expression_extracted() {
        let file = extract_js("export const load = async function(url) {\n  return fetch(url);\n};\n");
        assert_eq!(file.entities.len(), 1);
        assert_eq!(file.entities[0].name, "load");
    }

    #[test]
    fn class_with_methods_and_parent_tracking() {
        let file = extract_js(
            "class Widget extends Base {\n  constructor(id) {\n    this.id = id;\n  }\n\n  render() {\n    return null;\n  }\n}\n",
        );
        let class = file.entities.iter().find(|e| e.name == "Widget").unwrap();
        assert_eq!(class.kind, EntityKind::Class);

        let ctor = file.entities.iter().find(|e| e.name == "constructor").unwrap();
        assert_eq!(ctor.kind, EntityKind::Method);
        assert_eq!(ctor.parent_name.as_deref(), Some("Widget"));

        let render = file.entities.iter().find(|e| e.name == "render").unwrap();
        assert_eq!(render.parent_name.as_deref(), Some("Widget"));
    }

    #[test]
    fn imports_collected_and_deduplicated() {
        let file = extract_js(
            "import React from 'react';\nimport { useState } from 'react';\nimport './styles.css';\n",
        );
        assert_eq!(file.imports, vec!["react".to_string(), "./styles.css".to_string()]);
    }
}
