//! Shared blocklists and aliases for code-block identifier extraction.

use std::collections::HashSet;

use once_cell_lite::Lazy;

/// Minimum identifier length kept by the Markdown code-block identifier
/// extractor and the partial-match cascade.
pub const MIN_IDENTIFIER_LENGTH: usize = 3;

pub static PYTHON_BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "print", "len", "range", "str", "int", "float", "bool", "list", "dict", "set", "tuple",
        "type", "isinstance", "issubclass", "super", "self", "cls", "None", "True", "False",
        "open", "input", "enumerate", "zip", "map", "filter", "sorted", "reversed", "sum", "min",
        "max", "abs", "round", "all", "any", "iter", "next", "repr", "format", "hasattr",
        "getattr", "setattr", "delattr", "property", "staticmethod", "classmethod",
    ]
    .into_iter()
    .collect()
});

pub static PYTHON_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ]
    .into_iter()
    .collect()
});

pub static PYTHON_COMMON_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "Optional", "List", "Dict", "Set", "Tuple", "Union", "Any", "Callable", "Iterator",
        "Iterable", "Sequence", "Mapping", "TypeVar", "Generic", "Protocol",
    ]
    .into_iter()
    .collect()
});

pub static JS_BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "console", "window", "document", "require", "module", "exports", "process", "global",
        "Array", "Object", "String", "Number", "Boolean", "Promise", "Map", "Set", "Symbol",
        "JSON", "Math", "Date", "Error", "undefined", "null", "this", "super", "function",
        "async", "await", "typeof", "instanceof",
    ]
    .into_iter()
    .collect()
});

/// Language tokens that fence a Markdown code block identified as Python.
pub const PYTHON_ALIASES: &[&str] = &["python", "py", ""];

/// Language tokens that fence a Markdown code block identified as
/// JavaScript/TypeScript.
pub const JS_ALIASES: &[&str] = &["javascript", "js", "typescript", "ts"];

pub fn python_filter_blocked(name: &str) -> bool {
    PYTHON_BUILTINS.contains(name) || PYTHON_KEYWORDS.contains(name) || PYTHON_COMMON_TYPES.contains(name)
}

pub fn js_filter_blocked(name: &str) -> bool {
    JS_BUILTINS.contains(name)
}

/// Minimal `Lazy<T>` so this crate does not need a `once_cell`/`lazy_static`
/// dependency just for a handful of static sets; `std::sync::OnceLock`
/// covers the need on its own.
mod once_cell_lite {
    use std::sync::OnceLock;

    pub struct Lazy<T> {
        cell: OnceLock<T>,
        init: fn() -> T,
    }

    impl<T> Lazy<T> {
        pub const fn new(init: fn() -> T) -> Self {
            Self {
                cell: OnceLock::new(),
                init,
            }
        }
    }

    impl<T> std::ops::Deref for Lazy<T> {
        type Target = T;
        fn deref(&self) -> &T {
            self.cell.get_or_init(self.init)
        }
    }
}
