//! Lightweight per-file analysis
//!
//! Produces a terse digest of a hinted file (language, imports, declared
//! symbols, delimiter balance) that the prompt composer folds in as
//! guidance. Pure text processing; no network or filesystem access.

use once_cell::sync::Lazy;
use regex::Regex;

static TS_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^import\s+(?:\{[^}]*\}|\w+|\*\s+as\s+\w+)?\s*(?:from\s+)?['"]([^'"]+)['"]"#).unwrap());
static TS_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:export\s+)?(?:default\s+)?(?:async\s+)?(?:function\s+(\w+)|const\s+(\w+)\s*=\s*(?:async\s*)?\()").unwrap()
});

/// Digest of one hinted file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Relative path of the file
    pub path: String,
    /// Detected language tag
    pub language: &'static str,
    /// Imported module names
    pub imports: Vec<String>,
    /// Declared function/class names
    pub symbols: Vec<String>,
    /// Whether braces/parens/brackets are balanced
    pub balanced: bool,
}

impl FileDigest {
    /// One-line rendering used inside prompts
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "- {} [{}] symbols: {}; imports: {}; delimiters {}",
            self.path,
            self.language,
            join_or_none(&self.symbols),
            join_or_none(&self.imports),
            if self.balanced { "balanced" } else { "UNBALANCED" },
        )
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Whether `{}`/`()`/`[]` counts are pairwise balanced
#[must_use]
pub fn delimiters_balanced(source: &str) -> bool {
    let count = |open: char, close: char| {
        source.matches(open).count() as i64 - source.matches(close).count() as i64
    };
    count('{', '}') == 0 && count('(', ')') == 0 && count('[', ']') == 0
}

/// Digest a file by extension
#[must_use]
pub fn digest(path: &str, source: &str) -> FileDigest {
    let extension = path.rsplit('.').next().unwrap_or("");
    match extension {
        "py" => digest_python(path, source),
        "ts" | "tsx" | "js" | "jsx" => digest_typescript(path, source),
        _ => FileDigest {
            path: path.to_string(),
            language: "text",
            imports: Vec::new(),
            symbols: Vec::new(),
            balanced: delimiters_balanced(source),
        },
    }
}

fn digest_python(path: &str, source: &str) -> FileDigest {
    let mut imports = Vec::new();
    let mut symbols = Vec::new();

    for line in source.lines() {
        let trimmed = line.trim_start();
        if let Some(rest) = trimmed.strip_prefix("import ") {
            imports.push(rest.split_whitespace().next().unwrap_or("").to_string());
        } else if let Some(rest) = trimmed.strip_prefix("from ") {
            imports.push(rest.split_whitespace().next().unwrap_or("").to_string());
        } else if let Some(rest) = trimmed.strip_prefix("def ") {
            symbols.push(leading_identifier(rest));
        } else if let Some(rest) = trimmed.strip_prefix("class ") {
            symbols.push(leading_identifier(rest));
        }
    }

    imports.retain(|i| !i.is_empty());
    symbols.retain(|s| !s.is_empty());

    FileDigest {
        path: path.to_string(),
        language: "python",
        imports,
        symbols,
        balanced: delimiters_balanced(source),
    }
}

fn digest_typescript(path: &str, source: &str) -> FileDigest {
    let imports = TS_IMPORT
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect();

    let symbols = TS_FUNCTION
        .captures_iter(source)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
        .collect();

    FileDigest {
        path: path.to_string(),
        language: "typescript",
        imports,
        symbols,
        balanced: delimiters_balanced(source),
    }
}

fn leading_identifier(rest: &str) -> String {
    rest.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_digest() {
        let source = "import os\nfrom django.db import models\n\nclass Todo(models.Model):\n    pass\n\ndef helper():\n    return 1\n";
        let digest = digest("backend/todos/models.py", source);

        assert_eq!(digest.language, "python");
        assert_eq!(digest.imports, vec!["os", "django.db"]);
        assert_eq!(digest.symbols, vec!["Todo", "helper"]);
        assert!(digest.balanced);
    }

    #[test]
    fn typescript_digest() {
        let source = "import React from 'react';\nimport { api } from './services/api';\n\nexport function TodoList() {\n  return null;\n}\nconst handleUpdate = async (id: number) => {};\n";
        let digest = digest("frontend/src/components/TodoList.tsx", source);

        assert_eq!(digest.language, "typescript");
        assert_eq!(digest.imports, vec!["react", "./services/api"]);
        assert!(digest.symbols.contains(&"TodoList".to_string()));
        assert!(digest.symbols.contains(&"handleUpdate".to_string()));
    }

    #[test]
    fn unbalanced_source_is_flagged() {
        let digest = digest("a.ts", "function broken() {\n");
        assert!(!digest.balanced);
        assert!(digest.render().contains("UNBALANCED"));
    }

    #[test]
    fn unknown_extension_degrades() {
        let digest = digest("notes.md", "# notes\n");
        assert_eq!(digest.language, "text");
        assert!(digest.symbols.is_empty());
    }
}
