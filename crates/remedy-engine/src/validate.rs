//! Structural validation of candidate snippets
//!
//! The gate between "the service answered" and "the bug is solved". A
//! candidate must:
//! - be non-empty and carry at least one `File:`-attributed fenced block
//! - reference a file from the bug's hint set (or, for hintless bugs, a
//!   file the snapshot captured)
//! - parse under the syntax check registered for the file's extension
//! - not be a verbatim echo of the unmodified original content
//!
//! Failing any check classifies the attempt `rejected-malformed` and
//! consumes a retry. Syntax checking is a pluggable strategy keyed by file
//! extension; new languages register a [`SyntaxCheck`] without touching the
//! validator.

use crate::analysis::delimiters_balanced;
use once_cell::sync::Lazy;
use regex::Regex;
use remedy_catalog::BugDescriptor;
use remedy_snapshot::CodebaseSnapshot;
use std::collections::HashSet;

static FILE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^File:\s*(\S+)\s*$").unwrap());

/// One `File:`-attributed fenced block extracted from a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    /// Relative path the block claims to modify
    pub path: String,
    /// Code inside the fence
    pub code: String,
}

/// Why a candidate was rejected
#[derive(Debug, Clone, thiserror::Error)]
pub enum RejectionReason {
    /// Response is empty or whitespace
    #[error("empty response")]
    Empty,

    /// No `File:` attribution line present
    #[error("no File: header found")]
    MissingFileHeader,

    /// A `File:` header without a following fenced code block
    #[error("no fenced code block after File: {0}")]
    MissingCodeBlock(String),

    /// Block claims a file outside the expected set
    #[error("snippet references unexpected file {0}")]
    UnexpectedFile(String),

    /// Block does not parse under the registered syntax check
    #[error("snippet for {0} is not syntactically valid")]
    SyntaxInvalid(String),

    /// Block changes nothing relative to the captured original
    #[error("snippet for {0} echoes the original content unchanged")]
    NoOpEcho(String),
}

/// Pluggable syntax check for one family of file extensions
pub trait SyntaxCheck: Send + Sync {
    /// Language name for logs
    fn language(&self) -> &'static str;

    /// Extensions (without dot) this check covers
    fn extensions(&self) -> &'static [&'static str];

    /// Whether the snippet parses as a self-contained change
    fn is_valid(&self, source: &str) -> bool;
}

/// TypeScript/JavaScript delimiter-balance check
#[derive(Debug, Clone, Copy)]
pub struct TypeScriptSyntax;

impl SyntaxCheck for TypeScriptSyntax {
    fn language(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx", "js", "jsx"]
    }

    fn is_valid(&self, source: &str) -> bool {
        !source.trim().is_empty() && delimiters_balanced(source)
    }
}

/// Python delimiter-balance and indentation sanity check
#[derive(Debug, Clone, Copy)]
pub struct PythonSyntax;

impl SyntaxCheck for PythonSyntax {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn is_valid(&self, source: &str) -> bool {
        if source.trim().is_empty() || !delimiters_balanced(source) {
            return false;
        }
        // Tabs mixed with space indentation break the interpreter.
        !source.lines().any(|l| l.starts_with("\t") && l.trim_start_matches('\t').starts_with(' '))
    }
}

/// Registry of syntax checks keyed by file extension
pub struct ValidatorRegistry {
    checks: Vec<Box<dyn SyntaxCheck>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("check_count", &self.checks.len())
            .finish()
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

impl ValidatorRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Registry with the built-in checks
    #[must_use]
    pub fn with_default_checks() -> Self {
        let mut registry = Self::new();
        registry.register(TypeScriptSyntax);
        registry.register(PythonSyntax);
        registry
    }

    /// Register a syntax check
    pub fn register<C: SyntaxCheck + 'static>(&mut self, check: C) {
        self.checks.push(Box::new(check));
    }

    /// Find the check for a path's extension
    #[must_use]
    pub fn find_for_path(&self, path: &str) -> Option<&dyn SyntaxCheck> {
        let extension = path.rsplit('.').next().unwrap_or("");
        self.checks
            .iter()
            .find(|c| c.extensions().contains(&extension))
            .map(|c| &**c)
    }
}

/// Structural gate applied to every candidate snippet
#[derive(Debug, Default)]
pub struct SnippetValidator {
    registry: ValidatorRegistry,
}

impl SnippetValidator {
    /// Validator with the built-in syntax checks
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with a custom registry
    #[inline]
    #[must_use]
    pub fn with_registry(registry: ValidatorRegistry) -> Self {
        Self { registry }
    }

    /// Extract the `File:`-attributed fenced blocks from a raw response
    #[must_use]
    pub fn parse_candidate(raw: &str) -> Vec<CandidateBlock> {
        let mut blocks = Vec::new();
        let mut current_path: Option<String> = None;
        let mut in_fence = false;
        let mut code = String::new();

        for line in raw.lines() {
            if !in_fence {
                if let Some(caps) = FILE_HEADER.captures(line) {
                    current_path = Some(caps[1].to_string());
                } else if line.trim_start().starts_with("```") {
                    if current_path.is_some() {
                        in_fence = true;
                        code.clear();
                    }
                }
            } else if line.trim_start().starts_with("```") {
                if let Some(path) = current_path.take() {
                    blocks.push(CandidateBlock {
                        path,
                        code: code.clone(),
                    });
                }
                in_fence = false;
            } else {
                code.push_str(line);
                code.push('\n');
            }
        }

        blocks
    }

    /// Apply the full structural gate
    ///
    /// # Errors
    /// The first failed check, as a [`RejectionReason`]; the attempt is
    /// classified `rejected-malformed` and retried.
    pub fn validate(
        &self,
        raw: &str,
        bug: &BugDescriptor,
        snapshot: &CodebaseSnapshot,
    ) -> Result<(), RejectionReason> {
        if raw.trim().is_empty() {
            return Err(RejectionReason::Empty);
        }

        if !FILE_HEADER.is_match(raw) {
            return Err(RejectionReason::MissingFileHeader);
        }

        let blocks = Self::parse_candidate(raw);
        if blocks.is_empty() {
            let claimed = FILE_HEADER
                .captures(raw)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            return Err(RejectionReason::MissingCodeBlock(claimed));
        }

        for block in &blocks {
            if block.code.trim().is_empty() {
                return Err(RejectionReason::MissingCodeBlock(block.path.clone()));
            }

            let expected = if bug.file_hints.is_empty() {
                snapshot.contains_file(&block.path)
            } else {
                bug.file_hints.iter().any(|h| h == &block.path)
            };
            if !expected {
                return Err(RejectionReason::UnexpectedFile(block.path.clone()));
            }

            let valid = match self.registry.find_for_path(&block.path) {
                Some(check) => check.is_valid(&block.code),
                // No registered language: fall back to delimiter balance.
                None => delimiters_balanced(&block.code),
            };
            if !valid {
                return Err(RejectionReason::SyntaxInvalid(block.path.clone()));
            }

            if let Some(original) = snapshot.file_section(&block.path) {
                if is_verbatim_echo(&block.code, original) {
                    return Err(RejectionReason::NoOpEcho(block.path.clone()));
                }
            }
        }

        Ok(())
    }
}

/// Whether every code line already exists verbatim in the original
///
/// A candidate that introduces no new or changed line is a no-op "fix".
fn is_verbatim_echo(code: &str, original: &str) -> bool {
    let original_lines: HashSet<&str> = original.lines().map(str::trim).collect();
    code.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .all(|l| original_lines.contains(l))
}
