//! Prompt composition
//!
//! Pure, deterministic assembly of the request payload for one bug: system
//! framing, the descriptor's diagnosis fields, per-hint analysis digests and
//! code excerpts, and the strict output contract the validator later
//! enforces. No network or filesystem access, so prompt content is unit
//! testable without the service.

use crate::analysis;
use remedy_catalog::BugDescriptor;
use remedy_snapshot::{CodebaseSnapshot, HEADER_LINE};

/// Composed request payload for one bug
#[derive(Debug, Clone)]
pub struct Prompt {
    bug_id: remedy_catalog::BugId,
    text: String,
}

impl Prompt {
    /// Bug this prompt targets
    #[inline]
    #[must_use]
    pub fn bug_id(&self) -> &remedy_catalog::BugId {
        &self.bug_id
    }

    /// The full prompt text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Deterministic prompt composer
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptComposer;

impl PromptComposer {
    /// Create a composer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compose the prompt for one bug against the run snapshot
    ///
    /// Hint excerpts are drawn from the snapshot; when no hint resolves the
    /// full snapshot is included instead so the service still sees the
    /// codebase.
    #[must_use]
    pub fn compose(&self, bug: &BugDescriptor, snapshot: &CodebaseSnapshot) -> Prompt {
        let resolved: Vec<(&String, &str)> = bug
            .file_hints
            .iter()
            .filter_map(|hint| snapshot.file_section(hint).map(|section| (hint, section)))
            .collect();

        let mut text = String::new();

        text.push_str(
            "Provide ONLY the corrected code snippet(s) that fix one specific, known \
             defect in the codebase below.\n\
             Your primary goal is minimality and precision: do not rewrite entire \
             functions or components, do not change unrelated lines, and do not alter \
             function signatures unless the defect is specifically about a signature.\n\n",
        );

        text.push_str(&format!("BUG: {}\n", bug.title));
        text.push_str(&format!("CATEGORY: {}\n", bug.category));
        text.push_str(&format!("DESCRIPTION: {}\n", bug.description));
        text.push_str(&format!("ROOT CAUSE: {}\n", bug.root_cause));
        text.push_str(&format!("FIX CONCEPT: {}\n", bug.fix_concept));
        text.push_str(&format!("AFFECTED FILES: {}\n\n", bug.file_hints.join(", ")));

        if !resolved.is_empty() {
            text.push_str("FILE ANALYSIS:\n");
            for (hint, section) in &resolved {
                text.push_str(&analysis::digest(hint, section).render());
                text.push('\n');
            }
            text.push('\n');
        }

        text.push_str("CODE CONTEXT (original, buggy files for reference):\n");
        if resolved.is_empty() {
            // None of the hints resolved; fall back to the whole capture.
            text.push_str(snapshot.text());
        } else {
            for (hint, section) in &resolved {
                text.push_str(&format!("{HEADER_LINE}\nFile: {hint}\n{HEADER_LINE}\n\n"));
                text.push_str(section);
                text.push_str("\n\n");
            }
        }
        text.push('\n');

        text.push_str(
            "OUTPUT FORMAT (strict):\n\
             - For each affected file, start with a line `File: <relative path>`.\n\
             - Immediately follow with one markdown code block containing a single, \
             syntactically self-contained change: the minimal changed lines plus 1-3 \
             unchanged context lines on each side.\n\
             - Do not include diff markers (`---`, `+++`, `@@`).\n\
             - Close every code block with ```.\n\
             - After the last code block, add exactly one line starting with \
             `Rationale:` summarizing the change in one short sentence.\n",
        );

        Prompt {
            bug_id: bug.id.clone(),
            text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use remedy_catalog::{BugCatalog, BugCategory};

    fn snapshot() -> CodebaseSnapshot {
        let mut text = String::new();
        text.push_str(&CodebaseSnapshot::frame_file(
            "frontend/src/components/TodoList.tsx",
            "import React from 'react';\nexport function TodoList() {\n  return null;\n}\n",
        ));
        text.push_str(&CodebaseSnapshot::frame_file(
            "backend/todos/views.py",
            "class TodoViewSet(viewsets.ModelViewSet):\n    pass\n",
        ));
        CodebaseSnapshot::from_framed_text(text, 2)
    }

    #[test]
    fn compose_is_deterministic() {
        let catalog = BugCatalog::reference();
        let bug = &catalog.list_bugs()[0];
        let snapshot = snapshot();

        let composer = PromptComposer::new();
        let first = composer.compose(bug, &snapshot);
        let second = composer.compose(bug, &snapshot);

        assert_eq!(first.text(), second.text());
        assert_eq!(first.bug_id(), &bug.id);
    }

    #[test]
    fn compose_includes_bug_fields_and_hint_excerpt() {
        let catalog = BugCatalog::reference();
        let bug = &catalog.list_bugs()[0];
        let prompt = PromptComposer::new().compose(bug, &snapshot());

        assert!(prompt.text().contains(&format!("BUG: {}", bug.title)));
        assert!(prompt.text().contains("CATEGORY: state-synchronization"));
        assert!(prompt.text().contains("ROOT CAUSE:"));
        assert!(prompt.text().contains("export function TodoList"));
        // The unhinted backend file must not leak into the excerpt.
        assert!(!prompt.text().contains("TodoViewSet"));
    }

    #[test]
    fn compose_falls_back_to_full_snapshot() {
        let bug = remedy_catalog::BugDescriptor::new(
            "ghost",
            "Hint points nowhere",
            BugCategory::StateSync,
        )
        .with_description("desc")
        .with_file_hints(["missing/file.ts"]);

        let snapshot = snapshot();
        let prompt = PromptComposer::new().compose(&bug, &snapshot);

        // Unresolvable hints mean the whole capture rides along.
        assert!(prompt.text().contains("TodoViewSet"));
        assert!(prompt.text().contains("export function TodoList"));
        assert!(!prompt.text().contains("FILE ANALYSIS"));
    }

    #[test]
    fn compose_states_output_contract() {
        let catalog = BugCatalog::reference();
        let bug = &catalog.list_bugs()[1];
        let prompt = PromptComposer::new().compose(bug, &snapshot());

        assert!(prompt.text().contains("File: <relative path>"));
        assert!(prompt.text().contains("Rationale:"));
        assert!(prompt.text().contains("diff markers"));
    }
}
