//! Bug descriptors
//!
//! A [`BugDescriptor`] identifies one cataloged, known defect in the target
//! codebase: what it is called, where to look, and what is suspected to be
//! wrong. Descriptors are plain immutable values.

use serde::{Deserialize, Serialize};

/// Stable identifier for a cataloged bug
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BugId(String);

impl BugId {
    /// Create a bug identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BugId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BugId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Category tag for a cataloged bug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BugCategory {
    /// Local state not kept in sync with a remote mutation
    StateSync,
    /// Missing or wrong security header on mutating requests
    SecurityHeader,
    /// Data exposed across user boundaries
    AccessControl,
    /// Component lifecycle effect misconfigured
    LifecycleEffect,
    /// Field names disagree between producer and consumer
    SchemaMismatch,
}

impl BugCategory {
    /// Human-readable category name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BugCategory::StateSync => "state-synchronization",
            BugCategory::SecurityHeader => "security-header",
            BugCategory::AccessControl => "access-control",
            BugCategory::LifecycleEffect => "lifecycle-effect",
            BugCategory::SchemaMismatch => "schema-mismatch",
        }
    }
}

impl std::fmt::Display for BugCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One cataloged, known defect
///
/// Carries everything the prompt composer needs: the symptom description,
/// the suspected root cause, a short fix concept, and hints at the files
/// where the defect lives. The hint paths are relative to the target tree
/// root and may not resolve; consumers must tolerate that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugDescriptor {
    /// Stable identifier
    pub id: BugId,
    /// Human-readable title
    pub title: String,
    /// Category tag
    pub category: BugCategory,
    /// Symptom and behavior description
    pub description: String,
    /// Suspected root cause
    pub root_cause: String,
    /// Short concept of the expected fix
    pub fix_concept: String,
    /// File-path hints into the target codebase
    pub file_hints: Vec<String>,
}

impl BugDescriptor {
    /// Create a descriptor with empty diagnosis fields
    #[must_use]
    pub fn new(id: impl Into<BugId>, title: impl Into<String>, category: BugCategory) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category,
            description: String::new(),
            root_cause: String::new(),
            fix_concept: String::new(),
            file_hints: Vec::new(),
        }
    }

    /// With symptom description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With suspected root cause
    #[inline]
    #[must_use]
    pub fn with_root_cause(mut self, root_cause: impl Into<String>) -> Self {
        self.root_cause = root_cause.into();
        self
    }

    /// With fix concept
    #[inline]
    #[must_use]
    pub fn with_fix_concept(mut self, fix_concept: impl Into<String>) -> Self {
        self.fix_concept = fix_concept.into();
        self
    }

    /// With file-path hints
    #[inline]
    #[must_use]
    pub fn with_file_hints(mut self, hints: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.file_hints = hints.into_iter().map(Into::into).collect();
        self
    }
}

impl From<String> for BugId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
