//! Bug catalog
//!
//! The ordered registry of descriptors a run processes. Construction
//! validates the whole catalog up front; a malformed catalog is a fatal
//! configuration error, never a per-bug failure.

use crate::descriptor::{BugCategory, BugDescriptor, BugId};
use crate::error::CatalogError;
use std::collections::HashSet;

/// Ordered, validated registry of bug descriptors
///
/// Iteration order is the catalog order; reports preserve it regardless of
/// the order individual bugs finish in.
#[derive(Debug, Clone)]
pub struct BugCatalog {
    bugs: Vec<BugDescriptor>,
}

impl BugCatalog {
    /// Build a catalog from descriptors, validating every entry
    ///
    /// # Errors
    /// - `CatalogError::Empty` if no descriptors are given
    /// - `CatalogError::DuplicateId` if two entries share an identifier
    /// - `CatalogError::MissingField` if a title or description is empty
    pub fn from_descriptors(bugs: Vec<BugDescriptor>) -> Result<Self, CatalogError> {
        if bugs.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for bug in &bugs {
            if !seen.insert(bug.id.clone()) {
                return Err(CatalogError::DuplicateId(bug.id.clone()));
            }
            if bug.title.trim().is_empty() {
                return Err(CatalogError::MissingField {
                    id: bug.id.clone(),
                    field: "title",
                });
            }
            if bug.description.trim().is_empty() {
                return Err(CatalogError::MissingField {
                    id: bug.id.clone(),
                    field: "description",
                });
            }
        }

        Ok(Self { bugs })
    }

    /// The reference catalog: five planted defects in the demo todo app
    #[must_use]
    pub fn reference() -> Self {
        let bugs = vec![
            BugDescriptor::new(
                "todo-state-sync",
                "Todo list not updated after editing",
                BugCategory::StateSync,
            )
            .with_description(
                "Todo items don't update in the UI after editing. The `handleUpdate` \
                 function in `TodoList.tsx` makes an API call but never updates the \
                 local `todos` state with the returned data.",
            )
            .with_root_cause(
                "Missing state update after a successful API call, so the UI never \
                 reflects the change locally.",
            )
            .with_fix_concept(
                "Update the local `todos` state array with the response from the \
                 `updateTodo` API call to keep the UI consistent.",
            )
            .with_file_hints(["frontend/src/components/TodoList.tsx"]),
            BugDescriptor::new(
                "csrf-token-header",
                "Mutating requests rejected for missing CSRF token",
                BugCategory::SecurityHeader,
            )
            .with_description(
                "POST, PUT, and DELETE requests are failing due to a missing \
                 `X-CSRFToken` header. The `apiCall` helper in `api.ts` needs to \
                 include the CSRF token for mutating requests.",
            )
            .with_root_cause(
                "Django's CSRF protection blocks mutating requests without the \
                 `X-CSRFToken` header, which `api.ts` never sets.",
            )
            .with_fix_concept(
                "In `apiCall`, add the `X-CSRFToken` header for POST, PUT, and \
                 DELETE methods by reading the token from the cookie.",
            )
            .with_file_hints(["frontend/src/services/api.ts"]),
            BugDescriptor::new(
                "todo-queryset-exposure",
                "Users can see todos belonging to other users",
                BugCategory::AccessControl,
            )
            .with_description(
                "Users can see todos from other users. The `get_queryset` method in \
                 the `TodoViewSet` should filter todos by the currently authenticated \
                 user.",
            )
            .with_root_cause(
                "`get_queryset` in `TodoViewSet` does not filter by the authenticated \
                 user, exposing every row.",
            )
            .with_fix_concept(
                "Filter `Todo` objects by `self.request.user` in `get_queryset` so \
                 users only see their own todos.",
            )
            .with_file_hints(["backend/todos/views.py"]),
            BugDescriptor::new(
                "use-effect-loop",
                "Infinite render loop when fetching todos",
                BugCategory::LifecycleEffect,
            )
            .with_description(
                "An infinite loop occurs in `TodoList.tsx` because the `useEffect` \
                 hook that calls `fetchTodos` is missing a dependency array, causing \
                 it to run on every component render.",
            )
            .with_root_cause(
                "The `useEffect` hook lacks a dependency array, so `fetchTodos` runs \
                 on every render and each fetch triggers another render.",
            )
            .with_fix_concept(
                "Add an empty dependency array to the `useEffect` hook so \
                 `fetchTodos` runs only once on mount.",
            )
            .with_file_hints(["frontend/src/components/TodoList.tsx"]),
            BugDescriptor::new(
                "serializer-field-mismatch",
                "Field names disagree between serializer and frontend",
                BugCategory::SchemaMismatch,
            )
            .with_description(
                "Field name mismatch between frontend and backend. The Django \
                 serializer sends `completed` and `created_at`, but the React \
                 interface expects `is_completed` and `created`.",
            )
            .with_root_cause(
                "`TodoSerializer` emits `completed`/`created_at` while the frontend \
                 types expect `is_completed`/`created`, so deserialization drops the \
                 values.",
            )
            .with_fix_concept(
                "Map `completed` and `created_at` to `is_completed` and `created` in \
                 `TodoSerializer` using `source=` field arguments.",
            )
            .with_file_hints(["backend/todos/serializers.py"]),
        ];

        // The reference catalog is well-formed by construction.
        Self { bugs }
    }

    /// Ordered view of the catalog
    #[inline]
    #[must_use]
    pub fn list_bugs(&self) -> &[BugDescriptor] {
        &self.bugs
    }

    /// Look up a descriptor by identifier
    #[must_use]
    pub fn get(&self, id: &BugId) -> Option<&BugDescriptor> {
        self.bugs.iter().find(|b| &b.id == id)
    }

    /// Number of cataloged bugs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bugs.len()
    }

    /// Whether the catalog has no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bugs.is_empty()
    }

    /// Registry ordering of bug identifiers
    #[must_use]
    pub fn ordering(&self) -> Vec<BugId> {
        self.bugs.iter().map(|b| b.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_catalog_has_five_entries() {
        let catalog = BugCatalog::reference();
        assert_eq!(catalog.len(), 5);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn reference_catalog_covers_all_categories() {
        let catalog = BugCatalog::reference();
        let categories: Vec<_> = catalog.list_bugs().iter().map(|b| b.category).collect();

        assert!(categories.contains(&BugCategory::StateSync));
        assert!(categories.contains(&BugCategory::SecurityHeader));
        assert!(categories.contains(&BugCategory::AccessControl));
        assert!(categories.contains(&BugCategory::LifecycleEffect));
        assert!(categories.contains(&BugCategory::SchemaMismatch));
    }

    #[test]
    fn reference_catalog_entries_have_hints() {
        let catalog = BugCatalog::reference();
        for bug in catalog.list_bugs() {
            assert!(!bug.file_hints.is_empty(), "bug {} has no hints", bug.id);
            assert!(!bug.root_cause.is_empty());
            assert!(!bug.fix_concept.is_empty());
        }
    }

    #[test]
    fn get_by_id() {
        let catalog = BugCatalog::reference();
        let id = BugId::new("csrf-token-header");

        let bug = catalog.get(&id).unwrap();
        assert_eq!(bug.category, BugCategory::SecurityHeader);
        assert!(catalog.get(&BugId::new("nope")).is_none());
    }

    #[test]
    fn empty_catalog_rejected() {
        let err = BugCatalog::from_descriptors(Vec::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn duplicate_id_rejected() {
        let bug = |id: &str| {
            BugDescriptor::new(id, "title", BugCategory::StateSync).with_description("desc")
        };
        let err = BugCatalog::from_descriptors(vec![bug("a"), bug("a")]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id.as_str() == "a"));
    }

    #[test]
    fn blank_description_rejected() {
        let bug = BugDescriptor::new("a", "title", BugCategory::StateSync);
        let err = BugCatalog::from_descriptors(vec![bug]).unwrap_err();
        assert!(matches!(err, CatalogError::MissingField { field: "description", .. }));
    }

    #[test]
    fn ordering_matches_catalog_order() {
        let catalog = BugCatalog::reference();
        let ordering = catalog.ordering();

        assert_eq!(ordering.len(), 5);
        assert_eq!(ordering[0].as_str(), "todo-state-sync");
        assert_eq!(ordering[4].as_str(), "serializer-field-mismatch");
    }
}
