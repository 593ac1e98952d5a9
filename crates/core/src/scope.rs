//! Per-person scoping.
//!
//! A note belongs to a person if they created it, first-published it, or were
//! the fallback creator per the attribution rules. The scope is computed once
//! from the shared [`AttributionMap`] and reused by every builder when a
//! person filter is active; no builder derives its own variant.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::attribution::AttributionMap;
use crate::domain::NoteId;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScope {
    pub person: String,
    /// All notes attributed to the person in the window.
    pub notes: BTreeSet<NoteId>,
    /// The subset of `notes` with a FIRST_PUBLISH event in the window. Only
    /// these count toward published-note metrics and traffic joins.
    pub published: BTreeSet<NoteId>,
    /// Story URLs of the published subset.
    pub published_urls: BTreeSet<String>,
}

impl UserScope {
    pub fn resolve(person: &str, attribution: &AttributionMap) -> Self {
        let mut scope = Self { person: person.to_string(), ..Self::default() };

        for (note_id, ownership) in attribution.iter() {
            if !ownership.has_creator(person) && !ownership.has_publisher(person) {
                continue;
            }
            scope.notes.insert(note_id.clone());
            if ownership.published_in_window {
                scope.published.insert(note_id.clone());
                scope.published_urls.extend(ownership.story_urls.iter().cloned());
            }
        }

        scope
    }

    pub fn contains(&self, note_id: &NoteId) -> bool {
        self.notes.contains(note_id)
    }

    pub fn contains_published(&self, note_id: &NoteId) -> bool {
        self.published.contains(note_id)
    }

    pub fn owns_url(&self, url: &str) -> bool {
        self.published_urls.contains(url)
    }
}
