//! Note-ownership resolution.
//!
//! Raw editorial events never state who owns a note. Ownership is derived:
//! CREATE events name creators directly; for notes that have no CREATE event
//! anywhere in the log, the earliest in-window SAVE stands in. FIRST_PUBLISH
//! events name publishers. Every downstream report reads ownership from this
//! one resolver so that scoping stays consistent across the system.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ActionType, EditorialEvent, NoteId};

/// Derived ownership of one note within a window. Creator attribution is
/// multi-valued: a note with CREATE events from two editors keeps both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteOwnership {
    pub creators: BTreeSet<String>,
    pub publishers: BTreeSet<String>,
    pub story_urls: BTreeSet<String>,
    pub published_in_window: bool,
}

impl NoteOwnership {
    pub fn has_creator(&self, email: &str) -> bool {
        self.creators.iter().any(|creator| creator.eq_ignore_ascii_case(email))
    }

    pub fn has_publisher(&self, email: &str) -> bool {
        self.publishers.iter().any(|publisher| publisher.eq_ignore_ascii_case(email))
    }
}

/// Ownership for every note with at least one event in the window. Notes
/// without any window activity are absent and invisible to all reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionMap {
    notes: BTreeMap<NoteId, NoteOwnership>,
}

impl AttributionMap {
    /// Resolve ownership from the window's events.
    ///
    /// `notes_with_create_ever` must cover the entire log, not just the
    /// window: the SAVE fallback may only fire for notes that have no CREATE
    /// event anywhere, otherwise an out-of-window creator would be shadowed.
    pub fn resolve(
        window_events: &[EditorialEvent],
        notes_with_create_ever: &HashSet<NoteId>,
    ) -> Self {
        let mut notes: BTreeMap<NoteId, NoteOwnership> = BTreeMap::new();
        let mut first_save: HashMap<NoteId, (DateTime<Utc>, String)> = HashMap::new();

        for event in window_events {
            let ownership = notes.entry(event.note_id.clone()).or_default();
            if let Some(url) = event.url() {
                ownership.story_urls.insert(url.to_string());
            }
            if event.action_type == ActionType::FirstPublish {
                ownership.published_in_window = true;
            }

            let Some(editor) = event.editor() else {
                continue;
            };
            match event.action_type {
                ActionType::Create => {
                    ownership.creators.insert(editor.to_string());
                }
                ActionType::FirstPublish => {
                    ownership.publishers.insert(editor.to_string());
                }
                ActionType::Save => {
                    let entry = first_save
                        .entry(event.note_id.clone())
                        .or_insert_with(|| (event.event_timestamp, editor.to_string()));
                    if event.event_timestamp < entry.0 {
                        *entry = (event.event_timestamp, editor.to_string());
                    }
                }
            }
        }

        for (note_id, (_, editor)) in first_save {
            if notes_with_create_ever.contains(&note_id) {
                continue;
            }
            if let Some(ownership) = notes.get_mut(&note_id) {
                ownership.creators.insert(editor);
            }
        }

        Self { notes }
    }

    pub fn get(&self, note_id: &NoteId) -> Option<&NoteOwnership> {
        self.notes.get(note_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NoteId, &NoteOwnership)> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Note ids with a FIRST_PUBLISH event in the window.
    pub fn published_notes(&self) -> BTreeSet<NoteId> {
        self.notes
            .iter()
            .filter(|(_, ownership)| ownership.published_in_window)
            .map(|(note_id, _)| note_id.clone())
            .collect()
    }
}
