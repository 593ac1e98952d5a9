//! Creator and publisher leaderboards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::attribution::NoteOwnership;
use crate::domain::NoteId;
use crate::inputs::ReportInputs;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardRole {
    Creator,
    Publisher,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub country: Option<String>,
    pub note_count: u64,
}

/// Rank people by distinct notes for the given role.
///
/// Role attribution comes from the resolved ownership map, so fallback
/// creators rank alongside explicit ones. Scoped, the board answers "who
/// created/published the filtered person's notes" over the scope's published
/// subset, which can surface people other than the filtered person.
pub fn top(inputs: &ReportInputs<'_>, role: LeaderboardRole, limit: usize) -> Vec<LeaderboardEntry> {
    let mut notes_by_person: BTreeMap<String, BTreeSet<&NoteId>> = BTreeMap::new();

    // Section narrowing is an event property, resolved to note ids first.
    let section_notes: Option<BTreeSet<&NoteId>> = inputs.filters.section.as_ref().map(|_| {
        inputs
            .window_events
            .iter()
            .filter(|event| inputs.filters.event_section_matches(event))
            .map(|event| &event.note_id)
            .collect()
    });
    let candidates: Vec<(&NoteId, &NoteOwnership)> = match inputs.scope {
        Some(scope) => scope
            .published
            .iter()
            .filter_map(|note_id| inputs.attribution.get(note_id).map(|own| (note_id, own)))
            .collect(),
        None => inputs.attribution.iter().collect(),
    };

    for (note_id, ownership) in candidates {
        if let Some(notes) = section_notes.as_ref() {
            if !notes.contains(note_id) {
                continue;
            }
        }
        let people = match role {
            LeaderboardRole::Creator => &ownership.creators,
            LeaderboardRole::Publisher => &ownership.publishers,
        };
        for person in people {
            if !inputs.filters.country_matches(Some(person), inputs.authors) {
                continue;
            }
            notes_by_person.entry(person.clone()).or_default().insert(note_id);
        }
    }

    let mut entries: Vec<LeaderboardEntry> = notes_by_person
        .into_iter()
        .map(|(email, notes)| LeaderboardEntry {
            display_name: inputs.authors.display_label(&email),
            country: inputs.authors.country(&email).map(str::to_string),
            note_count: notes.len() as u64,
        })
        .collect();
    entries.sort_by(|a, b| b.note_count.cmp(&a.note_count));
    entries.truncate(limit);
    entries
}
