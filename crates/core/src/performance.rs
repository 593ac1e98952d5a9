//! Per-author production and traffic performance.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::attribution::NoteOwnership;
use crate::domain::{is_agency_account, NoteId};
use crate::inputs::ReportInputs;
use crate::metrics::safe_ratio;

/// Which attribution role counts a note toward an author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorRole {
    Created,
    Published,
    Participated,
}

impl AuthorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Published => "published",
            Self::Participated => "participated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthorPerformance {
    pub email: String,
    pub display_name: String,
    pub country: Option<String>,
    pub notes: u64,
    pub sessions: u64,
    pub avg_scroll: f64,
    /// Sessions earned per attributed note.
    pub efficiency: f64,
}

/// Minimum published notes before an author appears: org-wide noise floor of
/// three, dropped to one under a person filter so small scopes still render.
fn min_notes(scoped: bool) -> usize {
    if scoped {
        1
    } else {
        3
    }
}

fn role_people<'a>(ownership: &'a NoteOwnership, role: AuthorRole) -> Vec<&'a str> {
    match role {
        AuthorRole::Created => ownership.creators.iter().map(String::as_str).collect(),
        AuthorRole::Published => ownership.publishers.iter().map(String::as_str).collect(),
        AuthorRole::Participated => {
            let mut people: BTreeSet<&str> = BTreeSet::new();
            people.extend(ownership.creators.iter().map(String::as_str));
            people.extend(ownership.publishers.iter().map(String::as_str));
            people.into_iter().collect()
        }
    }
}

pub fn author_performance(inputs: &ReportInputs<'_>, role: AuthorRole) -> Vec<AuthorPerformance> {
    // Published notes per person for the requested role, agency excluded.
    let mut notes_by_person: BTreeMap<&str, BTreeSet<&NoteId>> = BTreeMap::new();
    let mut urls_by_person: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (note_id, ownership) in inputs.attribution.iter() {
        if !ownership.published_in_window {
            continue;
        }
        if let Some(scope) = inputs.scope {
            if !scope.contains_published(note_id) {
                continue;
            }
        }
        for person in role_people(ownership, role) {
            if is_agency_account(person)
                || !inputs.filters.country_matches(Some(person), inputs.authors)
            {
                continue;
            }
            notes_by_person.entry(person).or_default().insert(note_id);
            urls_by_person
                .entry(person)
                .or_default()
                .extend(ownership.story_urls.iter().map(String::as_str));
        }
    }

    // Window traffic per URL, then rolled up through each person's URLs.
    let mut traffic_by_url: HashMap<&str, (i64, i64)> = HashMap::new();
    for record in inputs.daily {
        let in_scope = match inputs.scope {
            Some(scope) => scope.owns_url(&record.article_url),
            None => {
                record.publish_date.is_some_and(|published| inputs.window.contains(published))
            }
        };
        if !in_scope || !inputs.filters.traffic_section_matches(record.section.as_deref()) {
            continue;
        }
        let entry = traffic_by_url.entry(record.article_url.as_str()).or_insert((0, 0));
        entry.0 += record.visits;
        entry.1 += record.scrolls;
    }

    let floor = min_notes(inputs.scope.is_some());
    let mut rows: Vec<AuthorPerformance> = notes_by_person
        .into_iter()
        .filter(|(_, notes)| notes.len() >= floor)
        .map(|(email, notes)| {
            let (visits, scrolls) = urls_by_person
                .get(email)
                .map(|urls| {
                    urls.iter()
                        .filter_map(|url| traffic_by_url.get(url))
                        .fold((0i64, 0i64), |(v, s), (visits, scrolls)| (v + visits, s + scrolls))
                })
                .unwrap_or((0, 0));
            AuthorPerformance {
                display_name: inputs.authors.display_name(email),
                country: inputs.authors.country(email).map(str::to_string),
                notes: notes.len() as u64,
                sessions: visits.max(0) as u64,
                avg_scroll: safe_ratio(scrolls, visits),
                efficiency: visits.max(0) as f64 / notes.len().max(1) as f64,
                email: email.to_string(),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.sessions.cmp(&a.sessions).then_with(|| b.notes.cmp(&a.notes))
    });
    rows
}
