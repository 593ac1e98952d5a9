//! Per-section production and traffic roll-up.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::{ActionType, NoteId};
use crate::inputs::ReportInputs;
use crate::metrics::safe_ratio;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionStats {
    pub section: String,
    pub notes: u64,
    pub composer_notes: u64,
    pub scribnews_notes: u64,
    pub sessions: u64,
    pub pageviews: u64,
    pub avg_scroll: f64,
    pub productivity: f64,
}

/// Which producing system a note's source string names. Evaluated in the
/// order composer, then scribnews; the first matching substring wins.
fn matches_composer(source: Option<&str>) -> bool {
    source.is_some_and(|source| source.to_ascii_lowercase().contains("composer"))
}

fn matches_scribnews(source: Option<&str>) -> bool {
    source.is_some_and(|source| source.to_ascii_lowercase().contains("scribnews"))
}

#[derive(Default)]
struct SectionAccumulator {
    notes: BTreeSet<NoteId>,
    composer_notes: BTreeSet<NoteId>,
    scribnews_notes: BTreeSet<NoteId>,
    visits: i64,
    pageviews: i64,
    scrolls: i64,
}

pub fn by_section(inputs: &ReportInputs<'_>) -> Vec<SectionStats> {
    let mut sections: BTreeMap<String, SectionAccumulator> = BTreeMap::new();

    for event in inputs.window_events {
        if event.action_type != ActionType::FirstPublish
            || !inputs.filters.event_section_matches(event)
            || !inputs.filters.country_matches(event.editor(), inputs.authors)
        {
            continue;
        }
        if let Some(scope) = inputs.scope {
            if !scope.contains_published(&event.note_id) {
                continue;
            }
        }
        let Some(section) = event.section() else {
            continue;
        };
        let entry = sections.entry(section.to_string()).or_default();
        entry.notes.insert(event.note_id.clone());
        let source = event.source.as_deref();
        if matches_composer(source) {
            entry.composer_notes.insert(event.note_id.clone());
        } else if matches_scribnews(source) {
            entry.scribnews_notes.insert(event.note_id.clone());
        }
    }

    for record in inputs.daily {
        let in_scope = match inputs.scope {
            Some(scope) => scope.owns_url(&record.article_url),
            None => {
                record.publish_date.is_some_and(|published| inputs.window.contains(published))
            }
        };
        if !in_scope
            || !inputs.filters.traffic_section_matches(record.section.as_deref())
            || !inputs.filters.country_matches(record.creator_email.as_deref(), inputs.authors)
        {
            continue;
        }
        let Some(section) = record.section.as_deref() else {
            continue;
        };
        let entry = sections.entry(section.to_string()).or_default();
        entry.visits += record.visits;
        entry.pageviews += record.pageviews;
        entry.scrolls += record.scrolls;
    }

    let mut stats: Vec<SectionStats> = sections
        .into_iter()
        .map(|(section, acc)| {
            let notes = acc.notes.len() as u64;
            SectionStats {
                section,
                notes,
                composer_notes: acc.composer_notes.len() as u64,
                scribnews_notes: acc.scribnews_notes.len() as u64,
                sessions: acc.visits.max(0) as u64,
                pageviews: acc.pageviews.max(0) as u64,
                avg_scroll: safe_ratio(acc.scrolls, acc.visits),
                productivity: acc.visits.max(0) as f64 / notes.max(1) as f64,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.notes.cmp(&a.notes).then_with(|| a.section.cmp(&b.section)));
    stats
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{NaiveDate, TimeZone, Utc};

    use super::by_section;
    use crate::attribution::AttributionMap;
    use crate::domain::{
        ActionType, AuthorIndex, DateWindow, EditorialEvent, NoteId, TrafficRecord,
    };
    use crate::filters::ReportFilters;
    use crate::inputs::ReportInputs;
    use crate::scope::UserScope;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("date")
    }

    fn publish(note: &str, section: &str, source: Option<&str>) -> EditorialEvent {
        EditorialEvent {
            note_id: NoteId(note.to_string()),
            editor_email: Some("alice@x".to_string()),
            action_type: ActionType::FirstPublish,
            event_timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("ts"),
            story_url: Some(format!("https://news.example/{note}")),
            segment: Some(section.to_string()),
            source: source.map(str::to_string),
            title_word_count: None,
            body_word_count: None,
        }
    }

    fn traffic(note: &str, section: &str, visits: i64) -> TrafficRecord {
        TrafficRecord {
            article_url: format!("https://news.example/{note}"),
            day: day(2),
            visits,
            pageviews: visits * 3,
            total_time_seconds: 0,
            scrolls: visits / 2,
            section: Some(section.to_string()),
            creator_email: None,
            publish_date: Some(day(2)),
            title: None,
        }
    }

    struct Fixture {
        window: DateWindow,
        events: Vec<EditorialEvent>,
        attribution: AttributionMap,
        daily: Vec<TrafficRecord>,
        authors: AuthorIndex,
        filters: ReportFilters,
    }

    impl Fixture {
        fn new(events: Vec<EditorialEvent>, daily: Vec<TrafficRecord>) -> Self {
            let attribution = AttributionMap::resolve(&events, &HashSet::new());
            Fixture {
                window: DateWindow::new(day(1), day(5)).expect("window"),
                events,
                attribution,
                daily,
                authors: AuthorIndex::default(),
                filters: ReportFilters::default(),
            }
        }

        fn inputs(&self) -> ReportInputs<'_> {
            ReportInputs {
                window: &self.window,
                window_events: &self.events,
                attribution: &self.attribution,
                scope: None,
                daily: &self.daily,
                sessions: &[],
                authors: &self.authors,
                filters: &self.filters,
            }
        }
    }

    #[test]
    fn notes_bucket_by_source_substring_first_match_wins() {
        let fixture = Fixture::new(
            vec![
                publish("n1", "politics", Some("ComposerCMS")),
                publish("n2", "politics", Some("scribnews-auto")),
                publish("n3", "politics", None),
            ],
            vec![],
        );
        let stats = by_section(&fixture.inputs());

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].notes, 3);
        assert_eq!(stats[0].composer_notes, 1);
        assert_eq!(stats[0].scribnews_notes, 1);
    }

    #[test]
    fn traffic_joins_by_denormalized_section() {
        let fixture = Fixture::new(
            vec![publish("n1", "politics", None), publish("n2", "economy", None)],
            vec![traffic("n1", "politics", 100), traffic("n2", "economy", 40)],
        );
        let stats = by_section(&fixture.inputs());

        let politics = stats.iter().find(|s| s.section == "politics").expect("politics");
        assert_eq!(politics.sessions, 100);
        assert_eq!(politics.pageviews, 300);
        assert!((politics.avg_scroll - 0.5).abs() < 1e-9);
        assert!((politics.productivity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sections_sort_by_note_count_descending() {
        let fixture = Fixture::new(
            vec![
                publish("n1", "economy", None),
                publish("n2", "economy", None),
                publish("n3", "politics", None),
            ],
            vec![],
        );
        let stats = by_section(&fixture.inputs());
        assert_eq!(stats[0].section, "economy");
        assert_eq!(stats[1].section, "politics");
    }

    #[test]
    fn zero_note_section_reports_sessions_as_productivity() {
        // Traffic in a section with no publish event in window.
        let fixture = Fixture::new(vec![], vec![traffic("n9", "sports", 30)]);
        let stats = by_section(&fixture.inputs());
        assert_eq!(stats[0].notes, 0);
        assert!((stats[0].productivity - 30.0).abs() < 1e-9);
    }

    #[test]
    fn scoped_rollup_is_limited_to_published_subset() {
        let mut fixture = Fixture::new(
            vec![publish("n1", "politics", None), publish("n2", "economy", None)],
            vec![traffic("n1", "politics", 100), traffic("n2", "economy", 40)],
        );
        fixture.events[1].editor_email = Some("bob@x".to_string());
        fixture.attribution = AttributionMap::resolve(&fixture.events, &HashSet::new());

        let scope = UserScope::resolve("bob@x", &fixture.attribution);
        let mut inputs = fixture.inputs();
        inputs.scope = Some(&scope);
        let stats = by_section(&inputs);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].section, "economy");
        assert_eq!(stats[0].sessions, 40);
    }
}
