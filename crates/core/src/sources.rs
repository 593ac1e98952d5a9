//! Production-source efficiency roll-up.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{is_agency_account, ActionType, NoteId};
use crate::inputs::ReportInputs;
use crate::metrics::safe_ratio;

/// Where a published note was produced. Agency wins over the source-string
/// match; Other is tracked internally and never reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceBucket {
    Agency,
    Composer,
    Scribnews,
    Other,
}

impl SourceBucket {
    pub(crate) fn classify(publisher: Option<&str>, source: Option<&str>) -> Self {
        if publisher.is_some_and(is_agency_account) {
            return Self::Agency;
        }
        let source = source.map(str::to_ascii_lowercase);
        match source.as_deref() {
            Some(source) if source.contains("scribnews") => Self::Scribnews,
            Some(source) if source.contains("composer") => Self::Composer,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Agency => "Agency",
            Self::Composer => "Composer",
            Self::Scribnews => "Scribnews",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceEfficiency {
    pub source_bucket: SourceBucket,
    pub notes: u64,
    pub sessions: u64,
    pub pageviews: u64,
    pub sessions_per_note: f64,
    pub avg_scroll: f64,
    pub avg_time_minutes: f64,
}

#[derive(Default)]
struct BucketAccumulator {
    notes: BTreeSet<NoteId>,
    visits: i64,
    pageviews: i64,
    scrolls: i64,
    time_seconds: i64,
}

pub fn by_source(inputs: &ReportInputs<'_>) -> Vec<SourceEfficiency> {
    let mut buckets: BTreeMap<SourceBucket, BucketAccumulator> = BTreeMap::new();
    let mut bucket_by_url: HashMap<&str, SourceBucket> = HashMap::new();

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
        let bucket = SourceBucket::classify(event.editor(), event.source.as_deref());
        buckets.entry(bucket).or_default().notes.insert(event.note_id.clone());
        if let Some(url) = event.url() {
            bucket_by_url.entry(url).or_insert(bucket);
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
        let Some(bucket) = bucket_by_url.get(record.article_url.as_str()) else {
            continue;
        };
        let entry = buckets.entry(*bucket).or_default();
        entry.visits += record.visits;
        entry.pageviews += record.pageviews;
        entry.scrolls += record.scrolls;
        entry.time_seconds += record.total_time_seconds;
    }

    let mut rows: Vec<SourceEfficiency> = buckets
        .into_iter()
        .filter(|(bucket, _)| *bucket != SourceBucket::Other)
        .map(|(bucket, acc)| SourceEfficiency {
            source_bucket: bucket,
            notes: acc.notes.len() as u64,
            sessions: acc.visits.max(0) as u64,
            pageviews: acc.pageviews.max(0) as u64,
            sessions_per_note: acc.visits.max(0) as f64 / acc.notes.len().max(1) as f64,
            avg_scroll: safe_ratio(acc.scrolls, acc.visits),
            avg_time_minutes: safe_ratio(acc.time_seconds, acc.visits) / 60.0,
        })
        .collect();
    rows.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    rows
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{by_source, SourceBucket};
    use crate::attribution::AttributionMap;
    use crate::domain::{
        ActionType, AuthorIndex, DateWindow, EditorialEvent, NoteId, TrafficRecord,
        AGENCY_ACCOUNT,
    };
    use crate::filters::ReportFilters;
    use crate::inputs::ReportInputs;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("date")
    }

    fn publish(note: &str, editor: &str, source: Option<&str>) -> EditorialEvent {
        EditorialEvent {
            note_id: NoteId(note.to_string()),
            editor_email: Some(editor.to_string()),
            action_type: ActionType::FirstPublish,
            event_timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().expect("ts"),
            story_url: Some(format!("https://news.example/{note}")),
            segment: None,
            source: source.map(str::to_string),
            title_word_count: None,
            body_word_count: None,
        }
    }

    fn traffic(note: &str, visits: i64) -> TrafficRecord {
        TrafficRecord {
            article_url: format!("https://news.example/{note}"),
            day: day(2),
            visits,
            pageviews: visits * 2,
            total_time_seconds: visits * 120,
            scrolls: visits / 4,
            section: None,
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
    fn agency_publisher_wins_over_source_string() {
        let fixture =
            Fixture::new(vec![publish("n1", AGENCY_ACCOUNT, Some("ComposerCMS"))], vec![]);
        let rows = by_source(&fixture.inputs());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_bucket, SourceBucket::Agency);
    }

    #[test]
    fn other_bucket_is_never_reported() {
        let fixture = Fixture::new(
            vec![publish("n1", "alice@x", None), publish("n2", "alice@x", Some("legacy-cms"))],
            vec![],
        );
        let rows = by_source(&fixture.inputs());
        assert!(rows.is_empty());
    }

    #[test]
    fn buckets_aggregate_traffic_and_rank_by_sessions() {
        let fixture = Fixture::new(
            vec![
                publish("n1", "alice@x", Some("ComposerCMS")),
                publish("n2", "alice@x", Some("ComposerCMS")),
                publish("n3", "bob@x", Some("scribnews-auto")),
            ],
            vec![traffic("n1", 40), traffic("n2", 40), traffic("n3", 100)],
        );
        let rows = by_source(&fixture.inputs());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source_bucket, SourceBucket::Scribnews);
        assert_eq!(rows[0].sessions, 100);
        assert_eq!(rows[1].source_bucket, SourceBucket::Composer);
        assert_eq!(rows[1].notes, 2);
        assert!((rows[1].sessions_per_note - 40.0).abs() < 1e-9);
        assert!((rows[1].avg_scroll - 0.25).abs() < 1e-9);
        assert!((rows[1].avg_time_minutes - 2.0).abs() < 1e-9);
    }
}
