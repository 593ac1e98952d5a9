//! Headline KPI aggregation and prior-period comparison.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ActionType, NoteId, TrafficRecord};
use crate::inputs::ReportInputs;

/// Ratio with a zero denominator degrading to zero instead of dividing.
pub(crate) fn safe_ratio(numerator: i64, denominator: i64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub creators_count: u64,
    pub publishers_count: u64,
    pub notes_published: u64,
    pub sessions: u64,
    pub unique_users: u64,
    pub pageviews: u64,
    pub avg_time_minutes: f64,
    pub avg_scroll_rate: f64,
    pub sessions_with_scroll: u64,
    /// Sessions generated per published note; the denominator is
    /// floor-clamped to 1 so a zero-note window reports the session count.
    pub productivity: f64,
}

pub fn aggregate(inputs: &ReportInputs<'_>) -> KpiSet {
    let (creators_count, publishers_count, notes_published) = production(inputs);
    let traffic = traffic(inputs);

    let productivity = traffic.sessions as f64 / (notes_published.max(1)) as f64;

    KpiSet {
        creators_count,
        publishers_count,
        notes_published,
        sessions: traffic.sessions,
        unique_users: traffic.unique_users,
        pageviews: traffic.pageviews,
        avg_time_minutes: traffic.avg_time_minutes,
        avg_scroll_rate: traffic.avg_scroll_rate,
        sessions_with_scroll: traffic.sessions_with_scroll,
        productivity,
    }
}

fn production(inputs: &ReportInputs<'_>) -> (u64, u64, u64) {
    match inputs.scope {
        Some(scope) => {
            // Scoped counts answer "who else touched my notes": the distinct
            // creators and publishers of the scope's published subset.
            let mut creators: BTreeSet<&str> = BTreeSet::new();
            let mut publishers: BTreeSet<&str> = BTreeSet::new();
            for note_id in &scope.published {
                let Some(ownership) = inputs.attribution.get(note_id) else {
                    continue;
                };
                creators.extend(ownership.creators.iter().map(String::as_str));
                publishers.extend(ownership.publishers.iter().map(String::as_str));
            }

            let mut notes: BTreeSet<&NoteId> = BTreeSet::new();
            for event in inputs.window_events {
                if event.action_type != ActionType::FirstPublish
                    || !scope.contains_published(&event.note_id)
                    || !inputs.filters.event_section_matches(event)
                    || !inputs.filters.country_matches(event.editor(), inputs.authors)
                {
                    continue;
                }
                notes.insert(&event.note_id);
            }

            (creators.len() as u64, publishers.len() as u64, notes.len() as u64)
        }
        None => {
            let mut creators: BTreeSet<&str> = BTreeSet::new();
            let mut publishers: BTreeSet<&str> = BTreeSet::new();
            let mut notes: BTreeSet<&NoteId> = BTreeSet::new();
            for event in inputs.window_events {
                if !inputs.filters.event_section_matches(event)
                    || !inputs.filters.country_matches(event.editor(), inputs.authors)
                {
                    continue;
                }
                match event.action_type {
                    ActionType::Create => {
                        if let Some(editor) = event.editor() {
                            creators.insert(editor);
                        }
                    }
                    ActionType::FirstPublish => {
                        if let Some(editor) = event.editor() {
                            publishers.insert(editor);
                        }
                        notes.insert(&event.note_id);
                    }
                    ActionType::Save => {}
                }
            }
            (creators.len() as u64, publishers.len() as u64, notes.len() as u64)
        }
    }
}

struct TrafficTotals {
    sessions: u64,
    unique_users: u64,
    pageviews: u64,
    avg_time_minutes: f64,
    avg_scroll_rate: f64,
    sessions_with_scroll: u64,
}

/// Daily-grain record eligibility for the active filters. Unscoped reports
/// keep records published within the window; scoped reports keep records for
/// the scope's published URLs.
fn daily_eligible(inputs: &ReportInputs<'_>, record: &TrafficRecord) -> bool {
    let in_scope = match inputs.scope {
        Some(scope) => scope.owns_url(&record.article_url),
        None => record.publish_date.is_some_and(|published| inputs.window.contains(published)),
    };
    in_scope
        && inputs.filters.traffic_section_matches(record.section.as_deref())
        && inputs.filters.country_matches(record.creator_email.as_deref(), inputs.authors)
}

fn traffic(inputs: &ReportInputs<'_>) -> TrafficTotals {
    let mut visits = 0i64;
    let mut pageviews = 0i64;
    let mut time_seconds = 0i64;
    let mut scrolls = 0i64;
    let mut eligible_days: HashSet<(&str, NaiveDate)> = HashSet::new();

    for record in inputs.daily {
        if !daily_eligible(inputs, record) {
            continue;
        }
        visits += record.visits;
        pageviews += record.pageviews;
        time_seconds += record.total_time_seconds;
        scrolls += record.scrolls;
        eligible_days.insert((record.article_url.as_str(), record.day));
    }

    let unique_users: i64 = inputs
        .sessions
        .iter()
        .filter(|record| match inputs.scope {
            Some(scope) => scope.owns_url(&record.article_url),
            None => eligible_days.contains(&(record.article_url.as_str(), record.day)),
        })
        .map(|record| record.daily_users)
        .sum();

    TrafficTotals {
        sessions: visits.max(0) as u64,
        unique_users: unique_users.max(0) as u64,
        pageviews: pageviews.max(0) as u64,
        avg_time_minutes: safe_ratio(time_seconds, visits) / 60.0,
        avg_scroll_rate: safe_ratio(scrolls, visits),
        sessions_with_scroll: scrolls.max(0) as u64,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDirection {
    Positive,
    Negative,
    Neutral,
}

/// Percentage change against the previous period. A zero or missing previous
/// value yields a zero delta with a neutral direction, never an error.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub pct: f64,
    pub direction: DeltaDirection,
}

impl Delta {
    pub fn between(current: f64, previous: f64) -> Self {
        if previous == 0.0 || !previous.is_finite() {
            return Self { pct: 0.0, direction: DeltaDirection::Neutral };
        }
        let pct = (current - previous) / previous * 100.0;
        let direction =
            if pct >= 0.0 { DeltaDirection::Positive } else { DeltaDirection::Negative };
        Self { pct, direction }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiDeltas {
    pub creators_count: Delta,
    pub publishers_count: Delta,
    pub notes_published: Delta,
    pub sessions: Delta,
    pub unique_users: Delta,
    pub pageviews: Delta,
    pub avg_time_minutes: Delta,
    pub avg_scroll_rate: Delta,
    pub productivity: Delta,
}

/// KPIs for the requested window and the immediately preceding equal-length
/// window, with per-metric deltas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KpiComparison {
    pub current: KpiSet,
    pub previous: KpiSet,
    pub deltas: KpiDeltas,
}

impl KpiComparison {
    pub fn new(current: KpiSet, previous: KpiSet) -> Self {
        let deltas = KpiDeltas {
            creators_count: Delta::between(
                current.creators_count as f64,
                previous.creators_count as f64,
            ),
            publishers_count: Delta::between(
                current.publishers_count as f64,
                previous.publishers_count as f64,
            ),
            notes_published: Delta::between(
                current.notes_published as f64,
                previous.notes_published as f64,
            ),
            sessions: Delta::between(current.sessions as f64, previous.sessions as f64),
            unique_users: Delta::between(current.unique_users as f64, previous.unique_users as f64),
            pageviews: Delta::between(current.pageviews as f64, previous.pageviews as f64),
            avg_time_minutes: Delta::between(current.avg_time_minutes, previous.avg_time_minutes),
            avg_scroll_rate: Delta::between(current.avg_scroll_rate, previous.avg_scroll_rate),
            productivity: Delta::between(current.productivity, previous.productivity),
        };
        Self { current, previous, deltas }
    }
}
