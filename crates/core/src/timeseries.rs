//! Daily time series with linear-trend classification.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{ActionType, NoteId};
use crate::inputs::ReportInputs;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesMetric {
    Sessions,
    UniqueUsers,
    NotesPublished,
    Pageviews,
    Scrolls,
}

impl SeriesMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sessions => "sessions",
            Self::UniqueUsers => "unique_users",
            Self::NotesPublished => "notes_published",
            Self::Pageviews => "pageviews",
            Self::Scrolls => "scrolls",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub day: NaiveDate,
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Upward,
    Downward,
}

/// One point per calendar day that has at least one contributing record;
/// days without activity are omitted, not zero-filled. The trend is
/// undefined below two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub metric: SeriesMetric,
    pub points: Vec<SeriesPoint>,
    pub trend: Option<TrendDirection>,
}

pub fn series(inputs: &ReportInputs<'_>, metric: SeriesMetric) -> DailySeries {
    let by_day = match metric {
        SeriesMetric::NotesPublished => notes_by_day(inputs),
        SeriesMetric::UniqueUsers => users_by_day(inputs),
        SeriesMetric::Sessions => daily_field_by_day(inputs, |r| r.visits),
        SeriesMetric::Pageviews => daily_field_by_day(inputs, |r| r.pageviews),
        SeriesMetric::Scrolls => daily_field_by_day(inputs, |r| r.scrolls),
    };

    let points: Vec<SeriesPoint> =
        by_day.into_iter().map(|(day, value)| SeriesPoint { day, value }).collect();
    let trend = classify_trend(&points);
    DailySeries { metric, points, trend }
}

fn notes_by_day(inputs: &ReportInputs<'_>) -> BTreeMap<NaiveDate, f64> {
    let mut notes_per_day: BTreeMap<NaiveDate, BTreeSet<&NoteId>> = BTreeMap::new();
    for event in inputs.window_events {
        if event.action_type != ActionType::FirstPublish
            || !inputs.filters.event_section_matches(event)
            || !inputs.filters.country_matches(event.editor(), inputs.authors)
        {
            continue;
        }
        if let Some(scope) = inputs.scope {
            if !scope.contains(&event.note_id) {
                continue;
            }
        }
        notes_per_day.entry(event.day()).or_default().insert(&event.note_id);
    }
    notes_per_day.into_iter().map(|(day, notes)| (day, notes.len() as f64)).collect()
}

fn users_by_day(inputs: &ReportInputs<'_>) -> BTreeMap<NaiveDate, f64> {
    // Unscoped, a session row only counts when the same (url, day) exists on
    // the daily grain with an in-window publish date.
    let eligible_days: HashSet<(&str, NaiveDate)> = inputs
        .daily
        .iter()
        .filter(|record| daily_record_eligible(inputs, record))
        .map(|record| (record.article_url.as_str(), record.day))
        .collect();

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in inputs.sessions {
        let keep = match inputs.scope {
            Some(scope) => scope.owns_url(&record.article_url),
            None => eligible_days.contains(&(record.article_url.as_str(), record.day)),
        };
        if keep {
            *by_day.entry(record.day).or_insert(0.0) += record.daily_users as f64;
        }
    }
    by_day
}

fn daily_record_eligible(
    inputs: &ReportInputs<'_>,
    record: &crate::domain::TrafficRecord,
) -> bool {
    let in_scope = match inputs.scope {
        Some(scope) => scope.owns_url(&record.article_url),
        None => record.publish_date.is_some_and(|published| inputs.window.contains(published)),
    };
    in_scope
        && inputs.filters.traffic_section_matches(record.section.as_deref())
        && inputs.filters.country_matches(record.creator_email.as_deref(), inputs.authors)
}

fn daily_field_by_day(
    inputs: &ReportInputs<'_>,
    field: impl Fn(&crate::domain::TrafficRecord) -> i64,
) -> BTreeMap<NaiveDate, f64> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in inputs.daily {
        if daily_record_eligible(inputs, record) {
            *by_day.entry(record.day).or_insert(0.0) += field(record) as f64;
        }
    }
    by_day
}

/// Ordinary least squares over (day ordinal, value); positive slope reads as
/// upward. Below two points the trend is undefined.
fn classify_trend(points: &[SeriesPoint]) -> Option<TrendDirection> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x =
        points.iter().map(|point| point.day.num_days_from_ce() as f64).sum::<f64>() / n;
    let mean_y = points.iter().map(|point| point.value).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for point in points {
        let dx = point.day.num_days_from_ce() as f64 - mean_x;
        covariance += dx * (point.value - mean_y);
        variance += dx * dx;
    }
    if variance == 0.0 {
        return None;
    }
    let slope = covariance / variance;
    Some(if slope > 0.0 { TrendDirection::Upward } else { TrendDirection::Downward })
}
