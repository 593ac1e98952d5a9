//! Per-article roll-up for the window's best performers.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::domain::{ActionType, EditorialEvent, NoteId};
use crate::inputs::ReportInputs;
use crate::metrics::safe_ratio;
use crate::sources::SourceBucket;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopArticle {
    pub url: String,
    pub title: Option<String>,
    pub section: Option<String>,
    pub creators: Vec<String>,
    pub publishers: Vec<String>,
    pub source_bucket: Option<SourceBucket>,
    pub visits: u64,
    pub pageviews: u64,
    pub avg_scroll: f64,
    pub title_word_count: Option<i64>,
    pub body_word_count: Option<i64>,
}

#[derive(Default)]
struct TrafficSums {
    visits: i64,
    pageviews: i64,
    scrolls: i64,
    title: Option<String>,
}

struct EditorialFacts<'a> {
    note_id: &'a NoteId,
    event: &'a EditorialEvent,
}

/// Articles ranked by visits. Scoped requests list every URL in the scope's
/// published subset, traffic or not; unscoped requests start from the traffic
/// store and drop rows without a real article title (homepage and section
/// front rows carry none).
pub fn top_articles(inputs: &ReportInputs<'_>, limit: usize) -> Vec<TopArticle> {
    let mut traffic: BTreeMap<&str, TrafficSums> = BTreeMap::new();
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
        let entry = traffic.entry(record.article_url.as_str()).or_default();
        entry.visits += record.visits;
        entry.pageviews += record.pageviews;
        entry.scrolls += record.scrolls;
        if entry.title.is_none() {
            entry.title = record.title.clone().filter(|title| !title.trim().is_empty());
        }
    }

    // First publish event per URL carries the editorial facts.
    let mut facts_by_url: HashMap<&str, EditorialFacts<'_>> = HashMap::new();
    for event in inputs.window_events {
        if event.action_type != ActionType::FirstPublish {
            continue;
        }
        if let Some(url) = event.url() {
            facts_by_url
                .entry(url)
                .or_insert(EditorialFacts { note_id: &event.note_id, event });
        }
    }

    let urls: Vec<String> = match inputs.scope {
        Some(scope) => scope.published_urls.iter().cloned().collect(),
        None => traffic
            .iter()
            .filter(|(_, sums)| sums.title.is_some())
            .map(|(url, _)| (*url).to_string())
            .collect(),
    };

    let mut articles: Vec<TopArticle> = urls
        .into_iter()
        .map(|url| {
            let sums = traffic.get(url.as_str());
            let facts = facts_by_url.get(url.as_str());
            let ownership =
                facts.and_then(|facts| inputs.attribution.get(facts.note_id));
            let label = |email: &String| inputs.authors.display_label(email);
            TopArticle {
                title: sums.and_then(|sums| sums.title.clone()),
                section: facts.and_then(|facts| facts.event.section().map(str::to_string)),
                creators: ownership
                    .map(|o| o.creators.iter().map(label).collect())
                    .unwrap_or_default(),
                publishers: ownership
                    .map(|o| o.publishers.iter().map(label).collect())
                    .unwrap_or_default(),
                source_bucket: facts.map(|facts| {
                    SourceBucket::classify(facts.event.editor(), facts.event.source.as_deref())
                }),
                visits: sums.map_or(0, |sums| sums.visits.max(0) as u64),
                pageviews: sums.map_or(0, |sums| sums.pageviews.max(0) as u64),
                avg_scroll: sums.map_or(0.0, |sums| safe_ratio(sums.scrolls, sums.visits)),
                title_word_count: facts.and_then(|facts| facts.event.title_word_count),
                body_word_count: facts.and_then(|facts| facts.event.body_word_count),
                url,
            }
        })
        .collect();
    articles.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.url.cmp(&b.url)));
    articles.truncate(limit);
    articles
}
