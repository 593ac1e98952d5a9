//! Report request layer: fetch, compute, memoize, fan out.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use newsdesk_core::{
    articles, filters, leaderboard, metrics, performance, sections, sources, timeseries,
    AttributionMap, AuthorIndex, AuthorPerformance, AuthorRole, DailySeries, DateWindow,
    DomainError, EditorialEvent, FilterCatalog, KpiComparison, KpiSet, LeaderboardEntry,
    LeaderboardRole, ReportFilters, ReportInputs, SectionStats, SeriesMetric, SessionRecord,
    SourceEfficiency, TopArticle, TrafficRecord, UserScope,
};
use newsdesk_db::stores::{AuthorDirectory, EventStore, StoreError, TrafficStore};

use crate::cache::{CacheKey, ReportCache};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// One degraded aggregate inside an otherwise successful overview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    pub aggregate: String,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportOverview {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub kpis: KpiComparison,
    pub top_creators: Vec<LeaderboardEntry>,
    pub top_publishers: Vec<LeaderboardEntry>,
    pub sessions_series: DailySeries,
    pub sections: Vec<SectionStats>,
    pub sources: Vec<SourceEfficiency>,
    pub top_articles: Vec<TopArticle>,
    pub warnings: Vec<ReportWarning>,
}

/// Everything a builder needs, fetched once per computed operation.
struct Materialized {
    window_events: Vec<EditorialEvent>,
    attribution: AttributionMap,
    scope: Option<UserScope>,
    daily: Vec<TrafficRecord>,
    sessions: Vec<SessionRecord>,
    authors: AuthorIndex,
}

impl Materialized {
    fn inputs<'a>(&'a self, window: &'a DateWindow, filters: &'a ReportFilters) -> ReportInputs<'a> {
        ReportInputs {
            window,
            window_events: &self.window_events,
            attribution: &self.attribution,
            scope: self.scope.as_ref(),
            daily: &self.daily,
            sessions: &self.sessions,
            authors: &self.authors,
            filters,
        }
    }
}

pub struct ReportService {
    events: Arc<dyn EventStore>,
    traffic: Arc<dyn TrafficStore>,
    directory: Arc<dyn AuthorDirectory>,
    cache: ReportCache,
    leaderboard_limit: usize,
}

impl ReportService {
    pub fn new(
        events: Arc<dyn EventStore>,
        traffic: Arc<dyn TrafficStore>,
        directory: Arc<dyn AuthorDirectory>,
        cache_ttl: Duration,
        leaderboard_limit: usize,
    ) -> Self {
        Self {
            events,
            traffic,
            directory,
            cache: ReportCache::new(cache_ttl),
            leaderboard_limit,
        }
    }

    async fn materialize(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
    ) -> Result<Materialized, ReportError> {
        let window_events = self.events.events_in_window(window).await?;
        let create_ever = self.events.note_ids_with_create().await?;
        let attribution = AttributionMap::resolve(&window_events, &create_ever);
        let scope = filters.person().map(|person| UserScope::resolve(person, &attribution));
        let daily = self.traffic.daily_in_window(window).await?;
        let sessions = self.traffic.sessions_in_window(window).await?;
        let authors = AuthorIndex::new(self.directory.all_authors().await?);

        Ok(Materialized { window_events, attribution, scope, daily, sessions, authors })
    }

    /// Memoized compute: a hit within TTL short-circuits the store round
    /// trips entirely.
    async fn cached<T, F>(
        &self,
        operation: &str,
        window: &DateWindow,
        filters: &ReportFilters,
        compute: F,
    ) -> Result<T, ReportError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(ReportInputs<'_>) -> T,
    {
        let key = CacheKey::new(operation, window, filters);
        if let Some(value) = self.cache.get(&key).await {
            tracing::debug!(event_name = "report.cache_hit", operation = operation);
            return Ok(serde_json::from_value(value)?);
        }

        let materialized = self.materialize(window, filters).await?;
        let result = compute(materialized.inputs(window, filters));
        self.cache.insert(key, serde_json::to_value(&result)?).await;
        tracing::debug!(event_name = "report.computed", operation = operation);
        Ok(result)
    }

    pub async fn kpis(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
    ) -> Result<KpiSet, ReportError> {
        self.cached("kpis", window, filters, |inputs| metrics::aggregate(&inputs)).await
    }

    /// KPIs for the window and the adjacent equal-length previous window.
    pub async fn compare(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
    ) -> Result<KpiComparison, ReportError> {
        let current = self.kpis(window, filters).await?;
        let previous = self.kpis(&window.previous(), filters).await?;
        Ok(KpiComparison::new(current, previous))
    }

    pub async fn top_people(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
        role: LeaderboardRole,
    ) -> Result<Vec<LeaderboardEntry>, ReportError> {
        let operation = match role {
            LeaderboardRole::Creator => "leaderboard.creators",
            LeaderboardRole::Publisher => "leaderboard.publishers",
        };
        let limit = self.leaderboard_limit;
        self.cached(operation, window, filters, |inputs| leaderboard::top(&inputs, role, limit))
            .await
    }

    pub async fn daily_series(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
        metric: SeriesMetric,
    ) -> Result<DailySeries, ReportError> {
        let operation = format!("series.{}", metric.as_str());
        self.cached(&operation, window, filters, |inputs| timeseries::series(&inputs, metric))
            .await
    }

    pub async fn section_stats(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
    ) -> Result<Vec<SectionStats>, ReportError> {
        self.cached("sections", window, filters, |inputs| sections::by_section(&inputs)).await
    }

    pub async fn source_efficiency(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
    ) -> Result<Vec<SourceEfficiency>, ReportError> {
        self.cached("sources", window, filters, |inputs| sources::by_source(&inputs)).await
    }

    pub async fn top_articles(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
        limit: usize,
    ) -> Result<Vec<TopArticle>, ReportError> {
        let operation = format!("articles.top{limit}");
        self.cached(&operation, window, filters, |inputs| articles::top_articles(&inputs, limit))
            .await
    }

    pub async fn author_performance(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
        role: AuthorRole,
    ) -> Result<Vec<AuthorPerformance>, ReportError> {
        let operation = format!("performance.{}", role.as_str());
        self.cached(&operation, window, filters, |inputs| {
            performance::author_performance(&inputs, role)
        })
        .await
    }

    pub async fn filter_catalog(
        &self,
        window: &DateWindow,
    ) -> Result<FilterCatalog, ReportError> {
        let no_filters = ReportFilters::default();
        self.cached("filters", window, &no_filters, |inputs| {
            filters::catalog(inputs.window_events, inputs.authors)
        })
        .await
    }

    /// Max day on the daily traffic grain; never cached so a refresh sees
    /// newly landed data immediately.
    pub async fn latest_data_date(&self) -> Result<Option<NaiveDate>, ReportError> {
        Ok(self.traffic.latest_date().await?)
    }

    pub async fn refresh(&self) {
        self.cache.invalidate_all().await;
        tracing::info!(event_name = "report.cache_invalidated");
    }

    /// The full overview fans out its independent aggregates; any aggregate
    /// whose store calls fail degrades to its zero/empty default and surfaces
    /// a warning instead of failing the report.
    pub async fn overview(
        &self,
        window: &DateWindow,
        filters: &ReportFilters,
    ) -> Result<ReportOverview, ReportError> {
        let (kpis, creators, publishers, series, sections, sources, articles) = tokio::join!(
            self.compare(window, filters),
            self.top_people(window, filters, LeaderboardRole::Creator),
            self.top_people(window, filters, LeaderboardRole::Publisher),
            self.daily_series(window, filters, SeriesMetric::Sessions),
            self.section_stats(window, filters),
            self.source_efficiency(window, filters),
            self.top_articles(window, filters, self.leaderboard_limit),
        );

        let mut warnings = Vec::new();
        let mut degrade = |aggregate: &str, error: ReportError| {
            tracing::warn!(
                event_name = "report.aggregate_degraded",
                aggregate = aggregate,
                error = %error,
            );
            warnings.push(ReportWarning {
                aggregate: aggregate.to_string(),
                message: error.to_string(),
            });
        };

        let kpis = kpis.unwrap_or_else(|error| {
            degrade("kpis", error);
            KpiComparison::new(KpiSet::default(), KpiSet::default())
        });
        let top_creators = creators.unwrap_or_else(|error| {
            degrade("top_creators", error);
            Vec::new()
        });
        let top_publishers = publishers.unwrap_or_else(|error| {
            degrade("top_publishers", error);
            Vec::new()
        });
        let sessions_series = series.unwrap_or_else(|error| {
            degrade("sessions_series", error);
            DailySeries { metric: SeriesMetric::Sessions, points: Vec::new(), trend: None }
        });
        let sections = sections.unwrap_or_else(|error| {
            degrade("sections", error);
            Vec::new()
        });
        let sources = sources.unwrap_or_else(|error| {
            degrade("sources", error);
            Vec::new()
        });
        let top_articles = articles.unwrap_or_else(|error| {
            degrade("top_articles", error);
            Vec::new()
        });

        Ok(ReportOverview {
            window_start: window.start(),
            window_end: window.end(),
            kpis,
            top_creators,
            top_publishers,
            sessions_series,
            sections,
            sources,
            top_articles,
            warnings,
        })
    }
}
