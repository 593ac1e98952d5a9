pub mod articles;
pub mod attribution;
pub mod config;
pub mod domain;
pub mod errors;
pub mod filters;
pub mod inputs;
pub mod leaderboard;
pub mod metrics;
pub mod performance;
pub mod scope;
pub mod sections;
pub mod sources;
pub mod timeseries;

pub use articles::TopArticle;
pub use attribution::{AttributionMap, NoteOwnership};
pub use config::{
    AppConfig, CacheConfig, ConfigError, ConfigOverrides, DatabaseConfig, LoadOptions, LogFormat,
    LoggingConfig, ReportConfig,
};
pub use domain::{
    is_agency_account, ActionType, Author, AuthorIndex, DateWindow, EditorialEvent, NoteId,
    SessionRecord, TrafficRecord, AGENCY_ACCOUNT, AGENCY_DISPLAY_NAME,
};
pub use errors::DomainError;
pub use filters::{FilterCatalog, PersonOption, ReportFilters};
pub use inputs::ReportInputs;
pub use leaderboard::{LeaderboardEntry, LeaderboardRole};
pub use metrics::{Delta, DeltaDirection, KpiComparison, KpiDeltas, KpiSet};
pub use performance::{AuthorPerformance, AuthorRole};
pub use scope::UserScope;
pub use sections::SectionStats;
pub use sources::{SourceBucket, SourceEfficiency};
pub use timeseries::{DailySeries, SeriesMetric, SeriesPoint, TrendDirection};
