use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One (article URL, day) row of the raw daily traffic grain. Drives every
/// unscoped traffic metric; `publish_date` is only meaningful on this grain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub article_url: String,
    pub day: NaiveDate,
    pub visits: i64,
    pub pageviews: i64,
    pub total_time_seconds: i64,
    pub scrolls: i64,
    pub section: Option<String>,
    pub creator_email: Option<String>,
    pub publish_date: Option<NaiveDate>,
    pub title: Option<String>,
}

/// One (article URL, day) row of the sessions-oriented grain used whenever a
/// person filter is active, and for unique-user counts everywhere.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub article_url: String,
    pub day: NaiveDate,
    pub daily_users: i64,
    pub daily_sessions: i64,
    pub daily_pageviews: i64,
    pub sessions_with_scroll: i64,
    pub total_engagement_seconds: i64,
}
