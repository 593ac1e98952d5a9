//! Materialized inputs shared by every builder.
//!
//! The report layer fetches these once per operation; builders only apply
//! typed set operations on top. Ownership resolution is already done when a
//! builder runs, so scoped and unscoped paths read the same attribution.

use crate::attribution::AttributionMap;
use crate::domain::{AuthorIndex, DateWindow, EditorialEvent, SessionRecord, TrafficRecord};
use crate::filters::ReportFilters;
use crate::scope::UserScope;

pub struct ReportInputs<'a> {
    pub window: &'a DateWindow,
    pub window_events: &'a [EditorialEvent],
    pub attribution: &'a AttributionMap,
    /// Present when a person filter is active; switches builders to the
    /// scoped path.
    pub scope: Option<&'a UserScope>,
    pub daily: &'a [TrafficRecord],
    pub sessions: &'a [SessionRecord],
    pub authors: &'a AuthorIndex,
    pub filters: &'a ReportFilters,
}
