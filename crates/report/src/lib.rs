pub mod cache;
pub mod service;

pub use cache::{CacheKey, ReportCache};
pub use service::{ReportError, ReportOverview, ReportService, ReportWarning};
