//! Data models shared with collaborators of the cache.

mod report;

pub use report::StatsReport;
