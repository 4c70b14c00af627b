pub mod aggregate;
pub mod export;
pub mod finding;
pub mod metrics;

pub use aggregate::ReportAggregate;
pub use finding::{normalize, normalize_all, Category, NormalizedFinding, Severity};
pub use metrics::ScanMetrics;
