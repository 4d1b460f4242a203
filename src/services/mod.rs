//! Services Module
//!
//! In-process consumers of the cache: record lists and dashboard metrics.

pub mod metrics;
pub mod records;

pub use metrics::{DashboardMetrics, MetricsQuery, MetricsService, ReportKind, ReportRow};
pub use records::{Certificate, Record, RecordList, RequestStatus, ServiceRequest};
