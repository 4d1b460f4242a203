//! Metrics Service
//!
//! Dashboard aggregates over the record lists. The dashboard summary is
//! memoized for an hour; reports are cached through the manager under
//! `report_<kind>_<from>_<to>` keys.

use std::collections::BTreeMap;
use std::fmt;
use std::future::{ready, Ready};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::records::{Certificate, Record, RecordList, RequestStatus, ServiceRequest};
use crate::cache::{memoize, CacheManager, MemoizeConfig, Memoized};
use crate::error::{CacheError, Result};

/// How long a dashboard summary is reused.
pub const DASHBOARD_TTL_SECS: u64 = 3600;

// == Dashboard Metrics ==
/// Arguments of a dashboard summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsQuery {
    /// Trailing window, in days, for the daily breakdown
    pub days: u32,
}

/// Summary shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub total_requests: usize,
    pub pending_requests: usize,
    pub total_certificates: usize,
    /// Percentage of requests completed, 100.0 when there are none
    pub success_rate: f64,
    /// Requests created per day (YYYY-MM-DD) inside the window
    pub daily_requests: BTreeMap<String, u64>,
    /// Certificates issued per day (YYYY-MM-DD) inside the window
    pub daily_certificates: BTreeMap<String, u64>,
    pub generated_at: DateTime<Utc>,
}

// == Reports ==
/// Which records a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Requests,
    Certificates,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Requests => f.write_str("requests"),
            ReportKind::Certificates => f.write_str("certificates"),
        }
    }
}

/// One line of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: String,
    pub client: String,
    /// Request status, or certificate kind
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

type DashboardFn = Box<dyn Fn(MetricsQuery) -> Ready<DashboardMetrics> + Send + Sync>;

// == Metrics Service ==
/// Dashboard summaries and reports over the request and certificate lists.
pub struct MetricsService {
    cache: Arc<CacheManager>,
    requests: Arc<RecordList<ServiceRequest>>,
    certificates: Arc<RecordList<Certificate>>,
    dashboard: Memoized<DashboardFn>,
}

impl fmt::Debug for MetricsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsService")
            .field("requests", &self.requests.len())
            .field("certificates", &self.certificates.len())
            .finish()
    }
}

impl MetricsService {
    /// Builds the service and memoizes its dashboard through `cache`.
    pub fn new(
        cache: Arc<CacheManager>,
        requests: Arc<RecordList<ServiceRequest>>,
        certificates: Arc<RecordList<Certificate>>,
    ) -> Self {
        let compute: DashboardFn = {
            let requests = requests.clone();
            let certificates = certificates.clone();
            Box::new(move |query: MetricsQuery| {
                ready(compute_dashboard(&requests, &certificates, query, Utc::now()))
            })
        };

        let dashboard = memoize(
            &cache,
            "services::metrics::dashboard",
            MemoizeConfig::from_secs(DASHBOARD_TTL_SECS),
            compute,
        );

        Self {
            cache,
            requests,
            certificates,
            dashboard,
        }
    }

    /// Dashboard summary for a trailing window of `days`, reused for an hour.
    pub async fn dashboard(&self, days: u32) -> DashboardMetrics {
        self.dashboard.call(MetricsQuery { days }).await
    }

    /// Drops the remembered summary for `days`.
    pub async fn refresh_dashboard(&self, days: u32) -> bool {
        self.dashboard.invalidate(&MetricsQuery { days }).await
    }

    // == Report ==
    /// Records of `kind` created on days `from..=to`.
    ///
    /// Served from cache when a report for the same range is still fresh.
    pub async fn report(
        &self,
        kind: ReportKind,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ReportRow>> {
        if from > to {
            return Err(CacheError::InvalidRequest(format!(
                "Report range starts after it ends: {} > {}",
                from, to
            )));
        }

        let key = report_key(kind, from, to);
        if let Some(rows) = self.cache.get_as::<Vec<ReportRow>>(&key).await {
            debug!("Serving cached report {}", key);
            return Ok(rows);
        }

        let start = day_start(from);
        let end = day_start(to.succ_opt().unwrap_or(to));
        let rows = match kind {
            ReportKind::Requests => self
                .requests
                .created_between(start, end)
                .into_iter()
                .map(|r| ReportRow {
                    detail: status_label(r.status).to_string(),
                    id: r.id,
                    client: r.client,
                    created_at: r.created_at,
                })
                .collect::<Vec<_>>(),
            ReportKind::Certificates => self
                .certificates
                .created_between(start, end)
                .into_iter()
                .map(|c| ReportRow {
                    id: c.id,
                    client: c.client,
                    detail: c.kind,
                    created_at: c.created_at,
                })
                .collect(),
        };

        self.cache
            .set_as(&key, &rows, self.cache.default_ttl())
            .await;
        Ok(rows)
    }
}

/// Cache key for a report over `from..=to`.
pub fn report_key(kind: ReportKind, from: NaiveDate, to: NaiveDate) -> String {
    format!("report_{}_{}_{}", kind, from, to)
}

fn compute_dashboard(
    requests: &RecordList<ServiceRequest>,
    certificates: &RecordList<Certificate>,
    query: MetricsQuery,
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let all_requests = requests.all();
    let pending = all_requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .count();
    let completed = all_requests
        .iter()
        .filter(|r| r.status == RequestStatus::Completed)
        .count();

    let success_rate = if all_requests.is_empty() {
        100.0
    } else {
        (completed as f64 / all_requests.len() as f64 * 10_000.0).round() / 100.0
    };

    // Windows reaching past the earliest representable instant cover everything.
    let window_start = now
        .checked_sub_signed(chrono::Duration::days(i64::from(query.days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let window_end = now + chrono::Duration::seconds(1);

    DashboardMetrics {
        total_requests: all_requests.len(),
        pending_requests: pending,
        total_certificates: certificates.len(),
        success_rate,
        daily_requests: per_day(&requests.created_between(window_start, window_end)),
        daily_certificates: per_day(&certificates.created_between(window_start, window_end)),
        generated_at: now,
    }
}

fn per_day<T: Record>(records: &[T]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for record in records {
        let day = record.created_at().date_naive().to_string();
        *counts.entry(day).or_insert(0) += 1;
    }
    counts
}

fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_opt(0, 0, 0)
        .map(|t| t.and_utc())
        .unwrap_or_default()
}

fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "pending",
        RequestStatus::Completed => "completed",
        RequestStatus::Rejected => "rejected",
    }
}
