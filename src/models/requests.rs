//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming request bodies and query strings.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::services::{ReportKind, RequestStatus};

/// Longest key accepted over HTTP
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for PUT /cache
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        if self.ttl == Some(0) {
            return Some("TTL must be at least 1 second".to_string());
        }
        None
    }
}

/// Query string for GET /metrics
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsParams {
    /// Trailing window in days (default: 7)
    #[serde(default)]
    pub days: Option<u32>,
}

/// Query string for GET /reports/:kind
#[derive(Debug, Clone, Deserialize)]
pub struct ReportParams {
    /// First day covered (YYYY-MM-DD)
    pub from: NaiveDate,
    /// Last day covered, inclusive (YYYY-MM-DD)
    pub to: NaiveDate,
}

/// Path segment for GET /reports/:kind
#[derive(Debug, Clone, Deserialize)]
pub struct ReportPath {
    pub kind: ReportKind,
}

/// Request body for POST /requests
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceRequest {
    pub id: String,
    pub client: String,
}

impl NewServiceRequest {
    /// Returns an error message if the id or client is unusable.
    pub fn validate(&self) -> Option<String> {
        validate_record(&self.id, &self.client)
    }
}

/// Request body for PATCH /requests/:id
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: RequestStatus,
}

/// Request body for POST /certificates
#[derive(Debug, Clone, Deserialize)]
pub struct NewCertificate {
    pub id: String,
    pub client: String,
    /// Certificate type, e.g. `tls`
    pub kind: String,
}

impl NewCertificate {
    pub fn validate(&self) -> Option<String> {
        if self.kind.trim().is_empty() {
            return Some("Certificate kind cannot be empty".to_string());
        }
        validate_record(&self.id, &self.client)
    }
}

fn validate_record(id: &str, client: &str) -> Option<String> {
    if id.is_empty() {
        return Some("Id cannot be empty".to_string());
    }
    if id.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Id exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    if client.trim().is_empty() {
        return Some("Client cannot be empty".to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_request_deserialize() {
        let json = r#"{"key": "test", "value": {"rows": [1, 2]}}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.key, "test");
        assert_eq!(req.value, json!({"rows": [1, 2]}));
        assert!(req.ttl.is_none());
    }

    #[test]
    fn test_set_request_with_ttl() {
        let json = r#"{"key": "test", "value": "hello", "ttl": 60}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.ttl, Some(60));
    }

    #[test]
    fn test_validate_rejects_bad_requests() {
        let base = SetRequest {
            key: "valid_key".to_string(),
            value: json!("test"),
            ttl: Some(60),
        };
        assert!(base.validate().is_none());

        let empty = SetRequest {
            key: String::new(),
            ..base.clone()
        };
        assert!(empty.validate().is_some());

        let long = SetRequest {
            key: "x".repeat(MAX_KEY_LENGTH + 1),
            ..base.clone()
        };
        assert!(long.validate().is_some());

        let zero_ttl = SetRequest {
            ttl: Some(0),
            ..base
        };
        assert!(zero_ttl.validate().is_some());
    }

    #[test]
    fn test_record_bodies_validate() {
        let ok: NewServiceRequest =
            serde_json::from_str(r#"{"id": "r1", "client": "acme"}"#).unwrap();
        assert!(ok.validate().is_none());

        let no_client = NewServiceRequest {
            client: "  ".to_string(),
            ..ok
        };
        assert!(no_client.validate().is_some());

        let cert = NewCertificate {
            id: "c1".to_string(),
            client: "acme".to_string(),
            kind: String::new(),
        };
        assert!(cert.validate().is_some());

        let update: StatusUpdate = serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert_eq!(update.status, RequestStatus::Completed);
    }

    #[test]
    fn test_report_params_parse_dates() {
        let params: ReportParams =
            serde_json::from_str(r#"{"from": "2024-01-01", "to": "2024-01-31"}"#).unwrap();
        assert_eq!(params.from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(params.to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }
}
