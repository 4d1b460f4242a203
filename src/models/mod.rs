//! Request and Response models for the HTTP API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    MetricsParams, NewCertificate, NewServiceRequest, ReportParams, ReportPath, SetRequest,
    StatusUpdate, MAX_KEY_LENGTH,
};
pub use responses::{
    DeleteResponse, ErrorResponse, GetResponse, HealthResponse, RefreshResponse, SetResponse,
    StatsResponse,
};
