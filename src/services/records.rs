//! Record Lists
//!
//! In-memory, insertion-ordered lists of service requests and issued
//! certificates. Ids are unique; lookups are linear scans.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CacheError, Result};

// == Record Trait ==
/// Common shape of anything kept in a [`RecordList`].
pub trait Record: Clone + Send + Sync {
    /// Unique identifier
    fn id(&self) -> &str;
    /// Creation time
    fn created_at(&self) -> DateTime<Utc>;
}

// == Service Request ==
/// Lifecycle of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Completed,
    Rejected,
}

/// A certificate request submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,
    pub client: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl ServiceRequest {
    /// A pending request created now.
    pub fn new(id: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client: client.into(),
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

impl Record for ServiceRequest {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// == Certificate ==
/// An issued certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub client: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl Certificate {
    /// A certificate issued now.
    pub fn new(id: impl Into<String>, client: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client: client.into(),
            kind: kind.into(),
            created_at: Utc::now(),
        }
    }
}

impl Record for Certificate {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// == Record List ==
/// Thread-safe ordered list of records with unique ids.
#[derive(Debug)]
pub struct RecordList<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Record> Default for RecordList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Appends a record. Fails if its id is already taken.
    pub fn add(&self, record: T) -> Result<()> {
        let mut items = self.items.write();
        if items.iter().any(|r| r.id() == record.id()) {
            return Err(CacheError::InvalidRequest(format!(
                "Record '{}' already exists",
                record.id()
            )));
        }
        info!("Record added: {}", record.id());
        items.push(record);
        Ok(())
    }

    /// Clone of the record with `id`, if any.
    pub fn get(&self, id: &str) -> Option<T> {
        self.items.read().iter().find(|r| r.id() == id).cloned()
    }

    /// Applies `update` to the record with `id`. Returns whether it was found.
    pub fn update(&self, id: &str, update: impl FnOnce(&mut T)) -> bool {
        let mut items = self.items.write();
        match items.iter_mut().find(|r| r.id() == id) {
            Some(record) => {
                update(record);
                info!("Record updated: {}", id);
                true
            }
            None => false,
        }
    }

    /// Removes the record with `id`. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        let mut items = self.items.write();
        let before = items.len();
        items.retain(|r| r.id() != id);
        let removed = items.len() < before;
        if removed {
            info!("Record removed: {}", id);
        }
        removed
    }

    /// All records, newest first.
    pub fn all(&self) -> Vec<T> {
        let mut records = self.items.read().clone();
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        records
    }

    /// Records created in `[from, to)`, newest first.
    pub fn created_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<T> {
        let mut records: Vec<T> = self
            .items
            .read()
            .iter()
            .filter(|r| r.created_at() >= from && r.created_at() < to)
            .cloned()
            .collect();
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        records
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}
