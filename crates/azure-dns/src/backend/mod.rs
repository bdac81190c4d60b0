//! Zone and record-set storage backends
//!
//! The provider talks to DNS storage exclusively through [`DnsBackend`]. Two
//! implementations are provided:
//!
//! - [`AzureDnsClient`] - Azure Resource Manager REST API (public and private zones)
//! - [`MemoryBackend`] - In-process store for tests and dry runs

mod azure;
mod memory;

pub use azure::AzureDnsClient;
pub use memory::{CallCounts, MemoryBackend};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::BackendResult;

/// Account scope for backend calls
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountContext {
    /// Azure subscription ID
    pub subscription_id: String,
    /// Resource group holding the DNS zones
    pub resource_group: String,
}

impl AccountContext {
    pub fn new(subscription_id: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
        }
    }
}

/// A managed DNS zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Backend identifier (ARM resource ID, or the override name)
    pub id: String,
    /// Zone name without a trailing dot
    pub name: String,
}

/// One TXT record; a record may hold several character strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecord {
    pub values: Vec<String>,
}

impl TxtRecord {
    /// A record holding a single string
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![value.into()],
        }
    }

    /// The first string of the record, if any
    pub fn first(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// All TXT records stored under one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecordSet {
    /// Name relative to the zone
    pub name: String,
    pub ttl: u32,
    pub records: Vec<TxtRecord>,
}

impl TxtRecordSet {
    /// An empty record set
    pub fn empty(name: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            ttl,
            records: Vec::new(),
        }
    }

    /// First strings of all records, in stored order
    pub fn first_values(&self) -> impl Iterator<Item = &str> {
        self.records.iter().filter_map(TxtRecord::first)
    }
}

/// Zone and TXT record-set storage
///
/// Implementations must be thread-safe. Absence of a zone or record set must be
/// reported as [`BackendError::NotFound`](crate::error::BackendError::NotFound)
/// so callers can tell it apart from failures.
#[async_trait]
pub trait DnsBackend: Send + Sync + Debug {
    /// Returns the backend name (e.g., "azure", "memory")
    fn name(&self) -> &'static str;

    /// Look up a zone by name
    async fn get_zone(&self, account: &AccountContext, zone_name: &str) -> BackendResult<Zone>;

    /// Read the TXT record set at `record_name` inside `zone_name`
    async fn get_record_set(
        &self,
        account: &AccountContext,
        zone_name: &str,
        record_name: &str,
    ) -> BackendResult<TxtRecordSet>;

    /// Create or replace the TXT record set at `record_name`
    async fn upsert_record_set(
        &self,
        account: &AccountContext,
        zone_name: &str,
        record_name: &str,
        record_set: &TxtRecordSet,
    ) -> BackendResult<()>;

    /// Delete the whole TXT record set at `record_name`
    async fn delete_record_set(
        &self,
        account: &AccountContext,
        zone_name: &str,
        record_name: &str,
    ) -> BackendResult<()>;
}
