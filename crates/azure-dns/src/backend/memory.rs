//! In-memory DNS backend
//!
//! Holds zones and TXT record sets in process memory. Counts every call and can
//! be told to fail specific operations, which makes it the backend of choice
//! for exercising the provider without Azure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use super::{AccountContext, DnsBackend, TxtRecordSet, Zone};
use crate::challenge::un_fqdn;
use crate::error::{BackendError, BackendResult};

/// Number of calls made per backend operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get_zone: u64,
    pub get_record_set: u64,
    pub upsert_record_set: u64,
    pub delete_record_set: u64,
}

/// In-memory zone and record-set store
///
/// A single account is assumed; the [`AccountContext`] argument is ignored.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    /// Registered zones, keyed by lowercase name without trailing dot
    zones: Mutex<HashMap<String, Zone>>,
    /// Record sets keyed by (zone key, lowercase record name)
    record_sets: Mutex<HashMap<(String, String), TxtRecordSet>>,
    get_zone_calls: AtomicU64,
    get_record_set_calls: AtomicU64,
    upsert_calls: AtomicU64,
    delete_calls: AtomicU64,
    read_failure: Option<BackendError>,
    write_failure: Option<BackendError>,
    delete_failure: Option<BackendError>,
}

fn zone_key(zone_name: &str) -> String {
    un_fqdn(zone_name).to_ascii_lowercase()
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone; the name is stored exactly as given
    pub fn with_zone(self, name: &str) -> Self {
        self.zones.lock().insert(
            zone_key(name),
            Zone {
                id: format!("/memory/dnszones/{}", un_fqdn(name)),
                name: name.to_string(),
            },
        );
        self
    }

    /// Fail every record-set read with `error`
    pub fn with_read_failure(mut self, error: BackendError) -> Self {
        self.read_failure = Some(error);
        self
    }

    /// Fail every record-set upsert with `error`
    pub fn with_write_failure(mut self, error: BackendError) -> Self {
        self.write_failure = Some(error);
        self
    }

    /// Fail every record-set delete with `error`
    pub fn with_delete_failure(mut self, error: BackendError) -> Self {
        self.delete_failure = Some(error);
        self
    }

    /// Store a record set directly, bypassing call counting
    pub fn insert_record_set(&self, zone_name: &str, record_set: TxtRecordSet) {
        let key = (zone_key(zone_name), record_set.name.to_ascii_lowercase());
        self.record_sets.lock().insert(key, record_set);
    }

    /// Current record set at `record_name`, if any
    pub fn record_set(&self, zone_name: &str, record_name: &str) -> Option<TxtRecordSet> {
        self.record_sets
            .lock()
            .get(&(zone_key(zone_name), record_name.to_ascii_lowercase()))
            .cloned()
    }

    /// Number of stored record sets across all zones
    pub fn record_set_count(&self) -> usize {
        self.record_sets.lock().len()
    }

    /// Snapshot of the call counters
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            get_zone: self.get_zone_calls.load(Ordering::SeqCst),
            get_record_set: self.get_record_set_calls.load(Ordering::SeqCst),
            upsert_record_set: self.upsert_calls.load(Ordering::SeqCst),
            delete_record_set: self.delete_calls.load(Ordering::SeqCst),
        }
    }

    fn require_zone(&self, zone_name: &str) -> BackendResult<String> {
        let key = zone_key(zone_name);
        if self.zones.lock().contains_key(&key) {
            Ok(key)
        } else {
            Err(BackendError::NotFound(format!("zone {}", zone_name)))
        }
    }
}

#[async_trait]
impl DnsBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_zone(&self, _account: &AccountContext, zone_name: &str) -> BackendResult<Zone> {
        self.get_zone_calls.fetch_add(1, Ordering::SeqCst);

        self.zones
            .lock()
            .get(&zone_key(zone_name))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("zone {}", zone_name)))
    }

    async fn get_record_set(
        &self,
        _account: &AccountContext,
        zone_name: &str,
        record_name: &str,
    ) -> BackendResult<TxtRecordSet> {
        self.get_record_set_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ref e) = self.read_failure {
            return Err(e.clone());
        }

        let zone = self.require_zone(zone_name)?;
        self.record_sets
            .lock()
            .get(&(zone, record_name.to_ascii_lowercase()))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("TXT record set {}", record_name)))
    }

    async fn upsert_record_set(
        &self,
        _account: &AccountContext,
        zone_name: &str,
        record_name: &str,
        record_set: &TxtRecordSet,
    ) -> BackendResult<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ref e) = self.write_failure {
            return Err(e.clone());
        }

        let zone = self.require_zone(zone_name)?;
        trace!(zone = %zone, record_name = %record_name, "Storing TXT record set in memory");

        let mut stored = record_set.clone();
        stored.name = record_name.to_string();
        self.record_sets
            .lock()
            .insert((zone, record_name.to_ascii_lowercase()), stored);
        Ok(())
    }

    async fn delete_record_set(
        &self,
        _account: &AccountContext,
        zone_name: &str,
        record_name: &str,
    ) -> BackendResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(ref e) = self.delete_failure {
            return Err(e.clone());
        }

        let zone = self.require_zone(zone_name)?;
        match self
            .record_sets
            .lock()
            .remove(&(zone, record_name.to_ascii_lowercase()))
        {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound(format!(
                "TXT record set {}",
                record_name
            ))),
        }
    }
}
