//! TXT record-set reconciliation
//!
//! Present merges the challenge value into whatever TXT values already exist
//! under the record name; clean-up removes the record set.
//!
//! # Concurrency
//!
//! The merge is a read followed by an unconditional create-or-replace. Two
//! callers presenting on the same name at the same time can each read the old
//! set and the later write wins, dropping the other's value. Clean-up deletes
//! the whole set, including values other pending challenges still rely on.
//! Neither operation takes a lock.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::{AccountContext, DnsBackend, TxtRecord, TxtRecordSet, Zone};
use crate::error::{AzureDnsError, AzureDnsResult};

/// Applies present/clean-up transitions to TXT record sets
#[derive(Debug)]
pub struct RecordReconciler {
    backend: Arc<dyn DnsBackend>,
    account: AccountContext,
    ttl: u32,
}

impl RecordReconciler {
    pub fn new(backend: Arc<dyn DnsBackend>, account: AccountContext, ttl: u32) -> Self {
        Self {
            backend,
            account,
            ttl,
        }
    }

    /// Add `value` to the TXT record set at `sub_domain`
    ///
    /// A missing record set counts as empty. Only the first string of each
    /// existing multi-string record is carried over.
    pub async fn upsert(&self, zone: &Zone, sub_domain: &str, value: &str) -> AzureDnsResult<()> {
        let existing = match self
            .backend
            .get_record_set(&self.account, &zone.name, sub_domain)
            .await
        {
            Ok(set) => Some(set),
            Err(e) if e.is_not_found() => {
                debug!(zone = %zone.name, record_name = %sub_domain, "No existing TXT record set");
                None
            }
            Err(source) => {
                return Err(AzureDnsError::RecordRead {
                    zone: zone.name.clone(),
                    record_name: sub_domain.to_string(),
                    source,
                })
            }
        };

        let mut values = BTreeSet::new();
        values.insert(value.to_string());
        if let Some(ref set) = existing {
            values.extend(set.first_values().map(str::to_string));
        }

        let record_set = TxtRecordSet {
            name: sub_domain.to_string(),
            ttl: self.ttl,
            records: values.into_iter().map(TxtRecord::single).collect(),
        };

        self.backend
            .upsert_record_set(&self.account, &zone.name, sub_domain, &record_set)
            .await
            .map_err(|source| AzureDnsError::RecordWrite {
                zone: zone.name.clone(),
                record_name: sub_domain.to_string(),
                source,
            })?;

        info!(
            zone = %zone.name,
            record_name = %sub_domain,
            values = record_set.records.len(),
            "TXT record set updated"
        );
        Ok(())
    }

    /// Delete the whole TXT record set at `sub_domain`
    ///
    /// Succeeds if the record set is already gone.
    pub async fn delete(&self, zone: &Zone, sub_domain: &str) -> AzureDnsResult<()> {
        match self
            .backend
            .delete_record_set(&self.account, &zone.name, sub_domain)
            .await
        {
            Ok(()) => {
                info!(zone = %zone.name, record_name = %sub_domain, "TXT record set deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(zone = %zone.name, record_name = %sub_domain, "TXT record set already deleted");
                Ok(())
            }
            Err(source) => Err(AzureDnsError::RecordDelete {
                zone: zone.name.clone(),
                record_name: sub_domain.to_string(),
                source,
            }),
        }
    }
}
