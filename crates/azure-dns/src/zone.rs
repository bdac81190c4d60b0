//! Zone resolution
//!
//! Decides which managed zone receives a challenge record. An operator
//! override is trusted as-is; otherwise the authoritative zone is discovered
//! and confirmed against the backend.

use std::sync::Arc;

use tracing::debug;

use crate::backend::{AccountContext, DnsBackend, Zone};
use crate::challenge::un_fqdn;
use crate::discovery::ZoneFinder;
use crate::error::{AzureDnsError, AzureDnsResult};

/// Resolves the managed zone for an FQDN
#[derive(Debug)]
pub struct ZoneResolver {
    backend: Arc<dyn DnsBackend>,
    finder: Arc<dyn ZoneFinder>,
    account: AccountContext,
    zone_override: Option<String>,
}

impl ZoneResolver {
    pub fn new(
        backend: Arc<dyn DnsBackend>,
        finder: Arc<dyn ZoneFinder>,
        account: AccountContext,
        zone_override: Option<String>,
    ) -> Self {
        Self {
            backend,
            finder,
            account,
            zone_override,
        }
    }

    /// Resolve the zone for `fqdn`
    ///
    /// With an override configured no discovery or backend call is made. Every
    /// failure, including a zone the backend does not know, is returned as is.
    pub async fn resolve(&self, fqdn: &str) -> AzureDnsResult<Zone> {
        if let Some(ref zone) = self.zone_override {
            let name = un_fqdn(zone);
            if name.is_empty() {
                return Err(AzureDnsError::Configuration(format!(
                    "zone name override '{}' is not a zone",
                    zone
                )));
            }

            debug!(fqdn = %fqdn, zone = %zone, "Using configured zone override");
            return Ok(Zone {
                id: zone.clone(),
                name: name.to_string(),
            });
        }

        let candidate = self.finder.find_zone_by_fqdn(fqdn).await?;
        let candidate = un_fqdn(&candidate);

        let zone = self
            .backend
            .get_zone(&self.account, candidate)
            .await
            .map_err(|source| AzureDnsError::ZoneLookup {
                zone: candidate.to_string(),
                source,
            })?;

        let name = un_fqdn(&zone.name).to_string();
        debug!(fqdn = %fqdn, zone = %name, backend = self.backend.name(), "Resolved zone");

        Ok(Zone { id: zone.id, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::discovery::StaticZoneFinder;
    use crate::error::BackendError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Finder that counts calls and fails if told to
    #[derive(Debug)]
    struct CountingFinder {
        zone: Option<String>,
        calls: AtomicU64,
    }

    impl CountingFinder {
        fn new(zone: Option<&str>) -> Self {
            Self {
                zone: zone.map(str::to_string),
                calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl ZoneFinder for CountingFinder {
        async fn find_zone_by_fqdn(&self, fqdn: &str) -> AzureDnsResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.zone.clone().ok_or_else(|| AzureDnsError::ZoneDiscovery {
                fqdn: fqdn.to_string(),
                message: "NXDOMAIN".to_string(),
            })
        }
    }

    fn account() -> AccountContext {
        AccountContext::new("sub", "rg")
    }

    #[tokio::test]
    async fn test_resolve_discovered_zone() {
        let backend = Arc::new(MemoryBackend::new().with_zone("example.com"));
        let resolver = ZoneResolver::new(
            backend.clone(),
            Arc::new(StaticZoneFinder::new("example.com.")),
            account(),
            None,
        );

        let zone = resolver.resolve("_acme-challenge.example.com.").await.unwrap();
        assert_eq!(zone.name, "example.com");
        assert_eq!(backend.calls().get_zone, 1);
    }

    #[tokio::test]
    async fn test_resolve_strips_trailing_dot_from_backend_name() {
        let backend = Arc::new(MemoryBackend::new().with_zone("example.com."));
        let resolver = ZoneResolver::new(
            backend,
            Arc::new(StaticZoneFinder::new("example.com.")),
            account(),
            None,
        );

        let zone = resolver.resolve("_acme-challenge.example.com.").await.unwrap();
        assert_eq!(zone.name, "example.com");
    }

    #[tokio::test]
    async fn test_override_skips_discovery_and_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let finder = Arc::new(CountingFinder::new(Some("example.com.")));
        let resolver = ZoneResolver::new(
            backend.clone(),
            finder.clone(),
            account(),
            Some("custom.zone.".to_string()),
        );

        let zone = resolver.resolve("_acme-challenge.example.com.").await.unwrap();
        assert_eq!(zone.id, "custom.zone.");
        assert_eq!(zone.name, "custom.zone");
        assert_eq!(finder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(backend.calls().get_zone, 0);
    }

    #[tokio::test]
    async fn test_root_override_rejected() {
        let backend = Arc::new(MemoryBackend::new());
        let resolver = ZoneResolver::new(
            backend.clone(),
            Arc::new(CountingFinder::new(Some("example.com."))),
            account(),
            Some(".".to_string()),
        );

        let err = resolver.resolve("_acme-challenge.example.com.").await.unwrap_err();
        assert!(matches!(err, AzureDnsError::Configuration(_)));
        assert_eq!(backend.calls().get_zone, 0);
    }

    #[tokio::test]
    async fn test_discovery_failure_propagates() {
        let backend = Arc::new(MemoryBackend::new().with_zone("example.com"));
        let resolver = ZoneResolver::new(
            backend.clone(),
            Arc::new(CountingFinder::new(None)),
            account(),
            None,
        );

        let err = resolver.resolve("_acme-challenge.example.com.").await.unwrap_err();
        assert!(matches!(err, AzureDnsError::ZoneDiscovery { .. }));
        assert_eq!(backend.calls().get_zone, 0);
    }

    #[tokio::test]
    async fn test_unknown_zone_is_not_created() {
        let backend = Arc::new(MemoryBackend::new());
        let resolver = ZoneResolver::new(
            backend.clone(),
            Arc::new(StaticZoneFinder::new("example.com.")),
            account(),
            None,
        );

        let err = resolver.resolve("_acme-challenge.example.com.").await.unwrap_err();
        match err {
            AzureDnsError::ZoneLookup { zone, source } => {
                assert_eq!(zone, "example.com");
                assert!(matches!(source, BackendError::NotFound(_)));
            }
            other => panic!("Expected ZoneLookup, got {:?}", other),
        }
        assert_eq!(backend.calls().upsert_record_set, 0);
    }
}
