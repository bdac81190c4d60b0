//! DNS-01 provider for Azure DNS
//!
//! [`AzureDnsProvider`] implements the three operations an ACME client needs
//! from a DNS-01 solver: publish the challenge record, remove it, and report
//! how long to wait for propagation.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::auth::{credential_from_config, TokenCredential};
use crate::backend::{AzureDnsClient, DnsBackend, Zone};
use crate::challenge::{extract_sub_domain, ChallengeRecord};
use crate::config::AzureDnsConfig;
use crate::discovery::{SoaZoneFinder, ZoneFinder};
use crate::error::{AzureDnsError, AzureDnsResult};
use crate::reconciler::RecordReconciler;
use crate::zone::ZoneResolver;

/// Trait for providers that fulfill DNS-01 challenges
///
/// Implementations must be thread-safe and support concurrent operations.
#[async_trait]
pub trait Dns01Provider: Send + Sync + Debug {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &'static str;

    /// Publish the TXT record for a challenge
    ///
    /// # Arguments
    ///
    /// * `domain` - Domain being validated (e.g., "example.com" or "*.example.com")
    /// * `token` - Challenge token
    /// * `key_authorization` - Key authorization the record value is derived from
    async fn present(&self, domain: &str, token: &str, key_authorization: &str)
        -> AzureDnsResult<()>;

    /// Remove the TXT record for a challenge
    ///
    /// Should not error if the record doesn't exist.
    async fn clean_up(&self, domain: &str, token: &str, key_authorization: &str)
        -> AzureDnsResult<()>;

    /// Propagation timeout and polling interval for the caller's checker
    fn timeout(&self) -> (Duration, Duration);
}

/// Azure DNS provider
#[derive(Debug)]
pub struct AzureDnsProvider {
    resolver: ZoneResolver,
    reconciler: RecordReconciler,
    propagation_timeout: Duration,
    polling_interval: Duration,
}

impl AzureDnsProvider {
    /// Build a provider from configuration
    ///
    /// Selects the credential from the configuration, talks to Azure Resource
    /// Manager and discovers zones through SOA lookups.
    pub fn from_config(config: &AzureDnsConfig) -> AzureDnsResult<Self> {
        let credential = credential_from_config(config)?;
        Self::with_credential(config, credential)
    }

    /// Build a provider with an existing credential
    pub fn with_credential(
        config: &AzureDnsConfig,
        credential: Arc<dyn TokenCredential>,
    ) -> AzureDnsResult<Self> {
        debug!(
            credential = credential.name(),
            subscription = %config.subscription_id,
            resource_group = %config.resource_group,
            private_zone = config.private_zone,
            "Creating Azure DNS provider"
        );

        let backend = Arc::new(AzureDnsClient::from_config(config, credential)?);
        Ok(Self::with_backend(
            config,
            backend,
            Arc::new(SoaZoneFinder::new()),
        ))
    }

    /// Build a provider over arbitrary backend and zone finder
    pub fn with_backend(
        config: &AzureDnsConfig,
        backend: Arc<dyn DnsBackend>,
        finder: Arc<dyn ZoneFinder>,
    ) -> Self {
        let account = config.account();

        Self {
            resolver: ZoneResolver::new(
                backend.clone(),
                finder,
                account.clone(),
                config.zone_name.clone(),
            ),
            reconciler: RecordReconciler::new(backend, account, config.ttl),
            propagation_timeout: config.propagation_timeout(),
            polling_interval: config.polling_interval(),
        }
    }

    /// Check whether the zone for `domain` can be resolved
    ///
    /// Discovery failures and zones unknown to the backend yield `false`.
    pub async fn supports_domain(&self, domain: &str) -> AzureDnsResult<bool> {
        let record = ChallengeRecord::derive(domain, "");
        match self.resolver.resolve(&record.fqdn).await {
            Ok(_) => Ok(true),
            Err(AzureDnsError::ZoneDiscovery { .. }) => Ok(false),
            Err(AzureDnsError::ZoneLookup { source, .. }) if source.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Resolve the zone and relative record name for a challenge FQDN
    async fn locate(&self, fqdn: &str) -> AzureDnsResult<(Zone, String)> {
        let zone = self.resolver.resolve(fqdn).await?;
        let sub_domain = extract_sub_domain(fqdn, &zone.name)?;
        Ok((zone, sub_domain))
    }
}

#[async_trait]
impl Dns01Provider for AzureDnsProvider {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn present(
        &self,
        domain: &str,
        _token: &str,
        key_authorization: &str,
    ) -> AzureDnsResult<()> {
        let record = ChallengeRecord::derive(domain, key_authorization);
        let (zone, sub_domain) = self.locate(&record.fqdn).await?;

        info!(
            domain = %domain,
            zone = %zone.name,
            record_name = %sub_domain,
            "Presenting DNS-01 challenge record"
        );

        self.reconciler
            .upsert(&zone, &sub_domain, &record.value)
            .await
    }

    async fn clean_up(
        &self,
        domain: &str,
        _token: &str,
        key_authorization: &str,
    ) -> AzureDnsResult<()> {
        let record = ChallengeRecord::derive(domain, key_authorization);
        let (zone, sub_domain) = self.locate(&record.fqdn).await?;

        info!(
            domain = %domain,
            zone = %zone.name,
            record_name = %sub_domain,
            "Cleaning up DNS-01 challenge record"
        );

        self.reconciler.delete(&zone, &sub_domain).await
    }

    fn timeout(&self) -> (Duration, Duration) {
        (self.propagation_timeout, self.polling_interval)
    }
}
