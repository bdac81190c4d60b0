//! Authoritative zone discovery
//!
//! Finds the zone that owns an FQDN by walking its labels from the most to the
//! least specific name and asking for an SOA record at each step.

use std::fmt::Debug;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::RecordType;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{ResolveError, Resolver, TokioResolver};
use tracing::{debug, trace};

use crate::challenge::{to_fqdn, un_fqdn};
use crate::error::{AzureDnsError, AzureDnsResult};

/// Maps an FQDN to the name of the zone that owns it
#[async_trait]
pub trait ZoneFinder: Send + Sync + Debug {
    /// Return the candidate zone name for `fqdn`
    async fn find_zone_by_fqdn(&self, fqdn: &str) -> AzureDnsResult<String>;
}

/// Always answers with the same zone
#[derive(Debug, Clone)]
pub struct StaticZoneFinder {
    zone: String,
}

impl StaticZoneFinder {
    pub fn new(zone: impl Into<String>) -> Self {
        Self { zone: zone.into() }
    }
}

#[async_trait]
impl ZoneFinder for StaticZoneFinder {
    async fn find_zone_by_fqdn(&self, _fqdn: &str) -> AzureDnsResult<String> {
        Ok(self.zone.clone())
    }
}

/// Zone discovery through SOA lookups
#[derive(Debug)]
pub struct SoaZoneFinder {
    resolver: TokioResolver,
}

impl SoaZoneFinder {
    /// Create a finder using the resolver's default upstreams
    pub fn new() -> Self {
        Self::with_nameservers(&[])
    }

    /// Create a finder querying the given nameservers over UDP
    pub fn with_nameservers(nameservers: &[IpAddr]) -> Self {
        let resolver_config = if nameservers.is_empty() {
            ResolverConfig::default()
        } else {
            let mut resolver_config = ResolverConfig::new();
            for ip in nameservers {
                resolver_config.add_name_server(NameServerConfig::new(
                    SocketAddr::new(*ip, 53),
                    Protocol::Udp,
                ));
            }
            resolver_config
        };

        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(5);
        opts.attempts = 2;

        let resolver =
            Resolver::builder_with_config(resolver_config, TokioConnectionProvider::default())
                .with_options(opts)
                .build();

        Self { resolver }
    }

    /// SOA owner at exactly `name`, if `name` is a zone apex
    async fn soa_owner(&self, name: &str) -> Result<Option<String>, ResolveError> {
        let lookup = match self.resolver.soa_lookup(name).await {
            Ok(lookup) => lookup,
            Err(e) if is_absent(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

        let owner = lookup
            .as_lookup()
            .records()
            .iter()
            .filter(|r| r.record_type() == RecordType::SOA)
            .map(|r| r.name().to_utf8())
            .find(|owner| un_fqdn(owner).eq_ignore_ascii_case(un_fqdn(name)));

        Ok(owner)
    }
}

impl Default for SoaZoneFinder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneFinder for SoaZoneFinder {
    async fn find_zone_by_fqdn(&self, fqdn: &str) -> AzureDnsResult<String> {
        for candidate in zone_candidates(fqdn) {
            trace!(candidate = %candidate, "Querying SOA");

            match self.soa_owner(&candidate).await {
                Ok(Some(zone)) => {
                    debug!(fqdn = %fqdn, zone = %zone, "Found authoritative zone");
                    return Ok(to_fqdn(&zone));
                }
                Ok(None) => continue,
                Err(e) => {
                    return Err(AzureDnsError::ZoneDiscovery {
                        fqdn: fqdn.to_string(),
                        message: format!("SOA lookup for '{}' failed: {}", candidate, e),
                    })
                }
            }
        }

        Err(AzureDnsError::ZoneDiscovery {
            fqdn: fqdn.to_string(),
            message: "no SOA record found for any parent name".to_string(),
        })
    }
}

/// NXDOMAIN and empty answers mean "try the parent"
fn is_absent(e: &ResolveError) -> bool {
    let err_str = e.to_string().to_lowercase();
    err_str.contains("no records found")
        || err_str.contains("nxdomain")
        || err_str.contains("record not found")
}

/// Names to query for an SOA, most specific first, root excluded
pub fn zone_candidates(fqdn: &str) -> Vec<String> {
    let absolute = to_fqdn(fqdn);
    let labels: Vec<&str> = un_fqdn(&absolute)
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();

    (0..labels.len())
        .map(|i| format!("{}.", labels[i..].join(".")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_candidates() {
        assert_eq!(
            zone_candidates("_acme-challenge.a.example.com."),
            vec![
                "_acme-challenge.a.example.com.",
                "a.example.com.",
                "example.com.",
                "com.",
            ]
        );
        assert_eq!(zone_candidates("example.com"), vec!["example.com.", "com."]);
        assert!(zone_candidates(".").is_empty());
        assert!(zone_candidates("").is_empty());
    }

    #[tokio::test]
    async fn test_static_finder() {
        let finder = StaticZoneFinder::new("example.com.");
        assert_eq!(
            finder
                .find_zone_by_fqdn("_acme-challenge.www.example.com.")
                .await
                .unwrap(),
            "example.com."
        );
    }

    #[tokio::test]
    async fn test_soa_finder_creation() {
        let finder = SoaZoneFinder::with_nameservers(&["8.8.8.8".parse().unwrap()]);
        assert!(format!("{:?}", finder).contains("SoaZoneFinder"));
    }
}
