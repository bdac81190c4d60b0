//! Error types for the Azure DNS-01 provider
//!
//! [`AzureDnsError`] is what callers of the provider see. Every message carries
//! the `azure: ` prefix so that errors bubbling up through an ACME client can
//! be attributed to this provider. [`BackendError`] is the narrower error type
//! reported by [`DnsBackend`](crate::backend::DnsBackend) implementations.

use thiserror::Error;

/// Result type for provider operations
pub type AzureDnsResult<T> = Result<T, AzureDnsError>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors returned by the DNS-01 provider
#[derive(Debug, Error)]
pub enum AzureDnsError {
    /// The authoritative zone for the FQDN could not be discovered
    #[error("azure: failed to find zone for '{fqdn}': {message}")]
    ZoneDiscovery { fqdn: String, message: String },

    /// The backend refused or failed the zone lookup
    #[error("azure: failed to look up zone '{zone}': {source}")]
    ZoneLookup {
        zone: String,
        #[source]
        source: BackendError,
    },

    /// The zone is not a proper suffix of the challenge FQDN
    #[error("azure: {0}")]
    SubDomain(String),

    /// Reading the existing TXT record set failed
    #[error("azure: failed to read TXT record set '{record_name}' in zone '{zone}': {source}")]
    RecordRead {
        zone: String,
        record_name: String,
        #[source]
        source: BackendError,
    },

    /// Writing the merged TXT record set failed
    #[error("azure: failed to write TXT record set '{record_name}' in zone '{zone}': {source}")]
    RecordWrite {
        zone: String,
        record_name: String,
        #[source]
        source: BackendError,
    },

    /// Deleting the TXT record set failed
    #[error("azure: failed to delete TXT record set '{record_name}' in zone '{zone}': {source}")]
    RecordDelete {
        zone: String,
        record_name: String,
        #[source]
        source: BackendError,
    },

    /// A bearer token could not be obtained
    #[error("azure: authentication failed: {0}")]
    Authentication(String),

    /// Invalid configuration
    #[error("azure: invalid configuration: {0}")]
    Configuration(String),

    /// Credential loading failed
    #[error("azure: failed to load credentials: {0}")]
    Credentials(String),
}

impl AzureDnsError {
    /// Returns true for errors raised while resolving the zone
    pub fn is_zone_resolution(&self) -> bool {
        matches!(
            self,
            AzureDnsError::ZoneDiscovery { .. } | AzureDnsError::ZoneLookup { .. }
        )
    }
}

/// Errors reported by a [`DnsBackend`](crate::backend::DnsBackend)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The zone or record set does not exist
    #[error("resource not found: {0}")]
    NotFound(String),

    /// The request signer was rejected or could not produce a token
    #[error("authorization failed: {0}")]
    Authentication(String),

    /// The API answered with an unexpected status
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The request could not be sent
    #[error("request failed: {0}")]
    Request(String),

    /// The request timed out
    #[error("request timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },

    /// The response body could not be understood
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Returns true if the backend reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

impl From<AzureDnsError> for BackendError {
    fn from(e: AzureDnsError) -> Self {
        match e {
            AzureDnsError::Authentication(message) => BackendError::Authentication(message),
            other => BackendError::Request(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_has_provider_prefix() {
        let errors = vec![
            AzureDnsError::ZoneDiscovery {
                fqdn: "_acme-challenge.example.com.".to_string(),
                message: "no SOA".to_string(),
            },
            AzureDnsError::ZoneLookup {
                zone: "example.com".to_string(),
                source: BackendError::NotFound("zone example.com".to_string()),
            },
            AzureDnsError::SubDomain("no subdomain".to_string()),
            AzureDnsError::RecordRead {
                zone: "example.com".to_string(),
                record_name: "_acme-challenge".to_string(),
                source: BackendError::Timeout { elapsed_secs: 30 },
            },
            AzureDnsError::RecordWrite {
                zone: "example.com".to_string(),
                record_name: "_acme-challenge".to_string(),
                source: BackendError::Api {
                    status: 500,
                    message: "boom".to_string(),
                },
            },
            AzureDnsError::Authentication("bad secret".to_string()),
            AzureDnsError::Configuration("missing subscription".to_string()),
        ];

        for err in errors {
            assert!(err.to_string().starts_with("azure: "), "{}", err);
        }
    }

    #[test]
    fn test_error_display_includes_context() {
        let err = AzureDnsError::RecordDelete {
            zone: "example.com".to_string(),
            record_name: "_acme-challenge".to_string(),
            source: BackendError::Api {
                status: 409,
                message: "conflict".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("example.com"));
        assert!(msg.contains("_acme-challenge"));
        assert!(msg.contains("409"));
    }

    #[test]
    fn test_zone_resolution_classification() {
        assert!(AzureDnsError::ZoneDiscovery {
            fqdn: "a.example.com.".to_string(),
            message: "x".to_string(),
        }
        .is_zone_resolution());
        assert!(!AzureDnsError::SubDomain("x".to_string()).is_zone_resolution());
    }

    #[test]
    fn test_backend_not_found() {
        assert!(BackendError::NotFound("x".to_string()).is_not_found());
        assert!(!BackendError::Timeout { elapsed_secs: 1 }.is_not_found());
    }

    #[test]
    fn test_authentication_error_converts_to_backend() {
        let err: BackendError = AzureDnsError::Authentication("expired".to_string()).into();
        assert_eq!(err, BackendError::Authentication("expired".to_string()));
    }
}
