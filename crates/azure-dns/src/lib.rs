//! Zentinel Azure DNS
//!
//! DNS-01 challenge provider backed by Azure DNS. Publishes and removes the
//! `_acme-challenge` TXT records an ACME server checks when validating domain
//! ownership.
//!
//! - **Zone resolution**: SOA-based discovery or an operator override
//! - **Record reconciliation**: Merge-on-present, delete-on-clean-up
//! - **Backends**: Azure Resource Manager (public and private zones), in-memory
//! - **Credentials**: Service principal secrets, managed identity
//!
//! # Example
//!
//! ```ignore
//! use zentinel_azure_dns::{AzureDnsConfig, AzureDnsProvider, Dns01Provider};
//!
//! let config = AzureDnsConfig::from_env()?;
//! let provider = AzureDnsProvider::from_config(&config)?;
//!
//! provider.present("example.com", token, key_authorization).await?;
//! // ... ACME validation ...
//! provider.clean_up("example.com", token, key_authorization).await?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod auth;
pub mod backend;
pub mod challenge;
pub mod config;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod provider;
pub mod reconciler;
pub mod zone;

// ============================================================================
// Public API Re-exports
// ============================================================================

pub use auth::{
    credential_from_config, ClientSecretCredential, ManagedIdentityCredential,
    StaticTokenCredential, TokenCredential,
};
pub use backend::{
    AccountContext, AzureDnsClient, CallCounts, DnsBackend, MemoryBackend, TxtRecord, TxtRecordSet,
    Zone,
};
pub use challenge::{compute_challenge_value, extract_sub_domain, ChallengeRecord};
pub use config::{AzureCloud, AzureDnsConfig, CredentialsConfig};
pub use discovery::{SoaZoneFinder, StaticZoneFinder, ZoneFinder};
pub use error::{AzureDnsError, AzureDnsResult, BackendError, BackendResult};
pub use provider::{AzureDnsProvider, Dns01Provider};
pub use reconciler::RecordReconciler;
pub use zone::ZoneResolver;
