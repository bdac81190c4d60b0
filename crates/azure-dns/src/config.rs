//! Provider configuration
//!
//! Configuration is loaded once, validated, and then shared read-only. Two
//! sources are supported:
//!
//! - Environment variables (`AZURE_SUBSCRIPTION_ID`, `AZURE_RESOURCE_GROUP`, ...),
//!   each of which may instead name a file through an `_FILE` suffix
//! - A KDL file with an `azure-dns` block
//!
//! # Example
//!
//! ```kdl
//! azure-dns {
//!     subscription-id "00000000-0000-0000-0000-000000000000"
//!     resource-group "dns-rg"
//!     zone-name "example.com"
//!     environment "public"
//!     ttl 60
//!     propagation-timeout-secs 120
//!     polling-interval-secs 2
//!
//!     credentials {
//!         tenant-id "11111111-1111-1111-1111-111111111111"
//!         client-id "22222222-2222-2222-2222-222222222222"
//!         client-secret-file "/etc/zentinel/secrets/azure-dns.json"
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::backend::AccountContext;
use crate::challenge::un_fqdn;
use crate::error::{AzureDnsError, AzureDnsResult};

/// Prefix shared by all environment variables
pub const ENV_NAMESPACE: &str = "AZURE_";

/// Default instance metadata service endpoint
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://169.254.169.254";

// ============================================================================
// Cloud environments
// ============================================================================

/// Azure cloud the subscription lives in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AzureCloud {
    #[default]
    Public,
    China,
    UsGovernment,
    German,
}

impl AzureCloud {
    /// Parse an environment name as used by `AZURE_ENVIRONMENT`
    pub fn from_name(name: &str) -> AzureDnsResult<Self> {
        match name {
            "public" => Ok(AzureCloud::Public),
            "china" => Ok(AzureCloud::China),
            "usgovernment" => Ok(AzureCloud::UsGovernment),
            "german" => Ok(AzureCloud::German),
            other => Err(AzureDnsError::Configuration(format!(
                "unknown environment {}",
                other
            ))),
        }
    }

    /// Azure AD authority host
    pub fn authority_host(&self) -> &'static str {
        match self {
            AzureCloud::Public => "https://login.microsoftonline.com/",
            AzureCloud::China => "https://login.chinacloudapi.cn/",
            AzureCloud::UsGovernment => "https://login.microsoftonline.us/",
            AzureCloud::German => "https://login.microsoftonline.de/",
        }
    }

    /// Azure Resource Manager endpoint
    pub fn resource_manager_endpoint(&self) -> &'static str {
        match self {
            AzureCloud::Public => "https://management.azure.com",
            AzureCloud::China => "https://management.chinacloudapi.cn",
            AzureCloud::UsGovernment => "https://management.usgovcloudapi.net",
            AzureCloud::German => "https://management.microsoftazure.de",
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Azure DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AzureDnsConfig {
    /// Subscription owning the DNS zones
    #[validate(length(min = 1, message = "subscription ID is missing"))]
    pub subscription_id: String,

    /// Resource group holding the DNS zones
    #[validate(length(min = 1, message = "resource group is missing"))]
    pub resource_group: String,

    /// Zone to use for every domain, skipping discovery and verification
    #[serde(default)]
    #[validate(length(min = 1, message = "zone name override must not be empty"))]
    pub zone_name: Option<String>,

    /// Use Azure Private DNS zones instead of public zones
    #[serde(default)]
    pub private_zone: bool,

    /// Cloud environment
    #[serde(default)]
    pub environment: AzureCloud,

    /// TTL written on challenge record sets
    #[serde(default = "default_ttl")]
    #[validate(range(min = 1, message = "TTL must be at least 1 second"))]
    pub ttl: u32,

    /// Maximum time the caller should wait for propagation
    #[serde(default = "default_propagation_timeout")]
    pub propagation_timeout_secs: u64,

    /// Interval between the caller's propagation checks
    #[serde(default = "default_polling_interval")]
    #[validate(range(min = 1, message = "polling interval must be at least 1 second"))]
    pub polling_interval_secs: u64,

    /// Timeout for each Azure API request
    #[serde(default = "default_api_timeout")]
    #[validate(range(min = 1, message = "API timeout must be at least 1 second"))]
    pub api_timeout_secs: u64,

    /// Service principal or managed identity settings
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Credential settings
///
/// A complete service principal (tenant, client ID and a secret) selects the
/// client-secret flow. A client secret file may carry the tenant and client IDs
/// itself. Otherwise the instance metadata service is used, with `client_id`
/// picking a user-assigned identity if set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            client_secret: None,
            client_secret_file: None,
            metadata_endpoint: default_metadata_endpoint(),
        }
    }
}

impl CredentialsConfig {
    /// True if a client secret is supplied inline or by file
    pub fn has_secret(&self) -> bool {
        self.client_secret.is_some() || self.client_secret_file.is_some()
    }

    /// True if the client-secret flow is selected
    ///
    /// With a secret file, missing IDs are looked up in the file when the
    /// credential is built.
    pub fn is_service_principal(&self) -> bool {
        self.client_secret_file.is_some()
            || (self.tenant_id.is_some() && self.client_id.is_some() && self.has_secret())
    }
}

pub(crate) fn default_ttl() -> u32 {
    60
}

pub(crate) fn default_propagation_timeout() -> u64 {
    120
}

pub(crate) fn default_polling_interval() -> u64 {
    2
}

pub(crate) fn default_api_timeout() -> u64 {
    30
}

pub(crate) fn default_metadata_endpoint() -> String {
    DEFAULT_METADATA_ENDPOINT.to_string()
}

impl AzureDnsConfig {
    /// Minimal configuration with defaults for everything optional
    pub fn new(subscription_id: impl Into<String>, resource_group: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            zone_name: None,
            private_zone: false,
            environment: AzureCloud::default(),
            ttl: default_ttl(),
            propagation_timeout_secs: default_propagation_timeout(),
            polling_interval_secs: default_polling_interval(),
            api_timeout_secs: default_api_timeout(),
            credentials: CredentialsConfig::default(),
        }
    }

    /// Account scope for backend calls
    pub fn account(&self) -> AccountContext {
        AccountContext::new(&self.subscription_id, &self.resource_group)
    }

    pub fn propagation_timeout(&self) -> Duration {
        Duration::from_secs(self.propagation_timeout_secs)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// Run field validation and cross-field checks
    pub fn validated(self) -> AzureDnsResult<Self> {
        self.validate()
            .map_err(|e| AzureDnsError::Configuration(e.to_string()))?;

        if let Some(ref zone) = self.zone_name {
            if un_fqdn(zone).is_empty() {
                return Err(AzureDnsError::Configuration(format!(
                    "zone name override '{}' is not a zone",
                    zone
                )));
            }
        }

        let creds = &self.credentials;
        let partial = creds.tenant_id.is_some() || creds.has_secret();
        if partial && !creds.is_service_principal() {
            return Err(AzureDnsError::Configuration(
                "service principal requires tenant ID, client ID and client secret".to_string(),
            ));
        }

        if creds.client_secret.is_some() && creds.client_secret_file.is_some() {
            return Err(AzureDnsError::Configuration(
                "specify either a client secret or a client secret file, not both".to_string(),
            ));
        }

        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Environment
    // ------------------------------------------------------------------------

    /// Load configuration from the process environment
    pub fn from_env() -> AzureDnsResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> AzureDnsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let mut config = Self::new(
            env.string("SUBSCRIPTION_ID")?.unwrap_or_default(),
            env.string("RESOURCE_GROUP")?.unwrap_or_default(),
        );

        config.zone_name = env.string("ZONE_NAME")?;
        if let Some(private) = env.string("PRIVATE_ZONE")? {
            config.private_zone = parse_bool(&private).ok_or_else(|| {
                AzureDnsError::Configuration(format!(
                    "{}PRIVATE_ZONE must be a boolean, got '{}'",
                    ENV_NAMESPACE, private
                ))
            })?;
        }
        if let Some(name) = env.string("ENVIRONMENT")? {
            config.environment = AzureCloud::from_name(&name)?;
        }
        if let Some(ttl) = env.parsed("TTL")? {
            config.ttl = ttl;
        }
        if let Some(secs) = env.parsed("PROPAGATION_TIMEOUT")? {
            config.propagation_timeout_secs = secs;
        }
        if let Some(secs) = env.parsed("POLLING_INTERVAL")? {
            config.polling_interval_secs = secs;
        }
        if let Some(secs) = env.parsed("API_TIMEOUT")? {
            config.api_timeout_secs = secs;
        }

        config.credentials.tenant_id = env.string("TENANT_ID")?;
        config.credentials.client_id = env.string("CLIENT_ID")?;
        config.credentials.client_secret = env.string("CLIENT_SECRET")?;
        if let Some(endpoint) = env.string("METADATA_ENDPOINT")? {
            config.credentials.metadata_endpoint = endpoint;
        }

        config.validated()
    }

    // ------------------------------------------------------------------------
    // KDL
    // ------------------------------------------------------------------------

    /// Load configuration from a KDL file
    pub fn from_file(path: &Path) -> AzureDnsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AzureDnsError::Configuration(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_kdl(&content)
    }

    /// Parse configuration from KDL text
    pub fn from_kdl(content: &str) -> AzureDnsResult<Self> {
        let doc: kdl::KdlDocument = content
            .parse()
            .map_err(|e| AzureDnsError::Configuration(format!("invalid KDL: {}", e)))?;

        let node = doc.get("azure-dns").ok_or_else(|| {
            AzureDnsError::Configuration(
                "missing 'azure-dns' block, e.g., azure-dns { subscription-id \"...\" }"
                    .to_string(),
            )
        })?;

        let mut config = Self::new(
            get_string_entry(node, "subscription-id").unwrap_or_default(),
            get_string_entry(node, "resource-group").unwrap_or_default(),
        );

        config.zone_name = get_string_entry(node, "zone-name");
        config.private_zone = get_bool_entry(node, "private-zone").unwrap_or(false);
        if let Some(name) = get_string_entry(node, "environment") {
            config.environment = AzureCloud::from_name(&name)?;
        }
        if let Some(ttl) = get_int_entry(node, "ttl") {
            config.ttl = int_field("ttl", ttl)?;
        }
        if let Some(secs) = get_int_entry(node, "propagation-timeout-secs") {
            config.propagation_timeout_secs = int_field("propagation-timeout-secs", secs)?;
        }
        if let Some(secs) = get_int_entry(node, "polling-interval-secs") {
            config.polling_interval_secs = int_field("polling-interval-secs", secs)?;
        }
        if let Some(secs) = get_int_entry(node, "api-timeout-secs") {
            config.api_timeout_secs = int_field("api-timeout-secs", secs)?;
        }

        if let Some(creds) = node.children().and_then(|c| c.get("credentials")) {
            config.credentials.tenant_id = get_string_entry(creds, "tenant-id");
            config.credentials.client_id = get_string_entry(creds, "client-id");
            config.credentials.client_secret = get_string_entry(creds, "client-secret");
            config.credentials.client_secret_file =
                get_string_entry(creds, "client-secret-file").map(PathBuf::from);
            if let Some(endpoint) = get_string_entry(creds, "metadata-endpoint") {
                config.credentials.metadata_endpoint = endpoint;
            }
        }

        config.validated()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Reads `AZURE_*` variables, falling back to `AZURE_*_FILE`
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> AzureDnsResult<Option<String>> {
        let name = format!("{}{}", ENV_NAMESPACE, key);
        if let Some(value) = (self.lookup)(&name).filter(|v| !v.is_empty()) {
            return Ok(Some(value));
        }

        let file_var = format!("{}_FILE", name);
        match (self.lookup)(&file_var).filter(|v| !v.is_empty()) {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    AzureDnsError::Configuration(format!(
                        "failed to read {} from '{}': {}",
                        file_var, path, e
                    ))
                })?;
                let trimmed = content.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            None => Ok(None),
        }
    }

    fn parsed<T: FromStr>(&self, key: &str) -> AzureDnsResult<Option<T>> {
        match self.string(key)? {
            Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
                AzureDnsError::Configuration(format!(
                    "{}{} must be a non-negative integer, got '{}'",
                    ENV_NAMESPACE, key, raw
                ))
            }),
            None => Ok(None),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn int_field<T: TryFrom<i128>>(name: &str, value: i128) -> AzureDnsResult<T> {
    T::try_from(value).map_err(|_| {
        AzureDnsError::Configuration(format!("'{}' is out of range: {}", name, value))
    })
}

/// Get a string entry from a KDL node's children
fn get_string_entry(node: &kdl::KdlNode, name: &str) -> Option<String> {
    node.children()
        .and_then(|children| children.get(name))
        .and_then(|n| n.entries().first())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Get an integer entry from a KDL node's children
fn get_int_entry(node: &kdl::KdlNode, name: &str) -> Option<i128> {
    node.children()
        .and_then(|children| children.get(name))
        .and_then(|n| n.entries().first())
        .and_then(|e| e.value().as_integer())
}

/// Get a boolean entry from a KDL node's children
fn get_bool_entry(node: &kdl::KdlNode, name: &str) -> Option<bool> {
    node.children()
        .and_then(|children| children.get(name))
        .and_then(|n| n.entries().first())
        .and_then(|e| e.value().as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AzureDnsConfig::new("sub", "rg");
        assert_eq!(config.ttl, 60);
        assert_eq!(config.propagation_timeout(), Duration::from_secs(120));
        assert_eq!(config.polling_interval(), Duration::from_secs(2));
        assert_eq!(config.api_timeout(), Duration::from_secs(30));
        assert_eq!(config.environment, AzureCloud::Public);
        assert_eq!(config.credentials.metadata_endpoint, DEFAULT_METADATA_ENDPOINT);
        assert!(config.zone_name.is_none());
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_from_env_minimal() {
        let config = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub-1"),
            ("AZURE_RESOURCE_GROUP", "rg-1"),
        ]))
        .unwrap();

        assert_eq!(config.subscription_id, "sub-1");
        assert_eq!(config.resource_group, "rg-1");
        assert_eq!(config.account(), AccountContext::new("sub-1", "rg-1"));
    }

    #[test]
    fn test_from_env_full() {
        let config = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub-1"),
            ("AZURE_RESOURCE_GROUP", "rg-1"),
            ("AZURE_ZONE_NAME", "custom.zone."),
            ("AZURE_PRIVATE_ZONE", "true"),
            ("AZURE_ENVIRONMENT", "china"),
            ("AZURE_TTL", "300"),
            ("AZURE_PROPAGATION_TIMEOUT", "600"),
            ("AZURE_POLLING_INTERVAL", "10"),
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "client"),
            ("AZURE_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.zone_name.as_deref(), Some("custom.zone."));
        assert!(config.private_zone);
        assert_eq!(config.environment, AzureCloud::China);
        assert_eq!(config.ttl, 300);
        assert_eq!(config.propagation_timeout(), Duration::from_secs(600));
        assert_eq!(config.polling_interval(), Duration::from_secs(10));
        assert!(config.credentials.is_service_principal());
    }

    #[test]
    fn test_from_env_file_fallback() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  secret-from-file  ").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_TENANT_ID", "tenant"),
            ("AZURE_CLIENT_ID", "client"),
            ("AZURE_CLIENT_SECRET_FILE", path.as_str()),
        ]))
        .unwrap();

        assert_eq!(
            config.credentials.client_secret.as_deref(),
            Some("secret-from-file")
        );
    }

    #[test]
    fn test_from_env_missing_subscription() {
        let err = AzureDnsConfig::from_lookup(lookup(&[("AZURE_RESOURCE_GROUP", "rg")]))
            .unwrap_err();
        assert!(matches!(err, AzureDnsError::Configuration(_)));
        assert!(err.to_string().contains("subscription"));
    }

    #[test]
    fn test_from_env_unknown_environment() {
        let err = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_ENVIRONMENT", "mars"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("unknown environment mars"));
    }

    #[test]
    fn test_from_env_bad_integer() {
        let err = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_TTL", "sixty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("AZURE_TTL"));
    }

    #[test]
    fn test_partial_service_principal_rejected() {
        let err = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_TENANT_ID", "tenant"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("service principal"));
    }

    #[test]
    fn test_client_id_alone_selects_managed_identity() {
        let config = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_CLIENT_ID", "user-assigned"),
        ]))
        .unwrap();
        assert!(!config.credentials.is_service_principal());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = AzureDnsConfig::new("sub", "rg");
        config.ttl = 0;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_from_kdl() {
        let kdl = r#"
            azure-dns {
                subscription-id "sub-kdl"
                resource-group "rg-kdl"
                zone-name "example.com"
                private-zone #true
                environment "usgovernment"
                ttl 120
                propagation-timeout-secs 300
                polling-interval-secs 5
                api-timeout-secs 10

                credentials {
                    tenant-id "tenant"
                    client-id "client"
                    client-secret "secret"
                }
            }
        "#;

        let config = AzureDnsConfig::from_kdl(kdl).unwrap();
        assert_eq!(config.subscription_id, "sub-kdl");
        assert_eq!(config.resource_group, "rg-kdl");
        assert_eq!(config.zone_name.as_deref(), Some("example.com"));
        assert!(config.private_zone);
        assert_eq!(config.environment, AzureCloud::UsGovernment);
        assert_eq!(config.ttl, 120);
        assert_eq!(config.propagation_timeout_secs, 300);
        assert_eq!(config.polling_interval_secs, 5);
        assert_eq!(config.api_timeout_secs, 10);
        assert!(config.credentials.is_service_principal());
    }

    #[test]
    fn test_from_kdl_defaults() {
        let kdl = r#"
            azure-dns {
                subscription-id "sub"
                resource-group "rg"
            }
        "#;

        let config = AzureDnsConfig::from_kdl(kdl).unwrap();
        assert_eq!(config.ttl, 60);
        assert!(!config.private_zone);
        assert!(config.credentials.tenant_id.is_none());
    }

    #[test]
    fn test_from_kdl_missing_block() {
        let err = AzureDnsConfig::from_kdl("other { }").unwrap_err();
        assert!(err.to_string().contains("azure-dns"));
    }

    #[test]
    fn test_from_kdl_negative_ttl() {
        let kdl = r#"
            azure-dns {
                subscription-id "sub"
                resource-group "rg"
                ttl -5
            }
        "#;
        let err = AzureDnsConfig::from_kdl(kdl).unwrap_err();
        assert!(err.to_string().contains("ttl"));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "azure-dns {{\n  subscription-id \"sub\"\n  resource-group \"rg\"\n}}"
        )
        .unwrap();

        let config = AzureDnsConfig::from_file(file.path()).unwrap();
        assert_eq!(config.subscription_id, "sub");
    }

    #[test]
    fn test_environment_names_are_exact() {
        assert_eq!(
            AzureCloud::from_name("usgovernment").unwrap(),
            AzureCloud::UsGovernment
        );
        assert!(AzureCloud::from_name("Public").is_err());
        assert!(AzureCloud::from_name(" china").is_err());
    }

    #[test]
    fn test_root_zone_override_rejected() {
        let mut config = AzureDnsConfig::new("sub", "rg");
        config.zone_name = Some(".".to_string());
        let err = config.validated().unwrap_err();
        assert!(err.to_string().contains("zone name override"));

        let err = AzureDnsConfig::from_lookup(lookup(&[
            ("AZURE_SUBSCRIPTION_ID", "sub"),
            ("AZURE_RESOURCE_GROUP", "rg"),
            ("AZURE_ZONE_NAME", "."),
        ]))
        .unwrap_err();
        assert!(matches!(err, AzureDnsError::Configuration(_)));
    }

    #[test]
    fn test_from_kdl_secret_file_supplies_ids() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"appId": "app", "password": "pw", "tenant": "ten"}}"#
        )
        .unwrap();

        let kdl = format!(
            "azure-dns {{\n  subscription-id \"s\"\n  resource-group \"r\"\n  credentials {{\n    client-secret-file \"{}\"\n  }}\n}}",
            file.path().display()
        );

        let config = AzureDnsConfig::from_kdl(&kdl).unwrap();
        assert!(config.credentials.tenant_id.is_none());
        assert!(config.credentials.client_id.is_none());
        assert!(config.credentials.is_service_principal());
    }

    #[test]
    fn test_cloud_endpoints() {
        assert_eq!(
            AzureCloud::from_name("public").unwrap().resource_manager_endpoint(),
            "https://management.azure.com"
        );
        assert_eq!(
            AzureCloud::China.authority_host(),
            "https://login.chinacloudapi.cn/"
        );
        assert_eq!(
            AzureCloud::UsGovernment.resource_manager_endpoint(),
            "https://management.usgovcloudapi.net"
        );
        assert_eq!(
            AzureCloud::German.authority_host(),
            "https://login.microsoftonline.de/"
        );
    }
}
