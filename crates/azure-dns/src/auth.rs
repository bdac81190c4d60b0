//! Bearer tokens for Azure Resource Manager
//!
//! [`TokenCredential`] is the request-signing capability handed to the
//! backend client. It is built once and shared; implementations cache the
//! token until shortly before it expires.
//!
//! - [`ClientSecretCredential`] - Azure AD client-credentials grant
//! - [`ManagedIdentityCredential`] - Instance metadata service (IMDS)
//! - [`StaticTokenCredential`] - A token acquired elsewhere

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::config::{AzureCloud, AzureDnsConfig};
use crate::credentials::CredentialLoader;
use crate::error::{AzureDnsError, AzureDnsResult};

/// Tokens are refreshed this long before they expire
const REFRESH_SKEW: Duration = Duration::from_secs(300);

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// IMDS token API version
const IMDS_API_VERSION: &str = "2018-02-01";

/// Source of bearer tokens for Azure Resource Manager
#[async_trait]
pub trait TokenCredential: Send + Sync + Debug {
    /// Returns the credential kind (e.g., "client-secret", "managed-identity")
    fn name(&self) -> &'static str;

    /// Return a bearer token valid for the resource manager
    async fn get_token(&self) -> AzureDnsResult<String>;
}

/// A bearer token and the instant it stops being valid
#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_SKEW < self.expires_at
    }
}

/// Single-slot token cache
#[derive(Debug, Default)]
struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    fn get(&self) -> Option<String> {
        self.slot
            .lock()
            .as_ref()
            .filter(|t| t.is_fresh())
            .map(|t| t.token.clone())
    }

    fn store(&self, response: TokenResponse) -> String {
        let lifetime = response
            .expires_in
            .and_then(|e| e.seconds())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);

        let token = response.access_token;
        *self.slot.lock() = Some(AccessToken {
            token: token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        token
    }
}

/// Token endpoint response shared by Azure AD and IMDS
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<ExpiresIn>,
}

/// Azure AD returns `expires_in` as a number, IMDS as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(u64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<u64> {
        match self {
            ExpiresIn::Seconds(s) => Some(*s),
            ExpiresIn::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn build_client(timeout: Duration) -> AzureDnsResult<Client> {
    Client::builder().timeout(timeout).build().map_err(|e| {
        AzureDnsError::Configuration(format!("Failed to create HTTP client: {}", e))
    })
}

async fn read_token_response(
    response: reqwest::Response,
    source: &str,
) -> AzureDnsResult<TokenResponse> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AzureDnsError::Authentication(format!(
            "{} token request failed: HTTP {} - {}",
            source, status, body
        )));
    }

    response.json().await.map_err(|e| {
        AzureDnsError::Authentication(format!(
            "Failed to parse {} token response: {}",
            source, e
        ))
    })
}

// ============================================================================
// Client secret
// ============================================================================

/// Service principal authenticated with a client secret
#[derive(Debug)]
pub struct ClientSecretCredential {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cache: TokenCache,
}

impl ClientSecretCredential {
    /// Create a credential for the given cloud
    pub fn new(
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        cloud: AzureCloud,
        timeout: Duration,
    ) -> AzureDnsResult<Self> {
        Self::with_endpoints(
            cloud.authority_host(),
            cloud.resource_manager_endpoint(),
            tenant_id,
            client_id,
            client_secret,
            timeout,
        )
    }

    /// Create a credential against explicit authority and resource endpoints
    pub fn with_endpoints(
        authority_host: &str,
        resource_manager: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
        timeout: Duration,
    ) -> AzureDnsResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                authority_host.trim_end_matches('/'),
                tenant_id
            ),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scope: format!("{}/.default", resource_manager.trim_end_matches('/')),
            cache: TokenCache::default(),
        })
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    fn name(&self) -> &'static str {
        "client-secret"
    }

    async fn get_token(&self) -> AzureDnsResult<String> {
        if let Some(token) = self.cache.get() {
            trace!(client_id = %self.client_id, "Using cached Azure AD token");
            return Ok(token);
        }

        debug!(client_id = %self.client_id, "Requesting Azure AD token");

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AzureDnsError::Authentication(format!("Token request failed: {}", e)))?;

        let token = read_token_response(response, "Azure AD").await?;
        Ok(self.cache.store(token))
    }
}

// ============================================================================
// Managed identity
// ============================================================================

/// Managed identity served by the instance metadata service
#[derive(Debug)]
pub struct ManagedIdentityCredential {
    client: Client,
    token_url: String,
    resource: String,
    client_id: Option<String>,
    cache: TokenCache,
}

impl ManagedIdentityCredential {
    /// Create a credential
    ///
    /// # Arguments
    ///
    /// * `metadata_endpoint` - IMDS base URL, normally `http://169.254.169.254`
    /// * `cloud` - Cloud whose resource manager the token is for
    /// * `client_id` - User-assigned identity to use, if any
    /// * `timeout` - Request timeout
    pub fn new(
        metadata_endpoint: &str,
        cloud: AzureCloud,
        client_id: Option<String>,
        timeout: Duration,
    ) -> AzureDnsResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            token_url: format!(
                "{}/metadata/identity/oauth2/token",
                metadata_endpoint.trim_end_matches('/')
            ),
            resource: format!("{}/", cloud.resource_manager_endpoint()),
            client_id,
            cache: TokenCache::default(),
        })
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    fn name(&self) -> &'static str {
        "managed-identity"
    }

    async fn get_token(&self) -> AzureDnsResult<String> {
        if let Some(token) = self.cache.get() {
            trace!("Using cached managed identity token");
            return Ok(token);
        }

        debug!(url = %self.token_url, "Requesting managed identity token");

        let mut query = vec![
            ("api-version", IMDS_API_VERSION),
            ("resource", self.resource.as_str()),
        ];
        if let Some(ref client_id) = self.client_id {
            query.push(("client_id", client_id.as_str()));
        }

        let response = self
            .client
            .get(&self.token_url)
            .header("Metadata", "true")
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                AzureDnsError::Authentication(format!(
                    "Instance metadata service unreachable: {}",
                    e
                ))
            })?;

        let token = read_token_response(response, "managed identity").await?;
        Ok(self.cache.store(token))
    }
}

// ============================================================================
// Static token
// ============================================================================

/// A pre-acquired bearer token
#[derive(Debug, Clone)]
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn get_token(&self) -> AzureDnsResult<String> {
        Ok(self.token.clone())
    }
}

/// Build the credential selected by the configuration
///
/// A complete service principal selects [`ClientSecretCredential`]; otherwise
/// [`ManagedIdentityCredential`] is used. IDs missing from the configuration
/// are taken from the client secret file.
pub fn credential_from_config(config: &AzureDnsConfig) -> AzureDnsResult<Arc<dyn TokenCredential>> {
    let creds = &config.credentials;

    if !creds.is_service_principal() {
        debug!(
            endpoint = %creds.metadata_endpoint,
            "No service principal configured, using managed identity"
        );
        let credential = ManagedIdentityCredential::new(
            &creds.metadata_endpoint,
            config.environment,
            creds.client_id.clone(),
            config.api_timeout(),
        )?;
        return Ok(Arc::new(credential));
    }

    let (secret, file_tenant, file_client) = match (&creds.client_secret, &creds.client_secret_file) {
        (Some(secret), _) => (secret.clone(), None, None),
        (None, Some(path)) => {
            let loaded = CredentialLoader::load_from_file(path)?;
            (loaded.client_secret, loaded.tenant_id, loaded.client_id)
        }
        (None, None) => {
            return Err(AzureDnsError::Credentials(
                "client secret is missing".to_string(),
            ))
        }
    };

    let (tenant_id, client_id) = match (
        creds.tenant_id.clone().or(file_tenant),
        creds.client_id.clone().or(file_client),
    ) {
        (Some(tenant_id), Some(client_id)) => (tenant_id, client_id),
        _ => {
            return Err(AzureDnsError::Credentials(
                "service principal requires tenant ID and client ID, in the configuration or the client secret file".to_string(),
            ))
        }
    };

    let credential = ClientSecretCredential::new(
        &tenant_id,
        &client_id,
        &secret,
        config.environment,
        config.api_timeout(),
    )?;
    Ok(Arc::new(credential))
}
