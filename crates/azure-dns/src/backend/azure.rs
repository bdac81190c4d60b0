//! Azure DNS backend
//!
//! Talks to the Azure Resource Manager REST API. Public zones live under
//! `Microsoft.Network/dnsZones`, private zones under
//! `Microsoft.Network/privateDnsZones`; the two APIs differ in version and in
//! the casing of record-set properties.
//!
//! API documentation: <https://learn.microsoft.com/rest/api/dns/>

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, trace};

use super::{AccountContext, DnsBackend, TxtRecord, TxtRecordSet, Zone};
use crate::auth::TokenCredential;
use crate::config::{AzureCloud, AzureDnsConfig};
use crate::error::{AzureDnsError, AzureDnsResult, BackendError, BackendResult};

const PUBLIC_ZONES_PROVIDER: &str = "Microsoft.Network/dnsZones";
const PUBLIC_ZONES_API_VERSION: &str = "2018-05-01";
const PRIVATE_ZONES_PROVIDER: &str = "Microsoft.Network/privateDnsZones";
const PRIVATE_ZONES_API_VERSION: &str = "2020-06-01";

/// Azure Resource Manager DNS client
#[derive(Debug)]
pub struct AzureDnsClient {
    client: Client,
    credential: Arc<dyn TokenCredential>,
    base_url: String,
    private_zone: bool,
    timeout: Duration,
}

impl AzureDnsClient {
    /// Create a client for the given cloud
    ///
    /// # Arguments
    ///
    /// * `credential` - Request signer shared across calls
    /// * `cloud` - Selects the resource manager endpoint
    /// * `private_zone` - Use Private DNS zones
    /// * `timeout` - Request timeout
    pub fn new(
        credential: Arc<dyn TokenCredential>,
        cloud: AzureCloud,
        private_zone: bool,
        timeout: Duration,
    ) -> AzureDnsResult<Self> {
        Self::with_base_url(
            credential,
            cloud.resource_manager_endpoint().to_string(),
            private_zone,
            timeout,
        )
    }

    /// Create a client from provider configuration
    pub fn from_config(
        config: &AzureDnsConfig,
        credential: Arc<dyn TokenCredential>,
    ) -> AzureDnsResult<Self> {
        Self::new(
            credential,
            config.environment,
            config.private_zone,
            config.api_timeout(),
        )
    }

    /// Create a client against an explicit resource manager URL
    pub fn with_base_url(
        credential: Arc<dyn TokenCredential>,
        base_url: String,
        private_zone: bool,
        timeout: Duration,
    ) -> AzureDnsResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AzureDnsError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            credential,
            base_url: base_url.trim_end_matches('/').to_string(),
            private_zone,
            timeout,
        })
    }

    fn provider_path(&self) -> &'static str {
        if self.private_zone {
            PRIVATE_ZONES_PROVIDER
        } else {
            PUBLIC_ZONES_PROVIDER
        }
    }

    fn api_version(&self) -> &'static str {
        if self.private_zone {
            PRIVATE_ZONES_API_VERSION
        } else {
            PUBLIC_ZONES_API_VERSION
        }
    }

    fn zone_url(&self, account: &AccountContext, zone_name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
            self.base_url,
            account.subscription_id,
            account.resource_group,
            self.provider_path(),
            zone_name
        )
    }

    fn record_set_url(&self, account: &AccountContext, zone_name: &str, record_name: &str) -> String {
        format!("{}/TXT/{}", self.zone_url(account, zone_name), record_name)
    }

    /// Request body for a TXT record-set PUT
    fn record_set_body(&self, record_set: &TxtRecordSet) -> serde_json::Value {
        let records: Vec<_> = record_set
            .records
            .iter()
            .map(|r| json!({ "value": r.values }))
            .collect();

        if self.private_zone {
            json!({ "properties": { "ttl": record_set.ttl, "txtRecords": records } })
        } else {
            json!({ "properties": { "TTL": record_set.ttl, "TXTRecords": records } })
        }
    }

    /// Send an authenticated request and map error statuses
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> BackendResult<reqwest::Response> {
        let token = self.credential.get_token().await?;

        trace!(method = %method, url = %url, "Azure DNS API request");

        let mut request = self
            .client
            .request(method, url)
            .query(&[("api-version", self.api_version())])
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    elapsed_secs: self.timeout.as_secs(),
                }
            } else {
                BackendError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => BackendError::NotFound(url_path(url).to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                BackendError::Authentication(format!("HTTP {} - {}", status, body))
            }
            _ => BackendError::Api {
                status: status.as_u16(),
                message: body,
            },
        })
    }
}

/// Path part of a URL, for error messages
fn url_path(url: &str) -> &str {
    url.find("/subscriptions/").map_or(url, |i| &url[i..])
}

#[async_trait]
impl DnsBackend for AzureDnsClient {
    fn name(&self) -> &'static str {
        "azure"
    }

    async fn get_zone(&self, account: &AccountContext, zone_name: &str) -> BackendResult<Zone> {
        debug!(
            zone = %zone_name,
            resource_group = %account.resource_group,
            private = self.private_zone,
            "Looking up Azure DNS zone"
        );

        let url = self.zone_url(account, zone_name);
        let response = self.send(Method::GET, &url, None).await?;

        let zone: ZoneResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse(format!("Failed to parse zone response: {}", e))
        })?;

        Ok(Zone {
            id: zone.id.unwrap_or_default(),
            name: zone.name.unwrap_or_else(|| zone_name.to_string()),
        })
    }

    async fn get_record_set(
        &self,
        account: &AccountContext,
        zone_name: &str,
        record_name: &str,
    ) -> BackendResult<TxtRecordSet> {
        let url = self.record_set_url(account, zone_name, record_name);
        let response = self.send(Method::GET, &url, None).await?;

        let record_set: RecordSetResponse = response.json().await.map_err(|e| {
            BackendError::InvalidResponse(format!("Failed to parse record set response: {}", e))
        })?;

        let properties = record_set.properties.unwrap_or_default();
        Ok(TxtRecordSet {
            name: record_set.name.unwrap_or_else(|| record_name.to_string()),
            ttl: properties.ttl.unwrap_or_default(),
            records: properties
                .txt_records
                .unwrap_or_default()
                .into_iter()
                .map(|r| TxtRecord { values: r.value })
                .collect(),
        })
    }

    async fn upsert_record_set(
        &self,
        account: &AccountContext,
        zone_name: &str,
        record_name: &str,
        record_set: &TxtRecordSet,
    ) -> BackendResult<()> {
        let url = self.record_set_url(account, zone_name, record_name);
        let body = self.record_set_body(record_set);

        debug!(
            zone = %zone_name,
            record_name = %record_name,
            records = record_set.records.len(),
            "Writing TXT record set"
        );

        self.send(Method::PUT, &url, Some(body)).await?;
        Ok(())
    }

    async fn delete_record_set(
        &self,
        account: &AccountContext,
        zone_name: &str,
        record_name: &str,
    ) -> BackendResult<()> {
        let url = self.record_set_url(account, zone_name, record_name);

        debug!(zone = %zone_name, record_name = %record_name, "Deleting TXT record set");

        self.send(Method::DELETE, &url, None).await?;
        Ok(())
    }
}

// Azure API types

#[derive(Debug, Deserialize)]
struct ZoneResponse {
    id: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordSetResponse {
    name: Option<String>,
    properties: Option<RecordSetProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct RecordSetProperties {
    #[serde(rename = "TTL", alias = "ttl", default)]
    ttl: Option<u32>,
    #[serde(rename = "TXTRecords", alias = "txtRecords", default)]
    txt_records: Option<Vec<TxtRecordEntry>>,
}

#[derive(Debug, Deserialize)]
struct TxtRecordEntry {
    #[serde(default)]
    value: Vec<String>,
}
