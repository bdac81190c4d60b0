//! Service principal secret loading
//!
//! A client secret file may contain:
//! - Plain text: the whole (trimmed) content is the secret
//! - JSON: `{"client_secret": "..."}`, optionally with `tenant_id` and `client_id`
//! - Azure CLI output of `az ad sp create-for-rbac`: `{"appId", "password", "tenant"}`

use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AzureDnsError;

/// Secret material read from a credentials file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePrincipalSecret {
    pub client_secret: String,
    /// Tenant ID, if the file carried one
    pub tenant_id: Option<String>,
    /// Client (application) ID, if the file carried one
    pub client_id: Option<String>,
}

/// Credential loader for service principal secrets
#[derive(Debug, Default)]
pub struct CredentialLoader;

impl CredentialLoader {
    /// Load a client secret from a file
    ///
    /// Warns if the file is readable by group or others.
    pub fn load_from_file(path: &Path) -> Result<ServicePrincipalSecret, AzureDnsError> {
        #[cfg(unix)]
        {
            let metadata = fs::metadata(path).map_err(|e| {
                AzureDnsError::Credentials(format!(
                    "Failed to read credentials file '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            let file_mode = metadata.permissions().mode() & 0o777;
            if file_mode & 0o077 != 0 {
                warn!(
                    path = %path.display(),
                    mode = format!("{:o}", file_mode),
                    "Credentials file has overly permissive permissions (should be 0600 or 0400)"
                );
            }
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AzureDnsError::Credentials(format!(
                "Failed to read credentials file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_secret(&content, path)
    }

    fn parse_secret(content: &str, path: &Path) -> Result<ServicePrincipalSecret, AzureDnsError> {
        let trimmed = content.trim();

        if trimmed.starts_with('{') {
            return Self::parse_json_secret(trimmed);
        }

        if trimmed.is_empty() {
            return Err(AzureDnsError::Credentials(format!(
                "Credentials file '{}' is empty",
                path.display()
            )));
        }

        debug!(path = %path.display(), "Loaded client secret as plain text");
        Ok(ServicePrincipalSecret {
            client_secret: trimmed.to_string(),
            tenant_id: None,
            client_id: None,
        })
    }

    fn parse_json_secret(json: &str) -> Result<ServicePrincipalSecret, AzureDnsError> {
        #[derive(Deserialize)]
        struct SnakeCaseFormat {
            client_secret: String,
            tenant_id: Option<String>,
            client_id: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AzureCliFormat {
            app_id: String,
            password: String,
            tenant: String,
        }

        if let Ok(parsed) = serde_json::from_str::<SnakeCaseFormat>(json) {
            debug!("Loaded client secret as JSON");
            return Ok(ServicePrincipalSecret {
                client_secret: parsed.client_secret,
                tenant_id: parsed.tenant_id,
                client_id: parsed.client_id,
            });
        }

        if let Ok(parsed) = serde_json::from_str::<AzureCliFormat>(json) {
            debug!("Loaded client secret as Azure CLI service principal");
            return Ok(ServicePrincipalSecret {
                client_secret: parsed.password,
                tenant_id: Some(parsed.tenant),
                client_id: Some(parsed.app_id),
            });
        }

        Err(AzureDnsError::Credentials(
            "Invalid JSON credentials format. Expected {\"client_secret\": \"...\"} or {\"appId\": \"...\", \"password\": \"...\", \"tenant\": \"...\"}".to_string()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_plain_text() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  plain-secret  ").unwrap();

        let secret = CredentialLoader::load_from_file(file.path()).unwrap();
        assert_eq!(secret.client_secret, "plain-secret");
        assert!(secret.tenant_id.is_none());
        assert!(secret.client_id.is_none());
    }

    #[test]
    fn test_load_json_secret() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"client_secret": "json-secret"}}"#).unwrap();

        let secret = CredentialLoader::load_from_file(file.path()).unwrap();
        assert_eq!(secret.client_secret, "json-secret");
    }

    #[test]
    fn test_load_json_with_ids() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"client_secret": "s", "tenant_id": "t", "client_id": "c"}}"#
        )
        .unwrap();

        let secret = CredentialLoader::load_from_file(file.path()).unwrap();
        assert_eq!(secret.tenant_id.as_deref(), Some("t"));
        assert_eq!(secret.client_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_load_azure_cli_format() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"appId": "app", "displayName": "acme", "password": "pw", "tenant": "ten"}}"#
        )
        .unwrap();

        let secret = CredentialLoader::load_from_file(file.path()).unwrap();
        assert_eq!(secret.client_secret, "pw");
        assert_eq!(secret.client_id.as_deref(), Some("app"));
        assert_eq!(secret.tenant_id.as_deref(), Some("ten"));
    }

    #[test]
    fn test_empty_file_error() {
        let file = NamedTempFile::new().unwrap();
        let result = CredentialLoader::load_from_file(file.path());
        assert!(matches!(result, Err(AzureDnsError::Credentials(_))));
    }

    #[test]
    fn test_whitespace_only_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "   \n\t  \n").unwrap();
        assert!(CredentialLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_invalid_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"token": "wrong-shape"}}"#).unwrap();
        assert!(CredentialLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_nonexistent_file() {
        let result = CredentialLoader::load_from_file(Path::new("/nonexistent/azure-dns.json"));
        assert!(result.is_err());
    }
}
