//! DNS-01 challenge record derivation and name helpers

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::{AzureDnsError, AzureDnsResult};

/// ACME challenge record name prefix
pub const ACME_CHALLENGE_RECORD: &str = "_acme-challenge";

/// The TXT record an ACME server expects for one DNS-01 challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRecord {
    /// Absolute record name, e.g. `_acme-challenge.example.com.`
    pub fqdn: String,
    /// base64url-encoded SHA-256 digest of the key authorization
    pub value: String,
}

impl ChallengeRecord {
    /// Derive the record name and value from the challenge inputs
    ///
    /// A wildcard domain (`*.example.com`) is validated at its base name.
    pub fn derive(domain: &str, key_authorization: &str) -> Self {
        let fqdn = format!(
            "{}.{}",
            ACME_CHALLENGE_RECORD,
            to_fqdn(normalize_domain(domain))
        );

        Self {
            fqdn,
            value: compute_challenge_value(key_authorization),
        }
    }
}

/// Compute the DNS-01 challenge value from a key authorization
pub fn compute_challenge_value(key_authorization: &str) -> String {
    let digest = Sha256::digest(key_authorization.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Strip a leading wildcard label
pub fn normalize_domain(domain: &str) -> &str {
    domain.strip_prefix("*.").unwrap_or(domain)
}

/// Append the root separator if it is missing
pub fn to_fqdn(name: &str) -> String {
    if name.is_empty() || name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Remove one trailing root separator, if present
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Return the record name relative to `zone`
///
/// Both names are compared in absolute form and case-insensitively. Fails if
/// the zone is not a proper suffix of the FQDN.
pub fn extract_sub_domain(fqdn: &str, zone: &str) -> AzureDnsResult<String> {
    let canonical_fqdn = to_fqdn(fqdn);
    let canonical_zone = to_fqdn(zone);

    if canonical_fqdn.eq_ignore_ascii_case(&canonical_zone) {
        return Err(AzureDnsError::SubDomain(format!(
            "no subdomain because the domain and the zone are identical: {}",
            canonical_fqdn
        )));
    }

    let suffix = format!(".{}", canonical_zone);
    let not_a_subdomain = || {
        AzureDnsError::SubDomain(format!(
            "the domain {} is not a subdomain of {}",
            canonical_fqdn, canonical_zone
        ))
    };

    let split = canonical_fqdn
        .len()
        .checked_sub(suffix.len())
        .ok_or_else(not_a_subdomain)?;
    if split == 0 || !canonical_fqdn.is_char_boundary(split) {
        return Err(not_a_subdomain());
    }

    let (sub_domain, tail) = canonical_fqdn.split_at(split);
    if !tail.eq_ignore_ascii_case(&suffix) {
        return Err(not_a_subdomain());
    }

    Ok(sub_domain.to_string())
}
