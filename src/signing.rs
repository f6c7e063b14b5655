// Request signing for the Product Advertising API (signature version 2, HMAC-SHA256)

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Url;
use sha2::Sha256;

use crate::config::ClientConfig;
use crate::error::ClientError;

type HmacSha256 = Hmac<Sha256>;

pub const SERVICE_NAME: &str = "AWSECommerceService";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub struct RequestSigner {
    access_key_id: String,
    associate_tag: String,
    version: String,
    endpoint: String,
    host: String,
    path: String,
    mac: HmacSha256,
}

// Keeps the secret out of logs
impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("access_key_id", &self.access_key_id)
            .field("associate_tag", &self.associate_tag)
            .field("version", &self.version)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let endpoint = config.endpoint_url();
        let url = Url::parse(&endpoint)
            .map_err(|e| ClientError::ConfigError(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ClientError::ConfigError(format!(
                    "endpoint has no host: {}",
                    endpoint
                )))
            }
        };
        let mac = HmacSha256::new_from_slice(config.secret_access_key.as_bytes())
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self {
            access_key_id: config.access_key_id.clone(),
            associate_tag: config.associate_tag.clone(),
            version: config.version.clone(),
            endpoint: format!("{}://{}{}", url.scheme(), host, url.path()),
            host,
            path: url.path().to_string(),
            mac,
        })
    }

    /// Build the full request URL for `params`, signed at `now`.
    ///
    /// The common parameters (service, credentials, version, timestamp) are
    /// added here; a caller-supplied parameter with the same name wins.
    pub fn signed_url(&self, params: &[(String, String)], now: DateTime<Utc>) -> String {
        let canonical = self.canonical_query(params, now);
        let signature = self.sign(&self.string_to_sign(&canonical));
        format!(
            "{}?{}&Signature={}",
            self.endpoint,
            canonical,
            percent_encode(&signature)
        )
    }

    pub fn canonical_query(&self, params: &[(String, String)], now: DateTime<Utc>) -> String {
        let mut all = BTreeMap::new();
        all.insert("Service".to_string(), SERVICE_NAME.to_string());
        all.insert("AWSAccessKeyId".to_string(), self.access_key_id.clone());
        all.insert("AssociateTag".to_string(), self.associate_tag.clone());
        all.insert("Version".to_string(), self.version.clone());
        all.insert(
            "Timestamp".to_string(),
            now.format(TIMESTAMP_FORMAT).to_string(),
        );
        for (key, value) in params {
            all.insert(key.clone(), value.clone());
        }

        all.iter()
            .map(|(key, value)| format!("{}={}", percent_encode(key), percent_encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn string_to_sign(&self, canonical_query: &str) -> String {
        format!("GET\n{}\n{}\n{}", self.host, self.path, canonical_query)
    }

    pub fn sign(&self, string_to_sign: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// RFC 3986 encoding: only unreserved characters pass through.
pub fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}
