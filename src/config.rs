// Client configuration: credentials, marketplace and request limits

use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

pub const DEFAULT_API_VERSION: &str = "2013-08-01";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Maximum number of ids the service accepts in one ItemLookup.
pub const ITEM_LOOKUP_MAX: usize = 10;

pub const ENV_ASSOCIATE_TAG: &str = "AMAZON_ASSOCIATE_TAG";
pub const ENV_ACCESS_KEY_ID: &str = "AMAZON_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AMAZON_SECRET_ACCESS_KEY";
pub const ENV_REGION: &str = "AMAZON_REGION";
pub const ENV_TIMEOUT_MS: &str = "AMAZON_TIMEOUT_MS";

// Marketplace the requests are sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    US,
    UK,
    DE,
    FR,
    JP,
    CA,
    CN,
    IT,
    ES,
    IN,
    BR,
    MX,
    AU,
}

impl Region {
    pub fn host(&self) -> &'static str {
        match self {
            Region::US => "webservices.amazon.com",
            Region::UK => "webservices.amazon.co.uk",
            Region::DE => "webservices.amazon.de",
            Region::FR => "webservices.amazon.fr",
            Region::JP => "webservices.amazon.co.jp",
            Region::CA => "webservices.amazon.ca",
            Region::CN => "webservices.amazon.cn",
            Region::IT => "webservices.amazon.it",
            Region::ES => "webservices.amazon.es",
            Region::IN => "webservices.amazon.in",
            Region::BR => "webservices.amazon.com.br",
            Region::MX => "webservices.amazon.com.mx",
            Region::AU => "webservices.amazon.com.au",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::US => "US",
            Region::UK => "UK",
            Region::DE => "DE",
            Region::FR => "FR",
            Region::JP => "JP",
            Region::CA => "CA",
            Region::CN => "CN",
            Region::IT => "IT",
            Region::ES => "ES",
            Region::IN => "IN",
            Region::BR => "BR",
            Region::MX => "MX",
            Region::AU => "AU",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "US" => Ok(Region::US),
            "UK" | "GB" => Ok(Region::UK),
            "DE" => Ok(Region::DE),
            "FR" => Ok(Region::FR),
            "JP" => Ok(Region::JP),
            "CA" => Ok(Region::CA),
            "CN" => Ok(Region::CN),
            "IT" => Ok(Region::IT),
            "ES" => Ok(Region::ES),
            "IN" => Ok(Region::IN),
            "BR" => Ok(Region::BR),
            "MX" => Ok(Region::MX),
            "AU" => Ok(Region::AU),
            other => Err(ClientError::ConfigError(format!(
                "unknown region: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub associate_tag: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: Region,
    pub version: String,
    /// Full endpoint URL. Derived from `region` when not set.
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
    /// Ids sent per ItemLookup request, between 1 and [`ITEM_LOOKUP_MAX`].
    pub item_lookup_max: usize,
}

impl ClientConfig {
    pub fn new(
        associate_tag: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            associate_tag: associate_tag.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: Region::default(),
            version: DEFAULT_API_VERSION.to_string(),
            endpoint: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            item_lookup_max: ITEM_LOOKUP_MAX,
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Read the configuration from `AMAZON_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ClientError::ConfigError(format!("{} is not set", key)))
        };

        let mut config = Self::new(
            required(ENV_ASSOCIATE_TAG)?,
            required(ENV_ACCESS_KEY_ID)?,
            required(ENV_SECRET_ACCESS_KEY)?,
        );

        if let Some(region) = lookup(ENV_REGION) {
            config.region = region.parse()?;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = timeout.trim().parse().map_err(|_| {
                ClientError::ConfigError(format!("{} is not a number: {}", ENV_TIMEOUT_MS, timeout))
            })?;
        }

        Ok(config)
    }

    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}/onca/xml", self.region.host()))
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.associate_tag.is_empty() {
            return Err(ClientError::ConfigError("associate tag is empty".to_string()));
        }
        if self.access_key_id.is_empty() || self.secret_access_key.is_empty() {
            return Err(ClientError::ConfigError("credentials are empty".to_string()));
        }
        if self.item_lookup_max == 0 || self.item_lookup_max > ITEM_LOOKUP_MAX {
            return Err(ClientError::ConfigError(format!(
                "item_lookup_max must be between 1 and {}",
                ITEM_LOOKUP_MAX
            )));
        }
        Ok(())
    }
}
