use crate::error::{StoreError, StoreResult};
use serde::Deserialize;
use std::env;

/// Key prefix under which every uploaded image is stored
pub const DEFAULT_KEY_PREFIX: &str = "attachments/";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage_type: StorageType,
    pub s3_endpoint: Option<String>,
    pub s3_region: String,
    pub s3_bucket: Option<String>,
    pub s3_key_prefix: String,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub server_port: u16,
    pub max_upload_size: usize,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub enum StorageType {
    S3,
    Memory,
}

impl std::str::FromStr for StorageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageType::S3),
            "memory" => Ok(StorageType::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage type: {}", s)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config {
            storage_type: env::var("STORAGE_TYPE")
                .unwrap_or_else(|_| "s3".to_string())
                .parse()?,
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_key_prefix: env::var("S3_KEY_PREFIX")
                .unwrap_or_else(|_| DEFAULT_KEY_PREFIX.to_string()),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_secret_key: env::var("S3_SECRET_KEY").ok(),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?,
            max_upload_size: match env::var("MAX_UPLOAD_SIZE") {
                Ok(value) => value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_SIZE: {}", e))?,
                Err(_) => DEFAULT_MAX_UPLOAD_SIZE,
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.s3_endpoint.is_none() {
            return Err(anyhow::anyhow!("S3_ENDPOINT must be set"));
        }
        if self.s3_bucket.is_none() {
            return Err(anyhow::anyhow!("S3_BUCKET must be set"));
        }
        if self.s3_access_key.is_some() != self.s3_secret_key.is_some() {
            return Err(anyhow::anyhow!(
                "S3_ACCESS_KEY and S3_SECRET_KEY must be set together"
            ));
        }
        self.store_config()?.validate()?;
        Ok(())
    }

    /// Immutable settings handed to the image store
    pub fn store_config(&self) -> Result<StoreConfig, anyhow::Error> {
        Ok(StoreConfig {
            endpoint_url: self
                .s3_endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("S3_ENDPOINT must be set"))?,
            region: self.s3_region.clone(),
            bucket_name: self
                .s3_bucket
                .clone()
                .ok_or_else(|| anyhow::anyhow!("S3_BUCKET must be set"))?,
            key_prefix: self.s3_key_prefix.clone(),
        })
    }
}

/// Addressing settings for the object store.
///
/// Object keys are `<key_prefix><uuid>` and public URLs are
/// `<endpoint_url>/<bucket_name>/<key>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub endpoint_url: String,
    pub region: String,
    pub bucket_name: String,
    pub key_prefix: String,
}

impl StoreConfig {
    pub fn new(
        endpoint_url: impl Into<String>,
        region: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        StoreConfig {
            endpoint_url: endpoint_url.into(),
            region: region.into(),
            bucket_name: bucket_name.into(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        let fields = [
            ("endpoint URL", &self.endpoint_url),
            ("region", &self.region),
            ("bucket name", &self.bucket_name),
            ("key prefix", &self.key_prefix),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(StoreError::Configuration(format!("{} must not be empty", name)));
            }
        }

        let url = reqwest::Url::parse(&self.endpoint_url).map_err(|e| {
            StoreError::Configuration(format!(
                "invalid endpoint URL {}: {}",
                self.endpoint_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(StoreError::Configuration(format!(
                "endpoint URL must be an absolute http(s) URL, got {}",
                self.endpoint_url
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            storage_type: StorageType::S3,
            s3_endpoint: Some("http://store.local".to_string()),
            s3_region: "us-1".to_string(),
            s3_bucket: Some("imgs".to_string()),
            s3_key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            s3_access_key: None,
            s3_secret_key: None,
            server_port: 3000,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    #[test]
    fn test_storage_type_parsing() {
        assert_eq!("S3".parse::<StorageType>().unwrap(), StorageType::S3);
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert!("local".parse::<StorageType>().is_err());
    }

    #[test]
    fn test_valid_config_produces_store_config() {
        let config = config();
        config.validate().unwrap();

        let store = config.store_config().unwrap();
        assert_eq!(store, StoreConfig::new("http://store.local", "us-1", "imgs"));
        assert_eq!(store.key_prefix, "attachments/");
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let mut config = config();
        config.s3_bucket = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_half_configured_credentials_are_rejected() {
        let mut config = config();
        config.s3_access_key = Some("key".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_rejects_empty_fields() {
        let store = StoreConfig::new("http://store.local", "", "imgs");
        assert!(matches!(store.validate(), Err(StoreError::Configuration(_))));
    }

    #[test]
    fn test_store_config_rejects_malformed_endpoint() {
        for endpoint in ["store.local", "ftp://store.local", "not a url"] {
            let store = StoreConfig::new(endpoint, "us-1", "imgs");
            assert!(
                matches!(store.validate(), Err(StoreError::Configuration(_))),
                "{} should be rejected",
                endpoint
            );
        }
    }
}
