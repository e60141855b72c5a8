pub mod backend;
pub mod memory;
pub mod resolver;
pub mod s3;

pub use backend::{ObjectAcl, ObjectStore, PutObject};
pub use memory::MemoryObjectStore;
pub use s3::{S3Credentials, S3ObjectStore};

use crate::config::{Config, StorageType, StoreConfig};
use crate::error::{PutError, StoreError, StoreResult};
use aws_sdk_s3::primitives::ByteStream;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Every stored image is publicly readable through its URL
const IMAGE_ACL: ObjectAcl = ObjectAcl::PublicRead;

/// Stores images under fresh random keys and hands back their public URLs.
///
/// Cloning is cheap; clones share the configuration and the backend.
#[derive(Clone)]
pub struct ImageStore {
    config: Arc<StoreConfig>,
    backend: Arc<dyn ObjectStore>,
}

impl ImageStore {
    pub fn new(config: StoreConfig, backend: Arc<dyn ObjectStore>) -> StoreResult<Self> {
        config.validate()?;
        Ok(ImageStore {
            config: Arc::new(config),
            backend,
        })
    }

    /// Store an image and return its public URL
    pub async fn store(
        &self,
        data: ByteStream,
        cancel: &CancellationToken,
    ) -> StoreResult<String> {
        self.store_with_content_type(data, None, cancel).await
    }

    /// Store an image, forwarding `content_type` to the backend as-is
    pub async fn store_with_content_type(
        &self,
        data: ByteStream,
        content_type: Option<String>,
        cancel: &CancellationToken,
    ) -> StoreResult<String> {
        let key = self.object_key();
        let size = data.size_hint().1;
        let start = Instant::now();

        let put = self.backend.put_object(PutObject {
            bucket: self.config.bucket_name.clone(),
            key: key.clone(),
            acl: IMAGE_ACL,
            content_type,
            body: data,
        });

        // Dropping `put` aborts the in-flight request.
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PutError::Cancelled),
            result = put => result,
        };

        if let Err(source) = result {
            tracing::error!(
                error = %source,
                bucket = %self.config.bucket_name,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Image upload failed"
            );
            return Err(StoreError::Upload {
                bucket: self.config.bucket_name.clone(),
                key,
                source,
            });
        }

        tracing::info!(
            bucket = %self.config.bucket_name,
            key = %key,
            size_bytes = ?size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image upload successful"
        );

        Ok(self.public_url(&key))
    }

    fn object_key(&self) -> String {
        format!("{}{}", self.config.key_prefix, Uuid::new_v4())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.endpoint_url.trim_end_matches('/'),
            self.config.bucket_name,
            key
        )
    }
}

/// Factory function to create the configured object store backend
pub async fn create_object_store(config: &Config) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match config.storage_type {
        StorageType::S3 => {
            let credentials = match (&config.s3_access_key, &config.s3_secret_key) {
                (Some(access), Some(secret)) => Some(S3Credentials {
                    access_key: access.clone(),
                    secret_key: secret.clone(),
                }),
                _ => None,
            };
            let store = S3ObjectStore::new(&config.store_config()?, credentials).await?;
            Ok(Arc::new(store))
        }
        StorageType::Memory => {
            tracing::warn!("Using in-memory object store; images will not survive a restart");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
    }
}
