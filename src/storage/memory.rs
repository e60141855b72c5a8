use super::backend::{ObjectAcl, ObjectStore, PutObject};
use crate::error::PutError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Notify, RwLock};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub acl: ObjectAcl,
    pub content_type: Option<String>,
}

/// In-process object store. Objects are committed only once the whole body
/// has been read, so a failed or abandoned write leaves nothing behind.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
    reject_writes: bool,
    gate: Option<Arc<Notify>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses every write with an access-denied failure
    pub fn rejecting() -> Self {
        MemoryObjectStore {
            reject_writes: true,
            ..Self::default()
        }
    }

    /// A store whose writes stay in flight until `gate` is notified
    pub fn gated(gate: Arc<Notify>) -> Self {
        MemoryObjectStore {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, object: PutObject) -> Result<(), PutError> {
        if self.reject_writes {
            return Err(PutError::AccessDenied(format!(
                "write to {}/{} denied",
                object.bucket, object.key
            )));
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let bytes = object
            .body
            .collect()
            .await
            .map_err(|e| PutError::Transport(format!("Failed to read upload body: {}", e)))?
            .into_bytes()
            .to_vec();

        self.objects.write().await.insert(
            (object.bucket, object.key),
            StoredObject {
                bytes,
                acl: object.acl,
                content_type: object.content_type,
            },
        );
        Ok(())
    }
}
