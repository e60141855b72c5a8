use crate::error::PutError;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;

/// Access-control directive attached to a written object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectAcl {
    /// Fetchable by unauthenticated clients through its URL
    PublicRead,
}

/// A single object write
pub struct PutObject {
    pub bucket: String,
    pub key: String,
    pub acl: ObjectAcl,
    pub content_type: Option<String>,
    pub body: ByteStream,
}

/// Trait defining the interface for object store backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write the whole body under (bucket, key). Either the object exists
    /// afterwards or an error is returned.
    async fn put_object(&self, object: PutObject) -> Result<(), PutError>;
}
