use super::backend::{ObjectAcl, ObjectStore, PutObject};
use super::resolver::{EndpointResolver, S3EndpointResolver, StaticEndpointResolver};
use crate::config::StoreConfig;
use crate::error::{PutError, StoreError, StoreResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use std::sync::Arc;

/// Static credentials, used instead of the default provider chain when set
pub struct S3Credentials {
    pub access_key: String,
    pub secret_key: String,
}

/// Object store backed by an S3-compatible service
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client whose requests for the configured region go to the
    /// configured endpoint.
    pub async fn new(
        config: &StoreConfig,
        credentials: Option<S3Credentials>,
    ) -> StoreResult<Self> {
        let resolver = StaticEndpointResolver::for_s3(&config.region, &config.endpoint_url);
        Self::with_resolver(config, credentials, Arc::new(resolver)).await
    }

    pub async fn with_resolver(
        config: &StoreConfig,
        credentials: Option<S3Credentials>,
        resolver: Arc<dyn EndpointResolver>,
    ) -> StoreResult<Self> {
        config.validate()?;

        let mut config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(creds) = credentials {
            if creds.access_key.is_empty() || creds.secret_key.is_empty() {
                return Err(StoreError::Configuration(
                    "S3 access key and secret key must both be non-empty".to_string(),
                ));
            }
            config_loader = config_loader.credentials_provider(Credentials::new(
                &creds.access_key,
                &creds.secret_key,
                None,
                None,
                "static",
            ));
        }

        let sdk_config = config_loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .endpoint_resolver(S3EndpointResolver::new(resolver))
            .force_path_style(true)
            .build();

        tracing::debug!(
            endpoint = %config.endpoint_url,
            region = %config.region,
            "S3 client configured"
        );

        Ok(S3ObjectStore {
            client: Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, object: PutObject) -> Result<(), PutError> {
        let mut request = self
            .client
            .put_object()
            .bucket(object.bucket)
            .key(object.key)
            .acl(canned_acl(object.acl))
            .body(object.body);

        if let Some(content_type) = object.content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(classify_put_error)?;
        Ok(())
    }
}

fn canned_acl(acl: ObjectAcl) -> ObjectCannedAcl {
    match acl {
        ObjectAcl::PublicRead => ObjectCannedAcl::PublicRead,
    }
}

fn classify_put_error(err: SdkError<PutObjectError>) -> PutError {
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(_) => classify_service_code(err.code(), message),
        _ => PutError::Transport(message),
    }
}

/// Map an S3 error code to the failure it represents
fn classify_service_code(code: Option<&str>, message: String) -> PutError {
    match code {
        Some(
            "AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "AllAccessDisabled",
        ) => PutError::AccessDenied(message),
        _ => PutError::Rejected(message),
    }
}
