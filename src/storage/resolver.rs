//! Endpoint resolution for the object store client.
//!
//! The backing store is self-hosted, so requests must never go to the
//! provider's default endpoints. An [`EndpointResolver`] maps a
//! (service, region) pair to a base URL, and [`S3EndpointResolver`] plugs it
//! into the S3 client's endpoint hook.

use aws_sdk_s3::config::endpoint::{Endpoint, EndpointFuture, Params, ResolveEndpoint};
use std::fmt;
use std::sync::Arc;

/// Service identifier used by the S3 client when resolving endpoints
pub const S3_SERVICE_ID: &str = "s3";

/// Maps (service id, region) to an endpoint base URL, or `None` when unknown
pub trait EndpointResolver: Send + Sync + fmt::Debug {
    fn resolve(&self, service_id: &str, region: &str) -> Option<String>;
}

/// Answers for exactly one (service, region) pair
#[derive(Debug, Clone)]
pub struct StaticEndpointResolver {
    service_id: String,
    region: String,
    url: String,
}

impl StaticEndpointResolver {
    pub fn new(
        service_id: impl Into<String>,
        region: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        StaticEndpointResolver {
            service_id: service_id.into(),
            region: region.into(),
            url: url.into(),
        }
    }

    pub fn for_s3(region: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(S3_SERVICE_ID, region, url)
    }
}

impl EndpointResolver for StaticEndpointResolver {
    fn resolve(&self, service_id: &str, region: &str) -> Option<String> {
        if service_id == self.service_id && region == self.region {
            Some(self.url.clone())
        } else {
            None
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown endpoint requested for service {service_id} in region {region}")]
pub struct UnknownEndpoint {
    service_id: String,
    region: String,
}

/// Adapts an [`EndpointResolver`] to the S3 client.
///
/// Addressing is path-style: the bucket becomes the first path segment of the
/// resolved URL, which keeps stored objects at `<endpoint>/<bucket>/<key>`.
#[derive(Debug, Clone)]
pub struct S3EndpointResolver {
    inner: Arc<dyn EndpointResolver>,
}

impl S3EndpointResolver {
    pub fn new(inner: Arc<dyn EndpointResolver>) -> Self {
        S3EndpointResolver { inner }
    }

    fn endpoint_for(
        &self,
        region: &str,
        bucket: Option<&str>,
    ) -> Result<Endpoint, UnknownEndpoint> {
        let base = self
            .inner
            .resolve(S3_SERVICE_ID, region)
            .ok_or_else(|| UnknownEndpoint {
                service_id: S3_SERVICE_ID.to_string(),
                region: region.to_string(),
            })?;
        let base = base.trim_end_matches('/');

        let url = match bucket {
            Some(bucket) => format!("{}/{}", base, bucket),
            None => base.to_string(),
        };
        Ok(Endpoint::builder().url(url).build())
    }
}

impl ResolveEndpoint for S3EndpointResolver {
    fn resolve_endpoint<'a>(&'a self, params: &'a Params) -> EndpointFuture<'a> {
        let region = params.region().unwrap_or_default();
        let result = self
            .endpoint_for(region, params.bucket())
            .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>);
        EndpointFuture::ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> S3EndpointResolver {
        S3EndpointResolver::new(Arc::new(StaticEndpointResolver::for_s3(
            "us-1",
            "http://store.local/",
        )))
    }

    #[test]
    fn test_static_resolver_matches_only_configured_pair() {
        let resolver = StaticEndpointResolver::for_s3("us-1", "http://store.local");

        assert_eq!(
            resolver.resolve("s3", "us-1").as_deref(),
            Some("http://store.local")
        );
        assert!(resolver.resolve("s3", "eu-west-1").is_none());
        assert!(resolver.resolve("sqs", "us-1").is_none());
    }

    #[tokio::test]
    async fn test_s3_resolver_uses_path_style_addressing() {
        let params = Params::builder()
            .region("us-1")
            .bucket("imgs")
            .build()
            .unwrap();

        let endpoint = resolver().resolve_endpoint(&params).await.unwrap();
        assert_eq!(endpoint.url(), "http://store.local/imgs");
    }

    #[tokio::test]
    async fn test_s3_resolver_without_bucket_returns_base_url() {
        let params = Params::builder().region("us-1").build().unwrap();

        let endpoint = resolver().resolve_endpoint(&params).await.unwrap();
        assert_eq!(endpoint.url(), "http://store.local");
    }

    #[tokio::test]
    async fn test_s3_resolver_fails_for_unknown_region() {
        let params = Params::builder()
            .region("eu-west-1")
            .bucket("imgs")
            .build()
            .unwrap();

        let err = resolver().resolve_endpoint(&params).await.unwrap_err();
        assert!(err.to_string().contains("eu-west-1"));
    }
}
