//! Object storage service for cover images.
//!
//! Wraps the AWS S3 SDK client. Credentials are resolved via the standard
//! AWS credential chain (env vars, `~/.aws/credentials`, IAM role, etc.);
//! an endpoint override allows S3-compatible stores such as MinIO in
//! development.

use aws_sdk_s3::Client;
use bytes::Bytes;

use crate::{
    config::StorageConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct StorageService {
    client: Client,
    bucket: String,
    public_url: String,
}

impl StorageService {
    /// Create a new storage service from the configured bucket and region.
    pub async fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let mut config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(ref endpoint) = config.endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint);
        }

        let sdk_config = config_loader.load().await;
        let client = Client::new(&sdk_config);

        let public_url = config
            .public_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", config.bucket));

        tracing::info!("Object storage initialized: bucket={}", config.bucket);

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            public_url,
        })
    }

    /// Upload an object under `key`, overwriting any prior object there.
    pub async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        tracing::debug!("put_object: bucket={} key={}", self.bucket, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(data))
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("put_object {}: {}", key, e)))?;

        Ok(())
    }

    /// Public URL under which an uploaded object is reachable.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), key)
    }
}
