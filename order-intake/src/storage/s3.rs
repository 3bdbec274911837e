use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    Client,
    config::{RequestChecksumCalculation, retry::RetryConfig},
    error::DisplayErrorContext,
    primitives::ByteStream,
};
use bytes::Bytes;
use url::Url;

use super::{ObjectMetadata, ObjectStore, StorageError};

/// S3-compatible bucket (AWS S3, Cloudflare R2, MinIO).
///
/// Credentials come from the standard AWS provider chain. SDK retries are disabled: every
/// upload is attempted once and a failure is reported straight back to the caller.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(bucket: &str, region: Option<&str>, endpoint_url: Option<&Url>, force_path_style: bool) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region.to_string()));
        }
        if let Some(endpoint_url) = endpoint_url {
            loader = loader.endpoint_url(endpoint_url.as_str());
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(force_path_style)
            .retry_config(RetryConfig::disabled())
            // Plain single-shot PUTs; R2 and MinIO reject some default checksum trailers
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Self::from_client(Client::from_conf(s3_config), bucket)
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, body: Bytes, metadata: ObjectMetadata) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(&metadata.content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Backend {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(bucket = %self.bucket, key = %key, bytes = size, "Uploaded object to S3");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "s3"
    }
}
