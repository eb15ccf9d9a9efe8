//! Defines the storage and notification collaborators. The handler
//! depends on the `ObjectStore` and `Notifier` traits so that tests
//! can substitute recording fakes; the AWS SDK implementations below
//! are what production wires in.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::from_env;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use std::env;
use tracing::info;

/// Read and write access to object storage.
#[async_trait]
pub trait ObjectStore {
    /// Retrieves the full byte content of an object.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Writes an object, overwriting any previous content under the
    /// same key.
    async fn store(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str)
        -> Result<()>;
}

/// Dispatch of completion notifications.
#[async_trait]
pub trait Notifier {
    /// Publishes one message to a notification topic.
    async fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<()>;
}

/// Loads the shared AWS configuration, honoring an
/// `AWS_ENDPOINT_URL` override for local S3/SNS stand-ins.
pub async fn load_aws_config() -> SdkConfig {
    let endpoint_url_var = env::var("AWS_ENDPOINT_URL");
    if let Ok(endpoint_url) = endpoint_url_var {
        from_env()
            .endpoint_url(
                if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                    endpoint_url
                } else {
                    format!("https://{}", endpoint_url)
                },
            )
            .region("us-east-1") // should be OK since the endpoint was overridden
            .load()
    } else {
        from_env().load()
    }
    .await
}

/// The S3-backed object store.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to download object {:?} from bucket {:?}",
                    key, bucket
                )
            })?;
        let body = response.body.collect().await.with_context(|| {
            format!(
                "Failed to read the contents of object {:?} from bucket {:?}",
                key, bucket
            )
        })?;
        Ok(body.into_bytes().to_vec())
    }

    async fn store(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .with_context(|| {
                format!("Failed to upload object {:?} to bucket {:?}", key, bucket)
            })?;
        Ok(())
    }
}

/// The SNS-backed notifier.
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
}

impl SnsNotifier {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(config),
        }
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<()> {
        let response = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .with_context(|| format!("Failed to publish notification to {:?}", topic_arn))?;
        info!(
            "Notification sent with message id {:?}",
            response.message_id().unwrap_or_default()
        );
        Ok(())
    }
}
