//! S3 storage client implementation.

use std::time::Duration;

use aws_credential_types::Credentials;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
};
use tracing::{debug, info};

use crate::error::AppError;

/// S3 storage configuration.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3Config {
    /// Parse S3 URL: `http://host:port/bucket-name/`
    pub fn from_url(
        url: &str,
        access_key_id: String,
        secret_access_key: String,
    ) -> Result<Self, AppError> {
        let url = url.trim_end_matches('/');
        // Search after the scheme so `://` does not count as the bucket slash.
        let authority_start = url.find("://").map_or(0, |i| i + 3);
        let last_slash = url[authority_start..]
            .rfind('/')
            .map(|i| i + authority_start)
            .ok_or_else(|| AppError::InvalidArgument("Invalid S3 URL format".to_string()))?;

        let (endpoint, bucket) = url.split_at(last_slash);
        let bucket = &bucket[1..]; // Skip the slash

        if bucket.is_empty() || endpoint.is_empty() {
            return Err(AppError::InvalidArgument(
                "S3 URL must contain endpoint and bucket name".to_string(),
            ));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            bucket: bucket.to_string(),
            access_key_id,
            secret_access_key,
        })
    }
}

/// S3 storage client for item image uploads and signed retrieval URLs.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3 storage client.
    pub async fn new(config: S3Config) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "closet-service",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new("us-east-1")) // MinIO doesn't care about region
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO
            .build();

        info!(bucket = %config.bucket, endpoint = %config.endpoint, "S3 storage initialized");

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
        })
    }

    /// Check if S3 is accessible.
    pub async fn health_check(&self) -> bool {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
    }

    /// Store binary content under `key` with the caller-declared content type.
    pub async fn put_object(
        &self,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), AppError> {
        debug!(key = %key, bytes = content.len(), "Uploading object");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                AppError::Upstream(format!("Image upload failed: {service_err}"))
            })?;

        info!(key = %key, "Object uploaded");
        Ok(())
    }

    /// Generate a time-limited signed retrieval URL for `key`.
    pub async fn presign_get(&self, key: &str, expires_in_secs: u64) -> Result<String, AppError> {
        let presigning_config = PresigningConfig::expires_in(Duration::from_secs(expires_in_secs))
            .map_err(|e| AppError::Internal(format!("Invalid presign duration: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to sign retrieval URL: {e}")))?;

        debug!(key = %key, expires_in = expires_in_secs, "Signed retrieval URL generated");
        Ok(presigned.uri().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_url_with_trailing_slash() {
        let config = S3Config::from_url(
            "http://localhost:9000/closet-images/",
            "key".into(),
            "secret".into(),
        )
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000");
        assert_eq!(config.bucket, "closet-images");
    }

    #[test]
    fn parses_url_without_trailing_slash() {
        let config = S3Config::from_url(
            "https://s3.example.com/wardrobe",
            "key".into(),
            "secret".into(),
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://s3.example.com");
        assert_eq!(config.bucket, "wardrobe");
    }

    #[test]
    fn rejects_url_without_bucket() {
        assert!(S3Config::from_url("http://localhost:9000/", "k".into(), "s".into()).is_err());
        assert!(S3Config::from_url("no-slashes-here", "k".into(), "s".into()).is_err());
    }
}
