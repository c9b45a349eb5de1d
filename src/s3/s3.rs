use crate::config::S3Config;
use crate::s3::error::StorageError;
use crate::s3::storage::{BlobReference, Storage};
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client};
use bytes::Bytes;
use tracing::{debug, error, info};

const LAP_CONTENT_TYPE: &str = "application/octet-stream";

/// Real S3 implementation of the Storage trait
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance from configuration
    pub async fn new(config: &S3Config) -> Result<Self, StorageError> {
        if config.bucket.is_empty() {
            return Err(StorageError::ConfigurationError(
                "s3.bucket must not be empty".to_string(),
            ));
        }

        let config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        // If access key and secret are provided, use them for credentials
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "StaticCredentialsProvider",
            );

            config_loader.credentials_provider(credentials).load().await
        } else {
            config_loader.load().await
        };

        // MinIO and most emulators require path-style requests
        let mut client_builder =
            aws_sdk_s3::config::Builder::from(&aws_config).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            info!("Setting custom endpoint: {}", endpoint);
            client_builder = client_builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(client_builder.build());

        info!(
            "Created S3 client for bucket {} in region {}",
            config.bucket, config.region
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
        })
    }
}

fn classify_error<E>(key: &str, e: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &e {
        SdkError::ServiceError(service_err) => {
            if service_err.err().code() == Some("AccessDenied") {
                return StorageError::AccessDenied(key.to_string(), e.to_string());
            }
            StorageError::WriteError(key.to_string(), e.to_string())
        }
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StorageError::ConnectionError(e.to_string())
        }
        _ => StorageError::Other(anyhow::anyhow!("S3 request for {} failed: {}", key, e)),
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn has_object(&self, key: &str) -> Result<bool, StorageError> {
        debug!("Checking for object in S3: {}", key);

        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if let SdkError::ServiceError(ref service_err) = e {
                    let err = service_err.err();
                    if err.is_not_found()
                        || service_err.raw().status().as_u16() == 404
                        || matches!(err.code(), Some("NoSuchKey") | Some("NotFound"))
                    {
                        return Ok(false);
                    }
                }
                error!("Failed to check object {}: {}", key, e);
                Err(match classify_error(key, e) {
                    StorageError::WriteError(key, msg) => StorageError::ReadError(key, msg),
                    other => other,
                })
            }
        }
    }

    async fn write_object(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        debug!("Uploading {} bytes to S3: {}", data.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(LAP_CONTENT_TYPE)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to put object {} to bucket {}: {}", key, self.bucket, e);
                classify_error(key, e)
            })?;

        info!("File saved: {}", key);
        Ok(())
    }

    fn object_reference(&self, key: &str) -> BlobReference {
        BlobReference::new(format!("s3://{}/{}", self.bucket, key))
    }

    #[cfg(test)]
    async fn get_object(&self, key: &str) -> Result<Bytes, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.to_string().contains("NoSuchKey") {
                    StorageError::ObjectNotFound(key.to_string())
                } else {
                    StorageError::ReadError(key.to_string(), e.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::ReadError(key.to_string(), e.to_string()))?
            .into_bytes();
        Ok(data)
    }

    #[cfg(test)]
    async fn remove_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Other(anyhow::anyhow!("Failed to delete object: {}", e)))?;

        debug!("Successfully removed object: {}", key);
        Ok(())
    }
}
