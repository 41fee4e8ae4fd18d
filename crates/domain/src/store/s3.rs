use std::env;

use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, primitives::ByteStream, Client};

use crate::errors::Error;

use super::ImageStore;

#[derive(Clone, Debug)]
pub struct S3ImageStore {
    client: Client,
    bucket: String,
}

impl S3ImageStore {
    pub fn new(client: Client) -> Self {
        let bucket =
            env::var("CONSULTATION_IMAGES_BUCKET").unwrap_or("healthbook-consultation-images".to_string());
        Self { client, bucket }
    }

    fn url(&self, key: &str) -> String {
        format!("https://{}.s3.amazonaws.com/{}", self.bucket, key)
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn put_image(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, Error> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| Error::persistence(format!("Failed to upload image: {}", DisplayErrorContext(&e))))?;

        tracing::info!("Stored consultation image {}", key);
        Ok(self.url(key))
    }
}
