use crate::http::storage::Storage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::debug;

pub struct Client {
  s3_client: aws_sdk_s3::Client,
  bucket: String,
}

impl Client {
  pub fn new(s3_client: aws_sdk_s3::Client, bucket: &str) -> Self {
    Self {
      s3_client,
      bucket: bucket.to_owned(),
    }
  }
}

#[async_trait]
impl Storage for Client {
  async fn upload_object(&self, data: Vec<u8>, key: &str, mime: &str) -> Result<()> {
    debug!("uploading object: {} to bucket: {}", key, self.bucket);

    let body = ByteStream::from(data);
    self
      .s3_client
      .put_object()
      .bucket(self.bucket.as_str())
      .key(key)
      .body(body)
      .content_type(mime)
      .send()
      .await
      .context("failed to upload object")?;

    Ok(())
  }
}
