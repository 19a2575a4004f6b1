use anyhow::Result;
use async_trait::async_trait;

/// Write-only seam in front of the object store, so tests can substitute an
/// in-memory implementation.
#[async_trait]
pub trait Storage: Send + Sync {
  async fn upload_object(&self, data: Vec<u8>, key: &str, mime: &str) -> Result<()>;
}
