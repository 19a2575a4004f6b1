#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use qr_generator::config::Config;
use qr_generator::http::{self, storage::Storage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// In-memory stand-in for the S3 client. Cloning shares the underlying
/// store, so tests keep a handle for inspection after boxing it into the
/// router.
#[derive(Clone, Default)]
pub struct MemoryStorage {
  pub objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
  pub fail: Arc<AtomicBool>,
}

#[async_trait]
impl Storage for MemoryStorage {
  async fn upload_object(&self, data: Vec<u8>, key: &str, _mime: &str) -> Result<()> {
    if self.fail.load(Ordering::SeqCst) {
      bail!("simulated s3 outage");
    }
    self.objects.lock().unwrap().insert(key.to_owned(), data);
    Ok(())
  }
}

pub fn test_config() -> Config {
  Config {
    listen: "0.0.0.0:0".to_string(),
    aws_access_key: None,
    aws_secret_key: None,
    aws_region: "us-east-1".to_string(),
    bucket: "test-bucket".to_string(),
    environment: "test".to_string(),
  }
}

// The prometheus recorder is process-global and can only be installed once
static RECORDER: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn test_app(storage: MemoryStorage) -> Router {
  let handle = RECORDER
    .get_or_init(http::setup_metrics_recorder)
    .clone();
  http::app(&test_config(), Arc::new(Box::new(storage)), handle)
}

/// Value of the first sample matching `name` and all `labels` in a
/// Prometheus text exposition, or 0.0 when the series does not exist yet.
pub fn metric_value(exposition: &str, name: &str, labels: &[(&str, &str)]) -> f64 {
  samples(exposition, name, labels).first().copied().unwrap_or(0.0)
}

/// Sum of every sample matching `name` and the given label subset.
pub fn metric_sum(exposition: &str, name: &str, labels: &[(&str, &str)]) -> f64 {
  samples(exposition, name, labels).iter().sum()
}

fn samples(exposition: &str, name: &str, labels: &[(&str, &str)]) -> Vec<f64> {
  let mut values = Vec::new();

  for line in exposition.lines() {
    if line.starts_with('#') {
      continue;
    }
    let Some(rest) = line.strip_prefix(name) else {
      continue;
    };
    let Some((label_part, value)) = rest.split_once(' ') else {
      continue;
    };
    // Skip longer metric names sharing this prefix (e.g. _sum/_count)
    if !label_part.is_empty() && !label_part.starts_with('{') {
      continue;
    }
    if labels
      .iter()
      .all(|(k, v)| label_part.contains(&format!("{k}=\"{v}\"")))
    {
      if let Ok(value) = value.trim().parse() {
        values.push(value);
      }
    }
  }

  values
}
