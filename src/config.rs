use std::env;

pub struct Config {
  pub listen: String,
  pub aws_access_key: Option<String>,
  pub aws_secret_key: Option<String>,
  pub aws_region: String,
  pub bucket: String,
  pub environment: String,
}

/// Read configuration from the process environment, once, at startup.
pub fn from_env() -> Config {
  Config {
    listen: env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:8000".to_owned()),
    aws_access_key: env::var("AWS_ACCESS_KEY").ok(),
    aws_secret_key: env::var("AWS_SECRET_KEY").ok(),
    aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_owned()),
    bucket: env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "my-qr-project-bucket".to_owned()),
    environment: env::var("ENV").unwrap_or_else(|_| "dev".to_owned()),
  }
}
