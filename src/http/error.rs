use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;

/// The two failure kinds of the QR request handler. The kind drives the
/// `error_type` label on the error counter, so the mapping stays exhaustive.
#[derive(Error, Debug)]
pub enum ApiError {
  #[error("S3 upload failed: {0}")]
  Store(String),
  #[error("QR generation failed: {0}")]
  Generation(String),
}

impl ApiError {
  pub fn error_type(&self) -> &'static str {
    match self {
      ApiError::Store(_) => "s3_error",
      ApiError::Generation(_) => "general_error",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    (
      StatusCode::INTERNAL_SERVER_ERROR,
      Json(json!({ "detail": self.to_string() })),
    )
      .into_response()
  }
}
