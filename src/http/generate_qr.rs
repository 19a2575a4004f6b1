use axum::{
  extract::{Query, State},
  Json,
};
use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::error;

use crate::http::error::ApiError;
use crate::http::AppState;
use crate::qr;

#[derive(Deserialize)]
pub struct GenerateQuery {
  pub url: String,
}

#[derive(Serialize)]
pub struct GenerateQrResponse {
  pub qr_code_url: String,
}

/// Brackets a request: the gauge increment happens on construction, and
/// `Drop` observes total duration and decrements the gauge on every exit
/// path, including panic unwind.
struct RequestTimer {
  start: Instant,
}

impl RequestTimer {
  fn start() -> Self {
    gauge!("qr_active_requests").increment(1.0);
    Self {
      start: Instant::now(),
    }
  }
}

impl Drop for RequestTimer {
  fn drop(&mut self) {
    histogram!("qr_request_duration_seconds").record(self.start.elapsed().as_secs_f64());
    gauge!("qr_active_requests").decrement(1.0);
  }
}

pub async fn generate_qr(
  State(state): State<AppState>,
  Query(query): Query<GenerateQuery>,
) -> Result<Json<GenerateQrResponse>, ApiError> {
  let _timer = RequestTimer::start();
  counter!("qr_requests_total", "status" => "processing", "method" => "POST").increment(1);

  match handle(&state, query.url).await {
    Ok(qr_code_url) => {
      counter!("qr_codes_generated_total").increment(1);
      counter!("qr_requests_total", "status" => "success", "method" => "POST").increment(1);
      Ok(Json(GenerateQrResponse { qr_code_url }))
    }
    Err(err) => {
      counter!("qr_generation_errors_total", "error_type" => err.error_type()).increment(1);
      counter!("qr_requests_total", "status" => "error", "method" => "POST").increment(1);
      error!("failed to handle qr request: {}", err);
      Err(err)
    }
  }
}

async fn handle(state: &AppState, url: String) -> Result<String, ApiError> {
  // Encode on the thread pool, it's pure CPU work
  let (send, recv) = tokio::sync::oneshot::channel();
  {
    let url = url.clone();
    rayon::spawn(move || {
      let _ = send.send(qr::encode_png(&url));
    });
  }

  let png = recv
    .await
    .map_err(|e| ApiError::Generation(e.to_string()))?
    .map_err(|e| ApiError::Generation(e.to_string()))?;

  let key = qr::object_key(&url);

  let upload_start = Instant::now();
  state
    .storage_client
    .upload_object(png, &key, "image/png")
    .await
    .map_err(|e| ApiError::Store(e.to_string()))?;
  histogram!("qr_s3_upload_duration_seconds").record(upload_start.elapsed().as_secs_f64());

  // The public URL keeps this literal shape regardless of the configured
  // region or endpoint
  Ok(format!(
    "https://{}.s3.amazonaws.com/{}",
    state.bucket, key
  ))
}
