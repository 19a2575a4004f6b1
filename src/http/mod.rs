use axum::{
  http::header,
  routing::{get, post},
  Json, Router,
};
use metrics::gauge;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use serde_json::json;
use std::future::ready;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
  trace::{self, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

mod error;
mod generate_qr;
mod s3;
pub mod storage;

#[derive(Clone)]
pub struct AppState {
  pub storage_client: Arc<Box<dyn storage::Storage>>,
  pub bucket: String,
}

/// Install the metrics recorder and wire up the full router against a real
/// S3 client.
pub fn bootstrap(cfg: &Config) -> Router {
  let recorder_handle = setup_metrics_recorder();

  // Credentials may be absent; the SDK then fails at request time, which
  // surfaces through the store error path
  let mut s3_config = aws_sdk_s3::config::Builder::new()
    .region(aws_sdk_s3::config::Region::new(cfg.aws_region.clone()))
    .behavior_version_latest();

  if let (Some(access_key), Some(secret_key)) = (&cfg.aws_access_key, &cfg.aws_secret_key) {
    let cred = aws_sdk_s3::config::Credentials::new(
      access_key.clone(),
      secret_key.clone(),
      None,
      None,
      "loaded-from-env",
    );
    s3_config = s3_config.credentials_provider(cred);
  }

  let client = aws_sdk_s3::Client::from_conf(s3_config.build());
  let storage_client: Arc<Box<dyn storage::Storage>> =
    Arc::new(Box::new(s3::Client::new(client, cfg.bucket.as_str())));

  app(cfg, storage_client, recorder_handle)
}

/// Build the router from its parts. Tests call this with an in-memory
/// storage client and their own recorder handle.
pub fn app(
  cfg: &Config,
  storage_client: Arc<Box<dyn storage::Storage>>,
  recorder_handle: PrometheusHandle,
) -> Router {
  gauge!(
    "qr_app_info",
    "version" => env!("CARGO_PKG_VERSION"),
    "environment" => cfg.environment.clone()
  )
  .set(1.0);

  let state = AppState {
    storage_client,
    bucket: cfg.bucket.clone(),
  };

  // Wildcards cannot be combined with credentials, so mirror the request
  // instead
  let cors = CorsLayer::new()
    .allow_origin(AllowOrigin::mirror_request())
    .allow_methods(AllowMethods::mirror_request())
    .allow_headers(AllowHeaders::mirror_request())
    .allow_credentials(true);

  Router::new()
    .route("/health", get(health))
    .route(
      "/metrics",
      get(move || {
        ready((
          [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
          recorder_handle.render(),
        ))
      }),
    )
    .route("/api/generate-qr/", post(generate_qr::generate_qr))
    .with_state(state)
    .layer((
      TraceLayer::new_for_http()
        .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
        .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
      cors,
      CatchPanicLayer::new(),
    ))
}

async fn health() -> Json<serde_json::Value> {
  Json(json!({ "status": "healthy", "service": "qr-generator" }))
}

pub fn setup_metrics_recorder() -> PrometheusHandle {
  const REQUEST_SECONDS: &[f64] = &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
  const UPLOAD_SECONDS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
  ];

  PrometheusBuilder::new()
    .set_buckets_for_metric(
      Matcher::Full("qr_request_duration_seconds".to_string()),
      REQUEST_SECONDS,
    )
    .unwrap()
    .set_buckets_for_metric(
      Matcher::Full("qr_s3_upload_duration_seconds".to_string()),
      UPLOAD_SECONDS,
    )
    .unwrap()
    .install_recorder()
    .unwrap()
}

pub async fn serve(router: Router, listen: &str) {
  // Start HTTP server
  let listener = tokio::net::TcpListener::bind(listen)
    .await
    .expect("failed to bind to address");
  axum::serve(listener, router)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("error running HTTP server");
}

async fn shutdown_signal() {
  let ctrl_c = async {
    signal::ctrl_c()
      .await
      .expect("failed to install Ctrl+C handler");
  };

  #[cfg(unix)]
  let terminate = async {
    signal::unix::signal(signal::unix::SignalKind::terminate())
      .expect("failed to install signal handler")
      .recv()
      .await;
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
      _ = ctrl_c => {},
      _ = terminate => {},
  }
}
