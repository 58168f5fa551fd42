//! HTTP host for the survey API.
//!
//! Wraps [`survey_api::api_router`] under `/api` with request tracing and
//! optional CORS, for any [`SurveyStore`].

pub mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc};

use axum::{Router, http::HeaderValue};
use serde::Deserialize;
use survey_core::store::SurveyStore;
use tower_http::{
  cors::{AllowOrigin, Any, CorsLayer},
  trace::TraceLayer,
};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `SURVEY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Load the demo reference data and survey into an empty database.
  pub seed_demo_data: bool,
  /// Allowed browser origin, or `*` for any. No CORS headers when unset.
  pub cors_origin:    Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "0.0.0.0".to_string(),
      port:           3000,
      store_path:     PathBuf::from("survey.db"),
      seed_demo_data: false,
      cors_origin:    None,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  fn cors_layer(&self) -> Result<Option<CorsLayer>> {
    let Some(origin) = self.cors_origin.as_deref().map(str::trim) else {
      return Ok(None);
    };
    let allow = if origin == "*" {
      AllowOrigin::from(Any)
    } else {
      let value = HeaderValue::from_str(origin)
        .map_err(|_| Error::InvalidCorsOrigin(origin.to_string()))?;
      AllowOrigin::exact(value)
    };
    Ok(Some(
      CorsLayer::new()
        .allow_origin(allow)
        .allow_methods(Any)
        .allow_headers(Any),
    ))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `store`.
pub fn router<S>(store: Arc<S>, config: &ServerConfig) -> Result<Router>
where
  S: SurveyStore + 'static,
{
  let app = Router::new()
    .nest("/api", survey_api::api_router(store))
    .layer(TraceLayer::new_for_http());

  Ok(match config.cors_layer()? {
    Some(cors) => app.layer(cors),
    None => app,
  })
}

// ─── Integration tests ────────────────────────────────────────────────────────
