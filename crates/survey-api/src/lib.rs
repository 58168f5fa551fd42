//! JSON REST API for survey responses.
//!
//! Exposes an axum [`Router`] backed by any [`survey_core::store::SurveyStore`].
//! TLS, CORS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", survey_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod reference;
pub mod responses;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde_json::{Value, json};
use survey_core::store::SurveyStore;

pub use error::ApiError;

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok", "timestamp": Utc::now() })) }

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SurveyStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Reference data
    .route("/countries", get(reference::list_countries::<S>))
    .route("/countries/{id}", get(reference::get_country::<S>))
    .route("/companies", get(reference::list_companies::<S>))
    .route("/companies/{id}", get(reference::get_company::<S>))
    .route("/locations", get(reference::list_locations::<S>))
    .route("/locations/{id}", get(reference::get_location::<S>))
    .route("/surveys", get(reference::list_surveys::<S>))
    .route("/surveys/{id}", get(reference::get_survey::<S>))
    // Responses
    .route("/responses", get(responses::list::<S>).post(responses::create::<S>))
    .route("/responses/export/csv", get(responses::export_csv::<S>))
    .route("/responses/{id}", get(responses::get_one::<S>))
    .with_state(store)
}

// ─── Router tests ─────────────────────────────────────────────────────────────
