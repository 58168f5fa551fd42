//! Async HTTP client wrapping the survey JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::Serialize;
use survey_core::{
  response::{ResponseDetail, ResponseFilter, ResponseId, ResponseSummary, SubmitReceipt},
  survey::{Survey, SurveyId, SurveyWithQuestions},
};
use uuid::Uuid;

/// Connection settings for the survey API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

/// Async HTTP client for the survey JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// Body of `POST /api/responses`.
#[derive(Debug, Serialize)]
pub struct SubmitBody {
  pub survey_id:       SurveyId,
  pub country_id:      i64,
  pub company_id:      i64,
  pub location_id:     i64,
  pub answers:         Vec<SubmitAnswer>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SubmitAnswer {
  pub question_id:  i64,
  pub answer_value: String,
}

/// A downloaded CSV export.
pub struct Export {
  /// Server-suggested file name from `Content-Disposition`, if any.
  pub filename: Option<String>,
  pub body:     String,
}

fn filter_query(filter: &ResponseFilter) -> Vec<(&'static str, i64)> {
  [
    ("survey_id", filter.survey_id),
    ("country_id", filter.country_id),
    ("company_id", filter.company_id),
    ("location_id", filter.location_id),
  ]
  .into_iter()
  .filter_map(|(k, v)| v.map(|v| (k, v)))
  .collect()
}

/// Pull `filename="..."` out of a `Content-Disposition` header value.
pub(crate) fn disposition_filename(value: &str) -> Option<String> {
  value
    .split(';')
    .map(str::trim)
    .find_map(|part| part.strip_prefix("filename="))
    .map(|name| name.trim_matches('"').to_string())
    .filter(|name| !name.is_empty())
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// Turn a non-2xx response into an error carrying the server's message.
  async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<serde_json::Value>()
      .await
      .ok()
      .and_then(|v| v["error"].as_str().map(str::to_owned))
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {message}"))
  }

  // ── Surveys ───────────────────────────────────────────────────────────────

  /// `GET /api/surveys`
  pub async fn list_surveys(&self) -> Result<Vec<Survey>> {
    let resp = self
      .client
      .get(self.url("/surveys"))
      .send()
      .await
      .context("GET /surveys failed")?;
    let resp = Self::ensure_success(resp, "GET /surveys").await?;
    resp.json().await.context("deserialising surveys")
  }

  /// `GET /api/surveys/<id>`
  pub async fn get_survey(&self, id: SurveyId) -> Result<SurveyWithQuestions> {
    let resp = self
      .client
      .get(self.url(&format!("/surveys/{id}")))
      .send()
      .await
      .context("GET /surveys/:id failed")?;
    let resp = Self::ensure_success(resp, "GET /surveys/:id").await?;
    resp.json().await.context("deserialising survey")
  }

  // ── Responses ─────────────────────────────────────────────────────────────

  /// `GET /api/responses[?survey_id=..][&country_id=..][&company_id=..][&location_id=..]`
  pub async fn list_responses(&self, filter: &ResponseFilter) -> Result<Vec<ResponseSummary>> {
    let resp = self
      .client
      .get(self.url("/responses"))
      .query(&filter_query(filter))
      .send()
      .await
      .context("GET /responses failed")?;
    let resp = Self::ensure_success(resp, "GET /responses").await?;
    resp.json().await.context("deserialising responses")
  }

  /// `GET /api/responses/<id>`
  pub async fn get_response(&self, id: ResponseId) -> Result<ResponseDetail> {
    let resp = self
      .client
      .get(self.url(&format!("/responses/{id}")))
      .send()
      .await
      .context("GET /responses/:id failed")?;
    let resp = Self::ensure_success(resp, "GET /responses/:id").await?;
    resp.json().await.context("deserialising response")
  }

  /// `POST /api/responses`
  pub async fn submit(&self, body: &SubmitBody) -> Result<SubmitReceipt> {
    let resp = self
      .client
      .post(self.url("/responses"))
      .json(body)
      .send()
      .await
      .context("POST /responses failed")?;
    let resp = Self::ensure_success(resp, "POST /responses").await?;
    resp.json().await.context("deserialising receipt")
  }

  /// `GET /api/responses/export/csv?survey_id=<id>`
  pub async fn export_csv(&self, survey_id: SurveyId) -> Result<Export> {
    let resp = self
      .client
      .get(self.url("/responses/export/csv"))
      .query(&[("survey_id", survey_id)])
      .send()
      .await
      .context("GET /responses/export/csv failed")?;
    let resp = Self::ensure_success(resp, "GET /responses/export/csv").await?;
    let filename = resp
      .headers()
      .get(reqwest::header::CONTENT_DISPOSITION)
      .and_then(|v| v.to_str().ok())
      .and_then(disposition_filename);
    let body = resp.text().await.context("reading CSV body")?;
    Ok(Export { filename, body })
  }
}
