//! Handlers for `/responses` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/responses` | 201 with `{"response_id", "replayed"}` |
//! | `GET`  | `/responses` | Optional `?survey_id&country_id&company_id&location_id` |
//! | `GET`  | `/responses/:id` | 404 if not found |
//! | `GET`  | `/responses/export/csv` | Required `?survey_id`; 404 if no rows |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use survey_core::{
  hierarchy::{CompanyId, CountryId, LocationId},
  response::{
    CandidateAnswer, ResponseDetail, ResponseFilter, ResponseId, ResponseSummary, Submission,
  },
  store::SurveyStore,
  submit::submit,
  survey::{QuestionId, SurveyId},
};
use uuid::Uuid;

use crate::error::ApiError;

/// Query-string integer where an empty value (`?company_id=`) means absent.
pub(crate) fn empty_as_none<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<String>::deserialize(d)?.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => s
      .parse()
      .map(Some)
      .map_err(|_| serde::de::Error::custom(format!("expected an integer, got {s:?}"))),
  }
}

pub(crate) fn bad_query(e: QueryRejection) -> ApiError { ApiError::BadRequest(e.body_text()) }

pub(crate) fn bad_path(e: PathRejection) -> ApiError { ApiError::BadRequest(e.body_text()) }

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnswerBody {
  pub question_id:  QuestionId,
  /// String, number or boolean; stored as text.
  pub answer_value: Value,
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub survey_id:       SurveyId,
  pub country_id:      CountryId,
  pub company_id:      CompanyId,
  pub location_id:     LocationId,
  pub answers:         Vec<AnswerBody>,
  #[serde(default)]
  pub idempotency_key: Option<Uuid>,
}

fn answer_text(question_id: QuestionId, value: Value) -> Result<String, ApiError> {
  match value {
    Value::String(s) => Ok(s),
    Value::Number(n) => Ok(n.to_string()),
    Value::Bool(b) => Ok(b.to_string()),
    other => Err(ApiError::BadRequest(format!(
      "answer_value for question {question_id} must be a string, number or boolean, got {other}"
    ))),
  }
}

impl CreateBody {
  fn into_submission(self) -> Result<Submission, ApiError> {
    let answers = self
      .answers
      .into_iter()
      .map(|a| {
        let value = answer_text(a.question_id, a.answer_value)?;
        Ok(CandidateAnswer::new(a.question_id, value))
      })
      .collect::<Result<_, ApiError>>()?;
    Ok(Submission {
      survey_id: self.survey_id,
      country_id: self.country_id,
      company_id: self.company_id,
      location_id: self.location_id,
      answers,
      idempotency_key: self.idempotency_key,
    })
  }
}

/// `POST /responses`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let receipt = submit(store.as_ref(), body.into_submission()?).await?;
  Ok((StatusCode::CREATED, Json(receipt)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default, deserialize_with = "empty_as_none")]
  pub survey_id:   Option<SurveyId>,
  #[serde(default, deserialize_with = "empty_as_none")]
  pub country_id:  Option<CountryId>,
  #[serde(default, deserialize_with = "empty_as_none")]
  pub company_id:  Option<CompanyId>,
  #[serde(default, deserialize_with = "empty_as_none")]
  pub location_id: Option<LocationId>,
}

impl From<ListParams> for ResponseFilter {
  fn from(p: ListParams) -> Self {
    Self {
      survey_id:   p.survey_id,
      country_id:  p.country_id,
      company_id:  p.company_id,
      location_id: p.location_id,
    }
  }
}

/// `GET /responses[?survey_id=..][&country_id=..][&company_id=..][&location_id=..]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ResponseSummary>>, ApiError>
where
  S: SurveyStore,
{
  let Query(params) = params.map_err(bad_query)?;
  let responses = store
    .list_responses(params.into())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(responses))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /responses/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<ResponseId>, PathRejection>,
) -> Result<Json<ResponseDetail>, ApiError>
where
  S: SurveyStore,
{
  let Path(id) = id.map_err(bad_path)?;
  let detail = store
    .get_response(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("response {id} not found")))?;
  Ok(Json(detail))
}

// ─── Export ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportParams {
  #[serde(default, deserialize_with = "empty_as_none")]
  pub survey_id: Option<SurveyId>,
}

/// `GET /responses/export/csv?survey_id=..`
pub async fn export_csv<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<ExportParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SurveyStore,
{
  let Query(params) = params.map_err(bad_query)?;
  let survey_id = params
    .survey_id
    .ok_or_else(|| ApiError::BadRequest("survey_id is required".into()))?;

  let details = store
    .export_responses(survey_id)
    .await
    .map_err(ApiError::store)?;
  let rows = survey_csv::flatten(&details);
  if rows.is_empty() {
    return Err(ApiError::NotFound(format!("no responses found for survey {survey_id}")));
  }

  let csv = survey_csv::to_csv(&rows).map_err(|e| ApiError::Store(Box::new(e)))?;
  tracing::info!(survey_id, responses = details.len(), rows = rows.len(), "exported responses");

  let filename = format!(
    "survey_responses_{survey_id}_{}.csv",
    Utc::now().timestamp_millis()
  );
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ],
    csv,
  ))
}
