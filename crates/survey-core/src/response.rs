//! Survey responses and their answers.
//!
//! A response is one completed submission event. Responses and answers are
//! append-only: created together once, never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  hierarchy::{CompanyId, CountryId, LocationId},
  survey::{QuestionId, SurveyId},
};

pub type ResponseId = i64;

// ─── Write side ──────────────────────────────────────────────────────────────

/// One `(question_id, answer_value)` pair as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAnswer {
  pub question_id:  QuestionId,
  pub answer_value: String,
}

impl CandidateAnswer {
  pub fn new(question_id: QuestionId, answer_value: impl Into<String>) -> Self {
    Self { question_id, answer_value: answer_value.into() }
  }
}

/// An answer that passed validation; `answer_value` is in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAnswer {
  pub question_id:  QuestionId,
  pub answer_value: String,
}

/// Input to [`crate::submit::submit`].
#[derive(Debug, Clone)]
pub struct Submission {
  pub survey_id:       SurveyId,
  pub country_id:      CountryId,
  pub company_id:      CompanyId,
  pub location_id:     LocationId,
  pub answers:         Vec<CandidateAnswer>,
  /// Client-supplied token making retries of the same submission safe.
  pub idempotency_key: Option<Uuid>,
}

/// An idempotency key with the fingerprint of the payload it was first used
/// with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyKey {
  pub key:         Uuid,
  pub fingerprint: String,
}

/// Input to [`crate::store::SurveyStore::insert_response`]. The answers have
/// already been validated; `submitted_at` is always set by the store.
#[derive(Debug, Clone)]
pub struct NewResponse {
  pub survey_id:   SurveyId,
  pub country_id:  CountryId,
  pub company_id:  CompanyId,
  pub location_id: LocationId,
  pub answers:     Vec<ValidatedAnswer>,
  pub idempotency: Option<IdempotencyKey>,
}

/// Outcome of an atomic response insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
  /// A new response and all its answers were committed.
  Created(ResponseId),
  /// The idempotency key was already used with the same payload; nothing was
  /// written and the original response id is returned.
  Replayed(ResponseId),
  /// The idempotency key was already used with a different payload; nothing
  /// was written.
  FingerprintMismatch,
}

/// Acknowledgment returned to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
  pub response_id: ResponseId,
  /// `true` when an earlier submission with the same idempotency key was
  /// returned instead of writing a new one.
  pub replayed:    bool,
}

// ─── Read side ───────────────────────────────────────────────────────────────

/// Filters for [`crate::store::SurveyStore::list_responses`]. Each field is
/// independently optional; present fields are combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFilter {
  pub survey_id:   Option<SurveyId>,
  pub country_id:  Option<CountryId>,
  pub company_id:  Option<CompanyId>,
  pub location_id: Option<LocationId>,
}

/// A response joined with its survey title and hierarchy names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseSummary {
  pub id:            ResponseId,
  pub survey_id:     SurveyId,
  pub survey_title:  String,
  pub country_id:    CountryId,
  pub country_name:  String,
  pub company_id:    CompanyId,
  pub company_name:  String,
  pub location_id:   LocationId,
  pub location_name: String,
  /// Server-assigned; never changes after creation.
  pub submitted_at:  DateTime<Utc>,
}

/// One answer joined with its question's text and type, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerView {
  pub id:            i64,
  pub question_id:   QuestionId,
  pub question_text: String,
  pub question_type: String,
  pub answer_value:  String,
}

/// A response summary with its answers ordered by the questions'
/// `order_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDetail {
  #[serde(flatten)]
  pub summary: ResponseSummary,
  pub answers: Vec<AnswerView>,
}
