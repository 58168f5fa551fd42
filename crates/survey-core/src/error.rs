//! Error types for `survey-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::survey::QuestionId;

/// A caller-fixable problem with a submission. Never retried, never partially
/// applied: validation completes before the first write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("answers must be a non-empty array")]
  EmptyAnswers,

  #[error("question {0} was answered more than once")]
  DuplicateAnswer(QuestionId),

  #[error("required question {0} has no answer")]
  MissingRequired(QuestionId),

  #[error("question {0} does not belong to this survey")]
  UnknownQuestion(QuestionId),

  #[error("invalid value for {question_type} question {question_id}: {reason}")]
  InvalidValue {
    question_id:   QuestionId,
    question_type: &'static str,
    reason:        String,
  },

  #[error("survey {0} is not accepting responses")]
  SurveyInactive(i64),

  #[error("{0}")]
  HierarchyMismatch(String),
}

impl ValidationError {
  /// Stable machine-readable code, exposed in API error bodies.
  pub fn code(&self) -> &'static str {
    match self {
      Self::EmptyAnswers => "empty_answers",
      Self::DuplicateAnswer(_) => "duplicate_answer",
      Self::MissingRequired(_) => "missing_required",
      Self::UnknownQuestion(_) => "unknown_question",
      Self::InvalidValue { .. } => "invalid_value",
      Self::SurveyInactive(_) => "survey_inactive",
      Self::HierarchyMismatch(_) => "hierarchy_mismatch",
    }
  }

  /// The question the error refers to, if any.
  pub fn question_id(&self) -> Option<QuestionId> {
    match self {
      Self::DuplicateAnswer(id)
      | Self::MissingRequired(id)
      | Self::UnknownQuestion(id) => Some(*id),
      Self::InvalidValue { question_id, .. } => Some(*question_id),
      _ => None,
    }
  }
}

/// Coarse classification of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
  /// A foreign-key, unique or check constraint rejected the write. Indicates
  /// a dangling reference or a race with reference-data changes; not retried.
  ConstraintViolation,
  /// The backend could not be reached or is busy. The write did not commit
  /// and may be retried with the identical payload.
  Unavailable,
  /// Anything else, e.g. a row that no longer decodes.
  Internal,
}

/// Implemented by storage backend error types so the submission path can
/// classify failures without knowing the backend.
pub trait StorageFault: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StorageErrorKind;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed: {0}")]
  Validation(#[from] ValidationError),

  #[error("{0} not found")]
  NotFound(String),

  #[error("idempotency key {0} was already used with a different payload")]
  IdempotencyConflict(Uuid),

  #[error("unknown question type: {0:?}")]
  UnknownQuestionType(String),

  #[error("invalid options for {question_type} question: {reason}")]
  InvalidOptions {
    question_type: &'static str,
    reason:        String,
  },

  #[error("storage error: {source}")]
  Storage {
    kind:   StorageErrorKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend error, keeping its classification.
  pub fn storage<E: StorageFault>(e: E) -> Self {
    Self::Storage { kind: e.kind(), source: Box::new(e) }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
