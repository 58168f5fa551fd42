//! Surveys and their questions.
//!
//! The question type is a closed enum: every variant carries its own typed
//! options and knows how to normalise an answer value. Unknown type strings
//! are rejected at decode time rather than silently accepted.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{Error, Result};

pub type SurveyId = i64;
pub type QuestionId = i64;

/// Canonical affirmative value of a yes/no question.
pub const YES: &str = "Sí";
/// Canonical negative value of a yes/no question.
pub const NO: &str = "No";

const DEFAULT_RATING_MIN: i64 = 1;
const DEFAULT_RATING_MAX: i64 = 5;

// ─── Survey ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
  pub id:          SurveyId,
  pub title:       String,
  pub description: Option<String>,
  pub is_active:   bool,
}

/// A survey together with its questions, sorted by `order_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyWithQuestions {
  #[serde(flatten)]
  pub survey:    Survey,
  pub questions: Vec<Question>,
}

impl SurveyWithQuestions {
  pub fn question(&self, id: QuestionId) -> Option<&Question> {
    self.questions.iter().find(|q| q.id == id)
  }
}

// ─── QuestionKind ────────────────────────────────────────────────────────────

/// The answer type of a question, with its type-specific options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
  /// Integer rating, bounds inclusive.
  Rating { min: i64, max: i64 },
  /// Free text.
  Text,
  /// One of [`YES`] / [`NO`].
  YesNo,
  /// One of a fixed set of choices.
  MultipleChoice { choices: Vec<String> },
}

#[derive(Deserialize)]
struct RatingOptions {
  #[serde(default = "default_min")]
  min: i64,
  #[serde(default = "default_max")]
  max: i64,
}

fn default_min() -> i64 { DEFAULT_RATING_MIN }

fn default_max() -> i64 { DEFAULT_RATING_MAX }

#[derive(Deserialize)]
#[serde(untagged)]
enum ChoiceOptions {
  Object { choices: Vec<String> },
  List(Vec<String>),
}

impl QuestionKind {
  /// The discriminant stored in the `question_type` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Rating { .. } => "rating",
      Self::Text => "text",
      Self::YesNo => "yes_no",
      Self::MultipleChoice { .. } => "multiple_choice",
    }
  }

  /// The options payload stored alongside the discriminant.
  pub fn options(&self) -> Option<Value> {
    match self {
      Self::Rating { min, max } => Some(json!({ "min": min, "max": max })),
      Self::Text | Self::YesNo => None,
      Self::MultipleChoice { choices } => Some(json!({ "choices": choices })),
    }
  }

  /// Rebuild a kind from its discriminant and options payload.
  pub fn from_parts(discriminant: &str, options: Option<Value>) -> Result<Self> {
    let options = options.filter(|v| !v.is_null());
    match discriminant {
      "rating" => {
        let RatingOptions { min, max } = match options {
          Some(v) => serde_json::from_value(v)?,
          None => RatingOptions { min: DEFAULT_RATING_MIN, max: DEFAULT_RATING_MAX },
        };
        if min > max {
          return Err(Error::InvalidOptions {
            question_type: "rating",
            reason:        format!("min {min} is greater than max {max}"),
          });
        }
        Ok(Self::Rating { min, max })
      }
      "text" => Ok(Self::Text),
      "yes_no" => Ok(Self::YesNo),
      "multiple_choice" => {
        let choices = match options {
          Some(v) => match serde_json::from_value(v)? {
            ChoiceOptions::Object { choices } | ChoiceOptions::List(choices) => choices,
          },
          None => Vec::new(),
        };
        if choices.is_empty() {
          return Err(Error::InvalidOptions {
            question_type: "multiple_choice",
            reason:        "no choices configured".to_owned(),
          });
        }
        Ok(Self::MultipleChoice { choices })
      }
      other => Err(Error::UnknownQuestionType(other.to_owned())),
    }
  }

  /// Check `raw` against this kind and return its canonical text encoding,
  /// or a reason for rejecting it.
  ///
  /// `raw` has already been trimmed by the caller.
  pub fn normalize(&self, raw: &str) -> std::result::Result<String, String> {
    match self {
      Self::Rating { min, max } => {
        let n: i64 = raw
          .parse()
          .map_err(|_| format!("{raw:?} is not an integer"))?;
        if n < *min || n > *max {
          return Err(format!("{n} is outside {min}..={max}"));
        }
        Ok(n.to_string())
      }
      Self::Text => Ok(raw.to_owned()),
      Self::YesNo => match raw.to_lowercase().as_str() {
        "sí" | "si" => Ok(YES.to_owned()),
        "no" => Ok(NO.to_owned()),
        _ => Err(format!("{raw:?} is not one of {YES:?}, {NO:?}")),
      },
      Self::MultipleChoice { choices } => choices
        .iter()
        .find(|c| c.as_str() == raw)
        .cloned()
        .ok_or_else(|| format!("{raw:?} is not one of the configured choices")),
    }
  }
}

// ─── Question ────────────────────────────────────────────────────────────────

/// A question of a survey. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "QuestionWire", try_from = "QuestionWire")]
pub struct Question {
  pub id:            QuestionId,
  pub survey_id:     SurveyId,
  pub question_text: String,
  pub kind:          QuestionKind,
  /// Display and processing order; unique within a survey.
  pub order_index:   i64,
  pub is_required:   bool,
}

/// JSON shape of a [`Question`]: the kind is split into `question_type` and
/// `options`, as in the database.
#[derive(Serialize, Deserialize)]
struct QuestionWire {
  id:            QuestionId,
  survey_id:     SurveyId,
  question_text: String,
  question_type: String,
  options:       Option<Value>,
  order_index:   i64,
  is_required:   bool,
}

impl From<Question> for QuestionWire {
  fn from(q: Question) -> Self {
    Self {
      id:            q.id,
      survey_id:     q.survey_id,
      question_text: q.question_text,
      question_type: q.kind.discriminant().to_owned(),
      options:       q.kind.options(),
      order_index:   q.order_index,
      is_required:   q.is_required,
    }
  }
}

impl TryFrom<QuestionWire> for Question {
  type Error = Error;

  fn try_from(w: QuestionWire) -> Result<Self> {
    Ok(Self {
      id:            w.id,
      survey_id:     w.survey_id,
      question_text: w.question_text,
      kind:          QuestionKind::from_parts(&w.question_type, w.options)?,
      order_index:   w.order_index,
      is_required:   w.is_required,
    })
  }
}

// ─── Provisioning input ──────────────────────────────────────────────────────

/// Input for provisioning a survey with its questions.
#[derive(Debug, Clone)]
pub struct NewSurvey {
  pub title:       String,
  pub description: Option<String>,
  pub is_active:   bool,
  pub questions:   Vec<NewQuestion>,
}

#[derive(Debug, Clone)]
pub struct NewQuestion {
  pub question_text: String,
  pub kind:          QuestionKind,
  pub order_index:   i64,
  pub is_required:   bool,
}

impl NewQuestion {
  pub fn new(
    question_text: impl Into<String>,
    kind: QuestionKind,
    order_index: i64,
    is_required: bool,
  ) -> Self {
    Self { question_text: question_text.into(), kind, order_index, is_required }
  }
}
