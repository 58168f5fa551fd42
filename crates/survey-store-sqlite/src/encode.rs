//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (UTC, microseconds)
//! so that lexical order equals chronological order. Question options are
//! stored as compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use survey_core::{
  response::{AnswerView, ResponseSummary},
  survey::{Question, QuestionKind},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── QuestionKind ─────────────────────────────────────────────────────────────

/// Split a kind into its `(question_type, options)` columns.
pub fn encode_kind(kind: &QuestionKind) -> (&'static str, Option<String>) {
  (kind.discriminant(), kind.options().map(|v| v.to_string()))
}

pub fn decode_kind(question_type: &str, options: Option<&str>) -> Result<QuestionKind> {
  let options = options.map(serde_json::from_str).transpose()?;
  Ok(QuestionKind::from_parts(question_type, options)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every query that yields a [`ResponseSummary`].
/// Read back with [`RawSummary::from_row`] starting at column 0.
pub const SUMMARY_COLUMNS: &str = "
  sr.id, sr.survey_id, s.title,
  sr.country_id, co.name,
  sr.company_id, c.name,
  sr.location_id, l.name,
  sr.submitted_at";

/// Joins matching [`SUMMARY_COLUMNS`].
pub const SUMMARY_JOINS: &str = "
  FROM survey_responses sr
  INNER JOIN surveys   s  ON sr.survey_id   = s.id
  INNER JOIN countries co ON sr.country_id  = co.id
  INNER JOIN companies c  ON sr.company_id  = c.id
  INNER JOIN locations l  ON sr.location_id = l.id";

/// Number of columns in [`SUMMARY_COLUMNS`].
pub const SUMMARY_WIDTH: usize = 10;

/// A response summary as read from SQLite, timestamp still encoded.
pub struct RawSummary {
  pub id:            i64,
  pub survey_id:     i64,
  pub survey_title:  String,
  pub country_id:    i64,
  pub country_name:  String,
  pub company_id:    i64,
  pub company_name:  String,
  pub location_id:   i64,
  pub location_name: String,
  pub submitted_at:  String,
}

impl RawSummary {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      survey_id:     row.get(1)?,
      survey_title:  row.get(2)?,
      country_id:    row.get(3)?,
      country_name:  row.get(4)?,
      company_id:    row.get(5)?,
      company_name:  row.get(6)?,
      location_id:   row.get(7)?,
      location_name: row.get(8)?,
      submitted_at:  row.get(9)?,
    })
  }

  pub fn into_summary(self) -> Result<ResponseSummary> {
    Ok(ResponseSummary {
      id:            self.id,
      survey_id:     self.survey_id,
      survey_title:  self.survey_title,
      country_id:    self.country_id,
      country_name:  self.country_name,
      company_id:    self.company_id,
      company_name:  self.company_name,
      location_id:   self.location_id,
      location_name: self.location_name,
      submitted_at:  decode_dt(&self.submitted_at)?,
    })
  }
}

/// Columns of an answer joined with its question.
pub const ANSWER_COLUMNS: &str =
  "a.id, a.question_id, q.question_text, q.question_type, a.answer_value";

/// Read an [`AnswerView`] whose columns start at `offset`.
pub fn answer_from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<AnswerView> {
  Ok(AnswerView {
    id:            row.get(offset)?,
    question_id:   row.get(offset + 1)?,
    question_text: row.get(offset + 2)?,
    question_type: row.get(offset + 3)?,
    answer_value:  row.get(offset + 4)?,
  })
}

/// A `questions` row, kind still encoded.
pub struct RawQuestion {
  pub id:            i64,
  pub survey_id:     i64,
  pub question_text: String,
  pub question_type: String,
  pub options:       Option<String>,
  pub order_index:   i64,
  pub is_required:   bool,
}

impl RawQuestion {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      survey_id:     row.get(1)?,
      question_text: row.get(2)?,
      question_type: row.get(3)?,
      options:       row.get(4)?,
      order_index:   row.get(5)?,
      is_required:   row.get(6)?,
    })
  }

  pub fn into_question(self) -> Result<Question> {
    Ok(Question {
      id:            self.id,
      survey_id:     self.survey_id,
      kind:          decode_kind(&self.question_type, self.options.as_deref())?,
      question_text: self.question_text,
      order_index:   self.order_index,
      is_required:   self.is_required,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.timestamp_opt(1_700_000_000, 5_000).unwrap();
    let late = Utc.timestamp_opt(1_700_000_000, 120_000_000).unwrap();
    let (a, b) = (encode_dt(early), encode_dt(late));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&a).unwrap(), early);
  }

  #[test]
  fn kind_roundtrips_through_columns() {
    let kind = QuestionKind::MultipleChoice { choices: vec!["a".into(), "b".into()] };
    let (ty, options) = encode_kind(&kind);
    assert_eq!(decode_kind(ty, options.as_deref()).unwrap(), kind);

    let (ty, options) = encode_kind(&QuestionKind::YesNo);
    assert_eq!(options, None);
    assert_eq!(decode_kind(ty, None).unwrap(), QuestionKind::YesNo);
  }
}
