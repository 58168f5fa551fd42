//! Flat CSV export of survey responses.
//!
//! Turns [`ResponseDetail`]s into one row per answer and writes them as
//! RFC 4180 CSV. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use survey_csv::{flatten, to_csv};
//! use survey_core::response::ResponseDetail;
//!
//! let details: Vec<ResponseDetail> = Vec::new(); // from SurveyStore::export_responses
//! let csv = to_csv(&flatten(&details)).unwrap();
//! assert!(csv.starts_with("response_id,"));
//! ```

pub mod error;
mod write;

use chrono::{DateTime, SecondsFormat, Utc};
use survey_core::response::{ResponseDetail, ResponseId};

pub use error::{Error, Result};
pub use write::{HEADER, to_csv, write_csv};

/// One exported line: a single answer with its response's context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
  pub response_id:   ResponseId,
  pub survey_title:  String,
  pub country:       String,
  pub company:       String,
  pub location:      String,
  pub submitted_at:  DateTime<Utc>,
  pub question_text: String,
  pub answer_value:  String,
}

impl ExportRow {
  /// Field values in [`HEADER`] order.
  pub fn fields(&self) -> [String; 8] {
    [
      self.response_id.to_string(),
      self.survey_title.clone(),
      self.country.clone(),
      self.company.clone(),
      self.location.clone(),
      self.submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
      self.question_text.clone(),
      self.answer_value.clone(),
    ]
  }
}

/// One row per `(response, answer)` pair, keeping the order of `details`
/// and of each response's answers.
pub fn flatten(details: &[ResponseDetail]) -> Vec<ExportRow> {
  details
    .iter()
    .flat_map(|d| {
      let s = &d.summary;
      d.answers.iter().map(move |a| ExportRow {
        response_id:   s.id,
        survey_title:  s.survey_title.clone(),
        country:       s.country_name.clone(),
        company:       s.company_name.clone(),
        location:      s.location_name.clone(),
        submitted_at:  s.submitted_at,
        question_text: a.question_text.clone(),
        answer_value:  a.answer_value.clone(),
      })
    })
    .collect()
}

// ─── Shared test helpers ──────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_helpers {
  use chrono::{TimeZone, Utc};
  use survey_core::response::{AnswerView, ResponseDetail, ResponseSummary};

  /// A response at `company` with one answer per `(question_text, value)`.
  pub(crate) fn detail(id: i64, company: &str, answers: &[(&str, &str)]) -> ResponseDetail {
    ResponseDetail {
      summary: ResponseSummary {
        id,
        survey_id: 1,
        survey_title: "Satisfaction".into(),
        country_id: 1,
        country_name: "Guatemala".into(),
        company_id: 1,
        company_name: company.into(),
        location_id: 1,
        location_name: "Zona 10".into(),
        submitted_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
      },
      answers: answers
        .iter()
        .enumerate()
        .map(|(i, (text, value))| AnswerView {
          id:            id * 100 + i as i64,
          question_id:   i as i64 + 1,
          question_text: text.to_string(),
          question_type: "text".into(),
          answer_value:  value.to_string(),
        })
        .collect(),
    }
  }
}
