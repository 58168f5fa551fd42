//! Payload fingerprints for idempotent submission.
//!
//! A fingerprint is a SHA-256 hash over the survey/hierarchy ids and the
//! normalised answers. Answer order does not affect it.

use sha2::{Digest, Sha256};

use crate::response::ValidatedAnswer;

/// Compute the hex fingerprint of a validated submission payload.
pub fn fingerprint(
  survey_id: i64,
  country_id: i64,
  company_id: i64,
  location_id: i64,
  answers: &[ValidatedAnswer],
) -> String {
  let mut sorted: Vec<&ValidatedAnswer> = answers.iter().collect();
  sorted.sort_by_key(|a| a.question_id);

  let mut hasher = Sha256::new();
  for id in [survey_id, country_id, company_id, location_id] {
    hasher.update(id.to_le_bytes());
  }
  for answer in sorted {
    hasher.update(answer.question_id.to_le_bytes());
    // Length prefix keeps ("ab","c") and ("a","bc") apart.
    hasher.update((answer.answer_value.len() as u64).to_le_bytes());
    hasher.update(answer.answer_value.as_bytes());
  }
  hex::encode(hasher.finalize())
}
