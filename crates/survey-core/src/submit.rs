//! The submission path: look up, validate, then write atomically.
//!
//! Nothing is written until every check has passed, so a rejected submission
//! needs no compensation. Write failures are left to the store's transaction
//! rollback.

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  error::ValidationError,
  fingerprint::fingerprint,
  hierarchy::check_chain,
  response::{IdempotencyKey, Insertion, NewResponse, SubmitReceipt, Submission},
  store::SurveyStore,
  validate::validate,
};

/// Validate `submission` and persist it through `store`.
///
/// # Errors
///
/// - [`Error::NotFound`] if the survey, country, company or location does
///   not exist;
/// - [`Error::Validation`] if the survey is inactive, the hierarchy is
///   inconsistent, or the answers fail [`validate`];
/// - [`Error::IdempotencyConflict`] if the idempotency key was used with a
///   different payload;
/// - [`Error::Storage`] if the store fails; nothing was committed.
pub async fn submit<S: SurveyStore>(
  store: &S,
  submission: Submission,
) -> Result<SubmitReceipt> {
  let result = check_and_write(store, submission.clone()).await;
  match &result {
    Ok(receipt) => info!(
      survey_id = submission.survey_id,
      response_id = receipt.response_id,
      replayed = receipt.replayed,
      answers = submission.answers.len(),
      "survey response accepted"
    ),
    Err(Error::Storage { kind, source }) => warn!(
      survey_id = submission.survey_id,
      ?kind,
      error = %source,
      "survey response not stored"
    ),
    Err(e) => debug!(survey_id = submission.survey_id, error = %e, "survey response rejected"),
  }
  result
}

async fn check_and_write<S: SurveyStore>(
  store: &S,
  submission: Submission,
) -> Result<SubmitReceipt> {
  let Submission {
    survey_id,
    country_id,
    company_id,
    location_id,
    answers,
    idempotency_key,
  } = submission;

  let survey = store
    .get_survey(survey_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::NotFound(format!("survey {survey_id}")))?;
  if !survey.survey.is_active {
    return Err(ValidationError::SurveyInactive(survey_id).into());
  }

  let country = store
    .get_country(country_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::NotFound(format!("country {country_id}")))?;
  let company = store
    .get_company(company_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::NotFound(format!("company {company_id}")))?;
  let location = store
    .get_location(location_id)
    .await
    .map_err(Error::storage)?
    .ok_or_else(|| Error::NotFound(format!("location {location_id}")))?;
  check_chain(&country, &company, &location).map_err(ValidationError::HierarchyMismatch)?;

  let answers = validate(&survey, &answers)?;

  let idempotency = idempotency_key.map(|key| IdempotencyKey {
    key,
    fingerprint: fingerprint(survey_id, country_id, company_id, location_id, &answers),
  });

  let insertion = store
    .insert_response(NewResponse {
      survey_id,
      country_id,
      company_id,
      location_id,
      answers,
      idempotency,
    })
    .await
    .map_err(Error::storage)?;

  match insertion {
    Insertion::Created(response_id) => Ok(SubmitReceipt { response_id, replayed: false }),
    Insertion::Replayed(response_id) => Ok(SubmitReceipt { response_id, replayed: true }),
    Insertion::FingerprintMismatch => {
      Err(Error::IdempotencyConflict(idempotency_key.unwrap_or_default()))
    }
  }
}
