//! The `SurveyStore` trait.
//!
//! Implemented by storage backends (e.g. `survey-store-sqlite`). The
//! submission path and the HTTP layer depend on this abstraction, not on any
//! concrete backend; a store handle is passed explicitly to whoever needs it.

use std::future::Future;

use crate::{
  error::StorageFault,
  hierarchy::{Company, CompanyId, Country, CountryId, Location, LocationId},
  response::{Insertion, NewResponse, ResponseDetail, ResponseFilter, ResponseId, ResponseSummary},
  survey::{Survey, SurveyId, SurveyWithQuestions},
};

/// Abstraction over a survey store backend.
///
/// Responses are append-only: the only write is [`SurveyStore::insert_response`].
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded runtime.
pub trait SurveyStore: Send + Sync {
  type Error: StorageFault;

  // ── Reference data ────────────────────────────────────────────────────

  /// All countries, by name.
  fn list_countries(
    &self,
  ) -> impl Future<Output = Result<Vec<Country>, Self::Error>> + Send + '_;

  fn get_country(
    &self,
    id: CountryId,
  ) -> impl Future<Output = Result<Option<Country>, Self::Error>> + Send + '_;

  /// Companies by name, optionally restricted to one country.
  fn list_companies(
    &self,
    country_id: Option<CountryId>,
  ) -> impl Future<Output = Result<Vec<Company>, Self::Error>> + Send + '_;

  fn get_company(
    &self,
    id: CompanyId,
  ) -> impl Future<Output = Result<Option<Company>, Self::Error>> + Send + '_;

  /// Locations by name, optionally restricted to one company.
  fn list_locations(
    &self,
    company_id: Option<CompanyId>,
  ) -> impl Future<Output = Result<Vec<Location>, Self::Error>> + Send + '_;

  fn get_location(
    &self,
    id: LocationId,
  ) -> impl Future<Output = Result<Option<Location>, Self::Error>> + Send + '_;

  /// Active surveys, newest first.
  fn list_surveys(
    &self,
  ) -> impl Future<Output = Result<Vec<Survey>, Self::Error>> + Send + '_;

  /// A survey with its questions ordered by `order_index`.
  fn get_survey(
    &self,
    id: SurveyId,
  ) -> impl Future<Output = Result<Option<SurveyWithQuestions>, Self::Error>> + Send + '_;

  // ── Responses — append-only write ─────────────────────────────────────

  /// Atomically persist one response and all of its answers.
  ///
  /// Either every row becomes visible or none does. When `input.idempotency`
  /// is set and the key was seen before, nothing is written and the outcome
  /// says whether the earlier payload matched.
  fn insert_response(
    &self,
    input: NewResponse,
  ) -> impl Future<Output = Result<Insertion, Self::Error>> + Send + '_;

  // ── Responses — reads ─────────────────────────────────────────────────

  /// Responses matching `filter`, most recent first (ties broken by id,
  /// descending).
  fn list_responses(
    &self,
    filter: ResponseFilter,
  ) -> impl Future<Output = Result<Vec<ResponseSummary>, Self::Error>> + Send + '_;

  /// One response with its answers. Returns `None` if not found.
  fn get_response(
    &self,
    id: ResponseId,
  ) -> impl Future<Output = Result<Option<ResponseDetail>, Self::Error>> + Send + '_;

  /// Every response of a survey with its answers, in export order: most
  /// recent response first, answers by `order_index`.
  fn export_responses(
    &self,
    survey_id: SurveyId,
  ) -> impl Future<Output = Result<Vec<ResponseDetail>, Self::Error>> + Send + '_;
}
