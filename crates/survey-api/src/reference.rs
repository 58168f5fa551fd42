//! Read-only handlers for reference data and survey definitions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/countries`, `/countries/:id` | |
//! | `GET`  | `/companies` | Optional `?country_id` |
//! | `GET`  | `/companies/:id` | |
//! | `GET`  | `/locations` | Optional `?company_id` |
//! | `GET`  | `/locations/:id` | |
//! | `GET`  | `/surveys` | Active surveys, newest first |
//! | `GET`  | `/surveys/:id` | Survey with its ordered questions |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{PathRejection, QueryRejection},
  },
};
use serde::Deserialize;
use survey_core::{
  hierarchy::{Company, CompanyId, Country, CountryId, Location, LocationId},
  store::SurveyStore,
  survey::{Survey, SurveyId, SurveyWithQuestions},
};

use crate::{
  error::ApiError,
  responses::{bad_path, bad_query, empty_as_none},
};

fn not_found(what: &str, id: i64) -> ApiError { ApiError::NotFound(format!("{what} {id} not found")) }

// ─── Countries ────────────────────────────────────────────────────────────────

/// `GET /countries`
pub async fn list_countries<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Country>>, ApiError>
where
  S: SurveyStore,
{
  Ok(Json(store.list_countries().await.map_err(ApiError::store)?))
}

/// `GET /countries/:id`
pub async fn get_country<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<CountryId>, PathRejection>,
) -> Result<Json<Country>, ApiError>
where
  S: SurveyStore,
{
  let Path(id) = id.map_err(bad_path)?;
  store
    .get_country(id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| not_found("country", id))
}

// ─── Companies ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CompanyParams {
  #[serde(default, deserialize_with = "empty_as_none")]
  pub country_id: Option<CountryId>,
}

/// `GET /companies[?country_id=..]`
pub async fn list_companies<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<CompanyParams>, QueryRejection>,
) -> Result<Json<Vec<Company>>, ApiError>
where
  S: SurveyStore,
{
  let Query(params) = params.map_err(bad_query)?;
  let companies = store
    .list_companies(params.country_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(companies))
}

/// `GET /companies/:id`
pub async fn get_company<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<CompanyId>, PathRejection>,
) -> Result<Json<Company>, ApiError>
where
  S: SurveyStore,
{
  let Path(id) = id.map_err(bad_path)?;
  store
    .get_company(id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| not_found("company", id))
}

// ─── Locations ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LocationParams {
  #[serde(default, deserialize_with = "empty_as_none")]
  pub company_id: Option<CompanyId>,
}

/// `GET /locations[?company_id=..]`
pub async fn list_locations<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<LocationParams>, QueryRejection>,
) -> Result<Json<Vec<Location>>, ApiError>
where
  S: SurveyStore,
{
  let Query(params) = params.map_err(bad_query)?;
  let locations = store
    .list_locations(params.company_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(locations))
}

/// `GET /locations/:id`
pub async fn get_location<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<LocationId>, PathRejection>,
) -> Result<Json<Location>, ApiError>
where
  S: SurveyStore,
{
  let Path(id) = id.map_err(bad_path)?;
  store
    .get_location(id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| not_found("location", id))
}

// ─── Surveys ──────────────────────────────────────────────────────────────────

/// `GET /surveys`
pub async fn list_surveys<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Survey>>, ApiError>
where
  S: SurveyStore,
{
  Ok(Json(store.list_surveys().await.map_err(ApiError::store)?))
}

/// `GET /surveys/:id`
pub async fn get_survey<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<SurveyId>, PathRejection>,
) -> Result<Json<SurveyWithQuestions>, ApiError>
where
  S: SurveyStore,
{
  let Path(id) = id.map_err(bad_path)?;
  store
    .get_survey(id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| not_found("survey", id))
}
