//! Out-of-band provisioning of reference data.
//!
//! Not part of [`survey_core::store::SurveyStore`]: the submission and
//! reporting paths only ever read reference data. These helpers back the demo
//! seed, administrative tooling and tests.

use rusqlite::OptionalExtension as _;
use survey_core::{
  hierarchy::{Company, CompanyId, Country, CountryId, Location},
  store::SurveyStore,
  survey::{NewSurvey, SurveyWithQuestions},
};

use crate::{
  Error, Result, SqliteStore,
  encode::encode_kind,
  schema::DEMO_DATA,
};

impl SqliteStore {
  pub async fn add_country(
    &self,
    name: impl Into<String>,
    code: impl Into<String>,
  ) -> Result<Country> {
    let (name, code) = (name.into(), code.into());
    let (name_c, code_c) = (name.clone(), code.clone());
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO countries (name, code) VALUES (?1, ?2)",
          rusqlite::params![name_c, code_c],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(Country { id, name, code })
  }

  pub async fn add_company(
    &self,
    name: impl Into<String>,
    country_id: CountryId,
  ) -> Result<Company> {
    let name = name.into();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO companies (name, country_id) VALUES (?1, ?2)",
          rusqlite::params![name, country_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    self
      .get_company(id)
      .await?
      .ok_or_else(|| Error::Core(survey_core::Error::NotFound(format!("company {id}"))))
  }

  pub async fn add_location(
    &self,
    name: impl Into<String>,
    address: Option<String>,
    company_id: CompanyId,
  ) -> Result<Location> {
    let name = name.into();
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO locations (name, address, company_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, address, company_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    self
      .get_location(id)
      .await?
      .ok_or_else(|| Error::Core(survey_core::Error::NotFound(format!("location {id}"))))
  }

  /// Insert a survey and all its questions in one transaction.
  pub async fn add_survey(&self, input: NewSurvey) -> Result<SurveyWithQuestions> {
    let questions: Vec<_> = input
      .questions
      .iter()
      .map(|q| {
        let (question_type, options) = encode_kind(&q.kind);
        (q.question_text.clone(), question_type, options, q.order_index, q.is_required)
      })
      .collect();
    let NewSurvey { title, description, is_active, .. } = input;

    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO surveys (title, description, is_active) VALUES (?1, ?2, ?3)",
          rusqlite::params![title, description, is_active],
        )?;
        let survey_id = tx.last_insert_rowid();
        {
          let mut stmt = tx.prepare(
            "INSERT INTO questions (
               survey_id, question_text, question_type, options, order_index, is_required
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          )?;
          for (text, question_type, options, order_index, is_required) in &questions {
            stmt.execute(rusqlite::params![
              survey_id,
              text,
              question_type,
              options,
              order_index,
              is_required,
            ])?;
          }
        }
        tx.commit()?;
        Ok(survey_id)
      })
      .await?;

    self
      .get_survey(id)
      .await?
      .ok_or_else(|| Error::Core(survey_core::Error::NotFound(format!("survey {id}"))))
  }

  /// Load the demo reference data and satisfaction survey into an empty
  /// database. Returns `false` without touching anything if countries or
  /// surveys already exist.
  pub async fn seed_demo(&self) -> Result<bool> {
    let seeded = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        let existing: Option<i64> = tx
          .query_row(
            "SELECT 1 FROM countries UNION ALL SELECT 1 FROM surveys LIMIT 1",
            [],
            |r| r.get(0),
          )
          .optional()?;
        if existing.is_some() {
          return Ok(false);
        }
        tx.execute_batch(DEMO_DATA)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;
    Ok(seeded)
  }
}
