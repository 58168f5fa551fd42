//! [`SqliteStore`] — the SQLite implementation of [`SurveyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use survey_core::{
  hierarchy::{Company, CompanyId, Country, CountryId, Location, LocationId},
  response::{
    AnswerView, Insertion, NewResponse, ResponseDetail, ResponseFilter, ResponseId,
    ResponseSummary,
  },
  store::SurveyStore,
  survey::{Survey, SurveyId, SurveyWithQuestions},
};

use crate::{
  Result,
  encode::{
    ANSWER_COLUMNS, RawQuestion, RawSummary, SUMMARY_COLUMNS, SUMMARY_JOINS, SUMMARY_WIDTH,
    answer_from_row, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A survey store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls
/// are serialised on the connection's thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn country_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Country> {
  Ok(Country { id: row.get(0)?, name: row.get(1)?, code: row.get(2)? })
}

fn company_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
  Ok(Company {
    id:           row.get(0)?,
    name:         row.get(1)?,
    country_id:   row.get(2)?,
    country_name: row.get(3)?,
  })
}

fn location_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
  Ok(Location {
    id:           row.get(0)?,
    name:         row.get(1)?,
    address:      row.get(2)?,
    company_id:   row.get(3)?,
    company_name: row.get(4)?,
  })
}

fn survey_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Survey> {
  Ok(Survey {
    id:          row.get(0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
    is_active:   row.get(3)?,
  })
}

const COMPANY_SELECT: &str = "
  SELECT c.id, c.name, c.country_id, co.name
  FROM companies c
  INNER JOIN countries co ON c.country_id = co.id";

const LOCATION_SELECT: &str = "
  SELECT l.id, l.name, l.address, l.company_id, c.name
  FROM locations l
  INNER JOIN companies c ON l.company_id = c.id";

/// Group joined `(summary, answer)` rows into details. Rows of one response
/// must be adjacent.
fn group_details(rows: Vec<(RawSummary, AnswerView)>) -> Result<Vec<ResponseDetail>> {
  let mut details: Vec<ResponseDetail> = Vec::new();
  for (raw, answer) in rows {
    match details.last_mut() {
      Some(last) if last.summary.id == raw.id => last.answers.push(answer),
      _ => details.push(ResponseDetail {
        summary: raw.into_summary()?,
        answers: vec![answer],
      }),
    }
  }
  Ok(details)
}

// ─── SurveyStore impl ────────────────────────────────────────────────────────

impl SurveyStore for SqliteStore {
  type Error = crate::Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn list_countries(&self) -> Result<Vec<Country>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare("SELECT id, name, code FROM countries ORDER BY name")?;
          let rows = stmt
            .query_map([], country_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_country(&self, id: CountryId) -> Result<Option<Country>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              "SELECT id, name, code FROM countries WHERE id = ?1",
              rusqlite::params![id],
              country_from_row,
            )
            .optional()?)
        })
        .await?,
    )
  }

  async fn list_companies(&self, country_id: Option<CountryId>) -> Result<Vec<Company>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let sql = format!(
            "{COMPANY_SELECT}
             WHERE ?1 IS NULL OR c.country_id = ?1
             ORDER BY c.name, c.id"
          );
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params![country_id], company_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_company(&self, id: CompanyId) -> Result<Option<Company>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let sql = format!("{COMPANY_SELECT} WHERE c.id = ?1");
          Ok(conn
            .query_row(&sql, rusqlite::params![id], company_from_row)
            .optional()?)
        })
        .await?,
    )
  }

  async fn list_locations(&self, company_id: Option<CompanyId>) -> Result<Vec<Location>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let sql = format!(
            "{LOCATION_SELECT}
             WHERE ?1 IS NULL OR l.company_id = ?1
             ORDER BY l.name, l.id"
          );
          let mut stmt = conn.prepare(&sql)?;
          let rows = stmt
            .query_map(rusqlite::params![company_id], location_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_location(&self, id: LocationId) -> Result<Option<Location>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let sql = format!("{LOCATION_SELECT} WHERE l.id = ?1");
          Ok(conn
            .query_row(&sql, rusqlite::params![id], location_from_row)
            .optional()?)
        })
        .await?,
    )
  }

  async fn list_surveys(&self) -> Result<Vec<Survey>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT id, title, description, is_active FROM surveys
             WHERE is_active = 1
             ORDER BY created_at DESC, id DESC",
          )?;
          let rows = stmt
            .query_map([], survey_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn get_survey(&self, id: SurveyId) -> Result<Option<SurveyWithQuestions>> {
    let found: Option<(Survey, Vec<RawQuestion>)> = self
      .conn
      .call(move |conn| {
        let survey = conn
          .query_row(
            "SELECT id, title, description, is_active FROM surveys WHERE id = ?1",
            rusqlite::params![id],
            survey_from_row,
          )
          .optional()?;
        let Some(survey) = survey else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT id, survey_id, question_text, question_type, options, order_index, is_required
           FROM questions
           WHERE survey_id = ?1
           ORDER BY order_index",
        )?;
        let questions = stmt
          .query_map(rusqlite::params![id], RawQuestion::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some((survey, questions)))
      })
      .await?;

    found
      .map(|(survey, raws)| {
        let questions = raws
          .into_iter()
          .map(RawQuestion::into_question)
          .collect::<Result<_>>()?;
        Ok(SurveyWithQuestions { survey, questions })
      })
      .transpose()
  }

  // ── Responses — append-only write ─────────────────────────────────────────

  async fn insert_response(&self, input: NewResponse) -> Result<Insertion> {
    let idempotency = input
      .idempotency
      .as_ref()
      .map(|k| (encode_uuid(k.key), k.fingerprint.clone()));

    // The whole sequence runs inside one closure on the connection thread:
    // it completes (commit or rollback) even if the awaiting task is dropped.
    let insertion = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some((key, fingerprint)) = &idempotency {
          let seen: Option<(i64, String)> = tx
            .query_row(
              "SELECT id, payload_fingerprint FROM survey_responses
               WHERE idempotency_key = ?1",
              rusqlite::params![key],
              |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
          if let Some((id, seen_fingerprint)) = seen {
            // Nothing written; dropping `tx` rolls back.
            return Ok(if &seen_fingerprint == fingerprint {
              Insertion::Replayed(id)
            } else {
              Insertion::FingerprintMismatch
            });
          }
        }

        let (key, fingerprint) = idempotency.unzip();
        // Stamped on the connection thread so commit order and time order agree.
        let submitted_at = encode_dt(Utc::now());
        tx.execute(
          "INSERT INTO survey_responses (
             survey_id, country_id, company_id, location_id,
             submitted_at, idempotency_key, payload_fingerprint
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.survey_id,
            input.country_id,
            input.company_id,
            input.location_id,
            submitted_at,
            key,
            fingerprint,
          ],
        )?;
        let response_id = tx.last_insert_rowid();

        {
          let mut stmt = tx.prepare(
            "INSERT INTO answers (response_id, question_id, answer_value)
             VALUES (?1, ?2, ?3)",
          )?;
          for answer in &input.answers {
            stmt.execute(rusqlite::params![
              response_id,
              answer.question_id,
              answer.answer_value,
            ])?;
          }
        }

        tx.commit()?;
        Ok(Insertion::Created(response_id))
      })
      .await?;

    Ok(insertion)
  }

  // ── Responses — reads ─────────────────────────────────────────────────────

  async fn list_responses(&self, filter: ResponseFilter) -> Result<Vec<ResponseSummary>> {
    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        // Build WHERE clause dynamically; placeholders are numbered in the
        // order their values are pushed.
        let mut conds: Vec<String> = Vec::new();
        let mut args: Vec<i64> = Vec::new();
        for (column, value) in [
          ("sr.survey_id", filter.survey_id),
          ("sr.country_id", filter.country_id),
          ("sr.company_id", filter.company_id),
          ("sr.location_id", filter.location_id),
        ] {
          if let Some(v) = value {
            args.push(v);
            conds.push(format!("{column} = ?{}", args.len()));
          }
        }

        let where_clause = if conds.is_empty() {
          String::new()
        } else {
          format!("WHERE {}", conds.join(" AND "))
        };

        let sql = format!(
          "SELECT {SUMMARY_COLUMNS}
           {SUMMARY_JOINS}
           {where_clause}
           ORDER BY sr.submitted_at DESC, sr.id DESC"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args), RawSummary::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::into_summary).collect()
  }

  async fn get_response(&self, id: ResponseId) -> Result<Option<ResponseDetail>> {
    let found = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {SUMMARY_COLUMNS} {SUMMARY_JOINS} WHERE sr.id = ?1");
        let summary = conn
          .query_row(&sql, rusqlite::params![id], RawSummary::from_row)
          .optional()?;
        let Some(summary) = summary else {
          return Ok(None);
        };

        let sql = format!(
          "SELECT {ANSWER_COLUMNS}
           FROM answers a
           INNER JOIN questions q ON a.question_id = q.id
           WHERE a.response_id = ?1
           ORDER BY q.order_index, a.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let answers = stmt
          .query_map(rusqlite::params![id], |row| answer_from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some((summary, answers)))
      })
      .await?;

    found
      .map(|(raw, answers)| Ok(ResponseDetail { summary: raw.into_summary()?, answers }))
      .transpose()
  }

  async fn export_responses(&self, survey_id: SurveyId) -> Result<Vec<ResponseDetail>> {
    let rows = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SUMMARY_COLUMNS}, {ANSWER_COLUMNS}
           {SUMMARY_JOINS}
           INNER JOIN answers   a ON a.response_id = sr.id
           INNER JOIN questions q ON a.question_id = q.id
           WHERE sr.survey_id = ?1
           ORDER BY sr.submitted_at DESC, sr.id DESC, q.order_index, a.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![survey_id], |row| {
            Ok((RawSummary::from_row(row)?, answer_from_row(row, SUMMARY_WIDTH)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    group_details(rows)
  }
}
