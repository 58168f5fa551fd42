//! Integration tests for `SqliteStore`, mostly against in-memory databases.

use survey_core::{
  StorageErrorKind, StorageFault,
  response::{
    CandidateAnswer, IdempotencyKey, Insertion, NewResponse, ResponseFilter, Submission,
    ValidatedAnswer,
  },
  store::SurveyStore,
  submit::submit,
  survey::{NewQuestion, NewSurvey, QuestionKind},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

/// Ids of a provisioned world: two countries, each with one company and one
/// location, and one survey of three questions.
struct World {
  survey:    i64,
  /// `[rating 1-5 required, yes_no required, text optional]`
  questions: [i64; 3],
  /// `(country, company, location)` per branch.
  branches:  [(i64, i64, i64); 2],
}

async fn world(s: &SqliteStore) -> World {
  let gt = s.add_country("Guatemala", "GT").await.unwrap();
  let sv = s.add_country("El Salvador", "SV").await.unwrap();
  let co_gt = s.add_company("CarWash Express GT", gt.id).await.unwrap();
  let co_sv = s.add_company("Lavado Premium", sv.id).await.unwrap();
  let l_gt = s
    .add_location("Zona 10", Some("Boulevard Los Próceres".into()), co_gt.id)
    .await
    .unwrap();
  let l_sv = s.add_location("San Salvador Centro", None, co_sv.id).await.unwrap();

  let survey = s
    .add_survey(NewSurvey {
      title:       "Satisfaction".into(),
      description: None,
      is_active:   true,
      // Deliberately provisioned out of order.
      questions:   vec![
        NewQuestion::new("Comments", QuestionKind::Text, 3, false),
        NewQuestion::new("Quality?", QuestionKind::Rating { min: 1, max: 5 }, 1, true),
        NewQuestion::new("Friendly staff?", QuestionKind::YesNo, 2, true),
      ],
    })
    .await
    .unwrap();
  let q = &survey.questions;

  World {
    survey:    survey.survey.id,
    questions: [q[0].id, q[1].id, q[2].id],
    branches:  [(gt.id, co_gt.id, l_gt.id), (sv.id, co_sv.id, l_sv.id)],
  }
}

fn answer(question_id: i64, value: &str) -> ValidatedAnswer {
  ValidatedAnswer { question_id, answer_value: value.into() }
}

fn new_response(w: &World, branch: usize, answers: Vec<ValidatedAnswer>) -> NewResponse {
  let (country_id, company_id, location_id) = w.branches[branch];
  NewResponse {
    survey_id: w.survey,
    country_id,
    company_id,
    location_id,
    answers,
    idempotency: None,
  }
}

fn full_answers(w: &World) -> Vec<ValidatedAnswer> {
  let [rating, yes_no, text] = w.questions;
  vec![answer(rating, "4"), answer(yes_no, "Sí"), answer(text, "ok")]
}

async fn created(s: &SqliteStore, input: NewResponse) -> i64 {
  match s.insert_response(input).await.unwrap() {
    Insertion::Created(id) => id,
    other => panic!("expected Created, got {other:?}"),
  }
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn survey_questions_come_back_in_order() {
  let s = store().await;
  let w = world(&s).await;

  let survey = s.get_survey(w.survey).await.unwrap().unwrap();
  let order: Vec<_> = survey.questions.iter().map(|q| q.order_index).collect();
  assert_eq!(order, [1, 2, 3]);
  assert_eq!(survey.questions[0].kind, QuestionKind::Rating { min: 1, max: 5 });
  assert!(survey.questions[0].is_required);
  assert!(!survey.questions[2].is_required);

  assert!(s.get_survey(999).await.unwrap().is_none());
}

#[tokio::test]
async fn companies_and_locations_filter_by_parent() {
  let s = store().await;
  let w = world(&s).await;
  let (gt, co_gt, _) = w.branches[0];

  let companies = s.list_companies(Some(gt)).await.unwrap();
  assert_eq!(companies.len(), 1);
  assert_eq!(companies[0].country_name, "Guatemala");
  assert_eq!(s.list_companies(None).await.unwrap().len(), 2);

  let locations = s.list_locations(Some(co_gt)).await.unwrap();
  assert_eq!(locations.len(), 1);
  assert_eq!(locations[0].address.as_deref(), Some("Boulevard Los Próceres"));
  assert_eq!(locations[0].company_name, "CarWash Express GT");
}

#[tokio::test]
async fn inactive_surveys_are_not_listed() {
  let s = store().await;
  world(&s).await;
  s.add_survey(NewSurvey {
    title:       "Retired".into(),
    description: None,
    is_active:   false,
    questions:   vec![NewQuestion::new("?", QuestionKind::YesNo, 1, true)],
  })
  .await
  .unwrap();

  let surveys = s.list_surveys().await.unwrap();
  assert_eq!(surveys.len(), 1);
  assert_eq!(surveys[0].title, "Satisfaction");
}

#[tokio::test]
async fn demo_seed_runs_once() {
  let s = store().await;
  assert!(s.seed_demo().await.unwrap());
  assert!(!s.seed_demo().await.unwrap());

  assert_eq!(s.list_countries().await.unwrap().len(), 5);
  let survey = s.get_survey(1).await.unwrap().unwrap();
  assert_eq!(survey.questions.len(), 5);
  assert!(!survey.questions[4].is_required);
}

// ─── Response writer ─────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_persists_response_and_every_answer() {
  let s = store().await;
  let w = world(&s).await;

  created(&s, new_response(&w, 0, full_answers(&w))).await;

  assert_eq!(count(&s, "survey_responses").await, 1);
  assert_eq!(count(&s, "answers").await, 3);
}

#[tokio::test]
async fn failing_answer_rolls_back_the_whole_response() {
  let s = store().await;
  let w = world(&s).await;
  let [rating, ..] = w.questions;

  // The second answer references a question that does not exist.
  let err = s
    .insert_response(new_response(&w, 0, vec![answer(rating, "4"), answer(9_999, "x")]))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), StorageErrorKind::ConstraintViolation);
  assert_eq!(count(&s, "survey_responses").await, 0);
  assert_eq!(count(&s, "answers").await, 0);
}

#[tokio::test]
async fn duplicate_answer_rolls_back() {
  let s = store().await;
  let w = world(&s).await;
  let [rating, ..] = w.questions;

  let err = s
    .insert_response(new_response(&w, 0, vec![answer(rating, "4"), answer(rating, "5")]))
    .await
    .unwrap_err();

  assert_eq!(err.kind(), StorageErrorKind::ConstraintViolation);
  assert_eq!(count(&s, "survey_responses").await, 0);
  assert_eq!(count(&s, "answers").await, 0);
}

#[tokio::test]
async fn dangling_hierarchy_reference_is_a_constraint_violation() {
  let s = store().await;
  let w = world(&s).await;
  let mut input = new_response(&w, 0, full_answers(&w));
  input.location_id = 404;

  let err = s.insert_response(input).await.unwrap_err();
  assert_eq!(err.kind(), StorageErrorKind::ConstraintViolation);
  assert_eq!(count(&s, "survey_responses").await, 0);
}

#[tokio::test]
async fn idempotency_key_replays_or_rejects() {
  let s = store().await;
  let w = world(&s).await;
  let key = Uuid::new_v4();

  let mut first = new_response(&w, 0, full_answers(&w));
  first.idempotency = Some(IdempotencyKey { key, fingerprint: "aaa".into() });
  let id = created(&s, first.clone()).await;

  assert_eq!(s.insert_response(first.clone()).await.unwrap(), Insertion::Replayed(id));

  let mut other = first;
  other.idempotency = Some(IdempotencyKey { key, fingerprint: "bbb".into() });
  assert_eq!(s.insert_response(other).await.unwrap(), Insertion::FingerprintMismatch);

  assert_eq!(count(&s, "survey_responses").await, 1);
  assert_eq!(count(&s, "answers").await, 3);
}

#[tokio::test]
async fn locked_database_is_unavailable_and_writes_nothing() {
  let path = std::env::temp_dir().join(format!("survey-lock-{}.db", Uuid::new_v4()));
  let holder = SqliteStore::open(&path).await.unwrap();
  let w = world(&holder).await;
  let writer = SqliteStore::open(&path).await.unwrap();

  writer
    .conn
    .call(|conn| {
      conn.busy_timeout(std::time::Duration::from_millis(50))?;
      Ok(())
    })
    .await
    .unwrap();
  holder
    .conn
    .call(|conn| Ok(conn.execute_batch("BEGIN EXCLUSIVE")?))
    .await
    .unwrap();

  let err = writer
    .insert_response(new_response(&w, 0, full_answers(&w)))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), StorageErrorKind::Unavailable);

  holder
    .conn
    .call(|conn| Ok(conn.execute_batch("COMMIT")?))
    .await
    .unwrap();
  assert_eq!(count(&holder, "survey_responses").await, 0);

  // Once the lock is released the identical payload goes through.
  created(&writer, new_response(&w, 0, full_answers(&w))).await;
  assert_eq!(count(&holder, "survey_responses").await, 1);

  drop((holder, writer));
  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}

// ─── Query engine ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_most_recent_first_with_names_joined() {
  let s = store().await;
  let w = world(&s).await;

  let first = created(&s, new_response(&w, 0, full_answers(&w))).await;
  let second = created(&s, new_response(&w, 1, full_answers(&w))).await;
  let third = created(&s, new_response(&w, 0, full_answers(&w))).await;

  let all = s.list_responses(ResponseFilter::default()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|r| r.id).collect();
  assert_eq!(ids, [third, second, first]);
  assert!(all.windows(2).all(|p| p[0].submitted_at >= p[1].submitted_at));

  let r = &all[1];
  assert_eq!(r.survey_title, "Satisfaction");
  assert_eq!(r.country_name, "El Salvador");
  assert_eq!(r.company_name, "Lavado Premium");
  assert_eq!(r.location_name, "San Salvador Centro");

  // Repeated reads return the same order.
  let again = s.list_responses(ResponseFilter::default()).await.unwrap();
  assert_eq!(again, all);
}

#[tokio::test]
async fn company_filter_returns_only_that_company() {
  let s = store().await;
  let w = world(&s).await;
  let (_, co_gt, _) = w.branches[0];

  let a = created(&s, new_response(&w, 0, full_answers(&w))).await;
  for _ in 0..3 {
    created(&s, new_response(&w, 1, full_answers(&w))).await;
  }
  let b = created(&s, new_response(&w, 0, full_answers(&w))).await;

  let filtered = s
    .list_responses(ResponseFilter { company_id: Some(co_gt), ..Default::default() })
    .await
    .unwrap();
  let ids: Vec<_> = filtered.iter().map(|r| r.id).collect();
  assert_eq!(ids, [b, a]);
  assert!(filtered.iter().all(|r| r.company_id == co_gt));
}

#[tokio::test]
async fn filters_are_conjunctive() {
  let s = store().await;
  let w = world(&s).await;
  let (gt, _, _) = w.branches[0];
  let (_, co_sv, _) = w.branches[1];

  created(&s, new_response(&w, 0, full_answers(&w))).await;
  created(&s, new_response(&w, 1, full_answers(&w))).await;

  let none = s
    .list_responses(ResponseFilter {
      country_id: Some(gt),
      company_id: Some(co_sv),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(none.is_empty());

  let by_survey = s
    .list_responses(ResponseFilter { survey_id: Some(w.survey), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_survey.len(), 2);
}

#[tokio::test]
async fn get_response_orders_answers_by_question() {
  let s = store().await;
  let w = world(&s).await;
  let [rating, yes_no, text] = w.questions;

  let id = created(
    &s,
    new_response(&w, 0, vec![answer(text, "clean"), answer(yes_no, "Sí"), answer(rating, "4")]),
  )
  .await;

  let detail = s.get_response(id).await.unwrap().unwrap();
  assert_eq!(detail.summary.id, id);
  let answers: Vec<_> = detail
    .answers
    .iter()
    .map(|a| (a.question_text.as_str(), a.question_type.as_str(), a.answer_value.as_str()))
    .collect();
  assert_eq!(answers, [
    ("Quality?", "rating", "4"),
    ("Friendly staff?", "yes_no", "Sí"),
    ("Comments", "text", "clean"),
  ]);
}

#[tokio::test]
async fn get_response_missing_returns_none() {
  let s = store().await;
  world(&s).await;
  assert!(s.get_response(12_345).await.unwrap().is_none());
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn export_yields_every_answer_in_order() {
  let s = store().await;
  let w = world(&s).await;

  let ids = [
    created(&s, new_response(&w, 0, full_answers(&w))).await,
    created(&s, new_response(&w, 1, full_answers(&w))).await,
    created(&s, new_response(&w, 0, full_answers(&w))).await,
  ];

  let details = s.export_responses(w.survey).await.unwrap();
  let response_ids: Vec<_> = details.iter().map(|d| d.summary.id).collect();
  assert_eq!(response_ids, [ids[2], ids[1], ids[0]]);

  let rows: usize = details.iter().map(|d| d.answers.len()).sum();
  assert_eq!(rows, 3 * 3);
  for d in &details {
    let texts: Vec<_> = d.answers.iter().map(|a| a.question_text.as_str()).collect();
    assert_eq!(texts, ["Quality?", "Friendly staff?", "Comments"]);
  }
}

#[tokio::test]
async fn export_of_survey_without_responses_is_empty() {
  let s = store().await;
  let w = world(&s).await;
  created(&s, new_response(&w, 0, full_answers(&w))).await;

  assert!(s.export_responses(999).await.unwrap().is_empty());
}

// ─── Submission path end to end ──────────────────────────────────────────────

#[tokio::test]
async fn submit_then_fetch_round_trip() {
  let s = store().await;
  let w = world(&s).await;
  let [rating, yes_no, _] = w.questions;
  let (country_id, company_id, location_id) = w.branches[0];

  let receipt = submit(&s, Submission {
    survey_id: w.survey,
    country_id,
    company_id,
    location_id,
    answers: vec![CandidateAnswer::new(rating, "4"), CandidateAnswer::new(yes_no, "Sí")],
    idempotency_key: None,
  })
  .await
  .unwrap();

  let detail = s.get_response(receipt.response_id).await.unwrap().unwrap();
  let pairs: Vec<_> = detail
    .answers
    .iter()
    .map(|a| (a.question_id, a.answer_value.as_str(), a.question_type.as_str()))
    .collect();
  assert_eq!(pairs, [(rating, "4", "rating"), (yes_no, "Sí", "yes_no")]);
}

#[tokio::test]
async fn rejected_submission_leaves_no_rows() {
  let s = store().await;
  let w = world(&s).await;
  let [rating, ..] = w.questions;
  let (country_id, company_id, location_id) = w.branches[0];

  let err = submit(&s, Submission {
    survey_id: w.survey,
    country_id,
    company_id,
    location_id,
    answers: vec![CandidateAnswer::new(rating, "6")],
    idempotency_key: None,
  })
  .await
  .unwrap_err();

  assert!(matches!(err, survey_core::Error::Validation(_)));
  assert_eq!(count(&s, "survey_responses").await, 0);
  assert_eq!(count(&s, "answers").await, 0);
}
