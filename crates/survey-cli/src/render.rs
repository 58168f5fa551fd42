//! Plain-text rendering of API results for the terminal.

use std::fmt::Write as _;

use chrono::Local;
use survey_core::{
  response::{ResponseDetail, ResponseSummary},
  survey::{Survey, SurveyWithQuestions},
};

fn when(s: &ResponseSummary) -> String {
  s.submitted_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn surveys(list: &[Survey]) -> String {
  let mut out = String::new();
  for s in list {
    let _ = writeln!(out, "{:>5}  {}", s.id, s.title);
  }
  out
}

pub fn survey(s: &SurveyWithQuestions) -> String {
  let mut out = format!("#{} {}\n", s.survey.id, s.survey.title);
  if let Some(description) = &s.survey.description {
    let _ = writeln!(out, "{description}");
  }
  for q in &s.questions {
    let marker = if q.is_required { "*" } else { " " };
    let _ = writeln!(
      out,
      "{:>5}{marker} [{}] {}",
      q.id,
      q.kind.discriminant(),
      q.question_text
    );
  }
  out
}

pub fn summaries(list: &[ResponseSummary]) -> String {
  if list.is_empty() {
    return "no responses\n".to_string();
  }
  let mut out = String::new();
  for r in list {
    let _ = writeln!(
      out,
      "{:>6}  {}  {} / {} / {}  {}",
      r.id,
      when(r),
      r.country_name,
      r.company_name,
      r.location_name,
      r.survey_title
    );
  }
  out
}

pub fn detail(d: &ResponseDetail) -> String {
  let s = &d.summary;
  let mut out = format!(
    "Response #{} — {}\n{} / {} / {}\nSubmitted {}\n\n",
    s.id,
    s.survey_title,
    s.country_name,
    s.company_name,
    s.location_name,
    when(s)
  );
  for a in &d.answers {
    let value = if a.answer_value.is_empty() { "-" } else { a.answer_value.as_str() };
    let _ = writeln!(out, "  {}\n    {value}", a.question_text);
  }
  out
}
