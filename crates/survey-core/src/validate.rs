//! The answer validator.
//!
//! A pure check of a candidate answer set against a survey's question
//! definitions. Runs before anything is written, so a rejected submission
//! never leaves rows behind.

use std::collections::HashMap;

use crate::{
  error::ValidationError,
  response::{CandidateAnswer, ValidatedAnswer},
  survey::{QuestionId, QuestionKind, SurveyWithQuestions},
};

/// Validate `answers` against `survey` and return them normalised.
///
/// Checks run in a fixed order and the first failure is reported:
///
/// 1. the set is non-empty;
/// 2. no question is answered twice, and every required question has a
///    non-blank answer (the first missing one by `order_index` is named);
/// 3. every answered question belongs to `survey`;
/// 4. every value matches its question's type.
///
/// The output keeps the order of `answers`.
pub fn validate(
  survey: &SurveyWithQuestions,
  answers: &[CandidateAnswer],
) -> Result<Vec<ValidatedAnswer>, ValidationError> {
  if answers.is_empty() {
    return Err(ValidationError::EmptyAnswers);
  }

  let mut by_question: HashMap<QuestionId, &str> = HashMap::with_capacity(answers.len());
  for answer in answers {
    if by_question
      .insert(answer.question_id, answer.answer_value.trim())
      .is_some()
    {
      return Err(ValidationError::DuplicateAnswer(answer.question_id));
    }
  }

  let mut questions: Vec<_> = survey.questions.iter().collect();
  questions.sort_by_key(|q| q.order_index);
  if let Some(missing) = questions.iter().find(|q| {
    q.is_required && by_question.get(&q.id).is_none_or(|v| v.is_empty())
  }) {
    return Err(ValidationError::MissingRequired(missing.id));
  }

  if let Some(unknown) = answers
    .iter()
    .find(|a| survey.question(a.question_id).is_none())
  {
    return Err(ValidationError::UnknownQuestion(unknown.question_id));
  }

  answers
    .iter()
    .map(|answer| {
      // Presence was checked above.
      let Some(question) = survey.question(answer.question_id) else {
        return Err(ValidationError::UnknownQuestion(answer.question_id));
      };
      let raw = answer.answer_value.trim();

      let answer_value = if raw.is_empty() {
        match question.kind {
          QuestionKind::Text => String::new(),
          _ => {
            return Err(ValidationError::InvalidValue {
              question_id:   question.id,
              question_type: question.kind.discriminant(),
              reason:        "value is empty".to_owned(),
            });
          }
        }
      } else {
        question
          .kind
          .normalize(raw)
          .map_err(|reason| ValidationError::InvalidValue {
            question_id: question.id,
            question_type: question.kind.discriminant(),
            reason,
          })?
      };

      Ok(ValidatedAnswer { question_id: question.id, answer_value })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::survey::{Question, Survey};

  fn question(id: i64, kind: QuestionKind, order_index: i64, required: bool) -> Question {
    Question {
      id,
      survey_id: 1,
      question_text: format!("question {id}"),
      kind,
      order_index,
      is_required: required,
    }
  }

  /// Rating 1-5 required, yes/no required, text optional, choice optional.
  fn survey() -> SurveyWithQuestions {
    SurveyWithQuestions {
      survey:    Survey {
        id:          1,
        title:       "Satisfaction".into(),
        description: None,
        is_active:   true,
      },
      questions: vec![
        question(1, QuestionKind::Rating { min: 1, max: 5 }, 1, true),
        question(2, QuestionKind::YesNo, 2, true),
        question(3, QuestionKind::Text, 3, false),
        question(
          4,
          QuestionKind::MultipleChoice { choices: vec!["Car".into(), "Truck".into()] },
          4,
          false,
        ),
      ],
    }
  }

  fn a(question_id: i64, value: &str) -> CandidateAnswer {
    CandidateAnswer::new(question_id, value)
  }

  #[test]
  fn accepts_required_answers_without_optional_ones() {
    let out = validate(&survey(), &[a(1, "5"), a(2, "Sí")]).unwrap();
    assert_eq!(out, vec![
      ValidatedAnswer { question_id: 1, answer_value: "5".into() },
      ValidatedAnswer { question_id: 2, answer_value: "Sí".into() },
    ]);
  }

  #[test]
  fn empty_set_is_rejected_first() {
    assert_eq!(validate(&survey(), &[]), Err(ValidationError::EmptyAnswers));
  }

  #[test]
  fn missing_required_names_first_by_order() {
    let err = validate(&survey(), &[a(3, "hello")]).unwrap_err();
    assert_eq!(err, ValidationError::MissingRequired(1));

    let err = validate(&survey(), &[a(1, "4")]).unwrap_err();
    assert_eq!(err, ValidationError::MissingRequired(2));
  }

  #[test]
  fn blank_required_answer_counts_as_missing() {
    let err = validate(&survey(), &[a(1, "3"), a(2, "   ")]).unwrap_err();
    assert_eq!(err, ValidationError::MissingRequired(2));
  }

  #[test]
  fn duplicate_answer_is_rejected() {
    let err = validate(&survey(), &[a(1, "3"), a(2, "No"), a(1, "4")]).unwrap_err();
    assert_eq!(err, ValidationError::DuplicateAnswer(1));
  }

  #[test]
  fn missing_required_is_reported_before_unknown_question() {
    let err = validate(&survey(), &[a(1, "3"), a(99, "x")]).unwrap_err();
    assert_eq!(err, ValidationError::MissingRequired(2));
  }

  #[test]
  fn unknown_question_is_rejected() {
    let err = validate(&survey(), &[a(1, "3"), a(2, "No"), a(99, "x")]).unwrap_err();
    assert_eq!(err, ValidationError::UnknownQuestion(99));
  }

  #[test]
  fn rating_outside_bounds_is_invalid() {
    for bad in ["0", "6", "five"] {
      let err = validate(&survey(), &[a(1, bad), a(2, "No")]).unwrap_err();
      assert!(
        matches!(err, ValidationError::InvalidValue { question_id: 1, question_type: "rating", .. }),
        "{bad}: {err:?}"
      );
    }
    for good in ["1", "5"] {
      assert!(validate(&survey(), &[a(1, good), a(2, "No")]).is_ok());
    }
  }

  #[test]
  fn values_are_normalised() {
    let out = validate(&survey(), &[
      a(1, " 4 "),
      a(2, "si"),
      a(3, "  great service  "),
      a(4, "Truck"),
    ])
    .unwrap();
    let values: Vec<_> = out.iter().map(|v| v.answer_value.as_str()).collect();
    assert_eq!(values, ["4", "Sí", "great service", "Truck"]);
  }

  #[test]
  fn optional_text_may_be_empty() {
    let out = validate(&survey(), &[a(1, "2"), a(2, "No"), a(3, "")]).unwrap();
    assert_eq!(out[2].answer_value, "");
  }

  #[test]
  fn optional_choice_may_not_be_empty_or_foreign() {
    let err = validate(&survey(), &[a(1, "2"), a(2, "No"), a(4, "")]).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidValue { question_id: 4, .. }));

    let err = validate(&survey(), &[a(1, "2"), a(2, "No"), a(4, "Bike")]).unwrap_err();
    assert!(matches!(
      err,
      ValidationError::InvalidValue { question_id: 4, question_type: "multiple_choice", .. }
    ));
  }
}
