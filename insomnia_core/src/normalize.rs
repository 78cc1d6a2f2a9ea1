//! Answer normalization.
//!
//! Turns a loosely typed [`RawAnswerSet`] into one ordered list of codes per
//! question. Normalization never fails: anything that cannot be understood
//! is dropped and the affected question simply counts as unanswered.

use crate::types::{QuestionId, RawAnswer, RawAnswerSet, QUESTION_COUNT};
use serde::Serialize;
use serde_json::Value;

/// Canonical per-question code lists for questions `1..=QUESTION_COUNT`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NormalizedAnswers {
    codes: Vec<Vec<String>>,
}

impl NormalizedAnswers {
    fn slot(id: QuestionId) -> Option<usize> {
        (1..=QUESTION_COUNT)
            .contains(&id)
            .then(|| usize::from(id) - 1)
    }

    /// Codes selected for a question; empty when unanswered or unknown
    pub fn codes(&self, id: QuestionId) -> &[String] {
        Self::slot(id)
            .and_then(|slot| self.codes.get(slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First selected code, as used by single-choice and yes/no questions
    pub fn first(&self, id: QuestionId) -> Option<&str> {
        self.codes(id).first().map(String::as_str)
    }

    pub fn is_answered(&self, id: QuestionId) -> bool {
        !self.codes(id).is_empty()
    }

    /// Ids of all questions with at least one code
    pub fn answered(&self) -> impl Iterator<Item = QuestionId> + '_ {
        (1..=QUESTION_COUNT).filter(move |id| self.is_answered(*id))
    }

    fn push(&mut self, id: QuestionId, code: String) {
        let Some(slot) = Self::slot(id) else {
            return;
        };
        if self.codes.len() < usize::from(QUESTION_COUNT) {
            self.codes.resize(usize::from(QUESTION_COUNT), Vec::new());
        }
        let codes = &mut self.codes[slot];
        if !codes.contains(&code) {
            codes.push(code);
        }
    }
}

/// Parse a raw answer-set key into a question id
///
/// Keys are trimmed; anything that is not an integer in `1..=QUESTION_COUNT`
/// yields `None`.
pub fn parse_question_id(key: &str) -> Option<QuestionId> {
    key.trim()
        .parse::<QuestionId>()
        .ok()
        .filter(|id| (1..=QUESTION_COUNT).contains(id))
}

/// Coerce one raw value into a code
///
/// Strings are trimmed, numbers and booleans use their textual form, nested
/// arrays and objects use compact JSON. `null` and blank strings yield `None`.
pub fn coerce_code(value: &Value) -> Option<String> {
    let code = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    };
    (!code.is_empty()).then_some(code)
}

/// Normalize a raw answer set
pub fn normalize(raw: &RawAnswerSet) -> NormalizedAnswers {
    let mut answers = NormalizedAnswers {
        codes: vec![Vec::new(); usize::from(QUESTION_COUNT)],
    };

    for (key, answer) in raw.iter() {
        let Some(id) = parse_question_id(key) else {
            tracing::debug!("Ignoring answer for unknown question key {:?}", key);
            continue;
        };

        let values: &[Value] = match answer {
            RawAnswer::Many(values) => values,
            RawAnswer::One(value) => std::slice::from_ref(value),
        };

        for code in values.iter().filter_map(coerce_code) {
            answers.push(id, code);
        }
    }

    answers
}
