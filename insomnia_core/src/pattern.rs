//! Pattern scoring for questions 10-19.
//!
//! Each of the five axes has exactly two source questions: a yes/no question
//! (+1 when affirmative) and a symptom checklist (+1 per selected symptom).

use crate::catalog::Questionnaire;
use crate::normalize::NormalizedAnswers;
use crate::types::{PatternScores, QuestionCategory};

/// Compute the five pattern counters
pub fn score_patterns(questionnaire: &Questionnaire, answers: &NormalizedAnswers) -> PatternScores {
    let mut scores = PatternScores::default();

    for question in questionnaire.questions() {
        if question.category == QuestionCategory::Severity {
            continue;
        }
        let points = question.contribution(answers.codes(question.id));
        scores.add(question.category, points);
    }

    tracing::debug!("Pattern scores: {:?}", scores);
    scores
}
