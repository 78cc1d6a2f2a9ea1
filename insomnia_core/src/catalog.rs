//! Default 19-question sleep intake questionnaire.
//!
//! Questions 1-9 feed the severity score, questions 10-19 feed the five
//! pattern axes (one yes/no question and one symptom checklist per axis).
//! The special-flow triggers live here too since they name concrete
//! question ids and option codes.

use crate::config::SeverityConfig;
use crate::normalize::NormalizedAnswers;
use crate::types::*;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Cached default questionnaire - built once and shared read-only
static DEFAULT_QUESTIONNAIRE: Lazy<Questionnaire> = Lazy::new(build_default_questionnaire);

/// Get a reference to the cached default questionnaire
pub fn default_questionnaire() -> &'static Questionnaire {
    &DEFAULT_QUESTIONNAIRE
}

/// A (question, option code) pair that short-circuits scoring when selected
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FlowTrigger {
    pub question: QuestionId,
    pub code: String,
}

impl FlowTrigger {
    /// Whether the first answer to the trigger question selects the trigger option
    pub fn fires(&self, questionnaire: &Questionnaire, answers: &NormalizedAnswers) -> bool {
        let Some(question) = questionnaire.question(self.question) else {
            return false;
        };
        answers
            .first(self.question)
            .and_then(|code| question.option(code))
            .is_some_and(|option| option.code == self.code)
    }
}

/// The complete questionnaire definition
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Questionnaire {
    pub questions: Vec<Question>,
    /// Selecting "good" overall sleep ends the analysis immediately
    pub perfect_sleep: FlowTrigger,
    /// Taking sleep medication for more than 3 months escalates immediately
    pub long_term_medication: FlowTrigger,
}

/// Question ids grouped by what they feed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub category: QuestionCategory,
    pub question_ids: Vec<QuestionId>,
}

/// Overview of the questionnaire and its scoring rules
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QuestionnaireSummary {
    pub total_questions: usize,
    pub required_questions: usize,
    pub categories: Vec<CategorySummary>,
    pub severity_thresholds: SeverityConfig,
}

impl Questionnaire {
    /// Look up a question by id
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// All questions in id order
    pub fn questions(&self) -> impl Iterator<Item = &Question> + '_ {
        self.questions.iter()
    }

    /// Questions whose answers feed the given category
    pub fn questions_in(&self, category: QuestionCategory) -> impl Iterator<Item = &Question> + '_ {
        self.questions.iter().filter(move |q| q.category == category)
    }

    /// Required questions that have no answer
    ///
    /// The engine never enforces this; it is offered to callers that want to
    /// reject incomplete submissions.
    pub fn missing_required(&self, answers: &NormalizedAnswers) -> Vec<QuestionId> {
        self.questions
            .iter()
            .filter(|q| q.required && !answers.is_answered(q.id))
            .map(|q| q.id)
            .collect()
    }

    /// Summarize categories and thresholds
    pub fn summary(&self, thresholds: &SeverityConfig) -> QuestionnaireSummary {
        let mut categories: Vec<CategorySummary> = Vec::new();
        for question in &self.questions {
            match categories.iter_mut().find(|c| c.category == question.category) {
                Some(entry) => entry.question_ids.push(question.id),
                None => categories.push(CategorySummary {
                    category: question.category,
                    question_ids: vec![question.id],
                }),
            }
        }

        QuestionnaireSummary {
            total_questions: self.questions.len(),
            required_questions: self.questions.iter().filter(|q| q.required).count(),
            categories,
            severity_thresholds: thresholds.clone(),
        }
    }

    /// Validate the questionnaire for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.questions.len() != usize::from(QUESTION_COUNT) {
            errors.push(format!(
                "Expected {} questions, found {}",
                QUESTION_COUNT,
                self.questions.len()
            ));
        }

        for (position, question) in self.questions.iter().enumerate() {
            let expected_id = position + 1;
            if usize::from(question.id) != expected_id {
                errors.push(format!(
                    "Question at position {} has id {} (expected {})",
                    position, question.id, expected_id
                ));
            }
            if question.text.is_empty() {
                errors.push(format!("Question {} has empty text", question.id));
            }
            if question.options.is_empty() {
                errors.push(format!("Question {} has no options", question.id));
            }

            let mut seen = HashSet::new();
            for option in &question.options {
                if option.code.is_empty() {
                    errors.push(format!("Question {} has an option with empty code", question.id));
                }
                if !seen.insert(option.code.to_ascii_lowercase()) {
                    errors.push(format!(
                        "Question {} has duplicate option code '{}'",
                        question.id, option.code
                    ));
                }
                let expects_delta = question.kind == AnswerKind::MultiChoice;
                if option.effect.is_delta() != expects_delta {
                    errors.push(format!(
                        "Question {}: option '{}' effect does not match {:?} answers",
                        question.id, option.code, question.kind
                    ));
                }
            }

            if question.kind == AnswerKind::YesNo && question.options.len() != 2 {
                errors.push(format!(
                    "Yes/no question {} has {} options",
                    question.id,
                    question.options.len()
                ));
            }
        }

        for (name, trigger) in [
            ("perfect_sleep", &self.perfect_sleep),
            ("long_term_medication", &self.long_term_medication),
        ] {
            match self.question(trigger.question) {
                None => errors.push(format!(
                    "Trigger '{}' references non-existent question {}",
                    name, trigger.question
                )),
                Some(question) => {
                    if question.category != QuestionCategory::Severity {
                        errors.push(format!(
                            "Trigger '{}' question {} is not a severity question",
                            name, trigger.question
                        ));
                    }
                    if !question.options.iter().any(|o| o.code == trigger.code) {
                        errors.push(format!(
                            "Trigger '{}' references non-existent option '{}' on question {}",
                            name, trigger.code, trigger.question
                        ));
                    }
                }
            }
        }

        let axes = RootAxis::PRIORITY
            .into_iter()
            .map(QuestionCategory::Root)
            .chain(DepletionAxis::PRIORITY.into_iter().map(QuestionCategory::Depletion));
        for category in axes {
            let yes_no = self
                .questions_in(category)
                .filter(|q| q.kind == AnswerKind::YesNo)
                .count();
            let checklists = self
                .questions_in(category)
                .filter(|q| q.kind == AnswerKind::MultiChoice)
                .count();
            if yes_no != 1 || checklists != 1 {
                errors.push(format!(
                    "Axis {:?} needs one yes/no and one checklist question (found {} and {})",
                    category, yes_no, checklists
                ));
            }
        }

        errors
    }
}

// ============================================================================
// Builders
// ============================================================================

fn scored(code: &str, label: &str, points: i32) -> AnswerOption {
    AnswerOption {
        code: code.into(),
        label: label.into(),
        effect: OptionEffect::Score { points },
        aliases: vec![],
    }
}

fn delta(code: &str, label: &str, points: i32) -> AnswerOption {
    AnswerOption {
        code: code.into(),
        label: label.into(),
        effect: OptionEffect::Delta { points },
        aliases: vec![],
    }
}

fn single(id: QuestionId, text: &str, options: Vec<AnswerOption>) -> Question {
    Question {
        id,
        text: text.into(),
        category: QuestionCategory::Severity,
        kind: AnswerKind::SingleChoice,
        required: true,
        options,
    }
}

fn multi(id: QuestionId, text: &str, category: QuestionCategory, options: Vec<AnswerOption>) -> Question {
    Question {
        id,
        text: text.into(),
        category,
        kind: AnswerKind::MultiChoice,
        required: true,
        options,
    }
}

fn yes_no(id: QuestionId, text: &str, category: QuestionCategory) -> Question {
    Question {
        id,
        text: text.into(),
        category,
        kind: AnswerKind::YesNo,
        required: true,
        options: vec![
            AnswerOption {
                code: "yes".into(),
                label: "Yes".into(),
                effect: OptionEffect::Score { points: 1 },
                aliases: vec!["是".into(), "true".into(), "y".into()],
            },
            AnswerOption {
                code: "no".into(),
                label: "No".into(),
                effect: OptionEffect::Score { points: 0 },
                aliases: vec!["否".into(), "false".into(), "n".into()],
            },
        ],
    }
}

/// Symptom checklist: each symptom counts +1, the trailing "none" option counts 0
fn checklist(id: QuestionId, category: QuestionCategory, symptoms: [&str; 3]) -> Question {
    multi(
        id,
        "Have you recently had any of the following?",
        category,
        vec![
            delta("A", symptoms[0], 1),
            delta("B", symptoms[1], 1),
            delta("C", symptoms[2], 1),
            delta("D", "None", 0),
        ],
    )
}

/// Six-tier elapsed-time table shared by questions 2 and 5
fn time_to_sleep_options() -> Vec<AnswerOption> {
    vec![
        scored("A", "Within 5 minutes", 12),
        scored("B", "6-15 minutes", 12),
        scored("C", "16-30 minutes", 9),
        scored("D", "31-60 minutes", 6),
        scored("E", "More than 60 minutes", 3),
        scored("F", "Extremely long", 0),
    ]
}

/// Builds the default questionnaire
///
/// **Note**: For production use, prefer `default_questionnaire()` which returns
/// a cached reference. This function is retained for tests and custom tables.
pub fn build_default_questionnaire() -> Questionnaire {
    use DepletionAxis::*;
    use QuestionCategory::{Depletion, Root};
    use RootAxis::*;

    let questions = vec![
        // ====================================================================
        // Severity (1-9)
        // ====================================================================
        single(
            1,
            "How would you rate your sleep overall?",
            vec![
                scored("A", "Good", 20),
                scored("B", "Fair", 10),
                scored("C", "Poor", 0),
            ],
        ),
        single(
            2,
            "How long does it usually take you to fall asleep after going to bed?",
            time_to_sleep_options(),
        ),
        single(
            3,
            "Over the past month, how many hours did you sleep per night?",
            vec![
                scored("A", "8 hours or more", 12),
                scored("B", "7-8 hours", 12),
                scored("C", "6-7 hours", 9),
                scored("D", "5-6 hours", 6),
                scored("E", "Less than 5 hours", 3),
                scored("F", "Barely any sleep", 0),
            ],
        ),
        single(
            4,
            "Over the past month, how many times did you wake up during the night on average?",
            vec![
                scored("A", "Almost never", 9),
                scored("B", "Once", 9),
                scored("C", "2-3 times", 6),
                scored("D", "4 times or more", 3),
                scored("E", "Constantly", 0),
            ],
        ),
        single(
            5,
            "Over the past month, how long did it take to fall back asleep after waking at night?",
            time_to_sleep_options(),
        ),
        single(
            6,
            "Over the past month, have you felt irresistible sleepiness during the day \
             (at work, while studying or driving)?",
            vec![
                scored("A", "Almost never", 9),
                scored("B", "1-2 times a week", 6),
                scored("C", "3-5 times a week", 3),
                scored("D", "Every day", 0),
            ],
        ),
        multi(
            7,
            "Which sleep problems do you have? (select all that apply)",
            QuestionCategory::Severity,
            vec![
                delta("A", "Waking repeatedly", -3),
                delta("B", "Dreaming all night", -3),
                delta("C", "Tired on waking", -3),
                delta("D", "Difficulty falling asleep", -3),
                delta("E", "None", 0),
            ],
        ),
        multi(
            8,
            "Have you taken any of these sleep medications? (select all that apply)",
            QuestionCategory::Severity,
            vec![
                delta("A", "Benzodiazepines: diazepam, lorazepam", -5),
                delta("B", "Non-benzodiazepines: zolpidem, eszopiclone", -5),
                delta("C", "Melatonin receptor agonists: ramelteon", -5),
                delta("D", "Orexin receptor antagonists: suvorexant", -5),
                delta("E", "Antidepressants: trazodone, mirtazapine", -5),
                delta("F", "None", 0),
            ],
        ),
        Question {
            // Only shown when question 8 names a medication
            required: false,
            ..single(
                9,
                "How long have you been taking sleep medication?",
                vec![
                    scored("A", "Less than 1 month", 6),
                    scored("B", "1-3 months", 4),
                    scored("C", "More than 3 months", 2),
                    scored("D", "Long-term use", 0),
                ],
            )
        },
        // ====================================================================
        // Pattern axes: yes/no (10-14)
        // ====================================================================
        yes_no(
            10,
            "Are you often under mental stress or emotional tension?",
            Root(LiverIntestine),
        ),
        yes_no(11, "Do you often have body aches or spinal pain?", Root(Blood)),
        yes_no(
            12,
            "Do you use electronic devices for more than 3 hours a day?",
            Root(Neural),
        ),
        yes_no(
            13,
            "Do you often wear yourself out with worry and overwork?",
            Depletion(BoneMarrow),
        ),
        yes_no(14, "Do you overuse your brain?", Depletion(BrainMarrow)),
        // ====================================================================
        // Pattern axes: symptom checklists (15-19)
        // ====================================================================
        checklist(
            15,
            Root(LiverIntestine),
            [
                "Occasional tinnitus",
                "Hemorrhoid flare-ups or perianal itching",
                "Bloating or abdominal discomfort",
            ],
        ),
        checklist(
            16,
            Root(Blood),
            [
                "Waking breathless at night, chest tightness or racing heart",
                "Itchy skin or hives",
                "Coughing, shortness of breath or wheezing",
            ],
        ),
        checklist(
            17,
            Root(Neural),
            [
                "Dull complexion and listlessness",
                "Easily startled or fearful",
                "Night sweats",
            ],
        ),
        checklist(
            18,
            Depletion(BoneMarrow),
            [
                "Weak, aching lower back",
                "Feeling cold",
                "Frequent night urination",
            ],
        ),
        checklist(
            19,
            Depletion(BrainMarrow),
            [
                "Forgetfulness or declining memory",
                "Daytime sleepiness",
                "Migraines or headaches",
            ],
        ),
    ];

    Questionnaire {
        questions,
        perfect_sleep: FlowTrigger {
            question: 1,
            code: "A".into(),
        },
        long_term_medication: FlowTrigger {
            question: 9,
            code: "C".into(),
        },
    }
}
