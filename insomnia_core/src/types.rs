//! Core domain types for the insomnia diagnosis engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Questions, options and their scoring effects
//! - Raw (loosely typed) answer payloads
//! - Severity tiers, pattern axes and syndromes
//! - Treatment plans and the final diagnosis result
//!
//! Serialized field names and enum strings are consumed by downstream
//! services and must stay stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Question identifier, `1..=QUESTION_COUNT`
pub type QuestionId = u8;

/// Number of questions in the intake questionnaire
pub const QUESTION_COUNT: QuestionId = 19;

// ============================================================================
// Questionnaire Types
// ============================================================================

/// How a question is answered
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AnswerKind {
    SingleChoice,
    MultiChoice,
    YesNo,
}

/// Root-cause axes, in tie-break priority order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum RootAxis {
    LiverIntestine,
    Blood,
    Neural,
}

impl RootAxis {
    /// Tie-break priority, highest first
    pub const PRIORITY: [RootAxis; 3] = [RootAxis::LiverIntestine, RootAxis::Blood, RootAxis::Neural];

    pub fn index(self) -> usize {
        match self {
            RootAxis::LiverIntestine => 0,
            RootAxis::Blood => 1,
            RootAxis::Neural => 2,
        }
    }
}

/// Depletion axes, in tie-break priority order
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum DepletionAxis {
    BoneMarrow,
    BrainMarrow,
}

impl DepletionAxis {
    /// Tie-break priority, highest first
    pub const PRIORITY: [DepletionAxis; 2] = [DepletionAxis::BoneMarrow, DepletionAxis::BrainMarrow];

    pub fn index(self) -> usize {
        match self {
            DepletionAxis::BoneMarrow => 0,
            DepletionAxis::BrainMarrow => 1,
        }
    }
}

/// What a question feeds into
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "axis", rename_all = "snake_case")]
pub enum QuestionCategory {
    /// Overall severity sum (questions 1-9)
    Severity,
    /// One of the three root-cause counters
    Root(RootAxis),
    /// One of the two depletion counters
    Depletion(DepletionAxis),
}

/// Scoring effect of selecting an option
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionEffect {
    /// Absolute score for single-choice and yes/no questions
    Score { points: i32 },
    /// Per-item delta, summed over every selected option of a multi-choice question
    Delta { points: i32 },
}

impl OptionEffect {
    pub fn points(&self) -> i32 {
        match self {
            OptionEffect::Score { points } | OptionEffect::Delta { points } => *points,
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, OptionEffect::Delta { .. })
    }
}

/// A selectable answer option
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AnswerOption {
    pub code: String,
    pub label: String,
    pub effect: OptionEffect,
    /// Alternative spellings accepted for `code` (e.g. `true` for `yes`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl AnswerOption {
    /// Whether a submitted code selects this option (ASCII case-insensitive)
    pub fn matches(&self, code: &str) -> bool {
        self.code.eq_ignore_ascii_case(code)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(code))
    }
}

/// A questionnaire item
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub category: QuestionCategory,
    pub kind: AnswerKind,
    #[serde(default = "default_required")]
    pub required: bool,
    pub options: Vec<AnswerOption>,
}

fn default_required() -> bool {
    true
}

impl Question {
    /// Find the option selected by `code`, if any
    pub fn option(&self, code: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.matches(code))
    }

    /// Points this question contributes for the given normalized codes
    ///
    /// Single-choice and yes/no questions use only the first code; multi-choice
    /// questions sum every distinct selected option. Unknown codes contribute 0.
    pub fn contribution(&self, codes: &[String]) -> i32 {
        match self.kind {
            AnswerKind::SingleChoice | AnswerKind::YesNo => codes
                .first()
                .and_then(|code| self.option(code))
                .map_or(0, |o| o.effect.points()),
            AnswerKind::MultiChoice => {
                let mut selected: Vec<&AnswerOption> = Vec::new();
                for option in codes.iter().filter_map(|code| self.option(code)) {
                    if !selected.iter().any(|s| s.code == option.code) {
                        selected.push(option);
                    }
                }
                selected.iter().map(|o| o.effect.points()).sum()
            }
        }
    }
}

// ============================================================================
// Raw Answer Types
// ============================================================================

/// A loosely typed per-question answer: one value or a list of values
///
/// Values may be strings, numbers, booleans or null; the normalizer coerces
/// them into codes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawAnswer {
    Many(Vec<serde_json::Value>),
    One(serde_json::Value),
}

impl From<&str> for RawAnswer {
    fn from(code: &str) -> Self {
        RawAnswer::One(serde_json::Value::String(code.to_string()))
    }
}

impl From<String> for RawAnswer {
    fn from(code: String) -> Self {
        RawAnswer::One(serde_json::Value::String(code))
    }
}

impl From<bool> for RawAnswer {
    fn from(flag: bool) -> Self {
        RawAnswer::One(serde_json::Value::Bool(flag))
    }
}

impl From<Vec<&str>> for RawAnswer {
    fn from(codes: Vec<&str>) -> Self {
        RawAnswer::Many(
            codes
                .into_iter()
                .map(|c| serde_json::Value::String(c.to_string()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for RawAnswer {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Array(items) => RawAnswer::Many(items),
            other => RawAnswer::One(other),
        }
    }
}

/// Raw answers keyed by question id as it arrives from callers (`"1"`, `"15"`)
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct RawAnswerSet(pub BTreeMap<String, RawAnswer>);

impl RawAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl ToString, answer: impl Into<RawAnswer>) -> Self {
        self.insert(key, answer);
        self
    }

    pub fn insert(&mut self, key: impl ToString, answer: impl Into<RawAnswer>) {
        self.0.insert(key.to_string(), answer.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawAnswer)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: ToString, V: Into<RawAnswer>> FromIterator<(K, V)> for RawAnswerSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = RawAnswerSet::new();
        for (key, answer) in iter {
            set.insert(key, answer);
        }
        set
    }
}

// ============================================================================
// Scoring Types
// ============================================================================

/// Coarse severity bucket derived from the severity score
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    NoneNeeded,
    Primary,
    Middle,
    Advanced,
}

impl SeverityTier {
    /// Human-readable label used in treatment plans
    pub fn label(&self) -> &'static str {
        match self {
            SeverityTier::NoneNeeded => "No treatment needed",
            SeverityTier::Primary => "Primary insomnia",
            SeverityTier::Middle => "Middle insomnia",
            SeverityTier::Advanced => "Advanced insomnia",
        }
    }
}

/// The five symptom-cluster counters
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatternScores {
    pub liver_intestine: u32,
    pub blood: u32,
    pub neural: u32,
    pub bone_marrow: u32,
    pub brain_marrow: u32,
}

impl PatternScores {
    pub fn root(&self, axis: RootAxis) -> u32 {
        match axis {
            RootAxis::LiverIntestine => self.liver_intestine,
            RootAxis::Blood => self.blood,
            RootAxis::Neural => self.neural,
        }
    }

    pub fn depletion(&self, axis: DepletionAxis) -> u32 {
        match axis {
            DepletionAxis::BoneMarrow => self.bone_marrow,
            DepletionAxis::BrainMarrow => self.brain_marrow,
        }
    }

    /// Add points to the counter a category feeds; negative points are floored to 0
    pub fn add(&mut self, category: QuestionCategory, points: i32) {
        let points = u32::try_from(points).unwrap_or(0);
        let counter = match category {
            QuestionCategory::Severity => return,
            QuestionCategory::Root(RootAxis::LiverIntestine) => &mut self.liver_intestine,
            QuestionCategory::Root(RootAxis::Blood) => &mut self.blood,
            QuestionCategory::Root(RootAxis::Neural) => &mut self.neural,
            QuestionCategory::Depletion(DepletionAxis::BoneMarrow) => &mut self.bone_marrow,
            QuestionCategory::Depletion(DepletionAxis::BrainMarrow) => &mut self.brain_marrow,
        };
        *counter = counter.saturating_add(points);
    }

    /// Highest value across all five axes
    pub fn max_axis(&self) -> u32 {
        [
            self.liver_intestine,
            self.blood,
            self.neural,
            self.bone_marrow,
            self.brain_marrow,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Traditional-pattern diagnostic category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Syndrome {
    LiverKidneyDeficiency,
    LiverBrainDeficiency,
    QiBloodDeficiency,
    QiBloodStasis,
    EssenceDeficiency,
    Neurasthenia,
}

impl Syndrome {
    pub const ALL: [Syndrome; 6] = [
        Syndrome::LiverKidneyDeficiency,
        Syndrome::LiverBrainDeficiency,
        Syndrome::QiBloodDeficiency,
        Syndrome::QiBloodStasis,
        Syndrome::EssenceDeficiency,
        Syndrome::Neurasthenia,
    ];

    pub fn index(self) -> usize {
        match self {
            Syndrome::LiverKidneyDeficiency => 0,
            Syndrome::LiverBrainDeficiency => 1,
            Syndrome::QiBloodDeficiency => 2,
            Syndrome::QiBloodStasis => 3,
            Syndrome::EssenceDeficiency => 4,
            Syndrome::Neurasthenia => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Syndrome::LiverKidneyDeficiency => "Liver stagnation with kidney deficiency",
            Syndrome::LiverBrainDeficiency => "Liver stagnation with brain deficiency",
            Syndrome::QiBloodDeficiency => "Qi and blood deficiency",
            Syndrome::QiBloodStasis => "Qi stagnation and blood stasis",
            Syndrome::EssenceDeficiency => "Essence and marrow deficiency",
            Syndrome::Neurasthenia => "Neurasthenia",
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Marker attached to plans that need special handling downstream
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFlag {
    PerfectSleep,
    LongTermMedication,
    CustomProgram,
}

/// Structured treatment recommendation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlan {
    pub tier_label: String,
    pub recommendation_text: String,
    pub message: Option<String>,
    pub products: Vec<String>,
    pub acupoint_therapy: Option<String>,
    pub dietary_therapy: Option<Vec<String>>,
    pub lifestyle_advice: Option<Vec<String>>,
    pub special_flag: Option<SpecialFlag>,
}

impl TreatmentPlan {
    /// A plan with only a label and recommendation filled in
    pub fn basic(tier_label: impl Into<String>, recommendation_text: impl Into<String>) -> Self {
        Self {
            tier_label: tier_label.into(),
            recommendation_text: recommendation_text.into(),
            message: None,
            products: Vec::new(),
            acupoint_therapy: None,
            dietary_therapy: None,
            lifestyle_advice: None,
            special_flag: None,
        }
    }
}

/// Complete output of one `analyze` call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub severity_score: i32,
    pub severity_tier: SeverityTier,
    /// Absent when a special flow short-circuited the analysis
    pub syndrome: Option<Syndrome>,
    pub pattern_scores: PatternScores,
    pub treatment_plan: TreatmentPlan,
    pub confidence: f64,
}

impl DiagnosisResult {
    /// One-line human-readable summary, e.g.
    /// `64 points, Primary insomnia, syndrome: Neurasthenia, confidence: 57.0%`
    ///
    /// The syndrome part is left out when a special flow short-circuited.
    pub fn description(&self) -> String {
        let syndrome = self
            .syndrome
            .map(|s| format!(", syndrome: {}", s.label()))
            .unwrap_or_default();
        format!(
            "{} points, {}{}, confidence: {:.1}%",
            self.severity_score,
            self.severity_tier.label(),
            syndrome,
            self.confidence * 100.0
        )
    }
}
