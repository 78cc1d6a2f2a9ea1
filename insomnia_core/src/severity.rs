//! Severity scoring for questions 1-9.
//!
//! Not a plain sum: two special flows can short-circuit the analysis before
//! any scoring happens.
//!
//! 1. **Perfect sleep**: overall sleep rated "good" -> no treatment needed
//! 2. **Long-term medication**: sleep medication for more than 3 months ->
//!    escalate to a specialist
//! 3. **Normal path**: sum the severity questions and bucket the total

use crate::catalog::Questionnaire;
use crate::config::{Config, FlowPrecedence, SeverityConfig};
use crate::normalize::NormalizedAnswers;
use crate::types::{QuestionCategory, SeverityTier, SpecialFlag};

/// A short-circuit rule that bypasses normal scoring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialFlow {
    PerfectSleep,
    LongTermMedication,
}

impl SpecialFlow {
    /// Score reported for the flow in place of a computed sum
    pub fn sentinel_score(self) -> i32 {
        match self {
            SpecialFlow::PerfectSleep => 100,
            SpecialFlow::LongTermMedication => 30,
        }
    }

    pub fn tier(self) -> SeverityTier {
        match self {
            SpecialFlow::PerfectSleep => SeverityTier::NoneNeeded,
            SpecialFlow::LongTermMedication => SeverityTier::Advanced,
        }
    }

    pub fn flag(self) -> SpecialFlag {
        match self {
            SpecialFlow::PerfectSleep => SpecialFlag::PerfectSleep,
            SpecialFlow::LongTermMedication => SpecialFlag::LongTermMedication,
        }
    }
}

/// Outcome of severity scoring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeverityOutcome {
    /// A special flow fired; nothing else should be evaluated
    Terminal(SpecialFlow),
    /// Normal path
    Scored { score: i32, tier: SeverityTier },
}

impl SeverityOutcome {
    pub fn score(&self) -> i32 {
        match self {
            SeverityOutcome::Terminal(flow) => flow.sentinel_score(),
            SeverityOutcome::Scored { score, .. } => *score,
        }
    }

    pub fn tier(&self) -> SeverityTier {
        match self {
            SeverityOutcome::Terminal(flow) => flow.tier(),
            SeverityOutcome::Scored { tier, .. } => *tier,
        }
    }
}

/// Score severity, honoring the special flows
pub fn score_severity(
    questionnaire: &Questionnaire,
    answers: &NormalizedAnswers,
    config: &Config,
) -> SeverityOutcome {
    if let Some(flow) = detect_special_flow(questionnaire, answers, config.flows.precedence) {
        tracing::debug!("Special flow {:?} fired, skipping normal scoring", flow);
        return SeverityOutcome::Terminal(flow);
    }

    let score = severity_sum(
        questionnaire,
        answers,
        config.severity.include_medication_duration,
    );
    let tier = tier_for_score(score, &config.severity);
    tracing::debug!("Severity score {} -> {:?}", score, tier);

    SeverityOutcome::Scored { score, tier }
}

/// Check the special-flow triggers in precedence order
pub fn detect_special_flow(
    questionnaire: &Questionnaire,
    answers: &NormalizedAnswers,
    precedence: FlowPrecedence,
) -> Option<SpecialFlow> {
    let order = match precedence {
        FlowPrecedence::PerfectSleepFirst => {
            [SpecialFlow::PerfectSleep, SpecialFlow::LongTermMedication]
        }
        FlowPrecedence::LongTermMedicationFirst => {
            [SpecialFlow::LongTermMedication, SpecialFlow::PerfectSleep]
        }
    };

    order.into_iter().find(|flow| {
        let trigger = match flow {
            SpecialFlow::PerfectSleep => &questionnaire.perfect_sleep,
            SpecialFlow::LongTermMedication => &questionnaire.long_term_medication,
        };
        trigger.fires(questionnaire, answers)
    })
}

/// Normal-path severity sum
///
/// Single-choice questions add their looked-up score, multi-choice questions
/// add one delta per selected option. The medication-duration question only
/// counts when `include_medication_duration` is set. Missing answers add 0.
pub fn severity_sum(
    questionnaire: &Questionnaire,
    answers: &NormalizedAnswers,
    include_medication_duration: bool,
) -> i32 {
    let medication_duration = questionnaire.long_term_medication.question;

    questionnaire
        .questions_in(QuestionCategory::Severity)
        .filter(|q| include_medication_duration || q.id != medication_duration)
        .map(|q| q.contribution(answers.codes(q.id)))
        .sum()
}

/// Map a score onto the ordered threshold table
pub fn tier_for_score(score: i32, thresholds: &SeverityConfig) -> SeverityTier {
    if score >= thresholds.none_needed_min {
        SeverityTier::NoneNeeded
    } else if score >= thresholds.primary_min {
        SeverityTier::Primary
    } else if score >= thresholds.middle_min {
        SeverityTier::Middle
    } else {
        SeverityTier::Advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_questionnaire;
    use crate::normalize::normalize;
    use crate::types::RawAnswerSet;

    fn scored(raw: RawAnswerSet) -> SeverityOutcome {
        crate::logging::init_test();
        score_severity(default_questionnaire(), &normalize(&raw), &Config::default())
    }

    fn first_tier_answers() -> RawAnswerSet {
        RawAnswerSet::new()
            .with(1, "B")
            .with(2, "A")
            .with(3, "A")
            .with(4, "A")
            .with(5, "A")
            .with(6, "A")
    }

    #[test]
    fn test_tier_boundaries() {
        let t = SeverityConfig::default();
        assert_eq!(tier_for_score(120, &t), SeverityTier::NoneNeeded);
        assert_eq!(tier_for_score(103, &t), SeverityTier::NoneNeeded);
        assert_eq!(tier_for_score(102, &t), SeverityTier::Primary);
        assert_eq!(tier_for_score(60, &t), SeverityTier::Primary);
        assert_eq!(tier_for_score(59, &t), SeverityTier::Middle);
        assert_eq!(tier_for_score(45, &t), SeverityTier::Middle);
        assert_eq!(tier_for_score(44, &t), SeverityTier::Advanced);
        assert_eq!(tier_for_score(-40, &t), SeverityTier::Advanced);
    }

    #[test]
    fn test_perfect_sleep_short_circuits() {
        let outcome = scored(RawAnswerSet::new().with(1, "A").with(8, vec!["A", "B"]));
        assert_eq!(outcome, SeverityOutcome::Terminal(SpecialFlow::PerfectSleep));
        assert_eq!(outcome.score(), 100);
        assert_eq!(outcome.tier(), SeverityTier::NoneNeeded);
    }

    #[test]
    fn test_long_term_medication_short_circuits() {
        let outcome = scored(first_tier_answers().with(9, "C"));
        assert_eq!(
            outcome,
            SeverityOutcome::Terminal(SpecialFlow::LongTermMedication)
        );
        assert_eq!(outcome.score(), 30);
        assert_eq!(outcome.tier(), SeverityTier::Advanced);
    }

    #[test]
    fn test_flow_precedence_is_configurable() {
        let q = default_questionnaire();
        let answers = normalize(&RawAnswerSet::new().with(1, "A").with(9, "C"));
        assert_eq!(
            detect_special_flow(q, &answers, FlowPrecedence::PerfectSleepFirst),
            Some(SpecialFlow::PerfectSleep)
        );
        assert_eq!(
            detect_special_flow(q, &answers, FlowPrecedence::LongTermMedicationFirst),
            Some(SpecialFlow::LongTermMedication)
        );
    }

    #[test]
    fn test_first_tier_sum() {
        let outcome = scored(first_tier_answers().with(9, "A"));
        assert_eq!(
            outcome,
            SeverityOutcome::Scored {
                score: 64,
                tier: SeverityTier::Primary
            }
        );
    }

    #[test]
    fn test_multi_select_deductions() {
        let outcome = scored(
            first_tier_answers()
                .with(7, vec!["A", "B", "C"])
                .with(8, vec!["A", "E"]),
        );
        // 64 - 9 - 10
        assert_eq!(outcome.score(), 45);
        assert_eq!(outcome.tier(), SeverityTier::Middle);
    }

    #[test]
    fn test_none_options_deduct_nothing() {
        let outcome = scored(first_tier_answers().with(7, "E").with(8, "F"));
        assert_eq!(outcome.score(), 64);
    }

    #[test]
    fn test_medication_duration_excluded_by_default() {
        let q = default_questionnaire();
        let answers = normalize(&first_tier_answers().with(9, "A"));
        assert_eq!(severity_sum(q, &answers, false), 64);
        assert_eq!(severity_sum(q, &answers, true), 70);
    }

    #[test]
    fn test_missing_answers_contribute_zero() {
        let outcome = scored(RawAnswerSet::new());
        assert_eq!(
            outcome,
            SeverityOutcome::Scored {
                score: 0,
                tier: SeverityTier::Advanced
            }
        );
    }

    #[test]
    fn test_unknown_codes_contribute_zero() {
        let outcome = scored(RawAnswerSet::new().with(1, "B").with(2, "Z").with(7, vec!["Q"]));
        assert_eq!(outcome.score(), 10);
    }
}
