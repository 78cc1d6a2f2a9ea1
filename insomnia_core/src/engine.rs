//! Diagnosis engine composing every scoring stage.
//!
//! ## Analysis flow
//!
//! 1. **Normalize** the raw answers into per-question code lists
//! 2. **Severity**: special flows short-circuit here with a canned plan
//! 3. **Patterns**: five axis counters from questions 10-19
//! 4. **Syndrome**: dominant root x dominant depletion matrix cell
//! 5. **Treatment** and **confidence**
//!
//! The engine holds only immutable tables and configuration, so one instance
//! can serve any number of threads concurrently.

use crate::catalog::{default_questionnaire, Questionnaire};
use crate::normalize::{normalize, NormalizedAnswers};
use crate::severity::{score_severity, SeverityOutcome, SpecialFlow};
use crate::syndrome::{classify, SyndromeMatrix};
use crate::treatment::{default_treatments, plan_treatment, special_flow_plan, TreatmentCatalog};
use crate::{confidence, pattern, Config, DiagnosisResult, Error, PatternScores, RawAnswerSet, Result};
use once_cell::sync::Lazy;

/// Engine with the built-in tables and default configuration
static DEFAULT_ENGINE: Lazy<DiagnosisEngine> = Lazy::new(DiagnosisEngine::default);

/// Analyze raw answers with the built-in tables and default configuration
pub fn analyze(raw: &RawAnswerSet) -> DiagnosisResult {
    DEFAULT_ENGINE.analyze(raw)
}

/// Scoring tables plus configuration
#[derive(Clone, Debug)]
pub struct DiagnosisEngine {
    questionnaire: Questionnaire,
    matrix: SyndromeMatrix,
    treatments: TreatmentCatalog,
    config: Config,
}

impl Default for DiagnosisEngine {
    fn default() -> Self {
        Self {
            questionnaire: default_questionnaire().clone(),
            matrix: SyndromeMatrix::default(),
            treatments: default_treatments().clone(),
            config: Config::default(),
        }
    }
}

impl DiagnosisEngine {
    /// Build an engine from injected tables, validating them first
    pub fn new(
        questionnaire: Questionnaire,
        matrix: SyndromeMatrix,
        treatments: TreatmentCatalog,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;

        let errors = questionnaire.validate();
        if !errors.is_empty() {
            return Err(Error::QuestionnaireValidation(errors.join("; ")));
        }

        Ok(Self {
            questionnaire,
            matrix,
            treatments,
            config,
        })
    }

    /// Built-in tables with a custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Self::new(
            default_questionnaire().clone(),
            SyndromeMatrix::default(),
            default_treatments().clone(),
            config,
        )
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.questionnaire
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze a raw answer payload; never fails
    pub fn analyze(&self, raw: &RawAnswerSet) -> DiagnosisResult {
        let answers = normalize(raw);
        self.analyze_normalized(&answers)
    }

    /// Analyze answers that have already been normalized
    pub fn analyze_normalized(&self, answers: &NormalizedAnswers) -> DiagnosisResult {
        let (score, tier) = match score_severity(&self.questionnaire, answers, &self.config) {
            SeverityOutcome::Terminal(flow) => return self.terminal_result(flow),
            SeverityOutcome::Scored { score, tier } => (score, tier),
        };

        let pattern_scores = pattern::score_patterns(&self.questionnaire, answers);
        let classification = classify(&self.matrix, &pattern_scores);
        let treatment_plan = plan_treatment(
            &self.treatments,
            &self.config.treatment,
            score,
            tier,
            &classification,
            &pattern_scores,
        );
        let confidence = confidence::estimate(
            score,
            &pattern_scores,
            self.config.confidence.pattern_axis_cap,
        );

        let result = DiagnosisResult {
            severity_score: score,
            severity_tier: tier,
            syndrome: Some(classification.syndrome),
            pattern_scores,
            treatment_plan,
            confidence,
        };
        tracing::info!("Diagnosis: {}", result.description());
        result
    }

    fn terminal_result(&self, flow: SpecialFlow) -> DiagnosisResult {
        tracing::info!("Diagnosis: special flow {:?}", flow);

        DiagnosisResult {
            severity_score: flow.sentinel_score(),
            severity_tier: flow.tier(),
            syndrome: None,
            pattern_scores: PatternScores::default(),
            treatment_plan: special_flow_plan(flow),
            confidence: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowPrecedence;
    use crate::{SeverityTier, SpecialFlag, Syndrome};

    fn scenario_a() -> RawAnswerSet {
        let mut raw = RawAnswerSet::new()
            .with(1, "B")
            .with(2, "A")
            .with(3, "A")
            .with(4, "A")
            .with(5, "A")
            .with(6, "A")
            .with(7, Vec::<&str>::new())
            .with(8, Vec::<&str>::new())
            .with(9, "A");
        for id in 10..=14 {
            raw.insert(id, "no");
        }
        for id in 15..=19 {
            raw.insert(id, Vec::<&str>::new());
        }
        raw
    }

    #[test]
    fn test_scenario_a_first_tier_answers() {
        crate::logging::init_test();
        let result = analyze(&scenario_a());
        assert_eq!(result.severity_score, 64);
        assert_eq!(result.severity_tier, SeverityTier::Primary);
        assert_eq!(result.pattern_scores, PatternScores::default());
        assert_eq!(result.syndrome, Some(Syndrome::LiverKidneyDeficiency));
        assert_eq!(
            result.treatment_plan.products,
            vec!["Tea Blend 3 (liver-nourishing)", "Milk Powder"]
        );
        // (0.64 + 0) / 2
        assert_eq!(result.confidence, 0.32);
    }

    #[test]
    fn test_scenario_b_perfect_sleep() {
        let result = analyze(&scenario_a().with(1, "A").with(9, "C"));
        assert_eq!(result.severity_tier, SeverityTier::NoneNeeded);
        assert_eq!(result.severity_score, 100);
        assert_eq!(result.syndrome, None);
        assert_eq!(
            result.treatment_plan.special_flag,
            Some(SpecialFlag::PerfectSleep)
        );
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_scenario_c_long_term_medication() {
        let result = analyze(&scenario_a().with(9, "C"));
        assert_eq!(result.severity_tier, SeverityTier::Advanced);
        assert_eq!(result.severity_score, 30);
        assert_eq!(result.syndrome, None);
        assert_eq!(
            result.treatment_plan.special_flag,
            Some(SpecialFlag::LongTermMedication)
        );
    }

    #[test]
    fn test_precedence_config_changes_verdict() {
        let mut config = Config::default();
        config.flows.precedence = FlowPrecedence::LongTermMedicationFirst;
        let engine = DiagnosisEngine::with_config(config).unwrap();

        let result = engine.analyze(&scenario_a().with(1, "A").with(9, "C"));
        assert_eq!(
            result.treatment_plan.special_flag,
            Some(SpecialFlag::LongTermMedication)
        );
    }

    #[test]
    fn test_include_medication_duration_config() {
        let mut config = Config::default();
        config.severity.include_medication_duration = true;
        let engine = DiagnosisEngine::with_config(config).unwrap();

        let result = engine.analyze(&scenario_a());
        assert_eq!(result.severity_score, 70);
    }

    #[test]
    fn test_middle_tier_full_plan() {
        let raw = scenario_a()
            .with(7, vec!["A", "B", "C"])
            .with(8, vec!["A"])
            .with(12, "yes")
            .with(17, vec!["A", "B"])
            .with(14, "yes");
        let result = analyze(&raw);
        // 64 - 9 - 5
        assert_eq!(result.severity_score, 50);
        assert_eq!(result.severity_tier, SeverityTier::Middle);
        assert_eq!(result.syndrome, Some(Syndrome::Neurasthenia));
        assert_eq!(result.treatment_plan.products, vec!["Milk Powder", "Fish Oil"]);
        assert!(result.treatment_plan.acupoint_therapy.is_some());
    }

    #[test]
    fn test_empty_answers_degrade_gracefully() {
        let result = analyze(&RawAnswerSet::new());
        assert_eq!(result.severity_score, 0);
        assert_eq!(result.severity_tier, SeverityTier::Advanced);
        assert_eq!(result.syndrome, Some(Syndrome::LiverKidneyDeficiency));
        assert_eq!(
            result.treatment_plan.special_flag,
            Some(SpecialFlag::CustomProgram)
        );
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_description_line() {
        let result = analyze(&scenario_a());
        assert_eq!(
            result.description(),
            "64 points, Primary insomnia, syndrome: Liver stagnation with kidney deficiency, \
             confidence: 32.0%"
        );

        let terminal = analyze(&RawAnswerSet::new().with(1, "A"));
        assert_eq!(
            terminal.description(),
            "100 points, No treatment needed, confidence: 100.0%"
        );
    }

    #[test]
    fn test_confidence_half_cent_rounds_to_even() {
        // (0 + 1/4) / 2 = 0.125
        let result = analyze(&RawAnswerSet::new().with(10, "yes"));
        assert_eq!(result.pattern_scores.liver_intestine, 1);
        assert_eq!(result.confidence, 0.12);
    }

    #[test]
    fn test_new_rejects_invalid_questionnaire() {
        let mut questionnaire = default_questionnaire().clone();
        questionnaire.questions.pop();
        let err = DiagnosisEngine::new(
            questionnaire,
            SyndromeMatrix::default(),
            default_treatments().clone(),
            Config::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::QuestionnaireValidation(_)));
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let mut config = Config::default();
        config.severity.primary_min = 10;
        config.severity.middle_min = 10;
        assert!(matches!(
            DiagnosisEngine::with_config(config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_result_serializes_with_stable_names() {
        let json = serde_json::to_value(analyze(&scenario_a())).unwrap();
        assert_eq!(json["severityScore"], 64);
        assert_eq!(json["severityTier"], "PRIMARY");
        assert_eq!(json["syndrome"], "LIVER_KIDNEY_DEFICIENCY");
        assert_eq!(json["patternScores"]["liverIntestine"], 0);
        assert_eq!(json["patternScores"]["brainMarrow"], 0);
        assert!(json["treatmentPlan"]["acupointTherapy"].is_null());
        assert!(json["treatmentPlan"].get("specialFlag").is_some());

        let terminal = serde_json::to_value(analyze(&RawAnswerSet::new().with(1, "A"))).unwrap();
        assert!(terminal["syndrome"].is_null());
        assert_eq!(terminal["treatmentPlan"]["specialFlag"], "perfect_sleep");
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiagnosisEngine>();
    }
}
