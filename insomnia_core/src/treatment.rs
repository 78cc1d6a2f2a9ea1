//! Treatment planning.
//!
//! Dispatches on severity tier:
//! - NONE_NEEDED: nothing to buy, keep current habits
//! - fixed tea score: a single tea, independent of syndrome
//! - PRIMARY: tea for the dominant root-cause axis + milk powder
//! - MIDDLE: milk powder + nuts or fish oil + syndrome acupoint therapy
//! - ADVANCED: custom program flagged for bespoke follow-up

use crate::config::TreatmentConfig;
use crate::severity::SpecialFlow;
use crate::syndrome::{dominant_root, SyndromeClassification};
use crate::types::{DepletionAxis, PatternScores, SeverityTier, SpecialFlag, Syndrome, TreatmentPlan};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Cached default treatment catalog
static DEFAULT_TREATMENTS: Lazy<TreatmentCatalog> = Lazy::new(TreatmentCatalog::default);

/// Get a reference to the cached default treatment catalog
pub fn default_treatments() -> &'static TreatmentCatalog {
    &DEFAULT_TREATMENTS
}

/// Syndrome-specific therapies
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyndromeRemedy {
    pub acupoint_therapy: String,
    pub dietary_therapy: Vec<String>,
    pub lifestyle_advice: Vec<String>,
}

/// Product names and per-syndrome therapy tables
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TreatmentCatalog {
    pub base_product: String,
    pub fixed_tea: String,
    /// Indexed by `RootAxis::index`
    pub root_teas: [String; 3],
    /// Indexed by `DepletionAxis::index`
    pub depletion_supplements: [String; 2],
    pub advanced_products: Vec<String>,
    /// Indexed by `Syndrome::index`
    pub remedies: [SyndromeRemedy; 6],
}

fn remedy(acupoints: &str, diet: [&str; 2], lifestyle: [&str; 3]) -> SyndromeRemedy {
    SyndromeRemedy {
        acupoint_therapy: format!("Acupoint patch ({})", acupoints),
        dietary_therapy: diet.iter().map(|s| s.to_string()).collect(),
        lifestyle_advice: lifestyle.iter().map(|s| s.to_string()).collect(),
    }
}

impl Default for TreatmentCatalog {
    fn default() -> Self {
        Self {
            base_product: "Milk Powder".into(),
            fixed_tea: "Tea Blend 1".into(),
            root_teas: [
                "Tea Blend 3 (liver-nourishing)".into(),
                "Tea Blend 3 (blood-nourishing)".into(),
                "Tea Blend 3 (spirit-calming)".into(),
            ],
            depletion_supplements: ["Nuts".into(), "Fish Oil".into()],
            advanced_products: vec!["Pills No. 2".into(), "Milk Powder".into()],
            remedies: [
                remedy(
                    "Ganshu, Shenshu, Taichong, Taixi",
                    ["Goji and chrysanthemum tea", "Black sesame and walnut powder"],
                    ["Regulate emotions", "Exercise moderately", "Keep a regular schedule"],
                ),
                remedy(
                    "Ganshu, Baihui, Shenmen, Yintang",
                    ["Longan tea", "Walnut congee"],
                    ["Reduce mental workload", "Regulate emotions", "Massage the scalp"],
                ),
                remedy(
                    "Pishu, Weishu, Zusanli, Xuehai",
                    ["Red date and longan soup", "Angelica, ginger and mutton soup"],
                    ["Eat a balanced diet", "Exercise moderately", "Avoid overexertion"],
                ),
                remedy(
                    "Xinshu, Shenmen, Neiguan, Sanyinjiao",
                    ["Hawthorn tea", "Rose tea"],
                    ["Stay physically active", "Keep a relaxed mood", "Avoid sitting for long periods"],
                ),
                remedy(
                    "Shenshu, Mingmen, Guanyuan, Yongquan",
                    ["Black bean soup", "Sea cucumber congee"],
                    ["Get plenty of rest", "Practise moderation", "Keep warm"],
                ),
                remedy(
                    "Baihui, Shenting, Anmian, Shenmen",
                    ["Sour jujube seed decoction", "Lily bulb and lotus seed soup"],
                    ["Relaxation training", "Keep a regular schedule", "Reduce stimulation"],
                ),
            ],
        }
    }
}

impl TreatmentCatalog {
    pub fn remedy(&self, syndrome: Syndrome) -> &SyndromeRemedy {
        &self.remedies[syndrome.index()]
    }

    pub fn supplement(&self, depletion: DepletionAxis) -> &str {
        &self.depletion_supplements[depletion.index()]
    }
}

/// Canned plan for a special flow, returned verbatim
pub fn special_flow_plan(flow: SpecialFlow) -> TreatmentPlan {
    match flow {
        SpecialFlow::PerfectSleep => TreatmentPlan {
            message: Some(
                "Your sleep quality is good. Keep up your healthy routine.".into(),
            ),
            special_flag: Some(SpecialFlag::PerfectSleep),
            ..TreatmentPlan::basic("Sleep quality is good", "Maintain current habits")
        },
        SpecialFlow::LongTermMedication => TreatmentPlan {
            message: Some(
                "You have relied on sleep medication for a long time. A senior consultant \
                 should design a personalised tapering and treatment program."
                    .into(),
            ),
            products: vec!["Professional consultation".into()],
            acupoint_therapy: Some("Senior consultant custom program".into()),
            special_flag: Some(SpecialFlag::LongTermMedication),
            ..TreatmentPlan::basic("Long-term medication insomnia", "Consult a specialist")
        },
    }
}

/// Build the plan for a normally scored diagnosis
pub fn plan_treatment(
    catalog: &TreatmentCatalog,
    config: &TreatmentConfig,
    score: i32,
    tier: SeverityTier,
    classification: &SyndromeClassification,
    scores: &PatternScores,
) -> TreatmentPlan {
    if tier != SeverityTier::NoneNeeded && config.fixed_tea_trigger() == Some(score) {
        return TreatmentPlan {
            products: vec![catalog.fixed_tea.clone()],
            ..TreatmentPlan::basic(format!("{} ({})", tier.label(), score), "Maintain")
        };
    }

    match tier {
        SeverityTier::NoneNeeded => TreatmentPlan::basic(tier.label(), "Maintain current habits"),
        SeverityTier::Primary => {
            // Recomputed from raw scores, independent of the classification
            let root = dominant_root(scores);
            let tea = catalog.root_teas[root.index()].clone();
            TreatmentPlan {
                recommendation_text: format!("{} + {}", tea, catalog.base_product),
                products: vec![tea, catalog.base_product.clone()],
                ..TreatmentPlan::basic(tier.label(), "")
            }
        }
        SeverityTier::Middle => {
            let supplement = catalog.supplement(classification.depletion).to_string();
            let remedy = catalog.remedy(classification.syndrome);
            TreatmentPlan {
                products: vec![catalog.base_product.clone(), supplement],
                acupoint_therapy: Some(remedy.acupoint_therapy.clone()),
                dietary_therapy: Some(remedy.dietary_therapy.clone()),
                lifestyle_advice: Some(remedy.lifestyle_advice.clone()),
                ..TreatmentPlan::basic(
                    tier.label(),
                    format!(
                        "{} + nutritional supplement + physiotherapy",
                        catalog.base_product
                    ),
                )
            }
        }
        SeverityTier::Advanced => TreatmentPlan {
            message: Some("A bespoke program requires follow-up with a consultant.".into()),
            products: catalog.advanced_products.clone(),
            special_flag: Some(SpecialFlag::CustomProgram),
            ..TreatmentPlan::basic(tier.label(), "Custom program")
        },
    }
}
