//! Syndrome classification.
//!
//! The dominant root-cause axis and the dominant depletion axis select one
//! cell of a 3x2 matrix. Ties are broken by the axes' declared priority
//! order, never by map iteration order.

use crate::types::{DepletionAxis, PatternScores, RootAxis, Syndrome};
use serde::{Deserialize, Serialize};

/// Total (root, depletion) -> syndrome table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyndromeMatrix {
    /// Rows indexed by `RootAxis::index`, columns by `DepletionAxis::index`
    pub cells: [[Syndrome; 2]; 3],
}

impl Default for SyndromeMatrix {
    fn default() -> Self {
        Self {
            cells: [
                [Syndrome::LiverKidneyDeficiency, Syndrome::LiverBrainDeficiency],
                [Syndrome::QiBloodDeficiency, Syndrome::QiBloodStasis],
                [Syndrome::EssenceDeficiency, Syndrome::Neurasthenia],
            ],
        }
    }
}

impl SyndromeMatrix {
    pub fn lookup(&self, root: RootAxis, depletion: DepletionAxis) -> Syndrome {
        self.cells[root.index()][depletion.index()]
    }
}

/// Result of classification, including the axes that selected the cell
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyndromeClassification {
    pub root: RootAxis,
    pub depletion: DepletionAxis,
    pub syndrome: Syndrome,
}

/// Highest root-cause axis; ties go to the earlier axis in `RootAxis::PRIORITY`
pub fn dominant_root(scores: &PatternScores) -> RootAxis {
    let mut best = RootAxis::PRIORITY[0];
    for axis in RootAxis::PRIORITY {
        if scores.root(axis) > scores.root(best) {
            best = axis;
        }
    }
    best
}

/// Highest depletion axis; ties go to the earlier axis in `DepletionAxis::PRIORITY`
pub fn dominant_depletion(scores: &PatternScores) -> DepletionAxis {
    let mut best = DepletionAxis::PRIORITY[0];
    for axis in DepletionAxis::PRIORITY {
        if scores.depletion(axis) > scores.depletion(best) {
            best = axis;
        }
    }
    best
}

/// Classify pattern scores into a syndrome
pub fn classify(matrix: &SyndromeMatrix, scores: &PatternScores) -> SyndromeClassification {
    let root = dominant_root(scores);
    let depletion = dominant_depletion(scores);
    let syndrome = matrix.lookup(root, depletion);
    tracing::debug!("Classified ({:?}, {:?}) -> {:?}", root, depletion, syndrome);

    SyndromeClassification {
        root,
        depletion,
        syndrome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn scores(li: u32, bl: u32, ne: u32, bo: u32, br: u32) -> PatternScores {
        PatternScores {
            liver_intestine: li,
            blood: bl,
            neural: ne,
            bone_marrow: bo,
            brain_marrow: br,
        }
    }

    #[test]
    fn test_all_zero_uses_priority() {
        let c = classify(&SyndromeMatrix::default(), &PatternScores::default());
        assert_eq!(c.root, RootAxis::LiverIntestine);
        assert_eq!(c.depletion, DepletionAxis::BoneMarrow);
        assert_eq!(c.syndrome, Syndrome::LiverKidneyDeficiency);
    }

    #[test]
    fn test_root_tie_breaks() {
        assert_eq!(dominant_root(&scores(0, 3, 3, 0, 0)), RootAxis::Blood);
        assert_eq!(dominant_root(&scores(2, 2, 2, 0, 0)), RootAxis::LiverIntestine);
        assert_eq!(dominant_root(&scores(1, 0, 2, 0, 0)), RootAxis::Neural);
    }

    #[test]
    fn test_depletion_tie_breaks() {
        assert_eq!(dominant_depletion(&scores(0, 0, 0, 2, 2)), DepletionAxis::BoneMarrow);
        assert_eq!(dominant_depletion(&scores(0, 0, 0, 1, 2)), DepletionAxis::BrainMarrow);
    }

    #[test]
    fn test_matrix_cells() {
        let m = SyndromeMatrix::default();
        let expected = [
            (RootAxis::LiverIntestine, DepletionAxis::BoneMarrow, Syndrome::LiverKidneyDeficiency),
            (RootAxis::LiverIntestine, DepletionAxis::BrainMarrow, Syndrome::LiverBrainDeficiency),
            (RootAxis::Blood, DepletionAxis::BoneMarrow, Syndrome::QiBloodDeficiency),
            (RootAxis::Blood, DepletionAxis::BrainMarrow, Syndrome::QiBloodStasis),
            (RootAxis::Neural, DepletionAxis::BoneMarrow, Syndrome::EssenceDeficiency),
            (RootAxis::Neural, DepletionAxis::BrainMarrow, Syndrome::Neurasthenia),
        ];
        for (root, depletion, syndrome) in expected {
            assert_eq!(m.lookup(root, depletion), syndrome);
        }
    }

    #[test]
    fn test_matrix_is_total_and_covers_every_syndrome() {
        let m = SyndromeMatrix::default();
        let mut seen = HashSet::new();
        for root in RootAxis::PRIORITY {
            for depletion in DepletionAxis::PRIORITY {
                seen.insert(m.lookup(root, depletion));
            }
        }
        assert_eq!(seen.len(), Syndrome::ALL.len());
    }

    #[test]
    fn test_classify_dominant_cell() {
        let c = classify(&SyndromeMatrix::default(), &scores(1, 0, 4, 0, 3));
        assert_eq!(c.syndrome, Syndrome::Neurasthenia);
    }

    #[test]
    fn test_alternate_matrix_is_used() {
        let mut m = SyndromeMatrix::default();
        m.cells[0][0] = Syndrome::Neurasthenia;
        let c = classify(&m, &PatternScores::default());
        assert_eq!(c.syndrome, Syndrome::Neurasthenia);
        assert_eq!(c.depletion, DepletionAxis::BoneMarrow);
    }
}
