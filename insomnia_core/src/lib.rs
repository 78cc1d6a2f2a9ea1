#![forbid(unsafe_code)]

//! Deterministic scoring engine for the 19-question sleep intake questionnaire.
//!
//! This crate provides:
//! - The questionnaire definition and its score tables
//! - Answer normalization for loosely typed payloads
//! - Severity scoring with the two short-circuit special flows
//! - Pattern scoring, syndrome classification and treatment planning
//! - A confidence estimate
//!
//! The single entry point most callers need is [`analyze`].

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod normalize;
pub mod severity;
pub mod pattern;
pub mod syndrome;
pub mod treatment;
pub mod confidence;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_questionnaire, default_questionnaire, Questionnaire};
pub use config::Config;
pub use normalize::{normalize, NormalizedAnswers};
pub use severity::{SeverityOutcome, SpecialFlow};
pub use syndrome::{SyndromeClassification, SyndromeMatrix};
pub use treatment::TreatmentCatalog;
pub use engine::{analyze, DiagnosisEngine};
