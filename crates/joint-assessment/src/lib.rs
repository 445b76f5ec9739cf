//! Guided joint assessment: tender and swollen joint selection across an anatomical region
//! catalog, clinician global assessments and CRP, and an SDAI-style composite score.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
