//! Tender/swollen joint assessment: region catalog, phase state machine, composite scoring,
//! presentation views and the HTTP surface built on top of them.

pub mod catalog;
pub mod domain;
mod instance;
pub mod router;
pub mod scoring;
pub mod service;
mod state;
pub mod views;

pub use catalog::{CatalogError, JointCatalog, Region};
pub use domain::{
    AssessmentError, AssessmentPhase, ClinicalField, ClinicalInputs, DiseaseActivity,
};
pub use instance::{AssessmentInstance, ReplayError};
pub use router::assessment_router;
pub use service::{
    AssessmentService, AssessmentServiceError, OutcomePublisher, PublishError, ReplayReport,
    TracingOutcomePublisher,
};
pub use state::{AssessmentEvent, AssessmentStage, AssessmentState};
pub use views::{AssessmentOutcome, AssessmentSnapshot, NavigationView, PrimaryAction};
