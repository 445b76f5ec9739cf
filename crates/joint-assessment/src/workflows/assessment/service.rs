use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::catalog::JointCatalog;
use super::instance::{AssessmentInstance, ReplayError};
use super::state::AssessmentEvent;
use super::views::{AssessmentOutcome, AssessmentSnapshot};

/// Collaborator receiving the terminal outcome (display, EHR adapters, audit logs).
pub trait OutcomePublisher: Send + Sync {
    fn publish(&self, outcome: &AssessmentOutcome) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("outcome transport unavailable: {0}")]
    Transport(String),
}

/// Publisher that only records outcomes in the trace log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOutcomePublisher;

impl OutcomePublisher for TracingOutcomePublisher {
    fn publish(&self, outcome: &AssessmentOutcome) -> Result<(), PublishError> {
        info!(
            assessed_on = %outcome.assessed_on,
            score = outcome.score,
            activity = outcome.disease_activity_label,
            tender = outcome.tender_count,
            swollen = outcome.swollen_count,
            "assessment outcome published"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub snapshot: AssessmentSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AssessmentOutcome>,
}

/// Stateless facade: each call replays events against a fresh instance.
pub struct AssessmentService<P> {
    catalog: Arc<JointCatalog>,
    publisher: Arc<P>,
}

impl<P> AssessmentService<P>
where
    P: OutcomePublisher + 'static,
{
    pub fn new(catalog: Arc<JointCatalog>, publisher: Arc<P>) -> Self {
        Self { catalog, publisher }
    }

    pub fn catalog(&self) -> &JointCatalog {
        &self.catalog
    }

    /// Replays `events`; publishes the outcome when the sequence ends in `Results`.
    pub fn replay(
        &self,
        events: Vec<AssessmentEvent>,
        assessed_on: NaiveDate,
    ) -> Result<ReplayReport, AssessmentServiceError> {
        let instance = AssessmentInstance::replay(self.catalog.clone(), events)?;
        let outcome = instance.outcome(assessed_on);

        if let Some(outcome) = &outcome {
            self.publisher.publish(outcome)?;
        }

        Ok(ReplayReport {
            snapshot: instance.snapshot(),
            outcome,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}
