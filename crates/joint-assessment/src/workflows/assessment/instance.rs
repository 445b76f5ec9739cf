use super::catalog::{JointCatalog, Region};
use super::domain::{AssessmentError, AssessmentPhase, ClinicalField, DiseaseActivity};
use super::state::{AssessmentEvent, AssessmentStage, AssessmentState};
use super::views::{
    AssessmentOutcome, AssessmentSnapshot, ClinicalInputView, JointView, NavigationView,
    PrimaryAction, RegionView,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One assessment session: a shared catalog plus the state it walks.
#[derive(Debug, Clone)]
pub struct AssessmentInstance {
    catalog: Arc<JointCatalog>,
    state: AssessmentState,
}

impl AssessmentInstance {
    pub fn new(catalog: Arc<JointCatalog>) -> Self {
        Self {
            catalog,
            state: AssessmentState::initial(),
        }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(JointCatalog::standard()))
    }

    /// Applies `events` in order from a fresh state.
    pub fn replay<I>(catalog: Arc<JointCatalog>, events: I) -> Result<Self, ReplayError>
    where
        I: IntoIterator<Item = AssessmentEvent>,
    {
        let mut instance = Self::new(catalog);
        for (step, event) in events.into_iter().enumerate() {
            instance
                .apply(event)
                .map_err(|source| ReplayError { step, source })?;
        }
        Ok(instance)
    }

    pub fn catalog(&self) -> &JointCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &AssessmentState {
        &self.state
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.state.phase()
    }

    pub fn current_region(&self) -> Option<&Region> {
        self.state
            .region_index()
            .and_then(|index| self.catalog.region(index))
    }

    pub fn apply(&mut self, event: AssessmentEvent) -> Result<&AssessmentState, AssessmentError> {
        match self.state.transition(&self.catalog, &event) {
            Ok(next) => {
                self.commit(&event, next);
                Ok(&self.state)
            }
            Err(err) => {
                warn!(
                    event = event.kind(),
                    from = ?self.state.stage(),
                    error = %err,
                    "assessment event rejected"
                );
                Err(err)
            }
        }
    }

    /// Toggles `joint` in the current phase's selection. Returns whether it is now selected.
    pub fn select_joint(&mut self, joint: &str) -> Result<bool, AssessmentError> {
        let state = self.apply(AssessmentEvent::select_joint(joint))?;
        Ok(state
            .active_selection()
            .is_some_and(|selection| selection.contains(joint)))
    }

    pub fn advance(&mut self) -> AssessmentStage {
        let next = self.state.advanced(&self.catalog);
        self.commit(&AssessmentEvent::Advance, next);
        self.state.stage()
    }

    pub fn retreat(&mut self) -> AssessmentStage {
        let next = self.state.retreated(&self.catalog);
        self.commit(&AssessmentEvent::Retreat, next);
        self.state.stage()
    }

    /// Stores the clamped value and returns it.
    pub fn set_clinical_input(&mut self, field: ClinicalField, value: f64) -> f64 {
        let next = self.state.with_clinical_input(field, value);
        self.commit(&AssessmentEvent::SetClinicalInput { field, value }, next);
        self.state.inputs().get(field)
    }

    pub fn compute_score(&mut self) -> f64 {
        let next = self.state.scored();
        self.commit(&AssessmentEvent::ComputeScore, next);
        self.state.score().unwrap_or_default()
    }

    pub fn can_retreat(&self) -> bool {
        self.state.stage() != AssessmentStage::TenderJoints { region_index: 0 }
    }

    pub fn snapshot(&self) -> AssessmentSnapshot {
        let phase = self.phase();
        let title = match phase {
            AssessmentPhase::TenderJoints => "Tender Joint Assessment",
            AssessmentPhase::SwollenJoints => "Swollen Joint Assessment",
            AssessmentPhase::ClinicalAssessment => "Clinical Assessment",
            AssessmentPhase::Results => "Assessment Results",
        };
        let primary_action = PrimaryAction::for_phase(phase);

        AssessmentSnapshot {
            phase,
            phase_label: phase.label(),
            title: title.to_string(),
            region: self.region_view(),
            tender_count: self.state.tender_joints().len(),
            swollen_count: self.state.swollen_joints().len(),
            clinical_inputs: ClinicalField::ordered()
                .into_iter()
                .map(|field| ClinicalInputView::new(field, self.state.inputs().get(field)))
                .collect(),
            score: self.state.current_score(),
            navigation: NavigationView {
                can_retreat: self.can_retreat(),
                primary_action,
                primary_label: primary_action.label(),
            },
        }
    }

    /// The terminal summary, available only while in `Results`.
    pub fn outcome(&self, assessed_on: NaiveDate) -> Option<AssessmentOutcome> {
        let score = self.state.current_score()?;
        let activity = DiseaseActivity::from_score(score);
        let inputs = self.state.inputs();

        Some(AssessmentOutcome {
            assessed_on,
            tender_count: self.state.tender_joints().len(),
            swollen_count: self.state.swollen_joints().len(),
            tender_joints: self.state.tender_joints().iter().cloned().collect(),
            swollen_joints: self.state.swollen_joints().iter().cloned().collect(),
            pga_mm: inputs.pga(),
            ega_mm: inputs.ega(),
            crp_mg_per_l: inputs.crp(),
            score,
            disease_activity: activity,
            disease_activity_label: activity.label(),
        })
    }

    fn commit(&mut self, event: &AssessmentEvent, next: AssessmentState) {
        let from = self.state.stage();
        debug!(event = event.kind(), ?from, to = ?next.stage(), "assessment event applied");
        let scored = from != AssessmentStage::Results
            || matches!(event, AssessmentEvent::ComputeScore);
        if scored && next.stage() == AssessmentStage::Results {
            info!(
                score = next.score(),
                tender = next.tender_joints().len(),
                swollen = next.swollen_joints().len(),
                "assessment score computed"
            );
        }
        self.state = next;
    }

    fn region_view(&self) -> Option<RegionView> {
        let index = self.state.region_index()?;
        let region = self.catalog.region(index)?;
        let selection = self.state.active_selection()?;
        let finding = match self.phase() {
            AssessmentPhase::TenderJoints => "tender",
            _ => "swollen",
        };

        Some(RegionView {
            index,
            position_label: format!("Region {} of {}", index + 1, self.catalog.region_count()),
            name: region.name.clone(),
            prompt: format!(
                "Select all {finding} joints in the {} region",
                region.name
            ),
            joints: region
                .joints
                .iter()
                .map(|joint| JointView {
                    name: joint.clone(),
                    selected: selection.contains(joint),
                })
                .collect(),
            selected_count: selection.len(),
        })
    }
}

/// An event in a replayed sequence was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("event #{step} rejected: {source}")]
pub struct ReplayError {
    pub step: usize,
    #[source]
    pub source: AssessmentError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessed_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 2).expect("valid date")
    }

    #[test]
    fn snapshot_describes_the_first_region() {
        let mut instance = AssessmentInstance::standard();
        instance.select_joint("Cervical Spine").expect("toggle");

        let snapshot = instance.snapshot();
        assert_eq!(snapshot.phase, AssessmentPhase::TenderJoints);
        assert_eq!(snapshot.title, "Tender Joint Assessment");
        let region = snapshot.region.expect("region view");
        assert_eq!(region.name, "Head & Neck");
        assert_eq!(region.position_label, "Region 1 of 5");
        assert_eq!(
            region.prompt,
            "Select all tender joints in the Head & Neck region"
        );
        assert!(region
            .joints
            .iter()
            .any(|joint| joint.name == "Cervical Spine" && joint.selected));
        assert_eq!(region.selected_count, 1);
        assert!(!snapshot.navigation.can_retreat);
        assert_eq!(snapshot.navigation.primary_action, PrimaryAction::Next);
        assert!(snapshot.score.is_none());
    }

    #[test]
    fn snapshot_in_clinical_phase_offers_score_calculation() {
        let mut instance = AssessmentInstance::standard();
        while instance.phase() != AssessmentPhase::ClinicalAssessment {
            instance.advance();
        }
        instance.set_clinical_input(ClinicalField::Pga, 42.4);

        let snapshot = instance.snapshot();
        assert!(snapshot.region.is_none());
        assert!(snapshot.navigation.can_retreat);
        assert_eq!(snapshot.navigation.primary_label, "Calculate SDAI");
        let pga = &snapshot.clinical_inputs[0];
        assert_eq!(pga.field, ClinicalField::Pga);
        assert_eq!(pga.display, "42 mm");
    }

    #[test]
    fn select_joint_reports_new_membership() {
        let mut instance = AssessmentInstance::standard();
        assert_eq!(instance.select_joint("Knee"), Ok(true));
        assert_eq!(instance.select_joint("Knee"), Ok(false));
    }

    #[test]
    fn rejected_events_do_not_change_state() {
        let mut instance = AssessmentInstance::standard();
        instance.select_joint("Hip").expect("toggle");
        let before = instance.state().clone();

        let error = instance.select_joint("Elbows").expect_err("unknown joint");
        assert_eq!(error, AssessmentError::UnknownJoint("Elbows".to_string()));
        assert_eq!(instance.state(), &before);
    }

    #[test]
    fn outcome_requires_results_phase() {
        let mut instance = AssessmentInstance::standard();
        assert!(instance.outcome(assessed_on()).is_none());

        instance.select_joint("Wrist").expect("toggle");
        instance.set_clinical_input(ClinicalField::Pga, 30.0);
        instance.set_clinical_input(ClinicalField::Ega, 20.0);
        instance.set_clinical_input(ClinicalField::Crp, 0.8);
        assert_eq!(instance.compute_score(), 6.8);

        let outcome = instance.outcome(assessed_on()).expect("outcome in results");
        assert_eq!(outcome.tender_joints, vec!["Wrist".to_string()]);
        assert_eq!(outcome.disease_activity, DiseaseActivity::Low);
        assert!(outcome
            .summary_lines()
            .contains(&"SDAI Score: 6.8".to_string()));

        instance.retreat();
        assert!(instance.outcome(assessed_on()).is_none());
    }

    #[test]
    fn replay_reports_the_rejected_step() {
        let events = vec![
            AssessmentEvent::select_joint("Shoulder"),
            AssessmentEvent::Advance,
            AssessmentEvent::select_joint("Toe"),
        ];
        let error = AssessmentInstance::replay(Arc::new(JointCatalog::standard()), events)
            .expect_err("third event rejected");
        assert_eq!(error.step, 2);
        assert_eq!(error.source, AssessmentError::UnknownJoint("Toe".to_string()));
    }
}
