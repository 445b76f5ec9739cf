use super::catalog::JointCatalog;
use super::domain::{AssessmentError, AssessmentPhase, ClinicalField, ClinicalInputs};
use super::scoring::composite_score;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Where the workflow currently is. The region index only exists in the two joint phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum AssessmentStage {
    TenderJoints { region_index: usize },
    SwollenJoints { region_index: usize },
    ClinicalAssessment,
    Results,
}

impl AssessmentStage {
    pub const fn phase(self) -> AssessmentPhase {
        match self {
            Self::TenderJoints { .. } => AssessmentPhase::TenderJoints,
            Self::SwollenJoints { .. } => AssessmentPhase::SwollenJoints,
            Self::ClinicalAssessment => AssessmentPhase::ClinicalAssessment,
            Self::Results => AssessmentPhase::Results,
        }
    }

    pub const fn region_index(self) -> Option<usize> {
        match self {
            Self::TenderJoints { region_index } | Self::SwollenJoints { region_index } => {
                Some(region_index)
            }
            Self::ClinicalAssessment | Self::Results => None,
        }
    }
}

/// Inputs accepted by the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssessmentEvent {
    SelectJoint { joint: String },
    Advance,
    Retreat,
    SetClinicalInput { field: ClinicalField, value: f64 },
    ComputeScore,
}

impl AssessmentEvent {
    pub fn select_joint(joint: impl Into<String>) -> Self {
        Self::SelectJoint {
            joint: joint.into(),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SelectJoint { .. } => "select_joint",
            Self::Advance => "advance",
            Self::Retreat => "retreat",
            Self::SetClinicalInput { .. } => "set_clinical_input",
            Self::ComputeScore => "compute_score",
        }
    }
}

/// Immutable assessment state. Every transition returns a new value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentState {
    stage: AssessmentStage,
    tender_joints: BTreeSet<String>,
    swollen_joints: BTreeSet<String>,
    inputs: ClinicalInputs,
    score: Option<f64>,
}

impl Default for AssessmentState {
    fn default() -> Self {
        Self::initial()
    }
}

impl AssessmentState {
    pub fn initial() -> Self {
        Self {
            stage: AssessmentStage::TenderJoints { region_index: 0 },
            tender_joints: BTreeSet::new(),
            swollen_joints: BTreeSet::new(),
            inputs: ClinicalInputs::default(),
            score: None,
        }
    }

    pub fn stage(&self) -> AssessmentStage {
        self.stage
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.stage.phase()
    }

    pub fn region_index(&self) -> Option<usize> {
        self.stage.region_index()
    }

    pub fn tender_joints(&self) -> &BTreeSet<String> {
        &self.tender_joints
    }

    pub fn swollen_joints(&self) -> &BTreeSet<String> {
        &self.swollen_joints
    }

    pub fn inputs(&self) -> &ClinicalInputs {
        &self.inputs
    }

    /// Last computed score. Kept after retreating out of `Results`, where it is stale.
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// The score, but only while it reflects the current inputs (i.e. in `Results`).
    pub fn current_score(&self) -> Option<f64> {
        match self.stage {
            AssessmentStage::Results => self.score,
            _ => None,
        }
    }

    /// Selection set owned by the current phase, if the phase selects joints.
    pub fn active_selection(&self) -> Option<&BTreeSet<String>> {
        match self.stage {
            AssessmentStage::TenderJoints { .. } => Some(&self.tender_joints),
            AssessmentStage::SwollenJoints { .. } => Some(&self.swollen_joints),
            AssessmentStage::ClinicalAssessment | AssessmentStage::Results => None,
        }
    }

    pub fn transition(
        &self,
        catalog: &JointCatalog,
        event: &AssessmentEvent,
    ) -> Result<Self, AssessmentError> {
        match event {
            AssessmentEvent::SelectJoint { joint } => self.with_joint_toggled(catalog, joint),
            AssessmentEvent::Advance => Ok(self.advanced(catalog)),
            AssessmentEvent::Retreat => Ok(self.retreated(catalog)),
            AssessmentEvent::SetClinicalInput { field, value } => {
                Ok(self.with_clinical_input(*field, *value))
            }
            AssessmentEvent::ComputeScore => Ok(self.scored()),
        }
    }

    pub fn with_joint_toggled(
        &self,
        catalog: &JointCatalog,
        joint: &str,
    ) -> Result<Self, AssessmentError> {
        let phase = self.phase();
        if !phase.selects_joints() {
            return Err(AssessmentError::JointSelectionClosed { phase });
        }
        // Membership is checked against the whole catalog, not the displayed region.
        if !catalog.contains_joint(joint) {
            return Err(AssessmentError::UnknownJoint(joint.to_owned()));
        }

        let mut next = self.clone();
        let selection = match next.stage {
            AssessmentStage::TenderJoints { .. } => &mut next.tender_joints,
            _ => &mut next.swollen_joints,
        };
        if !selection.remove(joint) {
            selection.insert(joint.to_owned());
        }
        Ok(next)
    }

    pub fn advanced(&self, catalog: &JointCatalog) -> Self {
        let last = catalog.last_region_index();
        let stage = match self.stage {
            AssessmentStage::TenderJoints { region_index } if region_index < last => {
                AssessmentStage::TenderJoints {
                    region_index: region_index + 1,
                }
            }
            AssessmentStage::TenderJoints { .. } => {
                AssessmentStage::SwollenJoints { region_index: 0 }
            }
            AssessmentStage::SwollenJoints { region_index } if region_index < last => {
                AssessmentStage::SwollenJoints {
                    region_index: region_index + 1,
                }
            }
            AssessmentStage::SwollenJoints { .. } => AssessmentStage::ClinicalAssessment,
            AssessmentStage::ClinicalAssessment => return self.scored(),
            AssessmentStage::Results => return self.clone(),
        };

        Self {
            stage,
            ..self.clone()
        }
    }

    pub fn retreated(&self, catalog: &JointCatalog) -> Self {
        let last = catalog.last_region_index();
        let stage = match self.stage {
            AssessmentStage::SwollenJoints { region_index } if region_index > 0 => {
                AssessmentStage::SwollenJoints {
                    region_index: region_index - 1,
                }
            }
            AssessmentStage::SwollenJoints { .. } => AssessmentStage::TenderJoints {
                region_index: last,
            },
            AssessmentStage::TenderJoints { region_index } if region_index > 0 => {
                AssessmentStage::TenderJoints {
                    region_index: region_index - 1,
                }
            }
            AssessmentStage::TenderJoints { .. } => return self.clone(),
            AssessmentStage::ClinicalAssessment => AssessmentStage::SwollenJoints {
                region_index: last,
            },
            AssessmentStage::Results => AssessmentStage::ClinicalAssessment,
        };

        Self {
            stage,
            ..self.clone()
        }
    }

    pub fn with_clinical_input(&self, field: ClinicalField, value: f64) -> Self {
        Self {
            inputs: self.inputs.with(field, value),
            ..self.clone()
        }
    }

    /// Computes the composite score and moves to `Results` from any phase.
    pub fn scored(&self) -> Self {
        let score = composite_score(
            self.tender_joints.len(),
            self.swollen_joints.len(),
            &self.inputs,
        );
        Self {
            stage: AssessmentStage::Results,
            score: Some(score),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> JointCatalog {
        JointCatalog::standard()
    }

    fn at(stage: AssessmentStage) -> AssessmentState {
        AssessmentState {
            stage,
            ..AssessmentState::initial()
        }
    }

    #[test]
    fn advance_walks_regions_then_crosses_phases() {
        let catalog = catalog();
        let mut state = AssessmentState::initial();
        let mut visited = vec![state.stage()];
        for _ in 0..(catalog.region_count() * 2 + 1) {
            state = state.advanced(&catalog);
            visited.push(state.stage());
        }

        assert_eq!(visited[4], AssessmentStage::TenderJoints { region_index: 4 });
        assert_eq!(visited[5], AssessmentStage::SwollenJoints { region_index: 0 });
        assert_eq!(visited[9], AssessmentStage::SwollenJoints { region_index: 4 });
        assert_eq!(visited[10], AssessmentStage::ClinicalAssessment);
        assert_eq!(visited[11], AssessmentStage::Results);
        assert_eq!(state.score(), Some(0.0));
    }

    #[test]
    fn retreat_inverts_each_boundary() {
        let catalog = catalog();
        let swollen_start = at(AssessmentStage::SwollenJoints { region_index: 0 });
        assert_eq!(
            swollen_start.retreated(&catalog).stage(),
            AssessmentStage::TenderJoints { region_index: 4 }
        );

        let clinical = at(AssessmentStage::ClinicalAssessment);
        assert_eq!(
            clinical.retreated(&catalog).stage(),
            AssessmentStage::SwollenJoints { region_index: 4 }
        );

        let results = at(AssessmentStage::Results);
        assert_eq!(
            results.retreated(&catalog).stage(),
            AssessmentStage::ClinicalAssessment
        );
    }

    #[test]
    fn results_is_terminal_for_advance() {
        let catalog = catalog();
        let results = AssessmentState::initial().scored();
        assert_eq!(results.advanced(&catalog), results);
    }

    #[test]
    fn retreat_from_results_keeps_stale_score() {
        let catalog = catalog();
        let results = AssessmentState::initial()
            .with_clinical_input(ClinicalField::Crp, 12.0)
            .scored();
        let back = results.retreated(&catalog);
        assert_eq!(back.phase(), AssessmentPhase::ClinicalAssessment);
        assert_eq!(back.score(), Some(12.0));
        assert_eq!(back.current_score(), None);
    }

    #[test]
    fn toggle_targets_the_current_phase_set_only() {
        let catalog = catalog();
        let tender = AssessmentState::initial()
            .with_joint_toggled(&catalog, "Knee")
            .expect("tender toggle");
        assert!(tender.tender_joints().contains("Knee"));
        assert!(tender.swollen_joints().is_empty());

        let swollen = at(AssessmentStage::SwollenJoints { region_index: 0 })
            .with_joint_toggled(&catalog, "Knee")
            .expect("swollen toggle");
        assert!(swollen.swollen_joints().contains("Knee"));
        assert!(swollen.tender_joints().is_empty());
    }

    #[test]
    fn toggle_accepts_joints_outside_the_displayed_region() {
        let catalog = catalog();
        let state = AssessmentState::initial()
            .with_joint_toggled(&catalog, "Ankle")
            .expect("stale toggle accepted");
        assert_eq!(state.region_index(), Some(0));
        assert!(state.tender_joints().contains("Ankle"));
    }

    #[test]
    fn toggle_is_rejected_outside_joint_phases() {
        let catalog = catalog();
        let clinical = at(AssessmentStage::ClinicalAssessment);
        assert_eq!(
            clinical.with_joint_toggled(&catalog, "Knee"),
            Err(AssessmentError::JointSelectionClosed {
                phase: AssessmentPhase::ClinicalAssessment
            })
        );
    }

    #[test]
    fn unknown_joints_are_rejected() {
        let catalog = catalog();
        assert_eq!(
            AssessmentState::initial().with_joint_toggled(&catalog, "Tail"),
            Err(AssessmentError::UnknownJoint("Tail".to_string()))
        );
    }

    #[test]
    fn transition_leaves_the_source_state_untouched() {
        let catalog = catalog();
        let initial = AssessmentState::initial();
        let next = initial
            .transition(&catalog, &AssessmentEvent::select_joint("Hip"))
            .expect("toggle applies");
        assert!(initial.tender_joints().is_empty());
        assert_eq!(next.tender_joints().len(), 1);
    }

    #[test]
    fn clinical_input_is_accepted_in_any_phase() {
        let state = AssessmentState::initial().with_clinical_input(ClinicalField::Ega, 150.0);
        assert_eq!(state.phase(), AssessmentPhase::TenderJoints);
        assert_eq!(state.inputs().ega(), 100.0);
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let events: Vec<AssessmentEvent> = serde_json::from_str(
            r#"[{"type":"select_joint","joint":"Knee"},{"type":"advance"},{"type":"set_clinical_input","field":"crp","value":4.5},{"type":"compute_score"}]"#,
        )
        .expect("events parse");
        assert_eq!(
            events,
            vec![
                AssessmentEvent::select_joint("Knee"),
                AssessmentEvent::Advance,
                AssessmentEvent::SetClinicalInput {
                    field: ClinicalField::Crp,
                    value: 4.5
                },
                AssessmentEvent::ComputeScore,
            ]
        );
    }
}
