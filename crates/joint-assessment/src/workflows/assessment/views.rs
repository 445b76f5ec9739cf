use super::domain::{AssessmentPhase, ClinicalField, DiseaseActivity};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    Next,
    CalculateScore,
    Finish,
}

impl PrimaryAction {
    pub const fn for_phase(phase: AssessmentPhase) -> Self {
        match phase {
            AssessmentPhase::TenderJoints | AssessmentPhase::SwollenJoints => Self::Next,
            AssessmentPhase::ClinicalAssessment => Self::CalculateScore,
            AssessmentPhase::Results => Self::Finish,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::CalculateScore => "Calculate SDAI",
            Self::Finish => "Finish",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigationView {
    pub can_retreat: bool,
    pub primary_action: PrimaryAction,
    pub primary_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct JointView {
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionView {
    pub index: usize,
    pub position_label: String,
    pub name: String,
    pub prompt: String,
    pub joints: Vec<JointView>,
    /// Size of the whole phase selection, across regions.
    pub selected_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicalInputView {
    pub field: ClinicalField,
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub display: String,
}

impl ClinicalInputView {
    pub fn new(field: ClinicalField, value: f64) -> Self {
        let (min, max) = field.bounds();
        Self {
            field,
            label: field.label(),
            unit: field.unit(),
            min,
            max,
            value,
            display: format!("{value:.0} {}", field.unit()),
        }
    }
}

/// Everything a presentation layer needs to render the current step.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSnapshot {
    pub phase: AssessmentPhase,
    pub phase_label: &'static str,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionView>,
    pub tender_count: usize,
    pub swollen_count: usize,
    pub clinical_inputs: Vec<ClinicalInputView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub navigation: NavigationView,
}

/// Final summary handed to collaborators once the assessment reaches `Results`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutcome {
    pub assessed_on: NaiveDate,
    pub tender_count: usize,
    pub swollen_count: usize,
    pub tender_joints: Vec<String>,
    pub swollen_joints: Vec<String>,
    pub pga_mm: f64,
    pub ega_mm: f64,
    pub crp_mg_per_l: f64,
    pub score: f64,
    pub disease_activity: DiseaseActivity,
    pub disease_activity_label: &'static str,
}

impl AssessmentOutcome {
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Tender Joints: {}", self.tender_count),
            format!("Swollen Joints: {}", self.swollen_count),
            format!("PGA: {:.0} mm", self.pga_mm),
            format!("EGA: {:.0} mm", self.ega_mm),
            format!("CRP: {:.0} mg/L", self.crp_mg_per_l),
            format!("SDAI Score: {}", self.score),
            format!("Disease Activity: {}", self.disease_activity_label),
        ]
    }
}
