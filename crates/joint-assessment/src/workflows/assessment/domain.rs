use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPhase {
    TenderJoints,
    SwollenJoints,
    ClinicalAssessment,
    Results,
}

impl AssessmentPhase {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::TenderJoints,
            Self::SwollenJoints,
            Self::ClinicalAssessment,
            Self::Results,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TenderJoints => "Tender Joints",
            Self::SwollenJoints => "Swollen Joints",
            Self::ClinicalAssessment => "Clinical Assessment",
            Self::Results => "Results",
        }
    }

    /// Whether joints can be toggled while in this phase.
    pub const fn selects_joints(self) -> bool {
        matches!(self, Self::TenderJoints | Self::SwollenJoints)
    }
}

impl fmt::Display for AssessmentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalField {
    Pga,
    Ega,
    Crp,
}

impl ClinicalField {
    pub const fn ordered() -> [Self; 3] {
        [Self::Pga, Self::Ega, Self::Crp]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pga => "PGA (Physician Global Assessment)",
            Self::Ega => "EGA (Evaluator Global Assessment)",
            Self::Crp => "CRP (C-Reactive Protein)",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Pga | Self::Ega => "mm",
            Self::Crp => "mg/L",
        }
    }

    /// Inclusive `(min, max)` accepted for the field.
    pub const fn bounds(self) -> (f64, f64) {
        match self {
            Self::Pga | Self::Ega => (0.0, 100.0),
            Self::Crp => (0.0, 300.0),
        }
    }

    /// Clamp a raw value into the field's bounds. NaN collapses to the lower bound.
    pub fn clamp(self, value: f64) -> f64 {
        let (min, max) = self.bounds();
        if value.is_nan() {
            return min;
        }
        value.clamp(min, max)
    }
}

impl FromStr for ClinicalField {
    type Err = AssessmentError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pga" => Ok(Self::Pga),
            "ega" => Ok(Self::Ega),
            "crp" => Ok(Self::Crp),
            _ => Err(AssessmentError::UnknownClinicalField(value.to_owned())),
        }
    }
}

/// Clinician-entered severity measures. Values are always within their field bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalInputs {
    pga: f64,
    ega: f64,
    crp: f64,
}

impl ClinicalInputs {
    pub fn new(pga: f64, ega: f64, crp: f64) -> Self {
        Self {
            pga: ClinicalField::Pga.clamp(pga),
            ega: ClinicalField::Ega.clamp(ega),
            crp: ClinicalField::Crp.clamp(crp),
        }
    }

    pub fn get(&self, field: ClinicalField) -> f64 {
        match field {
            ClinicalField::Pga => self.pga,
            ClinicalField::Ega => self.ega,
            ClinicalField::Crp => self.crp,
        }
    }

    /// Returns a copy with `field` set to the clamped `value`.
    pub fn with(mut self, field: ClinicalField, value: f64) -> Self {
        let value = field.clamp(value);
        match field {
            ClinicalField::Pga => self.pga = value,
            ClinicalField::Ega => self.ega = value,
            ClinicalField::Crp => self.crp = value,
        }
        self
    }

    pub fn pga(&self) -> f64 {
        self.pga
    }

    pub fn ega(&self) -> f64 {
        self.ega
    }

    pub fn crp(&self) -> f64 {
        self.crp
    }
}

/// SDAI disease-activity bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiseaseActivity {
    Remission,
    Low,
    Moderate,
    High,
}

impl DiseaseActivity {
    pub fn from_score(score: f64) -> Self {
        if score <= 3.3 {
            Self::Remission
        } else if score <= 11.0 {
            Self::Low
        } else if score <= 26.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Remission => "Remission",
            Self::Low => "Low Disease Activity",
            Self::Moderate => "Moderate Disease Activity",
            Self::High => "High Disease Activity",
        }
    }
}

/// Rejections raised by the assessment state machine. A rejected event never changes state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssessmentError {
    #[error("joint '{0}' is not part of the region catalog")]
    UnknownJoint(String),
    #[error("joints cannot be selected during the {phase} phase")]
    JointSelectionClosed { phase: AssessmentPhase },
    #[error("unknown clinical input '{0}' (expected pga, ega or crp)")]
    UnknownClinicalField(String),
}
