//! CSV import of recorded joint findings and clinical measures.
//!
//! Rows are applied by walking a fresh assessment through its regions, the same way a
//! clinician would, so imported sessions obey every state-machine rule.

mod mapping;
mod normalizer;
mod parser;

use crate::workflows::assessment::{
    AssessmentError, AssessmentInstance, AssessmentPhase, ClinicalField, JointCatalog,
};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use mapping::CatalogLookup;
use parser::{FindingKind, FindingRecord};

#[derive(Debug)]
pub enum JointFindingImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    UnknownFinding { line: u64, finding: String },
    MissingField { line: u64, field: &'static str },
    UnknownRegion { line: u64, region: String },
    UnknownJoint { line: u64, region: String, joint: String },
    Assessment(AssessmentError),
}

impl std::fmt::Display for JointFindingImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JointFindingImportError::Io(err) => write!(f, "failed to read findings file: {}", err),
            JointFindingImportError::Csv(err) => write!(f, "invalid findings CSV data: {}", err),
            JointFindingImportError::UnknownFinding { line, finding } => write!(
                f,
                "line {}: unknown finding '{}' (expected tender, swollen, pga, ega or crp)",
                line, finding
            ),
            JointFindingImportError::MissingField { line, field } => {
                write!(f, "line {}: missing {} column value", line, field)
            }
            JointFindingImportError::UnknownRegion { line, region } => {
                write!(f, "line {}: region '{}' is not in the catalog", line, region)
            }
            JointFindingImportError::UnknownJoint {
                line,
                region,
                joint,
            } => write!(
                f,
                "line {}: joint '{}' is not part of region '{}'",
                line, joint, region
            ),
            JointFindingImportError::Assessment(err) => {
                write!(f, "could not apply findings to the assessment: {}", err)
            }
        }
    }
}

impl std::error::Error for JointFindingImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JointFindingImportError::Io(err) => Some(err),
            JointFindingImportError::Csv(err) => Some(err),
            JointFindingImportError::Assessment(err) => Some(err),
            JointFindingImportError::UnknownFinding { .. }
            | JointFindingImportError::MissingField { .. }
            | JointFindingImportError::UnknownRegion { .. }
            | JointFindingImportError::UnknownJoint { .. } => None,
        }
    }
}

impl From<std::io::Error> for JointFindingImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for JointFindingImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<AssessmentError> for JointFindingImportError {
    fn from(err: AssessmentError) -> Self {
        Self::Assessment(err)
    }
}

pub struct JointFindingImporter;

impl JointFindingImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        catalog: Arc<JointCatalog>,
    ) -> Result<AssessmentInstance, JointFindingImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, catalog)
    }

    /// Returns an instance parked at `ClinicalAssessment`; scoring is left to the caller.
    pub fn from_reader<R: Read>(
        reader: R,
        catalog: Arc<JointCatalog>,
    ) -> Result<AssessmentInstance, JointFindingImportError> {
        let lookup = CatalogLookup::new(&catalog);
        let mut findings = RegionFindings::new(catalog.region_count());

        for record in parser::parse_records(reader)? {
            apply_record(record, &lookup, &mut findings)?;
        }

        let mut instance = AssessmentInstance::new(catalog);
        walk_joint_phase(&mut instance, &findings.tender)?;
        walk_joint_phase(&mut instance, &findings.swollen)?;
        debug_assert_eq!(instance.phase(), AssessmentPhase::ClinicalAssessment);

        for (field, value) in findings.clinical {
            instance.set_clinical_input(field, value);
        }

        Ok(instance)
    }
}

struct RegionFindings {
    tender: Vec<BTreeSet<String>>,
    swollen: Vec<BTreeSet<String>>,
    clinical: Vec<(ClinicalField, f64)>,
}

impl RegionFindings {
    fn new(region_count: usize) -> Self {
        Self {
            tender: vec![BTreeSet::new(); region_count],
            swollen: vec![BTreeSet::new(); region_count],
            clinical: Vec::new(),
        }
    }
}

fn apply_record(
    record: FindingRecord,
    lookup: &CatalogLookup,
    findings: &mut RegionFindings,
) -> Result<(), JointFindingImportError> {
    let line = record.line;
    let kind = record
        .kind
        .ok_or_else(|| JointFindingImportError::UnknownFinding {
            line,
            finding: record.finding.clone(),
        })?;

    match kind {
        FindingKind::Tender | FindingKind::Swollen => {
            let region = record
                .region
                .ok_or(JointFindingImportError::MissingField {
                    line,
                    field: "Region",
                })?;
            let joint = record.joint.ok_or(JointFindingImportError::MissingField {
                line,
                field: "Joint",
            })?;
            if lookup.region_index(&region).is_none() {
                return Err(JointFindingImportError::UnknownRegion { line, region });
            }
            let (index, canonical) =
                lookup
                    .joint(&region, &joint)
                    .ok_or_else(|| JointFindingImportError::UnknownJoint {
                        line,
                        region: region.clone(),
                        joint: joint.clone(),
                    })?;

            let sets = match kind {
                FindingKind::Tender => &mut findings.tender,
                _ => &mut findings.swollen,
            };
            sets[index].insert(canonical.to_string());
        }
        FindingKind::Clinical(field) => {
            let value = record.value.ok_or(JointFindingImportError::MissingField {
                line,
                field: "Value",
            })?;
            findings.clinical.push((field, value));
        }
    }

    Ok(())
}

/// Selects each region's joints in turn, then advances past the phase's last region.
fn walk_joint_phase(
    instance: &mut AssessmentInstance,
    regions: &[BTreeSet<String>],
) -> Result<(), AssessmentError> {
    for joints in regions {
        for joint in joints {
            // Shared names (PIP, DIP) live in one flat set; a second toggle would clear them.
            let already_selected = instance
                .state()
                .active_selection()
                .is_some_and(|selection| selection.contains(joint));
            if !already_selected {
                instance.select_joint(joint)?;
            }
        }
        instance.advance();
    }
    Ok(())
}
