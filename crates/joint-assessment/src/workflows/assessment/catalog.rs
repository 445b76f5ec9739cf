use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// A named anatomical grouping with its joints in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub joints: Vec<String>,
}

impl Region {
    pub fn new(name: &str, joints: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            joints: joints.iter().map(|joint| joint.to_string()).collect(),
        }
    }

    pub fn contains(&self, joint: &str) -> bool {
        self.joints.iter().any(|candidate| candidate == joint)
    }
}

/// Ordered, immutable region catalog walked by the assessment.
///
/// Always holds at least one region; every constructor validates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JointCatalog {
    regions: Vec<Region>,
}

impl JointCatalog {
    pub fn standard() -> Self {
        Self {
            regions: standard_regions(),
        }
    }

    pub fn new(regions: Vec<Region>) -> Result<Self, CatalogError> {
        validate(&regions)?;
        Ok(Self { regions })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Reads a JSON document shaped as `{"regions": [{"name": ..., "joints": [...]}]}`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_reader(reader)?;
        Self::new(document.regions)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn last_region_index(&self) -> usize {
        self.regions.len().saturating_sub(1)
    }

    pub fn position_of(&self, region_name: &str) -> Option<usize> {
        self.regions
            .iter()
            .position(|region| region.name == region_name)
    }

    pub fn contains_joint(&self, joint: &str) -> bool {
        self.regions.iter().any(|region| region.contains(joint))
    }
}

impl Default for JointCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    regions: Vec<Region>,
}

fn standard_regions() -> Vec<Region> {
    vec![
        Region::new("Head & Neck", &["Temporomandibular", "Cervical Spine"]),
        Region::new("Upper Body", &["Shoulder", "Elbow", "Wrist"]),
        Region::new("Hands", &["MCP", "PIP", "DIP", "Thumb"]),
        Region::new("Lower Body", &["Hip", "Knee", "Ankle"]),
        Region::new("Feet", &["MTP", "PIP", "DIP"]),
    ]
}

fn validate(regions: &[Region]) -> Result<(), CatalogError> {
    if regions.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut names = HashSet::new();
    for region in regions {
        if region.name.trim().is_empty() {
            return Err(CatalogError::BlankRegionName);
        }
        if !names.insert(region.name.as_str()) {
            return Err(CatalogError::DuplicateRegion(region.name.clone()));
        }
        if region.joints.is_empty() {
            return Err(CatalogError::RegionWithoutJoints(region.name.clone()));
        }

        // Joint names may repeat across regions (PIP, DIP), never within one.
        let mut joints = HashSet::new();
        for joint in &region.joints {
            if joint.trim().is_empty() {
                return Err(CatalogError::BlankJointName(region.name.clone()));
            }
            if !joints.insert(joint.as_str()) {
                return Err(CatalogError::DuplicateJoint {
                    region: region.name.clone(),
                    joint: joint.clone(),
                });
            }
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read region catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid region catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("region catalog must contain at least one region")]
    Empty,
    #[error("region names must not be blank")]
    BlankRegionName,
    #[error("region '{0}' is listed more than once")]
    DuplicateRegion(String),
    #[error("region '{0}' has no joints")]
    RegionWithoutJoints(String),
    #[error("region '{0}' contains a blank joint name")]
    BlankJointName(String),
    #[error("joint '{joint}' is listed more than once in region '{region}'")]
    DuplicateJoint { region: String, joint: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn standard_catalog_lists_five_regions_in_order() {
        let catalog = JointCatalog::standard();
        let names: Vec<_> = catalog
            .regions()
            .iter()
            .map(|region| region.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Head & Neck", "Upper Body", "Hands", "Lower Body", "Feet"]
        );
        assert_eq!(catalog.last_region_index(), 4);
        assert_eq!(catalog.region(2).map(|r| r.joints.len()), Some(4));
        assert!(catalog.contains_joint("Cervical Spine"));
        assert!(!catalog.contains_joint("Cervical spine"));
    }

    #[test]
    fn shared_joint_names_are_allowed_across_regions() {
        let catalog = JointCatalog::standard();
        let hands = catalog.position_of("Hands").expect("hands region");
        let feet = catalog.position_of("Feet").expect("feet region");
        assert!(catalog.regions()[hands].contains("PIP"));
        assert!(catalog.regions()[feet].contains("PIP"));
    }

    #[test]
    fn from_reader_accepts_custom_catalog() {
        let json = r#"{"regions":[{"name":"Hands","joints":["MCP1","MCP2"]},{"name":"Knees","joints":["Left Knee","Right Knee"]}]}"#;
        let catalog = JointCatalog::from_reader(Cursor::new(json)).expect("catalog parses");
        assert_eq!(catalog.region_count(), 2);
        assert!(catalog.contains_joint("Right Knee"));
    }

    #[test]
    fn validation_rejects_malformed_catalogs() {
        assert!(matches!(
            JointCatalog::new(Vec::new()),
            Err(CatalogError::Empty)
        ));
        assert!(matches!(
            JointCatalog::new(vec![Region::new("Hands", &[])]),
            Err(CatalogError::RegionWithoutJoints(name)) if name == "Hands"
        ));
        assert!(matches!(
            JointCatalog::new(vec![
                Region::new("Hands", &["MCP"]),
                Region::new("Hands", &["PIP"]),
            ]),
            Err(CatalogError::DuplicateRegion(_))
        ));
        assert!(matches!(
            JointCatalog::new(vec![Region::new("Hands", &["MCP", "MCP"])]),
            Err(CatalogError::DuplicateJoint { .. })
        ));
        assert!(matches!(
            JointCatalog::new(vec![Region::new("  ", &["MCP"])]),
            Err(CatalogError::BlankRegionName)
        ));
        assert!(matches!(
            JointCatalog::new(vec![Region::new("Hands", &[" "])]),
            Err(CatalogError::BlankJointName(_))
        ));
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = JointCatalog::from_path("./does-not-exist.json").expect_err("missing file");
        assert!(matches!(error, CatalogError::Io(_)));
    }

    #[test]
    fn from_reader_rejects_invalid_json() {
        let error = JointCatalog::from_reader(Cursor::new("{\"regions\": 4}"))
            .expect_err("invalid json");
        assert!(matches!(error, CatalogError::Json(_)));
    }
}
