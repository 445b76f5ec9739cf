use super::normalizer::normalize_label;
use crate::workflows::assessment::JointCatalog;
use std::collections::HashMap;

/// Resolves free-text region and joint labels to catalog positions and canonical names.
pub(crate) struct CatalogLookup {
    regions: HashMap<String, RegionEntry>,
}

struct RegionEntry {
    index: usize,
    joints: HashMap<String, String>,
}

impl CatalogLookup {
    pub(crate) fn new(catalog: &JointCatalog) -> Self {
        let regions = catalog
            .regions()
            .iter()
            .enumerate()
            .map(|(index, region)| {
                let joints = region
                    .joints
                    .iter()
                    .map(|joint| (normalize_label(joint), joint.clone()))
                    .collect();
                (normalize_label(&region.name), RegionEntry { index, joints })
            })
            .collect();

        Self { regions }
    }

    pub(crate) fn region_index(&self, region: &str) -> Option<usize> {
        self.regions
            .get(&normalize_label(region))
            .map(|entry| entry.index)
    }

    /// Canonical joint name within `region`, if both resolve.
    pub(crate) fn joint(&self, region: &str, joint: &str) -> Option<(usize, &str)> {
        let entry = self.regions.get(&normalize_label(region))?;
        entry
            .joints
            .get(&normalize_label(joint))
            .map(|name| (entry.index, name.as_str()))
    }
}
