//! Routing table entity

use std::collections::BTreeMap;

use crate::{entities::UpstreamTarget, errors::DomainError, value_objects::TargetName};

/// Mapping from target name to upstream, fixed once built
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    targets: BTreeMap<TargetName, UpstreamTarget>,
}

impl RoutingTable {
    /// Build a routing table, rejecting duplicate names
    pub fn new(targets: impl IntoIterator<Item = UpstreamTarget>) -> Result<Self, DomainError> {
        let mut map = BTreeMap::new();
        for target in targets {
            let name = target.name().clone();
            if map.insert(name.clone(), target).is_some() {
                return Err(DomainError::ValidationError(format!(
                    "target '{name}' is configured more than once"
                )));
            }
        }
        Ok(Self { targets: map })
    }

    /// Look up a target by name
    pub fn get(&self, name: &TargetName) -> Option<&UpstreamTarget> {
        self.targets.get(name)
    }

    /// Whether a target with this name exists
    pub fn contains(&self, name: &TargetName) -> bool {
        self.targets.contains_key(name)
    }

    /// All targets in name order
    pub fn iter(&self) -> impl Iterator<Item = &UpstreamTarget> {
        self.targets.values()
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
