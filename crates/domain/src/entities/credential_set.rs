//! Inbound credential set entity

use crate::{errors::DomainError, value_objects::BearerToken, value_objects::TargetName};

/// Inbound bearer tokens and the target each one authorizes
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    entries: Vec<(BearerToken, TargetName)>,
}

impl CredentialSet {
    /// Build a credential set, rejecting duplicate tokens
    pub fn new(
        entries: impl IntoIterator<Item = (BearerToken, TargetName)>,
    ) -> Result<Self, DomainError> {
        let mut collected: Vec<(BearerToken, TargetName)> = Vec::new();
        for (token, target) in entries {
            if collected.iter().any(|(existing, _)| existing.matches(&token)) {
                return Err(DomainError::ValidationError(format!(
                    "a token for target '{target}' is configured more than once"
                )));
            }
            collected.push((token, target));
        }
        Ok(Self { entries: collected })
    }

    /// Resolve the target authorized by `token`
    ///
    /// Every entry is compared so the lookup time does not depend on which
    /// entry matched.
    pub fn resolve(&self, token: &BearerToken) -> Option<&TargetName> {
        let mut found = None;
        for (candidate, target) in &self.entries {
            if candidate.matches(token) && found.is_none() {
                found = Some(target);
            }
        }
        found
    }

    /// Iterate over `(token, target)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&BearerToken, &TargetName)> {
        self.entries.iter().map(|(token, target)| (token, target))
    }

    /// Number of configured tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tokens are configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
