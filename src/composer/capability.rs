//! Operator capabilities injected into the composer.

use crate::composer::filter::FacetTag;
use crate::config::CapabilitiesConfig;

/// Answers which facets the current operator may select.
pub trait CapabilityProvider: Send + Sync {
    fn is_admin(&self) -> bool;

    fn allows(&self, tag: FacetTag) -> bool {
        !tag.requires_admin() || self.is_admin()
    }

    /// Facets to offer in the filter bar, in display order.
    fn selectable_facets(&self) -> Vec<FacetTag> {
        FacetTag::ALL
            .into_iter()
            .filter(|tag| self.allows(*tag))
            .collect()
    }
}

/// Fixed capabilities, typically read from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticCapabilities {
    admin: bool,
}

impl StaticCapabilities {
    pub fn admin() -> Self {
        Self { admin: true }
    }

    pub fn operator() -> Self {
        Self { admin: false }
    }
}

impl From<&CapabilitiesConfig> for StaticCapabilities {
    fn from(config: &CapabilitiesConfig) -> Self {
        Self { admin: config.admin }
    }
}

impl CapabilityProvider for StaticCapabilities {
    fn is_admin(&self) -> bool {
        self.admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_cannot_select_role_facets() {
        let caps = StaticCapabilities::operator();
        assert!(!caps.allows(FacetTag::Admin));
        assert!(!caps.allows(FacetTag::Staff));
        assert!(caps.allows(FacetTag::Blocked));
        assert_eq!(caps.selectable_facets().len(), 4);
    }

    #[test]
    fn test_admin_selects_everything() {
        let caps = StaticCapabilities::from(&CapabilitiesConfig { admin: true });
        assert_eq!(caps.selectable_facets(), FacetTag::ALL.to_vec());
    }
}
