//! The discovery client catalogue: health indicators gated by the discovery flags, and a
//! features inventory that stays available when discovery is switched off.

use crate::condition::Condition;
use crate::descriptor::FeatureDescriptor;
use crate::family::FeatureFamily;
use crate::registration::RegistrationResult;
use crate::registry::ConditionalRegistry;
use crate::snapshot::{ConfigurationSnapshot, SnapshotError};

pub const DISCOVERY_ENABLED: &str = "discovery.enabled";
pub const BLOCKING_DISCOVERY_ENABLED: &str = "discovery.blocking.enabled";
pub const HEALTH_INDICATOR_ENABLED: &str = "discovery.client.health-indicator.enabled";
pub const HEALTH_INDICATOR_INCLUDE_DESCRIPTION: &str =
    "discovery.client.health-indicator.include-description";
pub const COMPOSITE_INDICATOR_ENABLED: &str = "discovery.client.composite-indicator.enabled";
pub const FEATURES_ENABLED: &str = "features.enabled";

pub const HEALTH_INDICATOR: &str = "discovery-client-health-indicator";
pub const COMPOSITE_INDICATOR: &str = "discovery-composite-health-indicator";
pub const COMMONS_FEATURES: &str = "commons-features";
pub const FEATURES_ENDPOINT: &str = "features-endpoint";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryClientHealthIndicator {
    pub include_description: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryCompositeHealthIndicator;

/// Abstract capabilities the discovery family contributes to the features inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonsFeatures {
    pub abstract_features: Vec<&'static str>,
}

impl Default for CommonsFeatures {
    fn default() -> Self {
        Self {
            abstract_features: vec!["DiscoveryClient", "LoadBalancerClient"],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturesEndpoint;

impl FeaturesEndpoint {
    /// Every feature named by a registered [`CommonsFeatures`], in registration order.
    pub fn features(&self, registration: &RegistrationResult) -> Vec<&'static str> {
        registration
            .instances_of::<CommonsFeatures>()
            .iter()
            .flat_map(|f| f.abstract_features.iter().copied())
            .collect()
    }
}

/// Gate for anything that needs discovery at all.
pub fn on_discovery_enabled() -> Condition {
    Condition::flag(DISCOVERY_ENABLED)
}

/// Gate for blocking discovery clients.
pub fn on_blocking_discovery_enabled() -> Condition {
    Condition::flag(BLOCKING_DISCOVERY_ENABLED)
}

pub fn discovery_family() -> FeatureFamily {
    FeatureFamily::new(DISCOVERY_ENABLED)
        .narrow(BLOCKING_DISCOVERY_ENABLED)
        .member(
            FeatureDescriptor::try_new(HEALTH_INDICATOR, health_indicator)
                .gated_by(HEALTH_INDICATOR_ENABLED),
        )
        .member(
            FeatureDescriptor::new(COMPOSITE_INDICATOR, |_| DiscoveryCompositeHealthIndicator)
                .gated_by(HEALTH_INDICATOR_ENABLED)
                .gated_by(COMPOSITE_INDICATOR_ENABLED),
        )
        // Blocking or not, a client still lists its abstract features.
        .member(
            FeatureDescriptor::new(COMMONS_FEATURES, |_| CommonsFeatures::default())
                .gated_by(FEATURES_ENABLED)
                .independent_of(BLOCKING_DISCOVERY_ENABLED),
        )
        .independent(
            FeatureDescriptor::new(FEATURES_ENDPOINT, |_| FeaturesEndpoint)
                .gated_by(FEATURES_ENABLED),
        )
}

pub fn registry() -> ConditionalRegistry {
    ConditionalRegistry::new().register_family(discovery_family())
}

fn health_indicator(
    snapshot: &ConfigurationSnapshot,
) -> Result<DiscoveryClientHealthIndicator, SnapshotError> {
    let include_description = snapshot.get_bool(HEALTH_INDICATOR_INCLUDE_DESCRIPTION, false)?;

    Ok(DiscoveryClientHealthIndicator {
        include_description,
    })
}
