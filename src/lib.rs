pub mod commons;
mod condition;
mod descriptor;
mod family;
mod flag;
mod live;
mod registration;
mod registry;
mod snapshot;
pub mod source;

#[cfg(test)]
mod test;

pub use condition::{Condition, FlagCondition, Verdict};
pub use descriptor::{Factory, FeatureDescriptor, Instance};
pub use family::FeatureFamily;
pub use flag::{FlagKind, FlagValue};
pub use live::LiveRegistration;
pub use registration::{DisabledFeature, FeaturesReport, Outcome, RegistrationResult};
pub use registry::{ConditionalRegistry, RegistryError, evaluate};
pub use snapshot::{ConfigurationSnapshot, SnapshotError};

pub type Map = serde_json::Map<String, serde_json::Value>;

/// Build a [`ConfigurationSnapshot`] from literal `name => value` pairs.
///
/// ```rust
/// use conditional_registry::snapshot;
///
/// let snapshot = snapshot! {
///     "discovery.enabled" => false,
///     "discovery.client.health-indicator.enabled" => "true",
/// };
///
/// assert!(!snapshot.get_bool("discovery.enabled", true).unwrap());
/// ```
#[macro_export]
macro_rules! snapshot {
    () => {
        $crate::ConfigurationSnapshot::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        $crate::ConfigurationSnapshot::new()$(.with($name, $value))+
    }};
}
