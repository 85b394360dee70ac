use std::path::Path;

use figment::Figment;
use figment::providers::{Format, Json, Serialized};

use crate::Map;
use crate::snapshot::ConfigurationSnapshot;

/// Several flag sources stacked with figment, later layers overriding earlier ones.
///
/// Providers are read when a layer is added, so a `Layered` holds the configuration as it
/// was at build time. A missing file layer contributes nothing.
///
/// ```rust
/// use conditional_registry::snapshot;
/// use conditional_registry::source::{Layered, Source};
///
/// # tokio_test::block_on(async {
/// let source = Layered::new()
///     .snapshot(&snapshot! { "discovery.enabled" => false, "features.enabled" => false })
///     .snapshot(&snapshot! { "discovery.enabled" => true });
/// let loaded = source.load().await.unwrap();
///
/// assert!(loaded.get_bool("discovery.enabled", false).unwrap());
/// assert!(!loaded.get_bool("features.enabled", true).unwrap());
/// # })
/// ```
#[derive(Debug, Clone)]
pub struct Layered {
    figment: Figment,
}

impl Default for Layered {
    fn default() -> Self {
        Self::new()
    }
}

impl Layered {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
        }
    }

    pub fn snapshot(self, snapshot: &ConfigurationSnapshot) -> Self {
        let figment = snapshot
            .iter()
            .fold(self.figment, |figment, (name, value)| {
                figment.merge(Serialized::default(name, value))
            });

        Self { figment }
    }

    pub fn json_file(self, location: impl AsRef<Path>) -> Self {
        Self {
            figment: self.figment.merge(Json::file(location)),
        }
    }

    pub fn environment(self, prefix: impl Into<String>) -> Self {
        Self {
            figment: self.figment.merge(super::Environment::new(prefix).provider()),
        }
    }
}

impl super::Source for Layered {
    type Error = figment::Error;

    async fn load(&self) -> Result<ConfigurationSnapshot, Self::Error> {
        let map: Map = self.figment.extract()?;
        let snapshot = ConfigurationSnapshot::from_map(map);

        tracing::trace!(flags = snapshot.len(), "Loaded layered flags");

        Ok(snapshot)
    }
}
