use figment::Figment;
use figment::providers::Env;

use crate::Map;
use crate::snapshot::ConfigurationSnapshot;

/// Flags read from environment variables sharing a prefix.
///
/// The prefix and its trailing `_` are stripped, the rest is lower-cased, `__` becomes `-`
/// and `_` becomes `.`: with prefix `APP`, `APP_DISCOVERY_CLIENT_HEALTH__INDICATOR_ENABLED`
/// is the flag `discovery.client.health-indicator.enabled`. Values are parsed the way
/// figment parses them, so `false` is a boolean and `7` a number.
#[derive(Debug, Clone)]
pub struct Environment {
    prefix: String,
}

impl Environment {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub(crate) fn provider(&self) -> Env {
        Env::prefixed(&format!("{}_", self.prefix))
            .map(|key| key.as_str().replace("__", "-").replace('_', ".").into())
    }
}

impl super::Source for Environment {
    type Error = figment::Error;

    async fn load(&self) -> Result<ConfigurationSnapshot, Self::Error> {
        let map: Map = Figment::from(self.provider()).extract()?;
        let snapshot = ConfigurationSnapshot::from_map(map);

        tracing::trace!(prefix = %self.prefix, flags = snapshot.len(), "Read flags from the environment");

        Ok(snapshot)
    }
}
