use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast;

use crate::registration::RegistrationResult;
use crate::registry::{ConditionalRegistry, RegistryError};
use crate::snapshot::ConfigurationSnapshot;

/// A cached registration that can be refreshed from new snapshots.
///
/// Refreshing with the snapshot already in use keeps the cached result, so instances keep
/// their identity. Any other snapshot replaces it, since factories and reasons may read
/// flags that don't change the enabled set. Subscribers receive the diff lines whenever
/// the enabled set changes.
pub struct LiveRegistration {
    registry: ConditionalRegistry,
    current: RwLock<Cached>,
    change_notifier: broadcast::Sender<Vec<String>>,
}

struct Cached {
    snapshot: ConfigurationSnapshot,
    result: Arc<RegistrationResult>,
}

impl std::fmt::Debug for LiveRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveRegistration")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl LiveRegistration {
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all))]
    pub fn new(
        registry: ConditionalRegistry,
        snapshot: &ConfigurationSnapshot,
    ) -> Result<Self, RegistryError> {
        let initial = registry.evaluate(snapshot)?;

        Ok(Self {
            registry,
            current: RwLock::new(Cached {
                snapshot: snapshot.clone(),
                result: Arc::new(initial),
            }),
            change_notifier: broadcast::Sender::new(16),
        })
    }

    pub async fn current(&self) -> Arc<RegistrationResult> {
        Arc::clone(&self.current.read().await.result)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
        self.change_notifier.subscribe()
    }

    /// Re-evaluate against `snapshot`, returning the diff from the cached result.
    ///
    /// On error the cached result is left as it was.
    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all))]
    pub async fn refresh(
        &self,
        snapshot: &ConfigurationSnapshot,
    ) -> Result<Vec<String>, RegistryError> {
        let mut current = self.current.write().await;

        if current.snapshot == *snapshot {
            tracing::trace!("Feature registration snapshot is unchanged");
            return Ok(vec![]);
        }

        let fresh = self
            .registry
            .evaluate(snapshot)
            .inspect_err(|e| tracing::debug!(%e, "Error re-evaluating feature registration"))?;

        let changes = fresh.diff(&current.result);
        let changed = !changes.is_empty();

        tracing::trace!(changed, ?changes, "Refreshed feature registration");

        *current = Cached {
            snapshot: snapshot.clone(),
            result: Arc::new(fresh),
        };

        if changed {
            if let Err(e) = self.change_notifier.send(changes.clone()) {
                tracing::debug!(%e, "No subscribers to notify of changed feature registration");
            }
        }

        Ok(changes)
    }
}
