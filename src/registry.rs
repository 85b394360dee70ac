use std::collections::BTreeSet;

use crate::descriptor::FeatureDescriptor;
use crate::family::FeatureFamily;
use crate::registration::{Outcome, RegistrationResult};
use crate::snapshot::{ConfigurationSnapshot, SnapshotError, canonical};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("No feature named `{0}` is registered")]
    NotRegistered(String),

    #[error("Feature `{0}` is described more than once")]
    DuplicateFeature(String),

    #[error("Feature `{name}` is registered, but its instance is not a `{expected}`")]
    InstanceType { name: String, expected: &'static str },

    #[error("Evaluating feature `{feature}` failed: {source}")]
    Snapshot {
        feature: String,
        #[source]
        source: SnapshotError,
    },
}

/// A set of feature descriptors that can be evaluated against any number of snapshots.
#[derive(Clone, Debug, Default)]
pub struct ConditionalRegistry {
    descriptors: Vec<FeatureDescriptor>,
}

impl ConditionalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: FeatureDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn register_family(mut self, family: FeatureFamily) -> Self {
        self.descriptors.extend(family.into_descriptors());
        self
    }

    pub fn descriptors(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    pub fn evaluate(
        &self,
        snapshot: &ConfigurationSnapshot,
    ) -> Result<RegistrationResult, RegistryError> {
        evaluate(snapshot, &self.descriptors)
    }
}

/// Decide which of `descriptors` are enabled under `snapshot` and build them.
///
/// Every gate is checked before any factory runs, so a gate that cannot be read constructs
/// nothing. Each enabled feature's factory runs exactly once; disabled features are never
/// built. A factory error fails the evaluation and drops whatever was already built.
///
/// Feature names must be unique, compared case-insensitively.
#[cfg_attr(
    feature = "tracing-instrument",
    tracing::instrument(skip_all, fields(flags = snapshot.len(), descriptors = descriptors.len()))
)]
pub fn evaluate(
    snapshot: &ConfigurationSnapshot,
    descriptors: &[FeatureDescriptor],
) -> Result<RegistrationResult, RegistryError> {
    tracing::trace!(?snapshot, "Evaluating feature gates");

    let mut seen = BTreeSet::new();
    for descriptor in descriptors {
        if !seen.insert(canonical(descriptor.name())) {
            return Err(RegistryError::DuplicateFeature(descriptor.name().to_owned()));
        }
    }

    let verdicts = descriptors
        .iter()
        .map(|descriptor| {
            descriptor
                .check(snapshot)
                .map_err(|source| RegistryError::Snapshot {
                    feature: descriptor.name().to_owned(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = RegistrationResult::default();
    for (descriptor, verdict) in descriptors.iter().zip(verdicts) {
        tracing::debug!(
            feature = descriptor.name(),
            enabled = verdict.matched,
            reason = %verdict.reason,
            "Evaluated feature"
        );

        let instance = verdict
            .matched
            .then(|| descriptor.construct(snapshot))
            .transpose()
            .map_err(|source| RegistryError::Snapshot {
                feature: descriptor.name().to_owned(),
                source,
            })?;

        result.push(
            descriptor.name().to_owned(),
            Outcome {
                enabled: verdict.matched,
                reason: verdict.reason,
            },
            instance,
        );
    }

    Ok(result)
}
