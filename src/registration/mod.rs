mod diff;
mod report;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::Instance;
use crate::registry::RegistryError;
use crate::snapshot::canonical;

pub use report::{DisabledFeature, FeaturesReport};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub enabled: bool,
    pub reason: String,
}

#[derive(Clone)]
struct Entry {
    name: String,
    outcome: Outcome,
    instance: Option<Instance>,
}

/// What an evaluation registered: an outcome for every described feature, and the
/// instance of every enabled one.
///
/// Feature names are looked up the way flag names are: trimmed and case-insensitive.
#[derive(Clone, Default)]
pub struct RegistrationResult {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for RegistrationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|e| (&e.name, &e.outcome)))
            .finish()
    }
}

impl RegistrationResult {
    pub(crate) fn push(&mut self, name: String, outcome: Outcome, instance: Option<Instance>) {
        self.index.insert(canonical(&name), self.entries.len());
        self.entries.push(Entry {
            name,
            outcome,
            instance,
        });
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index.get(&canonical(name)).map(|i| &self.entries[*i])
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.outcome.enabled)
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.entry(name).map(|e| &e.outcome)
    }

    /// Outcomes in evaluation order.
    pub fn outcomes(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.entries.iter().map(|e| (e.name.as_str(), &e.outcome))
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.outcome.enabled)
            .map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The instance registered under `name`.
    ///
    /// Disabled and unknown features are both `NotRegistered`.
    pub fn get(&self, name: &str) -> Result<&Instance, RegistryError> {
        self.entry(name)
            .and_then(|e| e.instance.as_ref())
            .ok_or_else(|| RegistryError::NotRegistered(name.to_owned()))
    }

    pub fn get_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, RegistryError> {
        let instance = self.get(name)?;

        Arc::clone(instance)
            .downcast::<T>()
            .map_err(|_| RegistryError::InstanceType {
                name: name.to_owned(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Every enabled instance of type `T`, in evaluation order.
    pub fn instances_of<T: Any + Send + Sync>(&self) -> Vec<Arc<T>> {
        self.entries
            .iter()
            .filter_map(|e| e.instance.as_ref())
            .filter_map(|instance| Arc::clone(instance).downcast::<T>().ok())
            .collect()
    }
}
