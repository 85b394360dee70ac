use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::condition::{Condition, Verdict};
use crate::snapshot::{ConfigurationSnapshot, SnapshotError, canonical};

/// An opaque handle to a constructed feature.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub type Factory =
    Arc<dyn Fn(&ConfigurationSnapshot) -> Result<Instance, SnapshotError> + Send + Sync>;

/// Static description of a registrable feature: its name, what gates it, which flags it
/// ignores and how to build it.
#[derive(Clone)]
pub struct FeatureDescriptor {
    name: String,
    condition: Condition,
    independent_of: BTreeSet<String>,
    factory: Factory,
}

impl std::fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("condition", &self.condition)
            .field("independent_of", &self.independent_of)
            .finish_non_exhaustive()
    }
}

impl FeatureDescriptor {
    /// A descriptor that is always enabled until gated with [`FeatureDescriptor::gated_by`]
    /// or [`FeatureDescriptor::when`].
    pub fn new<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ConfigurationSnapshot) -> T + Send + Sync + 'static,
    {
        Self::try_new(name, move |snapshot: &ConfigurationSnapshot| Ok(factory(snapshot)))
    }

    /// Like [`FeatureDescriptor::new`], for factories that read settings of their own.
    /// A factory error fails the whole evaluation.
    pub fn try_new<T, F>(name: impl Into<String>, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ConfigurationSnapshot) -> Result<T, SnapshotError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            condition: Condition::Always,
            independent_of: BTreeSet::new(),
            factory: Arc::new(
                move |snapshot: &ConfigurationSnapshot| -> Result<Instance, SnapshotError> {
                    Ok(Arc::new(factory(snapshot)?))
                },
            ),
        }
    }

    /// Require `flag` to be true, treating an absent flag as true.
    pub fn gated_by(self, flag: impl Into<String>) -> Self {
        self.when(Condition::flag(flag))
    }

    /// AND `condition` onto the existing gates.
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = std::mem::take(&mut self.condition).and(condition);
        self
    }

    /// Mark this feature as unaffected by `flag`, wherever it appears in its gates.
    pub fn independent_of(mut self, flag: impl AsRef<str>) -> Self {
        self.independent_of.insert(canonical(flag.as_ref()));
        self
    }

    /// Put `gate` in front of the existing gates.
    pub(crate) fn guarded_by(mut self, gate: Condition) -> Self {
        self.condition = gate.and(std::mem::take(&mut self.condition));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn is_independent_of(&self, flag: &str) -> bool {
        self.independent_of.contains(&canonical(flag))
    }

    pub fn independence(&self) -> impl Iterator<Item = &str> {
        self.independent_of.iter().map(String::as_str)
    }

    pub fn check(&self, snapshot: &ConfigurationSnapshot) -> Result<Verdict, SnapshotError> {
        self.condition.evaluate(snapshot, &self.independent_of)
    }

    pub(crate) fn construct(
        &self,
        snapshot: &ConfigurationSnapshot,
    ) -> Result<Instance, SnapshotError> {
        (self.factory)(snapshot)
    }
}
