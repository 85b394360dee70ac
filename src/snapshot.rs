use std::collections::BTreeMap;

use serde::Serialize;

use crate::Map;
use crate::flag::{FlagKind, FlagValue};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Flag `{name}` expects a {expected} value, found `{found}`")]
    ConfigurationTypeMismatch {
        name: String,
        expected: FlagKind,
        found: serde_json::Value,
    },

    #[error("Property `{0}` is not of the form `name=value`")]
    MalformedProperty(String),
}

/// An immutable view of configuration flags, keyed by dotted name.
///
/// Names are trimmed and lower-cased on the way in and on lookup, so
/// `Discovery.Enabled` and `discovery.enabled` are the same flag.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationSnapshot {
    values: BTreeMap<String, serde_json::Value>,
}

impl ConfigurationSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(canonical(name.as_ref()), value.into());
        self
    }

    /// Build a snapshot from a JSON object. Nested objects are flattened into dotted names:
    /// `{"discovery": {"enabled": false}}` holds the flag `discovery.enabled`.
    pub fn from_map(map: Map) -> Self {
        let mut values = BTreeMap::new();
        flatten_into(&mut values, None, map);
        Self { values }
    }

    /// Build a snapshot from `name=value` property strings. Values are kept as strings
    /// and coerced when a flag is read.
    pub fn from_properties<I, S>(properties: I) -> Result<Self, SnapshotError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut snapshot = Self::default();

        for property in properties {
            let property = property.as_ref();
            let Some((name, value)) = property.split_once('=') else {
                return Err(SnapshotError::MalformedProperty(property.to_owned()));
            };

            if name.trim().is_empty() {
                return Err(SnapshotError::MalformedProperty(property.to_owned()));
            }

            snapshot = snapshot.with(name, value.trim());
        }

        Ok(snapshot)
    }

    pub fn raw(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(&canonical(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    /// Read a flag, falling back to `default` when it is absent.
    ///
    /// A present value is coerced to the kind of `default`; a value that cannot be coerced
    /// is reported rather than replaced by the default.
    pub fn get(&self, name: &str, default: &FlagValue) -> Result<FlagValue, SnapshotError> {
        let Some(raw) = self.raw(name) else {
            return Ok(default.clone());
        };

        default
            .kind()
            .coerce(raw)
            .ok_or_else(|| SnapshotError::ConfigurationTypeMismatch {
                name: name.to_owned(),
                expected: default.kind(),
                found: raw.clone(),
            })
    }

    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool, SnapshotError> {
        let value = self.get(name, &FlagValue::Bool(default))?;
        Ok(value.as_bool().unwrap_or(default))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, serde_json::Value)> for ConfigurationSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::default(), |snapshot, (name, value)| {
                snapshot.with(name, value)
            })
    }
}

pub(crate) fn canonical(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn flatten_into(values: &mut BTreeMap<String, serde_json::Value>, prefix: Option<&str>, map: Map) {
    for (key, value) in map {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{}", canonical(&key)),
            None => canonical(&key),
        };

        match value {
            serde_json::Value::Object(nested) => flatten_into(values, Some(&name), nested),
            other => {
                values.insert(name, other);
            }
        }
    }
}
