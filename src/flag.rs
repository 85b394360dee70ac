use serde::{Deserialize, Serialize};

/// A typed configuration flag value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlagKind {
    Bool,
    Str,
}

impl FlagValue {
    pub fn kind(&self) -> FlagKind {
        match self {
            FlagValue::Bool(_) => FlagKind::Bool,
            FlagValue::Str(_) => FlagKind::Str,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Str(_) => None,
        }
    }
}

impl FlagKind {
    /// Coerce a raw configuration value into this kind.
    ///
    /// Booleans accept JSON booleans and the strings `true` / `false` in any case.
    /// Strings accept JSON strings, numbers and booleans.
    pub fn coerce(self, raw: &serde_json::Value) -> Option<FlagValue> {
        match self {
            FlagKind::Bool => match raw {
                serde_json::Value::Bool(b) => Some(FlagValue::Bool(*b)),
                serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(FlagValue::Bool(true)),
                    "false" => Some(FlagValue::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            FlagKind::Str => match raw {
                serde_json::Value::String(s) => Some(FlagValue::Str(s.clone())),
                serde_json::Value::Bool(b) => Some(FlagValue::Str(b.to_string())),
                serde_json::Value::Number(n) => Some(FlagValue::Str(n.to_string())),
                _ => None,
            },
        }
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        FlagValue::Str(value.to_owned())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Str(value)
    }
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            FlagValue::Bool(b) => write!(f, "{b}"),
            FlagValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl std::fmt::Display for FlagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            FlagKind::Bool => write!(f, "boolean"),
            FlagKind::Str => write!(f, "string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_accepts_json_booleans_and_relaxed_strings() {
        assert_eq!(FlagKind::Bool.coerce(&json!(false)), Some(FlagValue::Bool(false)));
        assert_eq!(FlagKind::Bool.coerce(&json!("TRUE")), Some(FlagValue::Bool(true)));
        assert_eq!(FlagKind::Bool.coerce(&json!(" false ")), Some(FlagValue::Bool(false)));
    }

    #[test]
    fn bool_rejects_everything_else() {
        assert_eq!(FlagKind::Bool.coerce(&json!("yes")), None);
        assert_eq!(FlagKind::Bool.coerce(&json!(1)), None);
        assert_eq!(FlagKind::Bool.coerce(&json!(null)), None);
        assert_eq!(FlagKind::Bool.coerce(&json!({"enabled": true})), None);
    }

    #[test]
    fn str_renders_scalars() {
        assert_eq!(FlagKind::Str.coerce(&json!("simple")), Some("simple".into()));
        assert_eq!(FlagKind::Str.coerce(&json!(3)), Some("3".into()));
        assert_eq!(FlagKind::Str.coerce(&json!(true)), Some("true".into()));
        assert_eq!(FlagKind::Str.coerce(&json!(["a"])), None);
    }

    #[test]
    fn untagged_serde_shape() {
        let values: Vec<FlagValue> = serde_json::from_str(r#"[true, "blocking"]"#).unwrap();
        assert_eq!(values, vec![FlagValue::Bool(true), FlagValue::from("blocking")]);
    }
}
