use std::collections::BTreeSet;

use crate::flag::FlagValue;
use crate::snapshot::{ConfigurationSnapshot, SnapshotError, canonical};

/// A single flag test: the flag named `name`, read with `default` when absent, must equal `required`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlagCondition {
    pub name: String,
    pub default: FlagValue,
    pub required: FlagValue,
}

impl FlagCondition {
    pub fn new(
        name: impl Into<String>,
        default: impl Into<FlagValue>,
        required: impl Into<FlagValue>,
    ) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            required: required.into(),
        }
    }

    /// Enabled unless explicitly disabled: defaults to `true`, requires `true`.
    pub fn enabled(name: impl Into<String>) -> Self {
        Self::new(name, true, true)
    }

    /// Read the flag and compare it with `required`, explaining the result.
    pub fn check(&self, snapshot: &ConfigurationSnapshot) -> Result<Verdict, SnapshotError> {
        let present = snapshot.contains(&self.name);
        let value = snapshot.get(&self.name, &self.default)?;
        let matched = value == self.required;
        let origin = if present { "" } else { " (default)" };

        let reason = if matched {
            format!("`{}` is {value}{origin}", self.name)
        } else {
            format!("`{}` is {value}{origin}, requires {}", self.name, self.required)
        };

        Ok(Verdict::new(matched, reason))
    }
}

/// Expression tree deciding whether a feature is registered.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Condition {
    #[default]
    Always,
    Flag(FlagCondition),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Not(Box<Condition>),
}

/// The result of evaluating a condition, with a short explanation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub matched: bool,
    pub reason: String,
}

impl Verdict {
    fn new(matched: bool, reason: impl Into<String>) -> Self {
        Self {
            matched,
            reason: reason.into(),
        }
    }
}

impl Condition {
    pub fn flag(name: impl Into<String>) -> Self {
        Condition::Flag(FlagCondition::enabled(name))
    }

    pub fn flag_equals(
        name: impl Into<String>,
        default: impl Into<FlagValue>,
        required: impl Into<FlagValue>,
    ) -> Self {
        Condition::Flag(FlagCondition::new(name, default, required))
    }

    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All(conditions.into_iter().collect())
    }

    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Any(conditions.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    /// Conjunction that keeps `self`'s terms first and flattens nested `All`s.
    pub fn and(self, other: Condition) -> Self {
        match (self, other) {
            (Condition::Always, other) => other,
            (this, Condition::Always) => this,
            (Condition::All(mut lhs), Condition::All(rhs)) => {
                lhs.extend(rhs);
                Condition::All(lhs)
            }
            (Condition::All(mut lhs), other) => {
                lhs.push(other);
                Condition::All(lhs)
            }
            (this, Condition::All(rhs)) => {
                let mut terms = Vec::with_capacity(rhs.len() + 1);
                terms.push(this);
                terms.extend(rhs);
                Condition::All(terms)
            }
            (this, other) => Condition::All(vec![this, other]),
        }
    }

    /// Every flag name referenced by this condition, in first-seen order.
    pub fn flags(&self) -> Vec<&str> {
        let mut names = vec![];
        self.collect_flags(&mut names);
        names
    }

    fn collect_flags<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Condition::Always => {}
            Condition::Flag(flag) => {
                if !names.contains(&flag.name.as_str()) {
                    names.push(&flag.name);
                }
            }
            Condition::All(terms) | Condition::Any(terms) => {
                for term in terms {
                    term.collect_flags(names);
                }
            }
            Condition::Not(inner) => inner.collect_flags(names),
        }
    }

    /// Evaluate against `snapshot`. Flags named in `independent_of` are not consulted and
    /// count as satisfied. `All` and `Any` stop at the first deciding term.
    pub fn evaluate(
        &self,
        snapshot: &ConfigurationSnapshot,
        independent_of: &BTreeSet<String>,
    ) -> Result<Verdict, SnapshotError> {
        match self {
            Condition::Always => Ok(Verdict::new(true, "unconditional")),
            Condition::Flag(flag) => {
                if independent_of.contains(&canonical(&flag.name)) {
                    return Ok(Verdict::new(true, format!("`{}` ignored", flag.name)));
                }

                flag.check(snapshot)
            }
            Condition::All(terms) => {
                let mut reasons = Vec::with_capacity(terms.len());
                for term in terms {
                    let verdict = term.evaluate(snapshot, independent_of)?;
                    if !verdict.matched {
                        return Ok(verdict);
                    }
                    reasons.push(verdict.reason);
                }

                if reasons.is_empty() {
                    return Ok(Verdict::new(true, "unconditional"));
                }

                Ok(Verdict::new(true, reasons.join("; ")))
            }
            Condition::Any(terms) => {
                let mut reasons = Vec::with_capacity(terms.len());
                for term in terms {
                    let verdict = term.evaluate(snapshot, independent_of)?;
                    if verdict.matched {
                        return Ok(verdict);
                    }
                    reasons.push(verdict.reason);
                }

                if reasons.is_empty() {
                    return Ok(Verdict::new(false, "no alternatives"));
                }

                Ok(Verdict::new(false, reasons.join("; ")))
            }
            Condition::Not(inner) => {
                let verdict = inner.evaluate(snapshot, independent_of)?;
                Ok(Verdict::new(
                    !verdict.matched,
                    format!("not ({})", verdict.reason),
                ))
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        fn join(
            f: &mut std::fmt::Formatter<'_>,
            terms: &[Condition],
            op: &str,
        ) -> Result<(), std::fmt::Error> {
            write!(f, "(")?;
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{term}")?;
            }
            write!(f, ")")
        }

        match self {
            Condition::Always => write!(f, "always"),
            Condition::Flag(flag) => write!(f, "{}={}", flag.name, flag.required),
            Condition::All(terms) => join(f, terms, "&&"),
            Condition::Any(terms) => join(f, terms, "||"),
            Condition::Not(inner) => write!(f, "!{inner}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn absent_flag_defaults_to_enabled() {
        let verdict = Condition::flag("features.enabled")
            .evaluate(&ConfigurationSnapshot::new(), &none())
            .unwrap();

        assert!(verdict.matched);
        assert_eq!(verdict.reason, "`features.enabled` is true (default)");
    }

    #[test]
    fn flag_condition_compares_with_the_required_value() {
        let mode = FlagCondition::new("discovery.mode", "simple", "reactive");

        let verdict = mode.check(&ConfigurationSnapshot::new()).unwrap();
        assert!(!verdict.matched);
        assert_eq!(verdict.reason, "`discovery.mode` is simple (default), requires reactive");

        let reactive = ConfigurationSnapshot::new().with("Discovery.Mode", "reactive");
        assert_eq!(
            Condition::Flag(mode.clone())
                .evaluate(&reactive, &none())
                .unwrap(),
            mode.check(&reactive).unwrap()
        );
    }

    #[test]
    fn all_stops_at_the_first_unmatched_term() {
        let condition = Condition::all([
            Condition::flag("discovery.blocking.enabled"),
            Condition::flag("discovery.enabled"),
            Condition::flag("discovery.client.health-indicator.enabled"),
        ]);
        // The last flag is malformed, but the umbrella decides first.
        let snapshot = ConfigurationSnapshot::new()
            .with("discovery.enabled", false)
            .with("discovery.client.health-indicator.enabled", "garbage");

        let verdict = condition.evaluate(&snapshot, &none()).unwrap();
        assert!(!verdict.matched);
        assert_eq!(verdict.reason, "`discovery.enabled` is false, requires true");
    }

    #[test]
    fn any_and_not_compose() {
        let condition = Condition::any([
            Condition::flag_equals("discovery.mode", "simple", "reactive"),
            Condition::not(Condition::flag("discovery.blocking.enabled")),
        ]);

        let blocking_off = ConfigurationSnapshot::new().with("discovery.blocking.enabled", false);
        assert!(condition.evaluate(&blocking_off, &none()).unwrap().matched);

        let reactive = ConfigurationSnapshot::new().with("discovery.mode", "reactive");
        assert!(condition.evaluate(&reactive, &none()).unwrap().matched);

        assert!(
            !condition
                .evaluate(&ConfigurationSnapshot::new(), &none())
                .unwrap()
                .matched
        );
    }

    #[test]
    fn independent_flags_are_not_read() {
        let condition = Condition::all([
            Condition::flag("discovery.blocking.enabled"),
            Condition::flag("discovery.enabled"),
        ]);
        let snapshot = ConfigurationSnapshot::new().with("discovery.blocking.enabled", "nope");
        let independent = BTreeSet::from(["discovery.blocking.enabled".to_owned()]);

        let verdict = condition.evaluate(&snapshot, &independent).unwrap();
        assert!(verdict.matched);
        assert!(condition.evaluate(&snapshot, &none()).is_err());
    }

    #[test]
    fn and_flattens_conjunctions() {
        let condition = Condition::Always
            .and(Condition::flag("a"))
            .and(Condition::all([Condition::flag("b"), Condition::flag("c")]))
            .and(Condition::Always);

        assert_eq!(condition.flags(), vec!["a", "b", "c"]);
        assert_eq!(condition.to_string(), "(a=true && b=true && c=true)");
    }

    #[test]
    fn empty_any_never_matches() {
        let verdict = Condition::any(Vec::new())
            .evaluate(&ConfigurationSnapshot::new(), &none())
            .unwrap();
        assert!(!verdict.matched);
    }
}
