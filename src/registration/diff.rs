use std::collections::BTreeSet;

use super::RegistrationResult;

impl RegistrationResult {
    /// Describe how the enabled set moved from `previous` to `self`.
    ///
    /// Newly enabled features read `+feature:{name}`, newly disabled or vanished ones
    /// read `-feature:{name}:{reason}`. Lines are ordered by feature name.
    pub fn diff(&self, previous: &RegistrationResult) -> Vec<String> {
        let mut changes: Vec<String> = vec![];

        let all_names: BTreeSet<&str> = self
            .outcomes()
            .chain(previous.outcomes())
            .map(|(name, _)| name)
            .collect();

        for name in all_names {
            let current = self.outcome(name).filter(|o| o.enabled);
            let before = previous.outcome(name).filter(|o| o.enabled);

            match (current, before) {
                (None, None) | (Some(_), Some(_)) => continue,
                (Some(_), None) => changes.push(format!("+feature:{name}")),
                (None, Some(_)) => {
                    let reason = self
                        .outcome(name)
                        .map(|o| o.reason.as_str())
                        .unwrap_or("no longer described");
                    changes.push(format!("-feature:{name}:{reason}"));
                }
            }
        }

        changes
    }
}
