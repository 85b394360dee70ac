use serde::{Deserialize, Serialize};

use super::RegistrationResult;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisabledFeature {
    pub name: String,
    pub reason: String,
}

/// Serializable inventory of a registration: which features are on, and why the rest are off.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesReport {
    pub enabled: Vec<String>,
    pub disabled: Vec<DisabledFeature>,
}

impl RegistrationResult {
    pub fn report(&self) -> FeaturesReport {
        let mut report = FeaturesReport::default();

        for (name, outcome) in self.outcomes() {
            if outcome.enabled {
                report.enabled.push(name.to_owned());
            } else {
                report.disabled.push(DisabledFeature {
                    name: name.to_owned(),
                    reason: outcome.reason.clone(),
                });
            }
        }

        report
    }
}
