use crate::condition::{Condition, FlagCondition};
use crate::descriptor::FeatureDescriptor;

/// A group of features sharing an umbrella flag and, optionally, narrow flags for
/// sub-modes such as blocking clients.
///
/// Every member is gated by the narrow flags, then the umbrella, then its own gates,
/// except for flags the member is independent of.
#[derive(Debug, Clone)]
pub struct FeatureFamily {
    umbrella: FlagCondition,
    narrow: Vec<FlagCondition>,
    members: Vec<Member>,
}

#[derive(Debug, Clone)]
struct Member {
    descriptor: FeatureDescriptor,
    independent: bool,
}

impl FeatureFamily {
    pub fn new(umbrella: impl Into<String>) -> Self {
        Self {
            umbrella: FlagCondition::enabled(umbrella),
            narrow: vec![],
            members: vec![],
        }
    }

    pub fn narrow(mut self, flag: impl Into<String>) -> Self {
        self.narrow.push(FlagCondition::enabled(flag));
        self
    }

    pub fn member(mut self, descriptor: FeatureDescriptor) -> Self {
        self.members.push(Member {
            descriptor,
            independent: false,
        });
        self
    }

    /// Add a member that ignores the umbrella and every narrow flag of this family,
    /// including narrow flags added after this call.
    pub fn independent(mut self, descriptor: FeatureDescriptor) -> Self {
        self.members.push(Member {
            descriptor,
            independent: true,
        });
        self
    }

    pub fn umbrella(&self) -> &str {
        &self.umbrella.name
    }

    pub fn into_descriptors(self) -> Vec<FeatureDescriptor> {
        let gates: Vec<FlagCondition> = self
            .narrow
            .into_iter()
            .chain(std::iter::once(self.umbrella))
            .collect();

        self.members
            .into_iter()
            .map(|Member { descriptor, independent }| {
                let descriptor = if independent {
                    gates
                        .iter()
                        .fold(descriptor, |descriptor, flag| descriptor.independent_of(&flag.name))
                } else {
                    descriptor
                };

                let gate = Condition::all(
                    gates
                        .iter()
                        .filter(|flag| !descriptor.is_independent_of(&flag.name))
                        .cloned()
                        .map(Condition::Flag),
                );

                match gate {
                    Condition::All(terms) if terms.is_empty() => descriptor,
                    gate => descriptor.guarded_by(gate),
                }
            })
            .collect()
    }
}
