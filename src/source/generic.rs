use crate::snapshot::ConfigurationSnapshot;

/// An in-memory source, handy for tests and for hosts that already hold their flags.
///
/// ```rust
/// use conditional_registry::snapshot;
/// use conditional_registry::source::{Generic, Source};
///
/// # tokio_test::block_on(async {
/// let source = Generic::new(snapshot! { "features.enabled" => false });
/// let loaded = source.load().await.unwrap();
///
/// assert!(!loaded.get_bool("features.enabled", true).unwrap());
/// # })
/// ```
#[derive(Default, Debug, Clone)]
pub struct Generic {
    state: ConfigurationSnapshot,
}

impl Generic {
    pub fn new(state: ConfigurationSnapshot) -> Self {
        Self { state }
    }
}

impl super::Source for Generic {
    type Error = std::convert::Infallible;

    async fn load(&self) -> Result<ConfigurationSnapshot, Self::Error> {
        Ok(self.state.clone())
    }
}
