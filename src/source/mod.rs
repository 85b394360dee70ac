mod environment;
mod generic;
mod json_file;
mod layered;

pub use environment::Environment;
pub use generic::Generic;
pub use json_file::{Error as JsonFileError, JsonFile};
pub use layered::Layered;

use crate::snapshot::ConfigurationSnapshot;

/// Somewhere configuration flags come from.
pub trait Source: Send + Sync + 'static {
    type Error: std::fmt::Debug + std::fmt::Display;

    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<ConfigurationSnapshot, Self::Error>> + Send;
}
