use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Format, Json};
use tokio::fs::OpenOptions;
use tokio::io::AsyncReadExt;

use crate::Map;
use crate::snapshot::ConfigurationSnapshot;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Loading flags failed when opening the file `{0}`: {1}")]
    Open(PathBuf, std::io::Error),

    #[error("Reading flags from `{0}` failed: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("The file `{0}` does not hold a JSON object of flags: {1}")]
    Parse(PathBuf, figment::Error),
}

/// Flags read from a JSON object on disk, nested or already dotted.
///
/// Unlike a [`Layered`](super::Layered) file layer, a missing file is an error.
#[derive(Debug, Clone)]
pub struct JsonFile {
    location: PathBuf,
}

impl JsonFile {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl super::Source for JsonFile {
    type Error = Error;

    #[cfg_attr(
        feature = "tracing-instrument",
        tracing::instrument(skip(self), fields(location = ?self.location))
    )]
    async fn load(&self) -> Result<ConfigurationSnapshot, Error> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(false)
            .create(false)
            .truncate(false)
            .open(&self.location)
            .await
            .map_err(|e| Error::Open(self.location.clone(), e))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .await
            .map_err(|e| Error::Read(self.location.clone(), e))?;

        let map: Map = Figment::from(Json::string(&contents))
            .extract()
            .map_err(|e| Error::Parse(self.location.clone(), e))?;

        let snapshot = ConfigurationSnapshot::from_map(map);
        tracing::trace!(location = ?self.location, flags = snapshot.len(), "Loaded flags");

        Ok(snapshot)
    }
}
