//! File-backed circle store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::persistence::SerializedCircles;
use crate::core::CircleSet;
use crate::ports::{CircleStore, StoreResult};

/// Stores one circle set in one file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CircleStore for FileStore {
    fn save(&self, model: &CircleSet) -> StoreResult<()> {
        let bytes = SerializedCircles::from_model(model).to_bytes()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, &bytes)?;
        debug!(path = ?self.path, circles = model.len(), bytes = bytes.len(), "circle set saved");
        Ok(())
    }

    fn load(&self) -> StoreResult<CircleSet> {
        let bytes = fs::read(&self.path)?;
        let model = SerializedCircles::from_bytes(&bytes)?.into_model()?;
        debug!(path = ?self.path, circles = model.len(), "circle set loaded");
        Ok(model)
    }
}
