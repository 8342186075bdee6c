//! Checkpoint save and restore.

use rps_core::{Error, Result};
use rps_world::TerrainSnapshot;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    pub timestamp: i64,
    /// Whether the drive loop was running when the checkpoint was taken
    pub running: bool,
    pub terrain: TerrainSnapshot,
}

impl Checkpoint {
    pub fn new(running: bool, terrain: TerrainSnapshot) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            timestamp: chrono::Utc::now().timestamp(),
            running,
            terrain,
        }
    }
}

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the checkpoint next to its final path, then rename over it.
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let bytes = bincode::serialize(checkpoint)
            .map_err(|e| Error::Serialization(format!("Failed to serialize checkpoint: {}", e)))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &bytes).await?;
        fs::rename(&tmp_path, &self.path).await?;

        info!(
            path = %self.path.display(),
            iterations = checkpoint.terrain.iterations,
            running = checkpoint.running,
            "Checkpoint saved"
        );
        Ok(())
    }

    /// `Ok(None)` when no checkpoint has been written yet.
    pub async fn load(&self) -> Result<Option<Checkpoint>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "No checkpoint found");
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let checkpoint: Checkpoint = bincode::deserialize(&bytes).map_err(|e| {
            Error::Serialization(format!("Failed to deserialize checkpoint: {}", e))
        })?;

        if checkpoint.version != CHECKPOINT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported checkpoint version {}",
                checkpoint.version
            )));
        }

        info!(
            path = %self.path.display(),
            timestamp = checkpoint.timestamp,
            "Checkpoint loaded"
        );
        Ok(Some(checkpoint))
    }
}
