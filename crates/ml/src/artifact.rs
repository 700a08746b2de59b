use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use crate::TrainedModel;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed reading model artifact at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed decoding model artifact at {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load(path: &Path) -> Result<TrainedModel, ModelLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ModelLoadError::Read {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| ModelLoadError::Decode {
        path: path.display().to_string(),
        source,
    })
}

/// Writes the artifact to a sibling temp file and renames it into place, so a
/// concurrent loader never observes a partial write.
pub fn save(path: &Path, model: &TrainedModel) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating model directory {}", parent.display()))?;
        }
    }

    let payload = serde_json::to_vec_pretty(model).context("failed encoding model artifact")?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, payload)
        .with_context(|| format!("failed writing model artifact to {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("failed moving model artifact into {}", path.display()))?;

    Ok(())
}
