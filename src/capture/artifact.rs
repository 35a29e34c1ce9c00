use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context as _;

use crate::capture::format::RecorderFormat;
use crate::foundation::error::{ScrollError, ScrollResult};

/// Product prefix of every artifact file name.
pub const ARTIFACT_PREFIX: &str = "scrollvision";

/// A finished recording ready to be handed to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `scrollvision-<unix millis>.<ext>`.
    pub file_name: String,
    /// MIME type of the recorded format.
    pub mime: &'static str,
    /// Encoded container bytes.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Concatenate `chunks` in emission order and name the result after `timestamp`.
    pub fn from_chunks(
        format: RecorderFormat,
        chunks: Vec<Vec<u8>>,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        let bytes = chunks.concat();
        Self {
            file_name: artifact_file_name(format, timestamp),
            mime: format.mime,
            bytes,
        }
    }
}

/// `scrollvision-<unix millis>.<mp4|webm>`.
pub fn artifact_file_name(
    format: RecorderFormat,
    timestamp: chrono::DateTime<chrono::Utc>,
) -> String {
    format!("{ARTIFACT_PREFIX}-{}.{}", timestamp.timestamp_millis(), format.extension())
}

/// Receives finished artifacts.
pub trait DownloadSink {
    /// Hand `artifact` to the user.
    fn deliver(&mut self, artifact: ExportArtifact) -> ScrollResult<()>;
}

/// Writes artifacts into a directory.
#[derive(Clone, Debug)]
pub struct DirectoryDownloads {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectoryDownloads {
    /// Deliver into `dir`, created on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for DirectoryDownloads {
    fn deliver(&mut self, artifact: ExportArtifact) -> ScrollResult<()> {
        if artifact.file_name.contains(['/', '\\']) {
            return Err(ScrollError::validation(format!(
                "artifact name '{}' must not contain path separators",
                artifact.file_name
            )));
        }
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        let path = self.dir.join(&artifact.file_name);
        std::fs::write(&path, &artifact.bytes)
            .with_context(|| format!("failed to write artifact '{}'", path.display()))?;
        tracing::info!(
            path = %path.display(),
            bytes = artifact.bytes.len(),
            "export artifact written"
        );
        self.written.push(path);
        Ok(())
    }
}

/// Keeps delivered artifacts in memory; clones share the same list.
#[derive(Clone, Debug, Default)]
pub struct MemoryDownloads {
    artifacts: Arc<Mutex<Vec<ExportArtifact>>>,
}

impl MemoryDownloads {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every artifact delivered so far.
    pub fn artifacts(&self) -> Vec<ExportArtifact> {
        self.artifacts.lock().map(|a| a.clone()).unwrap_or_default()
    }

    /// Number of artifacts delivered.
    pub fn len(&self) -> usize {
        self.artifacts.lock().map(|a| a.len()).unwrap_or(0)
    }

    /// Return `true` when nothing was delivered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DownloadSink for MemoryDownloads {
    fn deliver(&mut self, artifact: ExportArtifact) -> ScrollResult<()> {
        tracing::info!(
            name = %artifact.file_name,
            bytes = artifact.bytes.len(),
            "export artifact delivered"
        );
        self.artifacts
            .lock()
            .map_err(|_| ScrollError::export("download list lock poisoned"))?
            .push(artifact);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/artifact.rs"]
mod tests;
