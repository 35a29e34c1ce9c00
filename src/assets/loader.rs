use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::config::model::{ConfigChanges, VideoConfig};
use crate::foundation::error::{ScrollError, ScrollResult};

/// Resolves configuration asset references against a root directory and decodes them.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    /// Create a loader resolving relative references against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory for relative references.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a reference to a local path.
    ///
    /// Accepts relative paths, absolute paths and `file://` URLs. Network and in-memory URL
    /// schemes are rejected with an asset error.
    pub fn resolve(&self, reference: &str) -> ScrollResult<PathBuf> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ScrollError::asset("empty asset reference"));
        }
        if let Some(rest) = reference.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if let Some((scheme, _)) = reference.split_once("://") {
            return Err(ScrollError::asset(format!(
                "unsupported asset scheme '{scheme}' in '{reference}'"
            )));
        }
        if reference.starts_with("blob:") || reference.starts_with("data:") {
            return Err(ScrollError::asset(format!(
                "unsupported inline asset reference '{}'",
                reference.chars().take(16).collect::<String>()
            )));
        }
        let path = Path::new(reference);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.root.join(path))
        }
    }

    /// Read and decode an image reference.
    pub fn load_image(&self, reference: &str) -> ScrollResult<Arc<PreparedImage>> {
        let path = self.resolve(reference)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("read image '{}'", path.display()))?;
        let img = decode_image(&bytes).map_err(|e| {
            ScrollError::asset(format!("decode image '{}': {e}", path.display()))
        })?;
        Ok(Arc::new(img))
    }

    /// Load an optional reference; failures are logged and the layer is treated as absent.
    pub fn load_optional(
        &self,
        reference: Option<&str>,
        layer: &str,
    ) -> Option<Arc<PreparedImage>> {
        let reference = reference.filter(|r| !r.trim().is_empty())?;
        match self.load_image(reference) {
            Ok(img) => {
                tracing::debug!(layer, width = img.width, height = img.height, "image loaded");
                Some(img)
            }
            Err(err) => {
                tracing::warn!(layer, error = %err, "image failed to load; layer disabled");
                None
            }
        }
    }
}

/// Decoded raster layers referenced by the current configuration.
#[derive(Clone, Debug, Default)]
pub struct LoadedAssets {
    /// Full-canvas background, drawn with cover scaling.
    pub background: Option<Arc<PreparedImage>>,
    /// Image watermark.
    pub watermark: Option<Arc<PreparedImage>>,
    /// Top-most logo.
    pub logo: Option<Arc<PreparedImage>>,
}

impl LoadedAssets {
    /// Load every image layer of `config`.
    pub fn load_all(config: &VideoConfig, loader: &AssetLoader) -> Self {
        Self {
            background: loader.load_optional(config.background_image.as_deref(), "background"),
            watermark: loader.load_optional(config.watermark_url.as_deref(), "watermark"),
            logo: loader.load_optional(config.logo_url.as_deref(), "logo"),
        }
    }

    /// Reload only the layers whose reference changed.
    pub fn apply_changes(
        &mut self,
        changes: &ConfigChanges,
        config: &VideoConfig,
        loader: &AssetLoader,
    ) {
        if changes.background_image {
            self.background =
                loader.load_optional(config.background_image.as_deref(), "background");
        }
        if changes.watermark_image {
            self.watermark = loader.load_optional(config.watermark_url.as_deref(), "watermark");
        }
        if changes.logo_image {
            self.logo = loader.load_optional(config.logo_url.as_deref(), "logo");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
