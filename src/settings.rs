//! Export Settings
//!
//! Configuration for a single export run.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use thirdroom_export::settings::{ExportSettings, BlobStorage};
//!
//! // Default: binary blobs packed into one buffer, mp3 audio only
//! let settings = ExportSettings::default();
//!
//! // Single self-contained .gltf with data URIs
//! let settings = ExportSettings {
//!     blob_storage: BlobStorage::DataUri,
//!     ..Default::default()
//! };
//!
//! // Or from a JSON file
//! let settings = ExportSettings::from_json_file("export.json")?;
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

// ---------------------------------------------------------------------------
// BlobStorage
// ---------------------------------------------------------------------------

/// Where exported binary blobs (audio clips, images) end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobStorage {
    /// Appended to the document's single binary buffer and addressed by a
    /// buffer view.
    #[default]
    BufferView,
    /// Embedded as a base64 `data:` URI.
    DataUri,
    /// Written as a sibling file next to the `.gltf` and addressed by a
    /// relative URI.
    External,
}

// ---------------------------------------------------------------------------
// ExportSettings
// ---------------------------------------------------------------------------

/// Export configuration.
///
/// Every field has a default, so a JSON settings file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Value written to `asset.generator`.
    pub generator: String,

    /// Storage strategy for binary blobs.
    pub blob_storage: BlobStorage,

    /// Audio MIME types the `KHR_audio` exporter accepts. A clip of any other
    /// type fails the audio finalize step.
    pub allowed_audio_mime_types: Vec<String>,

    /// Bloom strength written to `MX_postprocessing` is the host bloom
    /// intensity multiplied by this factor.
    pub bloom_intensity_scale: f32,

    /// Abort the export when baked lightmaps exist but the lightmap settings
    /// are not non-directional / baked-indirect.
    pub require_lightmap_preconditions: bool,

    /// Cubemap edge size requested from the environment capture when
    /// exporting the scene background.
    pub cubemap_size: u32,

    /// Extension names that are skipped entirely.
    pub disabled_extensions: Vec<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            generator: format!("thirdroom-export {}", env!("CARGO_PKG_VERSION")),
            blob_storage: BlobStorage::default(),
            allowed_audio_mime_types: vec!["audio/mpeg".to_string()],
            bloom_intensity_scale: 0.1,
            require_lightmap_preconditions: true,
            cubemap_size: 1024,
            disabled_extensions: Vec::new(),
        }
    }
}

impl ExportSettings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    #[must_use]
    pub fn is_extension_enabled(&self, name: &str) -> bool {
        !self.disabled_extensions.iter().any(|n| n == name)
    }

    #[must_use]
    pub fn is_audio_mime_allowed(&self, mime_type: &str) -> bool {
        self.allowed_audio_mime_types.iter().any(|m| m == mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = ExportSettings::from_json_str(r#"{ "blob_storage": "data_uri" }"#).unwrap();
        assert_eq!(settings.blob_storage, BlobStorage::DataUri);
        assert_eq!(settings.allowed_audio_mime_types, vec!["audio/mpeg".to_string()]);
        assert!((settings.bloom_intensity_scale - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_disabled_extensions() {
        let settings = ExportSettings {
            disabled_extensions: vec!["MX_static".to_string()],
            ..Default::default()
        };
        assert!(!settings.is_extension_enabled("MX_static"));
        assert!(settings.is_extension_enabled("OMI_collider"));
    }
}
