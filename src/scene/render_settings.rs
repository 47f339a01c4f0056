use std::sync::Arc;

use crate::errors::Result;
use crate::scene::NodeKey;
use crate::scene::image::Image;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightmapsMode {
    #[default]
    NonDirectional,
    CombinedDirectional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixedLightingMode {
    #[default]
    IndirectOnly,
    Shadowmask,
    Subtractive,
}

#[derive(Debug, Clone, Default)]
pub struct Lightmap {
    pub color: Option<Arc<Image>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub intensity: f32,
}

/// A post-processing volume.
#[derive(Debug, Clone, Default)]
pub struct Volume {
    pub is_global: bool,
    pub active: bool,
    pub bloom: Option<BloomSettings>,
}

/// Ambient render state read once during finalize.
#[derive(Debug, Clone, Default)]
pub struct RenderSettings {
    /// Whether a skybox is configured. The background image itself comes from
    /// an [`EnvironmentCapture`].
    pub skybox: bool,
    /// Explicit sun light; when absent the first directional light is used.
    pub sun: Option<NodeKey>,
    /// Scene-wide fallback reflection cubemap.
    pub default_reflection: Option<Arc<Image>>,

    pub lightmaps: Vec<Lightmap>,
    pub lightmaps_mode: LightmapsMode,
    pub mixed_lighting_mode: MixedLightingMode,

    pub volumes: Vec<Volume>,
}

/// Parameters for an environment capture.
#[derive(Debug, Clone, Copy)]
pub struct CaptureRequest {
    pub cubemap_size: u32,
    pub sun: Option<NodeKey>,
}

/// Host-side producer of the equirectangular background image.
pub trait EnvironmentCapture {
    fn capture_equirectangular(&self, request: &CaptureRequest) -> Result<Arc<Image>>;
}
