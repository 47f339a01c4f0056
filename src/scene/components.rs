use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use glam::{Vec3, Vec4};
use serde::Serialize;

use crate::errors::Result;
use crate::scene::component::{Component, ComponentType};
use crate::scene::image::Image;

// ============================================================================
// Audio
// ============================================================================

/// An audio asset. Shared between sources through `Arc`; two clips are the
/// same clip only if they are the same allocation.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub name: String,
    /// Asset path; its extension decides the MIME type.
    pub path: PathBuf,
    /// In-memory contents. When `None` the file at `path` is read on export.
    pub data: Option<Vec<u8>>,
}

impl AudioClip {
    #[must_use]
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path, data: None }
    }

    #[must_use]
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        let mut clip = Self::from_file(path);
        clip.data = Some(data);
        clip
    }

    /// File name used when the clip is exported as a blob.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    /// MIME type derived from the file extension, `None` for unknown ones.
    #[must_use]
    pub fn mime_type(&self) -> Option<&'static str> {
        let ext = self.path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp3" => Some("audio/mpeg"),
            "ogg" => Some("audio/ogg"),
            "wav" => Some("audio/wav"),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        match &self.data {
            Some(data) => Ok(Cow::Borrowed(data)),
            None => Ok(Cow::Owned(std::fs::read(&self.path)?)),
        }
    }
}

/// A reusable audio source configuration (clip + playback flags).
#[derive(Debug, Clone)]
pub struct AudioSourceConfig {
    pub clip: Option<Arc<AudioClip>>,
    pub gain: f32,
    pub auto_play: bool,
    pub looping: bool,
}

impl AudioSourceConfig {
    #[must_use]
    pub fn new(clip: Arc<AudioClip>) -> Self {
        Self {
            clip: Some(clip),
            ..Default::default()
        }
    }
}

impl Default for AudioSourceConfig {
    fn default() -> Self {
        Self {
            clip: None,
            gain: 1.0,
            auto_play: true,
            looping: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceModel {
    Linear,
    #[default]
    Inverse,
    Exponential,
}

/// An emitter positioned at its node. Cone angles are in degrees.
#[derive(Debug, Clone)]
pub struct PositionalAudioEmitter {
    pub sources: Vec<Arc<AudioSourceConfig>>,
    pub gain: f32,
    pub cone_inner_angle: f32,
    pub cone_outer_angle: f32,
    pub cone_outer_gain: f32,
    pub distance_model: DistanceModel,
    pub ref_distance: f32,
    pub max_distance: f32,
    pub rolloff_factor: f32,
}

impl Default for PositionalAudioEmitter {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            gain: 1.0,
            cone_inner_angle: 360.0,
            cone_outer_angle: 360.0,
            cone_outer_gain: 0.0,
            distance_model: DistanceModel::Inverse,
            ref_distance: 1.0,
            max_distance: 10000.0,
            rolloff_factor: 1.0,
        }
    }
}

/// A scene-wide (non-positional) emitter.
#[derive(Debug, Clone)]
pub struct GlobalAudioEmitter {
    pub sources: Vec<Arc<AudioSourceConfig>>,
    pub gain: f32,
}

impl Default for GlobalAudioEmitter {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            gain: 1.0,
        }
    }
}

// ============================================================================
// Physics
// ============================================================================

/// Mesh data already rendered by the host's mesh exporter.
#[derive(Debug, Clone, Default)]
pub struct HostMesh {
    pub name: String,
    /// glTF primitive objects, written verbatim.
    pub primitives: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub enum ColliderShape {
    Box { size: Vec3 },
    Sphere { radius: f32 },
    Capsule { radius: f32, height: f32 },
    Mesh { mesh: Arc<HostMesh> },
    /// A host collider type the exporter has no mapping for.
    Other(String),
}

#[derive(Debug, Clone)]
pub struct Collider {
    pub enabled: bool,
    pub shape: ColliderShape,
    /// Local offset of the shape relative to its node.
    pub center: Vec3,
}

impl Collider {
    #[must_use]
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            enabled: true,
            shape,
            center: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Rigidbody {
    pub mass: f32,
    pub is_kinematic: bool,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self {
            mass: 1.0,
            is_kinematic: false,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReflectionProbe {
    pub enabled: bool,
    pub size: Vec3,
    pub baked_texture: Option<Arc<Image>>,
    pub custom_baked_texture: Option<Arc<Image>>,
}

impl ReflectionProbe {
    /// The custom bake wins over the automatic one.
    #[must_use]
    pub fn texture(&self) -> Option<&Arc<Image>> {
        self.custom_baked_texture.as_ref().or(self.baked_texture.as_ref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightType {
    #[default]
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightmapBakeType {
    #[default]
    Realtime,
    Mixed,
    Baked,
}

#[derive(Debug, Clone, Default)]
pub struct Light {
    pub kind: LightType,
    pub enabled: bool,
    pub shadows: bool,
    pub bake_type: LightmapBakeType,
}

#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub cast_shadows: bool,
    pub receive_shadows: bool,
    /// Index into `RenderSettings::lightmaps`; negative means none.
    pub lightmap_index: i32,
    /// (scale.x, scale.y, offset.x, offset.y) in lightmap UV space.
    pub lightmap_scale_offset: Vec4,
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self {
            cast_shadows: true,
            receive_shadows: true,
            lightmap_index: -1,
            lightmap_scale_offset: Vec4::new(1.0, 1.0, 0.0, 0.0),
        }
    }
}

// ============================================================================
// Gameplay
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SpawnPoint {
    pub title: String,
    pub team: String,
    pub group: String,
}

// ============================================================================
// Attachment
// ============================================================================

/// Everything a node can carry that some extension exports.
#[derive(Debug, Clone)]
pub enum Attachment {
    AudioEmitter(Arc<PositionalAudioEmitter>),
    GlobalAudioEmitter(Arc<GlobalAudioEmitter>),
    Collider(Arc<Collider>),
    Rigidbody(Rigidbody),
    ReflectionProbe(Arc<ReflectionProbe>),
    Light(Light),
    MeshRenderer(MeshRenderer),
    SpawnPoint(SpawnPoint),
    Link { uri: String },
    Portal { uri: String },
    /// Marks the scene as an AR scene.
    SceneAr,
    /// A user-defined component exported through its reflected fields.
    Component(Arc<dyn Component>),
    /// Component types declared on the node without an instance.
    AdditionalComponents(Vec<ComponentType>),
}

impl Attachment {
    #[must_use]
    pub fn as_audio_emitter(&self) -> Option<&Arc<PositionalAudioEmitter>> {
        match self {
            Attachment::AudioEmitter(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_global_audio_emitter(&self) -> Option<&Arc<GlobalAudioEmitter>> {
        match self {
            Attachment::GlobalAudioEmitter(e) => Some(e),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_collider(&self) -> Option<&Arc<Collider>> {
        match self {
            Attachment::Collider(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rigidbody(&self) -> Option<&Rigidbody> {
        match self {
            Attachment::Rigidbody(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reflection_probe(&self) -> Option<&Arc<ReflectionProbe>> {
        match self {
            Attachment::ReflectionProbe(p) => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_light(&self) -> Option<&Light> {
        match self {
            Attachment::Light(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mesh_renderer(&self) -> Option<&MeshRenderer> {
        match self {
            Attachment::MeshRenderer(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_spawn_point(&self) -> Option<&SpawnPoint> {
        match self {
            Attachment::SpawnPoint(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_link_uri(&self) -> Option<&str> {
        match self {
            Attachment::Link { uri } => Some(uri),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_portal_uri(&self) -> Option<&str> {
        match self {
            Attachment::Portal { uri } => Some(uri),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_component(&self) -> Option<&Arc<dyn Component>> {
        match self {
            Attachment::Component(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_additional_components(&self) -> Option<&[ComponentType]> {
        match self {
            Attachment::AdditionalComponents(types) => Some(types),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_scene_ar(&self) -> bool {
        matches!(self, Attachment::SceneAr)
    }
}
