//! 文档写入模块 (Document writer)
//!
//! 导出扩展与输出文档之间的唯一接口：
//! - DocumentWriter: 节点/场景创建、扩展负载挂载、二进制块与纹理导出
//! - Document: glTF 2.0 JSON 文档的默认实现
//!
//! Extensions never touch the document's arrays directly. They obtain indices
//! from the writer (`add_node`, `export_texture`, ...) and attach opaque JSON
//! payloads to a node, a scene, a texture or the document root.

pub(crate) mod defaults;
pub mod gltf;

pub use gltf::Document;

use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::errors::Result;
use crate::scene::{HostMesh, HostNode, Image};

// ============================================================================
// Records
// ============================================================================

/// A glTF node. Transform components equal to their defaults are omitted.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<Vec3>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl NodeRecord {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = (translation != Vec3::ZERO).then_some(translation);
        self
    }

    /// Copies name and local transform of a host node.
    #[must_use]
    pub fn from_host(node: &HostNode) -> Self {
        Self {
            name: (!node.name.is_empty()).then(|| node.name.clone()),
            translation: (node.translation != Vec3::ZERO).then_some(node.translation),
            rotation: (node.rotation != Quat::IDENTITY).then_some(node.rotation),
            scale: (node.scale != Vec3::ONE).then_some(node.scale),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<u32>,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl SceneRecord {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            name: (!name.is_empty()).then_some(name),
            ..Default::default()
        }
    }
}

/// Where an exported binary blob lives.
///
/// Exactly one of `uri` / `buffer_view` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<u32>,
}

/// How an exported texture is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureMapType {
    Srgb,
    Linear,
    CubeMap,
}

/// A glTF `textureInfo`: texture index plus UV set (omitted when 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub index: u32,
    #[serde(skip_serializing_if = "defaults::is_zero_u32")]
    pub tex_coord: u32,
}

/// The object an extension payload is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionTarget {
    Root,
    Scene(u32),
    Node(u32),
    Texture(u32),
}

impl fmt::Display for ExtensionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensionTarget::Root => f.write_str("root"),
            ExtensionTarget::Scene(i) => write!(f, "scene {i}"),
            ExtensionTarget::Node(i) => write!(f, "node {i}"),
            ExtensionTarget::Texture(i) => write!(f, "texture {i}"),
        }
    }
}

// ============================================================================
// DocumentWriter
// ============================================================================

/// The narrow capability set extensions use to write into the output document.
pub trait DocumentWriter {
    /// Appends a top-level node and returns its index.
    fn add_node(&mut self, node: NodeRecord) -> u32;

    /// Appends a node and makes it the last child of `parent`.
    fn add_child_node(&mut self, parent: u32, node: NodeRecord) -> Result<u32>;

    fn set_children(&mut self, node: u32, children: Vec<u32>) -> Result<()>;

    /// Appends a scene. The first scene becomes the active one.
    fn add_scene(&mut self, scene: SceneRecord) -> u32;

    fn set_scene_nodes(&mut self, scene: u32, nodes: Vec<u32>) -> Result<()>;

    fn active_scene(&self) -> Option<u32>;

    /// Attaches `payload` under `extensions[name]` of `target`, replacing any
    /// previous payload with the same name.
    fn add_extension(&mut self, target: ExtensionTarget, name: &str, payload: serde_json::Value) -> Result<()>;

    fn has_extension(&self, target: ExtensionTarget, name: &str) -> bool;

    /// Records `name` in `extensionsUsed` (and `extensionsRequired` when
    /// `required`). Idempotent.
    fn declare_extension_used(&mut self, name: &str, required: bool);

    /// Stores a binary blob according to the configured blob storage.
    fn export_binary_blob(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<BlobRef>;

    /// Exports an image once per `(allocation, map type)` and returns the
    /// texture reference.
    fn export_texture(&mut self, image: &Arc<Image>, map_type: TextureMapType) -> Result<TextureInfo>;

    /// Exports a mesh once per allocation and returns its index.
    fn export_mesh(&mut self, mesh: &Arc<HostMesh>) -> Result<u32>;
}
