//! glTF 2.0 JSON document.
//!
//! The in-memory document the exporter writes into. Serializing it yields the
//! `.gltf` JSON; binary blobs collected with [`BlobStorage::BufferView`] end
//! up in one `.bin` buffer next to it.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::{
    BlobRef, DocumentWriter, ExtensionTarget, NodeRecord, SceneRecord, TextureInfo, TextureMapType,
};
use crate::errors::{ExportError, Result};
use crate::export::handle::{Resource, ResourceKind};
use crate::export::registry::{EqualityPolicy, Identity, ResourceRegistry};
use crate::scene::{HostMesh, Image};
use crate::settings::{BlobStorage, ExportSettings};

const GLTF_VERSION: &str = "2.0";

// ============================================================================
// Serialized records
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct Asset {
    version: String,
    generator: String,
}

#[derive(Debug, Clone, Serialize)]
struct MeshRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    primitives: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    buffer_view: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
struct TextureRecord {
    source: u32,
    #[serde(skip_serializing_if = "Map::is_empty")]
    extensions: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferRecord {
    byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferViewRecord {
    buffer: u32,
    byte_offset: usize,
    byte_length: usize,
}

// ============================================================================
// Dedup keys
// ============================================================================

/// An exported texture: the image allocation plus how it is sampled.
#[derive(Debug, Clone)]
pub(crate) struct TextureKey {
    image: Arc<Image>,
    map_type: TextureMapType,
}

impl Resource for TextureKey {
    const KIND: ResourceKind = ResourceKind::Texture;
}

impl EqualityPolicy<TextureKey> for Identity {
    fn same(a: &TextureKey, b: &TextureKey) -> bool {
        Arc::ptr_eq(&a.image, &b.image) && a.map_type == b.map_type
    }
}

impl Resource for Arc<HostMesh> {
    const KIND: ResourceKind = ResourceKind::Mesh;
}

// ============================================================================
// Document
// ============================================================================

/// A glTF 2.0 document under construction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    asset: Asset,
    #[serde(skip_serializing_if = "Option::is_none")]
    scene: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    scenes: Vec<SceneRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<NodeRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<MeshRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<ImageRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    textures: Vec<TextureRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffers: Vec<BufferRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferViewRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions_used: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extensions_required: Vec<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    extensions: Map<String, Value>,

    // --- Not serialized ---
    #[serde(skip)]
    blob_storage: BlobStorage,
    #[serde(skip)]
    bin: Vec<u8>,
    #[serde(skip)]
    external_files: Vec<(String, Vec<u8>)>,
    #[serde(skip)]
    external_names: FxHashSet<String>,
    #[serde(skip)]
    exported_textures: ResourceRegistry<TextureKey>,
    #[serde(skip)]
    exported_meshes: ResourceRegistry<Arc<HostMesh>>,
}

impl Document {
    #[must_use]
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            asset: Asset {
                version: GLTF_VERSION.to_string(),
                generator: settings.generator.clone(),
            },
            scene: None,
            scenes: Vec::new(),
            nodes: Vec::new(),
            meshes: Vec::new(),
            images: Vec::new(),
            textures: Vec::new(),
            buffers: Vec::new(),
            buffer_views: Vec::new(),
            extensions_used: Vec::new(),
            extensions_required: Vec::new(),
            extensions: Map::new(),
            blob_storage: settings.blob_storage,
            bin: Vec::new(),
            external_files: Vec::new(),
            external_names: FxHashSet::default(),
            exported_textures: ResourceRegistry::new(),
            exported_meshes: ResourceRegistry::new(),
        }
    }

    // === Queries ===

    #[must_use]
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, index: u32) -> Option<&NodeRecord> {
        self.nodes.get(index as usize)
    }

    #[must_use]
    pub fn scenes(&self) -> &[SceneRecord] {
        &self.scenes
    }

    #[must_use]
    pub fn scene(&self, index: u32) -> Option<&SceneRecord> {
        self.scenes.get(index as usize)
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Payload of a root-level extension.
    #[must_use]
    pub fn root_extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Payload of an extension on any target.
    #[must_use]
    pub fn extension(&self, target: ExtensionTarget, name: &str) -> Option<&Value> {
        self.extensions_of(target)?.get(name)
    }

    #[must_use]
    pub fn extensions_used(&self) -> &[String] {
        &self.extensions_used
    }

    #[must_use]
    pub fn extensions_required(&self) -> &[String] {
        &self.extensions_required
    }

    /// Contents of the binary buffer collected with [`BlobStorage::BufferView`].
    #[must_use]
    pub fn binary(&self) -> &[u8] {
        &self.bin
    }

    /// Sibling files collected with [`BlobStorage::External`], as
    /// `(relative uri, bytes)`.
    #[must_use]
    pub fn external_files(&self) -> &[(String, Vec<u8>)] {
        &self.external_files
    }

    // === Output ===

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes `<path>` plus its `.bin` buffer and external blob files into the
    /// same directory.
    pub fn write_gltf(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        if !self.bin.is_empty() {
            let stem = path
                .file_stem()
                .map_or_else(|| "scene".to_string(), |s| s.to_string_lossy().into_owned());
            let bin_name = format!("{stem}.bin");
            std::fs::write(dir.join(&bin_name), &self.bin)?;
            if let Some(buffer) = self.buffers.first_mut() {
                buffer.uri = Some(bin_name);
            }
        }

        for (uri, bytes) in &self.external_files {
            std::fs::write(dir.join(uri), bytes)?;
        }

        std::fs::write(path, self.to_json_string_pretty()?)?;
        log::info!("Wrote glTF document to {}", path.display());
        Ok(())
    }

    // === Internals ===

    fn extensions_of(&self, target: ExtensionTarget) -> Option<&Map<String, Value>> {
        match target {
            ExtensionTarget::Root => Some(&self.extensions),
            ExtensionTarget::Scene(i) => self.scenes.get(i as usize).map(|s| &s.extensions),
            ExtensionTarget::Node(i) => self.nodes.get(i as usize).map(|n| &n.extensions),
            ExtensionTarget::Texture(i) => self.textures.get(i as usize).map(|t| &t.extensions),
        }
    }

    fn extensions_of_mut(&mut self, target: ExtensionTarget) -> Result<&mut Map<String, Value>> {
        let map = match target {
            ExtensionTarget::Root => Some(&mut self.extensions),
            ExtensionTarget::Scene(i) => self.scenes.get_mut(i as usize).map(|s| &mut s.extensions),
            ExtensionTarget::Node(i) => self.nodes.get_mut(i as usize).map(|n| &mut n.extensions),
            ExtensionTarget::Texture(i) => self.textures.get_mut(i as usize).map(|t| &mut t.extensions),
        };
        map.ok_or_else(|| ExportError::InvalidTarget(target.to_string()))
    }

    fn node_mut(&mut self, index: u32) -> Result<&mut NodeRecord> {
        self.nodes
            .get_mut(index as usize)
            .ok_or_else(|| ExportError::InvalidTarget(ExtensionTarget::Node(index).to_string()))
    }

    fn push_buffer_view(&mut self, bytes: &[u8]) -> u32 {
        // Buffer views start on 4-byte boundaries.
        while self.bin.len() % 4 != 0 {
            self.bin.push(0);
        }
        let byte_offset = self.bin.len();
        self.bin.extend_from_slice(bytes);

        if self.buffers.is_empty() {
            self.buffers.push(BufferRecord { byte_length: 0, uri: None });
        }
        self.buffers[0].byte_length = self.bin.len();

        self.buffer_views.push(BufferViewRecord {
            buffer: 0,
            byte_offset,
            byte_length: bytes.len(),
        });
        (self.buffer_views.len() - 1) as u32
    }

    fn unique_external_name(&mut self, name: &str, mime_type: &str) -> String {
        let mut base: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        if base.is_empty() {
            base = "blob".to_string();
        }
        if Path::new(&base).extension().is_none()
            && let Some(ext) = extension_for_mime(mime_type)
        {
            base = format!("{base}.{ext}");
        }

        let mut candidate = base.clone();
        let mut counter = 1;
        while self.external_names.contains(&candidate) {
            candidate = format!("{counter}_{base}");
            counter += 1;
        }
        self.external_names.insert(candidate.clone());
        candidate
    }
}

fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "audio/mpeg" => Some("mp3"),
        "audio/ogg" => Some("ogg"),
        "audio/wav" => Some("wav"),
        _ => None,
    }
}

impl DocumentWriter for Document {
    fn add_node(&mut self, node: NodeRecord) -> u32 {
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    fn add_child_node(&mut self, parent: u32, node: NodeRecord) -> Result<u32> {
        self.node_mut(parent)?;
        let index = self.add_node(node);
        self.node_mut(parent)?.children.push(index);
        Ok(index)
    }

    fn set_children(&mut self, node: u32, children: Vec<u32>) -> Result<()> {
        self.node_mut(node)?.children = children;
        Ok(())
    }

    fn add_scene(&mut self, scene: SceneRecord) -> u32 {
        self.scenes.push(scene);
        let index = (self.scenes.len() - 1) as u32;
        self.scene.get_or_insert(index);
        index
    }

    fn set_scene_nodes(&mut self, scene: u32, nodes: Vec<u32>) -> Result<()> {
        let record = self
            .scenes
            .get_mut(scene as usize)
            .ok_or_else(|| ExportError::InvalidTarget(ExtensionTarget::Scene(scene).to_string()))?;
        record.nodes = nodes;
        Ok(())
    }

    fn active_scene(&self) -> Option<u32> {
        self.scene
    }

    fn add_extension(&mut self, target: ExtensionTarget, name: &str, payload: Value) -> Result<()> {
        self.extensions_of_mut(target)?.insert(name.to_string(), payload);
        Ok(())
    }

    fn has_extension(&self, target: ExtensionTarget, name: &str) -> bool {
        self.extensions_of(target).is_some_and(|map| map.contains_key(name))
    }

    fn declare_extension_used(&mut self, name: &str, required: bool) {
        if !self.extensions_used.iter().any(|n| n == name) {
            self.extensions_used.push(name.to_string());
        }
        if required && !self.extensions_required.iter().any(|n| n == name) {
            self.extensions_required.push(name.to_string());
        }
    }

    fn export_binary_blob(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<BlobRef> {
        let blob = match self.blob_storage {
            BlobStorage::BufferView => BlobRef {
                uri: None,
                mime_type: mime_type.to_string(),
                buffer_view: Some(self.push_buffer_view(bytes)),
            },
            BlobStorage::DataUri => BlobRef {
                uri: Some(format!("data:{mime_type};base64,{}", BASE64.encode(bytes))),
                mime_type: mime_type.to_string(),
                buffer_view: None,
            },
            BlobStorage::External => {
                let uri = self.unique_external_name(name, mime_type);
                self.external_files.push((uri.clone(), bytes.to_vec()));
                BlobRef {
                    uri: Some(uri),
                    mime_type: mime_type.to_string(),
                    buffer_view: None,
                }
            }
        };
        log::debug!("Exported blob '{name}' ({mime_type}, {} bytes)", bytes.len());
        Ok(blob)
    }

    fn export_texture(&mut self, image: &Arc<Image>, map_type: TextureMapType) -> Result<TextureInfo> {
        let key = TextureKey {
            image: image.clone(),
            map_type,
        };
        if let Some(existing) = self.exported_textures.find(&key) {
            return Ok(TextureInfo {
                index: existing.index(),
                tex_coord: 0,
            });
        }

        let (mime_type, bytes) = image.to_blob()?;
        let blob = self.export_binary_blob(&image.name, &mime_type, &bytes)?;
        self.images.push(ImageRecord {
            name: (!image.name.is_empty()).then(|| image.name.clone()),
            uri: blob.uri,
            mime_type: blob.mime_type,
            buffer_view: blob.buffer_view,
        });
        self.textures.push(TextureRecord {
            source: (self.images.len() - 1) as u32,
            extensions: Map::new(),
        });

        let handle = self.exported_textures.register(key);
        debug_assert_eq!(handle.index() as usize, self.textures.len() - 1);
        Ok(TextureInfo {
            index: handle.index(),
            tex_coord: 0,
        })
    }

    fn export_mesh(&mut self, mesh: &Arc<HostMesh>) -> Result<u32> {
        if let Some(existing) = self.exported_meshes.find(mesh) {
            return Ok(existing.index());
        }
        self.meshes.push(MeshRecord {
            name: (!mesh.name.is_empty()).then(|| mesh.name.clone()),
            primitives: mesh.primitives.clone(),
        });
        Ok(self.exported_meshes.register(mesh.clone()).index())
    }
}
