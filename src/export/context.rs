use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::document::{DocumentWriter, ExtensionTarget, NodeRecord};
use crate::errors::{ExportError, Result};
use crate::export::registries::Registries;
use crate::export::schema::NodeResolver;
use crate::scene::{EnvironmentCapture, HostNode, HostScene, NodeKey};
use crate::settings::ExportSettings;

// ============================================================================
// NodeMap
// ============================================================================

/// Host node → document node index.
///
/// A node is written to the document the first time anything asks for it,
/// so forward references (a component pointing at a node that has not been
/// visited yet) resolve to the same index the traversal later uses.
#[derive(Debug, Default)]
pub struct NodeMap {
    map: FxHashMap<NodeKey, u32>,
}

impl NodeMap {
    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<u32> {
        self.map.get(&key).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get_or_export(
        &mut self,
        host: &HostScene,
        document: &mut dyn DocumentWriter,
        key: NodeKey,
    ) -> Result<u32> {
        if let Some(index) = self.map.get(&key) {
            return Ok(*index);
        }
        let node = host
            .get_node(key)
            .ok_or_else(|| ExportError::UnknownNode(format!("{key:?}")))?;
        let index = document.add_node(NodeRecord::from_host(node));
        self.map.insert(key, index);
        Ok(index)
    }
}

// ============================================================================
// ExportTarget / ExportContext
// ============================================================================

/// What one export run writes from and into.
pub struct ExportTarget<'a> {
    pub host: &'a HostScene,
    pub document: &'a mut dyn DocumentWriter,
    pub nodes: &'a mut NodeMap,
    pub environment: Option<&'a dyn EnvironmentCapture>,
}

/// Everything an extension hook can reach.
pub struct ExportContext<'a> {
    pub host: &'a HostScene,
    pub document: &'a mut dyn DocumentWriter,
    pub nodes: &'a mut NodeMap,
    pub environment: Option<&'a dyn EnvironmentCapture>,
    pub registries: &'a mut Registries,
    pub settings: &'a ExportSettings,
}

impl<'a> ExportContext<'a> {
    pub(crate) fn new(
        target: &'a mut ExportTarget<'_>,
        registries: &'a mut Registries,
        settings: &'a ExportSettings,
    ) -> Self {
        Self {
            host: target.host,
            document: &mut *target.document,
            nodes: &mut *target.nodes,
            environment: target.environment,
            registries,
            settings,
        }
    }

    pub fn host_node(&self, key: NodeKey) -> Result<&'a HostNode> {
        self.host
            .get_node(key)
            .ok_or_else(|| ExportError::UnknownNode(format!("{key:?}")))
    }

    /// The scene being written.
    pub fn active_scene(&self) -> Result<u32> {
        self.document
            .active_scene()
            .ok_or_else(|| ExportError::InvalidTarget("no active scene".to_string()))
    }

    /// Serializes `payload` and attaches it under `name` on `target`.
    pub fn attach<P: Serialize + ?Sized>(&mut self, target: ExtensionTarget, name: &str, payload: &P) -> Result<()> {
        let value = serde_json::to_value(payload)?;
        self.document.add_extension(target, name, value)
    }
}

impl NodeResolver for ExportContext<'_> {
    fn resolve_node(&mut self, node: NodeKey) -> Result<u32> {
        self.nodes.get_or_export(self.host, &mut *self.document, node)
    }
}
