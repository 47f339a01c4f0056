//! `OMI_collider`
//!
//! A node's first enabled collider goes into the root `colliders` array. A
//! shape offset from its node is written on a generated child node named
//! `<node>-collider`, translated by the offset.

use glam::Vec3;
use serde::Serialize;

use crate::document::defaults::{is_zero, is_zero_vec3};
use crate::document::{ExtensionTarget, NodeRecord};
use crate::errors::{ExportError, Result};
use crate::export::context::ExportContext;
use crate::export::handle::Handle;
use crate::export::registries::ColliderEntry;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, ColliderShape, NodeKey};

pub const EXTENSION_NAME: &str = "OMI_collider";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColliderType {
    Box,
    Sphere,
    Capsule,
    Mesh,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColliderRecord {
    #[serde(rename = "type")]
    pub kind: ColliderType,
    /// Half extents.
    #[serde(skip_serializing_if = "is_zero_vec3")]
    pub extents: Vec3,
    #[serde(skip_serializing_if = "is_zero")]
    pub radius: f32,
    #[serde(skip_serializing_if = "is_zero")]
    pub height: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<u32>,
}

impl ColliderRecord {
    fn new(kind: ColliderType) -> Self {
        Self {
            kind,
            extents: Vec3::ZERO,
            radius: 0.0,
            height: 0.0,
            mesh: None,
        }
    }
}

#[derive(Serialize)]
struct NodeColliderRef {
    collider: Handle<ColliderEntry>,
}

#[derive(Serialize)]
struct RootColliders<'a> {
    colliders: Vec<&'a ColliderRecord>,
}

#[derive(Debug, Default)]
pub struct ColliderExtension;

impl ExportExtension for ColliderExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;
        let Some(collider) = host.first(Attachment::as_collider) else {
            return Ok(());
        };
        if !collider.enabled {
            return Ok(());
        }

        let record = match &collider.shape {
            ColliderShape::Box { size } => ColliderRecord {
                extents: *size / 2.0,
                ..ColliderRecord::new(ColliderType::Box)
            },
            ColliderShape::Sphere { radius } => ColliderRecord {
                radius: *radius,
                ..ColliderRecord::new(ColliderType::Sphere)
            },
            ColliderShape::Capsule { radius, height } => ColliderRecord {
                radius: *radius,
                height: *height,
                ..ColliderRecord::new(ColliderType::Capsule)
            },
            ColliderShape::Mesh { mesh } => ColliderRecord {
                mesh: Some(ctx.document.export_mesh(mesh)?),
                ..ColliderRecord::new(ColliderType::Mesh)
            },
            ColliderShape::Other(kind) => {
                return Err(ExportError::unsupported(&host.name, format!("collider type `{kind}`")));
            }
        };

        let handle = ctx.registries.colliders.register(ColliderEntry {
            source: collider.clone(),
            record,
        });

        let target = if collider.center == Vec3::ZERO {
            node_id
        } else {
            let child = NodeRecord::named(format!("{}-collider", host.name)).with_translation(collider.center);
            ctx.document.add_child_node(node_id, child)?
        };

        ctx.attach(ExtensionTarget::Node(target), EXTENSION_NAME, &NodeColliderRef { collider: handle })
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        if ctx.registries.colliders.is_empty() {
            return Ok(());
        }

        let payload = serde_json::to_value(RootColliders {
            colliders: ctx.registries.colliders.iter().map(|entry| &entry.record).collect(),
        })?;
        ctx.document.add_extension(ExtensionTarget::Root, EXTENSION_NAME, payload)?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_omits_unused_fields() {
        let record = ColliderRecord {
            radius: 0.5,
            ..ColliderRecord::new(ColliderType::Sphere)
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({ "type": "sphere", "radius": 0.5 })
        );
    }
}
