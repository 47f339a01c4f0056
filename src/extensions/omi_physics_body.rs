//! `OMI_physics_body`
//!
//! Only nodes with a collider get a body, whether or not the collider is
//! enabled. Without a rigidbody on the node or its parent the body is static;
//! a rigidbody on the parent alone means the collider is part of the parent's
//! compound body and nothing is written.

use glam::Vec3;
use serde::Serialize;

use crate::document::ExtensionTarget;
use crate::document::defaults::is_zero_vec3;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, NodeKey};

pub const EXTENSION_NAME: &str = "OMI_physics_body";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Static,
    Kinematic,
    Rigid,
}

fn is_unit_mass(mass: &Option<f32>) -> bool {
    mass.is_none_or(|m| (m - 1.0).abs() <= f32::EPSILON)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicsBodyRecord {
    #[serde(rename = "type")]
    pub kind: BodyType,
    #[serde(skip_serializing_if = "is_unit_mass")]
    pub mass: Option<f32>,
    #[serde(skip_serializing_if = "is_zero_vec3")]
    pub linear_velocity: Vec3,
    #[serde(skip_serializing_if = "is_zero_vec3")]
    pub angular_velocity: Vec3,
}

#[derive(Debug, Default)]
pub struct PhysicsBodyExtension;

impl ExportExtension for PhysicsBodyExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;
        if host.first(Attachment::as_collider).is_none() {
            return Ok(());
        }

        let parent_body = host
            .parent()
            .and_then(|parent| ctx.host.get_node(parent))
            .and_then(|parent| parent.first(Attachment::as_rigidbody));

        let record = match (host.first(Attachment::as_rigidbody), parent_body) {
            (Some(body), _) => PhysicsBodyRecord {
                kind: if body.is_kinematic {
                    BodyType::Kinematic
                } else {
                    BodyType::Rigid
                },
                mass: Some(body.mass),
                linear_velocity: body.velocity,
                angular_velocity: body.angular_velocity,
            },
            (None, None) => PhysicsBodyRecord {
                kind: BodyType::Static,
                mass: None,
                linear_velocity: Vec3::ZERO,
                angular_velocity: Vec3::ZERO,
            },
            (None, Some(_)) => return Ok(()),
        };

        ctx.attach(ExtensionTarget::Node(node_id), EXTENSION_NAME, &record)?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
