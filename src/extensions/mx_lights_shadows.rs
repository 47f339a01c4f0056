//! `MX_lights_shadows`: per-node shadow casting / receiving flags.

use serde::Serialize;

use crate::document::ExtensionTarget;
use crate::document::defaults::is_false;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, LightmapBakeType, NodeKey};

pub const EXTENSION_NAME: &str = "MX_lights_shadows";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadowFlags {
    #[serde(skip_serializing_if = "is_false")]
    pub cast_shadow: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub receive_shadow: bool,
}

#[derive(Debug, Default)]
pub struct LightsShadowsExtension;

impl ExportExtension for LightsShadowsExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;

        // Fully baked lights contribute no realtime shadows.
        let mut cast_shadow = host
            .first(Attachment::as_light)
            .is_some_and(|light| light.shadows && light.bake_type != LightmapBakeType::Baked);
        let mut receive_shadow = false;

        if let Some(renderer) = host.first(Attachment::as_mesh_renderer) {
            receive_shadow = renderer.receive_shadows;
            cast_shadow |= renderer.cast_shadows;
        }

        if !cast_shadow && !receive_shadow {
            return Ok(());
        }

        ctx.attach(
            ExtensionTarget::Node(node_id),
            EXTENSION_NAME,
            &ShadowFlags {
                cast_shadow,
                receive_shadow,
            },
        )?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
