//! `MX_lightmap` / `MX_texture_rgbm`
//!
//! Baked lightmaps are exported as linear RGBM textures. Each lightmapped
//! node gets its UV scale and offset in the lightmap, with the V axis
//! flipped:
//!
//! ```text
//! scale  = (so.x, so.y)
//! offset = (so.z, 1 - so.y - so.w)
//! ```

use serde::Serialize;

use crate::document::defaults::{is_one, is_one_pair, is_zero_pair};
use crate::document::{ExtensionTarget, TextureInfo, TextureMapType};
use crate::errors::{ExportError, Result};
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, LightmapsMode, MixedLightingMode, NodeKey};

pub const EXTENSION_NAME: &str = "MX_lightmap";
pub const RGBM_EXTENSION_NAME: &str = "MX_texture_rgbm";

/// Lightmap indices at or above this value are host sentinels, not lightmaps.
pub const MAX_LIGHTMAP_INDEX: i32 = 65533;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightmapRecord {
    #[serde(skip_serializing_if = "is_one_pair")]
    pub scale: [f32; 2],
    #[serde(skip_serializing_if = "is_zero_pair")]
    pub offset: [f32; 2],
    pub light_map_texture: TextureInfo,
    #[serde(skip_serializing_if = "is_one")]
    pub intensity: f32,
}

#[derive(Serialize)]
struct TextureRgbm {}

#[derive(Debug, Default)]
pub struct LightmapExtension;

impl ExportExtension for LightmapExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn before_export(&mut self, ctx: &ExportContext<'_>) -> Result<()> {
        let render = &ctx.host.render;
        if !ctx.settings.require_lightmap_preconditions || render.lightmaps.is_empty() {
            return Ok(());
        }
        if render.lightmaps_mode != LightmapsMode::NonDirectional {
            return Err(ExportError::Precondition(
                "lightmap directional mode must be Non Directional".to_string(),
            ));
        }
        if render.mixed_lighting_mode != MixedLightingMode::IndirectOnly {
            return Err(ExportError::Precondition(
                "mixed lighting mode must be Baked Indirect".to_string(),
            ));
        }
        Ok(())
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;
        let Some(renderer) = host.first(Attachment::as_mesh_renderer) else {
            return Ok(());
        };
        if !(0..MAX_LIGHTMAP_INDEX).contains(&renderer.lightmap_index) {
            return Ok(());
        }

        let Some(lightmap) = ctx.host.render.lightmaps.get(renderer.lightmap_index as usize) else {
            log::warn!(
                "Node '{}' references lightmap {} but the scene has {}",
                host.name,
                renderer.lightmap_index,
                ctx.host.render.lightmaps.len()
            );
            return Ok(());
        };
        let Some(color) = &lightmap.color else {
            return Ok(());
        };

        let texture = ctx.document.export_texture(color, TextureMapType::Linear)?;
        let texture_target = ExtensionTarget::Texture(texture.index);
        if !ctx.document.has_extension(texture_target, RGBM_EXTENSION_NAME) {
            ctx.attach(texture_target, RGBM_EXTENSION_NAME, &TextureRgbm {})?;
            ctx.document.declare_extension_used(RGBM_EXTENSION_NAME, false);
        }

        let so = renderer.lightmap_scale_offset;
        let record = LightmapRecord {
            scale: [so.x, so.y],
            offset: [so.z, 1.0 - so.y - so.w],
            light_map_texture: texture,
            intensity: 1.0,
        };

        ctx.attach(ExtensionTarget::Node(node_id), EXTENSION_NAME, &record)?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
