//! `MX_postprocessing`
//!
//! The last global volume decides the scene's post-processing. Nothing is
//! written when that volume is inactive.

use serde::Serialize;

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;

pub const EXTENSION_NAME: &str = "MX_postprocessing";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BloomEffect {
    pub strength: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Postprocessing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom: Option<BloomEffect>,
}

#[derive(Debug, Default)]
pub struct PostprocessingExtension;

impl ExportExtension for PostprocessingExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        let Some(volume) = ctx.host.render.volumes.iter().rev().find(|v| v.is_global) else {
            return Ok(());
        };
        if !volume.active {
            return Ok(());
        }

        let payload = Postprocessing {
            bloom: volume.bloom.map(|bloom| BloomEffect {
                strength: bloom.intensity * ctx.settings.bloom_intensity_scale,
            }),
        };

        let scene = ctx.active_scene()?;
        ctx.attach(ExtensionTarget::Scene(scene), EXTENSION_NAME, &payload)?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
