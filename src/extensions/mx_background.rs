//! `MX_background`: the skybox, captured as an equirectangular image and
//! attached to the scene.

use serde::Serialize;

use crate::document::{ExtensionTarget, TextureInfo, TextureMapType};
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::CaptureRequest;

pub const EXTENSION_NAME: &str = "MX_background";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Background {
    background_texture: TextureInfo,
}

#[derive(Debug, Default)]
pub struct BackgroundExtension;

impl ExportExtension for BackgroundExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        if !ctx.host.render.skybox {
            return Ok(());
        }
        let Some(capture) = ctx.environment else {
            log::warn!("Scene has a skybox but no environment capture is configured, background skipped");
            return Ok(());
        };

        let request = CaptureRequest {
            cubemap_size: ctx.settings.cubemap_size,
            sun: ctx.host.sun(),
        };
        let image = capture.capture_equirectangular(&request)?;
        let texture = ctx.document.export_texture(&image, TextureMapType::Srgb)?;

        let scene = ctx.active_scene()?;
        ctx.attach(
            ExtensionTarget::Scene(scene),
            EXTENSION_NAME,
            &Background {
                background_texture: texture,
            },
        )?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
