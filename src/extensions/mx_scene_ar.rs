//! `MX_scene_ar`: marks the scene as an AR scene when any node carries the
//! AR marker.

use serde_json::json;

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;

pub const EXTENSION_NAME: &str = "MX_scene_ar";

#[derive(Debug, Default)]
pub struct SceneArExtension;

impl ExportExtension for SceneArExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        let is_ar = ctx
            .host
            .nodes
            .values()
            .any(|node| node.attachments.iter().any(|a| a.is_scene_ar()));
        if !is_ar {
            return Ok(());
        }

        let scene = ctx.active_scene()?;
        ctx.document
            .add_extension(ExtensionTarget::Scene(scene), EXTENSION_NAME, json!({}))?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
