//! `MX_static`: empty marker on nodes that never move.

use serde_json::json;

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::NodeKey;

pub const EXTENSION_NAME: &str = "MX_static";

#[derive(Debug, Default)]
pub struct StaticExtension;

impl ExportExtension for StaticExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        if !ctx.host_node(node)?.is_static {
            return Ok(());
        }
        ctx.document
            .add_extension(ExtensionTarget::Node(node_id), EXTENSION_NAME, json!({}))?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
