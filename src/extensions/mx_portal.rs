//! `MX_portal`: a node that opens another world at `uri`.

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::extensions::omi_link::UriRecord;
use crate::scene::{Attachment, NodeKey};

pub const EXTENSION_NAME: &str = "MX_portal";

#[derive(Debug, Default)]
pub struct PortalExtension;

impl ExportExtension for PortalExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let Some(uri) = ctx.host_node(node)?.first(Attachment::as_portal_uri) else {
            return Ok(());
        };
        ctx.attach(ExtensionTarget::Node(node_id), EXTENSION_NAME, &UriRecord { uri })?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
