//! `OMI_link`: a node that navigates to `uri` when activated.

use serde::Serialize;

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, NodeKey};

pub const EXTENSION_NAME: &str = "OMI_link";

#[derive(Serialize)]
pub(crate) struct UriRecord<'a> {
    pub uri: &'a str,
}

#[derive(Debug, Default)]
pub struct LinkExtension;

impl ExportExtension for LinkExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let Some(uri) = ctx.host_node(node)?.first(Attachment::as_link_uri) else {
            return Ok(());
        };
        ctx.attach(ExtensionTarget::Node(node_id), EXTENSION_NAME, &UriRecord { uri })?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
