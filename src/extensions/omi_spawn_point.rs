//! `OMI_spawn_point`

use serde::Serialize;

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, NodeKey};

pub const EXTENSION_NAME: &str = "OMI_spawn_point";

/// Empty strings are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpawnPointRecord<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    pub title: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub team: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub group: &'a str,
}

#[derive(Debug, Default)]
pub struct SpawnPointExtension;

impl ExportExtension for SpawnPointExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let Some(spawn) = ctx.host_node(node)?.first(Attachment::as_spawn_point) else {
            return Ok(());
        };

        let record = SpawnPointRecord {
            title: &spawn.title,
            team: &spawn.team,
            group: &spawn.group,
        };
        ctx.attach(ExtensionTarget::Node(node_id), EXTENSION_NAME, &record)?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
