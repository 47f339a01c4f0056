//! `MX_components`
//!
//! User components are written inline on their node, keyed by type name. The
//! root carries one schema definition per component type seen anywhere in
//! the scene, in first-seen order.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::ExtensionTarget;
use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::export::schema::{SchemaEncoder, SchemaRecord};
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, NodeKey};

pub const EXTENSION_NAME: &str = "MX_components";

#[derive(Serialize)]
struct ComponentDefinitions {
    definitions: Vec<SchemaRecord>,
}

#[derive(Debug, Default)]
pub struct ComponentsExtension;

impl ExportExtension for ComponentsExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;
        let mut components = Map::new();

        for component in host.all(Attachment::as_component) {
            let ty = component.component_type();
            if components.contains_key(ty.name()) {
                log::warn!(
                    "Node '{}' has more than one `{}` component, only the first is exported",
                    host.name,
                    ty.name()
                );
                continue;
            }

            ctx.registries.component_types.register(ty);

            let (record, errors) = SchemaEncoder::encode_instance(&**component, &mut *ctx);
            for err in errors {
                log::warn!("Node '{}': {err}", host.name);
            }
            components.insert(ty.name().to_string(), serde_json::to_value(&record)?);
        }

        for types in host.all(Attachment::as_additional_components) {
            for ty in types {
                ctx.registries.component_types.register(*ty);
            }
        }

        if components.is_empty() {
            return Ok(());
        }

        ctx.document
            .add_extension(ExtensionTarget::Node(node_id), EXTENSION_NAME, Value::Object(components))
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        if ctx.registries.component_types.is_empty() {
            return Ok(());
        }

        let types = ctx.registries.component_types.items().to_vec();
        let definitions = types
            .iter()
            .map(|ty| SchemaEncoder::schema_for(ty, &mut *ctx))
            .collect::<Result<Vec<_>>>()?;

        ctx.attach(ExtensionTarget::Root, EXTENSION_NAME, &ComponentDefinitions { definitions })?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
