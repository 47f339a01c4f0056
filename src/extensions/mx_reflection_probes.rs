//! `MX_reflection_probes`
//!
//! Enabled probes on nodes, plus the scene-wide default reflection appended
//! last and referenced from the scene. Probe textures are exported as
//! cubemaps.

use glam::Vec3;
use serde::Serialize;

use crate::document::defaults::is_zero_vec3;
use crate::document::{ExtensionTarget, TextureInfo, TextureMapType};
use crate::errors::{ExportError, Result};
use crate::export::context::ExportContext;
use crate::export::handle::Handle;
use crate::export::registries::ReflectionProbeEntry;
use crate::extensions::ExportExtension;
use crate::scene::{Attachment, NodeKey};

pub const EXTENSION_NAME: &str = "MX_reflection_probes";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionProbeRecord {
    #[serde(skip_serializing_if = "is_zero_vec3")]
    pub size: Vec3,
    pub reflection_probe_texture: TextureInfo,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProbeRef {
    reflection_probe: Handle<ReflectionProbeEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootProbes<'a> {
    reflection_probes: Vec<&'a ReflectionProbeRecord>,
}

#[derive(Debug, Default)]
pub struct ReflectionProbesExtension;

impl ExportExtension for ReflectionProbesExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;
        let Some(probe) = host.first(Attachment::as_reflection_probe) else {
            return Ok(());
        };
        if !probe.enabled {
            return Ok(());
        }

        let texture = probe
            .texture()
            .ok_or_else(|| ExportError::unsupported(&host.name, "reflection probe without a baked texture"))?;
        let texture = ctx.document.export_texture(texture, TextureMapType::CubeMap)?;

        let handle = ctx.registries.reflection_probes.register(ReflectionProbeEntry {
            source: Some(probe.clone()),
            record: ReflectionProbeRecord {
                size: probe.size,
                reflection_probe_texture: texture,
            },
        });

        ctx.attach(
            ExtensionTarget::Node(node_id),
            EXTENSION_NAME,
            &ProbeRef {
                reflection_probe: handle,
            },
        )
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        if let Some(default_reflection) = &ctx.host.render.default_reflection {
            let texture = ctx.document.export_texture(default_reflection, TextureMapType::CubeMap)?;
            let handle = ctx.registries.reflection_probes.register(ReflectionProbeEntry {
                source: None,
                record: ReflectionProbeRecord {
                    size: Vec3::ZERO,
                    reflection_probe_texture: texture,
                },
            });

            let scene = ctx.active_scene()?;
            ctx.attach(
                ExtensionTarget::Scene(scene),
                EXTENSION_NAME,
                &ProbeRef {
                    reflection_probe: handle,
                },
            )?;
        }

        if ctx.registries.reflection_probes.is_empty() {
            return Ok(());
        }

        let payload = serde_json::to_value(RootProbes {
            reflection_probes: ctx.registries.reflection_probes.iter().map(|e| &e.record).collect(),
        })?;
        ctx.document.add_extension(ExtensionTarget::Root, EXTENSION_NAME, payload)?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }
}
