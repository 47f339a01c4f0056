//! Export Extensions
//!
//! Each glTF extension is a plugin with up to four hooks:
//!
//! - `before_export`: check global preconditions; an error aborts the export
//!   before anything is written
//! - `on_node`: export the node's attachments, register shared resources
//! - `on_finalize`: write the root-level arrays from the registries
//! - `reset`: drop per-export state
//!
//! # Implementing an extension
//!
//! ```rust,ignore
//! use thirdroom_export::extensions::ExportExtension;
//!
//! struct MyExtension;
//!
//! impl ExportExtension for MyExtension {
//!     fn name(&self) -> &'static str {
//!         "MY_extension"
//!     }
//!
//!     fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
//!         // attach a payload with ctx.attach(...)
//!         Ok(())
//!     }
//! }
//! ```

pub mod khr_audio;
pub mod mx_background;
pub mod mx_components;
pub mod mx_lightmap;
pub mod mx_lights_shadows;
pub mod mx_portal;
pub mod mx_postprocessing;
pub mod mx_reflection_probes;
pub mod mx_scene_ar;
pub mod mx_static;
pub mod omi_collider;
pub mod omi_link;
pub mod omi_physics_body;
pub mod omi_spawn_point;

use crate::errors::Result;
use crate::export::context::ExportContext;
use crate::scene::NodeKey;
use crate::settings::ExportSettings;

/// An export-time glTF extension.
pub trait ExportExtension {
    /// Extension name as it appears in `extensionsUsed`.
    fn name(&self) -> &'static str;

    fn before_export(&mut self, _ctx: &ExportContext<'_>) -> Result<()> {
        Ok(())
    }

    fn on_node(&mut self, _ctx: &mut ExportContext<'_>, _node: NodeKey, _node_id: u32) -> Result<()> {
        Ok(())
    }

    fn on_finalize(&mut self, _ctx: &mut ExportContext<'_>) -> Result<()> {
        Ok(())
    }

    fn reset(&mut self) {}
}

/// Built-in extensions in hook order, minus those disabled in `settings`.
#[must_use]
pub fn default_extensions(settings: &ExportSettings) -> Vec<Box<dyn ExportExtension>> {
    let all: Vec<Box<dyn ExportExtension>> = vec![
        Box::new(mx_lightmap::LightmapExtension),
        Box::new(mx_components::ComponentsExtension),
        Box::new(khr_audio::AudioExtension),
        Box::new(omi_collider::ColliderExtension),
        Box::new(omi_physics_body::PhysicsBodyExtension),
        Box::new(mx_reflection_probes::ReflectionProbesExtension),
        Box::new(mx_lights_shadows::LightsShadowsExtension),
        Box::new(mx_static::StaticExtension),
        Box::new(omi_spawn_point::SpawnPointExtension),
        Box::new(omi_link::LinkExtension),
        Box::new(mx_portal::PortalExtension),
        Box::new(mx_scene_ar::SceneArExtension),
        Box::new(mx_background::BackgroundExtension),
        Box::new(mx_postprocessing::PostprocessingExtension),
    ];

    all.into_iter()
        .filter(|extension| {
            let enabled = settings.is_extension_enabled(extension.name());
            if !enabled {
                log::info!("Extension {} disabled by settings", extension.name());
            }
            enabled
        })
        .collect()
}
