//! `KHR_audio`
//!
//! Positional emitters are referenced from their node, global emitters from
//! the scene. Emitters, sources and audio data live in three root arrays:
//!
//! ```json
//! "extensions": { "KHR_audio": {
//!     "audio":    [{ "mimeType": "audio/mpeg", "bufferView": 0 }],
//!     "sources":  [{ "autoPlay": true, "loop": true, "audio": 0 }],
//!     "emitters": [{ "type": "positional", "sources": [0], "positional": {} }]
//! }}
//! ```

use std::f32::consts::TAU;
use std::sync::Arc;

use serde::Serialize;

use crate::document::ExtensionTarget;
use crate::document::defaults::{is_false, is_one, is_zero};
use crate::errors::{ExportError, Result};
use crate::export::context::ExportContext;
use crate::export::handle::Handle;
use crate::export::registries::{AudioEmitterEntry, EmitterSource};
use crate::extensions::ExportExtension;
use crate::scene::{
    Attachment, AudioClip, AudioSourceConfig, DistanceModel, GlobalAudioEmitter, NodeKey, PositionalAudioEmitter,
};

pub const EXTENSION_NAME: &str = "KHR_audio";

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmitterType {
    Positional,
    Global,
}

fn is_full_turn(value: &f32) -> bool {
    (value - TAU).abs() <= 1e-5
}

fn is_inverse(value: &DistanceModel) -> bool {
    *value == DistanceModel::Inverse
}

fn is_default_max_distance(value: &f32) -> bool {
    (value - 10000.0).abs() <= f32::EPSILON
}

/// Positional parameters. Cone angles in radians; defaults are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionalParams {
    #[serde(skip_serializing_if = "is_full_turn")]
    pub cone_inner_angle: f32,
    #[serde(skip_serializing_if = "is_full_turn")]
    pub cone_outer_angle: f32,
    #[serde(skip_serializing_if = "is_zero")]
    pub cone_outer_gain: f32,
    #[serde(skip_serializing_if = "is_inverse")]
    pub distance_model: DistanceModel,
    #[serde(skip_serializing_if = "is_default_max_distance")]
    pub max_distance: f32,
    #[serde(skip_serializing_if = "is_one")]
    pub ref_distance: f32,
    #[serde(skip_serializing_if = "is_one")]
    pub rolloff_factor: f32,
}

impl From<&PositionalAudioEmitter> for PositionalParams {
    fn from(emitter: &PositionalAudioEmitter) -> Self {
        Self {
            cone_inner_angle: emitter.cone_inner_angle.to_radians(),
            cone_outer_angle: emitter.cone_outer_angle.to_radians(),
            cone_outer_gain: emitter.cone_outer_gain,
            distance_model: emitter.distance_model,
            max_distance: emitter.max_distance,
            ref_distance: emitter.ref_distance,
            rolloff_factor: emitter.rolloff_factor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioEmitterRecord {
    #[serde(rename = "type")]
    pub kind: EmitterType,
    #[serde(skip_serializing_if = "is_one")]
    pub gain: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Handle<Arc<AudioSourceConfig>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positional: Option<PositionalParams>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioSourceRecord {
    #[serde(skip_serializing_if = "is_false")]
    auto_play: bool,
    #[serde(skip_serializing_if = "is_one")]
    gain: f32,
    #[serde(skip_serializing_if = "is_false")]
    #[serde(rename = "loop")]
    looping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio: Option<Handle<Arc<AudioClip>>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioDataRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    buffer_view: Option<u32>,
}

#[derive(Serialize)]
struct NodeEmitterRef {
    emitter: Handle<AudioEmitterEntry>,
}

#[derive(Serialize)]
struct SceneEmittersRef {
    emitters: Vec<Handle<AudioEmitterEntry>>,
}

#[derive(Serialize)]
struct RootAudio {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    audio: Vec<AudioDataRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sources: Vec<AudioSourceRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    emitters: Vec<AudioEmitterRecord>,
}

// ============================================================================
// Extension
// ============================================================================

#[derive(Debug, Default)]
pub struct AudioExtension;

impl AudioExtension {
    /// Registers each source and its clip; returns the source handles.
    fn register_sources(
        ctx: &mut ExportContext<'_>,
        sources: &[Arc<AudioSourceConfig>],
    ) -> Vec<Handle<Arc<AudioSourceConfig>>> {
        sources
            .iter()
            .map(|source| {
                if let Some(clip) = &source.clip {
                    ctx.registries.audio_data.register(clip.clone());
                }
                ctx.registries.audio_sources.register(source.clone())
            })
            .collect()
    }

    fn export_global_emitters(ctx: &mut ExportContext<'_>) -> Result<()> {
        let globals: Vec<Arc<GlobalAudioEmitter>> = ctx
            .host
            .find_attachments(Attachment::as_global_audio_emitter)
            .into_iter()
            .map(|(_, emitter)| emitter.clone())
            .collect();

        if globals.is_empty() {
            return Ok(());
        }

        let mut emitters = Vec::with_capacity(globals.len());
        for emitter in globals {
            let sources = Self::register_sources(ctx, &emitter.sources);
            let record = AudioEmitterRecord {
                kind: EmitterType::Global,
                gain: emitter.gain,
                sources,
                positional: None,
            };
            let handle = ctx.registries.audio_emitters.register(AudioEmitterEntry {
                source: EmitterSource::Global(emitter),
                record,
            });
            // An emitter shared by several nodes is listed once.
            if !emitters.contains(&handle) {
                emitters.push(handle);
            }
        }

        let scene = ctx.active_scene()?;
        ctx.attach(ExtensionTarget::Scene(scene), EXTENSION_NAME, &SceneEmittersRef { emitters })?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }

    fn export_audio_data(ctx: &mut ExportContext<'_>) -> Result<Vec<AudioDataRecord>> {
        let clips: Vec<Arc<AudioClip>> = ctx.registries.audio_data.items().to_vec();
        let mut records = Vec::with_capacity(clips.len());

        for clip in clips {
            let mime_type = clip
                .mime_type()
                .filter(|mime| ctx.settings.is_audio_mime_allowed(mime))
                .ok_or_else(|| {
                    let ext = clip
                        .path
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ExportError::unsupported(
                        &clip.name,
                        format!(
                            "audio file type \".{ext}\", supported: {}",
                            ctx.settings.allowed_audio_mime_types.join(", ")
                        ),
                    )
                })?;

            let bytes = clip.bytes()?;
            let blob = ctx.document.export_binary_blob(&clip.file_name(), mime_type, &bytes)?;
            records.push(match blob.uri {
                Some(uri) => AudioDataRecord {
                    uri: Some(uri),
                    mime_type: None,
                    buffer_view: None,
                },
                None => AudioDataRecord {
                    uri: None,
                    mime_type: Some(blob.mime_type),
                    buffer_view: blob.buffer_view,
                },
            });
        }

        Ok(records)
    }
}

impl ExportExtension for AudioExtension {
    fn name(&self) -> &'static str {
        EXTENSION_NAME
    }

    fn on_node(&mut self, ctx: &mut ExportContext<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        let host = ctx.host_node(node)?;
        let Some(emitter) = host.first(Attachment::as_audio_emitter) else {
            return Ok(());
        };

        let sources = Self::register_sources(ctx, &emitter.sources);
        let record = AudioEmitterRecord {
            kind: EmitterType::Positional,
            gain: emitter.gain,
            sources,
            positional: Some(PositionalParams::from(emitter.as_ref())),
        };
        let handle = ctx.registries.audio_emitters.register(AudioEmitterEntry {
            source: EmitterSource::Positional(emitter.clone()),
            record,
        });

        ctx.attach(ExtensionTarget::Node(node_id), EXTENSION_NAME, &NodeEmitterRef { emitter: handle })?;
        ctx.document.declare_extension_used(EXTENSION_NAME, false);
        Ok(())
    }

    fn on_finalize(&mut self, ctx: &mut ExportContext<'_>) -> Result<()> {
        Self::export_global_emitters(ctx)?;

        if ctx.registries.audio_emitters.is_empty() {
            return Ok(());
        }

        let audio = Self::export_audio_data(ctx)?;

        let sources = ctx
            .registries
            .audio_sources
            .iter()
            .map(|source| AudioSourceRecord {
                auto_play: source.auto_play,
                gain: source.gain,
                looping: source.looping,
                audio: source
                    .clip
                    .as_ref()
                    .and_then(|clip| ctx.registries.audio_data.find(clip)),
            })
            .collect();

        let emitters = ctx
            .registries
            .audio_emitters
            .iter()
            .map(|entry| entry.record.clone())
            .collect();

        ctx.attach(
            ExtensionTarget::Root,
            EXTENSION_NAME,
            &RootAudio {
                audio,
                sources,
                emitters,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_positional_params_are_empty() {
        let params = PositionalParams::from(&PositionalAudioEmitter::default());
        assert_eq!(serde_json::to_value(&params).unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_outer_angle_checked_independently() {
        let emitter = PositionalAudioEmitter {
            cone_outer_angle: 90.0,
            ..Default::default()
        };
        let json = serde_json::to_value(PositionalParams::from(&emitter)).unwrap();
        assert!(json.get("coneInnerAngle").is_none());
        let outer = json["coneOuterAngle"].as_f64().unwrap();
        assert!((outer - std::f64::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_distance_model_written_lowercase() {
        let emitter = PositionalAudioEmitter {
            distance_model: DistanceModel::Linear,
            max_distance: 50.0,
            ..Default::default()
        };
        let json = serde_json::to_value(PositionalParams::from(&emitter)).unwrap();
        assert_eq!(json["distanceModel"], "linear");
        assert_eq!(json["maxDistance"], 50.0);
    }
}
