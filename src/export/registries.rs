//! Per-session registries.
//!
//! One [`ResourceRegistry`] per resource kind. Extensions register during the
//! per-node phase and read them back in finalize; the session clears all of
//! them once finalize has run.

use std::sync::Arc;

use crate::export::handle::{Resource, ResourceKind};
use crate::export::registry::{ByValue, EqualityPolicy, Identity, ResourceRegistry};
use crate::extensions::khr_audio::AudioEmitterRecord;
use crate::extensions::mx_reflection_probes::ReflectionProbeRecord;
use crate::extensions::omi_collider::ColliderRecord;
use crate::scene::{
    AudioClip, AudioSourceConfig, Collider, ComponentType, GlobalAudioEmitter, PositionalAudioEmitter,
    ReflectionProbe,
};

// ============================================================================
// Entries
// ============================================================================

impl Resource for Arc<AudioClip> {
    const KIND: ResourceKind = ResourceKind::AudioData;
}

impl Resource for Arc<AudioSourceConfig> {
    const KIND: ResourceKind = ResourceKind::AudioSource;
}

/// The host behaviour an emitter entry was built from.
#[derive(Debug, Clone)]
pub enum EmitterSource {
    Positional(Arc<PositionalAudioEmitter>),
    Global(Arc<GlobalAudioEmitter>),
}

#[derive(Debug, Clone)]
pub struct AudioEmitterEntry {
    pub source: EmitterSource,
    pub record: AudioEmitterRecord,
}

impl Resource for AudioEmitterEntry {
    const KIND: ResourceKind = ResourceKind::AudioEmitter;
}

impl EqualityPolicy<AudioEmitterEntry> for Identity {
    fn same(a: &AudioEmitterEntry, b: &AudioEmitterEntry) -> bool {
        match (&a.source, &b.source) {
            (EmitterSource::Positional(a), EmitterSource::Positional(b)) => Arc::ptr_eq(a, b),
            (EmitterSource::Global(a), EmitterSource::Global(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColliderEntry {
    pub source: Arc<Collider>,
    pub record: ColliderRecord,
}

impl Resource for ColliderEntry {
    const KIND: ResourceKind = ResourceKind::Collider;
}

impl EqualityPolicy<ColliderEntry> for Identity {
    fn same(a: &ColliderEntry, b: &ColliderEntry) -> bool {
        Arc::ptr_eq(&a.source, &b.source)
    }
}

/// A probe record. `source` is `None` for the scene's default reflection,
/// which never merges with anything.
#[derive(Debug, Clone)]
pub struct ReflectionProbeEntry {
    pub source: Option<Arc<ReflectionProbe>>,
    pub record: ReflectionProbeRecord,
}

impl Resource for ReflectionProbeEntry {
    const KIND: ResourceKind = ResourceKind::ReflectionProbe;
}

impl EqualityPolicy<ReflectionProbeEntry> for Identity {
    fn same(a: &ReflectionProbeEntry, b: &ReflectionProbeEntry) -> bool {
        match (&a.source, &b.source) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ============================================================================
// Registries
// ============================================================================

#[derive(Debug, Default)]
pub struct Registries {
    pub audio_data: ResourceRegistry<Arc<AudioClip>>,
    pub audio_sources: ResourceRegistry<Arc<AudioSourceConfig>>,
    pub audio_emitters: ResourceRegistry<AudioEmitterEntry>,
    pub colliders: ResourceRegistry<ColliderEntry>,
    pub reflection_probes: ResourceRegistry<ReflectionProbeEntry>,
    pub component_types: ResourceRegistry<ComponentType, ByValue>,
}

impl Registries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.audio_data.is_empty()
            && self.audio_sources.is_empty()
            && self.audio_emitters.is_empty()
            && self.colliders.is_empty()
            && self.reflection_probes.is_empty()
            && self.component_types.is_empty()
    }

    pub fn clear(&mut self) {
        self.audio_data.clear();
        self.audio_sources.clear();
        self.audio_emitters.clear();
        self.colliders.clear();
        self.reflection_probes.clear();
        self.component_types.clear();
    }

    /// Entry count per kind, for logging.
    #[must_use]
    pub fn counts(&self) -> [(ResourceKind, usize); 6] {
        [
            (ResourceKind::AudioData, self.audio_data.count()),
            (ResourceKind::AudioSource, self.audio_sources.count()),
            (ResourceKind::AudioEmitter, self.audio_emitters.count()),
            (ResourceKind::Collider, self.colliders.count()),
            (ResourceKind::ReflectionProbe, self.reflection_probes.count()),
            (ResourceKind::ComponentDefinition, self.component_types.count()),
        ]
    }
}
