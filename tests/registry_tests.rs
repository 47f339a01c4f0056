//! Resource Registry Tests
//!
//! Tests for:
//! - Handle indices follow insertion order
//! - Identity vs. value equality policies
//! - Handles resolve against the finalized array
//! - Registries reset between sessions

use std::sync::Arc;

use thirdroom_export::export::{ByValue, Registries, ResourceKind, ResourceRegistry};
use thirdroom_export::scene::{AudioClip, AudioSourceConfig, ComponentDescriptor, ComponentType};
use thirdroom_export::thirdroom_component;

thirdroom_component! {
    #[derive(Debug, Clone, Default)]
    pub struct Spinner {
        pub speed: f32,
    }
}

thirdroom_component! {
    #[derive(Debug, Clone, Default)]
    pub struct Flag {
        pub raised: bool,
    }
}

fn clip(name: &str) -> Arc<AudioClip> {
    Arc::new(AudioClip::from_bytes(format!("{name}.mp3"), vec![0; 4]))
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn handles_follow_insertion_order() {
    let mut registry: ResourceRegistry<Arc<AudioClip>> = ResourceRegistry::new();
    let clips: Vec<_> = (0..4).map(|i| clip(&format!("c{i}"))).collect();

    for (i, c) in clips.iter().enumerate() {
        assert_eq!(registry.register(c.clone()).index() as usize, i);
    }
    assert_eq!(registry.count(), 4);
}

#[test]
fn register_is_idempotent() {
    let mut registry: ResourceRegistry<Arc<AudioClip>> = ResourceRegistry::new();
    let a = clip("a");

    let first = registry.register(a.clone());
    let second = registry.register(a.clone());

    assert_eq!(first, second);
    assert_eq!(registry.count(), 1);
    assert_eq!(registry.find(&a), Some(first));
}

#[test]
fn handle_kind_matches_registry() {
    let mut registry: ResourceRegistry<Arc<AudioSourceConfig>> = ResourceRegistry::new();
    let handle = registry.register(Arc::new(AudioSourceConfig::default()));
    assert_eq!(handle.kind(), ResourceKind::AudioSource);
}

// ============================================================================
// Equality Policies
// ============================================================================

#[test]
fn identity_keeps_equal_values_apart() {
    let mut registry: ResourceRegistry<Arc<AudioClip>> = ResourceRegistry::new();
    let a = clip("same");
    let b = clip("same");

    let ha = registry.register(a);
    let hb = registry.register(b);

    assert_ne!(ha, hb);
    assert_eq!(registry.count(), 2);
}

#[test]
fn by_value_merges_component_types() {
    let mut registry: ResourceRegistry<ComponentType, ByValue> = ResourceRegistry::new();

    let spinner = registry.register(ComponentType::of::<Spinner>());
    let flag = registry.register(ComponentType::of::<Flag>());
    let spinner_again = registry.register(ComponentType::of::<Spinner>());

    assert_eq!(spinner, spinner_again);
    assert_eq!(flag.index(), 1);
    assert_eq!(registry.items()[0].name(), Spinner::NAME);
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn handle_resolves_against_finalized_array() {
    let mut registry: ResourceRegistry<Arc<AudioClip>> = ResourceRegistry::new();
    let a = clip("a");
    let b = clip("b");
    registry.register(a);
    let hb = registry.register(b);

    let finalized: Vec<String> = registry.iter().map(|c| c.file_name()).collect();
    assert_eq!(hb.resolve(&finalized).map(String::as_str), Some("b.mp3"));
    assert_eq!(registry.get(hb).map(|c| c.name.as_str()), Some("b"));
}

#[test]
fn handle_serializes_as_bare_index() {
    let mut registry: ResourceRegistry<Arc<AudioClip>> = ResourceRegistry::new();
    registry.register(clip("a"));
    let handle = registry.register(clip("b"));

    assert_eq!(serde_json::to_string(&handle).unwrap(), "1");
}

// ============================================================================
// Registries
// ============================================================================

#[test]
fn registries_clear_resets_indices() {
    let mut registries = Registries::default();
    assert!(registries.is_empty());

    registries.audio_data.register(clip("a"));
    registries.component_types.register(ComponentType::of::<Flag>());
    assert!(!registries.is_empty());

    registries.clear();
    assert!(registries.is_empty());
    assert_eq!(registries.audio_data.register(clip("b")).index(), 0);
}
