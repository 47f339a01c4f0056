//! Extension Output Tests
//!
//! Exports small host scenes with the default extension set and checks the
//! JSON each extension writes:
//! - KHR_audio: emitters, sources, audio data and their cross references
//! - OMI_collider / OMI_physics_body
//! - MX_reflection_probes, MX_lightmap, MX_texture_rgbm
//! - MX_components
//! - MX_background, MX_postprocessing, MX_scene_ar
//! - Marker extensions (MX_static, OMI_spawn_point, OMI_link, MX_portal,
//!   MX_lights_shadows)

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use glam::{Vec3, Vec4};
use serde_json::{Value, json};
use thirdroom_export::document::{Document, DocumentWriter, ExtensionTarget};
use thirdroom_export::errors::Result;
use thirdroom_export::export::SceneExporter;
use thirdroom_export::scene::{
    Attachment, AudioClip, AudioSourceConfig, BloomSettings, CaptureRequest, Collider, ColliderShape,
    ComponentType, EnvironmentCapture, GlobalAudioEmitter, HostMesh, HostNode, HostScene, Image, Light, LightType,
    LightmapBakeType, Lightmap, MeshRenderer, NodeKey, PositionalAudioEmitter, ReflectionProbe, Rigidbody,
    SpawnPoint, Volume,
};
use thirdroom_export::settings::ExportSettings;
use thirdroom_export::thirdroom_component;

fn export(scene: &HostScene) -> Document {
    let _ = env_logger::builder().is_test(true).try_init();
    SceneExporter::new(ExportSettings::default()).export(scene).unwrap()
}

fn node_ext<'a>(doc: &'a Document, node: u32, name: &str) -> Option<&'a Value> {
    doc.extension(ExtensionTarget::Node(node), name)
}

fn image(name: &str) -> Arc<Image> {
    Arc::new(Image::encoded(name, "image/png", vec![0; 8]))
}

fn used(doc: &Document, name: &str) -> bool {
    doc.extensions_used().iter().any(|n| n == name)
}

// ============================================================================
// KHR_audio
// ============================================================================

#[test]
fn audio_emitters_share_sources_and_data() {
    let clip = Arc::new(AudioClip::from_bytes("music.mp3", vec![1, 2, 3, 4]));
    let source = Arc::new(AudioSourceConfig::new(clip));

    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("a").with(Attachment::AudioEmitter(Arc::new(PositionalAudioEmitter {
        sources: vec![source.clone()],
        ..Default::default()
    }))));
    scene.add_node(HostNode::new("b").with(Attachment::AudioEmitter(Arc::new(PositionalAudioEmitter {
        sources: vec![source.clone()],
        gain: 0.5,
        ..Default::default()
    }))));
    scene.add_node(HostNode::new("ambience").with(Attachment::GlobalAudioEmitter(Arc::new(
        GlobalAudioEmitter {
            sources: vec![source],
            gain: 1.0,
        },
    ))));

    let doc = export(&scene);
    let root = doc.root_extension("KHR_audio").unwrap();

    assert_eq!(root["audio"], json!([{ "mimeType": "audio/mpeg", "bufferView": 0 }]));
    assert_eq!(root["sources"], json!([{ "autoPlay": true, "loop": true, "audio": 0 }]));
    assert_eq!(
        root["emitters"],
        json!([
            { "type": "positional", "sources": [0], "positional": {} },
            { "type": "positional", "gain": 0.5, "sources": [0], "positional": {} },
            { "type": "global", "sources": [0] },
        ])
    );

    assert_eq!(node_ext(&doc, 0, "KHR_audio"), Some(&json!({ "emitter": 0 })));
    assert_eq!(node_ext(&doc, 1, "KHR_audio"), Some(&json!({ "emitter": 1 })));
    assert_eq!(
        doc.extension(ExtensionTarget::Scene(0), "KHR_audio"),
        Some(&json!({ "emitters": [2] }))
    );
    assert!(used(&doc, "KHR_audio"));
    assert_eq!(doc.binary(), &[1, 2, 3, 4]);
}

#[test]
fn audio_handles_resolve_into_root_arrays() {
    let a = Arc::new(AudioClip::from_bytes("a.mp3", vec![1]));
    let b = Arc::new(AudioClip::from_bytes("b.mp3", vec![2]));
    let sa = Arc::new(AudioSourceConfig::new(a));
    let sb = Arc::new(AudioSourceConfig {
        gain: 0.25,
        looping: false,
        ..AudioSourceConfig::new(b)
    });

    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("x").with(Attachment::AudioEmitter(Arc::new(PositionalAudioEmitter {
        sources: vec![sb.clone(), sa],
        ..Default::default()
    }))));

    let doc = export(&scene);
    let root = doc.root_extension("KHR_audio").unwrap();
    let emitter = &root["emitters"][0];

    // sources are numbered in registration order: sb first
    let first_source = &root["sources"][emitter["sources"][0].as_u64().unwrap() as usize];
    assert_eq!(first_source["gain"], 0.25);
    assert!(first_source.get("loop").is_none());
    assert_eq!(first_source["audio"], 0);
    assert_eq!(root["audio"].as_array().unwrap().len(), 2);
}

#[test]
fn clip_shared_by_two_source_configs() {
    let clip = Arc::new(AudioClip::from_bytes("wind.mp3", vec![5, 6, 7, 8]));
    let plain = Arc::new(AudioSourceConfig::new(clip.clone()));
    let quiet = Arc::new(AudioSourceConfig {
        gain: 0.5,
        ..AudioSourceConfig::new(clip)
    });

    let mut scene = HostScene::new("s");
    for (name, source) in [("n0", &plain), ("n1", &quiet), ("n2", &plain)] {
        scene.add_node(HostNode::new(name).with(Attachment::AudioEmitter(Arc::new(PositionalAudioEmitter {
            sources: vec![source.clone()],
            ..Default::default()
        }))));
    }

    let doc = export(&scene);
    let root = doc.root_extension("KHR_audio").unwrap();

    assert_eq!(root["audio"].as_array().unwrap().len(), 1);
    assert_eq!(
        root["sources"],
        json!([
            { "autoPlay": true, "loop": true, "audio": 0 },
            { "autoPlay": true, "loop": true, "audio": 0, "gain": 0.5 },
        ])
    );
    let emitter_sources: Vec<_> = root["emitters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["sources"].clone())
        .collect();
    assert_eq!(emitter_sources, vec![json!([0]), json!([1]), json!([0])]);
    for node in 0..3 {
        assert_eq!(node_ext(&doc, node, "KHR_audio"), Some(&json!({ "emitter": node })));
    }
}

#[test]
fn shared_global_emitter_listed_once() {
    let clip = Arc::new(AudioClip::from_bytes("rain.mp3", vec![1, 2, 3, 4]));
    let ambience = Arc::new(GlobalAudioEmitter {
        sources: vec![Arc::new(AudioSourceConfig::new(clip))],
        gain: 1.0,
    });

    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("left").with(Attachment::GlobalAudioEmitter(ambience.clone())));
    scene.add_node(HostNode::new("right").with(Attachment::GlobalAudioEmitter(ambience)));

    let doc = export(&scene);

    assert_eq!(
        doc.extension(ExtensionTarget::Scene(0), "KHR_audio"),
        Some(&json!({ "emitters": [0] }))
    );
    let root = doc.root_extension("KHR_audio").unwrap();
    assert_eq!(root["emitters"], json!([{ "type": "global", "sources": [0] }]));
}

#[test]
fn no_audio_without_emitters() {
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("quiet"));
    let doc = export(&scene);
    assert!(doc.root_extension("KHR_audio").is_none());
    assert!(!used(&doc, "KHR_audio"));
}

// ============================================================================
// OMI_collider / OMI_physics_body
// ============================================================================

#[test]
fn collider_shapes_and_offset_child() {
    let shared = Arc::new(Collider::new(ColliderShape::Box {
        size: Vec3::new(2.0, 4.0, 6.0),
    }));
    let mesh = Arc::new(HostMesh {
        name: "hull".to_string(),
        primitives: vec![json!({ "attributes": { "POSITION": 0 } })],
    });

    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("box_a").with(Attachment::Collider(shared.clone())));
    scene.add_node(HostNode::new("ball").with(Attachment::Collider(Arc::new(
        Collider::new(ColliderShape::Sphere { radius: 0.5 }).with_center(Vec3::new(0.0, 1.0, 0.0)),
    ))));
    scene.add_node(HostNode::new("box_b").with(Attachment::Collider(shared)));
    scene.add_node(HostNode::new("hull").with(Attachment::Collider(Arc::new(Collider::new(
        ColliderShape::Mesh { mesh },
    )))));

    let doc = export(&scene);
    let colliders = &doc.root_extension("OMI_collider").unwrap()["colliders"];

    assert_eq!(
        *colliders,
        json!([
            { "type": "box", "extents": [1.0, 2.0, 3.0] },
            { "type": "sphere", "radius": 0.5 },
            { "type": "mesh", "mesh": 0 },
        ])
    );

    assert_eq!(node_ext(&doc, 0, "OMI_collider"), Some(&json!({ "collider": 0 })));
    assert_eq!(node_ext(&doc, 2, "OMI_collider"), Some(&json!({ "collider": 0 })));

    // ball keeps no collider itself, its generated child does
    assert!(node_ext(&doc, 1, "OMI_collider").is_none());
    let child_id = doc.node(1).unwrap().children[0];
    let child = doc.node(child_id).unwrap();
    assert_eq!(child.name.as_deref(), Some("ball-collider"));
    assert_eq!(child.translation, Some(Vec3::new(0.0, 1.0, 0.0)));
    assert_eq!(node_ext(&doc, child_id, "OMI_collider"), Some(&json!({ "collider": 1 })));

    assert_eq!(doc.mesh_count(), 1);
}

#[test]
fn disabled_collider_is_skipped() {
    let mut collider = Collider::new(ColliderShape::Sphere { radius: 1.0 });
    collider.enabled = false;

    let mut scene = HostScene::new("s");
    scene.add_node(
        HostNode::new("off")
            .with(Attachment::Collider(Arc::new(collider.clone())))
            .with(Attachment::Rigidbody(Rigidbody::default())),
    );
    scene.add_node(HostNode::new("off-static").with(Attachment::Collider(Arc::new(collider))));

    let doc = export(&scene);
    assert!(doc.root_extension("OMI_collider").is_none());
    assert!(node_ext(&doc, 0, "OMI_collider").is_none());
    // the body does not depend on the collider being enabled
    assert_eq!(node_ext(&doc, 0, "OMI_physics_body"), Some(&json!({ "type": "rigid" })));
    assert_eq!(node_ext(&doc, 1, "OMI_physics_body"), Some(&json!({ "type": "static" })));
}

#[test]
fn physics_body_types() {
    let collider = || Attachment::Collider(Arc::new(Collider::new(ColliderShape::Sphere { radius: 1.0 })));

    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("wall").with(collider()));
    let cart = scene.add_node(
        HostNode::new("cart")
            .with(collider())
            .with(Attachment::Rigidbody(Rigidbody {
                is_kinematic: true,
                ..Default::default()
            })),
    );
    scene.add_node(
        HostNode::new("ball").with(collider()).with(Attachment::Rigidbody(Rigidbody {
            mass: 2.0,
            velocity: Vec3::new(0.0, 0.0, 1.0),
            ..Default::default()
        })),
    );
    scene.add_to_parent(HostNode::new("wheel").with(collider()), cart);

    let doc = export(&scene);

    assert_eq!(node_ext(&doc, 0, "OMI_physics_body"), Some(&json!({ "type": "static" })));
    assert_eq!(node_ext(&doc, 1, "OMI_physics_body"), Some(&json!({ "type": "kinematic" })));
    assert_eq!(
        node_ext(&doc, 2, "OMI_physics_body"),
        Some(&json!({ "type": "rigid", "mass": 2.0, "linearVelocity": [0.0, 0.0, 1.0] }))
    );
    // wheel: part of the cart's compound body
    let wheel = doc.node(1).unwrap().children[0];
    assert!(node_ext(&doc, wheel, "OMI_physics_body").is_none());
}

// ============================================================================
// MX_reflection_probes
// ============================================================================

#[test]
fn reflection_probes_and_default_reflection() {
    let baked = image("probe");
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("room").with(Attachment::ReflectionProbe(Arc::new(ReflectionProbe {
        enabled: true,
        size: Vec3::splat(10.0),
        baked_texture: Some(baked),
        custom_baked_texture: None,
    }))));
    scene.add_node(HostNode::new("off").with(Attachment::ReflectionProbe(Arc::new(ReflectionProbe {
        enabled: false,
        baked_texture: Some(image("unused")),
        ..Default::default()
    }))));
    scene.render.default_reflection = Some(image("sky"));

    let doc = export(&scene);
    let probes = &doc.root_extension("MX_reflection_probes").unwrap()["reflectionProbes"];

    assert_eq!(
        *probes,
        json!([
            { "size": [10.0, 10.0, 10.0], "reflectionProbeTexture": { "index": 0 } },
            { "reflectionProbeTexture": { "index": 1 } },
        ])
    );
    assert_eq!(node_ext(&doc, 0, "MX_reflection_probes"), Some(&json!({ "reflectionProbe": 0 })));
    assert!(node_ext(&doc, 1, "MX_reflection_probes").is_none());
    assert_eq!(
        doc.extension(ExtensionTarget::Scene(0), "MX_reflection_probes"),
        Some(&json!({ "reflectionProbe": 1 }))
    );
}

#[test]
fn custom_probe_texture_wins() {
    let custom = image("custom");
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("room").with(Attachment::ReflectionProbe(Arc::new(ReflectionProbe {
        enabled: true,
        size: Vec3::ONE,
        baked_texture: Some(image("auto")),
        custom_baked_texture: Some(custom),
    }))));

    let doc = export(&scene);
    let json = doc.to_json().unwrap();
    assert_eq!(json["images"][0]["name"], "custom");
    assert_eq!(doc.texture_count(), 1);
}

// ============================================================================
// MX_lightmap / MX_texture_rgbm
// ============================================================================

#[test]
fn lightmap_scale_offset_and_rgbm_marker() {
    let renderer = |so: Vec4| {
        Attachment::MeshRenderer(MeshRenderer {
            lightmap_index: 0,
            lightmap_scale_offset: so,
            ..Default::default()
        })
    };

    let mut scene = HostScene::new("s");
    scene.render.lightmaps.push(Lightmap {
        color: Some(image("lightmap-0")),
    });
    scene.add_node(HostNode::new("floor").with(renderer(Vec4::new(0.5, 0.5, 0.25, 0.25))));
    scene.add_node(HostNode::new("wall").with(renderer(Vec4::new(1.0, 1.0, 0.0, 0.0))));
    scene.add_node(HostNode::new("unbaked").with(Attachment::MeshRenderer(MeshRenderer::default())));

    let doc = export(&scene);

    assert_eq!(
        node_ext(&doc, 0, "MX_lightmap"),
        Some(&json!({ "scale": [0.5, 0.5], "offset": [0.25, 0.25], "lightMapTexture": { "index": 0 } }))
    );
    assert_eq!(
        node_ext(&doc, 1, "MX_lightmap"),
        Some(&json!({ "lightMapTexture": { "index": 0 } }))
    );
    assert!(node_ext(&doc, 2, "MX_lightmap").is_none());

    assert_eq!(doc.texture_count(), 1);
    assert!(doc.has_extension(ExtensionTarget::Texture(0), "MX_texture_rgbm"));
    assert_eq!(
        doc.extensions_used().iter().filter(|n| *n == "MX_texture_rgbm").count(),
        1
    );
}

#[test]
fn out_of_range_lightmap_index_is_ignored() {
    let mut scene = HostScene::new("s");
    scene.render.lightmaps.push(Lightmap {
        color: Some(image("lightmap-0")),
    });
    scene.add_node(HostNode::new("sentinel").with(Attachment::MeshRenderer(MeshRenderer {
        lightmap_index: 65534,
        ..Default::default()
    })));
    scene.add_node(HostNode::new("missing").with(Attachment::MeshRenderer(MeshRenderer {
        lightmap_index: 3,
        ..Default::default()
    })));

    let doc = export(&scene);
    assert!(!used(&doc, "MX_lightmap"));
    assert_eq!(doc.texture_count(), 0);
}

// ============================================================================
// MX_components
// ============================================================================

thirdroom_component! {
    #[derive(Debug, Clone, Default)]
    pub struct Door {
        pub open: bool,
        pub frame: Option<NodeKey>,
    }
}

thirdroom_component! {
    #[derive(Debug, Clone, Default)]
    pub struct Switch {
        pub on: bool,
    }
}

#[test]
fn components_inline_and_definitions() {
    let mut scene = HostScene::new("s");
    let door_key = scene.add_node(HostNode::new("door"));
    let frame_key = scene.add_node(HostNode::new("frame"));
    scene.add_node(HostNode::new("panel").with(Attachment::AdditionalComponents(vec![ComponentType::of::<Switch>()])));

    scene.get_node_mut(door_key).unwrap().attachments.push(Attachment::Component(Arc::new(Door {
        open: true,
        frame: Some(frame_key),
    })));
    scene.get_node_mut(frame_key).unwrap().attachments.push(Attachment::Component(Arc::new(Door::default())));

    let doc = export(&scene);

    assert_eq!(
        node_ext(&doc, 0, "MX_components"),
        Some(&json!({ "Door": { "open": true, "frame": 1 } }))
    );
    assert_eq!(
        node_ext(&doc, 1, "MX_components"),
        Some(&json!({ "Door": { "open": false, "frame": null } }))
    );
    assert!(node_ext(&doc, 2, "MX_components").is_none());

    let definitions = &doc.root_extension("MX_components").unwrap()["definitions"];
    let names: Vec<_> = definitions
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Door", "Switch"]);
    assert!(used(&doc, "MX_components"));
}

#[test]
fn duplicate_component_type_keeps_first() {
    let mut scene = HostScene::new("s");
    scene.add_node(
        HostNode::new("double")
            .with(Attachment::Component(Arc::new(Switch { on: true })))
            .with(Attachment::Component(Arc::new(Switch { on: false }))),
    );

    let doc = export(&scene);
    assert_eq!(
        node_ext(&doc, 0, "MX_components"),
        Some(&json!({ "Switch": { "on": true } }))
    );
}

// ============================================================================
// Scene-level extensions
// ============================================================================

struct FixedSky {
    seen: Rc<Cell<Option<CaptureRequest>>>,
}

impl EnvironmentCapture for FixedSky {
    fn capture_equirectangular(&self, request: &CaptureRequest) -> Result<Arc<Image>> {
        self.seen.set(Some(*request));
        Ok(Arc::new(Image::rgba8("sky", 2, 1, vec![255; 8])))
    }
}

#[test]
fn background_is_captured_with_sun() {
    let seen = Rc::new(Cell::new(None));
    let mut scene = HostScene::new("s");
    let sun = scene.add_node(HostNode::new("sun").with(Attachment::Light(Light {
        kind: LightType::Directional,
        enabled: true,
        ..Default::default()
    })));
    scene.render.skybox = true;

    let mut exporter = SceneExporter::new(ExportSettings::default())
        .with_environment_capture(FixedSky { seen: seen.clone() });
    let doc = exporter.export(&scene).unwrap();

    assert_eq!(
        doc.extension(ExtensionTarget::Scene(0), "MX_background"),
        Some(&json!({ "backgroundTexture": { "index": 0 } }))
    );
    let request = seen.get().unwrap();
    assert_eq!(request.cubemap_size, 1024);
    assert_eq!(request.sun, Some(sun));
    assert_eq!(doc.to_json().unwrap()["images"][0]["mimeType"], "image/png");
}

#[test]
fn background_skipped_without_capture() {
    let mut scene = HostScene::new("s");
    scene.render.skybox = true;
    let doc = export(&scene);
    assert!(!used(&doc, "MX_background"));
}

#[test]
fn postprocessing_uses_last_global_volume() {
    let mut scene = HostScene::new("s");
    scene.render.volumes = vec![
        Volume {
            is_global: true,
            active: true,
            bloom: Some(BloomSettings { intensity: 1.0 }),
        },
        Volume {
            is_global: true,
            active: true,
            bloom: Some(BloomSettings { intensity: 5.0 }),
        },
        Volume {
            is_global: false,
            active: true,
            bloom: Some(BloomSettings { intensity: 9.0 }),
        },
    ];

    let doc = export(&scene);
    let post = doc.extension(ExtensionTarget::Scene(0), "MX_postprocessing").unwrap();
    let strength = post["bloom"]["strength"].as_f64().unwrap();
    assert!((strength - 0.5).abs() < 1e-6);
}

#[test]
fn inactive_global_volume_writes_nothing() {
    let mut scene = HostScene::new("s");
    scene.render.volumes = vec![Volume {
        is_global: true,
        active: false,
        bloom: Some(BloomSettings { intensity: 5.0 }),
    }];

    let doc = export(&scene);
    assert!(!used(&doc, "MX_postprocessing"));
}

#[test]
fn scene_ar_marker() {
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("anchor").with(Attachment::SceneAr));
    let doc = export(&scene);
    assert_eq!(doc.extension(ExtensionTarget::Scene(0), "MX_scene_ar"), Some(&json!({})));
}

// ============================================================================
// Marker extensions
// ============================================================================

#[test]
fn node_markers() {
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("rock").with_static(true));
    scene.add_node(HostNode::new("spawn").with(Attachment::SpawnPoint(SpawnPoint {
        title: "Start".to_string(),
        ..Default::default()
    })));
    scene.add_node(HostNode::new("sign").with(Attachment::Link {
        uri: "https://thirdroom.io".to_string(),
    }));
    scene.add_node(HostNode::new("gate").with(Attachment::Portal {
        uri: "world://next".to_string(),
    }));

    let doc = export(&scene);

    assert_eq!(node_ext(&doc, 0, "MX_static"), Some(&json!({})));
    assert_eq!(node_ext(&doc, 1, "OMI_spawn_point"), Some(&json!({ "title": "Start" })));
    assert_eq!(node_ext(&doc, 2, "OMI_link"), Some(&json!({ "uri": "https://thirdroom.io" })));
    assert_eq!(node_ext(&doc, 3, "MX_portal"), Some(&json!({ "uri": "world://next" })));
    assert!(node_ext(&doc, 1, "MX_static").is_none());
}

#[test]
fn usage_declared_only_when_used() {
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("plain"));
    let doc = export(&scene);
    assert!(doc.extensions_used().is_empty());
}

#[test]
fn shadow_flags() {
    let mut scene = HostScene::new("s");
    scene.add_node(HostNode::new("lamp").with(Attachment::Light(Light {
        kind: LightType::Point,
        enabled: true,
        shadows: true,
        bake_type: LightmapBakeType::Mixed,
    })));
    scene.add_node(HostNode::new("baked").with(Attachment::Light(Light {
        kind: LightType::Point,
        enabled: true,
        shadows: true,
        bake_type: LightmapBakeType::Baked,
    })));
    scene.add_node(HostNode::new("floor").with(Attachment::MeshRenderer(MeshRenderer {
        cast_shadows: false,
        ..Default::default()
    })));

    let doc = export(&scene);
    assert_eq!(node_ext(&doc, 0, "MX_lights_shadows"), Some(&json!({ "castShadow": true })));
    assert!(node_ext(&doc, 1, "MX_lights_shadows").is_none());
    assert_eq!(node_ext(&doc, 2, "MX_lights_shadows"), Some(&json!({ "receiveShadow": true })));
}
