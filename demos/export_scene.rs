//! Builds a small Third Room scene in memory and writes it as `.gltf` + `.bin`.
//!
//! ```text
//! cargo run --example export_scene -- out/room.gltf [settings.json]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use glam::{Vec3, Vec4};
use thirdroom_export::scene::{
    Attachment, AudioClip, AudioSourceConfig, BloomSettings, Collider, ColliderShape, HostNode, HostScene, Image,
    Light, LightType, Lightmap, MeshRenderer, NodeKey, PositionalAudioEmitter, Rigidbody, SpawnPoint, Volume,
};
use thirdroom_export::settings::ExportSettings;
use thirdroom_export::{SceneExporter, thirdroom_component};

thirdroom_component! {
    /// Opens when a player walks close to it.
    #[derive(Debug, Clone, Default)]
    pub struct AutoDoor {
        pub radius: f32,
        pub hinge: Option<NodeKey>,
    }
}

fn build_scene() -> HostScene {
    let mut scene = HostScene::new("Lobby");

    // 1. Lighting
    scene.add_node(HostNode::new("Sun").with(Attachment::Light(Light {
        kind: LightType::Directional,
        enabled: true,
        shadows: true,
        ..Default::default()
    })));

    let lightmap = Arc::new(Image::rgba8("Lightmap-0", 2, 2, vec![128; 16]));
    scene.render.lightmaps.push(Lightmap { color: Some(lightmap) });
    scene.render.volumes.push(Volume {
        is_global: true,
        active: true,
        bloom: Some(BloomSettings { intensity: 3.0 }),
    });

    // 2. Static geometry
    scene.add_node(
        HostNode::new("Floor")
            .with_static(true)
            .with(Attachment::Collider(Arc::new(Collider::new(ColliderShape::Box {
                size: Vec3::new(20.0, 0.2, 20.0),
            }))))
            .with(Attachment::MeshRenderer(MeshRenderer {
                lightmap_index: 0,
                lightmap_scale_offset: Vec4::new(0.5, 0.5, 0.0, 0.0),
                ..Default::default()
            })),
    );

    // 3. A dynamic ball with an offset collider
    scene.add_node(
        HostNode::new("Ball")
            .with_translation(Vec3::new(0.0, 3.0, 0.0))
            .with(Attachment::Collider(Arc::new(
                Collider::new(ColliderShape::Sphere { radius: 0.5 }).with_center(Vec3::new(0.0, 0.5, 0.0)),
            )))
            .with(Attachment::Rigidbody(Rigidbody {
                mass: 5.0,
                ..Default::default()
            })),
    );

    // 4. Gameplay
    let hinge = scene.add_node(HostNode::new("Hinge").with_translation(Vec3::new(4.0, 0.0, 0.0)));
    let door = scene.add_to_parent(HostNode::new("Door"), hinge);
    if let Some(node) = scene.get_node_mut(door) {
        node.attachments.push(Attachment::Component(Arc::new(AutoDoor {
            radius: 2.5,
            hinge: Some(hinge),
        })));
    }

    scene.add_node(HostNode::new("Spawn").with(Attachment::SpawnPoint(SpawnPoint {
        title: "Lobby".to_string(),
        ..Default::default()
    })));
    scene.add_node(HostNode::new("Exit").with(Attachment::Portal {
        uri: "https://thirdroom.io/world/garden".to_string(),
    }));

    // 5. Audio
    let clip = Arc::new(AudioClip::from_bytes("fountain.mp3", vec![0xFF, 0xFB, 0x90, 0x00]));
    scene.add_node(HostNode::new("Fountain").with(Attachment::AudioEmitter(Arc::new(PositionalAudioEmitter {
        sources: vec![Arc::new(AudioSourceConfig::new(clip))],
        ref_distance: 2.0,
        ..Default::default()
    }))));

    scene
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let output = PathBuf::from(args.next().unwrap_or_else(|| "lobby.gltf".to_string()));
    let settings = match args.next() {
        Some(path) => ExportSettings::from_json_file(&path).with_context(|| format!("reading settings {path}"))?,
        None => ExportSettings::default(),
    };

    let scene = build_scene();
    let mut exporter = SceneExporter::new(settings);
    let mut document = exporter.export(&scene).context("exporting scene")?;

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    document.write_gltf(&output)?;

    log::info!(
        "Wrote {} ({} nodes, {} textures, extensions: {})",
        output.display(),
        document.nodes().len(),
        document.texture_count(),
        document.extensions_used().join(", ")
    );
    Ok(())
}
