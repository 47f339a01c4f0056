//! 宿主场景模块 (Host scene model)
//!
//! 导出管线读取的宿主侧数据：
//! - HostScene: 节点容器与遍历顺序
//! - HostNode: 节点（名称、变换、层级、附加组件）
//! - Attachment: 节点上可导出的附加数据（音频、碰撞体、反射探针……）
//! - Component: 用户自定义组件的反射接口
//! - RenderSettings: 环境/光照贴图/后处理等全局渲染状态

pub mod node;
pub mod scene;
pub mod components;
pub mod component;
pub mod render_settings;
pub mod image;

// 重新导出常用类型
pub use node::HostNode;
pub use scene::HostScene;
pub use components::{
    Attachment, AudioClip, AudioSourceConfig, DistanceModel, GlobalAudioEmitter, Collider,
    ColliderShape, HostMesh, Light, LightType, LightmapBakeType, MeshRenderer, PositionalAudioEmitter,
    ReflectionProbe, Rigidbody, SpawnPoint,
};
pub use component::{Component, ComponentDescriptor, ComponentType, FieldFlags, FieldInfo, FieldType, FieldValue};
pub use render_settings::{
    BloomSettings, CaptureRequest, EnvironmentCapture, Lightmap, LightmapsMode, MixedLightingMode, RenderSettings,
    Volume,
};
pub use image::{Image, ImageData};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeKey;
}
