//! 导出核心 (Export core)
//!
//! 两阶段导出管线：
//! - 逐节点阶段：扩展向注册表登记共享资源，并立即获得稳定的句柄
//! - 收尾阶段：按注册顺序写出根级资源数组，随后清空注册表
//!
//! Handles issued during traversal are exactly the indices of the arrays
//! written at finalize, so node payloads can reference resources before the
//! arrays exist.

pub mod context;
pub mod exporter;
pub mod handle;
pub mod registries;
pub mod registry;
pub mod schema;
pub mod session;

pub use context::{ExportContext, ExportTarget, NodeMap};
pub use exporter::SceneExporter;
pub use handle::{Handle, Resource, ResourceKind};
pub use registries::Registries;
pub use registry::{ByValue, EqualityPolicy, Identity, ResourceRegistry};
pub use schema::{
    ComponentInstanceRecord, EncodedValue, FieldDescriptor, NodeResolver, SchemaEncoder, SchemaRecord,
    TypeDescriptor,
};
pub use session::{ExportSession, SessionPhase};
