#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod document;
pub mod errors;
pub mod export;
pub mod extensions;
pub mod scene;
pub mod settings;

pub use document::{BlobRef, Document, DocumentWriter, ExtensionTarget, TextureInfo, TextureMapType};
pub use errors::{ExportError, Result};
pub use export::{
    ByValue, ExportContext, ExportSession, Handle, Identity, Registries, ResourceKind, ResourceRegistry, SceneExporter,
    SchemaEncoder,
};
pub use extensions::{ExportExtension, default_extensions};
pub use scene::{Attachment, Component, ComponentType, HostNode, HostScene, NodeKey};
pub use settings::{BlobStorage, ExportSettings};
