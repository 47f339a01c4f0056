use crate::document::{Document, DocumentWriter, SceneRecord};
use crate::errors::Result;
use crate::export::context::{ExportTarget, NodeMap};
use crate::export::session::ExportSession;
use crate::scene::{EnvironmentCapture, HostScene};
use crate::settings::ExportSettings;

/// Walks a [`HostScene`] and drives an [`ExportSession`] over it.
///
/// # Example
///
/// ```rust,ignore
/// let mut exporter = SceneExporter::new(ExportSettings::default());
/// let mut document = exporter.export(&scene)?;
/// document.write_gltf("out/scene.gltf")?;
/// ```
pub struct SceneExporter {
    session: ExportSession,
    environment: Option<Box<dyn EnvironmentCapture>>,
}

impl SceneExporter {
    #[must_use]
    pub fn new(settings: ExportSettings) -> Self {
        Self::with_session(ExportSession::new(settings))
    }

    #[must_use]
    pub fn with_session(session: ExportSession) -> Self {
        Self {
            session,
            environment: None,
        }
    }

    /// Source of the background image for `MX_background`.
    #[must_use]
    pub fn with_environment_capture(mut self, capture: impl EnvironmentCapture + 'static) -> Self {
        self.environment = Some(Box::new(capture));
        self
    }

    #[must_use]
    pub fn session(&self) -> &ExportSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExportSession {
        &mut self.session
    }

    /// Exports `scene` into a fresh [`Document`].
    ///
    /// On [`ExportError::FinalizeFailed`](crate::errors::ExportError::FinalizeFailed)
    /// no document is returned.
    pub fn export(&mut self, scene: &HostScene) -> Result<Document> {
        let mut document = Document::new(self.session.settings());
        self.export_into(scene, &mut document)?;
        Ok(document)
    }

    /// Exports `scene` into an existing document writer.
    ///
    /// On `Err` the writer is left partially written and must be discarded.
    /// After [`ExportError::FinalizeFailed`](crate::errors::ExportError::FinalizeFailed)
    /// in particular, node payloads and `extensionsUsed` entries may refer to
    /// root arrays that were never written.
    pub fn export_into(&mut self, scene: &HostScene, document: &mut dyn DocumentWriter) -> Result<()> {
        let mut nodes = NodeMap::default();
        let mut target = ExportTarget {
            host: scene,
            document,
            nodes: &mut nodes,
            environment: self.environment.as_deref(),
        };

        self.session.begin(&mut target)?;

        if let Err(err) = Self::traverse(&mut self.session, &mut target) {
            self.session.abort();
            return Err(err);
        }

        self.session.on_traversal_finished(&mut target)?;
        log::info!("Exported scene '{}' ({} nodes)", scene.name, nodes.len());
        Ok(())
    }

    fn traverse(session: &mut ExportSession, target: &mut ExportTarget<'_>) -> Result<()> {
        let host = target.host;
        let scene_id = target.document.add_scene(SceneRecord::named(&host.name));

        let roots = host
            .root_nodes
            .iter()
            .map(|&root| target.nodes.get_or_export(host, &mut *target.document, root))
            .collect::<Result<Vec<_>>>()?;
        target.document.set_scene_nodes(scene_id, roots)?;

        for key in host.traverse() {
            let node_id = target.nodes.get_or_export(host, &mut *target.document, key)?;

            let children = host.nodes[key]
                .children()
                .iter()
                .map(|&child| target.nodes.get_or_export(host, &mut *target.document, child))
                .collect::<Result<Vec<_>>>()?;
            if !children.is_empty() {
                target.document.set_children(node_id, children)?;
            }

            session.on_node_visited(target, key, node_id)?;
        }

        Ok(())
    }
}
