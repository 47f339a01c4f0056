use crate::errors::{ExportError, Result};
use crate::export::context::{ExportContext, ExportTarget};
use crate::export::registries::Registries;
use crate::extensions::{ExportExtension, default_extensions};
use crate::scene::NodeKey;
use crate::settings::ExportSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Traversing,
}

/// Drives the registered extensions through one export.
///
/// # Phases
///
/// 1. [`begin`](Self::begin): every extension checks its preconditions.
///    Nothing is written when one of them fails.
/// 2. [`on_node_visited`](Self::on_node_visited), once per node in traversal
///    order. Extensions register resources and attach node payloads; a
///    failure skips that extension's output for that node only.
/// 3. [`on_traversal_finished`](Self::on_traversal_finished): every extension
///    writes its root-level arrays. Afterwards all registries are empty,
///    whether finalize succeeded or not.
pub struct ExportSession {
    phase: SessionPhase,
    settings: ExportSettings,
    extensions: Vec<Box<dyn ExportExtension>>,
    registries: Registries,
}

impl ExportSession {
    /// Session with every built-in extension not disabled in `settings`.
    #[must_use]
    pub fn new(settings: ExportSettings) -> Self {
        let extensions = default_extensions(&settings);
        Self {
            phase: SessionPhase::Idle,
            settings,
            extensions,
            registries: Registries::default(),
        }
    }

    /// Session without any extension.
    #[must_use]
    pub fn empty(settings: ExportSettings) -> Self {
        Self {
            phase: SessionPhase::Idle,
            settings,
            extensions: Vec::new(),
            registries: Registries::default(),
        }
    }

    pub fn register_extension(&mut self, extension: Box<dyn ExportExtension>) {
        self.extensions.push(extension);
    }

    #[must_use]
    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn begin(&mut self, target: &mut ExportTarget<'_>) -> Result<()> {
        self.expect_phase(SessionPhase::Idle, "begin")?;
        debug_assert!(self.registries.is_empty());

        let Self {
            extensions,
            registries,
            settings,
            ..
        } = self;

        for extension in extensions.iter_mut() {
            let ctx = ExportContext::new(target, registries, settings);
            if let Err(err) = extension.before_export(&ctx) {
                log::error!("{}: export aborted: {err}", extension.name());
                return Err(err);
            }
        }

        self.phase = SessionPhase::Traversing;
        log::debug!("Export session started with {} extension(s)", self.extensions.len());
        Ok(())
    }

    pub fn on_node_visited(&mut self, target: &mut ExportTarget<'_>, node: NodeKey, node_id: u32) -> Result<()> {
        self.expect_phase(SessionPhase::Traversing, "on_node_visited")?;

        let Self {
            extensions,
            registries,
            settings,
            ..
        } = self;

        for extension in extensions.iter_mut() {
            let mut ctx = ExportContext::new(target, registries, settings);
            if let Err(err) = extension.on_node(&mut ctx, node, node_id) {
                let name = target.host.get_node(node).map_or("<unknown>", |n| n.name.as_str());
                log::warn!("{}: skipped node '{name}': {err}", extension.name());
            }
        }
        Ok(())
    }

    /// Runs every extension's finalize step, then clears all registries.
    ///
    /// Returns [`ExportError::FinalizeFailed`] listing each failed extension;
    /// the other extensions' output is still written.
    pub fn on_traversal_finished(&mut self, target: &mut ExportTarget<'_>) -> Result<()> {
        self.expect_phase(SessionPhase::Traversing, "on_traversal_finished")?;

        for (kind, count) in self.registries.counts() {
            if count > 0 {
                log::debug!("Finalizing {count} {kind}");
            }
        }

        let mut failures = Vec::new();
        let Self {
            extensions,
            registries,
            settings,
            ..
        } = self;

        for extension in extensions.iter_mut() {
            let mut ctx = ExportContext::new(target, registries, settings);
            if let Err(err) = extension.on_finalize(&mut ctx) {
                log::error!("{}: finalize failed: {err}", extension.name());
                failures.push(ExportError::Finalize {
                    extension: extension.name(),
                    source: Box::new(err),
                });
            }
        }

        self.finish();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExportError::FinalizeFailed(failures))
        }
    }

    /// Drops everything collected so far and returns to idle.
    pub fn abort(&mut self) {
        if self.phase != SessionPhase::Idle {
            log::warn!("Export session aborted");
        }
        self.finish();
    }

    fn finish(&mut self) {
        self.registries.clear();
        for extension in &mut self.extensions {
            extension.reset();
        }
        self.phase = SessionPhase::Idle;
    }

    fn expect_phase(&self, expected: SessionPhase, operation: &str) -> Result<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(ExportError::SessionState(format!(
                "{operation} called while {:?}, expected {expected:?}",
                self.phase
            )))
        }
    }
}

impl Default for ExportSession {
    fn default() -> Self {
        Self::new(ExportSettings::default())
    }
}
