use glam::{Quat, Vec3};

use crate::scene::NodeKey;
use crate::scene::components::Attachment;

/// A host scene node as seen by the exporter.
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional key of the parent node (None for root nodes)
/// - `children`: Child node keys, in export order
///
/// # Transform
///
/// Local translation, rotation and scale are already expressed in the
/// document's coordinate system.
///
/// # Attachments
///
/// Everything an extension may export lives in `attachments`. Lookups such as
/// [`HostNode::first`] mirror "get the first component of this kind".
#[derive(Debug, Clone)]
pub struct HostNode {
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,

    // === Local Transform ===
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    /// Marked as never moving at runtime.
    pub is_static: bool,

    pub attachments: Vec<Attachment>,
}

impl HostNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            is_static: false,
            attachments: Vec::new(),
        }
    }

    /// Builder-style attachment helper.
    #[must_use]
    pub fn with(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Returns the first attachment `f` maps to `Some`.
    pub fn first<'a, T: ?Sized>(&'a self, f: impl Fn(&'a Attachment) -> Option<&'a T>) -> Option<&'a T> {
        self.attachments.iter().find_map(f)
    }

    /// Returns every attachment `f` maps to `Some`, in attachment order.
    pub fn all<'a, T: ?Sized + 'a>(
        &'a self,
        f: impl Fn(&'a Attachment) -> Option<&'a T> + 'a,
    ) -> impl Iterator<Item = &'a T> + 'a {
        self.attachments.iter().filter_map(f)
    }
}

impl Default for HostNode {
    fn default() -> Self {
        Self::new("")
    }
}
