//! Cross-reference Handles
//!
//! A [`Handle<T>`] is the `(kind, index)` pair a payload embeds to point into a
//! root-level resource array. The index is fixed at registration time: a
//! registry only ever appends, so the position an entry receives is the
//! position it has in the finalized array.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Serialize, Serializer};

/// The resource array a handle points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    AudioData,
    AudioSource,
    AudioEmitter,
    Collider,
    ReflectionProbe,
    ComponentDefinition,
    Texture,
    Mesh,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::AudioData => "audio",
            ResourceKind::AudioSource => "sources",
            ResourceKind::AudioEmitter => "emitters",
            ResourceKind::Collider => "colliders",
            ResourceKind::ReflectionProbe => "reflectionProbes",
            ResourceKind::ComponentDefinition => "definitions",
            ResourceKind::Texture => "textures",
            ResourceKind::Mesh => "meshes",
        };
        f.write_str(name)
    }
}

/// A type that can live in a [`ResourceRegistry`](super::registry::ResourceRegistry).
pub trait Resource {
    const KIND: ResourceKind;
}

/// Typed index into a finalized resource array.
///
/// Handles are plain values: copy them freely. Only a registry creates them.
pub struct Handle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> Handle<T> {
    pub(crate) fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }
}

impl<T> Handle<T> {
    #[inline]
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Looks the handle up in a finalized array.
    #[must_use]
    pub fn resolve<'a, R>(&self, finalized: &'a [R]) -> Option<&'a R> {
        finalized.get(self.index as usize)
    }

    /// Looks the handle up in a finalized JSON array.
    #[must_use]
    pub fn resolve_json<'a>(&self, finalized: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        finalized.as_array()?.get(self.index as usize)
    }
}

// Manual impls: a handle is copyable whatever `T` is.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: Resource> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}#{})", T::KIND, self.index)
    }
}

/// Payloads embed the bare integer index.
impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index)
    }
}
