//! Resource Registry
//!
//! An ordered, deduplicating accumulator for one resource kind within one
//! export session.
//!
//! # Design Principles
//! - Insertion order = handle index = finalized array order
//! - Equality is a policy: [`Identity`] compares `Arc` allocations, [`ByValue`]
//!   compares with `PartialEq`
//! - Lookups are linear; a registry holds at most a scene's worth of entries
//! - Grows only during the per-node phase, read and cleared during finalize

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::export::handle::{Handle, Resource};

/// Decides whether two registry entries are the same resource.
pub trait EqualityPolicy<T: ?Sized> {
    fn same(a: &T, b: &T) -> bool;
}

/// Reference identity: the same allocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

/// Value identity: `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByValue;

impl<T: ?Sized> EqualityPolicy<Arc<T>> for Identity {
    #[inline]
    fn same(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl<T: PartialEq> EqualityPolicy<T> for ByValue {
    #[inline]
    fn same(a: &T, b: &T) -> bool {
        a == b
    }
}

pub struct ResourceRegistry<T, P = Identity> {
    items: Vec<T>,
    _policy: PhantomData<P>,
}

impl<T, P> ResourceRegistry<T, P> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _policy: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries in index order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        handle.resolve(&self.items)
    }

    /// Empties the registry. Called once per session, after finalize.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Resource, P: EqualityPolicy<T>> ResourceRegistry<T, P> {
    /// Returns the handle of an equal entry, or appends `item` and returns the
    /// handle of the new last entry.
    pub fn register(&mut self, item: T) -> Handle<T> {
        if let Some(existing) = self.find(&item) {
            return existing;
        }
        let index = self.items.len() as u32;
        self.items.push(item);
        Handle::new(index)
    }

    #[must_use]
    pub fn find(&self, item: &T) -> Option<Handle<T>> {
        self.items
            .iter()
            .position(|existing| P::same(existing, item))
            .map(|index| Handle::new(index as u32))
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.find(item).is_some()
    }
}

impl<T, P> Default for ResourceRegistry<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P> fmt::Debug for ResourceRegistry<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("items", &self.items)
            .finish()
    }
}
