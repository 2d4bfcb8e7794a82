use std::fmt;

use crate::geometry::Rect;

/// Handle to an entity stored in a [`Quadtree`](crate::Quadtree).
///
/// Handles of removed entities may be reused by later inserts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Callback payload for entities that carry behaviour instead of data.
pub type Action = Box<dyn Fn() + Send + Sync>;

/// A bound paired with an opaque payload.
///
/// Two entities are equal when their bounds are equal. The payload never
/// takes part in comparisons, so it does not need to implement `PartialEq`.
pub struct Entity<T> {
    pub bound: Rect,
    pub payload: T,
}

impl<T> Entity<T> {
    pub fn new(bound: Rect, payload: T) -> Self {
        Self { bound, payload }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl Entity<Action> {
    pub fn action<F>(bound: Rect, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::new(bound, Box::new(action))
    }

    pub fn run(&self) {
        (self.payload)()
    }
}

impl<T> PartialEq for Entity<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bound == other.bound
    }
}

impl<T: Clone> Clone for Entity<T> {
    fn clone(&self) -> Self {
        Self::new(self.bound, self.payload.clone())
    }
}

impl<T> fmt::Debug for Entity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity").field("bound", &self.bound).finish_non_exhaustive()
    }
}
