//! Stack headroom for serde walks over arbitrarily deep trees.
//!
//! serde's derived `Serialize`/`Deserialize` recurse once per nesting level.
//! The recursive entry points of the tree types run through [`grow`], which
//! switches to a fresh heap-allocated stack segment when the current one runs
//! low.

use serde::ser::{Serialize, Serializer};

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, on a new stack segment if the current one is nearly exhausted.
pub(crate) fn grow<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// `serialize_with` target for child lists of recursive types.
pub(crate) fn serialize_children<T, S>(children: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    grow(|| serializer.collect_seq(children))
}

/// Drop `root_children` and everything below them without recursing.
///
/// `take_children` detaches a node's direct children, so each node is
/// childless by the time it is dropped. Recursive types call this from their
/// `Drop` impl with their own detached children.
pub(crate) fn dismantle<T>(root_children: Vec<T>, mut take_children: impl FnMut(&mut T) -> Vec<T>) {
    let mut pending = root_children;
    while let Some(mut node) = pending.pop() {
        pending.append(&mut take_children(&mut node));
    }
}
