//! Queue data structures and the shared queue interface.

pub mod config;
pub mod core;
pub mod heap;
pub mod standalone;

pub use config::{Defaults, Discipline, Order, QueueConfig};
pub use standalone::StandaloneQueue;

use crate::error::Result;
use crate::item::Item;

/// Cap on a single fast-mode wake-up burst, chosen so one burst cannot
/// exceed a typical socket buffer.
pub const MAX_DQ_DEPTH: usize = 192;

/// The hybrid queue interface.
///
/// Three implementations exist, fixed at construction: a
/// [`StandaloneQueue`] keeps all state local; a
/// [`WorkerProxy`](crate::WorkerProxy) relays every call over the control
/// socket to the manager, whose dispatcher runs the authoritative state.
/// There is no runtime rebinding between the roles.
pub trait Queue {
    /// Appends items to the tail of the normal lane.
    fn enqueue(&self, items: Vec<Item>) -> Result<()>;

    /// Appends items to the tail of the priority lane for `level`. Lanes
    /// are created on demand and dequeue ahead of the normal lane.
    fn enqueue_priority(&self, level: i64, items: Vec<Item>) -> Result<()>;

    /// Removes and returns the next item, blocking until one is available
    /// on a managed queue. Absent only when a wake-up raced with another
    /// consumer draining the queue.
    fn dequeue(&self) -> Result<Option<Item>>;

    /// As [`Queue::dequeue`] for `count` items; positions past the pending
    /// count come back absent.
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidCount`](crate::QueueError::InvalidCount) when
    /// `count` is below one.
    fn dequeue_many(&self, count: usize) -> Result<Vec<Option<Item>>>;

    /// Removes and returns the next item without blocking; absent on an
    /// empty queue. Disallowed in fast mode (warns and returns absent).
    fn dequeue_nb(&self) -> Result<Option<Item>>;

    /// As [`Queue::dequeue_nb`] for `count` items.
    fn dequeue_nb_many(&self, count: usize) -> Result<Vec<Option<Item>>>;

    /// Inserts items into the normal lane. Index 0 is the next-to-dequeue
    /// end under both disciplines; negative indexes count from the other
    /// end, and out-of-range indexes clamp to the nearest end.
    fn insert(&self, index: i64, items: Vec<Item>) -> Result<()>;

    /// As [`Queue::insert`] for the priority lane of `level`; a missing or
    /// empty lane behaves like [`Queue::enqueue_priority`].
    fn insert_priority(&self, level: i64, index: i64, items: Vec<Item>) -> Result<()>;

    /// Returns the item at the given position without removing it, using
    /// the same symmetric indexing as [`Queue::insert`].
    fn peek(&self, index: i64) -> Result<Option<Item>>;

    /// As [`Queue::peek`] for the priority lane of `level`.
    fn peek_priority(&self, level: i64, index: i64) -> Result<Option<Item>>;

    /// Returns the priority level at `index` in the heap.
    fn peek_heap(&self, index: i64) -> Result<Option<i64>>;

    /// Returns all heap levels in dequeue order.
    fn heap_snapshot(&self) -> Result<Vec<i64>>;

    /// Total items across the normal lane and all priority lanes.
    fn pending(&self) -> Result<usize>;

    /// Empties the queue. Disallowed in fast mode (warns and returns).
    fn clear(&self) -> Result<()>;

    /// Blocks the caller until `pending` drops to `threshold` or below.
    ///
    /// # Errors
    ///
    /// [`QueueError::AwaitDisabled`](crate::QueueError::AwaitDisabled) when
    /// the queue was built without the await channel.
    fn await_threshold(&self, threshold: usize) -> Result<()>;
}
