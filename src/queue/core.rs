//! In-memory queue state: normal lane, priority lanes, level heap.
//!
//! Pure logic, no I/O. The manager dispatcher and the standalone queue both
//! drive this structure; doorbell and await side effects live with the
//! owners.

use std::collections::{HashMap, VecDeque};

use crate::item::Item;
use crate::queue::config::{Discipline, Order};
use crate::queue::heap::LevelHeap;

/// The authoritative queue state.
///
/// A lane for a priority level is created on first enqueue at that level and
/// removed (together with its heap entry) when it drains. Invariant: the
/// heap holds exactly the set of levels with a lane in `lanes`.
#[derive(Debug)]
pub struct QueueCore {
    normal: VecDeque<Item>,
    lanes: HashMap<i64, VecDeque<Item>>,
    heap: LevelHeap,
    discipline: Discipline,
}

impl QueueCore {
    /// Creates an empty queue.
    #[must_use]
    pub fn new(discipline: Discipline, order: Order) -> Self {
        Self {
            normal: VecDeque::new(),
            lanes: HashMap::new(),
            heap: LevelHeap::new(order),
            discipline,
        }
    }

    /// Creates a queue preloaded with items in the normal lane.
    #[must_use]
    pub fn with_initial(discipline: Discipline, order: Order, items: Vec<Item>) -> Self {
        let mut core = Self::new(discipline, order);
        core.normal.extend(items);
        core
    }

    #[must_use]
    pub const fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Total number of items across the normal lane and all priority lanes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.normal.len() + self.lanes.values().map(VecDeque::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.lanes.is_empty()
    }

    /// Appends items to the tail of the normal lane.
    pub fn enqueue(&mut self, items: impl IntoIterator<Item = Item>) {
        self.normal.extend(items);
    }

    /// Appends items to the tail of the lane for `level`, registering the
    /// level in the heap when the lane transitions from empty. A no-op when
    /// `items` is empty.
    pub fn enqueue_priority(&mut self, level: i64, items: impl IntoIterator<Item = Item>) {
        let mut items = items.into_iter();
        let Some(first) = items.next() else {
            return;
        };
        let lane = self.lanes.entry(level).or_default();
        if lane.is_empty() {
            self.heap.insert(level);
        }
        lane.push_back(first);
        lane.extend(items);
    }

    /// Removes and returns the next item: the head priority lane drains
    /// before the normal lane; FIFO takes from the head, LIFO from the tail.
    pub fn dequeue_one(&mut self) -> Option<Item> {
        match self.heap.head() {
            None => match self.discipline {
                Discipline::Fifo => self.normal.pop_front(),
                Discipline::Lifo => self.normal.pop_back(),
            },
            Some(level) => {
                let lane = self.lanes.get_mut(&level)?;
                if lane.len() == 1 {
                    // Last item of the head level: retire the level first.
                    self.heap.pop_head();
                    let item = lane.pop_front();
                    self.lanes.remove(&level);
                    item
                } else {
                    match self.discipline {
                        Discipline::Fifo => lane.pop_front(),
                        Discipline::Lifo => lane.pop_back(),
                    }
                }
            }
        }
    }

    /// Repeated single dequeues; positions past the pending count come back
    /// absent.
    pub fn dequeue(&mut self, count: usize) -> Vec<Option<Item>> {
        (0..count).map(|_| self.dequeue_one()).collect()
    }

    /// Inserts items into the normal lane at a discipline-symmetric index
    /// (index 0 is always the next-to-dequeue end; see [`insert_at`]).
    pub fn insert(&mut self, index: i64, items: Vec<Item>) {
        insert_at(&mut self.normal, self.discipline, index, items);
    }

    /// As [`QueueCore::insert`] for the lane of `level`. A missing or empty
    /// lane delegates to [`QueueCore::enqueue_priority`].
    pub fn insert_priority(&mut self, level: i64, index: i64, items: Vec<Item>) {
        match self.lanes.get_mut(&level) {
            Some(lane) if !lane.is_empty() => {
                insert_at(lane, self.discipline, index, items);
            }
            _ => self.enqueue_priority(level, items),
        }
    }

    /// Returns the item at a discipline-symmetric index in the normal lane
    /// without removing it; absent when `|index|` is out of range.
    #[must_use]
    pub fn peek(&self, index: i64) -> Option<&Item> {
        peek_at(&self.normal, self.discipline, index)
    }

    /// As [`QueueCore::peek`] for the lane of `level`.
    #[must_use]
    pub fn peek_priority(&self, level: i64, index: i64) -> Option<&Item> {
        peek_at(self.lanes.get(&level)?, self.discipline, index)
    }

    /// Returns the priority level at `index` in the heap; negative indexes
    /// count from the end.
    #[must_use]
    pub fn peek_heap(&self, index: i64) -> Option<i64> {
        self.heap.get(index)
    }

    /// Returns the heap levels in dequeue order.
    #[must_use]
    pub fn heap_snapshot(&self) -> Vec<i64> {
        self.heap.as_slice().to_vec()
    }

    /// Empties all lanes and the heap.
    pub fn clear(&mut self) {
        self.normal.clear();
        self.lanes.clear();
        self.heap.clear();
    }
}

/// Maps a discipline-symmetric index to an insertion gap and splices the
/// items in, preserving their relative order.
///
/// Index 0 always names the next-to-dequeue end: the head under FIFO, the
/// top of the stack (tail) under LIFO. Negative indexes count from the
/// opposite end, as for arrays. Out-of-range indexes clamp to the tail when
/// the index's effective direction runs toward the tail, otherwise to the
/// head.
fn insert_at(lane: &mut VecDeque<Item>, discipline: Discipline, index: i64, items: Vec<Item>) {
    let len = lane.len() as i64;
    let pos = match (discipline, index >= 0) {
        (Discipline::Fifo, true) => index.min(len),
        (Discipline::Fifo, false) => (len + index).max(0),
        (Discipline::Lifo, true) => (len - index).max(0),
        (Discipline::Lifo, false) => index.saturating_neg().min(len),
    } as usize;
    for (offset, item) in items.into_iter().enumerate() {
        lane.insert(pos + offset, item);
    }
}

/// Read-only counterpart of [`insert_at`]: resolves a discipline-symmetric
/// index to an element, or `None` when `|index|` is at or past the length.
fn peek_at(lane: &VecDeque<Item>, discipline: Discipline, index: i64) -> Option<&Item> {
    let len = lane.len() as i64;
    let pos = match (discipline, index >= 0) {
        (Discipline::Fifo, true) => index,
        (Discipline::Fifo, false) => len + index,
        (Discipline::Lifo, true) => len - 1 - index,
        (Discipline::Lifo, false) => index.saturating_neg() - 1,
    };
    if (0..len).contains(&pos) {
        lane.get(pos as usize)
    } else {
        None
    }
}
