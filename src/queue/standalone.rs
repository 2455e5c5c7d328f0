//! Queue implementation for a single process, no manager involved.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{QueueError, Result};
use crate::item::Item;
use crate::queue::config::QueueConfig;
use crate::queue::core::QueueCore;
use crate::queue::Queue;
use crate::trace;

/// All-local queue: every operation goes straight to the in-memory state,
/// no sockets are allocated.
///
/// Blocking dequeues degrade to their non-blocking form — with a single
/// owner there is no second party that could ever produce a wake-up.
/// Likewise `await_threshold` returns as soon as it is called; only the
/// caller itself could lower the pending count.
#[derive(Debug)]
pub struct StandaloneQueue {
    state: Mutex<QueueCore>,
    fast: bool,
    await_enabled: bool,
}

impl StandaloneQueue {
    /// Builds a local queue from the configuration.
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            fast: config.fast,
            await_enabled: config.await_enabled,
            state: Mutex::new(QueueCore::with_initial(
                config.discipline,
                config.order,
                config.initial,
            )),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueCore> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Queue for StandaloneQueue {
    fn enqueue(&self, items: Vec<Item>) -> Result<()> {
        self.lock().enqueue(items);
        Ok(())
    }

    fn enqueue_priority(&self, level: i64, items: Vec<Item>) -> Result<()> {
        self.lock().enqueue_priority(level, items);
        Ok(())
    }

    fn dequeue(&self) -> Result<Option<Item>> {
        Ok(self.lock().dequeue_one())
    }

    fn dequeue_many(&self, count: usize) -> Result<Vec<Option<Item>>> {
        if count < 1 {
            return Err(QueueError::InvalidCount(count as i64));
        }
        Ok(self.lock().dequeue(count))
    }

    fn dequeue_nb(&self) -> Result<Option<Item>> {
        if self.fast {
            trace::warn!("dequeue_nb is not allowed on a fast-mode queue");
            return Ok(None);
        }
        Ok(self.lock().dequeue_one())
    }

    fn dequeue_nb_many(&self, count: usize) -> Result<Vec<Option<Item>>> {
        if count < 1 {
            return Err(QueueError::InvalidCount(count as i64));
        }
        if self.fast {
            trace::warn!("dequeue_nb is not allowed on a fast-mode queue");
            return Ok(vec![None; count]);
        }
        Ok(self.lock().dequeue(count))
    }

    fn insert(&self, index: i64, items: Vec<Item>) -> Result<()> {
        self.lock().insert(index, items);
        Ok(())
    }

    fn insert_priority(&self, level: i64, index: i64, items: Vec<Item>) -> Result<()> {
        self.lock().insert_priority(level, index, items);
        Ok(())
    }

    fn peek(&self, index: i64) -> Result<Option<Item>> {
        Ok(self.lock().peek(index).cloned())
    }

    fn peek_priority(&self, level: i64, index: i64) -> Result<Option<Item>> {
        Ok(self.lock().peek_priority(level, index).cloned())
    }

    fn peek_heap(&self, index: i64) -> Result<Option<i64>> {
        Ok(self.lock().peek_heap(index))
    }

    fn heap_snapshot(&self) -> Result<Vec<i64>> {
        Ok(self.lock().heap_snapshot())
    }

    fn pending(&self) -> Result<usize> {
        Ok(self.lock().pending())
    }

    fn clear(&self) -> Result<()> {
        if self.fast {
            trace::warn!("clear is not allowed on a fast-mode queue");
            return Ok(());
        }
        self.lock().clear();
        Ok(())
    }

    fn await_threshold(&self, _threshold: usize) -> Result<()> {
        if !self.await_enabled {
            return Err(QueueError::AwaitDisabled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::config::{Discipline, Order};

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| Item::from(*n)).collect()
    }

    #[test]
    fn local_fifo_roundtrip() {
        let queue = StandaloneQueue::new(QueueConfig::default());
        queue.enqueue(items(&["1", "2", "3", "4"])).unwrap();
        assert_eq!(queue.pending().unwrap(), 4);
        for expected in ["1", "2", "3", "4"] {
            assert_eq!(queue.dequeue().unwrap(), Some(Item::from(expected)));
        }
        assert_eq!(queue.dequeue().unwrap(), None);
    }

    #[test]
    fn local_lifo_with_nb_tail() {
        let queue = StandaloneQueue::new(
            QueueConfig::default().with_discipline(Discipline::Lifo),
        );
        queue.enqueue(items(&["1", "2", "3", "4"])).unwrap();
        assert_eq!(
            queue.dequeue_many(2).unwrap(),
            vec![Some(Item::from("4")), Some(Item::from("3"))]
        );
        assert_eq!(queue.dequeue().unwrap(), Some(Item::from("2")));
        assert_eq!(queue.dequeue_nb().unwrap(), Some(Item::from("1")));
        assert_eq!(queue.dequeue_nb().unwrap(), None);
    }

    #[test]
    fn local_priority_order() {
        let queue = StandaloneQueue::new(QueueConfig::default());
        queue.enqueue_priority(5, items(&["a"])).unwrap();
        queue.enqueue_priority(6, items(&["b"])).unwrap();
        queue.enqueue_priority(4, items(&["c"])).unwrap();
        queue.enqueue(items(&["z"])).unwrap();
        assert_eq!(queue.heap_snapshot().unwrap(), vec![6, 5, 4]);
        for expected in ["b", "a", "c", "z"] {
            assert_eq!(queue.dequeue().unwrap(), Some(Item::from(expected)));
        }
    }

    #[test]
    fn local_lowest_order() {
        let queue = StandaloneQueue::new(
            QueueConfig::default().with_order(Order::Lowest),
        );
        queue.enqueue_priority(5, items(&["hi"])).unwrap();
        queue.enqueue_priority(2, items(&["lo"])).unwrap();
        assert_eq!(queue.peek_heap(0).unwrap(), Some(2));
        assert_eq!(queue.dequeue().unwrap(), Some(Item::from("lo")));
    }

    #[test]
    fn local_mode_violations_are_noops() {
        let queue = StandaloneQueue::new(QueueConfig::default().with_fast(true));
        queue.enqueue(items(&["a"])).unwrap();
        assert_eq!(queue.dequeue_nb().unwrap(), None);
        queue.clear().unwrap();
        assert_eq!(queue.pending().unwrap(), 1);
    }

    #[test]
    fn local_await_gating() {
        let gated = StandaloneQueue::new(QueueConfig::default());
        assert!(matches!(
            gated.await_threshold(0),
            Err(QueueError::AwaitDisabled)
        ));

        let open = StandaloneQueue::new(QueueConfig::default().with_await(true));
        open.enqueue(items(&["a"])).unwrap();
        open.await_threshold(0).unwrap();
    }

    #[test]
    fn local_insert_and_peek() {
        let queue = StandaloneQueue::new(QueueConfig::default());
        queue.enqueue(items(&["1", "2", "3", "4"])).unwrap();
        queue.insert(1, items(&["foo", "bar"])).unwrap();
        assert_eq!(queue.peek(1).unwrap(), Some(Item::from("foo")));
        assert_eq!(queue.peek(-1).unwrap(), Some(Item::from("4")));
        let drained: Vec<_> = (0..6).map(|_| queue.dequeue().unwrap().unwrap()).collect();
        assert_eq!(drained, items(&["1", "foo", "bar", "2", "3", "4"]));
    }

    #[test]
    fn local_preload() {
        let queue = StandaloneQueue::new(
            QueueConfig::default().with_initial(items(&["seed"])),
        );
        assert_eq!(queue.pending().unwrap(), 1);
        assert_eq!(queue.dequeue().unwrap(), Some(Item::from("seed")));
    }
}
