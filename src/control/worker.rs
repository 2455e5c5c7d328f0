//! Worker-side proxy for a managed queue.
//!
//! Every operation frames a request and pushes it down the shared control
//! socket; response-bearing operations keep the channel lock until the
//! reply has been read so transactions never interleave. A blocking dequeue
//! first parks on the queue's signal channel, outside the lock, and only
//! then issues the request.

use std::sync::{Arc, MutexGuard, PoisonError};

use crate::control::manager::QueueId;
use crate::control::opcode::Opcode;
use crate::control::wire::{self, ChannelClient, SockReader};
use crate::error::{QueueError, Result};
use crate::ipc::{pair, DoorbellListener};
use crate::item::{self, Item};
use crate::queue::Queue;
use crate::trace;

/// Cloneable handle on a queue owned by a manager.
///
/// Clones share the control channel and the queue's signal/await sockets,
/// so one registration can serve any number of worker threads; the handle
/// also survives `fork()` through the inherited descriptors.
#[derive(Debug, Clone)]
pub struct WorkerProxy {
    id: QueueId,
    fast: bool,
    signal: DoorbellListener,
    awaitch: Option<DoorbellListener>,
    channel: Arc<ChannelClient>,
}

impl WorkerProxy {
    pub(crate) fn new(
        id: QueueId,
        fast: bool,
        signal: DoorbellListener,
        awaitch: Option<DoorbellListener>,
        channel: Arc<ChannelClient>,
    ) -> Self {
        Self {
            id,
            fast,
            signal,
            awaitch,
            channel,
        }
    }

    /// The manager-assigned queue identifier.
    #[must_use]
    pub fn id(&self) -> QueueId {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, SockReader> {
        self.channel
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a request frame: opcode, channel number, queue id.
    fn header(&self, op: Opcode) -> Vec<u8> {
        let mut frame = Vec::with_capacity(64);
        wire::put_tag(&mut frame, op);
        wire::put_int(&mut frame, i64::from(self.channel.chn));
        wire::put_int(&mut frame, self.id as i64);
        frame
    }

    /// Pushes a fire-and-forget frame.
    fn send(&self, frame: &[u8]) -> Result<()> {
        let chan = self.lock();
        pair::write_all(chan.fd(), frame)?;
        Ok(())
    }

    fn read_single_reply(chan: &mut SockReader, op: &'static str) -> Result<Option<Item>> {
        match chan.read_len(op)? {
            None => Ok(None),
            Some(len) => Item::from_wire(chan.read_payload(len)?).map(Some),
        }
    }

    /// Sends a dequeue request and reads the reply under one lock hold.
    fn exchange_dequeue(&self, count: usize, op: Opcode) -> Result<Vec<Option<Item>>> {
        let mut frame = self.header(op);
        wire::put_int(&mut frame, count as i64);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        if count == 1 {
            Ok(vec![Self::read_single_reply(&mut chan, op.name())?])
        } else {
            let len = chan
                .read_len(op.name())?
                .ok_or(QueueError::Protocol("missing sequence payload"))?;
            let mut payload = chan.read_payload(len)?;
            match payload.pop() {
                Some(item::MARKER_FROZEN) => item::thaw_result_seq(&payload),
                _ => Err(QueueError::Protocol("sequence payload without marker")),
            }
        }
    }
}

/// A lone raw scalar travels as-is (`S~QUE` framing, marker `'0'`);
/// everything else becomes a frozen sequence with marker `'1'`.
fn encode_insert_payload(items: Vec<Item>) -> Result<Vec<u8>> {
    if matches!(items.as_slice(), [Item::Bytes(_)]) {
        let mut items = items;
        return Ok(items.remove(0).into_wire());
    }
    let mut payload = item::freeze_seq(&items)?;
    payload.push(item::MARKER_FROZEN);
    Ok(payload)
}

impl Queue for WorkerProxy {
    fn enqueue(&self, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut frame;
        if matches!(items.as_slice(), [Item::Bytes(_)]) {
            frame = self.header(Opcode::EnqueueRaw);
            if let Some(Item::Bytes(raw)) = items.into_iter().next() {
                wire::put_payload(&mut frame, &raw);
            }
        } else {
            frame = self.header(Opcode::EnqueueSeq);
            let payload = item::freeze_seq(&items)?;
            wire::put_payload(&mut frame, &payload);
        }
        self.send(&frame)
    }

    fn enqueue_priority(&self, level: i64, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let mut frame;
        if matches!(items.as_slice(), [Item::Bytes(_)]) {
            frame = self.header(Opcode::EnqueueRawPriority);
            wire::put_int(&mut frame, level);
            if let Some(Item::Bytes(raw)) = items.into_iter().next() {
                wire::put_payload(&mut frame, &raw);
            }
        } else {
            frame = self.header(Opcode::EnqueueSeqPriority);
            wire::put_int(&mut frame, level);
            let payload = item::freeze_seq(&items)?;
            wire::put_payload(&mut frame, &payload);
        }
        self.send(&frame)
    }

    fn dequeue(&self) -> Result<Option<Item>> {
        self.signal.wait()?;
        let mut out = self.exchange_dequeue(1, Opcode::Dequeue)?;
        Ok(out.pop().flatten())
    }

    fn dequeue_many(&self, count: usize) -> Result<Vec<Option<Item>>> {
        if count < 1 {
            return Err(QueueError::InvalidCount(count as i64));
        }
        self.signal.wait()?;
        self.exchange_dequeue(count, Opcode::Dequeue)
    }

    fn dequeue_nb(&self) -> Result<Option<Item>> {
        if self.fast {
            trace::warn!("dequeue_nb is not allowed on a fast-mode queue");
            return Ok(None);
        }
        let mut out = self.exchange_dequeue(1, Opcode::DequeueNb)?;
        Ok(out.pop().flatten())
    }

    fn dequeue_nb_many(&self, count: usize) -> Result<Vec<Option<Item>>> {
        if count < 1 {
            return Err(QueueError::InvalidCount(count as i64));
        }
        if self.fast {
            trace::warn!("dequeue_nb is not allowed on a fast-mode queue");
            return Ok(vec![None; count]);
        }
        self.exchange_dequeue(count, Opcode::DequeueNb)
    }

    fn insert(&self, index: i64, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let payload = encode_insert_payload(items)?;
        let mut frame = self.header(Opcode::Insert);
        wire::put_int(&mut frame, index);
        wire::put_payload(&mut frame, &payload);
        self.send(&frame)
    }

    fn insert_priority(&self, level: i64, index: i64, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let payload = encode_insert_payload(items)?;
        let mut frame = self.header(Opcode::InsertPriority);
        wire::put_int(&mut frame, level);
        wire::put_int(&mut frame, index);
        wire::put_payload(&mut frame, &payload);
        self.send(&frame)
    }

    fn peek(&self, index: i64) -> Result<Option<Item>> {
        let mut frame = self.header(Opcode::Peek);
        wire::put_int(&mut frame, index);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        Self::read_single_reply(&mut chan, "peek")
    }

    fn peek_priority(&self, level: i64, index: i64) -> Result<Option<Item>> {
        let mut frame = self.header(Opcode::PeekPriority);
        wire::put_int(&mut frame, level);
        wire::put_int(&mut frame, index);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        Self::read_single_reply(&mut chan, "peekp")
    }

    fn peek_heap(&self, index: i64) -> Result<Option<i64>> {
        let mut frame = self.header(Opcode::PeekHeap);
        wire::put_int(&mut frame, index);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        match chan.read_len("peekh")? {
            None => Ok(None),
            Some(len) => {
                let payload = chan.read_payload(len)?;
                std::str::from_utf8(&payload)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .map(Some)
                    .ok_or(QueueError::NotAnInteger {
                        op: "peekh",
                        arg: "level",
                    })
            }
        }
    }

    fn heap_snapshot(&self) -> Result<Vec<i64>> {
        let frame = self.header(Opcode::HeapSnapshot);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        let len = chan
            .read_len("heap")?
            .ok_or(QueueError::Protocol("missing heap payload"))?;
        let payload = chan.read_payload(len)?;
        item::thaw_levels(&payload)
    }

    fn pending(&self) -> Result<usize> {
        let frame = self.header(Opcode::Pending);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        let count = chan.read_int("pending", "count")?;
        usize::try_from(count).map_err(|_| QueueError::Protocol("negative pending count"))
    }

    fn clear(&self) -> Result<()> {
        if self.fast {
            trace::warn!("clear is not allowed on a fast-mode queue");
            return Ok(());
        }
        let frame = self.header(Opcode::Clear);
        let mut chan = self.lock();
        pair::write_all(chan.fd(), &frame)?;
        // Synchronous: the manager acknowledges with one byte.
        chan.read_payload(1)?;
        Ok(())
    }

    fn await_threshold(&self, threshold: usize) -> Result<()> {
        let Some(awaitch) = &self.awaitch else {
            return Err(QueueError::AwaitDisabled);
        };
        let mut frame = self.header(Opcode::Await);
        wire::put_int(&mut frame, threshold as i64);
        self.send(&frame)?;
        // Park outside the channel lock; the release byte arrives once
        // pending has dropped to the threshold.
        awaitch.wait()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::manager::Manager;
    use crate::queue::config::QueueConfig;

    #[test]
    fn dequeue_many_rejects_zero_count() {
        let mut manager = Manager::new().unwrap();
        let queue = manager.register(QueueConfig::default()).unwrap();
        assert!(matches!(
            queue.dequeue_many(0),
            Err(QueueError::InvalidCount(0))
        ));
        assert!(matches!(
            queue.dequeue_nb_many(0),
            Err(QueueError::InvalidCount(0))
        ));
    }

    #[test]
    fn fast_proxy_short_circuits_nb_and_clear() {
        // No dispatcher is running: these must not touch the socket.
        let mut manager = Manager::new().unwrap();
        let queue = manager
            .register(QueueConfig::default().with_fast(true))
            .unwrap();
        assert!(queue.dequeue_nb().unwrap().is_none());
        assert_eq!(queue.dequeue_nb_many(3).unwrap(), vec![None, None, None]);
        queue.clear().unwrap();
    }

    #[test]
    fn await_requires_the_channel() {
        let mut manager = Manager::new().unwrap();
        let queue = manager.register(QueueConfig::default()).unwrap();
        assert!(matches!(
            queue.await_threshold(4),
            Err(QueueError::AwaitDisabled)
        ));
    }

    #[test]
    fn clones_share_the_queue_id() {
        let mut manager = Manager::new().unwrap();
        let queue = manager.register(QueueConfig::default()).unwrap();
        let clone = queue.clone();
        assert_eq!(queue.id(), clone.id());
    }
}
