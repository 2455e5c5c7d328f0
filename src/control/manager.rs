//! Manager-side queue ownership and the control dispatcher.
//!
//! The manager holds the authoritative state of every registered queue and
//! runs a single dispatcher thread over the shared control socket. Frames
//! are handled one at a time: parse the header, look up the queue, apply
//! the operation, drive the signal/await channels, write the response when
//! the opcode has one. Queue state is touched by no other thread, so no
//! locks guard the registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::control::opcode::Opcode;
use crate::control::wire::{self, ChannelClient, SockReader};
use crate::control::worker::WorkerProxy;
use crate::error::{QueueError, Result};
use crate::ipc::{pair, Doorbell};
use crate::item::{self, Item};
use crate::queue::config::QueueConfig;
use crate::queue::core::QueueCore;
use crate::queue::MAX_DQ_DEPTH;
use crate::trace;

/// Queue identifier, unique within the process and never reused.
pub type QueueId = u64;

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

/// Callback diverting manager-side normal-lane enqueues away from the
/// queue. The diverted item is handed over as received; no doorbell byte is
/// produced for it.
pub type Gather = Box<dyn FnMut(Item) + Send>;

/// One queue as owned by the manager: core state plus the wake-up protocol
/// bookkeeping around it.
struct ManagedQueue {
    core: QueueCore,
    fast: bool,
    /// Latched when a non-blocking dequeue left its doorbell byte
    /// unconsumed; suppresses the next empty-to-non-empty wake-up.
    nb_flag: bool,
    /// Fast mode: pre-signalled dequeues remaining before the next burst.
    dsem: usize,
    /// Await waiters currently blocked.
    asem: usize,
    /// Threshold supplied by the most recent waiter.
    tsem: usize,
    signal: Doorbell,
    awaitch: Option<Doorbell>,
    gather: Option<Gather>,
}

impl ManagedQueue {
    fn new(config: QueueConfig, gather: Option<Gather>) -> Result<Self> {
        let signal = Doorbell::new()?;
        let awaitch = if config.await_enabled {
            Some(Doorbell::new()?)
        } else {
            None
        };
        let preloaded = !config.initial.is_empty();
        let core = QueueCore::with_initial(config.discipline, config.order, config.initial);
        if preloaded {
            signal.ring(1)?;
        }
        Ok(Self {
            core,
            fast: config.fast,
            nb_flag: false,
            dsem: 0,
            asem: 0,
            tsem: 0,
            signal,
            awaitch,
            gather,
        })
    }

    fn pending(&self) -> usize {
        self.core.pending()
    }

    fn peek(&self, index: i64) -> Option<&Item> {
        self.core.peek(index)
    }

    fn peek_priority(&self, level: i64, index: i64) -> Option<&Item> {
        self.core.peek_priority(level, index)
    }

    fn peek_heap(&self, index: i64) -> Option<i64> {
        self.core.peek_heap(index)
    }

    fn heap_snapshot(&self) -> Vec<i64> {
        self.core.heap_snapshot()
    }

    fn enqueue(&mut self, items: Vec<Item>) -> Result<()> {
        if let Some(gather) = &mut self.gather {
            for item in items {
                gather(item);
            }
            return Ok(());
        }
        if items.is_empty() {
            return Ok(());
        }
        let was_empty = self.core.is_empty();
        self.core.enqueue(items);
        self.notify_enqueue(was_empty)
    }

    fn enqueue_priority(&mut self, level: i64, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let was_empty = self.core.is_empty();
        self.core.enqueue_priority(level, items);
        self.notify_enqueue(was_empty)
    }

    fn insert(&mut self, index: i64, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let was_empty = self.core.is_empty();
        self.core.insert(index, items);
        self.notify_enqueue(was_empty)
    }

    fn insert_priority(&mut self, level: i64, index: i64, items: Vec<Item>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let was_empty = self.core.is_empty();
        self.core.insert_priority(level, index, items);
        self.notify_enqueue(was_empty)
    }

    /// Writes the empty-to-non-empty wake-up byte when the last dequeue was
    /// blocking (no stale byte in the channel) and, in fast mode, no burst
    /// is still outstanding.
    fn notify_enqueue(&mut self, was_empty: bool) -> Result<()> {
        if !was_empty || self.nb_flag {
            return Ok(());
        }
        if self.fast && self.dsem != 0 {
            return Ok(());
        }
        self.signal.ring(1)?;
        Ok(())
    }

    /// Dequeues `count` items and drives the doorbell for the next
    /// consumer: slow mode hands off one byte while items remain; fast mode
    /// bursts `min(MAX_DQ_DEPTH, pending / count)` bytes whenever `dsem`
    /// runs out.
    fn dequeue(&mut self, count: usize, blocking: bool) -> Result<Vec<Option<Item>>> {
        if !blocking && self.fast {
            trace::warn!("dequeue_nb is not allowed on a fast-mode queue");
            return Ok(vec![None; count]);
        }
        let out = self.core.dequeue(count);
        let after = self.core.pending();
        if blocking {
            self.nb_flag = false;
            if self.fast {
                if self.dsem <= 1 {
                    let depth = (after / count.max(1)).min(MAX_DQ_DEPTH);
                    if depth > 0 {
                        self.signal.ring(depth)?;
                    }
                    self.dsem = depth;
                } else {
                    self.dsem -= 1;
                }
            } else if after > 0 {
                self.signal.ring(1)?;
            }
        } else if out.iter().any(Option::is_some) {
            // The byte that advertised these items is still in the channel.
            self.nb_flag = true;
        }
        self.release_awaiters()?;
        Ok(out)
    }

    fn clear(&mut self) -> Result<()> {
        if self.fast {
            trace::warn!("clear is not allowed on a fast-mode queue");
            return Ok(());
        }
        self.core.clear();
        // Without the drain the channel would advertise data that no longer
        // exists.
        self.signal.try_drain()?;
        self.nb_flag = false;
        Ok(())
    }

    fn await_threshold(&mut self, threshold: usize) -> Result<()> {
        let Some(awaitch) = &self.awaitch else {
            trace::warn!("await on a queue without an await channel");
            return Ok(());
        };
        self.tsem = threshold;
        if self.core.pending() <= threshold {
            awaitch.ring(1)?;
        } else {
            self.asem += 1;
        }
        Ok(())
    }

    /// Releases all waiters in one burst once pending has dropped to the
    /// recorded threshold.
    fn release_awaiters(&mut self) -> Result<()> {
        if self.asem > 0 && self.core.pending() <= self.tsem {
            if let Some(awaitch) = &self.awaitch {
                awaitch.ring(self.asem)?;
            }
            self.asem = 0;
        }
        Ok(())
    }
}

/// Builds queues and hands out worker proxies; [`Manager::start`] turns it
/// into a running dispatcher.
///
/// ```no_run
/// use relayq::{Manager, Queue, QueueConfig};
///
/// let mut manager = Manager::new()?;
/// let queue = manager.register(QueueConfig::default())?;
/// let handle = manager.start()?;
///
/// queue.enqueue(vec!["job".into()])?;
/// let job = queue.dequeue()?;
/// assert!(job.is_some());
///
/// drop(queue); // last proxy gone: the dispatcher drains and exits
/// handle.join()?;
/// # Ok::<(), relayq::QueueError>(())
/// ```
pub struct Manager {
    registry: HashMap<QueueId, ManagedQueue>,
    server: SockReader,
    client: Arc<ChannelClient>,
}

impl Manager {
    /// Creates a manager with a fresh control channel.
    pub fn new() -> Result<Self> {
        let (server_fd, client_fd) = pair::stream_pair()?;
        Ok(Self {
            registry: HashMap::new(),
            server: SockReader::new(Arc::new(server_fd)),
            client: Arc::new(ChannelClient::new(1, Arc::new(client_fd))),
        })
    }

    /// Registers a queue and returns a cloneable worker-side proxy for it.
    ///
    /// Registration happens before [`Manager::start`]; identifiers are
    /// assigned monotonically and never reused.
    pub fn register(&mut self, config: QueueConfig) -> Result<WorkerProxy> {
        self.register_inner(config, None)
    }

    /// As [`Manager::register`], with a gather callback that replaces
    /// normal-lane enqueue appends on the manager side.
    pub fn register_gather(&mut self, config: QueueConfig, gather: Gather) -> Result<WorkerProxy> {
        self.register_inner(config, Some(gather))
    }

    fn register_inner(&mut self, config: QueueConfig, gather: Option<Gather>) -> Result<WorkerProxy> {
        let fast = config.fast;
        let queue = ManagedQueue::new(config, gather)?;
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        let proxy = WorkerProxy::new(
            id,
            fast,
            queue.signal.listener(),
            queue.awaitch.as_ref().map(Doorbell::listener),
            Arc::clone(&self.client),
        );
        self.registry.insert(id, queue);
        Ok(proxy)
    }

    /// Spawns the dispatcher thread and consumes the manager.
    ///
    /// The dispatcher serves frames until every worker proxy (and clone)
    /// has been dropped, then exits cleanly on the resulting socket EOF.
    pub fn start(self) -> Result<ManagerHandle> {
        let Self {
            registry,
            server,
            client,
        } = self;
        // The dispatcher must not keep a worker-side handle alive, or the
        // control socket would never reach EOF.
        drop(client);
        let thread = thread::Builder::new()
            .name("relayq-manager".into())
            .spawn(move || dispatch(server, registry))?;
        Ok(ManagerHandle { thread })
    }
}

/// Handle on a running dispatcher thread.
pub struct ManagerHandle {
    thread: JoinHandle<Result<()>>,
}

impl ManagerHandle {
    /// Waits for the dispatcher to exit and surfaces its outcome.
    pub fn join(self) -> Result<()> {
        self.thread
            .join()
            .map_err(|_| QueueError::DispatcherPanicked)?
    }
}

fn lookup(registry: &mut HashMap<QueueId, ManagedQueue>, id: QueueId) -> Result<&mut ManagedQueue> {
    registry
        .get_mut(&id)
        .ok_or(QueueError::Protocol("unknown queue id"))
}

fn require_len(value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| QueueError::Protocol("negative payload length"))
}

/// Decodes an insert payload: marker `'0'` is one raw scalar, marker `'1'`
/// a frozen sequence whose elements are all spliced in.
fn decode_insert_payload(buf: Vec<u8>) -> Result<Vec<Item>> {
    match Item::from_wire(buf)? {
        Item::Bytes(raw) => Ok(vec![Item::Bytes(raw)]),
        Item::Frozen(seq) => item::thaw_seq(&seq),
    }
}

fn respond_absent(server: &SockReader) -> Result<()> {
    let mut frame = Vec::new();
    wire::put_int(&mut frame, -1);
    pair::write_all(server.fd(), &frame)?;
    Ok(())
}

fn respond_payload(server: &SockReader, payload: &[u8]) -> Result<()> {
    let mut frame = Vec::with_capacity(payload.len() + 16);
    wire::put_payload(&mut frame, payload);
    pair::write_all(server.fd(), &frame)?;
    Ok(())
}

/// Serves the control socket until EOF.
///
/// Header parse failures are fatal: the stream position is unrecoverable
/// once a frame is malformed. Queue state stays consistent because every
/// mutation happens only after the full frame has been consumed.
fn dispatch(mut server: SockReader, mut registry: HashMap<QueueId, ManagedQueue>) -> Result<()> {
    loop {
        let Some(op) = server.read_tag()? else {
            trace::debug!("control channel drained, dispatcher exiting");
            return Ok(());
        };
        let name = op.name();
        let _chn = server.read_int(name, "channel")?;
        let id = server.read_int(name, "id")? as QueueId;

        match op {
            Opcode::Await => {
                let threshold = server.read_int(name, "threshold")?.max(0) as usize;
                lookup(&mut registry, id)?.await_threshold(threshold)?;
            }
            Opcode::Clear => {
                lookup(&mut registry, id)?.clear()?;
                pair::write_all(server.fd(), b"\n")?;
            }
            Opcode::EnqueueSeq => {
                let len = require_len(server.read_int(name, "length")?)?;
                let payload = server.read_payload(len)?;
                let items = item::thaw_seq(&payload)?;
                lookup(&mut registry, id)?.enqueue(items)?;
            }
            Opcode::EnqueueSeqPriority => {
                let level = server.read_int(name, "priority")?;
                let len = require_len(server.read_int(name, "length")?)?;
                let payload = server.read_payload(len)?;
                let items = item::thaw_seq(&payload)?;
                lookup(&mut registry, id)?.enqueue_priority(level, items)?;
            }
            Opcode::EnqueueRaw => {
                let len = require_len(server.read_int(name, "length")?)?;
                let payload = server.read_payload(len)?;
                lookup(&mut registry, id)?.enqueue(vec![Item::Bytes(payload)])?;
            }
            Opcode::EnqueueRawPriority => {
                let level = server.read_int(name, "priority")?;
                let len = require_len(server.read_int(name, "length")?)?;
                let payload = server.read_payload(len)?;
                lookup(&mut registry, id)?.enqueue_priority(level, vec![Item::Bytes(payload)])?;
            }
            Opcode::Dequeue | Opcode::DequeueNb => {
                let count = server.read_int(name, "count")?;
                let queue = lookup(&mut registry, id)?;
                if count < 1 {
                    trace::warn!("dequeue request with count below 1");
                    respond_absent(&server)?;
                } else if count == 1 {
                    let out = queue.dequeue(1, op == Opcode::Dequeue)?;
                    match out.into_iter().next().flatten() {
                        Some(found) => respond_payload(&server, &found.into_wire())?,
                        None => respond_absent(&server)?,
                    }
                } else {
                    let out = queue.dequeue(count as usize, op == Opcode::Dequeue)?;
                    let mut payload = item::freeze_result_seq(&out)?;
                    payload.push(item::MARKER_FROZEN);
                    respond_payload(&server, &payload)?;
                }
            }
            Opcode::Pending => {
                let pending = lookup(&mut registry, id)?.pending();
                let mut frame = Vec::new();
                wire::put_int(&mut frame, pending as i64);
                pair::write_all(server.fd(), &frame)?;
            }
            Opcode::Insert => {
                let index = server.read_int(name, "index")?;
                let len = require_len(server.read_int(name, "length")?)?;
                let payload = server.read_payload(len)?;
                let items = decode_insert_payload(payload)?;
                lookup(&mut registry, id)?.insert(index, items)?;
            }
            Opcode::InsertPriority => {
                let level = server.read_int(name, "priority")?;
                let index = server.read_int(name, "index")?;
                let len = require_len(server.read_int(name, "length")?)?;
                let payload = server.read_payload(len)?;
                let items = decode_insert_payload(payload)?;
                lookup(&mut registry, id)?.insert_priority(level, index, items)?;
            }
            Opcode::Peek => {
                let index = server.read_int(name, "index")?;
                match lookup(&mut registry, id)?.peek(index).cloned() {
                    Some(found) => respond_payload(&server, &found.into_wire())?,
                    None => respond_absent(&server)?,
                }
            }
            Opcode::PeekPriority => {
                let level = server.read_int(name, "priority")?;
                let index = server.read_int(name, "index")?;
                match lookup(&mut registry, id)?.peek_priority(level, index).cloned() {
                    Some(found) => respond_payload(&server, &found.into_wire())?,
                    None => respond_absent(&server)?,
                }
            }
            Opcode::PeekHeap => {
                let index = server.read_int(name, "index")?;
                match lookup(&mut registry, id)?.peek_heap(index) {
                    Some(level) => respond_payload(&server, level.to_string().as_bytes())?,
                    None => respond_absent(&server)?,
                }
            }
            Opcode::HeapSnapshot => {
                let snapshot = lookup(&mut registry, id)?.heap_snapshot();
                let payload = item::freeze_levels(&snapshot)?;
                respond_payload(&server, &payload)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::config::{Discipline, Order};
    use std::sync::Mutex;

    fn slow_queue() -> ManagedQueue {
        ManagedQueue::new(QueueConfig::default(), None).unwrap()
    }

    fn items(names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| Item::from(*n)).collect()
    }

    #[test]
    fn slow_enqueue_rings_once_on_empty_to_nonempty() {
        let mut queue = slow_queue();
        queue.enqueue(items(&["a"])).unwrap();
        queue.enqueue(items(&["b", "c"])).unwrap();
        assert_eq!(queue.signal.try_drain().unwrap(), 1);
    }

    #[test]
    fn slow_dequeue_hands_off_while_items_remain() {
        let mut queue = slow_queue();
        queue.enqueue(items(&["a", "b", "c"])).unwrap();
        queue.signal.wait().unwrap(); // consumer takes the wake-up

        queue.dequeue(1, true).unwrap();
        assert_eq!(queue.signal.try_drain().unwrap(), 1); // handoff byte

        queue.dequeue(1, true).unwrap();
        queue.signal.try_drain().unwrap();
        queue.dequeue(1, true).unwrap();
        // Last item: no byte left behind.
        assert_eq!(queue.signal.try_drain().unwrap(), 0);
    }

    #[test]
    fn nb_dequeue_latches_and_suppresses_wakeups() {
        let mut queue = slow_queue();
        queue.enqueue(items(&["a"])).unwrap();

        let out = queue.dequeue(1, false).unwrap();
        assert_eq!(out[0], Some(Item::from("a")));
        assert!(queue.nb_flag);

        // The advertised byte is still pending; refills must not add more.
        queue.enqueue(items(&["b"])).unwrap();
        assert_eq!(queue.signal.try_drain().unwrap(), 1);

        // A blocking dequeue resets the latch.
        queue.enqueue(items(&["c"])).unwrap();
        queue.dequeue(1, true).unwrap();
        assert!(!queue.nb_flag);
    }

    #[test]
    fn nb_dequeue_on_empty_queue_leaves_latch_alone() {
        let mut queue = slow_queue();
        let out = queue.dequeue(1, false).unwrap();
        assert_eq!(out, vec![None]);
        assert!(!queue.nb_flag);

        // The wake-up for the next blocking consumer still fires.
        queue.enqueue(items(&["a"])).unwrap();
        assert_eq!(queue.signal.try_drain().unwrap(), 1);
    }

    #[test]
    fn clear_drains_the_pending_byte() {
        let mut queue = slow_queue();
        queue.enqueue(items(&["a", "b"])).unwrap();
        queue.clear().unwrap();
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.signal.try_drain().unwrap(), 0);
    }

    #[test]
    fn preload_pre_writes_one_byte() {
        let queue = ManagedQueue::new(
            QueueConfig::default().with_initial(items(&["a", "b"])),
            None,
        )
        .unwrap();
        assert_eq!(queue.pending(), 2);
        assert_eq!(queue.signal.try_drain().unwrap(), 1);
    }

    fn fast_queue(initial: &[&str]) -> ManagedQueue {
        ManagedQueue::new(
            QueueConfig::default()
                .with_fast(true)
                .with_initial(items(initial)),
            None,
        )
        .unwrap()
    }

    #[test]
    fn fast_drain_writes_items_minus_one_bytes() {
        let names: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut queue = fast_queue(&refs);

        let mut consumed = 0;
        while queue.pending() > 0 {
            queue.signal.wait().unwrap();
            consumed += 1;
            let out = queue.dequeue(1, true).unwrap();
            assert!(out[0].is_some());
        }
        // One pre-written byte plus nine burst bytes woke ten dequeues.
        assert_eq!(consumed, 10);
        assert_eq!(queue.dsem, 0);
        assert_eq!(queue.signal.try_drain().unwrap(), 0);
    }

    #[test]
    fn fast_burst_caps_at_max_depth() {
        let names: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut queue = fast_queue(&refs);

        queue.signal.wait().unwrap();
        queue.dequeue(1, true).unwrap();
        assert_eq!(queue.dsem, MAX_DQ_DEPTH);
        assert_eq!(queue.signal.try_drain().unwrap(), MAX_DQ_DEPTH);
    }

    #[test]
    fn fast_burst_divides_by_count_hint() {
        let names: Vec<String> = (0..11).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut queue = fast_queue(&refs);

        queue.signal.wait().unwrap();
        queue.dequeue(3, true).unwrap();
        // 8 items remain; the hint promises dequeues of 3.
        assert_eq!(queue.dsem, 8 / 3);
        assert_eq!(queue.signal.try_drain().unwrap(), 8 / 3);
    }

    #[test]
    fn fast_mode_rejects_nb_and_clear() {
        let mut queue = fast_queue(&["a", "b"]);
        let out = queue.dequeue(2, false).unwrap();
        assert_eq!(out, vec![None, None]);
        assert_eq!(queue.pending(), 2);

        queue.clear().unwrap();
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn await_releases_waiters_at_threshold() {
        let mut queue = ManagedQueue::new(
            QueueConfig::default().with_await(true),
            None,
        )
        .unwrap();
        queue.enqueue(items(&["a", "b", "c", "d"])).unwrap();

        queue.await_threshold(2).unwrap();
        assert_eq!(queue.awaitch.as_ref().unwrap().try_drain().unwrap(), 0);
        assert_eq!(queue.asem, 1);

        queue.signal.wait().unwrap();
        queue.dequeue(1, true).unwrap(); // pending 3 > 2: still blocked
        assert_eq!(queue.awaitch.as_ref().unwrap().try_drain().unwrap(), 0);

        queue.signal.wait().unwrap();
        queue.dequeue(1, true).unwrap(); // pending 2 <= 2: release
        assert_eq!(queue.awaitch.as_ref().unwrap().try_drain().unwrap(), 1);
        assert_eq!(queue.asem, 0);
    }

    #[test]
    fn await_below_threshold_releases_immediately() {
        let mut queue = ManagedQueue::new(
            QueueConfig::default().with_await(true),
            None,
        )
        .unwrap();
        queue.enqueue(items(&["a"])).unwrap();
        queue.await_threshold(5).unwrap();
        assert_eq!(queue.awaitch.as_ref().unwrap().try_drain().unwrap(), 1);
        assert_eq!(queue.asem, 0);
    }

    #[test]
    fn await_releases_all_waiters_in_one_burst() {
        let mut queue = ManagedQueue::new(
            QueueConfig::default().with_await(true),
            None,
        )
        .unwrap();
        queue.enqueue(items(&["a", "b", "c"])).unwrap();
        queue.await_threshold(0).unwrap();
        queue.await_threshold(0).unwrap();
        assert_eq!(queue.asem, 2);

        queue.signal.wait().unwrap();
        queue.dequeue(3, true).unwrap();
        assert_eq!(queue.awaitch.as_ref().unwrap().try_drain().unwrap(), 2);
    }

    #[test]
    fn gather_diverts_normal_enqueues() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut queue = ManagedQueue::new(
            QueueConfig::default(),
            Some(Box::new(move |item| sink.lock().unwrap().push(item))),
        )
        .unwrap();

        queue.enqueue(items(&["a", "b"])).unwrap();
        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.signal.try_drain().unwrap(), 0);
        assert_eq!(&*seen.lock().unwrap(), &items(&["a", "b"]));

        // Priority enqueues are not diverted.
        queue.enqueue_priority(1, items(&["p"])).unwrap();
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn ordering_options_reach_the_core() {
        let mut queue = ManagedQueue::new(
            QueueConfig::default()
                .with_discipline(Discipline::Lifo)
                .with_order(Order::Lowest),
            None,
        )
        .unwrap();
        queue.enqueue_priority(2, items(&["x", "y"])).unwrap();
        queue.enqueue_priority(1, items(&["p"])).unwrap();
        let out = queue.dequeue(3, true).unwrap();
        assert_eq!(out, vec![
            Some(Item::from("p")),
            Some(Item::from("y")),
            Some(Item::from("x")),
        ]);
    }
}
