//! Hybrid shared queue for multi-process parallel execution.
//!
//! One *manager* owns the authoritative state of every queue; any number of
//! *worker* threads or processes enqueue, dequeue, insert, peek, and await
//! quiescence through cloneable proxies over socket pairs. The same queue
//! type also runs **standalone**, with all state local to one process.
//!
//! "Hybrid" means a single queue carries both an unprioritized normal lane
//! and any number of priority lanes keyed by arbitrary integers, drained
//! ahead of the normal lane in a configurable order.
//!
//! # Quick start
//!
//! ```no_run
//! use std::thread;
//!
//! use relayq::{Manager, Queue, QueueConfig};
//!
//! let mut manager = Manager::new()?;
//! let queue = manager.register(QueueConfig::default())?;
//! let handle = manager.start()?;
//!
//! let consumer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || queue.dequeue())
//! };
//!
//! queue.enqueue(vec!["work".into()])?;
//! let got = consumer.join().expect("consumer panicked")?;
//! assert_eq!(got, Some("work".into()));
//!
//! drop(queue);
//! handle.join()?;
//! # Ok::<(), relayq::QueueError>(())
//! ```
//!
//! # Wake-up protocol
//!
//! Blocked consumers park on a per-queue doorbell socket. In the default
//! (slow) mode at most one byte is ever in flight: enqueues ring it when
//! the queue turns non-empty and each dequeue hands it off while items
//! remain. Fast mode pre-signals up to [`MAX_DQ_DEPTH`] bytes per burst to
//! amortize wake-ups, at the cost of disallowing `clear` and non-blocking
//! dequeues.

pub mod control;
pub mod error;
pub mod ipc;
pub mod item;
pub mod queue;
pub mod trace;

pub use control::{Gather, Manager, ManagerHandle, QueueId, WorkerProxy};
pub use error::{QueueError, Result};
pub use item::Item;
pub use queue::config::{
    defaults, set_defaults, Defaults, Discipline, Order, QueueConfig, FIFO, FILO, HIGHEST, LIFO,
    LILO, LOWEST,
};
pub use queue::{Queue, StandaloneQueue, MAX_DQ_DEPTH};
pub use trace::init_tracing;
