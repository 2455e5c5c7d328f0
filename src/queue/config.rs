//! Queue construction options and process-wide defaults.

use std::sync::OnceLock;

use crate::error::{QueueError, Result};
use crate::item::Item;

/// Numeric constant for [`Discipline::Fifo`].
pub const FIFO: u8 = 1;
/// Alias for [`FIFO`].
pub const LILO: u8 = 1;
/// Numeric constant for [`Discipline::Lifo`].
pub const LIFO: u8 = 0;
/// Alias for [`LIFO`].
pub const FILO: u8 = 0;
/// Numeric constant for [`Order::Highest`].
pub const HIGHEST: u8 = 1;
/// Numeric constant for [`Order::Lowest`].
pub const LOWEST: u8 = 0;

/// Lane order: where dequeues take items from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Discipline {
    /// Dequeue from the head, enqueue at the tail.
    #[default]
    Fifo,
    /// Dequeue from the tail, enqueue at the tail (a stack).
    Lifo,
}

impl TryFrom<u8> for Discipline {
    type Error = QueueError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            FIFO => Ok(Self::Fifo),
            LIFO => Ok(Self::Lifo),
            _ => Err(QueueError::InvalidOption {
                option: "type",
                value,
            }),
        }
    }
}

/// Priority order within the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Larger levels dequeue first.
    #[default]
    Highest,
    /// Smaller levels dequeue first.
    Lowest,
}

impl TryFrom<u8> for Order {
    type Error = QueueError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            HIGHEST => Ok(Self::Highest),
            LOWEST => Ok(Self::Lowest),
            _ => Err(QueueError::InvalidOption {
                option: "porder",
                value,
            }),
        }
    }
}

/// Process-wide defaults applied by [`QueueConfig::default`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults {
    pub order: Order,
    pub discipline: Discipline,
    pub await_enabled: bool,
    pub fast: bool,
}

impl Defaults {
    /// Builds defaults from the numeric option constants, failing fast on
    /// values outside the recognized set.
    pub fn from_numeric(discipline: u8, order: u8, await_enabled: bool, fast: bool) -> Result<Self> {
        Ok(Self {
            order: Order::try_from(order)?,
            discipline: Discipline::try_from(discipline)?,
            await_enabled,
            fast,
        })
    }
}

static DEFAULTS: OnceLock<Defaults> = OnceLock::new();

/// Installs process-wide defaults. May be called at most once, before any
/// queue is constructed with [`QueueConfig::default`].
///
/// # Errors
///
/// Returns [`QueueError::DefaultsInstalled`] on a second installation.
pub fn set_defaults(defaults: Defaults) -> Result<()> {
    DEFAULTS
        .set(defaults)
        .map_err(|_| QueueError::DefaultsInstalled)
}

/// Returns the installed process-wide defaults, or the built-in ones.
#[must_use]
pub fn defaults() -> Defaults {
    DEFAULTS.get().copied().unwrap_or_default()
}

/// Construction options for a queue.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Items preloading the normal lane. On a managed queue a non-empty
    /// preload pre-writes one doorbell byte.
    pub initial: Vec<Item>,
    pub order: Order,
    pub discipline: Discipline,
    /// Allocate the await channel and enable `await_threshold`.
    pub await_enabled: bool,
    /// Amortized wake-up strategy for blocking dequeues; disallows `clear`
    /// and non-blocking dequeues.
    pub fast: bool,
}

impl Default for QueueConfig {
    fn default() -> Self {
        let d = defaults();
        Self {
            initial: Vec::new(),
            order: d.order,
            discipline: d.discipline,
            await_enabled: d.await_enabled,
            fast: d.fast,
        }
    }
}

impl QueueConfig {
    #[must_use]
    pub fn with_initial(mut self, items: Vec<Item>) -> Self {
        self.initial = items;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_discipline(mut self, discipline: Discipline) -> Self {
        self.discipline = discipline;
        self
    }

    #[must_use]
    pub fn with_await(mut self, enabled: bool) -> Self {
        self.await_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }
}
