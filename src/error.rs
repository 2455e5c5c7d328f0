//! Error types shared across the crate.

use std::io;

use thiserror::Error;

/// Result alias for queue operations.
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors produced by queue operations, the wire protocol, and the
/// underlying sockets.
#[derive(Debug, Error)]
pub enum QueueError {
    /// A wire field that must be a decimal integer failed to parse.
    #[error("queue: {op}: {arg} is not an integer")]
    NotAnInteger {
        op: &'static str,
        arg: &'static str,
    },

    /// `dequeue` was called with a count below one.
    #[error("queue: dequeue: count must be at least 1, got {0}")]
    InvalidCount(i64),

    /// `await_threshold` on a queue built without an await channel.
    #[error("queue: await: queue was constructed without an await channel")]
    AwaitDisabled,

    /// An option constant outside the recognized values.
    #[error("queue: {option}: invalid value {value}")]
    InvalidOption { option: &'static str, value: u8 },

    /// Process-wide defaults were installed twice.
    #[error("queue: process-wide defaults already installed")]
    DefaultsInstalled,

    /// A frame violated the protocol (bad opcode, header, or length).
    #[error("protocol violation: {0}")]
    Protocol(&'static str),

    /// Thawing was requested on a raw scalar value.
    #[error("value is a raw scalar, not a frozen value")]
    NotFrozen,

    /// Freezing or thawing a structured value failed.
    #[error("freeze/thaw failed: {0}")]
    Codec(#[from] postcard::Error),

    /// The control channel was closed by the peer.
    #[error("control channel closed by peer")]
    Disconnected,

    /// The dispatcher thread died with a panic instead of an error.
    #[error("manager dispatcher panicked")]
    DispatcherPanicked,

    /// Socket I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
