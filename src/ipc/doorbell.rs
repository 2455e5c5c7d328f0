//! Counting doorbell over a socket pair.
//!
//! The manager is the sole writer; any number of workers compete to read.
//! Each byte wakes exactly one blocked reader, which is what makes the
//! channel usable as a wake-up token between a serial producer of
//! notifications and a pool of blocked consumers. The queue's signal and
//! await channels are both instances of this type; how many bytes are in
//! flight at once is the caller's protocol.
//!
//! Workers receive a [`DoorbellListener`], which holds only the read end:
//! when the owning queue is destroyed the write end closes and every
//! blocked listener fails out with `UnexpectedEof`.

use std::io;
use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::sync::Arc;

use rustix::io::Errno;
use rustix::net::{recv, RecvFlags};

use crate::ipc::pair;

fn wait_on(rx: &OwnedFd) -> io::Result<()> {
    let mut byte = [0u8; 1];
    pair::read_exact(rx.as_fd(), &mut byte)
}

/// Write side of a wake-up channel, held by the queue's owner.
#[derive(Debug)]
pub struct Doorbell {
    tx: Arc<OwnedFd>,
    rx: Arc<OwnedFd>,
}

impl Doorbell {
    /// Creates a doorbell over a fresh socket pair.
    pub fn new() -> io::Result<Self> {
        let (tx, rx) = pair::stream_pair()?;
        Ok(Self {
            tx: Arc::new(tx),
            rx: Arc::new(rx),
        })
    }

    /// Hands out a read-only end for a worker.
    #[must_use]
    pub fn listener(&self) -> DoorbellListener {
        DoorbellListener {
            rx: Arc::clone(&self.rx),
        }
    }

    /// Writes `count` wake-up bytes in one burst.
    pub fn ring(&self, count: usize) -> io::Result<()> {
        const BURST: [u8; 64] = [b'\n'; 64];
        let mut left = count;
        while left > 0 {
            let n = left.min(BURST.len());
            pair::write_all(self.tx.as_fd(), &BURST[..n])?;
            left -= n;
        }
        Ok(())
    }

    /// Blocks until one wake-up byte arrives and consumes it.
    pub fn wait(&self) -> io::Result<()> {
        wait_on(&self.rx)
    }

    /// Drains any pending bytes without blocking; returns how many were
    /// consumed.
    pub fn try_drain(&self) -> io::Result<usize> {
        let mut drained = 0;
        let mut buf = [0u8; 64];
        loop {
            match recv(self.rx.as_fd(), &mut buf[..], RecvFlags::DONTWAIT) {
                Ok((0, _)) => return Ok(drained),
                Ok((n, _)) => drained += n,
                Err(Errno::AGAIN) => return Ok(drained),
                Err(Errno::INTR) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Read-only end of a [`Doorbell`], cloneable across worker threads.
#[derive(Debug, Clone)]
pub struct DoorbellListener {
    rx: Arc<OwnedFd>,
}

impl DoorbellListener {
    /// Blocks until one wake-up byte arrives and consumes it.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` when the write end has been closed (the
    /// owning queue was destroyed).
    pub fn wait(&self) -> io::Result<()> {
        wait_on(&self.rx)
    }

    /// Read-end descriptor, for callers that select over several channels.
    #[must_use]
    pub fn reader(&self) -> BorrowedFd<'_> {
        self.rx.as_fd()
    }
}
