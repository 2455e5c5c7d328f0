//! Frame plumbing for the control socket.
//!
//! Requests and responses are self-delimited: ASCII decimal header fields
//! terminated by `\n`, then payload bytes read by declared length. The
//! reader buffers its socket; writers assemble a whole frame in memory and
//! push it with one retried write so frames from different threads never
//! interleave.

use std::os::fd::{AsFd, BorrowedFd, OwnedFd};
use std::sync::{Arc, Mutex};

use crate::control::opcode::Opcode;
use crate::error::{QueueError, Result};
use crate::ipc::pair;

/// Longest accepted header line (decimal fields are far shorter).
const MAX_LINE: usize = 64;

/// Buffered reader over one end of the control socket.
///
/// Also carries the descriptor used for writing responses (manager side) or
/// requests (worker side), so a locked reader is everything a transaction
/// needs.
#[derive(Debug)]
pub struct SockReader {
    fd: Arc<OwnedFd>,
    buf: Box<[u8]>,
    pos: usize,
    end: usize,
}

impl SockReader {
    #[must_use]
    pub fn new(fd: Arc<OwnedFd>) -> Self {
        Self {
            fd,
            buf: vec![0u8; 8 * 1024].into_boxed_slice(),
            pos: 0,
            end: 0,
        }
    }

    /// The underlying descriptor, for writing the other half of a
    /// transaction.
    #[must_use]
    pub fn fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }

    /// Refills the buffer; returns 0 on peer close.
    fn fill(&mut self) -> Result<usize> {
        debug_assert!(self.pos == self.end);
        self.pos = 0;
        self.end = pair::read_some(self.fd.as_fd(), &mut self.buf)?;
        Ok(self.end)
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.pos == self.end && self.fill()? == 0 {
            return Ok(None);
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }

    /// Reads the opcode line that starts a request frame.
    ///
    /// Returns `None` on a clean close at a frame boundary (every worker
    /// handle dropped); close mid-tag is an error.
    pub fn read_tag(&mut self) -> Result<Option<Opcode>> {
        let mut tag = [0u8; Opcode::TAG_LEN + 1];
        for (i, slot) in tag.iter_mut().enumerate() {
            match self.next_byte()? {
                Some(byte) => *slot = byte,
                None if i == 0 => return Ok(None),
                None => return Err(QueueError::Disconnected),
            }
        }
        if tag[Opcode::TAG_LEN] != b'\n' {
            return Err(QueueError::Protocol("opcode not newline-terminated"));
        }
        match Opcode::parse(&tag[..Opcode::TAG_LEN]) {
            Some(op) => Ok(Some(op)),
            None => Err(QueueError::Protocol("unknown opcode")),
        }
    }

    /// Reads one `\n`-terminated header line, excluding the newline.
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        loop {
            match self.next_byte()? {
                None => return Err(QueueError::Disconnected),
                Some(b'\n') => return Ok(line),
                Some(byte) => {
                    if line.len() >= MAX_LINE {
                        return Err(QueueError::Protocol("header line too long"));
                    }
                    line.push(byte);
                }
            }
        }
    }

    /// Reads a decimal integer field. `op` and `arg` name the call site in
    /// the error.
    pub fn read_int(&mut self, op: &'static str, arg: &'static str) -> Result<i64> {
        let line = self.read_line()?;
        std::str::from_utf8(&line)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(QueueError::NotAnInteger { op, arg })
    }

    /// Reads a response length field: `None` for `-1` (absent).
    pub fn read_len(&mut self, op: &'static str) -> Result<Option<usize>> {
        match self.read_int(op, "length")? {
            -1 => Ok(None),
            n if n >= 0 => Ok(Some(n as usize)),
            _ => Err(QueueError::Protocol("negative payload length")),
        }
    }

    /// Reads exactly `len` payload bytes.
    pub fn read_payload(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut payload = vec![0u8; len];
        let mut filled = 0;
        // Serve from the buffer first, then straight off the socket.
        while filled < len && self.pos < self.end {
            payload[filled] = self.buf[self.pos];
            self.pos += 1;
            filled += 1;
        }
        if filled < len {
            pair::read_exact(self.fd.as_fd(), &mut payload[filled..]).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    QueueError::Disconnected
                } else {
                    QueueError::Io(e)
                }
            })?;
        }
        Ok(payload)
    }
}

/// Appends a decimal integer header field.
pub fn put_int(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(value.to_string().as_bytes());
    buf.push(b'\n');
}

/// Appends an opcode line.
pub fn put_tag(buf: &mut Vec<u8>, op: Opcode) {
    buf.extend_from_slice(op.tag());
    buf.push(b'\n');
}

/// Appends a length field followed by the payload bytes.
pub fn put_payload(buf: &mut Vec<u8>, payload: &[u8]) {
    put_int(buf, payload.len() as i64);
    buf.extend_from_slice(payload);
}

/// Worker side of the shared control channel.
///
/// Many worker threads write on one socket; the mutex serializes a request
/// frame and, for response-bearing operations, the response read that
/// follows it.
#[derive(Debug)]
pub struct ChannelClient {
    /// Channel number carried in every request header.
    pub(crate) chn: u32,
    pub(crate) lock: Mutex<SockReader>,
}

impl ChannelClient {
    #[must_use]
    pub(crate) fn new(chn: u32, fd: Arc<OwnedFd>) -> Self {
        Self {
            chn,
            lock: Mutex::new(SockReader::new(fd)),
        }
    }
}
