//! Blocking Unix socket pairs with retried transfers.
//!
//! All control and doorbell traffic runs over `socketpair(2)` in blocking
//! mode. Reads and writes retry `EINTR` and short transfers until the
//! requested byte count has moved, so callers never observe partial frames.

use std::io;
use std::os::fd::{BorrowedFd, OwnedFd};

use rustix::io::Errno;
use rustix::net::{socketpair, AddressFamily, SocketFlags, SocketType};

/// Creates a connected stream socket pair.
///
/// # Errors
///
/// Returns an error if the kernel refuses the pair (e.g., descriptor
/// limits).
pub fn stream_pair() -> io::Result<(OwnedFd, OwnedFd)> {
    let (a, b) = socketpair(
        AddressFamily::UNIX,
        SocketType::STREAM,
        SocketFlags::CLOEXEC,
        None,
    )?;
    Ok((a, b))
}

/// Writes the whole buffer, retrying interrupts and short writes.
pub fn write_all(fd: BorrowedFd<'_>, buf: &[u8]) -> io::Result<()> {
    let mut sent = 0;
    while sent < buf.len() {
        match rustix::io::write(fd, &buf[sent..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "socket write returned zero",
                ))
            }
            Ok(n) => sent += n,
            Err(Errno::INTR) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Fills the whole buffer, retrying interrupts and short reads.
///
/// # Errors
///
/// Returns `UnexpectedEof` if the peer closes before the buffer fills.
pub fn read_exact(fd: BorrowedFd<'_>, buf: &mut [u8]) -> io::Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match rustix::io::read(fd, &mut buf[filled..]) {
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof)),
            Ok(n) => filled += n,
            Err(Errno::INTR) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Reads whatever is available into `buf`, blocking until at least one byte
/// arrives. Returns 0 on peer close.
pub fn read_some(fd: BorrowedFd<'_>, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match rustix::io::read(fd, &mut *buf) {
            Ok(n) => return Ok(n),
            Err(Errno::INTR) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::AsFd;

    #[test]
    fn pair_transfers_bytes() {
        let (a, b) = stream_pair().unwrap();
        write_all(a.as_fd(), b"hello").unwrap();
        let mut buf = [0u8; 5];
        read_exact(b.as_fd(), &mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn read_exact_reports_eof() {
        let (a, b) = stream_pair().unwrap();
        drop(a);
        let mut buf = [0u8; 1];
        let err = read_exact(b.as_fd(), &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_some_returns_zero_on_close() {
        let (a, b) = stream_pair().unwrap();
        drop(a);
        let mut buf = [0u8; 8];
        assert_eq!(read_some(b.as_fd(), &mut buf).unwrap(), 0);
    }
}
