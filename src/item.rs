//! Queue items: raw scalars and frozen structured values.
//!
//! Every value carried through a lane is either a byte string
//! ([`Item::Bytes`]) or a postcard-serialized structured value
//! ([`Item::Frozen`]). Lanes and the manager store both forms verbatim; the
//! receiving side decides whether to thaw based on a one-byte wire marker
//! appended to single-value payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{QueueError, Result};

/// Wire marker: the payload is a raw scalar.
pub const MARKER_BYTES: u8 = b'0';

/// Wire marker: the payload is a frozen structured value.
pub const MARKER_FROZEN: u8 = b'1';

/// A single queue value.
///
/// `Bytes` travels verbatim. `Frozen` holds a postcard blob produced by
/// [`Item::freeze`] and must be thawed with [`Item::thaw`] on receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    /// Raw scalar bytes.
    Bytes(Vec<u8>),
    /// Serialized structured value.
    Frozen(Vec<u8>),
}

impl Item {
    /// Creates a raw scalar item.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(data.into())
    }

    /// Freezes a structured value into an item.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Codec`] if serialization fails.
    pub fn freeze<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::Frozen(postcard::to_allocvec(value)?))
    }

    /// Thaws a frozen item back into its structured value.
    ///
    /// # Errors
    ///
    /// - [`QueueError::NotFrozen`] if the item is a raw scalar
    /// - [`QueueError::Codec`] if deserialization fails
    pub fn thaw<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Frozen(bytes) => Ok(postcard::from_bytes(bytes)?),
            Self::Bytes(_) => Err(QueueError::NotFrozen),
        }
    }

    /// Returns the raw payload bytes, frozen or not.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(b) | Self::Frozen(b) => b,
        }
    }

    /// Returns the wire marker byte for this item's kind.
    #[must_use]
    pub const fn marker(&self) -> u8 {
        match self {
            Self::Bytes(_) => MARKER_BYTES,
            Self::Frozen(_) => MARKER_FROZEN,
        }
    }

    /// Consumes the item into a single-value wire payload: the raw bytes
    /// with the marker appended. The marker is part of the declared length.
    #[must_use]
    pub fn into_wire(self) -> Vec<u8> {
        let marker = self.marker();
        let mut buf = match self {
            Self::Bytes(b) | Self::Frozen(b) => b,
        };
        buf.push(marker);
        buf
    }

    /// Rebuilds an item from a single-value wire payload (bytes + marker).
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Protocol`] on an empty payload or an unknown
    /// marker byte.
    pub fn from_wire(mut buf: Vec<u8>) -> Result<Self> {
        match buf.pop() {
            Some(MARKER_BYTES) => Ok(Self::Bytes(buf)),
            Some(MARKER_FROZEN) => Ok(Self::Frozen(buf)),
            Some(_) => Err(QueueError::Protocol("unknown payload marker")),
            None => Err(QueueError::Protocol("empty payload")),
        }
    }
}

impl From<Vec<u8>> for Item {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<&[u8]> for Item {
    fn from(data: &[u8]) -> Self {
        Self::Bytes(data.to_vec())
    }
}

impl From<&str> for Item {
    fn from(data: &str) -> Self {
        Self::Bytes(data.as_bytes().to_vec())
    }
}

impl From<String> for Item {
    fn from(data: String) -> Self {
        Self::Bytes(data.into_bytes())
    }
}

/// Freezes a sequence of items into one payload (multi-item enqueue and
/// insert frames).
pub fn freeze_seq(items: &[Item]) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(items)?)
}

/// Thaws a sequence payload back into items.
pub fn thaw_seq(buf: &[u8]) -> Result<Vec<Item>> {
    Ok(postcard::from_bytes(buf)?)
}

/// Freezes a dequeue result sequence; absent trailing positions are kept.
pub fn freeze_result_seq(items: &[Option<Item>]) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(items)?)
}

/// Thaws a dequeue result sequence.
pub fn thaw_result_seq(buf: &[u8]) -> Result<Vec<Option<Item>>> {
    Ok(postcard::from_bytes(buf)?)
}

/// Freezes a heap snapshot (sequence of priority levels).
pub fn freeze_levels(levels: &[i64]) -> Result<Vec<u8>> {
    Ok(postcard::to_allocvec(levels)?)
}

/// Thaws a heap snapshot.
pub fn thaw_levels(buf: &[u8]) -> Result<Vec<i64>> {
    Ok(postcard::from_bytes(buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        a: u32,
        b: String,
    }

    #[test]
    fn freeze_thaw_roundtrip() {
        let msg = Sample {
            a: 7,
            b: "seven".into(),
        };
        let item = Item::freeze(&msg).unwrap();
        assert_eq!(item.marker(), MARKER_FROZEN);
        assert_eq!(item.thaw::<Sample>().unwrap(), msg);
    }

    #[test]
    fn thaw_rejects_raw_scalar() {
        let item = Item::bytes(b"raw".as_slice());
        assert!(matches!(
            item.thaw::<Sample>(),
            Err(QueueError::NotFrozen)
        ));
    }

    #[test]
    fn wire_marker_roundtrip() {
        let raw = Item::bytes(b"hello".as_slice());
        let wire = raw.clone().into_wire();
        assert_eq!(wire.last(), Some(&MARKER_BYTES));
        assert_eq!(Item::from_wire(wire).unwrap(), raw);

        let frozen = Item::freeze(&42u64).unwrap();
        let wire = frozen.clone().into_wire();
        assert_eq!(wire.last(), Some(&MARKER_FROZEN));
        assert_eq!(Item::from_wire(wire).unwrap(), frozen);
    }

    #[test]
    fn wire_rejects_garbage() {
        assert!(Item::from_wire(Vec::new()).is_err());
        assert!(Item::from_wire(vec![b'x', b'9']).is_err());
    }

    #[test]
    fn sequence_roundtrip() {
        let items = vec![
            Item::bytes(b"a".as_slice()),
            Item::freeze(&(1u8, 2u8)).unwrap(),
        ];
        let buf = freeze_seq(&items).unwrap();
        assert_eq!(thaw_seq(&buf).unwrap(), items);
    }

    #[test]
    fn result_sequence_keeps_absent_tail() {
        let out = vec![Some(Item::bytes(b"x".as_slice())), None, None];
        let buf = freeze_result_seq(&out).unwrap();
        assert_eq!(thaw_result_seq(&buf).unwrap(), out);
    }
}
