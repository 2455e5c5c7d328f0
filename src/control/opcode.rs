//! Operation codes for the control protocol.
//!
//! Every request frame starts with a fixed 5-character ASCII tag followed
//! by a newline. The tag's first letter groups the operation (A/S enqueue,
//! D dequeue, I insert, P peek, ...), the suffix selects the target lane
//! family (`QUE` normal, `QUP` priority, `QUN` non-blocking, `QUH` heap).

/// A control-protocol operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `W~QUE` — block the caller until pending drops to a threshold.
    Await,
    /// `C~QUE` — clear all lanes.
    Clear,
    /// `A~QUE` — enqueue a frozen sequence to the normal lane.
    EnqueueSeq,
    /// `A~QUP` — enqueue a frozen sequence to a priority lane.
    EnqueueSeqPriority,
    /// `S~QUE` — enqueue one raw scalar to the normal lane.
    EnqueueRaw,
    /// `S~QUP` — enqueue one raw scalar to a priority lane.
    EnqueueRawPriority,
    /// `D~QUE` — blocking dequeue.
    Dequeue,
    /// `D~QUN` — non-blocking dequeue.
    DequeueNb,
    /// `N~QUE` — pending count.
    Pending,
    /// `I~QUE` — insert into the normal lane.
    Insert,
    /// `I~QUP` — insert into a priority lane.
    InsertPriority,
    /// `P~QUE` — peek the normal lane.
    Peek,
    /// `P~QUP` — peek a priority lane.
    PeekPriority,
    /// `P~QUH` — peek a heap level.
    PeekHeap,
    /// `H~QUE` — snapshot of the heap levels.
    HeapSnapshot,
}

impl Opcode {
    /// Length of every tag on the wire, excluding the newline.
    pub const TAG_LEN: usize = 5;

    /// The wire tag for this operation.
    #[must_use]
    pub const fn tag(self) -> &'static [u8; Self::TAG_LEN] {
        match self {
            Self::Await => b"W~QUE",
            Self::Clear => b"C~QUE",
            Self::EnqueueSeq => b"A~QUE",
            Self::EnqueueSeqPriority => b"A~QUP",
            Self::EnqueueRaw => b"S~QUE",
            Self::EnqueueRawPriority => b"S~QUP",
            Self::Dequeue => b"D~QUE",
            Self::DequeueNb => b"D~QUN",
            Self::Pending => b"N~QUE",
            Self::Insert => b"I~QUE",
            Self::InsertPriority => b"I~QUP",
            Self::Peek => b"P~QUE",
            Self::PeekPriority => b"P~QUP",
            Self::PeekHeap => b"P~QUH",
            Self::HeapSnapshot => b"H~QUE",
        }
    }

    /// Parses a wire tag.
    #[must_use]
    pub fn parse(tag: &[u8]) -> Option<Self> {
        const ALL: [Opcode; 15] = [
            Opcode::Await,
            Opcode::Clear,
            Opcode::EnqueueSeq,
            Opcode::EnqueueSeqPriority,
            Opcode::EnqueueRaw,
            Opcode::EnqueueRawPriority,
            Opcode::Dequeue,
            Opcode::DequeueNb,
            Opcode::Pending,
            Opcode::Insert,
            Opcode::InsertPriority,
            Opcode::Peek,
            Opcode::PeekPriority,
            Opcode::PeekHeap,
            Opcode::HeapSnapshot,
        ];
        ALL.into_iter().find(|op| op.tag() == tag)
    }

    /// Human-readable operation name for error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Await => "await",
            Self::Clear => "clear",
            Self::EnqueueSeq | Self::EnqueueRaw => "enqueue",
            Self::EnqueueSeqPriority | Self::EnqueueRawPriority => "enqueuep",
            Self::Dequeue => "dequeue",
            Self::DequeueNb => "dequeue_nb",
            Self::Pending => "pending",
            Self::Insert => "insert",
            Self::InsertPriority => "insertp",
            Self::Peek => "peek",
            Self::PeekPriority => "peekp",
            Self::PeekHeap => "peekh",
            Self::HeapSnapshot => "heap",
        }
    }
}
