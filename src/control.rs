//! Control protocol between workers and the manager.

pub mod manager;
pub mod opcode;
pub mod wire;
pub mod worker;

pub use manager::{Gather, Manager, ManagerHandle, QueueId};
pub use opcode::Opcode;
pub use worker::WorkerProxy;
