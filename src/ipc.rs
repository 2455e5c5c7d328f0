//! Inter-process plumbing: blocking socket pairs and doorbell channels.

pub mod doorbell;
pub mod pair;

pub use doorbell::{Doorbell, DoorbellListener};
