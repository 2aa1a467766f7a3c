//! State machine for an image transfer
//!
//! The machine only decides what happens next; exchanging frames is the
//! job of [`crate::session::Transfer`]. It is explicit, finite, and
//! deterministic.

pub mod events;
pub mod machine;

pub use events::TransferEvent;
pub use machine::{Step, TransferState};
