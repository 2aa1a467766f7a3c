//! Board-agnostic transfer logic for inklink
//!
//! This crate contains everything between an image buffer and the serial
//! link that does not depend on a particular transport:
//!
//! - Image planes and test patterns
//! - Page segmentation (pages, sub-frames, page checksums)
//! - Bounded retry policy
//! - State machine for a two-plane transfer
//! - Session driver running the machine over a [`inklink_hal::Serial`] link

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod image;
pub mod pattern;
pub mod retry;
pub mod segment;
pub mod session;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::TransferConfig;
pub use error::{StepError, TransferError};
pub use image::{Image, Plane, PlaneError, PLANE_SIZE};
pub use pattern::Pattern;
pub use session::{Transfer, TransferReport};
pub use state::{Step, TransferEvent, TransferState};
