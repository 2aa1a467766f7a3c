//! Inklink Hardware Abstraction Layer
//!
//! This crate defines the byte-stream seam between the transfer engine and
//! whatever carries its bytes: a USB serial adapter, a serial-to-TCP bridge,
//! or a scripted link in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Transfer session (inklink-core)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  inklink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   IoSerial    │       │ test doubles  │
//! │ (std feature) │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialTx`], [`serial::SerialRx`], [`serial::Serial`] - Byte stream I/O
//! - [`embedded_hal::delay::DelayNs`] - Re-exported for back-off waits

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

pub mod serial;

#[cfg(feature = "std")]
pub mod delay;

pub use embedded_hal::delay::DelayNs;
pub use serial::{Serial, SerialError, SerialRx, SerialTx};

#[cfg(feature = "std")]
pub use delay::StdDelay;
#[cfg(feature = "std")]
pub use serial::IoSerial;
