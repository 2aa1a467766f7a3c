//! Inklink Image Transfer Protocol
//!
//! This crate defines the serial protocol between a host and the controller
//! of a 400×300 two-color e-paper panel. An image is two 15000-byte planes;
//! each plane is sent as 61 pages of five 64-byte sub-frames, every page
//! protected by a CRC-32 and acknowledged by the device.
//!
//! # Protocol Overview
//!
//! All frames are fixed-length and little-endian:
//! ```text
//! ┌────────┬──────────────────────────────┬────────────┐
//! │ MAGIC  │ FIELDS / PAYLOAD             │ END-MARKER │
//! │ 2B     │ kind-specific                │ 4B         │
//! └────────┴──────────────────────────────┴────────────┘
//! ```
//!
//! | Frame       | Direction     | Length |
//! |-------------|---------------|--------|
//! | Start       | host → device | 10     |
//! | Start reply | device → host | 10     |
//! | Data        | host → device | 64     |
//! | Data reply  | device → host | 6 (no end-marker) |
//! | End         | host → device | 10     |
//! | End reply   | device → host | 8      |

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod crc;
pub mod frame;
pub mod messages;
pub mod status;

pub use crc::{checksum, Crc32};
pub use frame::{FrameError, FrameKind, Schema, MAX_FRAME_SIZE};
pub use messages::{
    ColorPlane, DataFrame, DataReply, EndFrame, EndReply, Slot, StartFrame, StartReply,
};
pub use status::{PageStatus, StartStatus};
