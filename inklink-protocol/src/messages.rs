//! Typed frames of the image transfer protocol
//!
//! Frames are divided into two categories:
//! - Host → Device: start, data sub-frame, end
//! - Device → Host: start reply, page reply, end reply
//!
//! Both directions can be encoded and decoded; the host only needs half of
//! each, the other half serves device simulators and tests.

use crate::frame::{FrameError, DATA, DATA_REPLY, END, END_REPLY, START, START_REPLY};
use crate::status::{PageStatus, StartStatus};

// Command bytes: Host → Device
pub const CMD_TRANSFER_START: u8 = 0xC0;
pub const CMD_TRANSFER_END: u8 = 0xC1;
pub const CMD_IMAGE_DATA: u8 = 0xD0;

// Color plane tags, OR'd with the slot
pub const COLOR_TAG_PRIMARY: u8 = 0x00;
pub const COLOR_TAG_ACCENT: u8 = 0x10;

const SLOT_MASK: u8 = 0x0F;
const COMMAND_MASK: u32 = 0xFFF0;

/// Device-side image buffer index (0-15)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot(u8);

impl Slot {
    /// Highest slot number
    pub const MAX: u8 = 15;

    /// Create a slot from the low nibble of `value`
    pub const fn new(value: u8) -> Self {
        Self(value & SLOT_MASK)
    }

    /// Create a slot, rejecting values above [`Slot::MAX`]
    pub fn try_new(value: u8) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

/// One of the two 1-bit planes of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorPlane {
    /// Black/white plane, sent first
    Primary,
    /// Red/white plane, sent second
    Accent,
}

impl ColorPlane {
    /// Planes in transfer order
    pub const ALL: [ColorPlane; 2] = [ColorPlane::Primary, ColorPlane::Accent];

    /// Wire tag of this plane
    pub const fn tag(self) -> u8 {
        match self {
            ColorPlane::Primary => COLOR_TAG_PRIMARY,
            ColorPlane::Accent => COLOR_TAG_ACCENT,
        }
    }

    /// Parse a plane from its wire tag
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            COLOR_TAG_PRIMARY => Some(ColorPlane::Primary),
            COLOR_TAG_ACCENT => Some(ColorPlane::Accent),
            _ => None,
        }
    }

    /// Plane sent after this one, if any
    pub fn next(self) -> Option<Self> {
        match self {
            ColorPlane::Primary => Some(ColorPlane::Accent),
            ColorPlane::Accent => None,
        }
    }

    /// Plane tag combined with the slot nibble
    pub const fn color_byte(self, slot: Slot) -> u8 {
        self.tag() | slot.get()
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorPlane::Primary => "primary",
            ColorPlane::Accent => "accent",
        }
    }
}

impl core::fmt::Display for ColorPlane {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Split a color byte into plane and slot
pub fn split_color_byte(byte: u8) -> Result<(ColorPlane, Slot), FrameError> {
    let plane = ColorPlane::from_tag(byte & !SLOT_MASK).ok_or(FrameError::InvalidField {
        field: "color",
        value: u32::from(byte),
    })?;
    Ok((plane, Slot::new(byte)))
}

// Start and end commands share the 0xC_ family once the slot is OR'd in
fn expect_command(value: u32, command: u8) -> Result<(), FrameError> {
    if value & COMMAND_MASK != u32::from(command) & COMMAND_MASK {
        return Err(FrameError::InvalidField {
            field: "command",
            value,
        });
    }
    Ok(())
}

/// Opens the transfer of one plane into a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartFrame {
    pub slot: Slot,
    pub plane: ColorPlane,
}

impl StartFrame {
    pub fn command(&self) -> u8 {
        CMD_TRANSFER_START | self.slot.get()
    }

    /// Encode into `buf`, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        START.encode(
            &[
                u32::from(self.command()),
                u32::from(self.plane.color_byte(self.slot)),
                0,
            ],
            &[],
            buf,
        )
    }

    /// Parse a start frame (for device simulation)
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let values = START.decode(bytes)?;
        expect_command(values[0], CMD_TRANSFER_START)?;
        let (plane, slot) = split_color_byte(values[1] as u8)?;
        Ok(Self { slot, plane })
    }
}

/// One of the five sub-frames carrying a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFrame<'a> {
    pub slot: Slot,
    pub plane: ColorPlane,
    /// Page number, 1-based
    pub page: u8,
    /// Sub-frame number within the page, 1-based
    pub subframe: u8,
    pub payload: &'a [u8],
}

impl<'a> DataFrame<'a> {
    /// Encode into `buf`, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        DATA.encode(
            &[
                u32::from(CMD_IMAGE_DATA),
                u32::from(self.plane.color_byte(self.slot)),
                u32::from(self.page),
                u32::from(self.subframe),
                0,
            ],
            self.payload,
            buf,
        )
    }

    /// Parse a data frame (for device simulation)
    ///
    /// The payload is the part not covered by the end-marker.
    pub fn decode(bytes: &'a [u8]) -> Result<Self, FrameError> {
        let values = DATA.decode(bytes)?;
        expect_command(values[0], CMD_IMAGE_DATA)?;
        let (plane, slot) = split_color_byte(values[1] as u8)?;
        Ok(Self {
            slot,
            plane,
            page: values[2] as u8,
            subframe: values[3] as u8,
            payload: DATA.payload(bytes),
        })
    }
}

/// Closes the transfer of both planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndFrame {
    pub slot: Slot,
}

impl EndFrame {
    pub fn command(&self) -> u8 {
        CMD_TRANSFER_END | self.slot.get()
    }

    /// Encode into `buf`, returning the number of bytes written
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        END.encode(
            &[u32::from(self.command()), u32::from(self.slot.get()), 0],
            &[],
            buf,
        )
    }

    /// Parse an end frame (for device simulation)
    ///
    /// For odd slots the end frame is byte-identical to a primary-plane start
    /// frame, so the receiver picks the decoder from its own transfer state.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let values = END.decode(bytes)?;
        expect_command(values[0], CMD_TRANSFER_END)?;
        Ok(Self {
            slot: Slot::new(values[1] as u8),
        })
    }
}

/// Device answer to a start frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StartReply {
    /// Command echoed by the device
    pub command: u16,
    pub status: StartStatus,
    pub reserved: u8,
}

impl StartReply {
    /// Reply to `frame` with `status`
    pub fn to(frame: &StartFrame, status: StartStatus) -> Self {
        Self {
            command: u16::from(frame.command()),
            status,
            reserved: 0,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let values = START_REPLY.decode(bytes)?;
        Ok(Self {
            command: values[0] as u16,
            status: StartStatus::from_byte(values[1] as u8),
            reserved: values[2] as u8,
        })
    }

    /// Encode as the device would
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        START_REPLY.encode(
            &[
                u32::from(self.command),
                u32::from(self.status.to_byte()),
                u32::from(self.reserved),
            ],
            &[],
            buf,
        )
    }
}

/// Device answer to the sub-frames of one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataReply {
    /// Command echoed by the device
    pub command: u16,
    /// Page the reply refers to
    pub page: u8,
    pub status: PageStatus,
}

impl DataReply {
    /// Reply for `page` with `status`
    pub fn for_page(page: u8, status: PageStatus) -> Self {
        Self {
            command: u16::from(CMD_IMAGE_DATA),
            page,
            status,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let values = DATA_REPLY.decode(bytes)?;
        Ok(Self {
            command: values[0] as u16,
            page: values[1] as u8,
            status: PageStatus::from_byte(values[2] as u8),
        })
    }

    /// Encode as the device would
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        DATA_REPLY.encode(
            &[
                u32::from(self.command),
                u32::from(self.page),
                u32::from(self.status.to_byte()),
            ],
            &[],
            buf,
        )
    }
}

/// Device answer to the end frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndReply {
    /// Command echoed by the device
    pub command: u8,
    pub slot: u8,
}

impl EndReply {
    /// Reply to `frame`
    pub fn to(frame: &EndFrame) -> Self {
        Self {
            command: frame.command(),
            slot: frame.slot.get(),
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let values = END_REPLY.decode(bytes)?;
        Ok(Self {
            command: values[0] as u8,
            slot: values[1] as u8,
        })
    }

    /// Encode as the device would
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        END_REPLY.encode(
            &[u32::from(self.command), u32::from(self.slot)],
            &[],
            buf,
        )
    }
}
