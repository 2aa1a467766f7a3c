//! Frame schemas and the generic frame codec.
//!
//! Every frame kind is a fixed-length record:
//! - MAGIC (2 bytes, offset 0): direction tag, `0xA5A5` host→device, `0x5A5A` device→host
//! - FIELDS: little-endian integers at fixed offsets, listed in the kind's [`Schema`]
//! - PAYLOAD (data frames only): raw bytes from a fixed offset
//! - END-MARKER (4 bytes, last): `0xA5A5AFAF` host→device, `0x5A5A5F5F` device→host;
//!   the data reply has none
//!
//! Encoding and decoding go through [`Schema::encode`] and [`Schema::decode`]
//! for every kind, so length, magic and end-marker checks live in one place.

use heapless::Vec;

/// Leading magic of host→device frames
pub const MAGIC_HOST: u16 = 0xA5A5;

/// Leading magic of device→host frames
pub const MAGIC_DEVICE: u16 = 0x5A5A;

/// Trailing end-marker of host→device frames
pub const END_MARKER_HOST: u32 = 0xA5A5_AFAF;

/// Trailing end-marker of device→host frames
pub const END_MARKER_DEVICE: u32 = 0x5A5A_5F5F;

/// Largest frame of any kind (the data frame)
pub const MAX_FRAME_SIZE: usize = 64;

/// Most integer fields any schema declares
pub const MAX_FIELDS: usize = 5;

const MAGIC_LEN: usize = 2;
const END_MARKER_LEN: usize = 4;

/// Decoded field values, in schema order
pub type FieldValues = Vec<u32, MAX_FIELDS>;

/// Errors that can occur during frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Input is not exactly the kind's frame length
    Length { expected: usize, actual: usize },
    /// Leading magic does not match the expected direction
    Magic { expected: u16, found: u16 },
    /// Trailing end-marker does not match the expected direction
    EndMarker { expected: u32, found: u32 },
    /// A field value does not fit its width or is not a legal value
    InvalidField { field: &'static str, value: u32 },
    /// Wrong number of field values supplied for encoding
    FieldCount { expected: usize, actual: usize },
    /// Payload exceeds the kind's payload region
    PayloadTooLarge { capacity: usize, actual: usize },
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::Length { expected, actual } => {
                write!(f, "frame length {actual}, expected {expected}")
            }
            FrameError::Magic { expected, found } => {
                write!(f, "bad magic 0x{found:04X}, expected 0x{expected:04X}")
            }
            FrameError::EndMarker { expected, found } => {
                write!(f, "bad end-marker 0x{found:08X}, expected 0x{expected:08X}")
            }
            FrameError::InvalidField { field, value } => {
                write!(f, "invalid value 0x{value:X} for field `{field}`")
            }
            FrameError::FieldCount { expected, actual } => {
                write!(f, "{actual} field values supplied, schema has {expected}")
            }
            FrameError::PayloadTooLarge { capacity, actual } => {
                write!(f, "payload of {actual} bytes exceeds {capacity}-byte region")
            }
            FrameError::BufferTooSmall => write!(f, "buffer too small for frame"),
        }
    }
}

/// Which side emitted a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    HostToDevice,
    DeviceToHost,
}

impl Direction {
    pub const fn magic(self) -> u16 {
        match self {
            Direction::HostToDevice => MAGIC_HOST,
            Direction::DeviceToHost => MAGIC_DEVICE,
        }
    }

    pub const fn end_marker(self) -> u32 {
        match self {
            Direction::HostToDevice => END_MARKER_HOST,
            Direction::DeviceToHost => END_MARKER_DEVICE,
        }
    }
}

/// Integer field width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Width {
    U8,
    U16,
    U32,
}

impl Width {
    /// Width in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Width::U8 => 1,
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }

    /// Largest value the width can hold
    pub const fn max(self) -> u32 {
        match self {
            Width::U8 => u8::MAX as u32,
            Width::U16 => u16::MAX as u32,
            Width::U32 => u32::MAX,
        }
    }
}

/// One integer field of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Byte offset from the start of the frame
    pub offset: usize,
    pub width: Width,
}

impl Field {
    const fn new(name: &'static str, offset: usize, width: Width) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    fn span(&self) -> core::ops::Range<usize> {
        self.offset..self.offset + self.width.bytes()
    }
}

/// Frame kinds of the transfer protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    Start,
    StartReply,
    Data,
    DataReply,
    End,
    EndReply,
}

impl FrameKind {
    /// Layout of this kind
    pub fn schema(self) -> &'static Schema {
        match self {
            FrameKind::Start => &START,
            FrameKind::StartReply => &START_REPLY,
            FrameKind::Data => &DATA,
            FrameKind::DataReply => &DATA_REPLY,
            FrameKind::End => &END,
            FrameKind::EndReply => &END_REPLY,
        }
    }

    /// Total frame length in bytes
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> usize {
        self.schema().len
    }
}

/// Fixed layout of one frame kind
#[derive(Debug)]
pub struct Schema {
    pub kind: FrameKind,
    /// Total frame length
    pub len: usize,
    pub direction: Direction,
    /// Whether the final 4 bytes carry the direction's end-marker
    pub end_marker: bool,
    /// Integer fields in wire order
    pub fields: &'static [Field],
    /// Offset of the raw payload region, which runs to the end of the frame
    pub payload: Option<usize>,
}

/// Start frame: magic, command|slot, color|slot, pad, end-marker
pub static START: Schema = Schema {
    kind: FrameKind::Start,
    len: 10,
    direction: Direction::HostToDevice,
    end_marker: true,
    fields: &[
        Field::new("command", 2, Width::U16),
        Field::new("color", 4, Width::U8),
        Field::new("pad", 5, Width::U8),
    ],
    payload: None,
};

/// Start reply: magic, command, status, reserved, end-marker
pub static START_REPLY: Schema = Schema {
    kind: FrameKind::StartReply,
    len: 10,
    direction: Direction::DeviceToHost,
    end_marker: true,
    fields: &[
        Field::new("command", 2, Width::U16),
        Field::new("status", 4, Width::U8),
        Field::new("reserved", 5, Width::U8),
    ],
    payload: None,
};

/// Data sub-frame: magic, command, color|slot, page, sub-frame, pad, payload, end-marker
pub static DATA: Schema = Schema {
    kind: FrameKind::Data,
    len: 64,
    direction: Direction::HostToDevice,
    end_marker: true,
    fields: &[
        Field::new("command", 2, Width::U16),
        Field::new("color", 4, Width::U8),
        Field::new("page", 5, Width::U8),
        Field::new("subframe", 6, Width::U8),
        Field::new("pad", 7, Width::U8),
    ],
    payload: Some(8),
};

/// Page reply: magic, command, page, status (no end-marker)
pub static DATA_REPLY: Schema = Schema {
    kind: FrameKind::DataReply,
    len: 6,
    direction: Direction::DeviceToHost,
    end_marker: false,
    fields: &[
        Field::new("command", 2, Width::U16),
        Field::new("page", 4, Width::U8),
        Field::new("status", 5, Width::U8),
    ],
    payload: None,
};

/// End frame: magic, command|slot, slot, pad, end-marker
pub static END: Schema = Schema {
    kind: FrameKind::End,
    len: 10,
    direction: Direction::HostToDevice,
    end_marker: true,
    fields: &[
        Field::new("command", 2, Width::U16),
        Field::new("slot", 4, Width::U8),
        Field::new("pad", 5, Width::U8),
    ],
    payload: None,
};

/// End reply: magic, command, slot, end-marker
///
/// Eight bytes leave room for one-byte command and slot fields only.
pub static END_REPLY: Schema = Schema {
    kind: FrameKind::EndReply,
    len: 8,
    direction: Direction::DeviceToHost,
    end_marker: true,
    fields: &[
        Field::new("command", 2, Width::U8),
        Field::new("slot", 3, Width::U8),
    ],
    payload: None,
};

impl Schema {
    /// Bytes of payload the encoder accepts
    ///
    /// The end-marker is written last, so anything placed in the final
    /// 4 bytes of the region is overwritten on the wire.
    pub const fn payload_capacity(&self) -> usize {
        match self.payload {
            Some(offset) => self.len - offset,
            None => 0,
        }
    }

    /// Bytes of payload that survive on the wire
    pub const fn payload_len(&self) -> usize {
        match self.payload {
            Some(offset) if self.end_marker => self.len - END_MARKER_LEN - offset,
            Some(offset) => self.len - offset,
            None => 0,
        }
    }

    /// Encode a frame into `buf`
    ///
    /// `values` must list one value per schema field, in order.
    /// Returns the number of bytes written.
    pub fn encode(
        &self,
        values: &[u32],
        payload: &[u8],
        buf: &mut [u8],
    ) -> Result<usize, FrameError> {
        if buf.len() < self.len {
            return Err(FrameError::BufferTooSmall);
        }
        if values.len() != self.fields.len() {
            return Err(FrameError::FieldCount {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        if payload.len() > self.payload_capacity() {
            return Err(FrameError::PayloadTooLarge {
                capacity: self.payload_capacity(),
                actual: payload.len(),
            });
        }

        let frame = &mut buf[..self.len];
        frame.fill(0);
        frame[..MAGIC_LEN].copy_from_slice(&self.direction.magic().to_le_bytes());

        for (field, &value) in self.fields.iter().zip(values) {
            if value > field.width.max() {
                return Err(FrameError::InvalidField {
                    field: field.name,
                    value,
                });
            }
            write_le(&mut frame[field.span()], value);
        }

        if let Some(offset) = self.payload {
            frame[offset..offset + payload.len()].copy_from_slice(payload);
        }

        if self.end_marker {
            frame[self.len - END_MARKER_LEN..]
                .copy_from_slice(&self.direction.end_marker().to_le_bytes());
        }

        Ok(self.len)
    }

    /// Validate a frame and extract its field values
    ///
    /// Checks length first, then magic, then the end-marker if the kind has one.
    pub fn decode(&self, bytes: &[u8]) -> Result<FieldValues, FrameError> {
        if bytes.len() != self.len {
            return Err(FrameError::Length {
                expected: self.len,
                actual: bytes.len(),
            });
        }

        let magic = read_le(&bytes[..MAGIC_LEN]) as u16;
        if magic != self.direction.magic() {
            return Err(FrameError::Magic {
                expected: self.direction.magic(),
                found: magic,
            });
        }

        if self.end_marker {
            let found = read_le(&bytes[self.len - END_MARKER_LEN..]);
            if found != self.direction.end_marker() {
                return Err(FrameError::EndMarker {
                    expected: self.direction.end_marker(),
                    found,
                });
            }
        }

        let mut values = FieldValues::new();
        for field in self.fields {
            values
                .push(read_le(&bytes[field.span()]))
                .map_err(|_| FrameError::BufferTooSmall)?;
        }
        Ok(values)
    }

    /// Payload bytes of an already validated frame
    pub fn payload<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        match self.payload {
            Some(offset) => frame.get(offset..offset + self.payload_len()).unwrap_or(&[]),
            None => &[],
        }
    }
}

fn write_le(dst: &mut [u8], value: u32) {
    let bytes = value.to_le_bytes();
    dst.copy_from_slice(&bytes[..dst.len()]);
}

fn read_le(src: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes[..src.len()].copy_from_slice(src);
    u32::from_le_bytes(bytes)
}
