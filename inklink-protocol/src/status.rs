//! Reply status codes
//!
//! Status bytes are decoded into tagged variants so callers match
//! exhaustively instead of comparing raw integers. Decoding is total:
//! every byte maps to a variant, and `to_byte` gives the same byte back.

// Start reply wire values
pub const START_STATUS_OK: u8 = 0x01;
pub const START_STATUS_BUSY: u8 = 0x02;
pub const START_STATUS_ERROR: u8 = 0xFF;

// Page reply wire values
pub const PAGE_STATUS_OK: u8 = 0x00;
pub const PAGE_STATUS_CRC_ERROR: u8 = 0x10;
pub const PAGE_STATUS_MISSING_SUBFRAME: u8 = 0x20;
pub const PAGE_STATUS_TIMEOUT: u8 = 0x30;

const FAMILY_MASK: u8 = 0xF0;
const DETAIL_MASK: u8 = 0x0F;

/// Device answer to a start frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartStatus {
    /// Ready to receive the plane
    Ok,
    /// Device busy; retry after a pause
    Busy,
    /// Device refused the transfer
    Error,
    /// Any other byte
    Unknown(u8),
}

impl StartStatus {
    /// Parse a status from its wire format byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            START_STATUS_OK => StartStatus::Ok,
            START_STATUS_BUSY => StartStatus::Busy,
            START_STATUS_ERROR => StartStatus::Error,
            other => StartStatus::Unknown(other),
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            StartStatus::Ok => START_STATUS_OK,
            StartStatus::Busy => START_STATUS_BUSY,
            StartStatus::Error => START_STATUS_ERROR,
            StartStatus::Unknown(byte) => byte,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, StartStatus::Ok)
    }
}

/// Device answer to the five sub-frames of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PageStatus {
    /// Page stored
    Ok,
    /// `0x1_`: page checksum did not match; low nibble is device detail
    CrcError(u8),
    /// `0x2_`: the numbered sub-frame never arrived
    MissingSubframe(u8),
    /// `0x30`: device gave up waiting for sub-frames
    Timeout,
    /// Any other byte
    Unknown(u8),
}

impl PageStatus {
    /// Parse a status from its wire format byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            PAGE_STATUS_OK => PageStatus::Ok,
            PAGE_STATUS_TIMEOUT => PageStatus::Timeout,
            b if b & FAMILY_MASK == PAGE_STATUS_CRC_ERROR => PageStatus::CrcError(b & DETAIL_MASK),
            b if b & FAMILY_MASK == PAGE_STATUS_MISSING_SUBFRAME => {
                PageStatus::MissingSubframe(b & DETAIL_MASK)
            }
            other => PageStatus::Unknown(other),
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            PageStatus::Ok => PAGE_STATUS_OK,
            PageStatus::CrcError(detail) => PAGE_STATUS_CRC_ERROR | (detail & DETAIL_MASK),
            PageStatus::MissingSubframe(n) => PAGE_STATUS_MISSING_SUBFRAME | (n & DETAIL_MASK),
            PageStatus::Timeout => PAGE_STATUS_TIMEOUT,
            PageStatus::Unknown(byte) => byte,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, PageStatus::Ok)
    }
}
