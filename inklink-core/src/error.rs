//! Transfer errors

use core::fmt;

use inklink_protocol::{FrameError, PageStatus, StartStatus};

use crate::state::Step;

/// Why one attempt of a step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepError<E> {
    /// Link failed to write or read
    Transport(E),
    /// Reply could not be decoded
    Frame(FrameError),
    /// Start reply carried a status other than OK
    StartRejected(StartStatus),
    /// Page reply carried a status other than OK
    PageRejected(PageStatus),
    /// Page reply refers to a different page
    PageMismatch { expected: u8, found: u8 },
}

impl<E> StepError<E> {
    /// Whether unread or out-of-step reply bytes may still be on the link
    ///
    /// A decoded status reply was consumed whole; anything else may have
    /// left a late or partial reply behind.
    pub fn may_desync(&self) -> bool {
        matches!(
            self,
            StepError::Transport(_) | StepError::Frame(_) | StepError::PageMismatch { .. }
        )
    }
}

impl<E> From<FrameError> for StepError<E> {
    fn from(e: FrameError) -> Self {
        StepError::Frame(e)
    }
}

impl<E: fmt::Display> fmt::Display for StepError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::Transport(e) => write!(f, "transport error: {e}"),
            StepError::Frame(e) => write!(f, "malformed reply: {e}"),
            StepError::StartRejected(status) => match status {
                StartStatus::Ok => f.write_str("start accepted"),
                StartStatus::Busy => f.write_str("device busy"),
                StartStatus::Error => f.write_str("device reported an error"),
                StartStatus::Unknown(code) => write!(f, "unknown start status 0x{code:02X}"),
            },
            StepError::PageRejected(status) => match status {
                PageStatus::Ok => f.write_str("page accepted"),
                PageStatus::CrcError(detail) => {
                    write!(f, "device reported checksum error (detail {detail})")
                }
                PageStatus::MissingSubframe(n) => {
                    write!(f, "device reported sub-frame {n} missing")
                }
                PageStatus::Timeout => f.write_str("device timed out waiting for sub-frames"),
                PageStatus::Unknown(code) => write!(f, "unknown page status 0x{code:02X}"),
            },
            StepError::PageMismatch { expected, found } => {
                write!(f, "reply for page {found}, expected page {expected}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display> std::error::Error for StepError<E> {}

/// A step that spent its retry budget, ending the transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferError<E> {
    pub step: Step,
    /// Attempts made on `step`
    pub attempts: u8,
    /// Error of the last attempt
    pub cause: StepError<E>,
}

impl<E: fmt::Display> fmt::Display for TransferError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed after {} attempt(s): {}",
            self.step, self.attempts, self.cause
        )
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug + fmt::Display + 'static> std::error::Error for TransferError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
