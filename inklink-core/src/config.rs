//! Transfer configuration

use core::fmt;

use inklink_protocol::Slot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default attempts per protocol step
pub const DEFAULT_MAX_ATTEMPTS: u8 = 3;

/// Default wait after a busy start reply, in milliseconds
pub const DEFAULT_BUSY_BACKOFF_MS: u32 = 1000;

/// Settings of one transfer session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TransferConfig {
    /// Device image slot (0-15)
    pub slot: u8,
    /// Attempts per start, page and end exchange
    pub max_attempts: u8,
    /// Wait after each busy start reply
    pub busy_backoff_ms: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            slot: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            busy_backoff_ms: DEFAULT_BUSY_BACKOFF_MS,
        }
    }
}

impl TransferConfig {
    /// Default settings for `slot`
    pub fn for_slot(slot: u8) -> Self {
        Self {
            slot,
            ..Self::default()
        }
    }

    /// Slot as sent on the wire (low nibble)
    pub fn slot(&self) -> Slot {
        Slot::new(self.slot)
    }

    /// Reject settings the protocol cannot express
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if Slot::try_new(self.slot).is_none() {
            return Err(InvalidConfig::SlotOutOfRange(self.slot));
        }
        if self.max_attempts == 0 {
            return Err(InvalidConfig::ZeroAttempts);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidConfig {
    SlotOutOfRange(u8),
    ZeroAttempts,
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidConfig::SlotOutOfRange(slot) => {
                write!(f, "slot {slot} out of range (0-{})", Slot::MAX)
            }
            InvalidConfig::ZeroAttempts => f.write_str("max_attempts must be at least 1"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.slot, 0);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.busy_backoff_ms, 1000);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validation() {
        assert_eq!(TransferConfig::for_slot(15).validate(), Ok(()));
        assert_eq!(
            TransferConfig::for_slot(16).validate(),
            Err(InvalidConfig::SlotOutOfRange(16))
        );

        let config = TransferConfig {
            max_attempts: 0,
            ..TransferConfig::default()
        };
        assert_eq!(config.validate(), Err(InvalidConfig::ZeroAttempts));
    }

    #[test]
    fn test_wire_slot_masked() {
        assert_eq!(TransferConfig::for_slot(0x13).slot().get(), 0x03);
    }
}
