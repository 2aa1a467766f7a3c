//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferEvent {
    /// Session asked to send an image
    Begin,

    // Device acknowledgements
    /// Start reply with status OK
    StartAccepted,
    /// Page reply with status OK for the page sent
    PageAccepted,
    /// Valid end reply
    EndAccepted,

    /// Current step spent its retry budget
    StepFailed,

    /// Clear a finished transfer
    Reset,
}

impl TransferEvent {
    /// Check if this event reports a device acknowledgement
    pub fn is_ack(&self) -> bool {
        matches!(
            self,
            TransferEvent::StartAccepted | TransferEvent::PageAccepted | TransferEvent::EndAccepted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_events() {
        assert!(TransferEvent::StartAccepted.is_ack());
        assert!(TransferEvent::PageAccepted.is_ack());
        assert!(TransferEvent::EndAccepted.is_ack());
        assert!(!TransferEvent::Begin.is_ack());
        assert!(!TransferEvent::StepFailed.is_ack());
    }
}
