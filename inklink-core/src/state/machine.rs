//! State machine definition
//!
//! A transfer sends the primary plane, then the accent plane, then closes
//! the slot. Each state names the one step the session executes next.

use core::fmt;

use inklink_protocol::ColorPlane;

use super::events::TransferEvent;
use crate::segment::PAGES_PER_PLANE;

/// Transfer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// Nothing sent yet
    Idle,
    /// Opening a plane
    Starting(ColorPlane),
    /// Sending one page of a plane
    SendingPage { plane: ColorPlane, page: u8 },
    /// Both planes sent, closing the slot
    Ending,
    /// Device acknowledged the end frame
    Done,
    /// A step spent its retry budget
    Failed(Step),
}

/// One request/response exchange of the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Start(ColorPlane),
    Page { plane: ColorPlane, page: u8 },
    End,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Start(plane) => write!(f, "start of {plane} plane"),
            Step::Page { plane, page } => {
                write!(f, "page {page}/{PAGES_PER_PLANE} of {plane} plane")
            }
            Step::End => f.write_str("end of transfer"),
        }
    }
}

impl TransferState {
    /// Step executed in this state, if any
    pub fn step(&self) -> Option<Step> {
        match *self {
            TransferState::Starting(plane) => Some(Step::Start(plane)),
            TransferState::SendingPage { plane, page } => Some(Step::Page { plane, page }),
            TransferState::Ending => Some(Step::End),
            TransferState::Idle | TransferState::Done | TransferState::Failed(_) => None,
        }
    }

    /// Check if a transfer is in progress
    pub fn is_active(&self) -> bool {
        self.step().is_some()
    }

    /// Check if this is an error state
    pub fn is_failed(&self) -> bool {
        matches!(self, TransferState::Failed(_))
    }

    /// Check if the transfer has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Done | TransferState::Failed(_))
    }

    /// Pages acknowledged so far, across both planes
    pub fn pages_done(&self) -> u16 {
        let per_plane = u16::from(PAGES_PER_PLANE);
        match *self {
            TransferState::Idle | TransferState::Starting(ColorPlane::Primary) => 0,
            TransferState::Starting(ColorPlane::Accent) => per_plane,
            TransferState::SendingPage { plane, page } => {
                let before = match plane {
                    ColorPlane::Primary => 0,
                    ColorPlane::Accent => per_plane,
                };
                before + u16::from(page) - 1
            }
            TransferState::Ending | TransferState::Done => 2 * per_plane,
            TransferState::Failed(step) => match step {
                Step::Start(plane) => TransferState::Starting(plane).pages_done(),
                Step::Page { plane, page } => {
                    TransferState::SendingPage { plane, page }.pages_done()
                }
                Step::End => 2 * per_plane,
            },
        }
    }

    /// Process an event and return the next state
    ///
    /// Unexpected events leave the state unchanged.
    pub fn transition(self, event: TransferEvent) -> Self {
        use TransferEvent::*;
        use TransferState::*;

        match (self, event) {
            (Idle, Begin) => Starting(ColorPlane::Primary),

            (Starting(plane), StartAccepted) => SendingPage { plane, page: 1 },

            (SendingPage { plane, page }, PageAccepted) if page < PAGES_PER_PLANE => SendingPage {
                plane,
                page: page + 1,
            },
            (SendingPage { plane, .. }, PageAccepted) => match plane.next() {
                Some(next) => Starting(next),
                None => Ending,
            },

            (Ending, EndAccepted) => Done,

            (state, StepFailed) => match state.step() {
                Some(step) => Failed(step),
                None => state,
            },

            (Done | Failed(_), Reset) => Idle,

            // Default: stay in current state
            (state, _) => state,
        }
    }
}
