//! Transfer session
//!
//! [`Transfer`] owns the link for the duration of a session and walks the
//! [`TransferState`] machine: it performs the exchange each state names,
//! wraps it in the retry budget and feeds the outcome back as an event.
//!
//! Exchanges are strictly sequential. A page is one exchange: five
//! sub-frames written back to back, then one reply read.

use core::fmt;

use inklink_hal::{DelayNs, Serial, SerialTx};
use inklink_protocol::{
    ColorPlane, DataFrame, DataReply, EndFrame, EndReply, FrameError, FrameKind, PageStatus,
    StartFrame, StartReply, StartStatus, MAX_FRAME_SIZE,
};
use log::{debug, error, info, warn};

use crate::config::TransferConfig;
use crate::error::{StepError, TransferError};
use crate::image::{Image, Plane};
use crate::retry::{self, Failure};
use crate::segment::{self, Page, PAGES_PER_PLANE};
use crate::state::{Step, TransferEvent, TransferState};

/// Error type of a link
pub type LinkError<L> = <L as SerialTx>::Error;

type Attempt<L> = Result<(), Failure<StepError<LinkError<L>>>>;

/// Counters of a finished transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferReport {
    /// Start exchanges, including retries
    pub starts: u16,
    /// Page exchanges, including retries
    pub pages: u16,
    /// End exchanges, including retries
    pub ends: u16,
    /// Frames written to the link
    pub frames_sent: u32,
    /// Attempts beyond the first of each step
    pub retries: u16,
    /// Time spent backing off from busy replies
    pub busy_wait_ms: u32,
}

impl fmt::Display for TransferReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} start, {} page and {} end exchanges; {} frames, {} retries, {} ms busy",
            self.starts, self.pages, self.ends, self.frames_sent, self.retries, self.busy_wait_ms
        )
    }
}

/// Image transfer over a serial link
pub struct Transfer<L, D> {
    link: L,
    delay: D,
    config: TransferConfig,
    state: TransferState,
    report: TransferReport,
}

impl<L, D> Transfer<L, D>
where
    L: Serial,
    LinkError<L>: fmt::Display,
    D: DelayNs,
{
    pub fn new(link: L, delay: D, config: TransferConfig) -> Self {
        Self {
            link,
            delay,
            config,
            state: TransferState::Idle,
            report: TransferReport::default(),
        }
    }

    pub fn state(&self) -> TransferState {
        self.state
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Counters of the current or last transfer
    pub fn report(&self) -> &TransferReport {
        &self.report
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Release the link and delay
    pub fn into_parts(self) -> (L, D) {
        (self.link, self.delay)
    }

    /// Send both planes of `image` and close the slot
    ///
    /// Returns once the device acknowledged the end frame, or with the step
    /// that spent its retry budget. A finished session can send again.
    pub fn send_image(
        &mut self,
        image: &Image<'_>,
    ) -> Result<TransferReport, TransferError<LinkError<L>>> {
        self.state = self.state.transition(TransferEvent::Reset);
        self.report = TransferReport::default();

        info!("Sending image to slot {}", self.config.slot().get());
        self.state = self.state.transition(TransferEvent::Begin);

        while let Some(step) = self.state.step() {
            let outcome = match step {
                Step::Start(plane) => self
                    .start_plane(plane)
                    .map(|()| TransferEvent::StartAccepted),
                Step::Page { plane, page } => self
                    .send_page(image.plane(plane), plane, page)
                    .map(|()| TransferEvent::PageAccepted),
                Step::End => self.end().map(|()| TransferEvent::EndAccepted),
            };

            match outcome {
                Ok(event) => self.state = self.state.transition(event),
                Err(e) => {
                    self.state = self.state.transition(TransferEvent::StepFailed);
                    return Err(e);
                }
            }
        }

        info!("Transfer complete: {}", self.report);
        Ok(self.report)
    }

    /// Open `plane` on the device
    pub(crate) fn start_plane(
        &mut self,
        plane: ColorPlane,
    ) -> Result<(), TransferError<LinkError<L>>> {
        info!("Starting {} plane", plane);
        self.with_retries(Step::Start(plane), |this| this.try_start(plane))
    }

    fn send_page(
        &mut self,
        data: Plane<'_>,
        plane: ColorPlane,
        number: u8,
    ) -> Result<(), TransferError<LinkError<L>>> {
        let step = Step::Page { plane, page: number };
        let Some(page) = segment::page(data, number) else {
            return Err(TransferError {
                step,
                attempts: 0,
                cause: StepError::Frame(FrameError::InvalidField {
                    field: "page",
                    value: u32::from(number),
                }),
            });
        };

        self.with_retries(step, |this| this.try_page(plane, &page))?;

        let done = self.state.pages_done() + 1;
        let total = 2 * u16::from(PAGES_PER_PLANE);
        debug!(
            "{} page {}/{} accepted ({}%)",
            plane,
            number,
            PAGES_PER_PLANE,
            done * 100 / total
        );
        if number == PAGES_PER_PLANE {
            info!("{} plane sent", plane);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), TransferError<LinkError<L>>> {
        self.with_retries(Step::End, Self::try_end)?;
        info!("Slot {} closed", self.config.slot().get());
        Ok(())
    }

    fn with_retries<F>(
        &mut self,
        step: Step,
        mut attempt: F,
    ) -> Result<(), TransferError<LinkError<L>>>
    where
        F: FnMut(&mut Self) -> Attempt<L>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut stale_input = false;

        let outcome = retry::run_with_retries(max_attempts, |n| {
            if n > 1 {
                self.report.retries += 1;
            }
            let mut result = if stale_input {
                self.discard_input()
            } else {
                Ok(())
            };
            if result.is_ok() {
                result = attempt(self);
            }
            if let Err(failure) = &result {
                stale_input = failure.error().may_desync();
                warn!(
                    "{} attempt {}/{} failed: {}",
                    step,
                    n,
                    max_attempts,
                    failure.error()
                );
            }
            result
        });

        outcome.map(|_| ()).map_err(|exhausted| {
            error!(
                "{} failed after {} attempt(s): {}",
                step, exhausted.attempts, exhausted.error
            );
            TransferError {
                step,
                attempts: exhausted.attempts,
                cause: exhausted.error,
            }
        })
    }

    fn try_start(&mut self, plane: ColorPlane) -> Attempt<L> {
        let frame = StartFrame {
            slot: self.config.slot(),
            plane,
        };
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buf).map_err(fatal)?;

        self.report.starts += 1;
        self.send(&buf[..len])?;
        self.flush()?;

        let reply = &mut buf[..FrameKind::StartReply.len()];
        self.receive(reply)?;
        let reply = StartReply::decode(reply).map_err(retryable)?;

        match reply.status {
            StartStatus::Ok => Ok(()),
            StartStatus::Busy => {
                let wait = self.config.busy_backoff_ms;
                debug!("Device busy, waiting {} ms", wait);
                self.delay.delay_ms(wait);
                self.report.busy_wait_ms = self.report.busy_wait_ms.saturating_add(wait);
                Err(Failure::Retryable(StepError::StartRejected(StartStatus::Busy)))
            }
            status @ (StartStatus::Error | StartStatus::Unknown(_)) => {
                Err(Failure::Retryable(StepError::StartRejected(status)))
            }
        }
    }

    fn try_page(&mut self, plane: ColorPlane, page: &Page) -> Attempt<L> {
        let slot = self.config.slot();
        let mut buf = [0u8; MAX_FRAME_SIZE];

        self.report.pages += 1;
        for sub in page.subframes() {
            let frame = DataFrame {
                slot,
                plane,
                page: page.number(),
                subframe: sub.number(),
                payload: sub.payload(),
            };
            let len = frame.encode(&mut buf).map_err(fatal)?;
            self.send(&buf[..len])?;
        }
        self.flush()?;

        let reply = &mut buf[..FrameKind::DataReply.len()];
        self.receive(reply)?;
        let reply = DataReply::decode(reply).map_err(retryable)?;

        if reply.page != page.number() {
            return Err(Failure::Retryable(StepError::PageMismatch {
                expected: page.number(),
                found: reply.page,
            }));
        }

        match reply.status {
            PageStatus::Ok => Ok(()),
            status @ (PageStatus::CrcError(_)
            | PageStatus::MissingSubframe(_)
            | PageStatus::Timeout) => Err(Failure::Retryable(StepError::PageRejected(status))),
            status @ PageStatus::Unknown(code) => {
                warn!("Unknown page status 0x{:02X} for page {}", code, page.number());
                Err(Failure::Retryable(StepError::PageRejected(status)))
            }
        }
    }

    fn try_end(&mut self) -> Attempt<L> {
        let frame = EndFrame {
            slot: self.config.slot(),
        };
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buf).map_err(fatal)?;

        self.report.ends += 1;
        self.send(&buf[..len])?;
        self.flush()?;

        let reply = &mut buf[..FrameKind::EndReply.len()];
        self.receive(reply)?;
        let reply = EndReply::decode(reply).map_err(retryable)?;
        debug!(
            "End acknowledged (command 0x{:02X}, slot {})",
            reply.command, reply.slot
        );
        Ok(())
    }

    fn discard_input(&mut self) -> Attempt<L> {
        debug!("Discarding unread input before retrying");
        self.link
            .discard_input()
            .map_err(|e| Failure::Retryable(StepError::Transport(e)))
    }

    fn send(&mut self, frame: &[u8]) -> Attempt<L> {
        self.link
            .write_all(frame)
            .map_err(|e| Failure::Retryable(StepError::Transport(e)))?;
        self.report.frames_sent += 1;
        Ok(())
    }

    fn flush(&mut self) -> Attempt<L> {
        self.link
            .flush()
            .map_err(|e| Failure::Retryable(StepError::Transport(e)))
    }

    fn receive(&mut self, buf: &mut [u8]) -> Attempt<L> {
        self.link
            .read_exact(buf)
            .map_err(|e| Failure::Retryable(StepError::Transport(e)))
    }
}

fn fatal<E>(e: FrameError) -> Failure<StepError<E>> {
    Failure::Fatal(StepError::Frame(e))
}

fn retryable<E>(e: FrameError) -> Failure<StepError<E>> {
    Failure::Retryable(StepError::Frame(e))
}
