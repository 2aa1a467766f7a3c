//! Test doubles for session tests

use std::cell::RefCell;
use std::collections::VecDeque;

use inklink_hal::{DelayNs, SerialError, SerialRx, SerialTx};
use inklink_protocol::{
    ColorPlane, DataFrame, DataReply, EndFrame, EndReply, FrameKind, PageStatus, Slot, StartFrame,
    StartReply, StartStatus, MAX_FRAME_SIZE,
};

use crate::segment::{LAST_DATA_SIZE, PAGES_PER_PLANE, SUBFRAMES_PER_PAGE};

fn encoded(len: usize, encode: impl FnOnce(&mut [u8]) -> usize) -> Vec<u8> {
    let mut buf = [0u8; MAX_FRAME_SIZE];
    let written = encode(&mut buf[..]);
    assert_eq!(written, len);
    buf[..len].to_vec()
}

pub fn start_reply(slot: Slot, plane: ColorPlane, status: StartStatus) -> Vec<u8> {
    let reply = StartReply::to(&StartFrame { slot, plane }, status);
    encoded(FrameKind::StartReply.len(), |buf| reply.encode(buf).unwrap())
}

pub fn page_reply(page: u8, status: PageStatus) -> Vec<u8> {
    let reply = DataReply::for_page(page, status);
    encoded(FrameKind::DataReply.len(), |buf| reply.encode(buf).unwrap())
}

pub fn end_reply(slot: Slot) -> Vec<u8> {
    let reply = EndReply::to(&EndFrame { slot });
    encoded(FrameKind::EndReply.len(), |buf| reply.encode(buf).unwrap())
}

/// Link that answers reads from a fixed script and records every write
#[derive(Debug, Default)]
pub struct ScriptedLink {
    replies: VecDeque<Result<Vec<u8>, SerialError>>,
    pub written: Vec<Vec<u8>>,
    pub flushes: usize,
    pub discards: usize,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, bytes: Vec<u8>) -> Self {
        self.replies.push_back(Ok(bytes));
        self
    }

    pub fn fail(mut self, error: SerialError) -> Self {
        self.replies.push_back(Err(error));
        self
    }
}

impl SerialTx for ScriptedLink {
    type Error = SerialError;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.written.push(data.to_vec());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

impl SerialRx for ScriptedLink {
    type Error = SerialError;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        match self.replies.pop_front() {
            Some(Ok(bytes)) if bytes.len() >= buf.len() => {
                buf.copy_from_slice(&bytes[..buf.len()]);
                Ok(())
            }
            Some(Ok(_)) | None => Err(SerialError::Timeout),
            Some(Err(error)) => Err(error),
        }
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.discards += 1;
        Ok(())
    }
}

/// Scripted negative page status
#[derive(Debug, Clone, Copy)]
pub struct PageFault {
    pub plane: ColorPlane,
    pub page: u8,
    pub status: PageStatus,
    /// Replies still to answer with `status`
    pub remaining: u8,
}

/// Page reply that only completes after the host's read timed out
#[derive(Debug, Clone, Copy)]
pub struct LateReply {
    pub plane: ColorPlane,
    pub page: u8,
    /// Leading bytes that still arrive in time
    pub on_time: usize,
}

/// Device model that parses host frames and answers them
///
/// Pages are acknowledged OK unless a [`PageFault`] matches. Ten-byte
/// frames are read as end frames once the accent plane is complete, since
/// odd-slot end frames cannot be told apart from primary start frames.
#[derive(Debug, Default)]
pub struct SimulatedDevice {
    /// Start statuses to answer with, OK once empty
    pub start_statuses: VecDeque<StartStatus>,
    pub page_faults: Vec<PageFault>,
    /// Corrupt the magic of this many upcoming replies
    pub corrupt_replies: u8,
    /// Echo the wrong page in this many upcoming page replies
    pub wrong_echoes: u8,
    /// Never answer end frames
    pub mute_end: bool,
    pub late_replies: Vec<LateReply>,

    pub starts: Vec<StartFrame>,
    /// Page replies sent, in order
    pub pages: Vec<(ColorPlane, u8, PageStatus)>,
    pub data_frames: usize,
    /// Page checksums carried by sub-frame 5
    pub checksums: Vec<(ColorPlane, u8, u32)>,
    pub ends: Vec<EndFrame>,
    pub discards: usize,
    /// Stale reply bytes dropped by the host
    pub discarded_bytes: usize,

    accent_complete: bool,
    expected_subframe: u8,
    replies: VecDeque<u8>,
    /// Bytes that land once the current read has timed out
    delayed: VecDeque<u8>,
}

impl SimulatedDevice {
    pub fn new() -> Self {
        Self {
            expected_subframe: 1,
            ..Self::default()
        }
    }

    /// Distinct pages acknowledged OK
    pub fn accepted_pages(&self) -> usize {
        self.pages
            .iter()
            .filter(|(_, _, status)| status.is_ok())
            .count()
    }

    fn push_reply(&mut self, mut bytes: Vec<u8>) {
        if self.corrupt_replies > 0 {
            self.corrupt_replies -= 1;
            bytes[0] = 0x00;
        }
        self.replies.extend(bytes);
    }

    fn on_start(&mut self, frame: StartFrame) {
        let status = self.start_statuses.pop_front().unwrap_or(StartStatus::Ok);
        self.starts.push(frame);
        self.expected_subframe = 1;
        self.push_reply(start_reply(frame.slot, frame.plane, status));
    }

    fn on_end(&mut self, frame: EndFrame) {
        self.ends.push(frame);
        if self.mute_end {
            return;
        }
        self.accent_complete = false;
        self.push_reply(end_reply(frame.slot));
    }

    fn on_data(&mut self, frame: DataFrame<'_>) {
        self.data_frames += 1;
        assert_eq!(frame.subframe, self.expected_subframe, "sub-frames out of order");

        if frame.subframe < SUBFRAMES_PER_PAGE {
            self.expected_subframe += 1;
            return;
        }
        self.expected_subframe = 1;

        let mut crc = [0u8; 4];
        crc.copy_from_slice(&frame.payload[LAST_DATA_SIZE..LAST_DATA_SIZE + 4]);
        self.checksums
            .push((frame.plane, frame.page, u32::from_le_bytes(crc)));

        let status = self
            .page_faults
            .iter_mut()
            .find(|f| f.plane == frame.plane && f.page == frame.page && f.remaining > 0)
            .map(|f| {
                f.remaining -= 1;
                f.status
            })
            .unwrap_or(PageStatus::Ok);

        let echo = if self.wrong_echoes > 0 {
            self.wrong_echoes -= 1;
            frame.page.wrapping_add(1)
        } else {
            if status.is_ok()
                && frame.plane == ColorPlane::Accent
                && frame.page == PAGES_PER_PLANE
            {
                self.accent_complete = true;
            }
            frame.page
        };

        self.pages.push((frame.plane, frame.page, status));
        let reply = page_reply(echo, status);
        let late = self
            .late_replies
            .iter()
            .position(|l| l.plane == frame.plane && l.page == frame.page);
        match late {
            Some(index) => {
                let late = self.late_replies.remove(index);
                self.replies.extend(&reply[..late.on_time]);
                self.delayed.extend(&reply[late.on_time..]);
            }
            None => self.push_reply(reply),
        }
    }
}

impl SerialTx for SimulatedDevice {
    type Error = SerialError;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.len() == FrameKind::Data.len() {
            let frame = DataFrame::decode(data).expect("host sent a malformed data frame");
            self.on_data(frame);
        } else if self.accent_complete {
            let frame = EndFrame::decode(data).expect("host sent a malformed end frame");
            self.on_end(frame);
        } else {
            let frame = StartFrame::decode(data).expect("host sent a malformed start frame");
            self.on_start(frame);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl SerialRx for SimulatedDevice {
    type Error = SerialError;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.replies.len() < buf.len() {
            // A short read loses what it got, then the late bytes land
            self.replies.clear();
            self.replies.extend(self.delayed.drain(..));
            return Err(SerialError::Timeout);
        }
        for byte in buf.iter_mut() {
            *byte = self.replies.pop_front().unwrap_or_default();
        }
        Ok(())
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.discards += 1;
        self.discarded_bytes += self.replies.len() + self.delayed.len();
        self.replies.clear();
        self.delayed.clear();
        Ok(())
    }
}

/// Delay that records instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.total_ns += u64::from(ms) * 1_000_000;
        self.calls += 1;
    }
}

thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = const { RefCell::new(Vec::new()) };
}

/// Logger that keeps the records of the current test thread
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        RECORDS.with(|r| r.borrow_mut().push((record.level(), record.args().to_string())));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Start recording log output of this thread
pub fn capture_logs() {
    // Another test may have installed it already
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(log::LevelFilter::Trace);
    RECORDS.with(|r| r.borrow_mut().clear());
}

/// Messages logged at `level` on this thread since [`capture_logs`]
pub fn logged(level: log::Level) -> Vec<String> {
    RECORDS.with(|r| {
        r.borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    })
}
