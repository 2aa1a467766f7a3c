//! Serial byte-stream abstractions
//!
//! Provides blocking traits for the half-duplex request/response link the
//! transfer engine runs over. Reads block until the buffer is filled or the
//! transport's own read timeout elapses.

/// Serial transmitter
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Write all of `data` to the link
    ///
    /// Blocks until every byte has been handed to the transport or an error occurs.
    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Serial receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Fill `buf` completely from the link
    ///
    /// Fails if the transport times out or closes before `buf.len()` bytes arrive.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Read a single byte from the link
    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Drop input that arrived but was never read
    ///
    /// Used to resynchronise after an exchange failed part way, e.g. a reply
    /// that landed after its read timed out. The default does nothing.
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Combined serial link
///
/// For duplex streams whose transmit and receive halves share one error type.
pub trait Serial: SerialTx + SerialRx<Error = <Self as SerialTx>::Error> {}

// Blanket implementation
impl<T> Serial for T where T: SerialTx + SerialRx<Error = <T as SerialTx>::Error> {}

/// Errors surfaced by link implementations in this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(all(feature = "defmt", not(feature = "std")), derive(defmt::Format))]
pub enum SerialError {
    /// No data within the transport's read timeout
    Timeout,
    /// The stream reached end-of-file or the peer went away
    Closed,
    /// Any other I/O failure
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SerialError::Timeout => write!(f, "read timed out"),
            SerialError::Closed => write!(f, "link closed"),
            #[cfg(feature = "std")]
            SerialError::Io(kind) => write!(f, "I/O error: {kind}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SerialError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for SerialError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match e.kind() {
            ErrorKind::TimedOut | ErrorKind::WouldBlock => SerialError::Timeout,
            ErrorKind::UnexpectedEof
            | ErrorKind::BrokenPipe
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted => SerialError::Closed,
            kind => SerialError::Io(kind),
        }
    }
}

/// Serial link over any `std::io` duplex stream
///
/// Read timeouts are whatever the wrapped stream is configured with
/// (`TcpStream::set_read_timeout`, tty `VTIME`, ...).
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoSerial<T> {
    inner: T,
}

#[cfg(feature = "std")]
impl<T> IoSerial<T> {
    /// Wrap a stream
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Borrow the wrapped stream
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the wrapped stream
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Unwrap the stream
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<T: std::io::Write> SerialTx for IoSerial<T> {
    type Error = SerialError;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(feature = "std")]
impl<T: std::io::Read> SerialRx for IoSerial<T> {
    type Error = SerialError;

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => return Err(SerialError::Closed),
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Read and drop everything until the stream's read timeout expires
    fn discard_input(&mut self) -> Result<(), Self::Error> {
        let mut scratch = [0u8; 64];
        loop {
            match self.inner.read(&mut scratch) {
                Ok(0) => return Err(SerialError::Closed),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return match SerialError::from(e) {
                        SerialError::Timeout => Ok(()),
                        other => Err(other),
                    }
                }
            }
        }
    }
}
