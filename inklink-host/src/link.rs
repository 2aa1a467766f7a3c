//! Byte streams to the display controller
//!
//! Either a serial device node (line settings and read timeout configured
//! outside this program) or a TCP connection to a serial bridge.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use inklink_hal::IoSerial;
use log::debug;

const TCP_SCHEME: &str = "tcp://";

/// Where the link connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `host:port` of a serial-to-TCP bridge
    Tcp(String),
    /// Serial device node, e.g. `/dev/ttyUSB0`
    Device(PathBuf),
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        match s.strip_prefix(TCP_SCHEME) {
            Some(addr) => Endpoint::Tcp(addr.to_string()),
            None => Endpoint::Device(PathBuf::from(s)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp(addr) => write!(f, "{TCP_SCHEME}{addr}"),
            Endpoint::Device(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Duplex byte stream behind a link
pub trait Stream: Read + Write + Send {}

impl<T: Read + Write + Send> Stream for T {}

/// Link type used by the host
pub type Link = IoSerial<Box<dyn Stream>>;

/// Open `endpoint`, applying `timeout` to connect, read and write where
/// the transport supports it
pub fn open(endpoint: &Endpoint, timeout: Duration) -> io::Result<Link> {
    let stream: Box<dyn Stream> = match endpoint {
        Endpoint::Tcp(addr) => Box::new(connect_tcp(addr, timeout)?),
        Endpoint::Device(path) => Box::new(open_device(path)?),
    };
    Ok(IoSerial::new(stream))
}

fn connect_tcp(addr: &str, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;

    for candidate in addr.to_socket_addrs()? {
        debug!("Connecting to {}", candidate);
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{addr} did not resolve to any address"),
        )
    }))
}

fn open_device(path: &Path) -> io::Result<File> {
    debug!("Opening {}", path.display());
    OpenOptions::new().read(true).write(true).open(path)
}
