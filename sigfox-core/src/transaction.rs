use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

/// Every outbound command ends with exactly one carriage return
pub const TERMINATOR: u8 = b'\r';

/// Read window for ID, PAC and version queries
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Read window for message transmission and custom commands
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SerialError {
    #[error("Could not connect to device {path}: {source}")]
    DeviceOpen {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Serial I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// One line read back from the module, untouched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    raw: String,
    terminated: bool,
}

impl Response {
    pub fn new(raw: impl Into<String>, terminated: bool) -> Self {
        Self {
            raw: raw.into(),
            terminated,
        }
    }

    /// The line exactly as received, including any line ending
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether a `\n` arrived before the read window closed
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// The line without its trailing line ending
    pub fn text(&self) -> &str {
        self.raw.trim_end_matches(['\r', '\n'])
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }
}

/// One open-write-read-close cycle against a device
pub trait Transact {
    fn execute(
        &self,
        device: &str,
        baud_rate: u32,
        command: &str,
        timeout: Duration,
    ) -> Result<Response, SerialError>;
}

/// A byte stream whose read timeout can be adjusted between reads
pub trait LinePort: Read + Write {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl LinePort for Box<dyn SerialPort> {
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Bytes put on the wire for `command`: non-ASCII characters are dropped
/// and a single [`TERMINATOR`] is appended.
pub fn encode_command(command: &str) -> Vec<u8> {
    let mut frame: Vec<u8> = command
        .chars()
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .collect();
    frame.push(TERMINATOR);
    frame
}

/// Write `frame`, then collect bytes until `\n` or until `timeout` elapses.
///
/// Running out of time is not an error: whatever arrived so far is returned
/// as an unterminated [`Response`].
pub fn transact_on<P: LinePort + ?Sized>(
    port: &mut P,
    frame: &[u8],
    timeout: Duration,
) -> io::Result<Response> {
    port.write_all(frame)?;
    port.flush()?;

    let deadline = Instant::now() + timeout;
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    let mut terminated = false;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        port.set_read_timeout(remaining)?;

        match port.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                line.push(byte[0]);
                if byte[0] == b'\n' {
                    terminated = true;
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(Response {
        raw: String::from_utf8_lossy(&line).into_owned(),
        terminated,
    })
}

/// [`Transact`] over a real serial port, opened fresh for every call
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

impl Transact for SerialExecutor {
    fn execute(
        &self,
        device: &str,
        baud_rate: u32,
        command: &str,
        timeout: Duration,
    ) -> Result<Response, SerialError> {
        let frame = encode_command(command);

        let mut port = serialport::new(device, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|source| SerialError::DeviceOpen {
                path: device.to_string(),
                source,
            })?;
        debug!("Opened {device} at {baud_rate} baud, writing {frame:?}");

        // The port is dropped, and therefore closed, on every path out of here
        let response =
            transact_on(&mut port, &frame, timeout).map_err(|source| SerialError::Io {
                path: device.to_string(),
                source,
            })?;

        debug!(
            "Received {raw:?} from {device} (terminated: {terminated})",
            raw = response.raw(),
            terminated = response.is_terminated()
        );
        Ok(response)
    }
}
