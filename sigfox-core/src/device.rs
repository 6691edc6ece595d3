use crate::config::Settings;
use crate::library::{AtLibrary, CommandKey, LibraryCatalog, LibraryError};
use crate::message::Payload;
use crate::transaction::{QUERY_TIMEOUT, Response, SEND_TIMEOUT, SerialError, Transact};
use std::time::Duration;
use tracing::debug;

/// Read windows applied to the two kinds of operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub query: Duration,
    pub send: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query: QUERY_TIMEOUT,
            send: SEND_TIMEOUT,
        }
    }
}

/// A device path, baud rate and AT library bound together
///
/// Sessions are cheap and short lived: build one from the current settings
/// for each operation instead of keeping one around.
pub struct DeviceSession<'a, T: Transact + ?Sized> {
    device: String,
    baud_rate: u32,
    library: AtLibrary,
    transport: &'a T,
    timeouts: Timeouts,
}

impl<'a, T: Transact + ?Sized> DeviceSession<'a, T> {
    pub fn new(device: &str, baud_rate: u32, library: AtLibrary, transport: &'a T) -> Self {
        Self {
            device: device.to_string(),
            baud_rate,
            library,
            transport,
            timeouts: Timeouts::default(),
        }
    }

    /// Build a session for `device` from persisted settings, loading the selected library
    pub fn from_settings(
        device: &str,
        settings: &Settings,
        catalog: &LibraryCatalog,
        transport: &'a T,
    ) -> Result<Self, LibraryError> {
        let library = catalog.load(&settings.at_library)?;
        Ok(Self::new(device, settings.baud_rate, library, transport))
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    pub fn library(&self) -> &AtLibrary {
        &self.library
    }

    /// Read the module's device ID
    pub fn device_id(&self) -> Result<Response, SerialError> {
        self.query(CommandKey::Id)
    }

    /// Read the module's Porting Authorization Code
    pub fn pac(&self) -> Result<Response, SerialError> {
        self.query(CommandKey::Pac)
    }

    /// Read the Sigfox library/firmware version
    pub fn library_version(&self) -> Result<Response, SerialError> {
        self.query(CommandKey::Version)
    }

    /// Transmit an uplink message
    pub fn send_message(&self, payload: &Payload) -> Result<Response, SerialError> {
        let command = format!("{}{payload}", self.library.command(CommandKey::Send));
        self.transact(&command, self.timeouts.send)
    }

    /// Send operator supplied text as-is, without a library lookup
    pub fn custom_command(&self, command: &str) -> Result<Response, SerialError> {
        self.transact(command, self.timeouts.send)
    }

    fn query(&self, key: CommandKey) -> Result<Response, SerialError> {
        self.transact(self.library.command(key), self.timeouts.query)
    }

    fn transact(&self, command: &str, timeout: Duration) -> Result<Response, SerialError> {
        debug!(
            "Sending {command:?} to {device} using library {library}",
            device = self.device,
            library = self.library.name()
        );
        self.transport
            .execute(&self.device, self.baud_rate, command, timeout)
    }
}
