use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Baud rate used when test-opening a candidate port
const CHECK_BAUD_RATE: u32 = 9600;
const CHECK_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to list serial ports: {0}")]
    Enumeration(#[from] serialport::Error),
}

/// Source of selectable device paths
pub trait PortScanner {
    /// Device paths that can currently be opened
    fn scan(&self) -> Result<Vec<String>, ScanError>;
}

/// Lists the OS serial ports and keeps the ones that open and close cleanly
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPortScanner;

impl SystemPortScanner {
    fn is_openable(port_name: &str) -> bool {
        match serialport::new(port_name, CHECK_BAUD_RATE)
            .timeout(CHECK_TIMEOUT)
            .open()
        {
            Ok(_) => true,
            Err(e) => {
                debug!("Skipping {port_name}: {e}");
                false
            }
        }
    }
}

impl PortScanner for SystemPortScanner {
    fn scan(&self) -> Result<Vec<String>, ScanError> {
        let candidates = serialport::available_ports()?;
        debug!("Found {} candidate serial ports", candidates.len());

        let ports: Vec<String> = candidates
            .into_iter()
            .map(|info| info.port_name)
            .filter(|name| Self::is_openable(name))
            .collect();

        info!("{} serial ports available", ports.len());
        Ok(ports)
    }
}
