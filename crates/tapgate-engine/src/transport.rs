//! Command transport seam
//!
//! How a command payload physically reaches a device is outside the
//! decision engine's concern; the dispatcher only needs a blocking
//! send-one-command primitive with a bounded latency. A minimal TCP
//! transport ships as the default.

use std::io::{Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream};
use std::str::FromStr;
use std::time::Duration;
use tapgate_core::model::{PresetCommand, SpaceDevice};

/// Default device port when none is configured
const DEFAULT_DEVICE_PORT: u16 = 4001;

/// A transport-level failure for one device send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// The device did not respond within the transport's deadline
    Timeout(String),
    /// Any other failure (unreachable, refused, protocol error)
    Failed(String),
}

/// Blocking send of one command to one device
///
/// Implementations must bound their own latency; the dispatcher's
/// batch deadline is a backstop, not a per-send timeout.
pub trait CommandTransport: Send + Sync {
    fn send(
        &self,
        device: &SpaceDevice,
        command: &PresetCommand,
    ) -> std::result::Result<String, TransportFault>;
}

/// Raw TCP transport: connect, write the command payload, read an
/// optional acknowledgement
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
    io_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration, io_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            io_timeout,
        }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(2))
    }
}

impl CommandTransport for TcpTransport {
    fn send(
        &self,
        device: &SpaceDevice,
        command: &PresetCommand,
    ) -> std::result::Result<String, TransportFault> {
        let ip = device
            .ip
            .as_deref()
            .ok_or_else(|| TransportFault::Failed("device has no address".to_string()))?;
        let ip = IpAddr::from_str(ip)
            .map_err(|e| TransportFault::Failed(format!("invalid device address: {}", e)))?;
        let addr = SocketAddr::new(ip, device.port.unwrap_or(DEFAULT_DEVICE_PORT));

        let mut stream = TcpStream::connect_timeout(&addr, self.connect_timeout).map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                TransportFault::Timeout("device connect timed out".to_string())
            } else {
                TransportFault::Failed(format!("connect error: {}", e))
            }
        })?;

        stream
            .set_write_timeout(Some(self.io_timeout))
            .and_then(|_| stream.set_read_timeout(Some(self.io_timeout)))
            .map_err(|e| TransportFault::Failed(format!("socket setup error: {}", e)))?;

        let payload = parse_command_code(&command.code);
        stream
            .write_all(&payload)
            .map_err(|e| TransportFault::Failed(format!("write error: {}", e)))?;

        // Many devices never acknowledge; a read timeout after a clean
        // write still counts as sent
        let mut buf = [0u8; 256];
        match stream.read(&mut buf) {
            Ok(0) => Ok("command sent".to_string()),
            Ok(n) => Ok(String::from_utf8_lossy(&buf[..n]).trim().to_string()),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok("command sent".to_string())
            }
            Err(e) => Err(TransportFault::Failed(format!("read error: {}", e))),
        }
    }
}

/// Parse a command code into its wire payload
///
/// Codes that look like hex byte lists ("A1 B2", "0xA1,0xB2") become
/// raw bytes; anything else is sent as text with common escape
/// sequences expanded.
pub fn parse_command_code(code: &str) -> Vec<u8> {
    let cleaned = code.replace("0x", "").replace(',', " ");
    let cleaned = cleaned.trim();

    let looks_hex = !cleaned.is_empty()
        && cleaned
            .split_whitespace()
            .all(|token| token.len() == 2 && token.chars().all(|c| c.is_ascii_hexdigit()));

    if looks_hex {
        cleaned
            .split_whitespace()
            .map(|token| u8::from_str_radix(token, 16).unwrap_or(0))
            .collect()
    } else {
        code.replace("\\r", "\r")
            .replace("\\n", "\n")
            .replace("\\t", "\t")
            .into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_code() {
        assert_eq!(parse_command_code("A1 B2"), vec![0xA1, 0xB2]);
        assert_eq!(parse_command_code("0xA1,0xB2"), vec![0xA1, 0xB2]);
        assert_eq!(parse_command_code("aa 00"), vec![0xAA, 0x00]);
    }

    #[test]
    fn test_parse_text_code() {
        assert_eq!(parse_command_code("PWR ON\\r"), b"PWR ON\r".to_vec());
        assert_eq!(parse_command_code("ka 01 01x"), b"ka 01 01x".to_vec());
    }

    #[test]
    fn test_empty_code_is_text() {
        assert_eq!(parse_command_code(""), Vec::<u8>::new());
    }
}
