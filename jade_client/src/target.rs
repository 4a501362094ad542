use std::net::{TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

use crate::consts::{DEFAULT_HOST, EMULATOR_PORT, TIMEOUT};
use crate::{Error, Result};

/// Where a Jade reachable over TCP listens, and how long to wait for it.
///
/// Displays as the device string `tcp:<host>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,

    /// Applies to connect and to every read and write; zero waits indefinitely.
    pub timeout: Duration,
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: EMULATOR_PORT,
            timeout: TIMEOUT,
        }
    }
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The timeout to set on the socket, `None` meaning block forever.
    pub(crate) fn io_timeout(&self) -> Option<Duration> {
        if self.timeout.is_zero() {
            None
        } else {
            Some(self.timeout)
        }
    }

    pub(crate) fn connect(&self) -> Result<TcpStream> {
        let addrs = (self.host.as_str(), self.port).to_socket_addrs()?;
        let mut last_err = None;
        for addr in addrs {
            let stream = match self.io_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match stream {
                Ok(stream) => {
                    tracing::debug!("connected to {addr}");
                    stream.set_read_timeout(self.io_timeout())?;
                    stream.set_write_timeout(self.io_timeout())?;
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!("cannot connect to {addr}: {e}");
                    last_err = Some(e);
                }
            }
        }
        Err(match last_err {
            Some(e) => Error::IoError(e),
            None => Error::UnresolvedHost(self.host.clone()),
        })
    }
}

impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "tcp:[{}]:{}", self.host, self.port)
        } else {
            write!(f, "tcp:{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ConnectionTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDevice(s.to_string());
        let rest = s.strip_prefix("tcp:").ok_or_else(invalid)?;
        let (host, port) = rest.rsplit_once(':').ok_or_else(invalid)?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse().map_err(|_| invalid())?;
        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_target() {
        let target = ConnectionTarget::default();
        assert_eq!(target.to_string(), "tcp:localhost:30121");
        assert_eq!(target.timeout, Duration::from_secs(30));
    }

    #[test]
    fn parse_device_string() {
        let target: ConnectionTarget = "tcp:127.0.0.1:1234".parse().unwrap();
        assert_eq!(target.host, "127.0.0.1");
        assert_eq!(target.port, 1234);

        let target: ConnectionTarget = "tcp:[::1]:30121".parse().unwrap();
        assert_eq!(target.host, "::1");
        assert_eq!(target.to_string(), "tcp:[::1]:30121");

        for invalid in ["127.0.0.1:1234", "tcp:localhost", "tcp::1234", "tcp:host:port"] {
            let err = invalid.parse::<ConnectionTarget>().unwrap_err();
            assert!(matches!(err, Error::InvalidDevice(_)), "{invalid}");
        }
    }

    #[test]
    fn zero_timeout_blocks() {
        let target = ConnectionTarget::default().with_timeout(Duration::ZERO);
        assert_eq!(target.io_timeout(), None);
        assert_eq!(
            ConnectionTarget::default().io_timeout(),
            Some(Duration::from_secs(30))
        );
    }
}
