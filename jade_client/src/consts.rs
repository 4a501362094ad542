use std::time::Duration;

/// Default read and connect timeout for a TCP connection to the device.
pub const TIMEOUT: Duration = Duration::from_secs(30);

/// Port the Jade QEMU emulator listens on.
pub const EMULATOR_PORT: u16 = 30121;

pub const DEFAULT_HOST: &str = "localhost";
