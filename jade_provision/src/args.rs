use clap::{Parser, ValueEnum};
use jade_client::{DEFAULT_HOST, EMULATOR_PORT};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
    Signet,
    Localtest,
    Liquid,
    TestnetLiquid,
    LocaltestLiquid,
}

impl From<Network> for jade_client::Network {
    fn from(value: Network) -> Self {
        match value {
            Network::Mainnet => jade_client::Network::Mainnet,
            Network::Testnet => jade_client::Network::Testnet,
            Network::Signet => jade_client::Network::Signet,
            Network::Localtest => jade_client::Network::Localtest,
            Network::Liquid => jade_client::Network::Liquid,
            Network::TestnetLiquid => jade_client::Network::TestnetLiquid,
            Network::LocaltestLiquid => jade_client::Network::LocaltestLiquid,
        }
    }
}

/// Load a deterministic test wallet into a Jade emulator and print its keys.
///
/// The emulator must be built with CONFIG_DEBUG_UNATTENDED_CI=y, otherwise
/// debug_set_mnemonic is rejected.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emulator host
    #[arg(long, env = "JADE_EMULATOR_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Emulator port
    #[arg(long, env = "JADE_EMULATOR_PORT", default_value_t = EMULATOR_PORT)]
    pub port: u16,

    /// Network to derive the keys for
    #[arg(long, value_enum, default_value = "signet")]
    pub network: Network,

    /// Custom mnemonic (default: "tobacco" repeated 12 times)
    #[arg(long, env = "JADE_MNEMONIC")]
    pub mnemonic: Option<String>,

    /// Connection timeout in seconds, 0 waits indefinitely
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}
