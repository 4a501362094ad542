use std::time::Duration;

use jade_client::{ConnectionTarget, Network};

use crate::args::Cli;

pub const DEFAULT_MNEMONIC_WORD: &str = "tobacco";
pub const DEFAULT_MNEMONIC_WORDS: usize = 12;

/// `"tobacco"` repeated 12 times, space separated.
pub fn default_mnemonic() -> String {
    vec![DEFAULT_MNEMONIC_WORD; DEFAULT_MNEMONIC_WORDS].join(" ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub target: ConnectionTarget,
    pub network: Network,

    /// Used verbatim when set and not empty
    pub mnemonic: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: ConnectionTarget::default(),
            network: Network::Signet,
            mnemonic: None,
        }
    }
}

impl Config {
    /// The seed phrase to load into the emulator.
    pub fn mnemonic(&self) -> String {
        match self.mnemonic.as_deref() {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => default_mnemonic(),
        }
    }
}

impl From<&Cli> for Config {
    fn from(args: &Cli) -> Self {
        Self {
            target: ConnectionTarget::new(args.host.clone(), args.port)
                .with_timeout(Duration::from_secs(args.timeout)),
            network: args.network.into(),
            mnemonic: args.mnemonic.clone(),
        }
    }
}
