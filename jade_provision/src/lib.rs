#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::ops::Deref;

use anyhow::Context;
use jade_client::{
    protocol::{is_truthy, DebugSetMnemonicParams, DisplayValue, GetXpubParams},
    vec_to_derivation_path, JadeRpc, Network,
};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

pub use args::Cli;
pub use config::{default_mnemonic, Config};

mod args;
mod config;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

const HARDENED: u32 = 0x8000_0000;

/// The BIP-84 account path queried after the root xpub.
///
/// `m/84'/0'/0'` on mainnet, `m/84'/1'/0'` on the bitcoin test networks and
/// `m/0'` on every other network.
pub fn account_path(network: Network) -> Vec<u32> {
    match network {
        Network::Mainnet => vec![HARDENED + 84, HARDENED, HARDENED],
        Network::Signet | Network::Testnet | Network::Localtest => {
            vec![HARDENED + 84, HARDENED + 1, HARDENED]
        }
        _ => vec![HARDENED],
    }
}

/// A device connection released when the session is dropped.
///
/// The session is created before connecting, so the device is released even
/// when `connect` fails.
pub struct Session<'a, D: JadeRpc + ?Sized> {
    device: &'a D,
}

impl<'a, D: JadeRpc + ?Sized> Session<'a, D> {
    pub fn new(device: &'a D) -> Self {
        Self { device }
    }
}

impl<D: JadeRpc + ?Sized> Deref for Session<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.device
    }
}

impl<D: JadeRpc + ?Sized> Drop for Session<'_, D> {
    fn drop(&mut self) {
        self.device.disconnect();
        tracing::info!("Disconnected from Jade emulator");
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AccountKey {
    /// Path as sent to the device
    pub path: Vec<u32>,
    pub derivation: String,
    pub xpub: String,
}

/// What a successful provisioning prints on stdout.
///
/// Keys are `None` when their export failed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Report {
    pub device: String,
    pub network: Network,
    pub mnemonic: String,
    pub fingerprint: Option<String>,
    pub root_xpub: Option<String>,
    pub account: Option<AccountKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The mnemonic was set, with whatever keys could be exported
    Provisioned(Report),

    /// The device answered `debug_set_mnemonic` with a falsy result
    Rejected,
}

/// Load the configured seed in the device and read back its keys.
///
/// Errors from connecting, querying the version or setting the mnemonic are
/// logged and returned; key export errors are only logged as warnings.
pub fn provision<D: JadeRpc + ?Sized>(device: &D, config: &Config) -> anyhow::Result<Outcome> {
    tracing::info!("Connecting to Jade emulator at {}", config.target);
    tracing::info!("Using mnemonic: {}", config.mnemonic());
    tracing::info!("Network: {}", config.network);

    let session = Session::new(device);
    let result = provision_session(&session, config);
    // logged while the session is still open
    if let Err(e) = &result {
        tracing::error!("Error: {e:?}");
    }
    result
}

fn provision_session<D: JadeRpc + ?Sized>(
    session: &Session<'_, D>,
    config: &Config,
) -> anyhow::Result<Outcome> {
    let mnemonic = config.mnemonic();
    let network = config.network;

    session
        .connect()
        .with_context(|| format!("Is the Jade emulator at {} running?", config.target))?;
    tracing::info!("Connected to Jade emulator");

    let version_info = session
        .version_info()
        .context("cannot get Jade version info")?;
    tracing::info!("Jade version info:");
    for (key, value) in version_info.iter() {
        tracing::info!("  {key}: {}", DisplayValue(value));
    }
    let state = version_info
        .jade_state()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "UNKNOWN".to_string());
    tracing::info!("Jade state: {state}");

    tracing::info!("Setting mnemonic (debug builds auto-accept warnings)...");
    let params = DebugSetMnemonicParams {
        mnemonic: mnemonic.clone(),
        passphrase: None,
        temporary_wallet: false,
    };
    let set = session
        .debug_set_mnemonic(params)
        .context("debug_set_mnemonic failed, is the emulator a debug build?")?;
    if !is_truthy(&set) {
        tracing::error!("Failed to set mnemonic");
        return Ok(Outcome::Rejected);
    }
    tracing::info!("Successfully set wallet with mnemonic!");
    tracing::info!("Mnemonic: {mnemonic}");

    let mut report = Report {
        device: config.target.to_string(),
        network,
        mnemonic,
        fingerprint: None,
        root_xpub: None,
        account: None,
    };
    tracing::info!("Getting xpub for network '{network}'...");
    if let Err(e) = export_keys(&**session, network, &mut report) {
        tracing::warn!("Could not get xpub: {e}");
    }

    Ok(Outcome::Provisioned(report))
}

fn export_keys<D: JadeRpc + ?Sized>(
    device: &D,
    network: Network,
    report: &mut Report,
) -> jade_client::Result<()> {
    let root = device.get_xpub(GetXpubParams {
        network,
        path: vec![],
    })?;
    tracing::info!("Root xpub: {root}");
    report.fingerprint = Some(root.fingerprint().to_string());
    report.root_xpub = Some(root.to_string());

    let path = account_path(network);
    let derivation = vec_to_derivation_path(&path).to_string();
    let xpub = device.get_xpub(GetXpubParams {
        network,
        path: path.clone(),
    })?;
    tracing::info!("Derived xpub (path {path:?}, {derivation}): {xpub}");
    report.account = Some(AccountKey {
        path,
        derivation,
        xpub: xpub.to_string(),
    });
    Ok(())
}

/// Run the provisioning and map its outcome to a process exit code.
///
/// On success the [`Report`] is printed as JSON on stdout.
pub fn run<D: JadeRpc + ?Sized>(device: &D, config: &Config) -> u8 {
    match provision(device, config) {
        Ok(Outcome::Provisioned(report)) => {
            match serde_json::to_string_pretty(&report) {
                Ok(s) => println!("{s}"),
                Err(e) => tracing::warn!("cannot serialize report: {e}"),
            }
            EXIT_SUCCESS
        }
        Ok(Outcome::Rejected) | Err(_) => EXIT_FAILURE,
    }
}

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
///
/// The returned guard flushes pending lines when dropped.
pub fn init_logging() -> WorkerGuard {
    let (appender, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(appender)
        .finish();
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(_) => tracing::debug!("logging initialized"),
        Err(_) => tracing::debug!("logging already initialized"),
    }
    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_paths() {
        assert_eq!(
            account_path(Network::Mainnet),
            vec![2147483732, 2147483648, 2147483648]
        );
        for network in [Network::Signet, Network::Testnet, Network::Localtest] {
            assert_eq!(
                account_path(network),
                vec![2147483732, 2147483649, 2147483648]
            );
        }
        for network in [
            Network::Liquid,
            Network::TestnetLiquid,
            Network::LocaltestLiquid,
        ] {
            assert_eq!(account_path(network), vec![2147483648]);
        }
    }

    #[test]
    fn account_paths_are_hardened() {
        for network in Network::ALL {
            let path = vec_to_derivation_path(&account_path(network));
            assert!((&path).into_iter().all(|c| c.is_hardened()));
        }
    }
}
