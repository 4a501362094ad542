use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Mutex;

use crate::protocol::{
    DebugSetMnemonicParams, GenericMethod, GetXpubParams, Request, VersionInfo,
};
use crate::{
    try_parse_response, vec_to_derivation_path, ConnectionTarget, Error, JadeRpc, Network,
    Result,
};
use connection::Connection;
use elements::bitcoin::bip32::{DerivationPath, Fingerprint, Xpub};
use serde::de::DeserializeOwned;

mod connection;

/// How long a request may wait for the device to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum WaitPolicy {
    /// Use the timeout of the [`ConnectionTarget`].
    #[default]
    Bounded,

    /// Wait indefinitely, for calls that may need a confirmation on the device.
    Unbounded,
}

/// A Jade hardware wallet with a blocking connection.
///
/// Built unconnected from a [`ConnectionTarget`]; [`Jade::connect`] opens the
/// TCP stream and [`Jade::disconnect`] closes it.
#[derive(Debug)]
pub struct Jade {
    /// Where the emulator listens
    target: ConnectionTarget,

    /// `None` until connected and after disconnection
    conn: Mutex<Option<Connection>>,

    /// The network
    pub(crate) network: Network,

    /// Cached xpubs
    cached_xpubs: Mutex<HashMap<DerivationPath, Xpub>>,
}

impl Jade {
    pub fn new(target: ConnectionTarget, network: Network) -> Self {
        Self {
            target,
            conn: Mutex::new(None),
            network,
            cached_xpubs: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_connection(conn: Connection, network: Network) -> Self {
        let jade = Self::new(ConnectionTarget::default(), network);
        *jade.conn.lock().unwrap() = Some(conn);
        jade
    }

    pub fn target(&self) -> &ConnectionTarget {
        &self.target
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn is_connected(&self) -> bool {
        self.conn.lock().map(|c| c.is_some()).unwrap_or(false)
    }

    /// Open the TCP connection, does nothing if already connected.
    pub fn connect(&self) -> Result<()> {
        let mut guard = self.conn.lock()?;
        if guard.is_some() {
            tracing::debug!("already connected to {}", self.target);
            return Ok(());
        }
        let stream = self.target.connect()?;
        *guard = Some(stream.into());
        Ok(())
    }

    /// Close the TCP connection, does nothing if not connected.
    pub fn disconnect(&self) {
        match self.conn.lock() {
            Ok(mut guard) => {
                if let Some(mut conn) = guard.take() {
                    if let Err(e) = conn.shutdown() {
                        tracing::debug!("shutdown of {} failed: {e}", self.target);
                    }
                }
            }
            Err(e) => tracing::warn!("cannot release connection to {}: {e}", self.target),
        }
        if let Ok(mut cache) = self.cached_xpubs.lock() {
            cache.clear();
        }
    }

    pub fn generic(&self, method: String, params: serde_cbor::Value) -> Result<serde_cbor::Value> {
        self.send(Request::Generic(GenericMethod { method, params }))
    }

    pub fn ping(&self) -> Result<u8> {
        self.send(Request::Ping)
    }

    pub fn logout(&self) -> Result<bool> {
        self.send(Request::Logout)
    }

    pub fn version_info(&self) -> Result<VersionInfo> {
        self.send(Request::GetVersionInfo)
    }

    /// The raw result, a `null` answer is returned as [`serde_cbor::Value::Null`].
    ///
    /// Callers decide success with [`crate::protocol::is_truthy`].
    pub fn debug_set_mnemonic(&self, params: DebugSetMnemonicParams) -> Result<serde_cbor::Value> {
        let result = match self.send_with(Request::DebugSetMnemonic(params), WaitPolicy::Unbounded)
        {
            Err(Error::JadeNeitherErrorNorResult) => serde_cbor::Value::Null,
            r => r?,
        };
        self.invalidate_cached_xpubs()?;
        Ok(result)
    }

    fn ask_xpub(&self, params: GetXpubParams) -> Result<Xpub> {
        self.send(Request::GetXpub(params))
    }

    /// Xpub at `params.path`, asked to the device only the first time for each path.
    pub fn get_xpub(&self, params: GetXpubParams) -> Result<Xpub> {
        self.check_network(params.network)?;
        let mut guard = self.cached_xpubs.lock()?;
        let der_path = vec_to_derivation_path(&params.path);
        if let Some(xpub) = guard.get(&der_path) {
            Ok(*xpub)
        } else {
            let result = self.ask_xpub(params)?;
            guard.insert(der_path, result);
            Ok(result)
        }
    }

    fn invalidate_cached_xpubs(&self) -> Result<()> {
        self.cached_xpubs.lock()?.clear();
        Ok(())
    }

    pub fn get_master_xpub(&self) -> Result<Xpub> {
        let params = GetXpubParams {
            network: self.network,
            path: vec![],
        };
        self.get_xpub(params)
    }

    pub fn fingerprint(&self) -> Result<Fingerprint> {
        Ok(self.get_master_xpub()?.fingerprint())
    }

    fn check_network(&self, passed: Network) -> Result<()> {
        let init = self.network;
        if passed != init {
            Err(Error::MismatchingNetwork { init, passed })
        } else {
            Ok(())
        }
    }

    pub(crate) fn send<T>(&self, request: Request) -> Result<T>
    where
        T: std::fmt::Debug + DeserializeOwned,
    {
        self.send_with(request, WaitPolicy::Bounded)
    }

    pub(crate) fn send_with<T>(&self, request: Request, wait: WaitPolicy) -> Result<T>
    where
        T: std::fmt::Debug + DeserializeOwned,
    {
        if let Some(network) = request.network() {
            self.check_network(network)?;
        }
        let buf = request.serialize()?;

        let mut guard = self.conn.lock()?;
        let conn = guard.as_mut().ok_or(Error::NotConnected)?;

        if wait == WaitPolicy::Unbounded {
            conn.set_read_timeout(None)?;
        }
        let result = exchange(conn, &buf);
        if wait == WaitPolicy::Unbounded {
            if let Err(e) = conn.set_read_timeout(self.target.io_timeout()) {
                tracing::debug!("cannot restore read timeout on {}: {e}", self.target);
            }
        }
        result
    }
}

fn exchange<T>(conn: &mut Connection, request: &[u8]) -> Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    conn.write_all(request)?;

    let mut rx = [0u8; 4096];
    let mut received = Vec::new();
    loop {
        match conn.read(&mut rx) {
            Ok(0) => return Err(Error::ConnectionClosed),
            Ok(len) => {
                received.extend_from_slice(&rx[..len]);

                if let Some(value) = try_parse_response(&received) {
                    return value;
                }
            }
            Err(e) => {
                if e.kind() != ErrorKind::Interrupted {
                    return Err(Error::IoError(e));
                }
            }
        }
    }
}

impl JadeRpc for Jade {
    fn connect(&self) -> Result<()> {
        Jade::connect(self)
    }

    fn disconnect(&self) {
        Jade::disconnect(self)
    }

    fn version_info(&self) -> Result<VersionInfo> {
        Jade::version_info(self)
    }

    fn debug_set_mnemonic(&self, params: DebugSetMnemonicParams) -> Result<serde_cbor::Value> {
        Jade::debug_set_mnemonic(self, params)
    }

    fn get_xpub(&self, params: GetXpubParams) -> Result<Xpub> {
        Jade::get_xpub(self, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_connected() {
        let jade = Jade::new(ConnectionTarget::default(), Network::Signet);
        assert!(!jade.is_connected());
        let err = jade.version_info().unwrap_err();
        assert!(matches!(err, Error::NotConnected));

        // releasing an unopened connection is allowed
        jade.disconnect();
        jade.disconnect();
        assert!(!jade.is_connected());
    }

    #[test]
    fn mismatching_network() {
        let jade = Jade::new(ConnectionTarget::default(), Network::Signet);
        let params = GetXpubParams {
            network: Network::Liquid,
            path: vec![],
        };
        let err = jade.get_xpub(params).unwrap_err();
        assert!(matches!(
            err,
            Error::MismatchingNetwork {
                init: Network::Signet,
                passed: Network::Liquid
            }
        ));
    }
}
