use elements::bitcoin::bip32::Xpub;

use crate::protocol::{DebugSetMnemonicParams, GetXpubParams, VersionInfo};
use crate::Result;

/// The calls needed to provision a Jade and read back its keys.
///
/// Implementors own a connection that is opened by [`JadeRpc::connect`]
/// and released by [`JadeRpc::disconnect`].
pub trait JadeRpc {
    fn connect(&self) -> Result<()>;

    /// Release the connection. Calling it when not connected does nothing.
    fn disconnect(&self);

    fn version_info(&self) -> Result<VersionInfo>;

    /// May block until a user confirms on the device. Any falsy result means
    /// the mnemonic was not set, see [`crate::protocol::is_truthy`].
    fn debug_set_mnemonic(&self, params: DebugSetMnemonicParams) -> Result<serde_cbor::Value>;

    fn get_xpub(&self, params: GetXpubParams) -> Result<Xpub>;
}

impl<T: JadeRpc + ?Sized> JadeRpc for &T {
    fn connect(&self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&self) {
        (**self).disconnect()
    }

    fn version_info(&self) -> Result<VersionInfo> {
        (**self).version_info()
    }

    fn debug_set_mnemonic(&self, params: DebugSetMnemonicParams) -> Result<serde_cbor::Value> {
        (**self).debug_set_mnemonic(params)
    }

    fn get_xpub(&self, params: GetXpubParams) -> Result<Xpub> {
        (**self).get_xpub(params)
    }
}
