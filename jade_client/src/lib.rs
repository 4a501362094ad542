#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

pub mod consts;
pub mod error;
mod network;
pub mod protocol;
mod rpc;
mod sync;
mod target;

pub use consts::{DEFAULT_HOST, EMULATOR_PORT, TIMEOUT};
pub use elements;
use elements::bitcoin::bip32::DerivationPath;
pub use error::Error;
pub use network::Network;
pub use rpc::JadeRpc;
pub use sync::Jade;
pub use target::ConnectionTarget;

pub type Result<T> = std::result::Result<T, error::Error>;

fn try_parse_response<T>(reader: &[u8]) -> Option<Result<T>>
where
    T: std::fmt::Debug + serde::de::DeserializeOwned,
{
    match serde_cbor::from_reader::<protocol::Response<T>, &[u8]>(reader) {
        Ok(r) => {
            if let Some(result) = r.result {
                tracing::debug!(
                    "\n<---\t{:?}\n\t({} bytes) {}",
                    &result,
                    reader.len(),
                    hex::encode(reader)
                );
                return Some(Ok(result));
            }
            if let Some(error) = r.error {
                return Some(Err(Error::JadeError(error)));
            }
            return Some(Err(Error::JadeNeitherErrorNorResult));
        }

        Err(e) => {
            let res = serde_cbor::from_reader::<serde_cbor::Value, &[u8]>(reader);
            if let Ok(value) = res {
                // The value returned is a valid CBOR, but our structs doesn't map it correctly
                tracing::debug!("unexpected response shape: {value:?}");
                return Some(Err(Error::SerdeCbor(e)));
            }
        }
    }
    None
}

pub fn derivation_path_to_vec(path: &DerivationPath) -> Vec<u32> {
    path.into_iter().map(|e| (*e).into()).collect()
}

pub fn vec_to_derivation_path(path: &[u32]) -> DerivationPath {
    DerivationPath::from_iter(path.iter().cloned().map(Into::into))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_cbor::Value;

    use super::*;
    use crate::protocol::Response;

    #[test]
    fn derivation_path_conversions() {
        let path = DerivationPath::from_str("m/84'/1'/0'").unwrap();
        let vec = derivation_path_to_vec(&path);
        assert_eq!(vec, vec![2147483732, 2147483649, 2147483648]);
        assert_eq!(vec_to_derivation_path(&vec), path);
        assert!(derivation_path_to_vec(&vec_to_derivation_path(&[])).is_empty());
    }

    #[test]
    fn parse_incomplete_response() {
        let resp = Response {
            id: "1".to_string(),
            result: Some(true),
            error: None,
        };
        let data = serde_cbor::to_vec(&resp).unwrap();
        assert!(try_parse_response::<bool>(&data[..data.len() - 1]).is_none());
        assert!(try_parse_response::<bool>(&data).unwrap().unwrap());
    }

    #[test]
    fn parse_neither_error_nor_result() {
        let resp: Response<bool> = Response {
            id: "1".to_string(),
            result: None,
            error: None,
        };
        let data = serde_cbor::to_vec(&resp).unwrap();
        let err = try_parse_response::<bool>(&data).unwrap().unwrap_err();
        assert!(matches!(err, Error::JadeNeitherErrorNorResult));
    }

    #[test]
    fn parse_wrong_shape() {
        let resp = Response {
            id: "1".to_string(),
            result: Some(Value::Text("not a bool".to_string())),
            error: None,
        };
        let data = serde_cbor::to_vec(&resp).unwrap();
        let err = try_parse_response::<bool>(&data).unwrap().unwrap_err();
        assert!(matches!(err, Error::SerdeCbor(_)));
    }
}
