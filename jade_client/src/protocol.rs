use std::collections::BTreeMap;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_cbor::Value;

use crate::{error::ErrorDetails, Network};

#[derive(Debug, Serialize)]
pub struct FullRequest {
    pub id: String,
    pub method: String,
    pub params: Request,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Request {
    Ping,
    Logout,
    GetVersionInfo,
    GetXpub(GetXpubParams),
    DebugSetMnemonic(DebugSetMnemonicParams),
    Generic(GenericMethod),
}

#[derive(Debug, Serialize)]
pub struct GenericMethod {
    #[serde(skip)]
    pub(crate) method: String,
    #[serde(flatten)]
    pub(crate) params: Value,
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Ping => write!(f, "ping"),
            Request::Logout => write!(f, "logout"),
            Request::GetVersionInfo => write!(f, "get_version_info"),
            Request::GetXpub(_) => write!(f, "get_xpub"),
            Request::DebugSetMnemonic(_) => write!(f, "debug_set_mnemonic"),
            Request::Generic(g) => write!(f, "{0}", g.method),
        }
    }
}

impl Request {
    pub fn network(&self) -> Option<Network> {
        match self {
            Request::GetXpub(e) => Some(e.network),
            _ => None,
        }
    }

    pub fn serialize(self) -> Result<Vec<u8>, crate::Error> {
        let mut rng = rand::thread_rng();
        let id = rng.next_u32().to_string();
        let method = self.to_string();
        let req = FullRequest {
            id,
            method,
            params: self,
        };
        let mut buf = Vec::new();
        serde_cbor::to_writer(&mut buf, &req)?;
        tracing::debug!(
            "\n--->\t{:#?}\n\t({} bytes) {}",
            &req,
            buf.len(),
            &hex::encode(&buf),
        );
        Ok(buf)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GetXpubParams {
    pub network: Network,

    /// Derive the master node (m) with the given path and the return the resuting xpub
    pub path: Vec<u32>,
}

/// Only honoured by firmware built with debug features, like the CI emulator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DebugSetMnemonicParams {
    pub mnemonic: String,
    pub passphrase: Option<String>,
    pub temporary_wallet: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Response<T> {
    pub id: String,
    pub result: Option<T>,
    pub error: Option<ErrorDetails>,
}

/// Result of `get_version_info`.
///
/// Kept as an ordered map since the set of keys changes across firmware releases.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct VersionInfo(BTreeMap<String, Value>);

impl VersionInfo {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn jade_version(&self) -> Option<&str> {
        match self.get("JADE_VERSION") {
            Some(Value::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// `None` if the key is missing or holds a state this crate doesn't know.
    pub fn jade_state(&self) -> Option<JadeState> {
        match self.get("JADE_STATE") {
            Some(Value::Text(s)) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromIterator<(String, Value)> for VersionInfo {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        VersionInfo(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JadeState {
    /// no wallet set on the hw, mnemonic not entered, unit uninitialised
    Uninit,

    /// wallet mnemonic has been set on hw, but not yet persisted with blind pinserver
    Unsaved,

    /// wallet set, but currently locked - requires PIN entry to unlock.
    Locked,

    /// wallet set and unlocked for this interface, ready to use.
    Ready,

    ///  hw currently set with a temporary ('Emergency Restore') wallet, ready to use.
    Temp,
}

impl std::fmt::Display for JadeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JadeState::Uninit => "UNINIT",
            JadeState::Unsaved => "UNSAVED",
            JadeState::Locked => "LOCKED",
            JadeState::Ready => "READY",
            JadeState::Temp => "TEMP",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for JadeState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNINIT" => Ok(JadeState::Uninit),
            "UNSAVED" => Ok(JadeState::Unsaved),
            "LOCKED" => Ok(JadeState::Locked),
            "READY" => Ok(JadeState::Ready),
            "TEMP" => Ok(JadeState::Temp),
            _ => Err(format!("unknown jade state: {s}")),
        }
    }
}

/// Whether a device result counts as success: `null`, `false`, zero and empty
/// text, bytes or collections do not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(x) => *x != 0.0,
        Value::Text(s) => !s.is_empty(),
        Value::Bytes(b) => !b.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Map(m) => !m.is_empty(),
        _ => true,
    }
}

/// Renders a CBOR value the way it would read in a log line.
pub struct DisplayValue<'a>(pub &'a Value);

impl std::fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Value::Null => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "{}", hex::encode(b)),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn as_map(value: Value) -> BTreeMap<Value, Value> {
        match value {
            Value::Map(m) => m,
            other => panic!("expected a map, got {other:?}"),
        }
    }

    #[test]
    fn serialize_empty() {
        let a = Request::Ping;
        let bytes = serde_cbor::to_vec(&a).unwrap();
        assert_eq!(bytes, vec![0xf6]);
    }

    #[test]
    fn full_request_fields() {
        let params = DebugSetMnemonicParams {
            mnemonic: "tobacco".to_string(),
            passphrase: None,
            temporary_wallet: false,
        };
        let bytes = Request::DebugSetMnemonic(params).serialize().unwrap();
        let map = as_map(serde_cbor::from_slice(&bytes).unwrap());
        assert_eq!(map[&text("method")], text("debug_set_mnemonic"));
        assert!(matches!(map[&text("id")], Value::Text(_)));

        let params = as_map(map[&text("params")].clone());
        assert_eq!(params[&text("mnemonic")], text("tobacco"));
        assert_eq!(params[&text("passphrase")], Value::Null);
        assert_eq!(params[&text("temporary_wallet")], Value::Bool(false));
    }

    #[test]
    fn get_xpub_params() {
        let request = Request::GetXpub(GetXpubParams {
            network: Network::Signet,
            path: vec![2147483732, 2147483649, 2147483648],
        });
        assert_eq!(request.network(), Some(Network::Signet));
        assert_eq!(request.to_string(), "get_xpub");

        let bytes = request.serialize().unwrap();
        let map = as_map(serde_cbor::from_slice(&bytes).unwrap());
        let params = as_map(map[&text("params")].clone());
        assert_eq!(params[&text("network")], text("signet"));
        assert_eq!(
            params[&text("path")],
            Value::Array(vec![
                Value::Integer(2147483732),
                Value::Integer(2147483649),
                Value::Integer(2147483648),
            ])
        );
    }

    #[test]
    fn method_names() {
        assert_eq!(Request::GetVersionInfo.to_string(), "get_version_info");
        assert_eq!(Request::Logout.to_string(), "logout");
        assert_eq!(Request::GetVersionInfo.network(), None);
        let generic = Request::Generic(GenericMethod {
            method: "get_registered_multisigs".to_string(),
            params: Value::Null,
        });
        assert_eq!(generic.to_string(), "get_registered_multisigs");
    }

    #[test]
    fn version_info_state() {
        let info: VersionInfo = [
            ("JADE_VERSION".to_string(), text("1.0.30")),
            ("JADE_STATE".to_string(), text("UNINIT")),
            ("JADE_HAS_PIN".to_string(), Value::Bool(false)),
        ]
        .into_iter()
        .collect();
        assert_eq!(info.jade_state(), Some(JadeState::Uninit));
        assert_eq!(info.jade_version(), Some("1.0.30"));
        let keys: Vec<_> = info.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["JADE_HAS_PIN", "JADE_STATE", "JADE_VERSION"]);

        let info: VersionInfo = [("JADE_STATE".to_string(), text("SLEEPING"))]
            .into_iter()
            .collect();
        assert_eq!(info.jade_state(), None);
        assert_eq!(VersionInfo::default().jade_state(), None);
    }

    #[test]
    fn truthiness() {
        for falsy in [
            Value::Null,
            Value::Bool(false),
            Value::Integer(0),
            Value::Float(0.0),
            text(""),
            Value::Bytes(vec![]),
            Value::Array(vec![]),
            Value::Map(BTreeMap::new()),
        ] {
            assert!(!is_truthy(&falsy), "{falsy:?}");
        }
        for truthy in [
            Value::Bool(true),
            Value::Integer(1),
            Value::Integer(-1),
            text("ok"),
            Value::Bytes(vec![0]),
            Value::Array(vec![Value::Null]),
        ] {
            assert!(is_truthy(&truthy), "{truthy:?}");
        }
    }

    #[test]
    fn display_value() {
        assert_eq!(DisplayValue(&text("READY")).to_string(), "READY");
        assert_eq!(DisplayValue(&Value::Integer(4096)).to_string(), "4096");
        assert_eq!(DisplayValue(&Value::Bool(true)).to_string(), "true");
        assert_eq!(DisplayValue(&Value::Null).to_string(), "None");
        assert_eq!(DisplayValue(&Value::Bytes(vec![0xab, 0x01])).to_string(), "ab01");
    }
}
