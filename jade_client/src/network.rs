use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// The network namespace a Jade derives keys in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
    Signet,
    Localtest,
    Liquid,
    TestnetLiquid,
    LocaltestLiquid,
}

impl Network {
    pub const ALL: [Network; 7] = [
        Network::Mainnet,
        Network::Testnet,
        Network::Signet,
        Network::Localtest,
        Network::Liquid,
        Network::TestnetLiquid,
        Network::LocaltestLiquid,
    ];

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Self::Mainnet | Self::Liquid)
    }

    pub fn is_liquid(&self) -> bool {
        matches!(
            self,
            Self::Liquid | Self::TestnetLiquid | Self::LocaltestLiquid
        )
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Signet => write!(f, "signet"),
            Network::Localtest => write!(f, "localtest"),
            Network::Liquid => write!(f, "liquid"),
            Network::TestnetLiquid => write!(f, "testnet-liquid"),
            Network::LocaltestLiquid => write!(f, "localtest-liquid"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "signet" => Ok(Network::Signet),
            "localtest" => Ok(Network::Localtest),
            "liquid" => Ok(Network::Liquid),
            "testnet-liquid" => Ok(Network::TestnetLiquid),
            "localtest-liquid" => Ok(Network::LocaltestLiquid),
            _ => Err(
                "invalid network, possible value are: 'mainnet', 'testnet', 'signet', 'localtest', 'liquid', 'testnet-liquid', 'localtest-liquid'"
                    .to_string(),
            ),
        }
    }
}

impl Serialize for Network {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let string = String::deserialize(d)?;
        string.parse().map_err(serde::de::Error::custom)
    }
}
