//! Chain module - network selection and the seams to the external Stacks SDK
//!
//! This module provides:
//! - Explicit mainnet/testnet network values passed into every operation
//! - The transaction model the SDK builds, signs and broadcasts
//! - Traits for the SDK builder/estimator/signer/broadcaster, codec and key chain
//! - Contract interface and token metadata lookups

pub mod metadata;
pub mod sdk;
pub mod types;

pub use metadata::{CoinMetadata, ContractInterface, ContractMetadata};
pub use sdk::{BroadcastResult, KeyChain, PrivateKey, StacksSdk, TransactionCodec};
pub use types::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default core API endpoints
pub const MAINNET_CORE_API_URL: &str = "https://stacks-node-api.mainnet.stacks.co";
pub const TESTNET_CORE_API_URL: &str = "https://stacks-node-api.testnet.stacks.co";

/// Wallet-level network selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

impl NetworkType {
    pub fn chain_id(self) -> ChainId {
        match self {
            NetworkType::Mainnet => ChainId::Mainnet,
            NetworkType::Testnet => ChainId::Testnet,
        }
    }

    pub fn transaction_version(self) -> TransactionVersion {
        match self {
            NetworkType::Mainnet => TransactionVersion::Mainnet,
            NetworkType::Testnet => TransactionVersion::Testnet,
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkType::Mainnet => write!(f, "Mainnet"),
            NetworkType::Testnet => write!(f, "Testnet"),
        }
    }
}

/// Stacks chain identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChainId {
    Mainnet = 0x0000_0001,
    Testnet = 0x8000_0000,
}

/// Network value handed to the SDK for estimation and broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StacksNetwork {
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    pub core_api_url: String,
}

impl StacksNetwork {
    pub fn mainnet() -> Self {
        Self {
            network_type: NetworkType::Mainnet,
            core_api_url: MAINNET_CORE_API_URL.to_string(),
        }
    }

    pub fn testnet() -> Self {
        Self {
            network_type: NetworkType::Testnet,
            core_api_url: TESTNET_CORE_API_URL.to_string(),
        }
    }

    /// Network for a selector, using the default endpoint
    pub fn from_type(network_type: NetworkType) -> Self {
        match network_type {
            NetworkType::Mainnet => Self::mainnet(),
            NetworkType::Testnet => Self::testnet(),
        }
    }

    /// Override the core API endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.core_api_url = url.into();
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.network_type.chain_id()
    }

    pub fn is_mainnet(&self) -> bool {
        self.network_type == NetworkType::Mainnet
    }

    /// Broadcast endpoint on this network's node
    pub fn broadcast_endpoint(&self) -> String {
        format!("{}/v2/transactions", self.core_api_url.trim_end_matches('/'))
    }
}
