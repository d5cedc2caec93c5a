//! Traits for the external Stacks SDK
//!
//! Serialization, signing, key derivation, fee estimation and broadcast are
//! owned by the SDK. The wallet layer only calls through these seams.

use super::types::{
    AnchorMode, ClarityValue, PostCondition, PostConditionMode, StacksTransaction,
};
use super::{ChainId, StacksNetwork};
use crate::error::WalletResult;

use async_trait::async_trait;
use std::fmt;

/// Hex encoded private key returned by the key chain
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(hex_key: impl Into<String>) -> Self {
        Self(hex_key.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Options for the SDK's unsigned STX transfer builder
#[derive(Debug, Clone)]
pub struct TokenTransferOptions {
    pub public_key: String,
    pub recipient: String,
    pub amount: u64,
    pub memo: String,
    pub network: StacksNetwork,
    pub fee: u64,
    /// SDK fetches the account nonce when unset
    pub nonce: Option<u64>,
    pub sponsored: bool,
    pub anchor_mode: AnchorMode,
}

/// Options for the SDK's unsigned contract call builder
#[derive(Debug, Clone)]
pub struct ContractCallOptions {
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    pub function_args: Vec<ClarityValue>,
    pub public_key: String,
    pub network: StacksNetwork,
    pub post_conditions: Vec<PostCondition>,
    pub post_condition_mode: PostConditionMode,
    pub anchor_mode: AnchorMode,
    pub sponsored: bool,
    pub nonce: Option<u64>,
}

/// Node response to a broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastResult {
    Ok { txid: String },
    Rejected { reason: String },
}

/// Transaction builders, fee estimators, signer and broadcaster
#[async_trait]
pub trait StacksSdk: Send + Sync {
    async fn make_unsigned_token_transfer(
        &self,
        options: TokenTransferOptions,
    ) -> WalletResult<StacksTransaction>;

    async fn make_unsigned_contract_call(
        &self,
        options: ContractCallOptions,
    ) -> WalletResult<StacksTransaction>;

    /// Fee estimate for an STX transfer, in micro-STX
    async fn estimate_transfer(
        &self,
        tx: &StacksTransaction,
        network: &StacksNetwork,
    ) -> WalletResult<u64>;

    /// Fee estimate for a contract call, in micro-STX
    async fn estimate_contract_call(
        &self,
        tx: &StacksTransaction,
        network: &StacksNetwork,
    ) -> WalletResult<u64>;

    /// Sign the origin spending condition in place
    fn sign_origin(&self, tx: &mut StacksTransaction, key: &PrivateKey) -> WalletResult<()>;

    async fn broadcast(
        &self,
        tx: &StacksTransaction,
        network: &StacksNetwork,
    ) -> WalletResult<BroadcastResult>;
}

/// SDK wire codec
pub trait TransactionCodec: Send + Sync {
    /// Transaction id of the serialized transaction, hex without prefix
    fn txid(&self, tx: &StacksTransaction) -> String;

    fn serialize_clarity_value(&self, value: &ClarityValue) -> Vec<u8>;

    fn deserialize_clarity_value(&self, bytes: &[u8]) -> WalletResult<ClarityValue>;

    fn serialize_post_condition(&self, post_condition: &PostCondition) -> Vec<u8>;

    fn deserialize_post_condition(&self, bytes: &[u8]) -> WalletResult<PostCondition>;
}

/// Account key derivation
#[async_trait]
pub trait KeyChain: Send + Sync {
    async fn stx_private_key(
        &self,
        seed_phrase: &str,
        chain_id: ChainId,
        account_index: u64,
    ) -> WalletResult<PrivateKey>;
}
