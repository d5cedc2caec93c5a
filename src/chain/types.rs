//! Transaction model shared with the Stacks SDK
//!
//! These types mirror what the SDK builds and signs. Wire encoding and
//! signature bytes are the SDK's business; this crate only reads and adjusts
//! the fields it needs (nonce, fee, auth, payload, post conditions).

use super::ChainId;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Transaction version byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransactionVersion {
    Mainnet = 0x00,
    Testnet = 0x80,
}

/// Block anchoring preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AnchorMode {
    OnChainOnly = 0x01,
    OffChainOnly = 0x02,
    Any = 0x03,
}

impl Serialize for AnchorMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Whether assets not covered by post conditions may move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PostConditionMode {
    Allow = 0x01,
    Deny = 0x02,
}

impl Serialize for PostConditionMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for PostConditionMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0x01 => Ok(PostConditionMode::Allow),
            0x02 => Ok(PostConditionMode::Deny),
            other => Err(serde::de::Error::custom(format!(
                "invalid post condition mode {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressHashMode {
    SerializeP2PKH = 0x00,
    SerializeP2SH = 0x01,
    SerializeP2WPKH = 0x02,
    SerializeP2WSH = 0x03,
}

impl AddressHashMode {
    pub fn is_multi_sig(self) -> bool {
        matches!(
            self,
            AddressHashMode::SerializeP2SH | AddressHashMode::SerializeP2WSH
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthType {
    Standard = 0x04,
    Sponsored = 0x05,
}

/// Spending condition of an origin or sponsor account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpendingCondition {
    pub hash_mode: AddressHashMode,
    /// Hash160 of the signer public key(s), hex encoded
    pub signer: String,
    pub nonce: u64,
    pub fee: u64,
    /// Recoverable signature once signed, hex encoded
    pub signature: Option<String>,
}

impl SpendingCondition {
    pub fn new(hash_mode: AddressHashMode, signer: impl Into<String>) -> Self {
        Self {
            hash_mode,
            signer: signer.into(),
            nonce: 0,
            fee: 0,
            signature: None,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Standard(SpendingCondition),
    Sponsored {
        origin: SpendingCondition,
        sponsor: SpendingCondition,
    },
}

impl Authorization {
    pub fn auth_type(&self) -> AuthType {
        match self {
            Authorization::Standard(_) => AuthType::Standard,
            Authorization::Sponsored { .. } => AuthType::Sponsored,
        }
    }

    /// Origin spending condition
    pub fn spending_condition(&self) -> &SpendingCondition {
        match self {
            Authorization::Standard(origin) => origin,
            Authorization::Sponsored { origin, .. } => origin,
        }
    }

    fn spending_condition_mut(&mut self) -> &mut SpendingCondition {
        match self {
            Authorization::Standard(origin) => origin,
            Authorization::Sponsored { origin, .. } => origin,
        }
    }

    /// Condition that pays the fee: the sponsor when sponsored
    fn fee_condition_mut(&mut self) -> &mut SpendingCondition {
        match self {
            Authorization::Standard(origin) => origin,
            Authorization::Sponsored { sponsor, .. } => sponsor,
        }
    }

    fn fee_condition(&self) -> &SpendingCondition {
        match self {
            Authorization::Standard(origin) => origin,
            Authorization::Sponsored { sponsor, .. } => sponsor,
        }
    }
}

/// Standard or contract principal
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Principal {
    Standard(String),
    Contract {
        address: String,
        contract_name: String,
    },
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Standard(address) => write!(f, "{}", address),
            Principal::Contract {
                address,
                contract_name,
            } => write!(f, "{}.{}", address, contract_name),
        }
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        match value.split_once('.') {
            Some((address, contract_name)) => Principal::Contract {
                address: address.to_string(),
                contract_name: contract_name.to_string(),
            },
            None => Principal::Standard(value.to_string()),
        }
    }
}

/// Clarity value as handed to and from the SDK codec
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Bool(bool),
    Buffer(Vec<u8>),
    StringAscii(String),
    StringUtf8(String),
    Principal(Principal),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    Tuple(BTreeMap<String, ClarityValue>),
}

impl ClarityValue {
    pub fn standard_principal(address: &str) -> Self {
        ClarityValue::Principal(Principal::Standard(address.to_string()))
    }

    pub fn buffer_from_str(value: &str) -> Self {
        ClarityValue::Buffer(value.as_bytes().to_vec())
    }

    pub fn some(value: ClarityValue) -> Self {
        ClarityValue::OptionalSome(Box::new(value))
    }
}

/// Asset identifier `<address>.<contract>::<asset>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    pub contract_address: String,
    pub contract_name: String,
    pub asset_name: String,
}

impl AssetInfo {
    /// `<address>.<contract>` of the asset's contract
    pub fn contract_id(&self) -> String {
        format!("{}.{}", self.contract_address, self.contract_name)
    }
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}::{}",
            self.contract_address, self.contract_name, self.asset_name
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FungibleConditionCode {
    Equal = 0x01,
    Greater = 0x02,
    GreaterEqual = 0x03,
    Less = 0x04,
    LessEqual = 0x05,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NonFungibleConditionCode {
    Sends = 0x10,
    DoesNotSend = 0x11,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostCondition {
    Stx {
        principal: Principal,
        condition_code: FungibleConditionCode,
        amount: u64,
    },
    Fungible {
        principal: Principal,
        condition_code: FungibleConditionCode,
        amount: u64,
        asset_info: AssetInfo,
    },
    NonFungible {
        principal: Principal,
        condition_code: NonFungibleConditionCode,
        asset_info: AssetInfo,
        asset_id: ClarityValue,
    },
}

/// Clarity language version of a deployed contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ClarityVersion {
    Clarity1 = 1,
    Clarity2 = 2,
    Clarity3 = 3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionPayload {
    TokenTransfer {
        recipient: Principal,
        amount: u64,
        /// Memo as stored on chain, NUL padded to 34 bytes
        memo: String,
    },
    ContractCall {
        contract_address: String,
        contract_name: String,
        function_name: String,
        function_args: Vec<ClarityValue>,
    },
    SmartContract {
        contract_name: String,
        code_body: String,
    },
    VersionedSmartContract {
        contract_name: String,
        code_body: String,
        clarity_version: ClarityVersion,
    },
    PoisonMicroblock,
    Coinbase {
        payload: Vec<u8>,
    },
    TenureChange,
}

impl TransactionPayload {
    /// Payload name for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            TransactionPayload::TokenTransfer { .. } => "token_transfer",
            TransactionPayload::ContractCall { .. } => "contract_call",
            TransactionPayload::SmartContract { .. } => "smart_contract",
            TransactionPayload::VersionedSmartContract { .. } => "versioned_smart_contract",
            TransactionPayload::PoisonMicroblock => "poison_microblock",
            TransactionPayload::Coinbase { .. } => "coinbase",
            TransactionPayload::TenureChange => "tenure_change",
        }
    }
}

/// A transaction as produced by the SDK builders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StacksTransaction {
    pub version: TransactionVersion,
    pub chain_id: ChainId,
    pub auth: Authorization,
    pub anchor_mode: AnchorMode,
    pub post_condition_mode: PostConditionMode,
    pub post_conditions: Vec<PostCondition>,
    pub payload: TransactionPayload,
}

impl StacksTransaction {
    /// Origin nonce
    pub fn nonce(&self) -> u64 {
        self.auth.spending_condition().nonce
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.auth.spending_condition_mut().nonce = nonce;
    }

    /// Fee paid by the fee-paying condition
    pub fn fee(&self) -> u64 {
        self.auth.fee_condition().fee
    }

    pub fn set_fee(&mut self, fee: u64) {
        self.auth.fee_condition_mut().fee = fee;
    }

    pub fn is_sponsored(&self) -> bool {
        self.auth.auth_type() == AuthType::Sponsored
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_nonce_and_fee_on_standard_auth() {
        let mut tx = token_transfer(10, "");
        tx.set_nonce(7);
        tx.set_fee(180);
        assert_eq!(tx.nonce(), 7);
        assert_eq!(tx.fee(), 180);
        assert!(!tx.is_sponsored());
    }

    #[test]
    fn test_sponsored_fee_goes_to_sponsor() {
        let mut tx = token_transfer(10, "");
        tx.auth = Authorization::Sponsored {
            origin: spending_condition(3, 0),
            sponsor: spending_condition(0, 0),
        };
        tx.set_fee(500);
        tx.set_nonce(4);

        assert!(tx.is_sponsored());
        assert_eq!(tx.fee(), 500);
        assert_eq!(tx.auth.spending_condition().fee, 0);
        assert_eq!(tx.nonce(), 4);
    }

    #[test]
    fn test_principal_parsing() {
        assert_eq!(
            Principal::from("SP000000000000000000002Q6VF78.pox"),
            Principal::Contract {
                address: "SP000000000000000000002Q6VF78".to_string(),
                contract_name: "pox".to_string(),
            }
        );
        assert_eq!(Principal::from(SENDER).to_string(), SENDER);
    }

    #[test]
    fn test_post_condition_mode_wire_values() {
        let mode: PostConditionMode = serde_json::from_str("2").unwrap();
        assert_eq!(mode, PostConditionMode::Deny);
        assert_eq!(serde_json::to_string(&PostConditionMode::Allow).unwrap(), "1");
        assert!(serde_json::from_str::<PostConditionMode>("3").is_err());
    }

    #[test]
    fn test_multisig_hash_modes() {
        assert!(AddressHashMode::SerializeP2SH.is_multi_sig());
        assert!(AddressHashMode::SerializeP2WSH.is_multi_sig());
        assert!(!AddressHashMode::SerializeP2PKH.is_multi_sig());
        assert!(!AddressHashMode::SerializeP2WPKH.is_multi_sig());
    }
}
