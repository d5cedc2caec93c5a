//! Contract interface and token metadata lookups
//!
//! Both come from remote APIs (the node's contract interface endpoint and the
//! wallet backend's coin metadata endpoint) and are reached through
//! [`ContractMetadata`].

use super::StacksNetwork;
use crate::error::WalletResult;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Contract ABI as served by `/v2/contracts/interface`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractInterface {
    #[serde(default)]
    pub functions: Vec<ContractFunction>,
    #[serde(default)]
    pub variables: Vec<Value>,
    #[serde(default)]
    pub maps: Vec<Value>,
    #[serde(default)]
    pub fungible_tokens: Vec<Value>,
    #[serde(default)]
    pub non_fungible_tokens: Vec<Value>,
}

impl ContractInterface {
    pub fn function(&self, name: &str) -> Option<&ContractFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractFunction {
    pub name: String,
    pub access: String,
    #[serde(default)]
    pub args: Vec<FunctionArg>,
    #[serde(default)]
    pub outputs: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArg {
    pub name: String,
    #[serde(rename = "type")]
    pub arg_type: Value,
}

/// Display metadata of a SIP-010 token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinMetadata {
    /// `<address>.<contract>`
    pub contract: String,
    pub name: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub image: Option<String>,
}

#[async_trait]
pub trait ContractMetadata: Send + Sync {
    async fn contract_interface(
        &self,
        contract_address: &str,
        contract_name: &str,
        network: &StacksNetwork,
    ) -> WalletResult<ContractInterface>;

    /// Metadata for each `<address>.<contract>` id; unknown ids are omitted
    async fn coins_metadata(
        &self,
        contract_ids: &[String],
        network: &StacksNetwork,
    ) -> WalletResult<Vec<CoinMetadata>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_interface_parsing() {
        let body = r#"{
            "functions": [{
                "name": "transfer",
                "access": "public",
                "args": [
                    {"name": "amount", "type": "uint128"},
                    {"name": "sender", "type": "principal"}
                ],
                "outputs": {"type": {"response": {"ok": "bool", "error": "uint128"}}}
            }],
            "variables": [],
            "maps": [],
            "fungible_tokens": [{"name": "tok"}],
            "non_fungible_tokens": [],
            "epoch": "Epoch21",
            "clarity_version": "Clarity2"
        }"#;
        let interface: ContractInterface = serde_json::from_str(body).unwrap();

        let transfer = interface.function("transfer").unwrap();
        assert_eq!(transfer.access, "public");
        assert_eq!(transfer.args[1].arg_type, "principal");
        assert_eq!(interface.fungible_tokens.len(), 1);
        assert!(interface.function("mint").is_none());
    }

    #[test]
    fn test_coin_metadata_optional_fields() {
        let coin: CoinMetadata = serde_json::from_str(
            r#"{"contract": "SP3K8BC0PPEVCV7NZ6QSRWPQ2JE9E5B6N3PA0KBR9.token", "name": "Token"}"#,
        )
        .unwrap();
        assert_eq!(coin.ticker, None);
        assert_eq!(coin.decimals, None);
    }
}
