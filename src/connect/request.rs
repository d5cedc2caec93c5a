//! Wallet-facing transaction requests
//!
//! Field names are consumed by the wallet UI and must stay stable.

use crate::chain::{
    AnchorMode, AuthType, Authorization, ClarityValue, CoinMetadata, ContractInterface,
    ContractMetadata, PostCondition, PostConditionMode, StacksTransaction, TransactionCodec,
    TransactionPayload,
};
use crate::error::{WalletError, WalletResult};
use crate::tx::fee::{apply_fee_multiplier, FeesMultipliers};
use crate::tx::nonce::{PendingTransaction, StxPendingTxData};
use crate::tx::{StxTransfer, TransactionBuilder, UnsignedContractCall};

use separator::Separatable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Flat request shape shared by every transaction kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stx_address: Option<String>,
    pub sponsored: bool,
    pub nonce: u64,
    pub fee: u64,
    /// Serialized post conditions, hex encoded
    pub post_conditions: Vec<String>,
    pub post_condition_mode: PostConditionMode,
    pub anchor_mode: AnchorMode,
    #[serde(flatten)]
    pub kind: RequestKind,
}

/// Per-kind request fields, tagged by `txType`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "txType")]
pub enum RequestKind {
    #[serde(rename = "token_transfer")]
    StxTransfer {
        recipient: String,
        amount: String,
        memo: String,
    },
    #[serde(rename = "contract_call", rename_all = "camelCase")]
    ContractCall {
        contract_address: String,
        contract_name: String,
        function_name: String,
        function_args: Vec<String>,
    },
    #[serde(rename = "smart_contract", rename_all = "camelCase")]
    ContractDeploy {
        contract_name: String,
        code_body: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        clarity_version: Option<u8>,
    },
}

/// Contract call requested by an app, arguments and post conditions hex encoded
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCallRequest {
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    #[serde(default)]
    pub function_args: Vec<String>,
    #[serde(default)]
    pub post_conditions: Vec<String>,
    #[serde(default)]
    pub post_condition_mode: Option<PostConditionMode>,
    #[serde(default)]
    pub sponsored: bool,
}

/// Unsigned contract call plus what the confirmation screen needs to render it
#[derive(Debug, Clone)]
pub struct ContractCallPromises {
    pub unsigned_contract_call: StacksTransaction,
    pub contract_interface: ContractInterface,
    /// Metadata of the fungible tokens named by the post conditions
    pub coins_metadata: Vec<CoinMetadata>,
    /// Deny mode with no post conditions: the call cannot move any asset
    pub show_post_condition_message: bool,
}

/// Map a signed or unsigned transaction onto the wallet request shape
pub fn tx_payload_to_request(
    codec: &dyn TransactionCodec,
    tx: &StacksTransaction,
    stx_address: Option<&str>,
    attachment: Option<&str>,
) -> WalletResult<TransactionRequest> {
    let kind = match &tx.payload {
        TransactionPayload::TokenTransfer {
            recipient,
            amount,
            memo,
        } => RequestKind::StxTransfer {
            recipient: recipient.to_string(),
            amount: format_amount(*amount),
            memo: clean_memo(memo),
        },
        TransactionPayload::ContractCall {
            contract_address,
            contract_name,
            function_name,
            function_args,
        } => RequestKind::ContractCall {
            contract_address: contract_address.clone(),
            contract_name: contract_name.clone(),
            function_name: function_name.clone(),
            function_args: function_args
                .iter()
                .map(|arg| hex::encode(codec.serialize_clarity_value(arg)))
                .collect(),
        },
        TransactionPayload::SmartContract {
            contract_name,
            code_body,
        } => RequestKind::ContractDeploy {
            contract_name: contract_name.clone(),
            code_body: code_body.clone(),
            clarity_version: None,
        },
        TransactionPayload::VersionedSmartContract {
            contract_name,
            code_body,
            clarity_version,
        } => RequestKind::ContractDeploy {
            contract_name: contract_name.clone(),
            code_body: code_body.clone(),
            clarity_version: Some(*clarity_version as u8),
        },
        other => return Err(WalletError::UnsupportedPayload(other.name().to_string())),
    };

    let origin = tx.auth.spending_condition();
    Ok(TransactionRequest {
        attachment: attachment.map(str::to_string),
        stx_address: stx_address.map(str::to_string),
        sponsored: tx.auth.auth_type() == AuthType::Sponsored,
        nonce: origin.nonce,
        fee: origin.fee,
        post_conditions: tx
            .post_conditions
            .iter()
            .map(|pc| hex::encode(codec.serialize_post_condition(pc)))
            .collect(),
        post_condition_mode: tx.post_condition_mode,
        anchor_mode: tx.anchor_mode,
        kind,
    })
}

/// STX transfer with the send multiplier applied and optional auth override
pub async fn get_token_transfer_request(
    builder: &TransactionBuilder,
    transfer: &StxTransfer,
    fee_multipliers: Option<&FeesMultipliers>,
    pending: Option<&StxPendingTxData>,
    auth: Option<Authorization>,
) -> WalletResult<StacksTransaction> {
    let pending_txs = pending
        .map(|p| p.pending_transactions.as_slice())
        .unwrap_or_default();

    let mut tx = builder
        .generate_unsigned_stx_token_transfer_transaction(transfer, pending_txs)
        .await?;

    // increase the estimated fee by the send multiplier
    let multiplier = fee_multipliers.and_then(|m| m.for_payload(&tx.payload));
    apply_fee_multiplier(&mut tx, multiplier)?;

    if let Some(auth) = auth {
        debug!("Replacing auth of transfer to {}", transfer.recipient_address);
        tx.auth = auth;
    }
    Ok(tx)
}

/// Build the unsigned contract call an app requested, fetching the contract
/// interface and token metadata alongside
#[allow(clippy::too_many_arguments)]
pub async fn get_contract_call_promises(
    builder: &TransactionBuilder,
    codec: &dyn TransactionCodec,
    metadata: &dyn ContractMetadata,
    request: &ContractCallRequest,
    public_key: &str,
    fee_multipliers: Option<&FeesMultipliers>,
    pending: Option<&StxPendingTxData>,
    auth: Option<Authorization>,
) -> WalletResult<ContractCallPromises> {
    let function_args = request
        .function_args
        .iter()
        .map(|arg| decode_hex(arg).and_then(|bytes| codec.deserialize_clarity_value(&bytes)))
        .collect::<WalletResult<Vec<ClarityValue>>>()?;
    let post_conditions = request
        .post_conditions
        .iter()
        .map(|pc| decode_hex(pc).and_then(|bytes| codec.deserialize_post_condition(&bytes)))
        .collect::<WalletResult<Vec<PostCondition>>>()?;

    let mut token_ids: Vec<String> = Vec::new();
    for pc in &post_conditions {
        if let PostCondition::Fungible { asset_info, .. } = pc {
            let id = asset_info.contract_id();
            if !token_ids.contains(&id) {
                token_ids.push(id);
            }
        }
    }

    let show_post_condition_message = request.post_condition_mode
        == Some(PostConditionMode::Deny)
        && post_conditions.is_empty();

    let call = UnsignedContractCall {
        public_key: public_key.to_string(),
        contract_address: request.contract_address.clone(),
        contract_name: request.contract_name.clone(),
        function_name: request.function_name.clone(),
        function_args,
        post_conditions,
        post_condition_mode: request.post_condition_mode,
        sponsored: request.sponsored,
        nonce: None,
    };
    let pending_txs: &[PendingTransaction] = pending
        .map(|p| p.pending_transactions.as_slice())
        .unwrap_or_default();
    let network = builder.network();

    let (mut tx, contract_interface, coins_metadata) = futures::try_join!(
        builder.generate_contract_call_transaction(call, pending_txs),
        metadata.contract_interface(&request.contract_address, &request.contract_name, network),
        metadata.coins_metadata(&token_ids, network),
    )?;

    let multiplier = fee_multipliers.and_then(|m| m.for_payload(&tx.payload));
    apply_fee_multiplier(&mut tx, multiplier)?;

    if let Some(auth) = auth {
        debug!(
            "Replacing auth of call to {}.{}::{}",
            request.contract_address, request.contract_name, request.function_name
        );
        tx.auth = auth;
    }

    Ok(ContractCallPromises {
        unsigned_contract_call: tx,
        contract_interface,
        coins_metadata,
        show_post_condition_message,
    })
}

fn decode_hex(value: &str) -> WalletResult<Vec<u8>> {
    Ok(hex::decode(value.trim_start_matches("0x"))?)
}

/// True when the origin spends from a multisig address
pub fn is_multi_sig(tx: &StacksTransaction) -> bool {
    tx.auth.spending_condition().hash_mode.is_multi_sig()
}

/// Drop the NUL padding the chain stores memos with
fn clean_memo(memo: &str) -> String {
    memo.replace('\u{0}', "")
}

/// Integer amount with en-US thousands separators
fn format_amount(amount: u64) -> String {
    amount.separated_string()
}
