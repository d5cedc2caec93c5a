//! Unsigned transaction construction
//!
//! Maps wallet-level parameters onto the SDK builders, then estimates the
//! fee and sequences the nonce around the account's pending transactions.

use super::fee::FeeEstimator;
use super::nonce::{next_nonce, PendingTransaction};
use crate::chain::sdk::{ContractCallOptions, TokenTransferOptions};
use crate::chain::{
    AnchorMode, AssetInfo, ClarityValue, FungibleConditionCode, NonFungibleConditionCode,
    PostCondition, PostConditionMode, Principal, StacksNetwork, StacksSdk, StacksTransaction,
    TransactionCodec,
};
use crate::error::{WalletError, WalletResult};

use std::sync::Arc;
use tracing::{debug, info};

/// SIP-009 / SIP-010 transfer function
const TRANSFER_FUNCTION: &str = "transfer";

/// STX transfer request
#[derive(Debug, Clone)]
pub struct StxTransfer {
    pub public_key: String,
    pub recipient_address: String,
    /// Amount in micro-STX, as a decimal string
    pub amount: String,
    pub memo: Option<String>,
    pub sponsored: bool,
}

/// Contract call request
#[derive(Debug, Clone)]
pub struct UnsignedContractCall {
    pub public_key: String,
    pub contract_address: String,
    pub contract_name: String,
    pub function_name: String,
    pub function_args: Vec<ClarityValue>,
    pub post_conditions: Vec<PostCondition>,
    /// Allow when unset
    pub post_condition_mode: Option<PostConditionMode>,
    pub sponsored: bool,
    /// Left to the SDK when unset
    pub nonce: Option<u64>,
}

/// Fungible or non-fungible token transfer through the token contract
#[derive(Debug, Clone)]
pub struct TokenTransfer {
    pub public_key: String,
    pub contract_address: String,
    pub contract_name: String,
    pub asset_name: String,
    pub sender_address: String,
    pub recipient_address: String,
    /// Token amount for fungible tokens, hex encoded Clarity asset id for NFTs
    pub amount: String,
    pub is_nft: bool,
    pub memo: Option<String>,
    pub pending_txs: Vec<PendingTransaction>,
}

impl TokenTransfer {
    fn asset_info(&self) -> AssetInfo {
        AssetInfo {
            contract_address: self.contract_address.clone(),
            contract_name: self.contract_name.clone(),
            asset_name: self.asset_name.clone(),
        }
    }
}

/// Sender sends exactly `amount` of the fungible token
pub fn make_fungible_post_condition(transfer: &TokenTransfer) -> WalletResult<PostCondition> {
    Ok(PostCondition::Fungible {
        principal: Principal::Standard(transfer.sender_address.clone()),
        condition_code: FungibleConditionCode::Equal,
        amount: parse_amount(&transfer.amount)?,
        asset_info: transfer.asset_info(),
    })
}

/// Sender gives up the NFT identified by `asset_id`
pub fn make_non_fungible_post_condition(
    transfer: &TokenTransfer,
    asset_id: ClarityValue,
) -> PostCondition {
    PostCondition::NonFungible {
        principal: Principal::Standard(transfer.sender_address.clone()),
        condition_code: NonFungibleConditionCode::Sends,
        asset_info: transfer.asset_info(),
        asset_id,
    }
}

fn parse_amount(amount: &str) -> WalletResult<u64> {
    amount
        .trim()
        .parse()
        .map_err(|_| WalletError::InvalidAmount(amount.to_string()))
}

/// Builds unsigned transactions for one network
pub struct TransactionBuilder {
    sdk: Arc<dyn StacksSdk>,
    codec: Arc<dyn TransactionCodec>,
    fee_estimator: FeeEstimator,
    network: StacksNetwork,
}

impl TransactionBuilder {
    /// Create a new transaction builder
    pub fn new(
        sdk: Arc<dyn StacksSdk>,
        codec: Arc<dyn TransactionCodec>,
        network: StacksNetwork,
    ) -> Self {
        Self {
            fee_estimator: FeeEstimator::new(sdk.clone()),
            sdk,
            codec,
            network,
        }
    }

    pub fn network(&self) -> &StacksNetwork {
        &self.network
    }

    /// Unsigned STX transfer with a zero fee and the SDK-assigned nonce
    pub async fn generate_unsigned_stx_token_transfer(
        &self,
        transfer: &StxTransfer,
    ) -> WalletResult<StacksTransaction> {
        let options = TokenTransferOptions {
            public_key: transfer.public_key.clone(),
            recipient: transfer.recipient_address.clone(),
            amount: parse_amount(&transfer.amount)?,
            memo: transfer.memo.clone().unwrap_or_default(),
            network: self.network.clone(),
            fee: 0,
            nonce: None,
            sponsored: transfer.sponsored,
            anchor_mode: AnchorMode::Any,
        };

        self.sdk.make_unsigned_token_transfer(options).await
    }

    /// Fee-estimated STX transfer sequenced after `pending_txs`
    pub async fn generate_unsigned_stx_token_transfer_transaction(
        &self,
        transfer: &StxTransfer,
        pending_txs: &[PendingTransaction],
    ) -> WalletResult<StacksTransaction> {
        let mut tx = self.generate_unsigned_stx_token_transfer(transfer).await?;

        let fee = self.fee_estimator.estimate_fees(&tx, &self.network).await?;
        tx.set_fee(fee);

        let nonce = next_nonce(tx.nonce(), pending_txs)?;
        tx.set_nonce(nonce);

        info!(
            "Built STX transfer of {} to {} (nonce {}, fee {})",
            transfer.amount, transfer.recipient_address, nonce, fee
        );
        crate::metrics::record_tx_built(tx.payload.name());
        Ok(tx)
    }

    /// Unsigned contract call
    pub async fn generate_unsigned_contract_call(
        &self,
        call: UnsignedContractCall,
    ) -> WalletResult<StacksTransaction> {
        let options = ContractCallOptions {
            contract_address: call.contract_address,
            contract_name: call.contract_name,
            function_name: call.function_name,
            function_args: call.function_args,
            public_key: call.public_key,
            network: self.network.clone(),
            post_conditions: call.post_conditions,
            post_condition_mode: call.post_condition_mode.unwrap_or(PostConditionMode::Allow),
            anchor_mode: AnchorMode::Any,
            sponsored: call.sponsored,
            nonce: call.nonce,
        };

        self.sdk.make_unsigned_contract_call(options).await
    }

    /// Fee-estimated contract call sequenced after `pending_txs`
    pub async fn generate_contract_call_transaction(
        &self,
        call: UnsignedContractCall,
        pending_txs: &[PendingTransaction],
    ) -> WalletResult<StacksTransaction> {
        let mut tx = self.generate_unsigned_contract_call(call).await?;

        let fee = self.estimate_contract_call_fees(&tx).await?;
        tx.set_fee(fee);

        // bump nonce past pending transactions
        let nonce = next_nonce(tx.nonce(), pending_txs)?;
        tx.set_nonce(nonce);

        crate::metrics::record_tx_built(tx.payload.name());
        Ok(tx)
    }

    /// Estimate the fee of a contract call on this builder's network
    pub async fn estimate_contract_call_fees(&self, tx: &StacksTransaction) -> WalletResult<u64> {
        self.fee_estimator
            .estimate_contract_call_fees(tx, &self.network)
            .await
    }

    /// Fungible or non-fungible token `transfer` call, fee-estimated and
    /// sequenced after the pending transactions
    pub async fn generate_unsigned_transaction(
        &self,
        transfer: TokenTransfer,
    ) -> WalletResult<StacksTransaction> {
        let sender = ClarityValue::standard_principal(&transfer.sender_address);
        let recipient = ClarityValue::standard_principal(&transfer.recipient_address);

        let (function_args, post_condition) = if transfer.is_nft {
            let asset_id = self.hex_to_cv(&transfer.amount)?;
            let post_condition = make_non_fungible_post_condition(&transfer, asset_id.clone());
            (vec![asset_id, sender, recipient], post_condition)
        } else {
            let amount = parse_amount(&transfer.amount)?;
            let memo = match transfer.memo.as_deref() {
                Some(memo) if !memo.is_empty() => {
                    ClarityValue::some(ClarityValue::buffer_from_str(memo))
                }
                _ => ClarityValue::OptionalNone,
            };
            let post_condition = make_fungible_post_condition(&transfer)?;
            (
                vec![ClarityValue::UInt(u128::from(amount)), sender, recipient, memo],
                post_condition,
            )
        };

        let call = UnsignedContractCall {
            public_key: transfer.public_key.clone(),
            contract_address: transfer.contract_address.clone(),
            contract_name: transfer.contract_name.clone(),
            function_name: TRANSFER_FUNCTION.to_string(),
            function_args,
            post_conditions: vec![post_condition],
            post_condition_mode: None,
            sponsored: false,
            nonce: None,
        };
        let tx = self
            .generate_contract_call_transaction(call, &transfer.pending_txs)
            .await?;

        info!(
            "Built {} transfer of {} on {}.{} (nonce {}, fee {})",
            if transfer.is_nft { "NFT" } else { "FT" },
            transfer.asset_name,
            transfer.contract_address,
            transfer.contract_name,
            tx.nonce(),
            tx.fee()
        );
        Ok(tx)
    }

    /// Decode a hex encoded Clarity value, with or without `0x`
    fn hex_to_cv(&self, value: &str) -> WalletResult<ClarityValue> {
        let bytes = hex::decode(value.trim_start_matches("0x"))?;
        let cv = self.codec.deserialize_clarity_value(&bytes)?;
        debug!("Decoded asset id {:?}", cv);
        Ok(cv)
    }
}
