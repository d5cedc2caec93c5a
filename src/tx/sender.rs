//! Transaction signing and broadcast with txid verification

use crate::chain::{
    BroadcastResult, KeyChain, StacksNetwork, StacksSdk, StacksTransaction, TransactionCodec,
};
use crate::error::{WalletError, WalletResult};

use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Signs and broadcasts transactions for one network
pub struct TransactionSender {
    /// SDK signer and broadcaster
    sdk: Arc<dyn StacksSdk>,
    /// Codec for local txid computation
    codec: Arc<dyn TransactionCodec>,
    /// Seed phrase to private key derivation
    key_chain: Arc<dyn KeyChain>,
    network: StacksNetwork,
}

impl TransactionSender {
    /// Create a new transaction sender
    pub fn new(
        sdk: Arc<dyn StacksSdk>,
        codec: Arc<dyn TransactionCodec>,
        key_chain: Arc<dyn KeyChain>,
        network: StacksNetwork,
    ) -> Self {
        Self {
            sdk,
            codec,
            key_chain,
            network,
        }
    }

    pub fn network(&self) -> &StacksNetwork {
        &self.network
    }

    /// Sign the origin of `unsigned_tx` with the account's derived key
    pub async fn sign_transaction(
        &self,
        unsigned_tx: StacksTransaction,
        seed_phrase: &str,
        account_index: u64,
    ) -> WalletResult<StacksTransaction> {
        let private_key = self
            .key_chain
            .stx_private_key(seed_phrase, self.network.chain_id(), account_index)
            .await?;

        let mut tx = unsigned_tx;
        self.sdk.sign_origin(&mut tx, &private_key)?;

        debug!(
            "Signed {} with nonce {} for account {}",
            tx.payload.name(),
            tx.nonce(),
            account_index
        );
        crate::metrics::record_tx_signed(self.network.network_type);
        Ok(tx)
    }

    /// Sign every transaction concurrently; any failure fails the batch
    pub async fn sign_multi_transactions(
        &self,
        unsigned_txs: Vec<StacksTransaction>,
        account_index: u64,
        seed_phrase: &str,
    ) -> WalletResult<Vec<StacksTransaction>> {
        let count = unsigned_txs.len();
        let signing = unsigned_txs
            .into_iter()
            .map(|tx| self.sign_transaction(tx, seed_phrase, account_index));

        let signed = try_join_all(signing).await.map_err(|e| {
            warn!("Batch signing of {} transactions failed: {}", count, e);
            e
        })?;

        info!("Signed {} transactions for account {}", count, account_index);
        Ok(signed)
    }

    /// Broadcast a signed transaction and return its txid
    ///
    /// The node's txid must match the locally computed one; a mismatch means
    /// the node accepted something other than what was signed.
    pub async fn broadcast_signed_transaction(
        &self,
        signed_tx: &StacksTransaction,
    ) -> WalletResult<String> {
        let local_txid = self.codec.txid(signed_tx);

        let result = self
            .sdk
            .broadcast(signed_tx, &self.network)
            .await
            .map_err(|e| {
                if e.is_retryable() {
                    warn!("Retryable error broadcasting {}: {}", local_txid, e);
                } else {
                    error!("Failed to broadcast {}: {}", local_txid, e);
                }
                crate::metrics::record_tx_broadcast(self.network.network_type, "error");
                e
            })?;

        match result {
            BroadcastResult::Rejected { reason } => {
                warn!(
                    "Transaction {} rejected by {}: {}",
                    local_txid,
                    self.network.broadcast_endpoint(),
                    reason
                );
                crate::metrics::record_tx_broadcast(self.network.network_type, "rejected");
                Err(WalletError::BroadcastRejected { reason })
            }
            BroadcastResult::Ok { txid } => {
                if normalize_txid(&txid) != normalize_txid(&local_txid) {
                    error!(
                        "Broadcast txid mismatch: node returned {}, signed {}",
                        txid, local_txid
                    );
                    crate::metrics::record_tx_broadcast(self.network.network_type, "mismatch");
                    return Err(WalletError::TxIdMismatch {
                        expected: local_txid,
                        actual: txid,
                    });
                }

                info!("Transaction broadcast: {}", txid);
                crate::metrics::record_tx_broadcast(self.network.network_type, "accepted");
                Ok(txid)
            }
        }
    }
}

fn normalize_txid(txid: &str) -> String {
    txid.trim_start_matches("0x").to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::sdk::testing::{FakeCodec, FakeKeyChain, FakeSdk};
    use crate::chain::types::fixtures;

    fn sender(sdk: FakeSdk, network: StacksNetwork) -> TransactionSender {
        TransactionSender::new(
            Arc::new(sdk),
            Arc::new(FakeCodec),
            Arc::new(FakeKeyChain),
            network,
        )
    }

    #[tokio::test]
    async fn test_sign_uses_network_chain_id() {
        let sender = sender(FakeSdk::new(0), StacksNetwork::testnet());
        let mut unsigned = fixtures::token_transfer(10, "");
        unsigned.set_nonce(3);

        let signed = sender
            .sign_transaction(unsigned, "seed words", 2)
            .await
            .unwrap();

        let signature = signed.auth.spending_condition().signature.clone().unwrap();
        assert_eq!(signature, "sig:800000000002:3");
    }

    #[tokio::test]
    async fn test_sign_propagates_key_derivation_error() {
        let sender = sender(FakeSdk::new(0), StacksNetwork::mainnet());
        let err = sender
            .sign_transaction(fixtures::token_transfer(1, ""), "", 0)
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::KeyDerivation { account_index: 0, .. }));
    }

    #[tokio::test]
    async fn test_sign_many_preserves_order() {
        let sender = sender(FakeSdk::new(0), StacksNetwork::mainnet());
        let unsigned: Vec<_> = (0..4)
            .map(|n| {
                let mut tx = fixtures::token_transfer(n, "");
                tx.set_nonce(n);
                tx
            })
            .collect();

        let signed = sender
            .sign_multi_transactions(unsigned, 0, "seed words")
            .await
            .unwrap();

        assert_eq!(signed.len(), 4);
        for (n, tx) in signed.iter().enumerate() {
            assert_eq!(tx.nonce(), n as u64);
            assert!(tx.auth.spending_condition().is_signed());
        }
    }

    #[tokio::test]
    async fn test_sign_many_is_all_or_nothing() {
        let sender = sender(FakeSdk::new(0), StacksNetwork::mainnet());
        let unsigned = vec![fixtures::token_transfer(1, ""), fixtures::token_transfer(2, "")];

        let err = sender
            .sign_multi_transactions(unsigned, 0, "bad seed")
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Signing(_)));
    }

    #[tokio::test]
    async fn test_sign_many_fails_whole_batch_on_one_bad_transaction() {
        let mut sdk = FakeSdk::new(0);
        sdk.fail_sign_nonce = Some(1);
        let sender = sender(sdk, StacksNetwork::mainnet());
        let unsigned: Vec<_> = (0..3)
            .map(|n| {
                let mut tx = fixtures::token_transfer(n + 1, "");
                tx.set_nonce(n);
                tx
            })
            .collect();

        let result = sender
            .sign_multi_transactions(unsigned, 0, "seed words")
            .await;
        match result {
            Err(WalletError::Signing(message)) => assert!(message.contains("nonce 1")),
            other => panic!("expected batch failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broadcast_network_error_is_retryable() {
        let mut sdk = FakeSdk::new(0);
        sdk.broadcast_error = Some("connection reset".to_string());
        let sender = sender(sdk, StacksNetwork::mainnet());

        let err = sender
            .broadcast_signed_transaction(&fixtures::token_transfer(1, ""))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!err.is_integrity_failure());
    }

    #[tokio::test]
    async fn test_broadcast_returns_matching_txid() {
        let sender = sender(FakeSdk::new(0), StacksNetwork::mainnet());
        let tx = fixtures::token_transfer(1, "");

        let txid = sender.broadcast_signed_transaction(&tx).await.unwrap();
        assert_eq!(txid, FakeCodec.txid(&tx));
    }

    #[tokio::test]
    async fn test_broadcast_accepts_prefixed_txid() {
        let tx = fixtures::token_transfer(1, "");
        let mut sdk = FakeSdk::new(0);
        sdk.broadcast_txid = Some(format!("0x{}", FakeCodec.txid(&tx).to_uppercase()));
        let sender = sender(sdk, StacksNetwork::mainnet());

        assert!(sender.broadcast_signed_transaction(&tx).await.is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_txid_mismatch_is_integrity_error() {
        let mut sdk = FakeSdk::new(0);
        sdk.broadcast_txid = Some("deadbeef".to_string());
        let sender = sender(sdk, StacksNetwork::mainnet());

        let err = sender
            .broadcast_signed_transaction(&fixtures::token_transfer(1, ""))
            .await
            .unwrap_err();
        assert!(err.is_integrity_failure());
        assert!(err.to_string().starts_with("post condition error"));
    }

    #[tokio::test]
    async fn test_broadcast_rejection_surfaces_reason() {
        let mut sdk = FakeSdk::new(0);
        sdk.reject_reason = Some("ConflictingNonceInMempool".to_string());
        let sender = sender(sdk, StacksNetwork::testnet());

        let err = sender
            .broadcast_signed_transaction(&fixtures::token_transfer(1, ""))
            .await
            .unwrap_err();
        match err {
            WalletError::BroadcastRejected { reason } => {
                assert_eq!(reason, "ConflictingNonceInMempool")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
