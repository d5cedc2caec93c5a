//! Nonce sequencing around transactions still in the mempool
//!
//! The account endpoint reports the next nonce from confirmed state only, so
//! transactions that were broadcast but not yet mined are invisible to it.
//! A new transaction must be sequenced after the highest pending nonce or it
//! would replace (or be rejected against) one of them.

use crate::error::{WalletError, WalletResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Unconfirmed transaction observed in the mempool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPendingTransaction")]
pub struct PendingTransaction {
    pub tx_id: String,
    pub nonce: u64,
    pub tx_status: String,
    pub tx_type: String,
    pub sender_address: Option<String>,
    pub fee_rate: Option<u64>,
    pub receipt_time_iso: Option<DateTime<Utc>>,
}

impl PendingTransaction {
    pub fn new(tx_id: impl Into<String>, nonce: u64) -> Self {
        Self {
            tx_id: tx_id.into(),
            nonce,
            tx_status: "pending".to_string(),
            tx_type: String::new(),
            sender_address: None,
            fee_rate: None,
            receipt_time_iso: None,
        }
    }
}

/// Mempool entry as returned by the API, before validation
#[derive(Deserialize)]
struct RawPendingTransaction {
    #[serde(alias = "txid")]
    tx_id: String,
    nonce: Value,
    #[serde(default)]
    tx_status: String,
    #[serde(default)]
    tx_type: String,
    #[serde(default)]
    sender_address: Option<String>,
    #[serde(default)]
    fee_rate: Option<Value>,
    #[serde(default)]
    receipt_time_iso: Option<DateTime<Utc>>,
}

impl TryFrom<RawPendingTransaction> for PendingTransaction {
    type Error = WalletError;

    fn try_from(raw: RawPendingTransaction) -> WalletResult<Self> {
        let nonce = parse_unsigned(&raw.nonce).ok_or_else(|| WalletError::MalformedNonce {
            tx_id: raw.tx_id.clone(),
            value: raw.nonce.to_string(),
        })?;
        let fee_rate = match &raw.fee_rate {
            Some(value) => Some(parse_unsigned(value).ok_or_else(|| {
                WalletError::InvalidAmount(format!("fee_rate {} of {}", value, raw.tx_id))
            })?),
            None => None,
        };

        Ok(Self {
            tx_id: raw.tx_id,
            nonce,
            tx_status: raw.tx_status,
            tx_type: raw.tx_type,
            sender_address: raw.sender_address,
            fee_rate,
            receipt_time_iso: raw.receipt_time_iso,
        })
    }
}

/// Accepts non-negative JSON integers and decimal digit strings
fn parse_unsigned(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().ok()
        }
        _ => None,
    }
}

/// Pending transactions of the sending account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StxPendingTxData {
    pub pending_transactions: Vec<PendingTransaction>,
}

/// One page of the address mempool endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MempoolPage {
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub total: u64,
    pub results: Vec<PendingTransaction>,
}

impl MempoolPage {
    /// Parse a mempool response body, rejecting malformed nonces
    pub fn from_json(body: &str) -> WalletResult<Self> {
        Ok(serde_json::from_str(body)?)
    }
}

/// Nonce for a new transaction given the confirmed nonce and the mempool
///
/// Returns `confirmed_nonce` when nothing is pending or every pending nonce is
/// already below it, otherwise one past the highest pending nonce.
pub fn next_nonce(confirmed_nonce: u64, pending: &[PendingTransaction]) -> WalletResult<u64> {
    let Some(max_pending) = pending.iter().map(|tx| tx.nonce).max() else {
        return Ok(confirmed_nonce);
    };

    if max_pending < confirmed_nonce {
        return Ok(confirmed_nonce);
    }

    let nonce = max_pending
        .checked_add(1)
        .ok_or(WalletError::NonceOverflow { max_pending })?;

    debug!(
        "Bumped nonce from {} to {} over {} pending transactions",
        confirmed_nonce,
        nonce,
        pending.len()
    );
    Ok(nonce)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(nonces: &[u64]) -> Vec<PendingTransaction> {
        nonces
            .iter()
            .enumerate()
            .map(|(i, n)| PendingTransaction::new(format!("0x{:02x}", i), *n))
            .collect()
    }

    #[test]
    fn test_no_pending_keeps_confirmed_nonce() {
        assert_eq!(next_nonce(5, &[]).unwrap(), 5);
        assert_eq!(next_nonce(0, &[]).unwrap(), 0);
    }

    #[test]
    fn test_pending_at_or_above_confirmed_bumps_past_max() {
        assert_eq!(next_nonce(5, &pending(&[5, 6])).unwrap(), 7);
        assert_eq!(next_nonce(5, &pending(&[9, 5])).unwrap(), 10);
        assert_eq!(next_nonce(0, &pending(&[0])).unwrap(), 1);
    }

    #[test]
    fn test_stale_pending_is_ignored() {
        assert_eq!(next_nonce(5, &pending(&[2, 3])).unwrap(), 5);
    }

    #[test]
    fn test_policy_properties_over_small_domain() {
        for confirmed in 0..8u64 {
            for a in 0..8u64 {
                for b in 0..8u64 {
                    let txs = pending(&[a, b]);
                    let first = next_nonce(confirmed, &txs).unwrap();
                    let max = a.max(b);

                    assert!(first >= confirmed);
                    if max >= confirmed {
                        assert_eq!(first, max + 1);
                    } else {
                        assert_eq!(first, confirmed);
                    }
                    assert_eq!(next_nonce(confirmed, &txs).unwrap(), first);
                }
            }
        }
    }

    #[test]
    fn test_max_nonce_overflow_is_an_error() {
        let err = next_nonce(3, &pending(&[u64::MAX])).unwrap_err();
        assert!(matches!(err, WalletError::NonceOverflow { max_pending } if max_pending == u64::MAX));
    }

    #[test]
    fn test_mempool_page_parsing() {
        let body = r#"{
            "limit": 20, "offset": 0, "total": 2,
            "results": [
                {"tx_id": "0xaa", "nonce": 12, "tx_status": "pending", "tx_type": "token_transfer",
                 "sender_address": "SP3FBR2AGK5H9QBDH3EEN6DF8EK8JY7RX8QJ5SVTE", "fee_rate": "180",
                 "receipt_time": 1700000000, "receipt_time_iso": "2023-11-14T22:13:20.000Z"},
                {"tx_id": "0xbb", "nonce": "13", "tx_status": "pending", "tx_type": "contract_call"}
            ]
        }"#;
        let page = MempoolPage::from_json(body).unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.results[0].nonce, 12);
        assert_eq!(page.results[0].fee_rate, Some(180));
        assert!(page.results[0].receipt_time_iso.is_some());
        assert_eq!(page.results[1].nonce, 13);
        assert_eq!(next_nonce(12, &page.results).unwrap(), 14);
    }

    #[test]
    fn test_malformed_nonces_are_rejected() {
        for nonce in [r#"-1"#, r#"1.5"#, r#""abc""#, r#"null"#, r#""""#, r#""-3""#] {
            let body = format!(r#"[{{"tx_id": "0xcc", "nonce": {}}}]"#, nonce);
            let result: Result<Vec<PendingTransaction>, _> = serde_json::from_str(&body);
            let err = result.unwrap_err().to_string();
            assert!(err.contains("Malformed nonce"), "{} -> {}", nonce, err);
        }
    }

    #[test]
    fn test_pending_tx_data_camel_case() {
        let data: StxPendingTxData = serde_json::from_str(
            r#"{"pendingTransactions": [{"txid": "0x01", "nonce": 4}]}"#,
        )
        .unwrap();
        assert_eq!(data.pending_transactions.len(), 1);
        assert_eq!(data.pending_transactions[0].tx_id, "0x01");
    }
}
