//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Transactions built per payload type
//! - Signatures per network
//! - Broadcast outcomes (accepted, rejected, txid mismatch)

use crate::chain::NetworkType;
use crate::error::WalletResult;

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};

lazy_static! {
    pub static ref TX_BUILT: CounterVec = register_counter_vec!(
        "stx_wallet_transactions_built_total",
        "Total unsigned transactions built",
        &["tx_type"]
    ).unwrap();

    pub static ref TX_SIGNED: CounterVec = register_counter_vec!(
        "stx_wallet_transactions_signed_total",
        "Total transactions signed",
        &["network"]
    ).unwrap();

    pub static ref TX_BROADCAST: CounterVec = register_counter_vec!(
        "stx_wallet_transactions_broadcast_total",
        "Total broadcast attempts by outcome",
        &["network", "result"]
    ).unwrap();
}

/// Render the default registry in the text exposition format
pub fn render() -> WalletResult<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// Helper functions to record metrics

pub fn record_tx_built(tx_type: &str) {
    TX_BUILT.with_label_values(&[tx_type]).inc();
}

pub fn record_tx_signed(network: NetworkType) {
    TX_SIGNED
        .with_label_values(&[&network.to_string()])
        .inc();
}

pub fn record_tx_broadcast(network: NetworkType, result: &str) {
    TX_BROADCAST
        .with_label_values(&[&network.to_string(), result])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_counters() {
        record_tx_built("token_transfer");
        record_tx_signed(NetworkType::Testnet);
        record_tx_broadcast(NetworkType::Mainnet, "accepted");

        let text = render().unwrap();
        assert!(text.contains("stx_wallet_transactions_built_total{tx_type=\"token_transfer\"}"));
        assert!(text.contains("stx_wallet_transactions_signed_total{network=\"Testnet\"}"));
        assert!(text.contains("result=\"accepted\""));
    }
}
