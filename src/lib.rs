//! Stacks wallet transaction layer
//!
//! Builds unsigned STX and SIP-010/SIP-009 transfers, sequences nonces around
//! pending mempool transactions, applies fee multipliers, signs and broadcasts
//! with txid verification, and maps payloads to wallet-connect requests.

pub mod account;
pub mod chain;
pub mod config;
pub mod connect;
pub mod constants;
pub mod error;
pub mod events;
pub mod metrics;
pub mod tx;

pub use error::{WalletError, WalletResult};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the default filter. Returns false when a subscriber
/// is already installed.
pub fn init_logging() -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stx_wallet_tx=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .try_init()
        .is_ok()
}
