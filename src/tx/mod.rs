//! Transaction construction, nonce sequencing, fee adjustment and submission

pub mod builder;
pub mod fee;
pub mod nonce;
pub mod sender;

pub use builder::{StxTransfer, TokenTransfer, TransactionBuilder, UnsignedContractCall};
pub use fee::{apply_fee_multiplier, FeeEstimator, FeeMultiplier, FeesMultipliers};
pub use nonce::{next_nonce, PendingTransaction, StxPendingTxData};
pub use sender::TransactionSender;
