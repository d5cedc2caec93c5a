//! Fee estimation and fee multipliers
//!
//! Estimates come from the SDK. Multipliers are exact rationals so a factor
//! such as 1.5 applied to a whole fee never loses precision to floats.

use crate::chain::{StacksNetwork, StacksSdk, StacksTransaction, TransactionPayload};
use crate::error::{WalletError, WalletResult};

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Rational factor applied to an estimated fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawMultiplier")]
pub struct FeeMultiplier {
    numerator: u128,
    denominator: u128,
}

impl FeeMultiplier {
    pub fn new(numerator: u128, denominator: u128) -> WalletResult<Self> {
        if denominator == 0 {
            return Err(WalletError::InvalidFeeMultiplier(format!(
                "{}/0 has a zero denominator",
                numerator
            )));
        }
        let divisor = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn whole(factor: u64) -> Self {
        Self {
            numerator: u128::from(factor),
            denominator: 1,
        }
    }

    /// Exact rational value of a non-negative decimal
    pub fn from_decimal(value: Decimal) -> WalletResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(WalletError::InvalidFeeMultiplier(value.to_string()));
        }
        let numerator = value.mantissa().unsigned_abs();
        let denominator = 10u128.pow(value.scale());
        Self::new(numerator, denominator)
    }

    pub fn numerator(&self) -> u128 {
        self.numerator
    }

    pub fn denominator(&self) -> u128 {
        self.denominator
    }

    /// `ceil(fee * self)`, failing when the result does not fit in u64
    pub fn apply(&self, fee: u64) -> WalletResult<u64> {
        let overflow = || WalletError::FeeOverflow {
            fee,
            multiplier: self.to_string(),
        };
        let scaled = u128::from(fee)
            .checked_mul(self.numerator)
            .ok_or_else(overflow)?;
        let result = scaled / self.denominator + u128::from(scaled % self.denominator != 0);

        u64::try_from(result).map_err(|_| overflow())
    }
}

impl fmt::Display for FeeMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl FromStr for FeeMultiplier {
    type Err = WalletError;

    /// Parses `"2"`, `"1.5"` or `"3/2"`
    fn from_str(s: &str) -> WalletResult<Self> {
        let invalid = || WalletError::InvalidFeeMultiplier(s.to_string());
        let s_trimmed = s.trim();

        if let Some((num, den)) = s_trimmed.split_once('/') {
            let numerator = num.trim().parse().map_err(|_| invalid())?;
            let denominator = den.trim().parse().map_err(|_| invalid())?;
            return Self::new(numerator, denominator);
        }

        let value = Decimal::from_str(s_trimmed).map_err(|_| invalid())?;
        Self::from_decimal(value)
    }
}

impl TryFrom<f64> for FeeMultiplier {
    type Error = WalletError;

    /// Shortest decimal that round-trips the float, so `1.1` stays `11/10`
    fn try_from(value: f64) -> WalletResult<Self> {
        let decimal = Decimal::from_f64(value)
            .ok_or_else(|| WalletError::InvalidFeeMultiplier(value.to_string()))?;
        Self::from_decimal(decimal)
    }
}

impl Serialize for FeeMultiplier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMultiplier {
    Whole(u64),
    Decimal(f64),
    Text(String),
}

impl TryFrom<RawMultiplier> for FeeMultiplier {
    type Error = WalletError;

    fn try_from(raw: RawMultiplier) -> WalletResult<Self> {
        match raw {
            RawMultiplier::Whole(n) => Ok(Self::whole(n)),
            RawMultiplier::Decimal(f) => Self::try_from(f),
            RawMultiplier::Text(s) => s.parse(),
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Per transaction kind fee multipliers served by the wallet backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeesMultipliers {
    #[serde(default)]
    pub stx_send_tx_multiplier: Option<FeeMultiplier>,
    #[serde(default)]
    pub pool_stacking_tx_multiplier: Option<FeeMultiplier>,
    #[serde(default)]
    pub other_tx_multiplier: Option<FeeMultiplier>,
}

impl FeesMultipliers {
    /// Multiplier for a payload: transfers, pox stacking calls, everything else
    pub fn for_payload(&self, payload: &TransactionPayload) -> Option<FeeMultiplier> {
        match payload {
            TransactionPayload::TokenTransfer { .. } => self.stx_send_tx_multiplier,
            TransactionPayload::ContractCall { contract_name, .. }
                if contract_name.starts_with("pox") =>
            {
                self.pool_stacking_tx_multiplier
            }
            _ => self.other_tx_multiplier,
        }
    }
}

/// Multiply the transaction fee in place when a multiplier is set
pub fn apply_fee_multiplier(
    tx: &mut StacksTransaction,
    multiplier: Option<FeeMultiplier>,
) -> WalletResult<()> {
    if let Some(multiplier) = multiplier {
        let fee = tx.fee();
        let bumped = multiplier.apply(fee)?;
        debug!("Fee {} x {} = {}", fee, multiplier, bumped);
        tx.set_fee(bumped);
    }
    Ok(())
}

/// Fee estimator delegating to the SDK
pub struct FeeEstimator {
    sdk: Arc<dyn StacksSdk>,
}

impl FeeEstimator {
    /// Create a new fee estimator
    pub fn new(sdk: Arc<dyn StacksSdk>) -> Self {
        Self { sdk }
    }

    /// Estimate the fee of an STX transfer
    pub async fn estimate_fees(
        &self,
        tx: &StacksTransaction,
        network: &StacksNetwork,
    ) -> WalletResult<u64> {
        let fee = self.sdk.estimate_transfer(tx, network).await?;
        debug!("Transfer fee estimate on {}: {}", network.network_type, fee);
        Ok(fee)
    }

    /// Estimate the fee of a contract call
    pub async fn estimate_contract_call_fees(
        &self,
        tx: &StacksTransaction,
        network: &StacksNetwork,
    ) -> WalletResult<u64> {
        let fee = self.sdk.estimate_contract_call(tx, network).await?;
        debug!(
            "Contract call fee estimate on {}: {}",
            network.network_type, fee
        );
        Ok(fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::sdk::testing::FakeSdk;
    use crate::chain::types::fixtures;

    #[test]
    fn test_one_and_a_half_times_whole_fee() {
        let multiplier: FeeMultiplier = "1.5".parse().unwrap();
        assert_eq!(multiplier.numerator(), 3);
        assert_eq!(multiplier.denominator(), 2);
        assert_eq!(multiplier.apply(1000).unwrap(), 1500);
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!("2".parse::<FeeMultiplier>().unwrap(), FeeMultiplier::whole(2));
        assert_eq!(
            "3/2".parse::<FeeMultiplier>().unwrap(),
            "1.50".parse::<FeeMultiplier>().unwrap()
        );
        assert_eq!(
            FeeMultiplier::try_from(1.25).unwrap(),
            FeeMultiplier::new(5, 4).unwrap()
        );
        assert_eq!(
            FeeMultiplier::try_from(1.1).unwrap(),
            FeeMultiplier::new(11, 10).unwrap()
        );
        for bad in ["", "-1", "-0.5", "abc", "1/0", "1/x", "1.5.5"] {
            assert!(bad.parse::<FeeMultiplier>().is_err(), "{} should not parse", bad);
        }
        assert!(FeeMultiplier::try_from(f64::NAN).is_err());
        assert!(FeeMultiplier::try_from(-0.5).is_err());
    }

    #[test]
    fn test_long_fraction_is_exact() {
        let multiplier: FeeMultiplier = "1.0000000001".parse().unwrap();
        assert_eq!(multiplier.numerator(), 10_000_000_001);
        assert_eq!(multiplier.denominator(), 10_000_000_000);
        assert_eq!(multiplier.apply(10_000_000_000).unwrap(), 10_000_000_001);
        assert_eq!(multiplier.apply(1).unwrap(), 2);

        let fine: FeeMultiplier = "1.0000000000000000000000000001".parse().unwrap();
        assert_eq!(fine.denominator(), 10u128.pow(28));
        assert_eq!(fine.apply(1000).unwrap(), 1001);
    }

    #[test]
    fn test_apply_rounds_up_and_detects_overflow() {
        let third = FeeMultiplier::new(4, 3).unwrap();
        assert_eq!(third.apply(10).unwrap(), 14);
        assert_eq!(FeeMultiplier::whole(1).apply(777).unwrap(), 777);
        assert_eq!(FeeMultiplier::whole(0).apply(777).unwrap(), 0);

        let err = FeeMultiplier::whole(2).apply(u64::MAX).unwrap_err();
        assert!(matches!(err, WalletError::FeeOverflow { .. }));
    }

    #[test]
    fn test_deserialize_multipliers() {
        let multipliers: FeesMultipliers = serde_json::from_str(
            r#"{"stxSendTxMultiplier": 2, "poolStackingTxMultiplier": 1.5, "otherTxMultiplier": "5/4"}"#,
        )
        .unwrap();
        assert_eq!(multipliers.stx_send_tx_multiplier, Some(FeeMultiplier::whole(2)));
        assert_eq!(
            multipliers.pool_stacking_tx_multiplier,
            Some(FeeMultiplier::new(3, 2).unwrap())
        );
        assert_eq!(
            multipliers.other_tx_multiplier,
            Some(FeeMultiplier::new(5, 4).unwrap())
        );

        let empty: FeesMultipliers = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, FeesMultipliers::default());
    }

    #[test]
    fn test_multiplier_selection_by_payload() {
        let multipliers = FeesMultipliers {
            stx_send_tx_multiplier: Some(FeeMultiplier::whole(2)),
            pool_stacking_tx_multiplier: Some(FeeMultiplier::whole(3)),
            other_tx_multiplier: None,
        };
        let transfer = fixtures::token_transfer(1, "");
        assert_eq!(
            multipliers.for_payload(&transfer.payload),
            Some(FeeMultiplier::whole(2))
        );

        let stacking = TransactionPayload::ContractCall {
            contract_address: "SP000000000000000000002Q6VF78".to_string(),
            contract_name: "pox-3".to_string(),
            function_name: "delegate-stx".to_string(),
            function_args: Vec::new(),
        };
        assert_eq!(multipliers.for_payload(&stacking), Some(FeeMultiplier::whole(3)));

        let deploy = TransactionPayload::SmartContract {
            contract_name: "hello".to_string(),
            code_body: "(define-public (hi) (ok true))".to_string(),
        };
        assert_eq!(multipliers.for_payload(&deploy), None);
    }

    #[test]
    fn test_apply_fee_multiplier_to_transaction() {
        let mut tx = fixtures::token_transfer(1, "");
        tx.set_fee(1000);
        apply_fee_multiplier(&mut tx, None).unwrap();
        assert_eq!(tx.fee(), 1000);
        apply_fee_multiplier(&mut tx, Some("1.5".parse().unwrap())).unwrap();
        assert_eq!(tx.fee(), 1500);
    }

    #[tokio::test]
    async fn test_estimator_passes_network_through() {
        let sdk = Arc::new(FakeSdk::new(0));
        let estimator = FeeEstimator::new(sdk.clone());
        let tx = fixtures::token_transfer(1, "");

        assert_eq!(
            estimator.estimate_fees(&tx, &StacksNetwork::testnet()).await.unwrap(),
            180
        );
        assert_eq!(
            estimator
                .estimate_contract_call_fees(&tx, &StacksNetwork::mainnet())
                .await
                .unwrap(),
            300
        );

        let networks = sdk.estimate_networks.lock().unwrap();
        assert_eq!(*networks, vec![StacksNetwork::testnet(), StacksNetwork::mainnet()]);
    }
}
