//! Wallet-wide constants

/// Request timeout for wallet API calls
pub const API_TIMEOUT_MILLI: u64 = 30_000;

/// Entropy for a new mnemonic, 12 words
pub const ENTROPY_BYTES: usize = 16;

/// Micro-STX per STX is 10^STX_DECIMALS
pub const STX_DECIMALS: u32 = 6;

pub const BTC_PATH: &str = "m/49'/0'/0'/0/0";
pub const BTC_PATH_WITHOUT_INDEX: &str = "m/49'/0'/0'/0/";
pub const BTC_TESTNET_PATH_WITHOUT_INDEX: &str = "m/49'/1'/0'/0/";

pub const STX_PATH_WITHOUT_INDEX: &str = "m/44'/5757'/0'/0/";

pub const WALLET_CONFIG_PATH: &str = "m/44/5757'/0'/1";

pub const BTC_BASE_URI_MAINNET: &str = "https://api.blockcypher.com/v1/btc/main/addrs/";
pub const BTC_BASE_URI_TESTNET: &str = "https://api.blockcypher.com/v1/btc/test3/addrs/";

pub const NFT_BASE_URI: &str = "https://gamma.io/api/v1/collections";

pub const XVERSE_API_BASE_URL: &str = "https://api.xverse.app";
pub const XVERSE_SPONSOR_URL: &str = "https://sponsor.xverse.app";

pub const GAIA_HUB_URL: &str = "https://hub.blockstack.org";

/// Full STX derivation path for an account index
pub fn stx_derivation_path(account_index: u64) -> String {
    format!("{}{}", STX_PATH_WITHOUT_INDEX, account_index)
}

/// Full BTC derivation path for an account index
pub fn btc_derivation_path(account_index: u64, mainnet: bool) -> String {
    let prefix = if mainnet {
        BTC_PATH_WITHOUT_INDEX
    } else {
        BTC_TESTNET_PATH_WITHOUT_INDEX
    };
    format!("{}{}", prefix, account_index)
}

/// Convert micro-STX to a decimal STX string without float rounding
pub fn micro_stx_to_stx(micro_stx: u64) -> String {
    let scale = 10u64.pow(STX_DECIMALS);
    let whole = micro_stx / scale;
    let frac = micro_stx % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = STX_DECIMALS as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_paths() {
        assert_eq!(stx_derivation_path(0), "m/44'/5757'/0'/0/0");
        assert_eq!(btc_derivation_path(0, true), BTC_PATH);
        assert_eq!(btc_derivation_path(3, false), "m/49'/1'/0'/0/3");
    }

    #[test]
    fn test_micro_stx_to_stx() {
        assert_eq!(micro_stx_to_stx(0), "0");
        assert_eq!(micro_stx_to_stx(1_000_000), "1");
        assert_eq!(micro_stx_to_stx(1_500_000), "1.5");
        assert_eq!(micro_stx_to_stx(180), "0.00018");
    }
}
