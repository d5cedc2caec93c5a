//! Wallet account records

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an account's keys are held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Ledger,
    Software,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Ledger => write!(f, "ledger"),
            AccountType::Software => write!(f, "software"),
        }
    }
}

/// A derived wallet account with its Stacks, Bitcoin and Ordinals addresses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: u64,
    pub stx_address: String,
    pub btc_address: String,
    pub ordinals_address: String,
    pub master_pub_key: String,
    pub stx_public_key: String,
    pub btc_public_key: String,
    pub ordinals_public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bns_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    /// Index on the hardware device, ledger accounts only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_account_index: Option<u64>,
}

impl Account {
    /// Accounts without an explicit type are software accounts
    pub fn account_type(&self) -> AccountType {
        self.account_type.unwrap_or(AccountType::Software)
    }

    pub fn is_ledger(&self) -> bool {
        self.account_type() == AccountType::Ledger
    }

    /// Index used for key derivation
    pub fn derivation_index(&self) -> u64 {
        match (self.account_type(), self.device_account_index) {
            (AccountType::Ledger, Some(index)) => index,
            _ => self.id,
        }
    }

    /// BNS name when registered, otherwise the configured account name
    pub fn display_name(&self) -> Option<&str> {
        self.bns_name.as_deref().or(self.account_name.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBanner {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: String,
    pub description: String,
}
