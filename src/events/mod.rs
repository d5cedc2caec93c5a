//! Analytics event names and typed property payloads
//!
//! Event names are the strings the analytics backend already indexes on, so
//! they are fixed. Property keys follow the same rule.

use crate::account::AccountType;
use crate::error::WalletResult;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Analytics event names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalyticsEvents {
    #[serde(rename = "Opt Out")]
    OptOut,
    #[serde(rename = "Create new wallet")]
    CreateNewWallet,
    #[serde(rename = "Restore wallet")]
    RestoreWallet,
    #[serde(rename = "click_app")]
    ClickApp,
    #[serde(rename = "app_connected")]
    AppConnected,
    #[serde(rename = "transaction_confirmed")]
    TransactionConfirmed,
    #[serde(rename = "wallet_migrated")]
    WalletMigrated,
    #[serde(rename = "wallet_skipped_migration")]
    WalletSkippedMigration,
    #[serde(rename = "initiate_swap_flow")]
    InitiateSwapFlow,
    #[serde(rename = "fetch_swap_quote")]
    FetchSwapQuote,
    #[serde(rename = "select_swap_quote")]
    SelectSwapQuote,
    #[serde(rename = "confirm_swap")]
    ConfirmSwap,
    #[serde(rename = "sign_swap")]
    SignSwap,
    #[serde(rename = "select_token_to_swap_from")]
    SelectTokenToSwapFrom,
    #[serde(rename = "select_token_to_swap_to")]
    SelectTokenToSwapTo,
    #[serde(rename = "list_rune_initiated")]
    ListRuneInitiated,
    #[serde(rename = "list_rune_signed")]
    ListRuneSigned,
}

impl AnalyticsEvents {
    pub const ALL: [AnalyticsEvents; 17] = [
        AnalyticsEvents::OptOut,
        AnalyticsEvents::CreateNewWallet,
        AnalyticsEvents::RestoreWallet,
        AnalyticsEvents::ClickApp,
        AnalyticsEvents::AppConnected,
        AnalyticsEvents::TransactionConfirmed,
        AnalyticsEvents::WalletMigrated,
        AnalyticsEvents::WalletSkippedMigration,
        AnalyticsEvents::InitiateSwapFlow,
        AnalyticsEvents::FetchSwapQuote,
        AnalyticsEvents::SelectSwapQuote,
        AnalyticsEvents::ConfirmSwap,
        AnalyticsEvents::SignSwap,
        AnalyticsEvents::SelectTokenToSwapFrom,
        AnalyticsEvents::SelectTokenToSwapTo,
        AnalyticsEvents::ListRuneInitiated,
        AnalyticsEvents::ListRuneSigned,
    ];

    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsEvents::OptOut => "Opt Out",
            AnalyticsEvents::CreateNewWallet => "Create new wallet",
            AnalyticsEvents::RestoreWallet => "Restore wallet",
            AnalyticsEvents::ClickApp => "click_app",
            AnalyticsEvents::AppConnected => "app_connected",
            AnalyticsEvents::TransactionConfirmed => "transaction_confirmed",
            AnalyticsEvents::WalletMigrated => "wallet_migrated",
            AnalyticsEvents::WalletSkippedMigration => "wallet_skipped_migration",
            AnalyticsEvents::InitiateSwapFlow => "initiate_swap_flow",
            AnalyticsEvents::FetchSwapQuote => "fetch_swap_quote",
            AnalyticsEvents::SelectSwapQuote => "select_swap_quote",
            AnalyticsEvents::ConfirmSwap => "confirm_swap",
            AnalyticsEvents::SignSwap => "sign_swap",
            AnalyticsEvents::SelectTokenToSwapFrom => "select_token_to_swap_from",
            AnalyticsEvents::SelectTokenToSwapTo => "select_token_to_swap_to",
            AnalyticsEvents::ListRuneInitiated => "list_rune_initiated",
            AnalyticsEvents::ListRuneSigned => "list_rune_signed",
        }
    }
}

impl fmt::Display for AnalyticsEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    Brc20,
    Sip10,
    Bitcoin,
    Stacks,
    Runes,
    Ordinals,
    RareSats,
    StacksNfts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionAction {
    Inscribe,
    Transfer,
    SignMessage,
    SignPsbt,
    SignBatchPsbt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickAppProps {
    pub link: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConnectedProps {
    #[serde(rename = "requestedAddress")]
    pub requested_address: Vec<String>,
    pub wallet_type: AccountType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionConfirmedProps {
    pub protocol: Protocol,
    pub action: TransactionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<u32>,
    pub wallet_type: AccountType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSwapFlowProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromToToken {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_principal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_principal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromToAmount {
    pub from_amount: String,
    pub to_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuoteProps {
    #[serde(flatten)]
    pub tokens: FromToToken,
    pub provider: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapQuoteAmountProps {
    #[serde(flatten)]
    pub quote: SwapQuoteProps,
    #[serde(flatten)]
    pub amounts: FromToAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSwapQuoteProps {
    #[serde(flatten)]
    pub tokens: FromToToken,
    #[serde(flatten)]
    pub amounts: FromToAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSwapTokenProps {
    pub selected_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<String>,
}

/// An analytics event together with its properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    OptOut,
    CreateNewWallet,
    RestoreWallet,
    ClickApp(ClickAppProps),
    AppConnected(AppConnectedProps),
    TransactionConfirmed(TransactionConfirmedProps),
    WalletMigrated,
    WalletSkippedMigration,
    InitiateSwapFlow(InitiateSwapFlowProps),
    FetchSwapQuote(FetchSwapQuoteProps),
    SelectSwapQuote(SwapQuoteProps),
    ConfirmSwap(SwapQuoteAmountProps),
    SignSwap(SwapQuoteAmountProps),
    SelectTokenToSwapFrom(SelectSwapTokenProps),
    SelectTokenToSwapTo(SelectSwapTokenProps),
    ListRuneInitiated,
    ListRuneSigned,
}

impl AnalyticsEvent {
    pub fn name(&self) -> AnalyticsEvents {
        match self {
            AnalyticsEvent::OptOut => AnalyticsEvents::OptOut,
            AnalyticsEvent::CreateNewWallet => AnalyticsEvents::CreateNewWallet,
            AnalyticsEvent::RestoreWallet => AnalyticsEvents::RestoreWallet,
            AnalyticsEvent::ClickApp(_) => AnalyticsEvents::ClickApp,
            AnalyticsEvent::AppConnected(_) => AnalyticsEvents::AppConnected,
            AnalyticsEvent::TransactionConfirmed(_) => AnalyticsEvents::TransactionConfirmed,
            AnalyticsEvent::WalletMigrated => AnalyticsEvents::WalletMigrated,
            AnalyticsEvent::WalletSkippedMigration => AnalyticsEvents::WalletSkippedMigration,
            AnalyticsEvent::InitiateSwapFlow(_) => AnalyticsEvents::InitiateSwapFlow,
            AnalyticsEvent::FetchSwapQuote(_) => AnalyticsEvents::FetchSwapQuote,
            AnalyticsEvent::SelectSwapQuote(_) => AnalyticsEvents::SelectSwapQuote,
            AnalyticsEvent::ConfirmSwap(_) => AnalyticsEvents::ConfirmSwap,
            AnalyticsEvent::SignSwap(_) => AnalyticsEvents::SignSwap,
            AnalyticsEvent::SelectTokenToSwapFrom(_) => AnalyticsEvents::SelectTokenToSwapFrom,
            AnalyticsEvent::SelectTokenToSwapTo(_) => AnalyticsEvents::SelectTokenToSwapTo,
            AnalyticsEvent::ListRuneInitiated => AnalyticsEvents::ListRuneInitiated,
            AnalyticsEvent::ListRuneSigned => AnalyticsEvents::ListRuneSigned,
        }
    }

    /// Event properties, `None` for events that carry none
    pub fn properties(&self) -> WalletResult<Option<Value>> {
        let value = match self {
            AnalyticsEvent::ClickApp(p) => serde_json::to_value(p)?,
            AnalyticsEvent::AppConnected(p) => serde_json::to_value(p)?,
            AnalyticsEvent::TransactionConfirmed(p) => serde_json::to_value(p)?,
            AnalyticsEvent::InitiateSwapFlow(p) => serde_json::to_value(p)?,
            AnalyticsEvent::FetchSwapQuote(p) => serde_json::to_value(p)?,
            AnalyticsEvent::SelectSwapQuote(p) => serde_json::to_value(p)?,
            AnalyticsEvent::ConfirmSwap(p) | AnalyticsEvent::SignSwap(p) => {
                serde_json::to_value(p)?
            }
            AnalyticsEvent::SelectTokenToSwapFrom(p) | AnalyticsEvent::SelectTokenToSwapTo(p) => {
                serde_json::to_value(p)?
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// `{"event": ..., "properties": {...}}` payload for the tracker
    pub fn to_payload(&self) -> WalletResult<Value> {
        let properties = self.properties()?.unwrap_or_else(|| json!({}));
        Ok(json!({
            "event": self.name().as_str(),
            "properties": properties,
        }))
    }
}
