//! Mapping between signed-transaction payloads and wallet-connect request objects

pub mod request;

pub use request::{
    get_contract_call_promises, get_token_transfer_request, is_multi_sig, tx_payload_to_request,
    ContractCallPromises, ContractCallRequest, RequestKind, TransactionRequest,
};
