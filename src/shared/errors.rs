//! Error handling for the client

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors surfaced to callers of the client.
///
/// Account and pricing failures indicate a caller precondition violation and
/// are returned as `Err`. Transport failures met while broadcasting are folded
/// into a `BroadcastOutcome` instead.
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("Bonding curve account not found: {0}")]
    BondingCurveNotFound(Pubkey),

    #[error("Global account not found: {0}")]
    GlobalAccountNotFound(Pubkey),

    #[error("Bonding curve is complete: {0}")]
    CurveComplete(Pubkey),

    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    #[error("Pricing error: {0}")]
    Pricing(String),

    #[error("Instruction error: {0}")]
    Instruction(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Metadata upload failed: {0}")]
    MetadataUpload(String),

    #[error("Event subscription failed: {0}")]
    Subscription(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Raw program event decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventDecodeError {
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Event data too short: {0} bytes")]
    TooShort(usize),

    #[error("Failed to deserialize {kind}: {reason}")]
    Deserialize { kind: &'static str, reason: String },
}

impl From<solana_client::client_error::ClientError> for ClientError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        ClientError::Rpc(err.to_string())
    }
}

impl From<solana_client::nonblocking::pubsub_client::PubsubClientError> for ClientError {
    fn from(err: solana_client::nonblocking::pubsub_client::PubsubClientError) -> Self {
        ClientError::Subscription(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::MetadataUpload(err.to_string())
    }
}
