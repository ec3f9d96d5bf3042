//! Solana network access: RPC, broadcast, log subscriptions and metadata upload

pub mod event_listener;
pub mod rpc_client;
pub mod token_metadata;
pub mod transaction_executor;

#[cfg(test)]
pub(crate) mod mock_rpc;

pub use event_listener::{EventListenerRegistry, ListenerId};
pub use rpc_client::{LedgerRpc, SolanaRpcClient};
pub use token_metadata::{MetadataUploadResponse, TokenMetadataUploader};
pub use transaction_executor::TransactionExecutor;
