//! pump.fun bonding curve client
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod exchanges;
pub mod infrastructure;
pub mod math;
pub mod shared;

// Re-export main types for convenience
pub use application::PumpFunClient;
pub use domain::events::{DomainEvent, EventHandler, EventKind};
pub use infrastructure::blockchain::{LedgerRpc, ListenerId, SolanaRpcClient};
pub use shared::config::ClientConfig;
pub use shared::errors::ClientError;
pub use shared::types::{BroadcastOutcome, CreateTokenMetadata, PriorityFee, TxOptions};
