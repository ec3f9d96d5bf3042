//! Common types used across the client

use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, hash::Hash};

/// Swap direction against the bonding curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapDirection {
    Buy,
    Sell,
}

/// A single swap request.
///
/// For buys `principal_amount` is lamports to spend, for sells it is the raw
/// token amount to sell. `slippage_bps` must lie in `[0, 10000]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapIntent {
    pub direction: SwapDirection,
    pub principal_amount: u64,
    pub slippage_bps: u64,
}

impl SwapIntent {
    pub fn buy(lamports: u64, slippage_bps: u64) -> Self {
        Self {
            direction: SwapDirection::Buy,
            principal_amount: lamports,
            slippage_bps,
        }
    }

    pub fn sell(token_amount: u64, slippage_bps: u64) -> Self {
        Self {
            direction: SwapDirection::Sell,
            principal_amount: token_amount,
            slippage_bps,
        }
    }
}

/// Compute budget settings prepended to a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityFee {
    pub unit_limit: u32,
    /// Price per compute unit in micro-lamports
    pub unit_price: u64,
}

/// Recent blockhash together with the last block height it stays valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashWithExpiry {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Optional per-call transaction settings.
///
/// `commitment` is used for every account read and for confirmation polling,
/// `finality` for the final transaction lookup.
#[derive(Debug, Clone, Copy)]
pub struct TxOptions {
    pub priority_fee: Option<PriorityFee>,
    pub blockhash: Option<BlockhashWithExpiry>,
    pub commitment: CommitmentConfig,
    pub finality: CommitmentConfig,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            priority_fee: None,
            blockhash: None,
            commitment: CommitmentConfig::finalized(),
            finality: CommitmentConfig::finalized(),
        }
    }
}

impl TxOptions {
    pub fn with_priority_fee(mut self, priority_fee: PriorityFee) -> Self {
        self.priority_fee = Some(priority_fee);
        self
    }

    pub fn with_blockhash(mut self, blockhash: BlockhashWithExpiry) -> Self {
        self.blockhash = Some(blockhash);
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_finality(mut self, finality: CommitmentConfig) -> Self {
        self.finality = finality;
        self
    }
}

/// Details of a transaction fetched after confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedTransaction {
    pub slot: u64,
    pub block_time: Option<i64>,
    pub fee: Option<u64>,
    /// On-chain execution error, if the transaction landed but failed
    pub err: Option<String>,
    pub log_messages: Vec<String>,
    pub compute_units_consumed: Option<u64>,
}

/// Result of one broadcast call. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    pub success: bool,
    pub signature: Option<String>,
    pub details: Option<ConfirmedTransaction>,
    pub error: Option<String>,
}

/// Error reported when a signature exists but no confirmed details were obtained
pub const TRANSACTION_FAILED: &str = "Transaction failed";

impl BroadcastOutcome {
    pub fn confirmed(signature: String, details: ConfirmedTransaction) -> Self {
        match details.err.clone() {
            None => Self {
                success: true,
                signature: Some(signature),
                details: Some(details),
                error: None,
            },
            Some(err) => Self {
                success: false,
                signature: Some(signature),
                details: Some(details),
                error: Some(format!("{}: {}", TRANSACTION_FAILED, err)),
            },
        }
    }

    /// Signature obtained but the transaction could not be confirmed before
    /// the blockhash expired, or no details were returned. The transaction
    /// may still land; callers must re-query by signature.
    pub fn unconfirmed(signature: String) -> Self {
        Self {
            success: false,
            signature: Some(signature),
            details: None,
            error: Some(TRANSACTION_FAILED.to_string()),
        }
    }

    /// Failure before any signature was obtained
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            signature: None,
            details: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.success && self.signature.is_some() && self.details.is_none()
    }
}

/// Token metadata submitted to the off-chain upload endpoint
#[derive(Debug, Clone)]
pub struct CreateTokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub file_name: String,
    pub file: Vec<u8>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}
