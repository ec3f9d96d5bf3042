use std::time::Duration;

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::exchanges::pumpfun::constants::{DEFAULT_METADATA_UPLOAD_URL, PUMPFUN_PROGRAM_ID};

/// Library-level client settings, fixed for the lifetime of a client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub program_id: Pubkey,
    /// Delay between signature status polls while confirming
    pub confirm_poll_interval: Duration,
    pub metadata_upload_url: String,
    /// Commitment of the log subscriptions
    pub event_commitment: CommitmentConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: PUMPFUN_PROGRAM_ID,
            confirm_poll_interval: Duration::from_millis(500),
            metadata_upload_url: DEFAULT_METADATA_UPLOAD_URL.to_string(),
            event_commitment: CommitmentConfig::confirmed(),
        }
    }
}
