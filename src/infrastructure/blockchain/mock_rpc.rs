//! In-memory `LedgerRpc` for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::VersionedTransaction,
};

use super::rpc_client::LedgerRpc;
use crate::shared::errors::ClientError;
use crate::shared::types::{BlockhashWithExpiry, ConfirmedTransaction};

pub struct MockRpc {
    pub name: String,
    pub accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    pub last_valid_block_height: u64,
    /// Block height returned on the first call, incremented on every call
    pub block_height: AtomicU64,
    /// Status polls that return `None` before the signature is reported
    pub polls_until_confirmed: Option<usize>,
    pub status_polls: AtomicUsize,
    pub send_error: Option<String>,
    pub details: Option<ConfirmedTransaction>,
    pub sent: Mutex<Vec<VersionedTransaction>>,
    pub blockhash_requests: AtomicUsize,
}

impl MockRpc {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            accounts: Mutex::new(HashMap::new()),
            last_valid_block_height: 1_000,
            block_height: AtomicU64::new(900),
            polls_until_confirmed: Some(0),
            status_polls: AtomicUsize::new(0),
            send_error: None,
            details: Some(ConfirmedTransaction {
                slot: 321,
                block_time: Some(1_700_000_000),
                fee: Some(5_000),
                err: None,
                log_messages: vec!["Program log: Instruction: Buy".to_string()],
                compute_units_consumed: Some(70_000),
            }),
            sent: Mutex::new(Vec::new()),
            blockhash_requests: AtomicUsize::new(0),
        }
    }

    pub fn with_account(self, address: Pubkey, data: Vec<u8>) -> Self {
        self.accounts.lock().unwrap().insert(address, data);
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn blockhash() -> Hash {
        Hash::new_from_array([7u8; 32])
    }
}

#[async_trait]
impl LedgerRpc for MockRpc {
    fn url(&self) -> String {
        self.name.clone()
    }

    async fn get_account_data(
        &self,
        address: &Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<Option<Vec<u8>>, ClientError> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_latest_blockhash(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<BlockhashWithExpiry, ClientError> {
        self.blockhash_requests.fetch_add(1, Ordering::SeqCst);
        Ok(BlockhashWithExpiry {
            blockhash: Self::blockhash(),
            last_valid_block_height: self.last_valid_block_height,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        _skip_preflight: bool,
        _preflight_commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError> {
        if let Some(err) = &self.send_error {
            return Err(ClientError::Rpc(err.clone()));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), String>>, ClientError> {
        let polls = self.status_polls.fetch_add(1, Ordering::SeqCst);
        match self.polls_until_confirmed {
            Some(needed) if polls >= needed => Ok(Some(Ok(()))),
            _ => Ok(None),
        }
    }

    async fn get_block_height(&self, _commitment: CommitmentConfig) -> Result<u64, ClientError> {
        Ok(self.block_height.fetch_add(1, Ordering::SeqCst))
    }

    async fn get_transaction(
        &self,
        _signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<Option<ConfirmedTransaction>, ClientError> {
        Ok(self.details.clone())
    }
}
