//! Solana RPC access used by the builder and the broadcast path

use async_trait::async_trait;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig},
};
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};

use crate::shared::errors::ClientError;
use crate::shared::types::{BlockhashWithExpiry, ConfirmedTransaction};

/// Ledger transport operations needed by the client.
///
/// One implementation per RPC endpoint. Implementations must be cheap to share
/// across tasks.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Endpoint URL, used for logging
    fn url(&self) -> String;

    /// Raw account data, `None` when the address holds no account
    async fn get_account_data(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<Vec<u8>>, ClientError>;

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<BlockhashWithExpiry, ClientError>;

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
        preflight_commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError>;

    /// `None` while the signature has not reached `commitment`,
    /// `Some(Err(..))` when the transaction landed with an execution error
    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), String>>, ClientError>;

    async fn get_block_height(&self, commitment: CommitmentConfig) -> Result<u64, ClientError>;

    /// Transaction details, `None` when the node does not know the signature
    async fn get_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<ConfirmedTransaction>, ClientError>;
}

/// Solana RPC client wrapper
pub struct SolanaRpcClient {
    client: RpcClient,
}

impl SolanaRpcClient {
    /// Create new RPC client
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new(rpc_url),
        }
    }
}

#[async_trait]
impl LedgerRpc for SolanaRpcClient {
    fn url(&self) -> String {
        self.client.url()
    }

    async fn get_account_data(
        &self,
        address: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<Vec<u8>>, ClientError> {
        let response = self
            .client
            .get_account_with_commitment(address, commitment)
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_latest_blockhash(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<BlockhashWithExpiry, ClientError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(commitment)
            .await?;
        Ok(BlockhashWithExpiry {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
        preflight_commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError> {
        let config = RpcSendTransactionConfig {
            skip_preflight,
            preflight_commitment: Some(preflight_commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };
        Ok(self
            .client
            .send_transaction_with_config(transaction, config)
            .await?)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<Result<(), String>>, ClientError> {
        let status = self
            .client
            .get_signature_status_with_commitment(signature, commitment)
            .await?;
        Ok(status.map(|result| result.map_err(|e| e.to_string())))
    }

    async fn get_block_height(&self, commitment: CommitmentConfig) -> Result<u64, ClientError> {
        Ok(self
            .client
            .get_block_height_with_commitment(commitment)
            .await?)
    }

    async fn get_transaction(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Option<ConfirmedTransaction>, ClientError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(lookup_commitment(commitment)),
            max_supported_transaction_version: Some(0),
        };
        match self
            .client
            .get_transaction_with_config(signature, config)
            .await
        {
            Ok(tx) => Ok(Some(to_confirmed_transaction(tx))),
            // The node answers `null` for unknown signatures, which surfaces as a
            // deserialization error rather than an RPC error.
            Err(e) if matches!(e.kind(), solana_client::client_error::ClientErrorKind::SerdeJson(_)) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `getTransaction` does not accept `processed`
fn lookup_commitment(commitment: CommitmentConfig) -> CommitmentConfig {
    match commitment.commitment {
        CommitmentLevel::Processed => CommitmentConfig::confirmed(),
        _ => commitment,
    }
}

fn to_confirmed_transaction(tx: EncodedConfirmedTransactionWithStatusMeta) -> ConfirmedTransaction {
    let meta = tx.transaction.meta;
    ConfirmedTransaction {
        slot: tx.slot,
        block_time: tx.block_time,
        fee: meta.as_ref().map(|m| m.fee),
        err: meta.as_ref().and_then(|m| m.err.as_ref().map(|e| e.to_string())),
        log_messages: meta
            .as_ref()
            .and_then(|m| Option::<Vec<String>>::from(m.log_messages.clone()))
            .unwrap_or_default(),
        compute_units_consumed: meta
            .as_ref()
            .and_then(|m| Option::<u64>::from(m.compute_units_consumed.clone())),
    }
}
