//! Multi-endpoint broadcast with confirmation against the primary endpoint

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use tracing::{debug, error, info, warn};

use super::rpc_client::LedgerRpc;
use crate::exchanges::transaction_builder::TransactionBuilder;
use crate::shared::errors::ClientError;
use crate::shared::types::{BroadcastOutcome, TxOptions};

/// How the confirmation loop ended
#[derive(Debug, Clone, PartialEq, Eq)]
enum Confirmation {
    Landed,
    LandedWithError(String),
    Expired,
}

/// Broadcast manager.
///
/// Endpoint 0 is the primary: it supplies blockhashes, its submission result
/// is awaited and it is the only endpoint polled for confirmation. The other
/// endpoints only receive best-effort relays.
pub struct TransactionExecutor {
    endpoints: Vec<Arc<dyn LedgerRpc>>,
    builder: TransactionBuilder,
    poll_interval: Duration,
}

impl TransactionExecutor {
    pub fn new(
        endpoints: Vec<Arc<dyn LedgerRpc>>,
        poll_interval: Duration,
    ) -> Result<Self, ClientError> {
        if endpoints.is_empty() {
            return Err(ClientError::Config(
                "At least one RPC endpoint is required".to_string(),
            ));
        }
        Ok(Self {
            endpoints,
            builder: TransactionBuilder,
            poll_interval,
        })
    }

    pub fn primary(&self) -> &Arc<dyn LedgerRpc> {
        &self.endpoints[0]
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Assemble, sign, broadcast and confirm `instructions`.
    ///
    /// The first signer pays the fee. Failures never surface as `Err`: they
    /// are reported in the returned outcome. An outcome with a signature but
    /// no details is ambiguous and the transaction may still land.
    pub async fn send_transaction(
        &self,
        instructions: Vec<Instruction>,
        signers: &[&Keypair],
        options: &TxOptions,
        skip_preflight: bool,
    ) -> BroadcastOutcome {
        let transaction = match self.prepare(instructions, signers, options).await {
            Ok(transaction) => transaction,
            Err(e) => {
                error!("❌ Failed to prepare transaction: {}", e);
                return BroadcastOutcome::failed(e.to_string());
            }
        };

        let signature = match self
            .broadcast(&transaction, skip_preflight, options.commitment)
            .await
        {
            Ok(signature) => signature,
            Err(e) => {
                error!("❌ Primary endpoint rejected transaction: {}", e);
                return BroadcastOutcome::failed(e.to_string());
            }
        };
        info!("📤 Transaction sent: {}", signature);

        match self.confirm(&signature, options.commitment).await {
            Ok(Confirmation::Landed) => info!("✅ Transaction confirmed: {}", signature),
            Ok(Confirmation::LandedWithError(err)) => {
                warn!("⚠️ Transaction {} landed with error: {}", signature, err)
            }
            Ok(Confirmation::Expired) => {
                warn!("⌛ Blockhash expired before {} was confirmed", signature);
                return BroadcastOutcome::unconfirmed(signature.to_string());
            }
            Err(e) => {
                warn!("⚠️ Confirmation polling failed for {}: {}", signature, e);
                return BroadcastOutcome::unconfirmed(signature.to_string());
            }
        }

        match self
            .primary()
            .get_transaction(&signature, options.finality)
            .await
        {
            Ok(Some(details)) => BroadcastOutcome::confirmed(signature.to_string(), details),
            Ok(None) => {
                warn!("⚠️ No details for {} at {:?}", signature, options.finality.commitment);
                BroadcastOutcome::unconfirmed(signature.to_string())
            }
            Err(e) => {
                warn!("⚠️ Failed to fetch details for {}: {}", signature, e);
                BroadcastOutcome::unconfirmed(signature.to_string())
            }
        }
    }

    async fn prepare(
        &self,
        instructions: Vec<Instruction>,
        signers: &[&Keypair],
        options: &TxOptions,
    ) -> Result<VersionedTransaction, ClientError> {
        let payer = signers
            .first()
            .ok_or_else(|| ClientError::Signing("No signers supplied".to_string()))?
            .pubkey();

        let assembled = self
            .builder
            .assemble(
                self.primary().as_ref(),
                instructions,
                &payer,
                options.priority_fee.as_ref(),
                options.blockhash,
                options.commitment,
            )
            .await?;

        let transaction = VersionedTransaction::try_new(assembled.message, signers)
            .map_err(|e| ClientError::Signing(e.to_string()))?;
        TransactionBuilder::validate_transaction(&transaction)?;
        Ok(transaction)
    }

    /// Relay to secondary endpoints and return the primary's signature
    async fn broadcast(
        &self,
        transaction: &VersionedTransaction,
        skip_preflight: bool,
        commitment: CommitmentConfig,
    ) -> Result<Signature, ClientError> {
        for endpoint in self.endpoints.iter().skip(1) {
            let endpoint = Arc::clone(endpoint);
            let transaction = transaction.clone();
            tokio::spawn(async move {
                match endpoint
                    .send_transaction(&transaction, skip_preflight, commitment)
                    .await
                {
                    Ok(signature) => debug!("📡 Relayed {} via {}", signature, endpoint.url()),
                    Err(e) => warn!("⚠️ Relay via {} failed: {}", endpoint.url(), e),
                }
            });
        }

        self.primary()
            .send_transaction(transaction, skip_preflight, commitment)
            .await
    }

    /// Poll the primary until the signature reaches `commitment` or the
    /// block height passes the expiry of a freshly fetched blockhash
    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<Confirmation, ClientError> {
        let primary = self.primary();
        let expiry = primary.get_latest_blockhash(commitment).await?;

        loop {
            if let Some(status) = primary.get_signature_status(signature, commitment).await? {
                return Ok(match status {
                    Ok(()) => Confirmation::Landed,
                    Err(err) => Confirmation::LandedWithError(err),
                });
            }

            let height = primary.get_block_height(commitment).await?;
            if height > expiry.last_valid_block_height {
                return Ok(Confirmation::Expired);
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
