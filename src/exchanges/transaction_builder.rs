use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    packet::PACKET_DATA_SIZE,
    pubkey::Pubkey,
    transaction::VersionedTransaction,
};
use tracing::{debug, info};

use crate::exchanges::compute_budget::with_priority_fee;
use crate::infrastructure::blockchain::rpc_client::LedgerRpc;
use crate::shared::errors::ClientError;
use crate::shared::types::{BlockhashWithExpiry, PriorityFee};

/// Unsigned v0 transaction ready to be signed by the broadcast path
#[derive(Debug, Clone)]
pub struct AssembledTransaction {
    pub message: VersionedMessage,
    pub fee_payer: Pubkey,
    pub recent_blockhash: Hash,
    pub last_valid_block_height: u64,
    pub instruction_count: usize,
}

/// Wraps instruction sets into versioned transactions
pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Compile `instructions` into an unsigned v0 message.
    ///
    /// Compute budget instructions are prepended when `priority_fee` is set.
    /// Without a `blockhash` the latest one is fetched from `rpc` at `commitment`.
    pub async fn assemble(
        &self,
        rpc: &dyn LedgerRpc,
        instructions: Vec<Instruction>,
        fee_payer: &Pubkey,
        priority_fee: Option<&PriorityFee>,
        blockhash: Option<BlockhashWithExpiry>,
        commitment: CommitmentConfig,
    ) -> Result<AssembledTransaction, ClientError> {
        let instructions = with_priority_fee(instructions, priority_fee);

        let blockhash = match blockhash {
            Some(blockhash) => blockhash,
            None => rpc.get_latest_blockhash(commitment).await?,
        };

        let assembled = Self::compile(&instructions, fee_payer, blockhash)?;
        info!(
            "🔨 Assembled v0 transaction with {} instructions (blockhash {}, valid until height {})",
            assembled.instruction_count, assembled.recent_blockhash, assembled.last_valid_block_height
        );
        Ok(assembled)
    }

    /// Compile without touching the network
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        blockhash: BlockhashWithExpiry,
    ) -> Result<AssembledTransaction, ClientError> {
        if instructions.is_empty() {
            return Err(ClientError::Instruction("Transaction has no instructions".to_string()));
        }

        let message = v0::Message::try_compile(fee_payer, instructions, &[], blockhash.blockhash)
            .map_err(|e| ClientError::Instruction(format!("Failed to compile message: {}", e)))?;

        Ok(AssembledTransaction {
            message: VersionedMessage::V0(message),
            fee_payer: *fee_payer,
            recent_blockhash: blockhash.blockhash,
            last_valid_block_height: blockhash.last_valid_block_height,
            instruction_count: instructions.len(),
        })
    }

    /// Validate a signed transaction before broadcasting
    pub fn validate_transaction(transaction: &VersionedTransaction) -> Result<(), ClientError> {
        let tx_size = bincode::serialized_size(transaction)
            .map_err(|e| ClientError::Instruction(format!("Failed to size transaction: {}", e)))?
            as usize;
        if tx_size > PACKET_DATA_SIZE {
            return Err(ClientError::Instruction(format!(
                "Transaction too large: {} bytes (limit {})",
                tx_size, PACKET_DATA_SIZE
            )));
        }

        debug!(
            "✅ Transaction validation passed: {} instructions, {} bytes",
            transaction.message.instructions().len(),
            tx_size
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::blockchain::mock_rpc::MockRpc;
    use solana_sdk::{
        compute_budget::{self, ComputeBudgetInstruction},
        signature::{Keypair, Signer},
    };
    use std::sync::atomic::Ordering;

    fn memo_ix(payer: &Pubkey) -> Instruction {
        Instruction::new_with_bytes(
            Pubkey::new_unique(),
            b"hello",
            vec![solana_sdk::instruction::AccountMeta::new(*payer, true)],
        )
    }

    fn program_ids(assembled: &AssembledTransaction) -> Vec<Pubkey> {
        let keys = assembled.message.static_account_keys();
        assembled
            .message
            .instructions()
            .iter()
            .map(|ix| keys[ix.program_id_index as usize])
            .collect()
    }

    #[tokio::test]
    async fn test_fetches_blockhash_when_absent() {
        let rpc = MockRpc::new("primary");
        let payer = Pubkey::new_unique();

        let assembled = TransactionBuilder
            .assemble(&rpc, vec![memo_ix(&payer)], &payer, None, None, CommitmentConfig::finalized())
            .await
            .unwrap();

        assert_eq!(rpc.blockhash_requests.load(Ordering::SeqCst), 1);
        assert_eq!(assembled.recent_blockhash, MockRpc::blockhash());
        assert_eq!(assembled.last_valid_block_height, rpc.last_valid_block_height);
        assert_eq!(assembled.instruction_count, 1);
        assert_eq!(assembled.fee_payer, payer);
    }

    #[tokio::test]
    async fn test_uses_supplied_blockhash() {
        let rpc = MockRpc::new("primary");
        let payer = Pubkey::new_unique();
        let supplied = BlockhashWithExpiry {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 55,
        };

        let assembled = TransactionBuilder
            .assemble(
                &rpc,
                vec![memo_ix(&payer)],
                &payer,
                None,
                Some(supplied),
                CommitmentConfig::finalized(),
            )
            .await
            .unwrap();

        assert_eq!(rpc.blockhash_requests.load(Ordering::SeqCst), 0);
        assert_eq!(assembled.recent_blockhash, supplied.blockhash);
        assert_eq!(*assembled.message.recent_blockhash(), supplied.blockhash);
    }

    #[tokio::test]
    async fn test_priority_fee_instructions_come_first() {
        let rpc = MockRpc::new("primary");
        let payer = Pubkey::new_unique();
        let fee = PriorityFee { unit_limit: 200_000, unit_price: 5_000 };

        let assembled = TransactionBuilder
            .assemble(
                &rpc,
                vec![memo_ix(&payer)],
                &payer,
                Some(&fee),
                None,
                CommitmentConfig::finalized(),
            )
            .await
            .unwrap();

        let programs = program_ids(&assembled);
        assert_eq!(programs.len(), 3);
        assert_eq!(programs[0], compute_budget::id());
        assert_eq!(programs[1], compute_budget::id());
        assert_ne!(programs[2], compute_budget::id());

        let limit = ComputeBudgetInstruction::set_compute_unit_limit(200_000);
        assert_eq!(assembled.message.instructions()[0].data, limit.data);
    }

    #[test]
    fn test_empty_instruction_set_is_rejected() {
        let blockhash = BlockhashWithExpiry {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 1,
        };
        let result = TransactionBuilder::compile(&[], &Pubkey::new_unique(), blockhash);
        assert!(matches!(result, Err(ClientError::Instruction(_))));
    }

    #[test]
    fn test_validate_signed_transaction() {
        let payer = Keypair::new();
        let blockhash = BlockhashWithExpiry {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 1,
        };
        let assembled =
            TransactionBuilder::compile(&[memo_ix(&payer.pubkey())], &payer.pubkey(), blockhash)
                .unwrap();
        let tx = VersionedTransaction::try_new(assembled.message, &[&payer]).unwrap();

        assert!(TransactionBuilder::validate_transaction(&tx).is_ok());
    }
}
