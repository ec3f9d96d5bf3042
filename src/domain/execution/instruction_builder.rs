//! Instruction sets for create, buy and sell against the bonding curve

use std::sync::Arc;

use solana_sdk::{commitment_config::CommitmentConfig, instruction::Instruction, pubkey::Pubkey};
use tracing::{debug, info};

use crate::domain::curve::{BondingCurveAccount, CurvePricing, GlobalAccount};
use crate::exchanges::pumpfun::{instructions, pda};
use crate::infrastructure::blockchain::rpc_client::LedgerRpc;
use crate::math::{calculate_with_slippage_buy, calculate_with_slippage_sell};
use crate::shared::errors::ClientError;
use crate::shared::types::{SwapDirection, SwapIntent};

/// Builds ordered, unsigned instruction sets.
///
/// Account state is read from the primary endpoint and priced through the
/// injected `CurvePricing`; quotes only feed the slippage bounds.
pub struct SwapInstructionBuilder {
    rpc: Arc<dyn LedgerRpc>,
    pricing: Arc<dyn CurvePricing>,
    program_id: Pubkey,
}

impl SwapInstructionBuilder {
    pub fn new(rpc: Arc<dyn LedgerRpc>, pricing: Arc<dyn CurvePricing>, program_id: Pubkey) -> Self {
        Self {
            rpc,
            pricing,
            program_id,
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub async fn get_global_account(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<GlobalAccount, ClientError> {
        let address = pda::global_pda(&self.program_id);
        let data = self
            .rpc
            .get_account_data(&address, commitment)
            .await?
            .ok_or(ClientError::GlobalAccountNotFound(address))?;
        GlobalAccount::try_deserialize(&data)
    }

    /// `None` when no curve exists for `mint`
    pub async fn get_bonding_curve_account(
        &self,
        mint: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<Option<BondingCurveAccount>, ClientError> {
        let address = pda::bonding_curve_pda(mint, &self.program_id);
        match self.rpc.get_account_data(&address, commitment).await? {
            Some(data) => Ok(Some(BondingCurveAccount::try_deserialize(&data)?)),
            None => Ok(None),
        }
    }

    async fn require_bonding_curve(
        &self,
        mint: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<BondingCurveAccount, ClientError> {
        self.get_bonding_curve_account(mint, commitment)
            .await?
            .ok_or(ClientError::BondingCurveNotFound(*mint))
    }

    /// `[create_associated_token_account_idempotent, buy]` spending at most
    /// `buy_amount_sol` plus slippage
    pub async fn buy_instructions(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        buy_amount_sol: u64,
        slippage_bps: u64,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        let curve = self.require_bonding_curve(mint, commitment).await?;
        let token_amount = self.pricing.quote_buy(&curve, mint, buy_amount_sol)?;
        let max_sol_cost = calculate_with_slippage_buy(buy_amount_sol, slippage_bps);
        let global = self.get_global_account(commitment).await?;

        debug!(
            "Buy quote for {}: {} tokens for {} lamports (max {})",
            mint, token_amount, buy_amount_sol, max_sol_cost
        );

        instructions::buy_instruction_set(
            &self.program_id,
            buyer,
            mint,
            &global.fee_recipient,
            token_amount,
            max_sol_cost,
        )
    }

    /// `[sell, close_account]` receiving at least the quoted lamports minus slippage
    pub async fn sell_instructions(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        token_amount: u64,
        slippage_bps: u64,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        let curve = self.require_bonding_curve(mint, commitment).await?;
        let global = self.get_global_account(commitment).await?;
        let sol_output =
            self.pricing
                .quote_sell(&curve, mint, token_amount, global.fee_basis_points)?;
        let min_sol_output = calculate_with_slippage_sell(sol_output, slippage_bps);

        debug!(
            "Sell quote for {}: {} lamports for {} tokens (min {})",
            mint, sol_output, token_amount, min_sol_output
        );

        instructions::sell_instruction_set(
            &self.program_id,
            seller,
            mint,
            &global.fee_recipient,
            token_amount,
            min_sol_output,
        )
    }

    pub async fn build_swap(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
        intent: SwapIntent,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        match intent.direction {
            SwapDirection::Buy => {
                self.buy_instructions(
                    owner,
                    mint,
                    intent.principal_amount,
                    intent.slippage_bps,
                    commitment,
                )
                .await
            }
            SwapDirection::Sell => {
                self.sell_instructions(
                    owner,
                    mint,
                    intent.principal_amount,
                    intent.slippage_bps,
                    commitment,
                )
                .await
            }
        }
    }

    /// `create`, followed by the creator's first buy when `buy_amount_sol > 0`.
    /// The mint keypair must co-sign.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_and_buy_instructions(
        &self,
        creator: &Pubkey,
        mint: &Pubkey,
        name: &str,
        symbol: &str,
        uri: &str,
        buy_amount_sol: u64,
        slippage_bps: u64,
        commitment: CommitmentConfig,
    ) -> Result<Vec<Instruction>, ClientError> {
        let mut all = vec![instructions::create_instruction(
            &self.program_id,
            creator,
            mint,
            name,
            symbol,
            uri,
        )?];

        if buy_amount_sol > 0 {
            let global = self.get_global_account(commitment).await?;
            let token_amount = self.pricing.quote_initial_buy(&global, buy_amount_sol);
            let max_sol_cost = calculate_with_slippage_buy(buy_amount_sol, slippage_bps);
            info!(
                "🪙 Creating {} with initial buy of {} tokens (max {} lamports)",
                symbol, token_amount, max_sol_cost
            );
            all.extend(instructions::buy_instruction_set(
                &self.program_id,
                creator,
                mint,
                &global.fee_recipient,
                token_amount,
                max_sol_cost,
            )?);
        }

        Ok(all)
    }

    /// Buy set with caller-supplied bounds. No account reads.
    pub fn buy_instructions_fixed(
        &self,
        buyer: &Pubkey,
        mint: &Pubkey,
        fee_recipient: &Pubkey,
        token_amount: u64,
        max_sol_cost: u64,
    ) -> Result<Vec<Instruction>, ClientError> {
        instructions::buy_instruction_set(
            &self.program_id,
            buyer,
            mint,
            fee_recipient,
            token_amount,
            max_sol_cost,
        )
    }

    /// Sell set with caller-supplied bounds. No account reads.
    pub fn sell_instructions_fixed(
        &self,
        seller: &Pubkey,
        mint: &Pubkey,
        fee_recipient: &Pubkey,
        token_amount: u64,
        min_sol_output: u64,
    ) -> Result<Vec<Instruction>, ClientError> {
        instructions::sell_instruction_set(
            &self.program_id,
            seller,
            mint,
            fee_recipient,
            token_amount,
            min_sol_output,
        )
    }
}
