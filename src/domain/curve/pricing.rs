use solana_sdk::pubkey::Pubkey;

use super::accounts::{BondingCurveAccount, GlobalAccount};
use crate::math::BPS_DENOMINATOR;
use crate::shared::errors::ClientError;

/// Curve quoting used by the instruction builder.
///
/// The client never trades against its own estimate: quotes only feed the
/// slippage bounds written into the instructions.
pub trait CurvePricing: Send + Sync {
    /// Tokens received for `sol_amount` lamports
    fn quote_buy(
        &self,
        curve: &BondingCurveAccount,
        mint: &Pubkey,
        sol_amount: u64,
    ) -> Result<u64, ClientError>;

    /// Lamports received for `token_amount`, net of the protocol fee
    fn quote_sell(
        &self,
        curve: &BondingCurveAccount,
        mint: &Pubkey,
        token_amount: u64,
        fee_basis_points: u64,
    ) -> Result<u64, ClientError>;

    /// Tokens received by the creator's first buy on a fresh curve
    fn quote_initial_buy(&self, global: &GlobalAccount, sol_amount: u64) -> u64;
}

/// Virtual-reserve constant product quoting
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProductPricing;

fn buy_output(
    virtual_sol: u64,
    virtual_token: u64,
    real_token: u64,
    sol_amount: u64,
) -> u64 {
    if sol_amount == 0 || virtual_sol == 0 {
        return 0;
    }
    let k = virtual_sol as u128 * virtual_token as u128;
    let new_sol = virtual_sol as u128 + sol_amount as u128;
    let new_token = k / new_sol + 1;
    let out = (virtual_token as u128).saturating_sub(new_token);
    out.min(real_token as u128) as u64
}

impl CurvePricing for ConstantProductPricing {
    fn quote_buy(
        &self,
        curve: &BondingCurveAccount,
        mint: &Pubkey,
        sol_amount: u64,
    ) -> Result<u64, ClientError> {
        if curve.complete {
            return Err(ClientError::CurveComplete(*mint));
        }
        Ok(buy_output(
            curve.virtual_sol_reserves,
            curve.virtual_token_reserves,
            curve.real_token_reserves,
            sol_amount,
        ))
    }

    fn quote_sell(
        &self,
        curve: &BondingCurveAccount,
        mint: &Pubkey,
        token_amount: u64,
        fee_basis_points: u64,
    ) -> Result<u64, ClientError> {
        if curve.complete {
            return Err(ClientError::CurveComplete(*mint));
        }
        if token_amount == 0 {
            return Ok(0);
        }
        let gross = token_amount as u128 * curve.virtual_sol_reserves as u128
            / (curve.virtual_token_reserves as u128 + token_amount as u128);
        let fee = gross * fee_basis_points as u128 / BPS_DENOMINATOR;
        Ok(gross.saturating_sub(fee) as u64)
    }

    fn quote_initial_buy(&self, global: &GlobalAccount, sol_amount: u64) -> u64 {
        buy_output(
            global.initial_virtual_sol_reserves,
            global.initial_virtual_token_reserves,
            global.initial_real_token_reserves,
            sol_amount,
        )
    }
}
