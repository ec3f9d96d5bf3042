//! Global configuration and bonding curve account records
//!
//! Both accounts are Anchor accounts: an 8-byte discriminator followed by the
//! borsh-encoded fields. Trailing bytes added by newer program versions are
//! ignored.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::exchanges::pumpfun::constants::{
    BONDING_CURVE_DISCRIMINATOR, GLOBAL_ACCOUNT_DISCRIMINATOR,
};
use crate::shared::errors::ClientError;
use crate::shared::utils::serialize_pubkey;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub(crate) struct GlobalLayout {
    pub initialized: bool,
    pub authority: [u8; 32],
    pub fee_recipient: [u8; 32],
    pub initial_virtual_token_reserves: u64,
    pub initial_virtual_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    pub fee_basis_points: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone)]
pub(crate) struct BondingCurveLayout {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
}

/// Program-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalAccount {
    pub initialized: bool,
    #[serde(serialize_with = "serialize_pubkey")]
    pub authority: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub fee_recipient: Pubkey,
    pub initial_virtual_token_reserves: u64,
    pub initial_virtual_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    pub fee_basis_points: u64,
}

/// Per-mint curve reserves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BondingCurveAccount {
    pub virtual_token_reserves: u64,
    pub virtual_sol_reserves: u64,
    pub real_token_reserves: u64,
    pub real_sol_reserves: u64,
    pub token_total_supply: u64,
    pub complete: bool,
}

fn strip_discriminator<'a>(
    data: &'a [u8],
    expected: &[u8; 8],
    name: &str,
) -> Result<&'a [u8], ClientError> {
    if data.len() < 8 {
        return Err(ClientError::InvalidAccountData(format!(
            "{} account data too short: {} bytes",
            name,
            data.len()
        )));
    }
    if &data[..8] != expected {
        return Err(ClientError::InvalidAccountData(format!(
            "{} discriminator mismatch: {:?}",
            name,
            &data[..8]
        )));
    }
    Ok(&data[8..])
}

impl GlobalAccount {
    pub fn try_deserialize(data: &[u8]) -> Result<Self, ClientError> {
        let mut body = strip_discriminator(data, &GLOBAL_ACCOUNT_DISCRIMINATOR, "Global")?;
        let layout = GlobalLayout::deserialize(&mut body)
            .map_err(|e| ClientError::InvalidAccountData(format!("Global: {}", e)))?;
        Ok(layout.into())
    }
}

impl BondingCurveAccount {
    pub fn try_deserialize(data: &[u8]) -> Result<Self, ClientError> {
        let mut body = strip_discriminator(data, &BONDING_CURVE_DISCRIMINATOR, "BondingCurve")?;
        let layout = BondingCurveLayout::deserialize(&mut body)
            .map_err(|e| ClientError::InvalidAccountData(format!("BondingCurve: {}", e)))?;
        Ok(layout.into())
    }

    /// Market cap in lamports at the current virtual price
    pub fn market_cap_sol(&self) -> u64 {
        if self.virtual_token_reserves == 0 {
            return 0;
        }
        let cap = self.token_total_supply as u128 * self.virtual_sol_reserves as u128
            / self.virtual_token_reserves as u128;
        u64::try_from(cap).unwrap_or(u64::MAX)
    }
}

impl From<GlobalLayout> for GlobalAccount {
    fn from(layout: GlobalLayout) -> Self {
        Self {
            initialized: layout.initialized,
            authority: Pubkey::new_from_array(layout.authority),
            fee_recipient: Pubkey::new_from_array(layout.fee_recipient),
            initial_virtual_token_reserves: layout.initial_virtual_token_reserves,
            initial_virtual_sol_reserves: layout.initial_virtual_sol_reserves,
            initial_real_token_reserves: layout.initial_real_token_reserves,
            token_total_supply: layout.token_total_supply,
            fee_basis_points: layout.fee_basis_points,
        }
    }
}

impl From<BondingCurveLayout> for BondingCurveAccount {
    fn from(layout: BondingCurveLayout) -> Self {
        Self {
            virtual_token_reserves: layout.virtual_token_reserves,
            virtual_sol_reserves: layout.virtual_sol_reserves,
            real_token_reserves: layout.real_token_reserves,
            real_sol_reserves: layout.real_sol_reserves,
            token_total_supply: layout.token_total_supply,
            complete: layout.complete,
        }
    }
}
