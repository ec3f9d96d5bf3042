//! Program-derived addresses used by the pump.fun program

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use super::constants::{
    BONDING_CURVE_SEED, EVENT_AUTHORITY_SEED, GLOBAL_ACCOUNT_SEED, METADATA_SEED,
    MINT_AUTHORITY_SEED, MPL_TOKEN_METADATA_PROGRAM_ID,
};

/// Derive a program address and bump seed from ordered seeds.
///
/// Deterministic: identical seeds and program id always yield the same pair.
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(seeds, program_id)
}

pub fn global_pda(program_id: &Pubkey) -> Pubkey {
    derive_address(&[GLOBAL_ACCOUNT_SEED], program_id).0
}

pub fn mint_authority_pda(program_id: &Pubkey) -> Pubkey {
    derive_address(&[MINT_AUTHORITY_SEED], program_id).0
}

pub fn event_authority_pda(program_id: &Pubkey) -> Pubkey {
    derive_address(&[EVENT_AUTHORITY_SEED], program_id).0
}

pub fn bonding_curve_pda(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    derive_address(&[BONDING_CURVE_SEED, mint.as_ref()], program_id).0
}

/// Metaplex metadata account, derived under the metadata program
pub fn metadata_pda(mint: &Pubkey) -> Pubkey {
    derive_address(
        &[
            METADATA_SEED,
            MPL_TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &MPL_TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Token account owned by the bonding curve PDA (owner is off-curve)
pub fn associated_bonding_curve(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    get_associated_token_address(&bonding_curve_pda(mint, program_id), mint)
}

pub fn associated_user(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::pumpfun::constants::PUMPFUN_PROGRAM_ID;

    #[test]
    fn test_derivation_is_deterministic() {
        let mint = Pubkey::new_unique();
        let seeds: &[&[u8]] = &[BONDING_CURVE_SEED, mint.as_ref()];
        let first = derive_address(seeds, &PUMPFUN_PROGRAM_ID);
        let second = derive_address(seeds, &PUMPFUN_PROGRAM_ID);
        assert_eq!(first, second);
        assert_eq!(bonding_curve_pda(&mint, &PUMPFUN_PROGRAM_ID), first.0);
    }

    #[test]
    fn test_known_global_address() {
        assert_eq!(
            global_pda(&PUMPFUN_PROGRAM_ID).to_string(),
            "4wTV1YmiEkRvAtNtsSGPtUrqRYQMe5SKy2uB4Jjaxnjf"
        );
    }

    #[test]
    fn test_known_event_authority() {
        assert_eq!(
            event_authority_pda(&PUMPFUN_PROGRAM_ID).to_string(),
            "Ce6TQqeHC9p8KetsN6JsjHK7UTZk7nasjjnr7XxXp9F1"
        );
    }

    #[test]
    fn test_distinct_mints_get_distinct_curves() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        assert_ne!(
            bonding_curve_pda(&a, &PUMPFUN_PROGRAM_ID),
            bonding_curve_pda(&b, &PUMPFUN_PROGRAM_ID)
        );
        assert_ne!(metadata_pda(&a), metadata_pda(&b));
    }

    #[test]
    fn test_associated_accounts_differ_by_owner() {
        let mint = Pubkey::new_unique();
        let user = Pubkey::new_unique();
        assert_ne!(
            associated_user(&user, &mint),
            associated_bonding_curve(&mint, &PUMPFUN_PROGRAM_ID)
        );
    }
}
