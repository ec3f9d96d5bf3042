//! pump.fun instruction encoding and ordered instruction sets
//!
//! Program instructions follow the Anchor layout: 8-byte discriminator
//! followed by the borsh-encoded arguments, accounts in IDL order.
//!
//! Instruction sets produced here are ordered:
//! - buy:  `create_associated_token_account_idempotent` then `buy`
//! - sell: `sell` then `close_account`

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use super::constants::{
    BUY_DISCRIMINATOR, CREATE_DISCRIMINATOR, MPL_TOKEN_METADATA_PROGRAM_ID, SELL_DISCRIMINATOR,
};
use super::pda;
use crate::shared::errors::ClientError;

#[derive(BorshSerialize)]
struct CreateArgs {
    name: String,
    symbol: String,
    uri: String,
}

#[derive(BorshSerialize)]
struct BuyArgs {
    amount: u64,
    max_sol_cost: u64,
}

#[derive(BorshSerialize)]
struct SellArgs {
    amount: u64,
    min_sol_output: u64,
}

fn encode<T: BorshSerialize>(discriminator: [u8; 8], args: &T) -> Result<Vec<u8>, ClientError> {
    let mut data = discriminator.to_vec();
    let encoded = args
        .try_to_vec()
        .map_err(|e| ClientError::Instruction(format!("Failed to encode arguments: {}", e)))?;
    data.extend_from_slice(&encoded);
    Ok(data)
}

/// `create` instruction. The mint keypair must co-sign the transaction.
pub fn create_instruction(
    program_id: &Pubkey,
    creator: &Pubkey,
    mint: &Pubkey,
    name: &str,
    symbol: &str,
    uri: &str,
) -> Result<Instruction, ClientError> {
    let data = encode(
        CREATE_DISCRIMINATOR,
        &CreateArgs {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
        },
    )?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*mint, true),
            AccountMeta::new_readonly(pda::mint_authority_pda(program_id), false),
            AccountMeta::new(pda::bonding_curve_pda(mint, program_id), false),
            AccountMeta::new(pda::associated_bonding_curve(mint, program_id), false),
            AccountMeta::new_readonly(pda::global_pda(program_id), false),
            AccountMeta::new_readonly(MPL_TOKEN_METADATA_PROGRAM_ID, false),
            AccountMeta::new(pda::metadata_pda(mint), false),
            AccountMeta::new(*creator, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
            AccountMeta::new_readonly(pda::event_authority_pda(program_id), false),
            AccountMeta::new_readonly(*program_id, false),
        ],
        data,
    })
}

/// `buy` instruction: receive `amount` tokens paying at most `max_sol_cost` lamports
pub fn buy_instruction(
    program_id: &Pubkey,
    buyer: &Pubkey,
    mint: &Pubkey,
    fee_recipient: &Pubkey,
    amount: u64,
    max_sol_cost: u64,
) -> Result<Instruction, ClientError> {
    let data = encode(BUY_DISCRIMINATOR, &BuyArgs { amount, max_sol_cost })?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(pda::global_pda(program_id), false),
            AccountMeta::new(*fee_recipient, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(pda::bonding_curve_pda(mint, program_id), false),
            AccountMeta::new(pda::associated_bonding_curve(mint, program_id), false),
            AccountMeta::new(pda::associated_user(buyer, mint), false),
            AccountMeta::new(*buyer, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
            AccountMeta::new_readonly(pda::event_authority_pda(program_id), false),
            AccountMeta::new_readonly(*program_id, false),
        ],
        data,
    })
}

/// `sell` instruction: sell `amount` tokens for at least `min_sol_output` lamports
pub fn sell_instruction(
    program_id: &Pubkey,
    seller: &Pubkey,
    mint: &Pubkey,
    fee_recipient: &Pubkey,
    amount: u64,
    min_sol_output: u64,
) -> Result<Instruction, ClientError> {
    let data = encode(SELL_DISCRIMINATOR, &SellArgs { amount, min_sol_output })?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(pda::global_pda(program_id), false),
            AccountMeta::new(*fee_recipient, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(pda::bonding_curve_pda(mint, program_id), false),
            AccountMeta::new(pda::associated_bonding_curve(mint, program_id), false),
            AccountMeta::new(pda::associated_user(seller, mint), false),
            AccountMeta::new(*seller, true),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(spl_associated_token_account::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(pda::event_authority_pda(program_id), false),
            AccountMeta::new_readonly(*program_id, false),
        ],
        data,
    })
}

/// Buy instruction set: the buyer's token account is created if absent
/// (idempotent on-chain), then the swap runs.
pub fn buy_instruction_set(
    program_id: &Pubkey,
    buyer: &Pubkey,
    mint: &Pubkey,
    fee_recipient: &Pubkey,
    amount: u64,
    max_sol_cost: u64,
) -> Result<Vec<Instruction>, ClientError> {
    Ok(vec![
        create_associated_token_account_idempotent(buyer, buyer, mint, &spl_token::id()),
        buy_instruction(program_id, buyer, mint, fee_recipient, amount, max_sol_cost)?,
    ])
}

/// Sell instruction set: the swap runs first, then the seller's token account
/// is closed and its rent returned to the seller.
pub fn sell_instruction_set(
    program_id: &Pubkey,
    seller: &Pubkey,
    mint: &Pubkey,
    fee_recipient: &Pubkey,
    amount: u64,
    min_sol_output: u64,
) -> Result<Vec<Instruction>, ClientError> {
    let associated_user = pda::associated_user(seller, mint);
    let close_ix = spl_token::instruction::close_account(
        &spl_token::id(),
        &associated_user,
        seller,
        seller,
        &[],
    )
    .map_err(|e| ClientError::Instruction(format!("Failed to build close_account: {}", e)))?;

    Ok(vec![
        sell_instruction(program_id, seller, mint, fee_recipient, amount, min_sol_output)?,
        close_ix,
    ])
}
