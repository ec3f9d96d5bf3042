//! Typed domain events and their pure conversions from raw layouts

use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use super::raw::{RawCompleteEvent, RawCreateEvent, RawSetParamsEvent, RawTradeEvent};
use crate::shared::utils::serialize_pubkey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenCreated {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    #[serde(serialize_with = "serialize_pubkey")]
    pub mint: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub bonding_curve: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub user: Pubkey,
    pub slot: u64,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenTraded {
    #[serde(serialize_with = "serialize_pubkey")]
    pub mint: Pubkey,
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    #[serde(serialize_with = "serialize_pubkey")]
    pub user: Pubkey,
    pub timestamp: i64,
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
    pub slot: u64,
    pub signature: String,
}

/// Bonding curve filled, token ready for migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurveCompleted {
    #[serde(serialize_with = "serialize_pubkey")]
    pub user: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub mint: Pubkey,
    #[serde(serialize_with = "serialize_pubkey")]
    pub bonding_curve: Pubkey,
    pub timestamp: i64,
    pub slot: u64,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamsChanged {
    #[serde(serialize_with = "serialize_pubkey")]
    pub fee_recipient: Pubkey,
    pub initial_virtual_token_reserves: u64,
    pub initial_virtual_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    pub fee_basis_points: u64,
    pub slot: u64,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    Created(TokenCreated),
    Traded(TokenTraded),
    Completed(CurveCompleted),
    ParamsChanged(ParamsChanged),
}

impl DomainEvent {
    pub fn slot(&self) -> u64 {
        match self {
            DomainEvent::Created(e) => e.slot,
            DomainEvent::Traded(e) => e.slot,
            DomainEvent::Completed(e) => e.slot,
            DomainEvent::ParamsChanged(e) => e.slot,
        }
    }

    pub fn signature(&self) -> &str {
        match self {
            DomainEvent::Created(e) => &e.signature,
            DomainEvent::Traded(e) => &e.signature,
            DomainEvent::Completed(e) => &e.signature,
            DomainEvent::ParamsChanged(e) => &e.signature,
        }
    }
}

pub fn to_create_event(raw: RawCreateEvent, slot: u64, signature: &str) -> TokenCreated {
    TokenCreated {
        name: raw.name,
        symbol: raw.symbol,
        uri: raw.uri,
        mint: Pubkey::new_from_array(raw.mint),
        bonding_curve: Pubkey::new_from_array(raw.bonding_curve),
        user: Pubkey::new_from_array(raw.user),
        slot,
        signature: signature.to_string(),
    }
}

pub fn to_trade_event(raw: RawTradeEvent, slot: u64, signature: &str) -> TokenTraded {
    TokenTraded {
        mint: Pubkey::new_from_array(raw.mint),
        sol_amount: raw.sol_amount,
        token_amount: raw.token_amount,
        is_buy: raw.is_buy,
        user: Pubkey::new_from_array(raw.user),
        timestamp: raw.timestamp,
        virtual_sol_reserves: raw.virtual_sol_reserves,
        virtual_token_reserves: raw.virtual_token_reserves,
        slot,
        signature: signature.to_string(),
    }
}

pub fn to_complete_event(raw: RawCompleteEvent, slot: u64, signature: &str) -> CurveCompleted {
    CurveCompleted {
        user: Pubkey::new_from_array(raw.user),
        mint: Pubkey::new_from_array(raw.mint),
        bonding_curve: Pubkey::new_from_array(raw.bonding_curve),
        timestamp: raw.timestamp,
        slot,
        signature: signature.to_string(),
    }
}

pub fn to_set_params_event(raw: RawSetParamsEvent, slot: u64, signature: &str) -> ParamsChanged {
    ParamsChanged {
        fee_recipient: Pubkey::new_from_array(raw.fee_recipient),
        initial_virtual_token_reserves: raw.initial_virtual_token_reserves,
        initial_virtual_sol_reserves: raw.initial_virtual_sol_reserves,
        initial_real_token_reserves: raw.initial_real_token_reserves,
        token_total_supply: raw.token_total_supply,
        fee_basis_points: raw.fee_basis_points,
        slot,
        signature: signature.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_conversion() {
        let mint = Pubkey::new_unique();
        let raw = RawTradeEvent {
            mint: mint.to_bytes(),
            sol_amount: 1_000_000_000,
            token_amount: 34_000_000_000_000,
            is_buy: true,
            user: [9; 32],
            timestamp: 1_700_000_123,
            virtual_sol_reserves: 31_000_000_000,
            virtual_token_reserves: 1_039_000_000_000_000,
        };

        let event = to_trade_event(raw, 77, "sig");
        assert_eq!(event.mint, mint);
        assert!(event.is_buy);
        assert_eq!(event.slot, 77);
        assert_eq!(event.signature, "sig");
        assert_eq!(event.user, Pubkey::new_from_array([9; 32]));
    }

    #[test]
    fn test_domain_event_json_uses_base58_keys() {
        let mint = Pubkey::new_unique();
        let event = DomainEvent::Completed(to_complete_event(
            RawCompleteEvent {
                user: [1; 32],
                mint: mint.to_bytes(),
                bonding_curve: [3; 32],
                timestamp: 5,
            },
            10,
            "abc",
        ));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Completed");
        assert_eq!(json["mint"], mint.to_string());
        assert_eq!(event.slot(), 10);
        assert_eq!(event.signature(), "abc");
    }
}
