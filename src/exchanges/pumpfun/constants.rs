//! pump.fun program constants (from the program IDL)

use solana_sdk::{pubkey, pubkey::Pubkey};

pub const PUMPFUN_PROGRAM_ID: Pubkey = pubkey!("6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P");
pub const MPL_TOKEN_METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub const GLOBAL_ACCOUNT_SEED: &[u8] = b"global";
pub const MINT_AUTHORITY_SEED: &[u8] = b"mint-authority";
pub const BONDING_CURVE_SEED: &[u8] = b"bonding-curve";
pub const METADATA_SEED: &[u8] = b"metadata";
pub const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

/// Decimals of every token minted by the program
pub const DEFAULT_DECIMALS: u8 = 6;

pub const DEFAULT_SLIPPAGE_BPS: u64 = 500;

pub const DEFAULT_METADATA_UPLOAD_URL: &str = "https://pump.fun/api/ipfs";

// Anchor instruction discriminators: sha256("global:<name>")[..8]
pub const CREATE_DISCRIMINATOR: [u8; 8] = [24, 30, 200, 40, 5, 28, 7, 119];
pub const BUY_DISCRIMINATOR: [u8; 8] = [102, 6, 61, 18, 1, 218, 235, 234];
pub const SELL_DISCRIMINATOR: [u8; 8] = [51, 230, 133, 164, 1, 127, 131, 173];

// Anchor account discriminators: sha256("account:<Name>")[..8]
pub const GLOBAL_ACCOUNT_DISCRIMINATOR: [u8; 8] = [167, 232, 232, 177, 200, 108, 114, 127];
pub const BONDING_CURVE_DISCRIMINATOR: [u8; 8] = [23, 183, 248, 55, 96, 216, 172, 96];

// Anchor event discriminators: sha256("event:<Name>")[..8]
pub const CREATE_EVENT_DISCRIMINATOR: [u8; 8] = [27, 114, 169, 77, 222, 235, 99, 118];
pub const TRADE_EVENT_DISCRIMINATOR: [u8; 8] = [189, 219, 127, 211, 78, 230, 97, 238];
pub const COMPLETE_EVENT_DISCRIMINATOR: [u8; 8] = [95, 114, 97, 156, 212, 46, 152, 8];
pub const SET_PARAMS_EVENT_DISCRIMINATOR: [u8; 8] = [223, 195, 159, 246, 62, 48, 143, 131];
