//! pump.fun bonding curve program: addresses, constants, instruction encoding

pub mod constants;
pub mod instructions;
pub mod pda;

pub use constants::PUMPFUN_PROGRAM_ID;
pub use instructions::{buy_instruction_set, create_instruction, sell_instruction_set};
