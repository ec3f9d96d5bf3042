//! Execution domain - instruction sets for program operations

mod instruction_builder;

pub use instruction_builder::SwapInstructionBuilder;
