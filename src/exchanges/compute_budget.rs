use solana_sdk::{
    compute_budget::ComputeBudgetInstruction,
    instruction::Instruction,
};

use crate::shared::types::PriorityFee;

/// Create ComputeBudget instruction to set priority fee
pub fn create_priority_fee_instruction(micro_lamports: u64) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_price(micro_lamports)
}

/// Create ComputeBudget instruction to set compute unit limit
pub fn create_compute_unit_limit_instruction(compute_units: u32) -> Instruction {
    ComputeBudgetInstruction::set_compute_unit_limit(compute_units)
}

/// Both ComputeBudget instructions, limit first then price.
/// They must precede every other instruction of the transaction.
pub fn create_compute_budget_instructions(priority_fee: &PriorityFee) -> Vec<Instruction> {
    vec![
        create_compute_unit_limit_instruction(priority_fee.unit_limit),
        create_priority_fee_instruction(priority_fee.unit_price),
    ]
}

/// Prepend compute budget instructions when a priority fee is set
pub fn with_priority_fee(
    instructions: Vec<Instruction>,
    priority_fee: Option<&PriorityFee>,
) -> Vec<Instruction> {
    match priority_fee {
        Some(fee) => {
            let mut all = create_compute_budget_instructions(fee);
            all.extend(instructions);
            all
        }
        None => instructions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{compute_budget, pubkey::Pubkey};

    fn dummy_ix() -> Instruction {
        Instruction::new_with_bytes(Pubkey::new_unique(), &[1], vec![])
    }

    #[test]
    fn test_priority_fee_prepends_two_instructions() {
        let fee = PriorityFee { unit_limit: 250_000, unit_price: 10_000 };
        let ixs = with_priority_fee(vec![dummy_ix(), dummy_ix()], Some(&fee));

        assert_eq!(ixs.len(), 4);
        assert_eq!(ixs[0], ComputeBudgetInstruction::set_compute_unit_limit(250_000));
        assert_eq!(ixs[1], ComputeBudgetInstruction::set_compute_unit_price(10_000));
        assert!(ixs[2..].iter().all(|ix| ix.program_id != compute_budget::id()));
    }

    #[test]
    fn test_no_priority_fee_keeps_instructions() {
        let original = vec![dummy_ix()];
        let ixs = with_priority_fee(original.clone(), None);
        assert_eq!(ixs, original);
    }
}
