// src/math.rs

/// Basis points denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Upper bound the caller is willing to pay for a buy.
///
/// `amount + amount * slippage_bps / 10000`, floor division, computed in
/// 128-bit space so large principals do not overflow. The result saturates
/// at `u64::MAX` since the program argument is a `u64`.
///
/// Precondition: `slippage_bps <= 10000` (not checked here).
pub fn calculate_with_slippage_buy(amount: u64, slippage_bps: u64) -> u64 {
    let amount = amount as u128;
    let bound = amount + amount * slippage_bps as u128 / BPS_DENOMINATOR;
    u64::try_from(bound).unwrap_or(u64::MAX)
}

/// Lower bound the caller will accept for a sell.
///
/// `amount - amount * slippage_bps / 10000`, same arithmetic as the buy side.
///
/// Precondition: `slippage_bps <= 10000` (not checked here).
pub fn calculate_with_slippage_sell(amount: u64, slippage_bps: u64) -> u64 {
    let amount = amount as u128;
    let reduction = amount * slippage_bps as u128 / BPS_DENOMINATOR;
    amount.saturating_sub(reduction) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_ceiling_scenario() {
        // 1 SOL with 5% slippage
        assert_eq!(calculate_with_slippage_buy(1_000_000_000, 500), 1_050_000_000);
    }

    #[test]
    fn test_sell_floor_scenario() {
        assert_eq!(calculate_with_slippage_sell(990_000, 500), 940_500);
    }

    #[test]
    fn test_zero_amount_stays_zero() {
        for bps in [0, 1, 500, 9_999, 10_000] {
            assert_eq!(calculate_with_slippage_buy(0, bps), 0);
            assert_eq!(calculate_with_slippage_sell(0, bps), 0);
        }
    }

    #[test]
    fn test_bounds_bracket_amount() {
        let amounts = [1, 7, 999, 1_000_000_000, u64::MAX / 3, u64::MAX];
        for amount in amounts {
            for bps in [0, 1, 50, 500, 2_500, 10_000] {
                let floor = calculate_with_slippage_sell(amount, bps);
                let ceiling = calculate_with_slippage_buy(amount, bps);
                assert!(floor <= amount, "floor {} > amount {}", floor, amount);
                assert!(amount <= ceiling, "ceiling {} < amount {}", ceiling, amount);
            }
        }
    }

    #[test]
    fn test_floor_division() {
        // 999 * 500 / 10000 = 49.95 -> 49
        assert_eq!(calculate_with_slippage_buy(999, 500), 1_048);
        assert_eq!(calculate_with_slippage_sell(999, 500), 950);
    }

    #[test]
    fn test_ceiling_saturates_on_overflow() {
        assert_eq!(calculate_with_slippage_buy(u64::MAX, 10_000), u64::MAX);
        assert_eq!(calculate_with_slippage_sell(u64::MAX, 10_000), 0);
    }
}
