pub mod accounts;
pub mod pricing;

pub use accounts::{BondingCurveAccount, GlobalAccount};
pub use pricing::{ConstantProductPricing, CurvePricing};
