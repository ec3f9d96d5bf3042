pub mod compute_budget;
pub mod pumpfun;
pub mod transaction_builder;
