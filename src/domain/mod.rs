//! Domain layer - curve state, events and instruction building

pub mod curve;
pub mod events;
pub mod execution;
