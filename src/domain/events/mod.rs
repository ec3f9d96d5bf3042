//! Program event decoding

pub mod dispatch;
pub mod model;
pub mod raw;

pub use dispatch::{dispatch_notification, EventHandler, LogNotification};
pub use model::{CurveCompleted, DomainEvent, ParamsChanged, TokenCreated, TokenTraded};
pub use raw::{parse_program_data, EventKind, RawEvent};
