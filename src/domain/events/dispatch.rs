//! Dispatch of log notifications to typed event handlers

use std::sync::Arc;

use solana_client::rpc_response::{Response, RpcLogsResponse};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, warn};

use super::model::{
    to_complete_event, to_create_event, to_set_params_event, to_trade_event, DomainEvent,
};
use super::raw::{
    parse_program_data, EventKind, RawCompleteEvent, RawCreateEvent, RawEvent,
    RawSetParamsEvent, RawTradeEvent,
};
use crate::shared::errors::EventDecodeError;

/// Callback receiving `(event, slot, signature)`.
///
/// Runs on the listener task and may be invoked concurrently with client
/// calls.
pub type EventHandler = Arc<dyn Fn(DomainEvent, u64, &str) + Send + Sync>;

/// Untyped notification carrying one transaction's logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogNotification {
    pub signature: String,
    pub slot: u64,
    /// Set when the transaction failed; its events never took effect
    pub err: Option<String>,
    pub logs: Vec<String>,
}

impl From<Response<RpcLogsResponse>> for LogNotification {
    fn from(response: Response<RpcLogsResponse>) -> Self {
        Self {
            signature: response.value.signature,
            slot: response.context.slot,
            err: response.value.err.map(|e| e.to_string()),
            logs: response.value.logs,
        }
    }
}

fn convert(
    kind: EventKind,
    raw: &RawEvent,
    slot: u64,
    signature: &str,
) -> Result<DomainEvent, EventDecodeError> {
    let name = kind.name();
    Ok(match kind {
        EventKind::Create => {
            DomainEvent::Created(to_create_event(raw.decode::<RawCreateEvent>(name)?, slot, signature))
        }
        EventKind::Trade => {
            DomainEvent::Traded(to_trade_event(raw.decode::<RawTradeEvent>(name)?, slot, signature))
        }
        EventKind::Complete => DomainEvent::Completed(to_complete_event(
            raw.decode::<RawCompleteEvent>(name)?,
            slot,
            signature,
        )),
        EventKind::SetParams => DomainEvent::ParamsChanged(to_set_params_event(
            raw.decode::<RawSetParamsEvent>(name)?,
            slot,
            signature,
        )),
    })
}

/// Hand every event of `kind` that `program_id` emitted in `notification`
/// to `handler`.
///
/// `Program data:` lines logged by other programs are never decoded. Unknown discriminators and undecodable payloads are logged and dropped.
/// Events of other known kinds are ignored. Returns the number of events
/// delivered.
pub fn dispatch_notification(
    kind: EventKind,
    program_id: &Pubkey,
    notification: &LogNotification,
    handler: &(dyn Fn(DomainEvent, u64, &str) + Send + Sync),
) -> usize {
    if let Some(err) = &notification.err {
        debug!("Skipping failed transaction {}: {}", notification.signature, err);
        return 0;
    }

    let mut delivered = 0;
    for parsed in parse_program_data(&notification.logs, program_id) {
        let raw = match parsed {
            Ok(raw) => raw,
            Err(e) => {
                warn!("⚠️ Malformed program data in {}: {}", notification.signature, e);
                continue;
            }
        };

        match raw.kind() {
            None => {
                warn!(
                    "❓ Unknown event discriminator {:?} in {}",
                    raw.discriminator, notification.signature
                );
                continue;
            }
            Some(found) if found != kind => continue,
            Some(_) => {}
        }

        match convert(kind, &raw, notification.slot, &notification.signature) {
            Ok(event) => {
                if let DomainEvent::Completed(completed) = &event {
                    info!("🎓 Bonding curve complete for mint {}", completed.mint);
                }
                handler(event, notification.slot, &notification.signature);
                delivered += 1;
            }
            Err(e) => warn!("⚠️ Failed to decode {} in {}: {}", kind, notification.signature, e),
        }
    }
    delivered
}
