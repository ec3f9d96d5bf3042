//! Raw program events as emitted in transaction logs
//!
//! Anchor emits each event as a `Program data: <base64>` log line whose
//! payload is an 8-byte discriminator followed by the borsh-encoded fields.

use base64::{engine::general_purpose::STANDARD as BASE64_ENGINE, Engine as _};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::exchanges::pumpfun::constants::{
    COMPLETE_EVENT_DISCRIMINATOR, CREATE_EVENT_DISCRIMINATOR, SET_PARAMS_EVENT_DISCRIMINATOR,
    TRADE_EVENT_DISCRIMINATOR,
};
use crate::shared::errors::EventDecodeError;

const PROGRAM_DATA_PREFIX: &str = "Program data: ";
const PROGRAM_PREFIX: &str = "Program ";

/// The four event kinds a listener can register for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "createEvent")]
    Create,
    #[serde(rename = "tradeEvent")]
    Trade,
    #[serde(rename = "completeEvent")]
    Complete,
    #[serde(rename = "setParamsEvent")]
    SetParams,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Create,
        EventKind::Trade,
        EventKind::Complete,
        EventKind::SetParams,
    ];

    /// IDL event name
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Create => "createEvent",
            EventKind::Trade => "tradeEvent",
            EventKind::Complete => "completeEvent",
            EventKind::SetParams => "setParamsEvent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn discriminator(&self) -> [u8; 8] {
        match self {
            EventKind::Create => CREATE_EVENT_DISCRIMINATOR,
            EventKind::Trade => TRADE_EVENT_DISCRIMINATOR,
            EventKind::Complete => COMPLETE_EVENT_DISCRIMINATOR,
            EventKind::SetParams => SET_PARAMS_EVENT_DISCRIMINATOR,
        }
    }

    pub fn from_discriminator(discriminator: &[u8; 8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| &kind.discriminator() == discriminator)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One undecoded event taken from a log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub discriminator: [u8; 8],
    pub payload: Vec<u8>,
}

impl RawEvent {
    /// Parse the base64 body of a `Program data:` line
    pub fn from_base64(encoded: &str) -> Result<Self, EventDecodeError> {
        let bytes = BASE64_ENGINE
            .decode(encoded.trim())
            .map_err(|e| EventDecodeError::InvalidBase64(e.to_string()))?;
        if bytes.len() < 8 {
            return Err(EventDecodeError::TooShort(bytes.len()));
        }
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&bytes[..8]);
        Ok(Self {
            discriminator,
            payload: bytes[8..].to_vec(),
        })
    }

    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_discriminator(&self.discriminator)
    }

    /// Decode the payload as `T`, ignoring trailing bytes
    pub fn decode<T: BorshDeserialize>(&self, kind: &'static str) -> Result<T, EventDecodeError> {
        T::deserialize(&mut self.payload.as_slice()).map_err(|e| EventDecodeError::Deserialize {
            kind,
            reason: e.to_string(),
        })
    }
}

/// Frame change announced by a runtime log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Invoke(Pubkey),
    Exit,
}

/// `Program <id> invoke [n]` pushes, `Program <id> success` and
/// `Program <id> failed: ...` pop. Program-emitted lines (`Program log:`,
/// `Program data:`, `Program return:`) never parse as a pubkey.
fn parse_frame(line: &str) -> Option<Frame> {
    let mut parts = line.strip_prefix(PROGRAM_PREFIX)?.split_whitespace();
    let id = Pubkey::from_str(parts.next()?).ok()?;
    match parts.next()? {
        "invoke" => Some(Frame::Invoke(id)),
        "success" => Some(Frame::Exit),
        status if status.starts_with("failed") => Some(Frame::Exit),
        _ => None,
    }
}

/// Every `Program data:` payload emitted by `program_id` itself, in log order.
///
/// Tracks the invoke stack so that lines logged by any other program in the
/// same transaction, including programs `program_id` calls into, are skipped.
pub fn parse_program_data(
    logs: &[String],
    program_id: &Pubkey,
) -> Vec<Result<RawEvent, EventDecodeError>> {
    let mut stack: Vec<Pubkey> = Vec::new();
    let mut events = Vec::new();

    for line in logs {
        if let Some(data) = line.strip_prefix(PROGRAM_DATA_PREFIX) {
            if stack.last() == Some(program_id) {
                events.push(RawEvent::from_base64(data));
            }
            continue;
        }
        match parse_frame(line) {
            Some(Frame::Invoke(id)) => stack.push(id),
            Some(Frame::Exit) => {
                stack.pop();
            }
            None => {}
        }
    }
    events
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawCreateEvent {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub mint: [u8; 32],
    pub bonding_curve: [u8; 32],
    pub user: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawTradeEvent {
    pub mint: [u8; 32],
    pub sol_amount: u64,
    pub token_amount: u64,
    pub is_buy: bool,
    pub user: [u8; 32],
    pub timestamp: i64,
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawCompleteEvent {
    pub user: [u8; 32],
    pub mint: [u8; 32],
    pub bonding_curve: [u8; 32],
    pub timestamp: i64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawSetParamsEvent {
    pub fee_recipient: [u8; 32],
    pub initial_virtual_token_reserves: u64,
    pub initial_virtual_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    pub fee_basis_points: u64,
}

/// Build a `Program data:` log line, for tests elsewhere in the crate
#[cfg(test)]
pub(crate) fn program_data_line<T: BorshSerialize>(kind: EventKind, event: &T) -> String {
    let mut bytes = kind.discriminator().to_vec();
    bytes.extend(event.try_to_vec().unwrap());
    format!("{}{}", PROGRAM_DATA_PREFIX, BASE64_ENGINE.encode(bytes))
}

/// Wrap `lines` in a top-level invocation of `program_id`
#[cfg(test)]
pub(crate) fn invocation_logs(program_id: &Pubkey, lines: Vec<String>) -> Vec<String> {
    let mut logs = vec![format!("Program {} invoke [1]", program_id)];
    logs.extend(lines);
    logs.push(format!("Program {} consumed 30000 of 200000 compute units", program_id));
    logs.push(format!("Program {} success", program_id));
    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::pumpfun::constants::PUMPFUN_PROGRAM_ID;

    #[test]
    fn test_names_and_discriminators_are_consistent() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
            assert_eq!(EventKind::from_discriminator(&kind.discriminator()), Some(kind));
        }
        assert_eq!(EventKind::from_name("swapEvent"), None);
        assert_eq!(EventKind::from_discriminator(&[0u8; 8]), None);
    }

    #[test]
    fn test_kind_serializes_as_idl_name() {
        assert_eq!(serde_json::to_string(&EventKind::Trade).unwrap(), "\"tradeEvent\"");
        let kind: EventKind = serde_json::from_str("\"setParamsEvent\"").unwrap();
        assert_eq!(kind, EventKind::SetParams);
    }

    #[test]
    fn test_parse_program_data_skips_other_lines() {
        let event = RawCompleteEvent {
            user: [1; 32],
            mint: [2; 32],
            bonding_curve: [3; 32],
            timestamp: 1_700_000_000,
        };
        let logs = vec![
            "Program 6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P invoke [1]".to_string(),
            "Program log: Instruction: Buy".to_string(),
            program_data_line(EventKind::Complete, &event),
            "Program 6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P success".to_string(),
        ];

        let parsed = parse_program_data(&logs, &PUMPFUN_PROGRAM_ID);
        assert_eq!(parsed.len(), 1);
        let raw = parsed[0].as_ref().unwrap();
        assert_eq!(raw.kind(), Some(EventKind::Complete));
        assert_eq!(raw.decode::<RawCompleteEvent>("completeEvent").unwrap(), event);
    }

    #[test]
    fn test_malformed_payloads() {
        let logs = invocation_logs(
            &PUMPFUN_PROGRAM_ID,
            vec![
                "Program data: !!!not-base64".to_string(),
                format!("Program data: {}", BASE64_ENGINE.encode([1u8, 2, 3])),
            ],
        );
        let parsed = parse_program_data(&logs, &PUMPFUN_PROGRAM_ID);

        assert!(matches!(parsed[0], Err(EventDecodeError::InvalidBase64(_))));
        assert_eq!(parsed[1], Err(EventDecodeError::TooShort(3)));
    }

    #[test]
    fn test_truncated_payload_fails_to_decode() {
        let raw = RawEvent {
            discriminator: TRADE_EVENT_DISCRIMINATOR,
            payload: vec![0; 10],
        };
        assert!(matches!(
            raw.decode::<RawTradeEvent>("tradeEvent"),
            Err(EventDecodeError::Deserialize { kind: "tradeEvent", .. })
        ));
    }

    #[test]
    fn test_only_data_logged_by_program_itself_is_parsed() {
        let foreign = Pubkey::new_unique();
        let token_program = spl_token::id();
        let forged = RawCompleteEvent {
            user: [9; 32],
            mint: [9; 32],
            bonding_curve: [9; 32],
            timestamp: 1,
        };
        let genuine = RawCompleteEvent {
            user: [1; 32],
            mint: [2; 32],
            bonding_curve: [3; 32],
            timestamp: 2,
        };
        let logs = vec![
            format!("Program {} invoke [1]", foreign),
            program_data_line(EventKind::Complete, &forged),
            format!("Program {} invoke [2]", PUMPFUN_PROGRAM_ID),
            format!("Program {} invoke [3]", token_program),
            program_data_line(EventKind::Complete, &forged),
            format!("Program {} success", token_program),
            program_data_line(EventKind::Complete, &genuine),
            format!("Program {} success", PUMPFUN_PROGRAM_ID),
            program_data_line(EventKind::Complete, &forged),
            format!("Program {} success", foreign),
            format!("Program {} invoke [1]", foreign),
            "Program log: success".to_string(),
            program_data_line(EventKind::Complete, &forged),
            format!("Program {} failed: custom program error: 0x1", foreign),
        ];

        let parsed = parse_program_data(&logs, &PUMPFUN_PROGRAM_ID);
        assert_eq!(parsed.len(), 1);
        let raw = parsed[0].as_ref().unwrap();
        assert_eq!(raw.decode::<RawCompleteEvent>("completeEvent").unwrap(), genuine);
    }

    #[test]
    fn test_data_outside_any_invocation_is_ignored() {
        let event = RawCompleteEvent {
            user: [1; 32],
            mint: [2; 32],
            bonding_curve: [3; 32],
            timestamp: 3,
        };
        let logs = vec![program_data_line(EventKind::Complete, &event)];
        assert!(parse_program_data(&logs, &PUMPFUN_PROGRAM_ID).is_empty());
    }
}
