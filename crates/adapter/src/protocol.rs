//! Protocol module - JSON message types for the agent adapter
//!
//! Line-delimited JSON: one message per line, every message carries
//! `type`, `seq` (sender-side sequence number) and `ts` (milliseconds).

use serde::{Deserialize, Serialize};

use crate::core::SettleTrace;
use crate::types::{Coord, GameAction, Swap, GRID_SIZE};

/// Major protocol version accepted from clients (`"1.x"`).
pub const PROTOCOL_MAJOR: &str = "1.";

/// Version announced in `welcome`.
pub const PROTOCOL_VERSION: &str = "1.0.0";

// Client -> server

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[serde(rename = "hello")]
    #[default]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CommandType {
    #[serde(rename = "command")]
    #[default]
    Command,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default)]
    pub msg_type: HelloType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    /// Receive an observation after every state change.
    #[serde(default = "default_stream")]
    pub stream_observations: bool,
}

fn default_stream() -> bool {
    true
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
        }
    }
}

/// Wire form of a swap: `{"from":[r,c],"to":[r,c]}`.
///
/// Components are signed so out-of-range requests reach the engine's
/// validation instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SwapCommand {
    pub from: [i32; 2],
    pub to: [i32; 2],
}

impl SwapCommand {
    pub fn from_swap(swap: Swap) -> Self {
        Self {
            from: [swap.from.row as i32, swap.from.col as i32],
            to: [swap.to.row as i32, swap.to.col as i32],
        }
    }

    /// `None` when either endpoint lies outside the grid.
    pub fn to_swap(&self) -> Option<Swap> {
        let coord = |[r, c]: [i32; 2]| {
            let size = GRID_SIZE as i32;
            ((0..size).contains(&r) && (0..size).contains(&c)).then(|| Coord::new(r as u8, c as u8))
        };
        Some(Swap::new(coord(self.from)?, coord(self.to)?))
    }
}

/// Non-swap command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionName {
    NextLevel,
    Restart,
    Hint,
}

impl ActionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::NextLevel => "next_level",
            ActionName::Restart => "restart",
            ActionName::Hint => "hint",
        }
    }
}

impl From<ActionName> for GameAction {
    fn from(value: ActionName) -> Self {
        match value {
            ActionName::NextLevel => GameAction::NextLevel,
            ActionName::Restart => GameAction::Restart,
            ActionName::Hint => GameAction::Hint,
        }
    }
}

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        match GameAction::from_str(s) {
            Some(GameAction::NextLevel) => Ok(Self::NextLevel),
            Some(GameAction::Restart) => Ok(Self::Restart),
            Some(GameAction::Hint) => Ok(Self::Hint),
            _ => Err(serde::de::Error::custom(format!("unknown action: {s}"))),
        }
    }
}

impl Serialize for ActionName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Command message (controller only). Exactly one of `swap` / `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type", default)]
    pub msg_type: CommandType,
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<SwapCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionName>,
}

// Server -> client

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "invalid_swap")]
    InvalidSwap,
    #[serde(rename = "not_playable")]
    NotPlayable,
    #[serde(rename = "backpressure")]
    Backpressure,
    #[serde(rename = "internal")]
    Internal,
}

impl ErrorCode {
    /// Map an engine error code onto the wire.
    pub fn from_engine(code: &str) -> Self {
        match code {
            "invalid_swap" => ErrorCode::InvalidSwap,
            "not_playable" => ErrorCode::NotPlayable,
            _ => ErrorCode::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: Vec<String>,
    pub commands: Vec<String>,
    pub board: BoardDims,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDims {
    pub width: u8,
    pub height: u8,
}

/// Acknowledgment: the command was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// Suggested swap, only on `hint` acks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<HintPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintPayload {
    pub swap: SwapCommand,
    /// Cells the swap's first pass would match
    pub matched: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Session state as seen by agents (sent after every change).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    /// `playing`, `level_complete` or `game_over`
    pub status: String,
    pub all_levels_cleared: bool,
    pub episode_id: u32,
    pub seed: u64,
    pub board: BoardSnapshot,
    pub score: u32,
    pub moves_remaining: u32,
    /// 1-based, as shown to players
    pub level: u32,
    pub level_count: u32,
    pub target_score: u32,
    pub swaps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// `special * 8 + color`; 0 is empty
    pub cells: [[u8; GRID_SIZE as usize]; GRID_SIZE as usize],
}

/// Summary of the most recent settle cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastEvent {
    pub swap: SwapCommand,
    /// `settled` or `reverted`
    pub outcome: LastOutcome,
    pub passes: u32,
    pub cleared: u32,
    pub promotions: u32,
    pub score_gained: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LastOutcome {
    #[serde(rename = "settled")]
    Settled,
    #[serde(rename = "reverted")]
    Reverted,
}

impl From<&SettleTrace> for LastEvent {
    fn from(trace: &SettleTrace) -> Self {
        Self {
            swap: SwapCommand::from_swap(trace.swap),
            outcome: if trace.reverted() {
                LastOutcome::Reverted
            } else {
                LastOutcome::Settled
            },
            passes: trace.steps.len() as u32,
            cleared: trace.total_cleared() as u32,
            promotions: trace.promotions().count() as u32,
            score_gained: trace.score_gained(),
        }
    }
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl std::fmt::Display for StateHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

// Parsing

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse one inbound line.
///
/// Well-formed JSON with an unrecognised `type` is `Unknown`, not an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct Header<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type {
                Some("hello") | Some("command") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Best-effort `seq` for replies to lines that failed to parse.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// Constructors

pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities::default(),
    }
}

/// Create a swap command
pub fn create_swap_command(seq: u64, swap: Swap) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        swap: Some(SwapCommand::from_swap(swap)),
        action: None,
    }
}

/// Create a non-swap command
pub fn create_action_command(seq: u64, action: ActionName) -> CommandMessage {
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        swap: None,
        action: Some(action),
    }
}

pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: "tui-match3".to_string(),
        capabilities: ServerCapabilities {
            formats: vec!["json".to_string()],
            commands: ["swap", "next_level", "restart", "hint"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            board: BoardDims {
                width: GRID_SIZE,
                height: GRID_SIZE,
            },
        },
    }
}

/// `ok` ack for a command.
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        hint: None,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
