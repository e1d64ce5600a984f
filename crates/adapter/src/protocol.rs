//! Protocol module - JSON message types for the AI adapter
//!
//! Every message is one JSON object per line carrying `type`, `seq` (sender
//! sequence number) and `ts` (milliseconds since the Unix epoch).

use std::fmt;

use arrayvec::ArrayVec;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::{PlayError, MAX_ACTIONS_PER_COMMAND};
use crate::types::{CoreEvent, Direction, GameAction, Tile, MAX_BOARD_SIDE};

/// Version string sent in `welcome`. Clients must share the major number.
pub const PROTOCOL_VERSION: &str = "1.0.0";

const SIDE: usize = MAX_BOARD_SIDE as usize;

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[default]
    #[serde(rename = "command")]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlType {
    #[default]
    #[serde(rename = "control")]
    Control,
}

/// Client hello message (first message on a connection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type", default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default)]
    pub stream_observations: bool,
}

impl HelloMessage {
    /// Major component of `protocol_version` (`"1.2.0"` → `"1"`).
    pub fn protocol_major(&self) -> &str {
        self.protocol_version
            .split('.')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

/// Command message: a batch of actions applied in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type", default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub actions: ActionList,
}

/// Up to [`MAX_ACTIONS_PER_COMMAND`] actions, parsed without heap allocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActionList(pub ArrayVec<GameAction, MAX_ACTIONS_PER_COMMAND>);

impl ActionList {
    pub fn as_slice(&self) -> &[GameAction] {
        &self.0
    }
}

impl Serialize for ActionList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for action in &self.0 {
            seq.serialize_element(action.as_str())?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ActionListVisitor;

        impl<'de> Visitor<'de> for ActionListVisitor {
            type Value = ActionList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of actions")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ActionList, A::Error> {
                let mut out = ArrayVec::new();
                while let Some(ActionName(action)) = seq.next_element()? {
                    out.try_push(action)
                        .map_err(|_| de::Error::custom("too many actions"))?;
                }
                Ok(ActionList(out))
            }
        }

        deserializer.deserialize_seq(ActionListVisitor)
    }
}

/// One action name; accepts borrowed and escaped strings alike.
struct ActionName(GameAction);

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NameVisitor;

        impl Visitor<'_> for NameVisitor {
            type Value = ActionName;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an action name")
            }

            fn visit_str<E: de::Error>(self, name: &str) -> Result<ActionName, E> {
                GameAction::from_str(name)
                    .map(ActionName)
                    .ok_or_else(|| E::custom(format!("unknown action: {name}")))
            }
        }

        deserializer.deserialize_str(NameVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

/// Control message (claim/release controller)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type", default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WelcomeType {
    #[default]
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AckType {
    #[default]
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorType {
    #[default]
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObservationType {
    #[default]
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
    /// Whether the command changed the session.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    NotPlayable,
    Backpressure,
}

impl From<PlayError> for ErrorCode {
    fn from(err: PlayError) -> Self {
        match err {
            PlayError::EmptyBatch | PlayError::TooManyActions => ErrorCode::InvalidCommand,
            PlayError::NotPlayable => ErrorCode::NotPlayable,
        }
    }
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

/// Full session snapshot sent to observers.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub phase: &'static str,
    pub board: BoardSnapshot,
    pub score: u64,
    pub move_count: u32,
    pub highest_tile: Tile,
    pub target_tile: Tile,
    pub won: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub legal_moves: LegalMoves,
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
}

/// Board grid; only the first `size` rows and columns are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub size: u8,
    pub cells: [[Tile; SIDE]; SIDE],
}

impl Serialize for BoardSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        struct Rows<'a>(&'a BoardSnapshot);

        impl Serialize for Rows<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let n = self.0.size as usize;
                let mut seq = serializer.serialize_seq(Some(n))?;
                for row in self.0.cells.iter().take(n) {
                    seq.serialize_element(&row[..n])?;
                }
                seq.end()
            }
        }

        let mut st = serializer.serialize_struct("BoardSnapshot", 2)?;
        st.serialize_field("size", &self.size)?;
        st.serialize_field("cells", &Rows(self))?;
        st.end()
    }
}

/// Directions that would change the board, sent as a list of names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegalMoves(pub [bool; 4]);

impl Serialize for LegalMoves {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let count = self.0.iter().filter(|&&legal| legal).count();
        let mut seq = serializer.serialize_seq(Some(count))?;
        for dir in Direction::ALL {
            if self.0[dir.index()] {
                seq.serialize_element(dir.as_str())?;
            }
        }
        seq.end()
    }
}

/// The most recent core event, flattened for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LastEvent {
    Moved {
        direction: &'static str,
        score_delta: u64,
        merges: u8,
    },
    Spawned {
        index: u8,
        value: Tile,
    },
    Won {
        tile: Tile,
        move_count: u32,
    },
    GameOver {
        score: u64,
        highest_tile: Tile,
    },
    Restarted {
        episode_id: u32,
    },
}

impl From<CoreEvent> for LastEvent {
    fn from(event: CoreEvent) -> Self {
        match event {
            CoreEvent::Moved {
                direction,
                score_delta,
                merges,
            } => LastEvent::Moved {
                direction: direction.as_str(),
                score_delta,
                merges,
            },
            CoreEvent::Spawned { index, value } => LastEvent::Spawned { index, value },
            CoreEvent::Won { tile, move_count } => LastEvent::Won { tile, move_count },
            CoreEvent::GameOver {
                score,
                highest_tile,
            } => LastEvent::GameOver {
                score,
                highest_tile,
            },
            CoreEvent::Restarted { episode_id, .. } => LastEvent::Restarted { episode_id },
        }
    }
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl StateHash {
    fn hex(self) -> [u8; 16] {
        const HEX: &[u8; 16] = b"0123456789abcdef";
        let mut buf = [0u8; 16];
        let mut v = self.0;
        for slot in buf.iter_mut().rev() {
            *slot = HEX[(v & 0x0f) as usize];
            v >>= 4;
        }
        buf
    }
}

impl fmt::Display for StateHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl Serialize for StateHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let buf = self.hex();
        let s = std::str::from_utf8(&buf).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HexVisitor;

        impl Visitor<'_> for HexVisitor {
            type Value = StateHash;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a hex-encoded u64")
            }

            fn visit_str<E: de::Error>(self, s: &str) -> Result<StateHash, E> {
                u64::from_str_radix(s.trim(), 16)
                    .map(StateHash)
                    .map_err(|_| E::custom("invalid hex"))
            }
        }

        deserializer.deserialize_str(HexVisitor)
    }
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    /// Well-formed JSON with an unrecognized `type`.
    Unknown { seq: u64 },
}

/// Parse one line into a client message.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            #[derive(Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type.as_deref() {
                Some("hello" | "command" | "control") => Err(e),
                _ => Ok(ParsedMessage::Unknown {
                    seq: header.seq.unwrap_or(0),
                }),
            }
        }
    }
}

/// Pull `seq` out of a line that failed to parse, if it is recognizable.
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let rest = s[start + 5..].trim_start().strip_prefix(':')?.trim_start();
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

// ============== Utility Functions ==============

pub fn create_hello(seq: u64, client_name: &str, stream_observations: bool) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: PROTOCOL_VERSION.to_string(),
        requested: RequestedCapabilities {
            stream_observations,
        },
    }
}

pub fn create_command(seq: u64, actions: &[GameAction]) -> CommandMessage {
    let mut list = ArrayVec::new();
    list.extend(actions.iter().copied().take(MAX_ACTIONS_PER_COMMAND));
    CommandMessage {
        msg_type: CommandType::Command,
        seq,
        ts: current_timestamp_ms(),
        actions: ActionList(list),
    }
}

pub fn create_welcome(seq: u64, client_id: u64, role: Role) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        client_id,
        role,
    }
}

pub fn create_ack(seq: u64, changed: bool) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
        changed,
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

/// Milliseconds since the Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
