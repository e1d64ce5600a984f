//! Adapter crate - external agent control over TCP
//!
//! Lets AI agents observe and play a session through a line-delimited JSON
//! protocol. The game loop stays synchronous; the server runs on its own
//! tokio runtime and exchanges messages with the loop through channels.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: client connects to the TCP socket (default `127.0.0.1:7788`)
//! 2. **Handshake**: client sends `hello`, server answers `welcome` with its role
//! 3. **Controller**: the first client to complete a hello controls the game;
//!    when it disconnects the lowest remaining client id takes over
//! 4. **Observations**: clients that asked for them receive a snapshot after
//!    every change
//! 5. **Commands**: the controller sends batches of up to 32 actions
//!
//! ## Client → Server
//!
//! - **hello**: `{seq, ts, client{name,version}, protocol_version, requested{stream_observations}}`
//! - **command**: `{seq, ts, actions:["up"|"down"|"left"|"right"|"restart", ...]}`
//! - **control**: `{seq, ts, action:"claim"|"release"}`
//!
//! ## Server → Client
//!
//! - **welcome**: `{seq, ts, protocol_version, client_id, role}`
//! - **ack**: `{seq, ts, status:"ok", changed}`
//! - **error**: `{seq, ts, code, message}`
//! - **observation**: board, score, phase, legal moves, last event and a
//!   stable `state_hash`
//!
//! `seq` must strictly increase per client and the protocol major version
//! must be `1`. A full command queue answers `backpressure` instead of
//! blocking the connection.
//!
//! # Example Protocol Flow
//!
//! ```text
//! C: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! S: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0.0","client_id":1,"role":"controller"}
//! S: {"type":"observation","seq":1,"phase":"playing","board":{"size":4,"cells":[[0,2,0,0],...]},...}
//! C: {"type":"command","seq":2,"ts":0,"actions":["left","up"]}
//! S: {"type":"ack","seq":2,"ts":1700000000016,"status":"ok","changed":true}
//! ```
//!
//! Manual testing works with netcat: `nc 127.0.0.1 7788`.

pub mod observe;
pub mod protocol;
pub mod runtime;
pub mod server;

pub use nexus_2048_core as core;
pub use nexus_2048_engine as engine;
pub use nexus_2048_types as types;

pub use observe::{build_observation, Fnv1aHasher};
pub use protocol::*;
pub use runtime::{apply_command, Adapter, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{bind, run_server, serve, AdapterStatus, ServerConfig};
