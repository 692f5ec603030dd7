//! Adapter module - agent control via TCP socket with JSON protocol
//!
//! Lets external agents (bots, solvers, test harnesses) play the game
//! through a TCP socket while the terminal game keeps running.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller;
//!    when it disconnects the oldest remaining client is promoted
//! 4. **Observation Streaming**: Clients that asked for it receive an
//!    observation after every state change
//! 5. **Commanding**: Controller sends swaps or actions
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info, `protocol_version` (`1.x`) and
//!   `requested.stream_observations`
//! - **command**: `swap: {from: [r, c], to: [r, c]}` or
//!   `action: "next_level" | "restart" | "hint"`
//!
//! ## Server → Client
//!
//! - **welcome**: Assigned role, controller id, capabilities
//! - **ack**: Command applied (`hint` acks carry the suggested swap)
//! - **error**: `code` + `message`; codes are `handshake_required`,
//!   `protocol_mismatch`, `not_controller`, `invalid_command`,
//!   `invalid_swap`, `not_playable`, `backpressure`, `internal`
//! - **observation**: Board cells, score, moves, level, target, status,
//!   `state_hash` and a summary of the last settle cycle
//!
//! `seq` must strictly increase per client. Commands are queued for the game
//! loop in a bounded queue; a full queue is answered with `backpressure`.
//!
//! # Environment Variables
//!
//! - `MATCH3_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `MATCH3_AI_PORT`: Port number (default: 7878)
//! - `MATCH3_AI_MAX_PENDING`: Command queue capacity (default: 10)
//! - `MATCH3_AI_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":0,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":...,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":...,"status":"playing","board":{...},"score":0,...}
//! Client -> Server: {"type":"command","seq":2,"ts":0,"swap":{"from":[3,3],"to":[3,4]}}
//! Server -> Client: {"type":"ack","seq":2,"ts":...,"status":"ok"}
//! Server -> Client: {"type":"observation","seq":2,...,"last_event":{"outcome":"settled",...}}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tui_match3_core as core;
pub use tui_match3_engine as engine;
pub use tui_match3_types as types;

pub use protocol::*;
pub use runtime::{
    Adapter, AdapterStats, AgentHost, Handled, InboundCommand, InboundPayload, OutboundMessage,
};
pub use server::{build_observation, run_server, ServerConfig, ServerState};
