//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server: the server
//! queues [`InboundCommand`]s, the game loop drains them with
//! [`Adapter::try_recv`], applies them through an [`AgentHost`], and hands
//! the replies back with [`Adapter::send`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::core::{ColorSource, GameSession, SettleTrace};
use crate::engine::best_move;
use crate::protocol::{
    create_ack, create_error, AckMessage, ErrorCode, ErrorMessage, HintPayload, LastEvent,
    ObservationMessage, SwapCommand,
};
use crate::server::{build_observation, run_server, ServerConfig, ServerState};
use crate::types::{GameAction, LevelConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundPayload {
    /// Apply an action on behalf of the controller.
    Command(GameAction),
    /// A client just subscribed and wants the current state.
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    /// Sent to every client that asked for streamed observations.
    BroadcastObservation { obs: ObservationMessage },
}

/// Connection counters shared between the server tasks and the game loop.
#[derive(Debug, Default)]
pub struct AdapterStats {
    clients: AtomicUsize,
    /// Controller client id, 0 when none (ids start at 1)
    controller: AtomicUsize,
}

impl AdapterStats {
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<usize> {
        match self.controller.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub(crate) fn set_clients(&self, n: usize) {
        self.clients.store(n, Ordering::Relaxed);
    }

    pub(crate) fn set_controller(&self, id: Option<usize>) {
        self.controller.store(id.unwrap_or(0), Ordering::Relaxed);
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    addr: SocketAddr,
    stats: Arc<AdapterStats>,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// `Ok(None)` if `MATCH3_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerState::is_disabled() {
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Bind and serve on a private runtime; returns once the listener is up.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();
        let stats = Arc::new(AdapterStats::default());
        let endpoint = format!("{}:{}", config.host, config.port);

        let rt = Runtime::new()?;
        let server_stats = Arc::clone(&stats);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx), Some(server_stats)).await {
                tracing::error!(error = %e, "adapter server stopped");
            }
        });

        let addr = rt
            .block_on(ready_rx)
            .map_err(|_| anyhow!("adapter could not listen on {endpoint}"))?;

        Ok(Self {
            _rt: rt,
            addr,
            stats,
            cmd_rx,
            out_tx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn stats(&self) -> &AdapterStats {
        &self.stats
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}

/// Replies produced by one inbound command.
#[derive(Debug, Default)]
pub struct Handled {
    pub replies: ArrayVec<OutboundMessage, 2>,
    /// Settle trace when the command was an accepted swap
    pub trace: Option<SettleTrace>,
}

/// Game-loop side of the adapter: applies agent commands to a session and
/// builds the observations that follow.
#[derive(Debug, Clone, Default)]
pub struct AgentHost {
    obs_seq: u64,
    last_event: Option<LastEvent>,
}

impl AgentHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_event(&self) -> Option<&LastEvent> {
        self.last_event.as_ref()
    }

    /// Remember a cycle that did not come through the adapter (human play).
    pub fn record(&mut self, trace: &SettleTrace) {
        self.last_event = Some(LastEvent::from(trace));
    }

    /// Forget the last event (new episode).
    pub fn reset(&mut self) {
        self.last_event = None;
    }

    pub fn observation<C: ColorSource>(&mut self, session: &GameSession<C>) -> ObservationMessage {
        self.obs_seq = self.obs_seq.wrapping_add(1);
        build_observation(self.obs_seq, &session.snapshot(), self.last_event)
    }

    pub fn broadcast<C: ColorSource>(&mut self, session: &GameSession<C>) -> OutboundMessage {
        OutboundMessage::BroadcastObservation {
            obs: self.observation(session),
        }
    }

    /// Apply `inbound` to `session` in place.
    ///
    /// Accepted commands are acked and followed by a broadcast observation;
    /// refused ones get an error carrying the engine's code.
    pub fn handle<C: ColorSource>(
        &mut self,
        session: &mut GameSession<C>,
        levels: &[LevelConfig],
        inbound: &InboundCommand,
    ) -> Handled {
        let mut out = Handled::default();
        let client_id = inbound.client_id;
        let seq = inbound.seq;

        let action = match inbound.payload {
            InboundPayload::SnapshotRequest => {
                let obs = self.observation(session);
                out.replies
                    .push(OutboundMessage::ToClientObservation { client_id, obs });
                return out;
            }
            InboundPayload::Command(action) => action,
        };

        let applied = match action {
            GameAction::Swap(swap) => session.apply_swap(swap).map(|outcome| {
                self.last_event = Some(LastEvent::from(&outcome.trace));
                out.trace = Some(outcome.trace);
                Some(outcome.session)
            }),
            GameAction::NextLevel => session.advance_level(levels).map(Some),
            GameAction::Restart => session.restart(levels).map(|next| {
                self.last_event = None;
                Some(next)
            }),
            GameAction::Hint => Ok(None),
        };

        match applied {
            Ok(next) => {
                let mut ack = create_ack(seq);
                if action == GameAction::Hint {
                    ack.hint = best_move(session.board()).map(|m| HintPayload {
                        swap: SwapCommand::from_swap(m.swap),
                        matched: m.matched as u32,
                    });
                }
                out.replies
                    .push(OutboundMessage::ToClientAck { client_id, ack });
                if let Some(next) = next {
                    *session = next;
                    out.replies.push(self.broadcast(session));
                }
                tracing::debug!(client_id, seq, action = action.as_str(), "agent command applied");
            }
            Err(e) => {
                tracing::debug!(client_id, seq, error = %e, "agent command refused");
                let err = create_error(seq, ErrorCode::from_engine(e.code()), &e.to_string());
                out.replies
                    .push(OutboundMessage::ToClientError { client_id, err });
            }
        }
        out
    }
}
