//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. The server
//! only ever talks to the loop through bounded or unbounded channels; the
//! loop owns the session and applies every command itself.

use std::net::SocketAddr;

use rand::RngCore;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::{mpsc, watch};
use tracing::warn;

use crate::core::GameState;
use crate::engine::apply_actions;
use crate::protocol::{
    create_ack, create_error, ActionList, AckMessage, ErrorMessage, ObservationMessage,
};
use crate::server::{bind, serve, AdapterStatus, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: u64,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Actions(ActionList),
    /// A client asked for observations and should get one right away.
    SnapshotRequest,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Ack { client_id: u64, ack: AckMessage },
    Error { client_id: u64, err: ErrorMessage },
    Observation { client_id: u64, obs: Box<ObservationMessage> },
    BroadcastObservation { obs: Box<ObservationMessage> },
}

/// Apply a controller's actions and build the reply for it.
///
/// Returns the reply and whether the session changed.
pub fn apply_command<R: RngCore>(
    state: &mut GameState<R>,
    client_id: u64,
    seq: u64,
    actions: &ActionList,
) -> (OutboundMessage, bool) {
    match apply_actions(state, actions.as_slice()) {
        Ok(outcome) => (
            OutboundMessage::Ack {
                client_id,
                ack: create_ack(seq, outcome.changed),
            },
            outcome.changed,
        ),
        Err(e) => (
            OutboundMessage::Error {
                client_id,
                err: create_error(seq, e.into(), e.message()),
            },
            false,
        ),
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    status_rx: watch::Receiver<AdapterStatus>,
    local_addr: SocketAddr,
}

impl Adapter {
    /// Bind the listener and start serving on a dedicated runtime.
    ///
    /// Binding happens before this returns, so an address in use is reported
    /// here rather than lost inside a background task.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let rt = Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("nexus-adapter")
            .enable_all()
            .build()?;

        let listener = rt.block_on(bind(&config))?;
        let local_addr = listener.local_addr()?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(config.max_pending_commands.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (status_tx, status_rx) = watch::channel(AdapterStatus::default());

        rt.spawn(async move {
            if let Err(e) = serve(listener, cmd_tx, out_rx, status_tx).await {
                warn!(error = %e, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            status_rx,
            local_addr,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Latest connection summary.
    pub fn status(&self) -> AdapterStatus {
        *self.status_rx.borrow()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
