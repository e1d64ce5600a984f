//! TCP server for the AI adapter
//!
//! Accepts connections, runs the per-client handshake and controller rules,
//! and forwards commands to the game loop through a bounded channel. Replies
//! produced by the game loop come back through [`OutboundMessage`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, watch, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Capacity of the command queue; a full queue answers `backpressure`.
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7788,
            max_pending_commands: 16,
        }
    }
}

/// Connection summary published for the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterStatus {
    pub client_count: u16,
    pub controller_id: Option<u64>,
    pub streaming_count: u16,
}

/// Handle to a connected client
struct ClientHandle {
    id: u64,
    handshaken: bool,
    stream_observations: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Default)]
struct Registry {
    clients: Vec<ClientHandle>,
    controller: Option<u64>,
}

impl Registry {
    fn get(&self, id: u64) -> Option<&ClientHandle> {
        self.clients.iter().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut ClientHandle> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    fn status(&self) -> AdapterStatus {
        let handshaken = self.clients.iter().filter(|c| c.handshaken);
        let streaming = handshaken.clone().filter(|c| c.stream_observations).count();
        AdapterStatus {
            client_count: handshaken.count().min(u16::MAX as usize) as u16,
            controller_id: self.controller,
            streaming_count: streaming.min(u16::MAX as usize) as u16,
        }
    }
}

/// Shared server state
struct ServerState {
    registry: RwLock<Registry>,
    status_tx: watch::Sender<AdapterStatus>,
}

impl ServerState {
    async fn publish_status(&self) {
        let status = self.registry.read().await.status();
        self.status_tx.send_replace(status);
    }

    async fn send_to(&self, client_id: u64, msg: ClientOutbound) {
        let registry = self.registry.read().await;
        if let Some(c) = registry.get(client_id) {
            let _ = c.tx.send(msg);
        }
    }

    /// Common gate for every message after the first hello: the client must
    /// be handshaken and `seq` must be strictly increasing.
    async fn admit(&self, client_id: u64, seq: u64) -> Result<(), (ErrorCode, &'static str)> {
        let mut registry = self.registry.write().await;
        let Some(client) = registry.get_mut(client_id) else {
            return Err((ErrorCode::HandshakeRequired, "unknown client"));
        };
        if !client.handshaken {
            return Err((ErrorCode::HandshakeRequired, "send hello first"));
        }
        check_seq(client, seq)
    }
}

fn check_seq(client: &mut ClientHandle, seq: u64) -> Result<(), (ErrorCode, &'static str)> {
    match client.last_seq {
        Some(prev) if seq <= prev => {
            Err((ErrorCode::InvalidCommand, "seq must be strictly increasing"))
        }
        _ => {
            client.last_seq = Some(seq);
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(Box<ObservationMessage>),
}

/// Bind the listening socket.
pub async fn bind(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(addr = %listener.local_addr()?, "adapter listening");
    Ok(listener)
}

/// Bind and serve until the outbound channel closes or accept fails.
///
/// `ready_tx` receives the bound address, which is how callers learn the port
/// when `config.port` is 0.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = bind(&config).await?;
    if let Some(tx) = ready_tx {
        let _ = tx.send(listener.local_addr()?);
    }
    let (status_tx, _) = watch::channel(AdapterStatus::default());
    serve(listener, command_tx, out_rx, status_tx).await
}

/// Serve connections on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    status_tx: watch::Sender<AdapterStatus>,
) -> anyhow::Result<()> {
    let state = Arc::new(ServerState {
        registry: RwLock::new(Registry::default()),
        status_tx,
    });

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::Ack { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::Error { client_id, err } => {
                        state.send_to(client_id, ClientOutbound::Error(err)).await;
                    }
                    OutboundMessage::Observation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let registry = state.registry.read().await;
                        for c in registry
                            .clients
                            .iter()
                            .filter(|c| c.handshaken && c.stream_observations)
                        {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                }
            }
            debug!("outbound channel closed");
        });
    }

    let mut client_id_counter = 0u64;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, &state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            disconnect(&state, client_id).await;
            info!(client_id, "client disconnected");
        });
    }
}

/// Remove a client; if it held control, promote the lowest remaining id.
async fn disconnect(state: &ServerState, client_id: u64) {
    {
        let mut registry = state.registry.write().await;
        registry.clients.retain(|c| c.id != client_id);
        if registry.controller == Some(client_id) {
            registry.controller = registry.clients.iter().map(|c| c.id).min();
            match registry.controller {
                Some(next) => info!(client_id = next, "controller promoted"),
                None => info!(client_id, "controller released"),
            }
        }
    }
    state.publish_status().await;
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: u64,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();
    state.registry.write().await.clients.push(ClientHandle {
        id: client_id,
        handshaken: false,
        stream_observations: false,
        last_seq: None,
        tx: tx.clone(),
    });

    // Exits once every sender is gone, which disconnect() guarantees, so
    // replies queued just before a close are still written.
    tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            let encoded = match &msg {
                ClientOutbound::Welcome(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Ack(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Error(m) => serde_json::to_writer(&mut buf, m),
                ClientOutbound::Observation(m) => serde_json::to_writer(&mut buf, m.as_ref()),
            };
            if encoded.is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() || writer.flush().await.is_err() {
                break;
            }
        }
    });

    let reply_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, line = trimmed, "inbound");

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if hello.protocol_major() != "1" {
                    reply_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("protocol version {} not supported", hello.protocol_version),
                    );
                    break;
                }

                let role = {
                    let mut registry = state.registry.write().await;
                    let Some(client) = registry.get_mut(client_id) else {
                        break;
                    };
                    if client.handshaken {
                        if let Err((code, message)) = check_seq(client, hello.seq) {
                            drop(registry);
                            reply_error(hello.seq, code, message);
                            continue;
                        }
                    } else {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                    }
                    client.stream_observations = hello.requested.stream_observations;

                    if registry.controller.is_none() {
                        registry.controller = Some(client_id);
                        info!(client_id, "client is now controller");
                    }
                    if registry.controller == Some(client_id) {
                        Role::Controller
                    } else {
                        Role::Observer
                    }
                };
                info!(client_id, name = %hello.client.name, ?role, "handshake complete");
                let _ = tx.send(ClientOutbound::Welcome(create_welcome(
                    hello.seq, client_id, role,
                )));
                state.publish_status().await;

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }
            Ok(ParsedMessage::Command(cmd)) => {
                if let Err((code, message)) = state.admit(client_id, cmd.seq).await {
                    reply_error(cmd.seq, code, message);
                    continue;
                }
                if state.registry.read().await.controller != Some(client_id) {
                    reply_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "only the controller may send commands",
                    );
                    continue;
                }
                if cmd.actions.as_slice().is_empty() {
                    reply_error(cmd.seq, ErrorCode::InvalidCommand, "actions must not be empty");
                    continue;
                }
                // The game loop acks once the actions are applied.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Actions(cmd.actions),
                    })
                    .is_err()
                {
                    reply_error(cmd.seq, ErrorCode::Backpressure, "command queue is full");
                }
            }
            Ok(ParsedMessage::Control(ctrl)) => {
                if let Err((code, message)) = state.admit(client_id, ctrl.seq).await {
                    reply_error(ctrl.seq, code, message);
                    continue;
                }
                let result = {
                    let mut registry = state.registry.write().await;
                    match (ctrl.action, registry.controller) {
                        (ControlAction::Claim, None) => {
                            registry.controller = Some(client_id);
                            Ok(true)
                        }
                        (ControlAction::Claim, Some(id)) if id == client_id => Ok(false),
                        (ControlAction::Claim, Some(_)) => {
                            Err((ErrorCode::ControllerActive, "controller already assigned"))
                        }
                        (ControlAction::Release, Some(id)) if id == client_id => {
                            registry.controller = None;
                            Ok(true)
                        }
                        (ControlAction::Release, _) => {
                            Err((ErrorCode::NotController, "only the controller may release"))
                        }
                    }
                };
                match result {
                    Ok(changed) => {
                        info!(client_id, action = ?ctrl.action, changed, "control");
                        let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq, changed)));
                        state.publish_status().await;
                    }
                    Err((code, message)) => reply_error(ctrl.seq, code, message),
                }
            }
            Ok(ParsedMessage::Unknown { seq }) => {
                let handshaken = state
                    .registry
                    .read()
                    .await
                    .get(client_id)
                    .is_some_and(|c| c.handshaken);
                if handshaken {
                    if let Err((code, message)) = state.admit(client_id, seq).await {
                        reply_error(seq, code, message);
                        continue;
                    }
                }
                reply_error(seq, ErrorCode::InvalidCommand, "unknown message type");
            }
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                reply_error(seq, ErrorCode::InvalidCommand, &format!("parse error: {e}"));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(id: u64, handshaken: bool, stream: bool) -> ClientHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        ClientHandle {
            id,
            handshaken,
            stream_observations: stream,
            last_seq: None,
            tx,
        }
    }

    #[test]
    fn test_seq_must_increase() {
        let mut c = handle(1, true, false);
        assert!(check_seq(&mut c, 1).is_ok());
        assert!(check_seq(&mut c, 2).is_ok());
        assert_eq!(check_seq(&mut c, 2).unwrap_err().0, ErrorCode::InvalidCommand);
        assert!(check_seq(&mut c, 1).is_err());
        assert!(check_seq(&mut c, 10).is_ok());
    }

    #[test]
    fn test_status_counts_handshaken_clients() {
        let registry = Registry {
            clients: vec![handle(1, true, true), handle(2, true, false), handle(3, false, true)],
            controller: Some(1),
        };
        assert_eq!(
            registry.status(),
            AdapterStatus {
                client_count: 2,
                controller_id: Some(1),
                streaming_count: 1,
            }
        );
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7788);
        assert_eq!(config.max_pending_commands, 16);
    }
}
