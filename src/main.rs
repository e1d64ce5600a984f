//! Terminal 2048 runner (default binary).
//!
//! Reads keys and mouse drags with crossterm, applies at most one queued move
//! per tick, serves the optional AI adapter and renders through the
//! framebuffer diff renderer.

use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use tracing::{info, warn};

use nexus_2048::adapter::{
    apply_command, build_observation, Adapter, InboundPayload, OutboundMessage,
};
use nexus_2048::config::AppConfig;
use nexus_2048::core::{GameSnapshot, GameState, SessionObserver};
use nexus_2048::engine::best_move;
use nexus_2048::input::{
    handle_key_event, is_hint_key, is_press, should_quit, MoveQueue, SwipeTracker,
};
use nexus_2048::logging;
use nexus_2048::records::RecordKeeper;
use nexus_2048::term::{
    AdapterStatusView, FrameBuffer, GameView, HudInfo, TerminalRenderer, Viewport,
};
use nexus_2048::types::{CoreEvent, Direction, GameAction, TICK_MS};

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_filter, config.log_path.as_deref())?;
    info!(
        level = config.game.level,
        side = config.game.size.side(),
        seed = config.game.seed,
        "starting"
    );

    let mut adapter = match config.adapter.clone() {
        Some(server) => match Adapter::start(server) {
            Ok(a) => {
                info!(addr = %a.local_addr(), "adapter enabled");
                Some(a)
            }
            Err(e) => {
                warn!(error = %e, "adapter failed to start, continuing without it");
                None
            }
        },
        None => {
            info!("adapter disabled");
            None
        }
    };
    let mut records = RecordKeeper::open(config.records_path.clone());

    let mut term = TerminalRenderer::new();
    term.enter(true)?;

    let result = run(&mut term, &config, adapter.as_mut(), &mut records);

    // Always try to restore terminal state.
    let _ = term.exit();
    if let Err(e) = records.flush() {
        warn!(error = %e, "failed to save records");
    }
    info!("shutdown");
    result
}

/// Collects what the frame loop needs from committed events.
struct FrameEvents<'a> {
    records: &'a mut RecordKeeper,
    last_event: &'a mut Option<CoreEvent>,
    spawned: bool,
}

impl SessionObserver for FrameEvents<'_> {
    fn on_event(&mut self, event: &CoreEvent) {
        match event {
            CoreEvent::Spawned { .. } => self.spawned = true,
            _ => *self.last_event = Some(*event),
        }
        self.records.on_event(event);
    }
}

fn run(
    term: &mut TerminalRenderer,
    config: &AppConfig,
    mut adapter: Option<&mut Adapter>,
    records: &mut RecordKeeper,
) -> Result<()> {
    let mut game_state = GameState::new(config.game);
    game_state.start();

    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut snap = GameSnapshot::default();
    let mut queue = MoveQueue::new();
    let mut swipe = SwipeTracker::default();

    let mut hint: Option<Direction> = None;
    let mut last_event: Option<CoreEvent> = None;
    let mut spawned_at: Option<Instant> = None;
    let mut observation_seq = 0u64;

    let mut last_tick = Instant::now();
    let tick_duration = Duration::from_millis(TICK_MS as u64);
    // The opening spawns still need to reach observers.
    let mut pending_start = true;

    loop {
        let mut changed = std::mem::take(&mut pending_start);

        // Input until the next tick.
        let mut timeout = tick_duration.saturating_sub(last_tick.elapsed());
        while event::poll(timeout)? {
            timeout = Duration::ZERO;
            match event::read()? {
                // Terminal auto-repeat is ignored; each press queues one move.
                Event::Key(key) if is_press(key) => {
                    if should_quit(key) {
                        records.observe(game_state.score(), game_state.highest_tile());
                        return Ok(());
                    }
                    if is_hint_key(key) {
                        hint = best_move(game_state.board());
                        continue;
                    }
                    match handle_key_event(key) {
                        Some(GameAction::Move(dir)) => {
                            queue.push(dir);
                        }
                        Some(GameAction::Restart) => {
                            queue.clear();
                            changed |= game_state.apply_action(GameAction::Restart);
                        }
                        None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(dir) = swipe.handle_mouse_event(mouse) {
                        queue.push(dir);
                    }
                }
                Event::Resize(..) => term.invalidate(),
                _ => {}
            }
        }

        // Tick: one queued move, fully resolved.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();
            if let Some(dir) = queue.pop() {
                changed |= game_state.apply_move(dir).changed;
            }
        }

        // Adapter commands are applied here, on the game loop.
        if let Some(adapter) = adapter.as_deref_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::Actions(actions) => {
                        let (reply, did_change) =
                            apply_command(&mut game_state, cmd.client_id, cmd.seq, &actions);
                        adapter.send(reply);
                        changed |= did_change;
                    }
                    InboundPayload::SnapshotRequest => {
                        observation_seq += 1;
                        let obs = build_observation(&game_state, observation_seq, last_event);
                        adapter.send(OutboundMessage::Observation {
                            client_id: cmd.client_id,
                            obs: Box::new(obs),
                        });
                    }
                }
            }
        }

        if changed {
            hint = None;
            let mut frame = FrameEvents {
                records: &mut *records,
                last_event: &mut last_event,
                spawned: false,
            };
            game_state.dispatch_events(&mut frame);
            if frame.spawned {
                spawned_at = Some(Instant::now());
            }

            if let Some(adapter) = adapter.as_deref() {
                observation_seq += 1;
                let obs = build_observation(&game_state, observation_seq, last_event);
                adapter.send(OutboundMessage::BroadcastObservation { obs: Box::new(obs) });
            }
        }

        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        game_state.snapshot_into(&mut snap);
        let hud = HudInfo {
            best_score: records.best_score(),
            hint,
            spawn_age_ms: spawned_at
                .map(|t| t.elapsed().as_millis().min(u32::MAX as u128) as u32),
            adapter: adapter.as_deref().map(|a| {
                let status = a.status();
                AdapterStatusView {
                    client_count: status.client_count,
                    controller_id: status.controller_id,
                    streaming_count: status.streaming_count,
                }
            }),
        };
        view.render_into(&snap, &hud, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;
    }
}
