// UDP game client
//
// `Pilot` turns decoded server states into move commands; `run` owns the
// socket and feeds it. Planning runs inline on the receive path since one
// update is bounded by the search iteration cap.
//
// The socket is connected to the server, so an ICMP port-unreachable shows up
// as `ConnectionRefused` on the next send or recv. That means the server is
// down or restarting: the join command is re-sent after `rejoin_interval_ms`.

use log::{debug, info, warn};
use rand::Rng;
use std::io;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::config::Config;
use crate::debug_logger::{DebugLogger, PlanLogEntry};
use crate::error::ClientError;
use crate::planner::Planner;
use crate::protocol::{parse_state, Command, ServerState};

/// Per-tick decision glue between the wire state and the planner
pub struct Pilot {
    planner: Planner,
    logger: DebugLogger,
    tick: u64,
    game_over: bool,
    auto_restart: bool,
}

impl Pilot {
    pub fn new(planner: Planner, logger: DebugLogger) -> Self {
        Pilot {
            planner,
            logger,
            tick: 0,
            game_over: false,
            auto_restart: false,
        }
    }

    /// Request a new game once when ours ends
    pub fn with_auto_restart(mut self, auto_restart: bool) -> Self {
        self.auto_restart = auto_restart;
        self
    }

    /// Number of states seen so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Commands to send in response to `state`, in order.
    ///
    /// Nothing is sent while dead, apart from a single restart request when
    /// auto-restart is on, or when the head already sits on the apple.
    /// The primary move is only sent when it changes the heading; an emergency
    /// move is always sent after it.
    pub fn on_state(&mut self, state: &ServerState) -> Vec<Command> {
        self.tick += 1;

        let Some(me) = state.my_player() else {
            return Vec::new();
        };
        if !me.alive {
            if self.game_over {
                return Vec::new();
            }
            info!("Tick {}: GAME OVER (score: {})", self.tick, me.score);
            self.game_over = true;
            return if self.auto_restart {
                vec![Command::Restart]
            } else {
                Vec::new()
            };
        }
        if self.game_over {
            info!("Tick {}: back in the game", self.tick);
            self.game_over = false;
        }

        let Some(head) = me.head() else {
            return Vec::new();
        };
        if head == state.apple {
            return Vec::new();
        }

        let obstacles = state.obstacles_for_me();
        let outcome = match self.planner.update(head, me.heading, state.apple, &obstacles) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Tick {}: planning failed: {}", self.tick, e);
                return Vec::new();
            }
        };

        debug!(
            "Tick {}: head {} -> {} primary {:?} emergency {:?} ({} iterations)",
            self.tick,
            head,
            outcome.grid.target_position(),
            outcome.primary,
            outcome.emergency,
            outcome.iterations
        );

        let mut commands = Vec::new();
        if let Some(dir) = outcome.primary {
            if Some(dir) != me.heading {
                commands.push(Command::Move(dir));
            }
        }
        if let Some(dir) = outcome.emergency {
            commands.push(Command::Move(dir));
        }

        self.logger.log_decision(PlanLogEntry {
            tick: self.tick,
            head,
            heading: me.heading,
            target: state.apple,
            obstacles,
            primary_move: outcome.primary,
            emergency_move: outcome.emergency,
            timestamp: String::new(),
        });

        commands
    }
}

fn decode(datagram: &[u8]) -> Result<ServerState, ClientError> {
    let payload = String::from_utf8_lossy(datagram);
    Ok(parse_state(&payload)?)
}

/// ICMP port-unreachable on a connected socket; Windows reports it as a reset
fn is_refused(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset
    )
}

/// Sends one command. Ok(false) when the server refused an earlier datagram.
async fn send(socket: &UdpSocket, command: Command) -> Result<bool, ClientError> {
    match socket.send(command.encode().as_bytes()).await {
        Ok(_) => Ok(true),
        Err(e) if is_refused(&e) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Joins the server and plays until Ctrl-C
pub async fn run(config: Config) -> Result<(), ClientError> {
    config.validate().map_err(ClientError::Config)?;
    let settings = &config.client;
    let rejoin_interval = Duration::from_millis(settings.rejoin_interval_ms);

    let source_port = settings
        .source_port_base
        .saturating_add(rand::rng().random_range(0..settings.source_port_span));
    let socket = UdpSocket::bind((settings.bind_host.as_str(), source_port)).await?;
    info!("Bound to {}", socket.local_addr()?);

    socket.connect(settings.server_addr()).await?;
    let mut rejoin_at: Option<Instant> = None;
    let mut server_down = false;
    if send(&socket, Command::Start).await? {
        info!("Joined server at {}", settings.server_addr());
    } else {
        rejoin_at = Some(Instant::now() + rejoin_interval);
    }

    let logger = DebugLogger::new(config.debug.enabled, &config.debug.log_file_path).await;
    let mut pilot =
        Pilot::new(Planner::new(&config), logger).with_auto_restart(settings.auto_restart);
    let mut buf = vec![0u8; settings.recv_buffer_size];

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let deadline = rejoin_at.unwrap_or_else(Instant::now);
        tokio::select! {
            received = socket.recv(&mut buf) => {
                let len = match received {
                    Ok(len) => len,
                    Err(e) if is_refused(&e) => {
                        if !server_down {
                            warn!(
                                "Server at {} refused, re-joining every {}ms",
                                settings.server_addr(),
                                settings.rejoin_interval_ms
                            );
                            server_down = true;
                        }
                        if rejoin_at.is_none() {
                            rejoin_at = Some(Instant::now() + rejoin_interval);
                        }
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                if server_down {
                    info!("Server at {} is back", settings.server_addr());
                    server_down = false;
                }
                let state = match decode(&buf[..len]) {
                    Ok(state) => state,
                    Err(e) => {
                        warn!("Dropping datagram: {}", e);
                        continue;
                    }
                };
                for command in pilot.on_state(&state) {
                    if !send(&socket, command).await? {
                        rejoin_at = Some(Instant::now() + rejoin_interval);
                        break;
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline), if rejoin_at.is_some() => {
                if send(&socket, Command::Start).await? {
                    debug!("Join re-sent to {}", settings.server_addr());
                    rejoin_at = None;
                } else {
                    rejoin_at = Some(Instant::now() + rejoin_interval);
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down after {} ticks", pilot.tick());
                send(&socket, Command::Quit).await?;
                break;
            }
        }
    }

    Ok(())
}
