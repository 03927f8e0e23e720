//! Vigil Daemon - Background vigilance-task practice service
//!
//! Runs a simulated practice session continuously in the background:
//! - Session state and adaptive difficulty
//! - Simulated observer responses
//! - Snapshot persistence
//! - IPC server for CLI/UI clients
//!
//! Storage locations:
//! - Linux: ~/.local/share/vigil/
//! - Windows: %APPDATA%\Vigil\
//! - MacOS: ~/Library/Application Support/Vigil/

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use vigil::observer::{ObserverConfig, SimulatedObserver};
use vigil::practice::PracticePhase;
use vigil::session::{PracticeSession, SessionConfig};
use vigil::storage;

mod paths;

use paths::AppPaths;

const LISTEN_ADDR: &str = "127.0.0.1:9924";

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not determine data directory")]
    NoDataDir,
}

// ─────────────────────────────────────────────────────────────────────────
// IPC protocol: JSON lines over TCP, one request per line.
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Request {
    GetState,
    Start,
    Stop,
    ResetSession,
    SetTrialPeriodMs { ms: u32 },
    SetObserverSensitivity { sensitivity: f32 },
    SetObserverFalseAlarmRate { rate: f32 },
    SaveSession,
    LoadSession,
    Shutdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum Response {
    State(StateSnapshot),
    Success { message: String },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateSnapshot {
    running: bool,
    frame: u64,
    trial_period_ms: u32,
    practicing: bool,
    phase: String,
    block_num: u32,
    trial_num: u32,
    offset_mod: f32,
    last_performance: Option<String>,
    stats: StatsSnapshot,
    last_assessment: Option<AssessmentSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StatsSnapshot {
    trials: u32,
    correct: u32,
    incorrect: u32,
    accuracy: f32,
    recent_rate: f32,
    hit_rate: f32,
    false_alarm_rate: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssessmentSnapshot {
    at_trial: usize,
    correct_count: usize,
    performance: String,
    adjustment: f32,
    stable: bool,
}

fn phase_label(phase: PracticePhase) -> &'static str {
    match phase {
        PracticePhase::Running => "running",
        PracticePhase::Stable => "stable",
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Daemon state
// ─────────────────────────────────────────────────────────────────────────

struct DaemonState {
    session: PracticeSession,
    observer: SimulatedObserver,
    running: bool,
    frame: u64,
    trial_period_ms: u32,
    paths: AppPaths,
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok()?.trim().parse().ok()
}

impl DaemonState {
    fn new(paths: AppPaths) -> Self {
        // VIGILD_SEED / VIGILD_TRIAL_PERIOD_MS override the defaults.
        let seed = env_u64("VIGILD_SEED").unwrap_or(42);
        let trial_period_ms = env_u32("VIGILD_TRIAL_PERIOD_MS")
            .unwrap_or(500)
            .clamp(10, 60_000);

        Self {
            session: PracticeSession::new(SessionConfig::default(), seed),
            observer: SimulatedObserver::new(ObserverConfig::default(), seed ^ 0x5EED),
            running: false,
            frame: 0,
            trial_period_ms,
            paths,
        }
    }

    /// Run one simulated trial. Called from the paced loop while running.
    fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.frame += 1;

        let target = self.session.target_present();
        let offset = self.session.offset_mod();
        let response = self.observer.respond(target, offset);

        match self.session.complete_trial(response.is_some(), response) {
            Ok(record) => {
                if let Some(a) = self.session.last_assessment() {
                    if a.at_trial == record.trial_num as usize {
                        info!(
                            "assessment at trial {}: {} (correct_count={}) offset_mod={:.2}",
                            a.at_trial,
                            a.performance.label(),
                            a.correct_count,
                            self.session.offset_mod(),
                        );
                    }
                }
                if record.practicing && !self.session.is_practicing() {
                    info!(
                        "practice stable after {} trials; continuing at fixed difficulty",
                        self.session.stats().trials
                    );
                }
            }
            Err(e) => {
                // Unreachable with the session driving the cadence; a broken
                // assessment means the run is no longer trustworthy.
                error!("assessment failed: {e}; stopping trial loop");
                self.running = false;
            }
        }
    }

    fn snapshot(&self) -> StateSnapshot {
        let stats = self.session.stats();
        StateSnapshot {
            running: self.running,
            frame: self.frame,
            trial_period_ms: self.trial_period_ms,
            practicing: self.session.is_practicing(),
            phase: phase_label(self.session.phase()).to_string(),
            block_num: self.session.block_num(),
            trial_num: self.session.trial_num(),
            offset_mod: self.session.offset_mod(),
            last_performance: self.session.last_performance().map(|p| p.label().to_string()),
            stats: StatsSnapshot {
                trials: stats.trials,
                correct: stats.correct(),
                incorrect: stats.incorrect(),
                accuracy: stats.accuracy(),
                recent_rate: stats.recent_rate(),
                hit_rate: stats.hit_rate(),
                false_alarm_rate: stats.false_alarm_rate(),
            },
            last_assessment: self.session.last_assessment().map(|a| AssessmentSnapshot {
                at_trial: a.at_trial,
                correct_count: a.correct_count,
                performance: a.performance.label().to_string(),
                adjustment: a.adjustment,
                stable: a.stable,
            }),
        }
    }

    fn save_session(&self) -> Result<(), DaemonError> {
        storage::save_session(&self.paths.session_file(), &self.session)?;
        Ok(())
    }

    fn load_session(&mut self) -> Result<(), DaemonError> {
        self.session = storage::load_session(&self.paths.session_file())?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Request handling
// ─────────────────────────────────────────────────────────────────────────

async fn process_request(req: Request, state: &Arc<RwLock<DaemonState>>) -> Response {
    match req {
        Request::GetState => {
            let s = state.read().await;
            Response::State(s.snapshot())
        }
        Request::Start => {
            let mut s = state.write().await;
            s.running = true;
            Response::Success {
                message: "trial loop started".to_string(),
            }
        }
        Request::Stop => {
            let mut s = state.write().await;
            s.running = false;
            Response::Success {
                message: "trial loop stopped".to_string(),
            }
        }
        Request::ResetSession => {
            let mut s = state.write().await;
            s.session.reset();
            s.frame = 0;
            Response::Success {
                message: "session reset".to_string(),
            }
        }
        Request::SetTrialPeriodMs { ms } => {
            let mut s = state.write().await;
            s.trial_period_ms = ms.clamp(10, 60_000);
            Response::Success {
                message: format!("trial period set to {}ms", s.trial_period_ms),
            }
        }
        Request::SetObserverSensitivity { sensitivity } => {
            let mut s = state.write().await;
            s.observer.set_sensitivity(sensitivity);
            Response::Success {
                message: format!("observer sensitivity set to {}", sensitivity.max(0.0)),
            }
        }
        Request::SetObserverFalseAlarmRate { rate } => {
            let mut s = state.write().await;
            s.observer.set_false_alarm_rate(rate);
            Response::Success {
                message: format!("observer false alarm rate set to {}", rate.clamp(0.0, 1.0)),
            }
        }
        Request::SaveSession => {
            let s = state.read().await;
            match s.save_session() {
                Ok(()) => Response::Success {
                    message: "session saved".to_string(),
                },
                Err(e) => Response::Error {
                    message: format!("save failed: {e}"),
                },
            }
        }
        Request::LoadSession => {
            let mut s = state.write().await;
            match s.load_session() {
                Ok(()) => Response::Success {
                    message: "session loaded".to_string(),
                },
                Err(e) => Response::Error {
                    message: format!("load failed: {e}"),
                },
            }
        }
        Request::Shutdown => {
            let s = state.read().await;
            if let Err(e) = s.save_session() {
                error!("shutdown save failed: {e}");
            } else {
                info!("session saved on shutdown");
            }
            Response::Success {
                message: "shutting down".to_string(),
            }
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    state: Arc<RwLock<DaemonState>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Request>(trimmed) {
            Ok(req) => {
                let shutdown = matches!(req, Request::Shutdown);
                let reply = process_request(req, &state).await;
                if shutdown {
                    let json = serde_json::to_string(&reply)?;
                    write_half.write_all(json.as_bytes()).await?;
                    write_half.write_all(b"\n").await?;
                    write_half.flush().await?;
                    info!("shutdown requested; exiting");
                    std::process::exit(0);
                }
                reply
            }
            Err(e) => Response::Error {
                message: format!("bad request: {e}"),
            },
        };

        let json = serde_json::to_string(&reply)?;
        write_half.write_all(json.as_bytes()).await?;
        write_half.write_all(b"\n").await?;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Setup application paths
    let paths = AppPaths::new()?;
    info!("Persistence initialized (OS data dir; session.json)");

    // Initialize daemon state
    let state = Arc::new(RwLock::new(DaemonState::new(paths)));

    // Save on Ctrl-C so the session persists even if the daemon is stopped
    // abruptly.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let s = state.read().await;
                if let Err(e) = s.save_session() {
                    error!("Ctrl-C save failed: {}", e);
                } else {
                    info!("Ctrl-C: session saved");
                }
                std::process::exit(0);
            }
        });
    }

    // Try to resume an existing session
    {
        let mut s = state.write().await;
        if let Err(e) = s.load_session() {
            warn!("Could not load session: {}", e);
            info!("Starting with fresh session");
        } else {
            info!("Resumed session at trial {}", s.session.trial_num());
        }
    }

    // IPC server
    let listener = TcpListener::bind(LISTEN_ADDR).await?;
    info!("Vigil daemon listening on {LISTEN_ADDR}");

    // Trial loop task
    let state_clone = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            let period_ms = {
                let s = state_clone.read().await;
                s.trial_period_ms
            };
            tokio::time::sleep(tokio::time::Duration::from_millis(period_ms as u64)).await;

            let mut s = state_clone.write().await;
            s.tick();
        }
    });

    // Accept client connections
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let state_clone = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, state_clone).await {
                error!("Client handler error: {}", e);
            }
        });
    }
}
