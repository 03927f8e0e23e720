//! CLI client for the `vigild` daemon.
//!
//! Examples:
//!   vigil-cli status
//!   vigil-cli start
//!   vigil-cli stop
//!   vigil-cli reset
//!   vigil-cli trialms 500
//!   vigil-cli sensitivity 0.5
//!   vigil-cli save
//!
//! By default it talks to 127.0.0.1:9924; override with `--addr host:port`.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

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

fn usage() -> ! {
    eprintln!("vigil-cli (talks to vigild @ 127.0.0.1:9924 by default)");
    eprintln!("Usage: vigil-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  status                      Show daemon state");
    eprintln!("  start | stop                Control the trial loop");
    eprintln!("  reset                       Restart the practice session");
    eprintln!("  trialms <10-60000>          Set trial period in milliseconds");
    eprintln!("  sensitivity <x>             Set simulated observer sensitivity");
    eprintln!("  farate <0-1>                Set simulated observer false alarm rate");
    eprintln!("  save | load                 Session snapshot controls");
    eprintln!("  shutdown                    Save and exit daemon");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = "127.0.0.1:9924".to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request) -> Result<Response, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_state(s: StateSnapshot) {
    println!(
        "running={} frame={} trial_period={}ms practicing={} phase={} block={} trial={}",
        s.running, s.frame, s.trial_period_ms, s.practicing, s.phase, s.block_num, s.trial_num,
    );
    println!(
        "session: offset_mod={:.2} last_performance={} trials={} correct={} incorrect={} acc={:.1}% recent={:.1}% hits={:.1}% fa={:.1}%",
        s.offset_mod,
        s.last_performance.as_deref().unwrap_or("-"),
        s.stats.trials,
        s.stats.correct,
        s.stats.incorrect,
        s.stats.accuracy * 100.0,
        s.stats.recent_rate * 100.0,
        s.stats.hit_rate * 100.0,
        s.stats.false_alarm_rate * 100.0,
    );
    match s.last_assessment {
        Some(a) => println!(
            "assessment: trial {} correct_count={} -> {} adjust {:+.1} stable={}",
            a.at_trial, a.correct_count, a.performance, a.adjustment, a.stable,
        ),
        None => println!("assessment: none yet"),
    }
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let make_error = |msg: &str| -> ! {
        eprintln!("{}", msg);
        process::exit(1);
    };

    let req = match cmd.as_str() {
        "status" => Request::GetState,
        "start" => Request::Start,
        "stop" => Request::Stop,
        "reset" => Request::ResetSession,
        "trialms" => {
            if args.len() < 2 {
                usage();
            }
            let ms: u32 = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("trialms needs an integer value"));
            if !(10..=60_000).contains(&ms) {
                make_error("trialms must be between 10 and 60000");
            }
            Request::SetTrialPeriodMs { ms }
        }
        "sensitivity" => {
            if args.len() < 2 {
                usage();
            }
            let sensitivity: f32 = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("sensitivity needs a number"));
            Request::SetObserverSensitivity { sensitivity }
        }
        "farate" => {
            if args.len() < 2 {
                usage();
            }
            let rate: f32 = args[1]
                .parse()
                .unwrap_or_else(|_| make_error("farate needs a number"));
            if !(0.0..=1.0).contains(&rate) {
                make_error("farate must be between 0 and 1");
            }
            Request::SetObserverFalseAlarmRate { rate }
        }
        "save" => Request::SaveSession,
        "load" => Request::LoadSession,
        "shutdown" => Request::Shutdown,
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(Response::State(s)) => print_state(s),
        Ok(Response::Success { message }) => println!("{message}"),
        Ok(Response::Error { message }) => {
            eprintln!("daemon error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
