//! Session snapshot persistence.
//!
//! Snapshots are plain JSON so they stay inspectable and hand-editable
//! during piloting. Callers decide where the file lives.

use std::fs;
use std::io;
use std::path::Path;

use crate::session::{PracticeSession, SessionSnapshot};

pub const SNAPSHOT_EXTENSION: &str = "json";

pub fn save_session(path: &Path, session: &PracticeSession) -> io::Result<()> {
    let snapshot = session.snapshot();
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)
}

pub fn load_session(path: &Path) -> io::Result<PracticeSession> {
    let json = fs::read_to_string(path)?;
    let snapshot: SessionSnapshot = serde_json::from_str(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(PracticeSession::from_snapshot(snapshot))
}
