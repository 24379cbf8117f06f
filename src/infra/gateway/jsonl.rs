//! File-backed gateway using JSON lines.
//!
//! Layout of the data directory:
//! - `spots.json`: the spot layout, written once at facility initialisation;
//! - `sessions.jsonl`: one [`SessionEvent`] per line, append-only.
//!
//! The log is replayed into memory when the gateway is opened; appends are
//! flushed and synced before they are acknowledged. A failed append cuts the
//! log back to its previous length, so a rejected transition never replays.

use std::fs::{self, create_dir_all, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::{
    ParkingSession, ParkingSpot, PersistenceError, PersistenceGateway, SessionEvent, TimeWindow,
};

use super::SessionReplay;

const SPOTS_FILE: &str = "spots.json";
const EVENTS_FILE: &str = "sessions.jsonl";

/// Gateway persisting to a directory of JSON files.
pub struct JsonlGateway {
    dir: PathBuf,
    replay: Mutex<SessionReplay>,
}

impl JsonlGateway {
    /// Open (or create) the data directory at `dir` and replay its log.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        create_dir_all(&dir).map_err(io_error)?;
        let gateway = Self {
            dir,
            replay: Mutex::new(SessionReplay::default()),
        };
        let events = gateway.read_events()?;
        *gateway.replay.lock() = SessionReplay::from_events(&events);
        tracing::debug!(
            dir = %gateway.dir.display(),
            events = events.len(),
            "session log replayed"
        );
        Ok(gateway)
    }

    /// Data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn spots_path(&self) -> PathBuf {
        self.dir.join(SPOTS_FILE)
    }

    fn events_path(&self) -> PathBuf {
        self.dir.join(EVENTS_FILE)
    }

    fn read_events(&self) -> Result<Vec<SessionEvent>, PersistenceError> {
        let path = self.events_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&path).map_err(io_error)?);
        let mut events = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(io_error)?;
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line).map_err(|e| {
                PersistenceError::Encoding(format!("{EVENTS_FILE} line {}: {e}", number + 1))
            })?;
            events.push(event);
        }
        Ok(events)
    }
}

impl PersistenceGateway for JsonlGateway {
    fn load_spots(&self) -> Result<Vec<ParkingSpot>, PersistenceError> {
        let path = self.spots_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(io_error)?;
        serde_json::from_str(&raw).map_err(|e| PersistenceError::Encoding(e.to_string()))
    }

    fn save_spots(&self, spots: &[ParkingSpot]) -> Result<(), PersistenceError> {
        let tmp = self.dir.join(format!("{SPOTS_FILE}.tmp"));
        let file = File::create(&tmp).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, spots)
            .map_err(|e| PersistenceError::Encoding(e.to_string()))?;
        writer.flush().map_err(io_error)?;
        fs::rename(&tmp, self.spots_path()).map_err(io_error)
    }

    fn load_open_sessions(&self) -> Result<Vec<ParkingSession>, PersistenceError> {
        Ok(self.replay.lock().open_sessions())
    }

    fn load_closed_sessions(
        &self,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ParkingSession>, PersistenceError> {
        Ok(self.replay.lock().closed_sessions(window))
    }

    fn append_session_event(&self, event: &SessionEvent) -> Result<(), PersistenceError> {
        let line =
            serde_json::to_string(event).map_err(|e| PersistenceError::Encoding(e.to_string()))?;
        let mut replay = self.replay.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.events_path())
            .map_err(io_error)?;
        append_line(&mut file, &line, File::sync_data).map_err(io_error)?;
        replay.apply(event);
        Ok(())
    }
}

/// Append `line` and sync it; on failure the file is truncated back.
fn append_line(
    file: &mut File,
    line: &str,
    sync: impl FnOnce(&File) -> io::Result<()>,
) -> io::Result<()> {
    let len = file.metadata()?.len();
    let mut record = String::with_capacity(line.len() + 1);
    record.push_str(line);
    record.push('\n');
    let written = file.write_all(record.as_bytes()).and_then(|()| sync(&*file));
    if let Err(err) = written {
        if let Err(truncate_err) = file.set_len(len) {
            tracing::error!(error = %truncate_err, "could not truncate session log after failed append");
        }
        return Err(err);
    }
    Ok(())
}

fn io_error(err: io::Error) -> PersistenceError {
    PersistenceError::Io(err.to_string())
}
