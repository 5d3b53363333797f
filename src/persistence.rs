//! File-based persistence via JSON Lines event sourcing.
//!
//! Events are stored as one JSON object per line (`.jsonl` format).
//! This is simple, streamable, and human-readable.
//!
//! # Usage
//!
//! ```ignore
//! use tradesim::persistence;
//! use std::path::Path;
//!
//! persistence::save_events(journal.events(), Path::new("session.jsonl"))?;
//! let replayed = persistence::load_events(Path::new("session.jsonl"))?;
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::event::JournalEvent;

/// Save events to a file in JSON Lines format.
///
/// Each event is serialized as one JSON object per line.
pub fn save_events(events: &[JournalEvent], path: &Path) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);

    for event in events {
        let json = serde_json::to_string(event).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(writer, "{}", json)?;
    }

    writer.flush()?;
    Ok(())
}

/// Load events from a JSON Lines file.
///
/// Each line is parsed as one JSON event object.
/// Empty lines are skipped.
pub fn load_events(path: &Path) -> io::Result<Vec<JournalEvent>> {
    let file = std::fs::File::open(path)?;
    let reader = io::BufReader::new(file);
    let mut events = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: JournalEvent = serde_json::from_str(line).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: {}", line_num + 1, e),
            )
        })?;
        events.push(event);
    }

    Ok(events)
}
