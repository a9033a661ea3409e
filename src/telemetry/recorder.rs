//! JSONL event recorder.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::config::TelemetryConfig;
use crate::engine::events::Event;
use crate::error::Result;

/// Writes engine events as JSON lines.
#[derive(Debug)]
pub struct EventRecorder<W: Write> {
    writer: W,
    include_poll: bool,
    records: u64,
}

impl EventRecorder<BufWriter<File>> {
    /// Opens `path` for appending, creating it and its parent directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P, include_poll: bool) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        info!("Recording events to {}", path.display());
        Ok(Self::new(BufWriter::new(file), include_poll))
    }

    pub fn from_config(config: &TelemetryConfig) -> Result<Self> {
        Self::create(&config.path, config.include_poll)
    }
}

impl<W: Write> EventRecorder<W> {
    #[must_use]
    pub fn new(writer: W, include_poll: bool) -> Self {
        Self {
            writer,
            include_poll,
            records: 0,
        }
    }

    /// Appends `event` as one line. Returns whether a line was written.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails.
    pub fn record(&mut self, event: &Event) -> Result<bool> {
        if matches!(event, Event::Poll { .. }) && !self.include_poll {
            return Ok(false);
        }

        let mut line = serde_json::to_value(event)?;
        if let Value::Object(fields) = &mut line {
            fields.insert(
                "timestamp".to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(true)
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::buttons::LogicalButton;
    use crate::controller::state::ControllerState;
    use std::io::{self, BufRead, BufReader};
    use tempfile::TempDir;

    fn lines(bytes: &[u8]) -> Vec<Value> {
        String::from_utf8(bytes.to_vec())
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_record_writes_one_line_per_event() {
        let mut recorder = EventRecorder::new(Vec::new(), false);
        recorder
            .record(&Event::Press {
                port: 1,
                button: LogicalButton::Z,
            })
            .unwrap();
        recorder
            .record(&Event::Connect {
                port: 1,
                adapter_name: "Nintendo WUP-028",
                raw_id: "057e-0337".to_string(),
            })
            .unwrap();

        assert_eq!(recorder.records(), 2);
        let records = lines(&recorder.into_inner());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["event"], "press");
        assert_eq!(records[0]["button"], "Z");
        assert_eq!(records[1]["event"], "connect");
        assert_eq!(records[1]["adapter_name"], "Nintendo WUP-028");
    }

    #[test]
    fn test_timestamp_is_rfc3339() {
        let mut recorder = EventRecorder::new(Vec::new(), false);
        recorder
            .record(&Event::Release {
                port: 0,
                button: LogicalButton::B,
            })
            .unwrap();

        let records = lines(&recorder.into_inner());
        let timestamp = records[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[test]
    fn test_poll_skipped_by_default() {
        let poll = Event::Poll {
            port: 0,
            state: ControllerState::with_connected(true),
        };

        let mut recorder = EventRecorder::new(Vec::new(), false);
        assert!(!recorder.record(&poll).unwrap());
        assert!(recorder.into_inner().is_empty());

        let mut recorder = EventRecorder::new(Vec::new(), true);
        assert!(recorder.record(&poll).unwrap());
        let records = lines(&recorder.into_inner());
        assert_eq!(records[0]["state"]["connected"], true);
    }

    #[test]
    fn test_create_appends_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let event = Event::Press {
            port: 0,
            button: LogicalButton::A,
        };

        for _ in 0..2 {
            let mut recorder = EventRecorder::create(&path, false).unwrap();
            recorder.record(&event).unwrap();
            recorder.flush().unwrap();
        }

        let file = File::open(&path).unwrap();
        assert_eq!(BufReader::new(file).lines().count(), 2);
    }

    #[test]
    fn test_from_config() {
        let dir = TempDir::new().unwrap();
        let config = TelemetryConfig {
            enabled: true,
            path: dir.path().join("events.jsonl").display().to_string(),
            include_poll: true,
        };
        let recorder = EventRecorder::from_config(&config).unwrap();
        assert!(recorder.include_poll);
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_returned() {
        let mut recorder = EventRecorder::new(FailingWriter, false);
        let result = recorder.record(&Event::Press {
            port: 0,
            button: LogicalButton::A,
        });
        assert!(result.is_err());
        assert_eq!(recorder.records(), 0);
    }
}
