//! Append-only writer for session events.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use posturemaxx_common::error::{PostureError, PostureResult};
use posturemaxx_pose_model::frame::PoseStreamHeader;

use crate::session::SessionEvent;

/// Writes session events to a JSONL file.
pub struct SessionEventWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    events_written: u64,
}

impl SessionEventWriter {
    /// Create the file, writing a header line naming the frame source.
    pub fn create(path: &Path, source: &str) -> PostureResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);

        let header = PoseStreamHeader::new(Some(source.to_string()));
        let header_json = serde_json::to_string(&header)?;
        writeln!(writer, "# {header_json}")
            .map_err(|e| PostureError::session(format!("Failed to write header: {e}")))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            events_written: 0,
        })
    }

    /// Write a single event as a JSONL line.
    pub fn write_event(&mut self, event: &SessionEvent) -> PostureResult<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.writer, "{json}")
            .map_err(|e| PostureError::session(format!("Failed to write event: {e}")))?;
        self.events_written += 1;

        if self.events_written % 500 == 0 {
            self.flush()?;
        }

        Ok(())
    }

    /// Flush buffered writes to disk.
    pub fn flush(&mut self) -> PostureResult<()> {
        self.writer
            .flush()
            .map_err(|e| PostureError::session(format!("Failed to flush events: {e}")))?;
        Ok(())
    }

    /// Number of events written.
    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Path to the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionEventWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
