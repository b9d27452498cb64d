//! Stdio surface
//!
//! Newline-delimited JSON in both directions: one [`SurfaceEvent`] per input
//! line, one [`Outgoing`] record per output line.

use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use holo_conductor::{BridgeCall, ConductorMessage, SurfaceEvent};

/// Errors on the stdio surface
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// An input line was not a valid event
    #[error("invalid surface event: {0}")]
    Parse(#[source] serde_json::Error),

    /// An output record could not be encoded
    #[error("failed to encode output: {0}")]
    Encode(#[source] serde_json::Error),

    /// Writing to the output failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse one input line
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_event(line: &str) -> Result<Option<SurfaceEvent>, SurfaceError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(SurfaceError::Parse)
}

/// One output record
#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Outgoing {
    /// Something for the renderer
    Message(ConductorMessage),
    /// A call into the host application
    Bridge(BridgeCall),
}

/// Writes [`Outgoing`] records as JSON lines
pub struct SurfaceWriter<W> {
    out: W,
    written: u64,
}

impl<W: AsyncWrite + Unpin> SurfaceWriter<W> {
    /// Wrap an output stream
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Write one record and flush
    pub async fn write(&mut self, record: &Outgoing) -> Result<(), SurfaceError> {
        let mut line = serde_json::to_vec(record).map_err(SurfaceError::Encode)?;
        line.push(b'\n');
        self.out.write_all(&line).await?;
        self.out.flush().await?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// The wrapped stream
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
