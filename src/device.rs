//! Serial link to the sensor board: newline-delimited JSON in, short text
//! commands out.

use bytes::Bytes;
use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::config::Config;

const READ_TIMEOUT: Duration = Duration::from_millis(500);
/// Longest line kept while waiting for its newline.
const MAX_LINE_BYTES: usize = 4 * 1024;

/// Commands understood by the board firmware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    On,
    Off,
    Toggle,
    Message(String),
}

impl Command {
    /// Wire form, newline terminated.
    pub fn encode(&self) -> Bytes {
        match self {
            Command::On => Bytes::from_static(b"ON\n"),
            Command::Off => Bytes::from_static(b"OFF\n"),
            Command::Toggle => Bytes::from_static(b"TOGGLE\n"),
            Command::Message(text) => Bytes::from(format!("MSG:{text}\n")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("failed to open serial port {path}: {source}")]
    Open {
        path: String,
        source: serialport::Error,
    },
    #[error("failed to clone serial port handle: {0}")]
    Clone(serialport::Error),
    #[error("failed to start serial thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Splits a byte stream into lines. Bytes left over after the last newline
/// are kept until the rest of the line arrives. A line that outgrows
/// `MAX_LINE_BYTES` is discarded up to its next newline.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
    overflowed: bool,
}

impl LineFramer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' {
                let raw = std::mem::take(&mut self.pending);
                if std::mem::take(&mut self.overflowed) {
                    continue;
                }
                let line = String::from_utf8_lossy(&raw);
                lines.push(line.trim_end_matches('\r').to_string());
            } else if self.overflowed {
                continue;
            } else if self.pending.len() >= MAX_LINE_BYTES {
                warn!("⚠️ Dropping device line longer than {} bytes", MAX_LINE_BYTES);
                self.pending.clear();
                self.overflowed = true;
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }
}

/// Read lines from `source` until it ends or fails, handing each to `sink`.
/// Timeouts are expected on an idle port and are skipped. Stops early if
/// `sink` returns false.
pub fn pump_lines<R, F>(mut source: R, mut sink: F) -> io::Result<()>
where
    R: Read,
    F: FnMut(String) -> bool,
{
    let mut framer = LineFramer::default();
    let mut buf = [0u8; 256];
    loop {
        match source.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => {
                for line in framer.push(&buf[..n]) {
                    if !sink(line) {
                        return Ok(());
                    }
                }
            }
            Err(e) if e.kind() == io::ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Write every queued command to `sink` until the queue closes. Failures are
/// logged and the command is dropped.
pub fn drain_commands<W: Write>(mut sink: W, mut commands: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = commands.blocking_recv() {
        let bytes = command.encode();
        if let Err(e) = sink.write_all(&bytes).and_then(|_| sink.flush()) {
            warn!("⚠️ Failed to send {:?} to device: {}", command, e);
        }
    }
}

/// Open the configured serial port and start its reader and writer threads.
pub fn spawn_serial(
    config: &Config,
    lines: mpsc::Sender<String>,
    commands: mpsc::UnboundedReceiver<Command>,
) -> Result<(), DeviceError> {
    info!("🔌 Opening serial port {} at {} baud", config.serial_port, config.baud_rate);

    let port = serialport::new(&config.serial_port, config.baud_rate)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|source| DeviceError::Open {
            path: config.serial_port.clone(),
            source,
        })?;
    let writer = port.try_clone().map_err(DeviceError::Clone)?;

    let path = config.serial_port.clone();
    thread::Builder::new()
        .name("serial-reader".into())
        .spawn(move || {
            let result = pump_lines(port, |line| lines.blocking_send(line).is_ok());
            match result {
                Ok(()) => info!("🔌 Serial reader on {} stopped", path),
                Err(e) => error!("❌ Serial read failed on {}: {}", path, e),
            }
        })?;

    thread::Builder::new()
        .name("serial-writer".into())
        .spawn(move || drain_commands(writer, commands))?;

    info!("✅ Connected to device on {}", config.serial_port);
    Ok(())
}
