use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::device::Command;
use crate::monitor::Monitor;
use crate::photos::PlaceholderImages;

#[derive(Debug, Clone)]
pub struct AppState {
    monitor: Arc<Mutex<Monitor>>,
    commands: mpsc::UnboundedSender<Command>,
    demo_mode: bool,
}

impl AppState {
    pub fn new(commands: mpsc::UnboundedSender<Command>, demo_mode: bool) -> Self {
        let images = if demo_mode {
            PlaceholderImages::Picsum
        } else {
            PlaceholderImages::Portraits
        };
        Self {
            monitor: Arc::new(Mutex::new(Monitor::new(images))),
            commands,
            demo_mode,
        }
    }

    /// Lock the monitor. Critical sections never panic halfway through an
    /// update, so a poisoned lock still holds consistent state.
    pub fn monitor(&self) -> MutexGuard<'_, Monitor> {
        self.monitor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Queue a command for the device. Delivery is not confirmed.
    pub fn send(&self, command: Command) {
        info!("📤 Sending {:?} to device", command);
        if self.commands.send(command).is_err() {
            warn!("⚠️ Device link is closed, command dropped");
        }
    }
}

/// Apply every line from the device to the shared monitor.
pub async fn run_telemetry(state: AppState, mut lines: mpsc::Receiver<String>) {
    while let Some(line) = lines.recv().await {
        state.monitor().ingest_line(&line);
    }
    warn!("⚠️ Telemetry stream ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn telemetry_task_updates_shared_state() {
        let (cmd_tx, _cmd_rx) = mpsc::unbounded_channel();
        let state = AppState::new(cmd_tx, false);
        let (line_tx, line_rx) = mpsc::channel(4);

        line_tx
            .send(r#"{"systemOn":true,"distance":30,"doorOpen":false}"#.to_string())
            .await
            .unwrap();
        line_tx.send("debug: echo ON".to_string()).await.unwrap();
        line_tx
            .send(r#"{"distance":9,"doorOpen":true}"#.to_string())
            .await
            .unwrap();
        drop(line_tx);

        run_telemetry(state.clone(), line_rx).await;

        let status = state.monitor().status();
        assert!(status.system_on);
        assert!(status.door_open);
        assert_eq!(status.photo_count, 1);
        let photos = state.monitor().photos();
        assert!(photos[0].image_url.starts_with("https://randomuser.me/api/portraits/"));
    }

    #[test]
    fn send_after_link_closed_does_not_panic() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        drop(cmd_rx);
        let state = AppState::new(cmd_tx, true);
        state.send(Command::On);
    }
}
