//! Simulated sensor board for running the dashboard without hardware.
//!
//! It speaks the same protocol as the real firmware: it consumes [`Command`]s
//! and emits JSON status lines, so captures go through the normal merge path.

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::device::Command;
use crate::status::TelemetryRecord;

const TICK: Duration = Duration::from_secs(2);
/// Anything closer than this while armed counts as the door opening.
const TRIGGER_DISTANCE: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoDevice {
    system_on: bool,
    distance: u32,
    door_open: bool,
}

impl Default for DemoDevice {
    fn default() -> Self {
        Self {
            system_on: false,
            distance: 25,
            door_open: false,
        }
    }
}

impl DemoDevice {
    /// New distance reading.
    pub fn tick(&mut self, distance: u32) {
        self.distance = distance;
        self.door_open = self.system_on && distance < TRIGGER_DISTANCE;
    }

    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::On => {
                self.system_on = true;
                info!("🎭 System turned ON");
            }
            Command::Off => {
                self.system_on = false;
                self.door_open = false;
                info!("🎭 System turned OFF");
            }
            Command::Toggle => {
                self.system_on = !self.system_on;
                info!(system_on = self.system_on, "🎭 System toggled");
            }
            Command::Message(text) => info!("🎭 Blinking message: {}", text),
        }
    }

    pub fn telemetry(&self) -> TelemetryRecord {
        TelemetryRecord {
            system_on: Some(self.system_on),
            distance: Some(f64::from(self.distance)),
            door_open: Some(self.door_open),
        }
    }
}

/// Uniform in [10, 60).
fn random_distance() -> u32 {
    10 + (Uuid::new_v4().as_u128() % 50) as u32
}

/// Drive a [`DemoDevice`] until either channel closes.
pub async fn run(lines: mpsc::Sender<String>, mut commands: mpsc::UnboundedReceiver<Command>) {
    let mut device = DemoDevice::default();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        tokio::select! {
            _ = ticker.tick() => device.tick(random_distance()),
            command = commands.recv() => match command {
                Some(command) => device.apply(&command),
                None => break,
            },
        }

        let line = match serde_json::to_string(&device.telemetry()) {
            Ok(line) => line,
            Err(e) => {
                warn!("⚠️ Could not encode demo telemetry: {}", e);
                continue;
            }
        };
        if lines.send(line).await.is_err() {
            break;
        }
    }
    info!("🎭 Demo device stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_device_never_reports_open() {
        let mut device = DemoDevice::default();
        device.tick(5);
        assert_eq!(device.telemetry().door_open, Some(false));
    }

    #[test]
    fn armed_device_opens_when_close() {
        let mut device = DemoDevice::default();
        device.apply(&Command::On);
        device.tick(12);
        assert_eq!(device.telemetry().door_open, Some(true));
        device.tick(15);
        assert_eq!(device.telemetry().door_open, Some(false));
    }

    #[test]
    fn turning_off_closes_the_door() {
        let mut device = DemoDevice::default();
        device.apply(&Command::On);
        device.tick(10);
        device.apply(&Command::Off);
        let telemetry = device.telemetry();
        assert_eq!(telemetry.system_on, Some(false));
        assert_eq!(telemetry.door_open, Some(false));
    }

    #[test]
    fn toggle_flips_armed_state() {
        let mut device = DemoDevice::default();
        device.apply(&Command::Toggle);
        assert_eq!(device.telemetry().system_on, Some(true));
        device.apply(&Command::Toggle);
        assert_eq!(device.telemetry().system_on, Some(false));
    }

    #[test]
    fn random_distance_in_range() {
        for _ in 0..200 {
            let d = random_distance();
            assert!((10..60).contains(&d));
        }
    }

    #[tokio::test]
    async fn commands_produce_status_lines() {
        let (line_tx, mut line_rx) = mpsc::channel(8);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(line_tx, cmd_rx));

        // first tick fires immediately
        let first = line_rx.recv().await.unwrap();
        assert!(first.contains("\"systemOn\":false"));

        cmd_tx.send(Command::On).unwrap();
        let armed = line_rx.recv().await.unwrap();
        assert!(armed.contains("\"systemOn\":true"));

        drop(cmd_tx);
        task.await.unwrap();
    }
}
