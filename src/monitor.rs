use tracing::info;

use crate::photos::{PhotoRecord, PhotoStore, PlaceholderImages};
use crate::status::{self, StatusSnapshot, TelemetryError};

/// Owns the status snapshot and the photo gallery. Everything the HTTP layer
/// and the telemetry task see goes through here.
#[derive(Debug)]
pub struct Monitor {
    status: StatusSnapshot,
    photos: PhotoStore,
}

impl Monitor {
    pub fn new(images: PlaceholderImages) -> Self {
        Self {
            status: StatusSnapshot::default(),
            photos: PhotoStore::new(images),
        }
    }

    /// Feed one raw device line. Returns the photo captured by this line, if
    /// the door just opened.
    pub fn ingest_line(&mut self, line: &str) -> Option<PhotoRecord> {
        let record = match status::parse_line(line) {
            Ok(record) => record,
            Err(TelemetryError::Blank) => return None,
            Err(e) => {
                info!(line = line.trim(), reason = %e, "🔌 Device output");
                return None;
            }
        };

        let (next, triggered) = status::merge(&self.status, &record);
        self.status = next;

        let photo = triggered.then(|| self.photos.capture());
        self.status.photo_count = self.photos.len();

        if let Some(photo) = &photo {
            info!(id = photo.id, url = %photo.image_url, "📸 Photo captured {} {}", photo.date, photo.time);
        }
        photo
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            photo_count: self.photos.len(),
            ..self.status
        }
    }

    pub fn photos(&self) -> Vec<PhotoRecord> {
        self.photos.list()
    }

    pub fn clear_photos(&mut self) {
        self.photos.clear();
        self.status.photo_count = 0;
        info!("🗑️ All photos cleared");
    }

    pub fn delete_photo(&mut self, id: i64) -> bool {
        let removed = self.photos.remove_by_id(id);
        self.status.photo_count = self.photos.len();
        if removed {
            info!(id, "🗑️ Photo deleted");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOSED: &str = r#"{"systemOn":true,"distance":40,"doorOpen":false}"#;
    const OPEN: &str = r#"{"systemOn":true,"distance":8,"doorOpen":true}"#;

    fn monitor() -> Monitor {
        Monitor::new(PlaceholderImages::Picsum)
    }

    #[test]
    fn door_opening_captures_one_photo() {
        let mut monitor = monitor();
        assert!(monitor.ingest_line(CLOSED).is_none());

        let photo = monitor.ingest_line(OPEN).expect("capture");
        let status = monitor.status();
        assert_eq!(status.photo_count, 1);
        assert!(status.door_open);
        assert_eq!(monitor.photos(), vec![photo]);
    }

    #[test]
    fn door_staying_open_does_not_capture_again() {
        let mut monitor = monitor();
        monitor.ingest_line(OPEN);
        assert!(monitor.ingest_line(OPEN).is_none());
        assert_eq!(monitor.status().photo_count, 1);
    }

    #[test]
    fn photo_count_tracks_store_through_any_sequence() {
        let mut monitor = monitor();
        let lines = [
            CLOSED, OPEN, OPEN, "garbage", CLOSED, OPEN, "", CLOSED, OPEN,
        ];
        for (step, line) in lines.iter().enumerate() {
            monitor.ingest_line(line);
            if step == 5 {
                let newest = monitor.photos()[0].id;
                monitor.delete_photo(newest);
            }
            assert_eq!(monitor.status().photo_count, monitor.photos().len());
        }
        assert_eq!(monitor.status().photo_count, 2);

        monitor.clear_photos();
        assert_eq!(monitor.status().photo_count, 0);
        assert!(monitor.photos().is_empty());
    }

    #[test]
    fn malformed_line_changes_nothing() {
        let mut monitor = monitor();
        monitor.ingest_line(CLOSED);
        let before = monitor.status();

        assert!(monitor.ingest_line("{\"doorOpen\":tru").is_none());
        assert!(monitor.ingest_line("Distance sensor init OK").is_none());
        assert_eq!(monitor.status(), before);
    }

    #[test]
    fn door_opening_with_bad_distance_still_captures() {
        let mut monitor = monitor();
        monitor.ingest_line(CLOSED);

        let photo = monitor.ingest_line(r#"{"doorOpen":true,"distance":"far"}"#);
        assert!(photo.is_some());
        let status = monitor.status();
        assert!(status.door_open);
        assert!(status.system_on);
        assert_eq!(status.distance, 40.0);
        assert_eq!(status.photo_count, 1);
    }

    #[test]
    fn partial_record_keeps_other_fields() {
        let mut monitor = monitor();
        monitor.ingest_line(CLOSED);
        monitor.ingest_line(r#"{"distance":17.5}"#);

        let status = monitor.status();
        assert!(status.system_on);
        assert!(!status.door_open);
        assert_eq!(status.distance, 17.5);
    }

    #[test]
    fn deleting_unknown_photo_reports_false() {
        let mut monitor = monitor();
        monitor.ingest_line(OPEN);
        assert!(!monitor.delete_photo(-1));
        assert_eq!(monitor.status().photo_count, 1);
    }
}
