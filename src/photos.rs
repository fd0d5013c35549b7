//! In-memory gallery of simulated captures, newest first.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub image_url: String,
}

/// Where placeholder pictures come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderImages {
    /// Random stock portrait, so every capture shows "a person".
    Portraits,
    /// Random landscape keyed on the photo id.
    Picsum,
}

impl PlaceholderImages {
    pub fn url_for(self, id: i64) -> String {
        match self {
            PlaceholderImages::Portraits => {
                let entropy = Uuid::new_v4().as_u128();
                let gender = if entropy & 1 == 0 { "men" } else { "women" };
                let index = (entropy >> 1) % 99;
                format!("https://randomuser.me/api/portraits/{gender}/{index}.jpg")
            }
            PlaceholderImages::Picsum => format!("https://picsum.photos/400/300?random={id}"),
        }
    }
}

#[derive(Debug)]
pub struct PhotoStore {
    photos: VecDeque<PhotoRecord>,
    images: PlaceholderImages,
}

impl PhotoStore {
    pub fn new(images: PlaceholderImages) -> Self {
        Self {
            photos: VecDeque::new(),
            images,
        }
    }

    pub fn capture(&mut self) -> PhotoRecord {
        self.capture_at(Local::now())
    }

    /// Record a capture taken at `now` and put it at the front.
    pub fn capture_at(&mut self, now: DateTime<Local>) -> PhotoRecord {
        let mut id = now.timestamp_millis();
        // ids double as keys; two captures in one millisecond must not collide
        if let Some(latest) = self.photos.front() {
            if id <= latest.id {
                id = latest.id + 1;
            }
        }

        let photo = PhotoRecord {
            id,
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            image_url: self.images.url_for(id),
        };
        self.photos.push_front(photo.clone());
        photo
    }

    pub fn list(&self) -> Vec<PhotoRecord> {
        self.photos.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.photos.clear();
    }

    pub fn remove_by_id(&mut self, id: i64) -> bool {
        match self.photos.iter().position(|p| p.id == id) {
            Some(index) => {
                self.photos.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, h, m, s).unwrap()
    }

    #[test]
    fn capture_formats_date_and_time() {
        let mut store = PhotoStore::new(PlaceholderImages::Picsum);
        let now = at(9, 5, 3);
        let photo = store.capture_at(now);

        assert_eq!(photo.id, now.timestamp_millis());
        assert_eq!(photo.date, "2024-03-07");
        assert_eq!(photo.time, "09:05:03");
        assert_eq!(
            photo.image_url,
            format!("https://picsum.photos/400/300?random={}", photo.id)
        );
    }

    #[test]
    fn newest_capture_comes_first() {
        let mut store = PhotoStore::new(PlaceholderImages::Picsum);
        let first = store.capture_at(at(10, 0, 0));
        let second = store.capture_at(at(10, 0, 5));

        let ids: Vec<i64> = store.list().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn same_millisecond_captures_get_distinct_ids() {
        let mut store = PhotoStore::new(PlaceholderImages::Picsum);
        let now = at(11, 30, 0);
        let a = store.capture_at(now);
        let b = store.capture_at(now);
        assert_eq!(b.id, a.id + 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn clear_empties_the_gallery() {
        let mut store = PhotoStore::new(PlaceholderImages::Picsum);
        store.capture_at(at(12, 0, 0));
        store.capture_at(at(12, 0, 1));
        store.clear();
        assert!(store.list().is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn remove_by_id() {
        let mut store = PhotoStore::new(PlaceholderImages::Picsum);
        let keep = store.capture_at(at(13, 0, 0));
        let gone = store.capture_at(at(13, 0, 1));

        assert!(store.remove_by_id(gone.id));
        assert_eq!(store.list(), vec![keep]);
    }

    #[test]
    fn removing_absent_id_leaves_store_alone() {
        let mut store = PhotoStore::new(PlaceholderImages::Picsum);
        store.capture_at(at(14, 0, 0));
        let before = store.list();

        assert!(!store.remove_by_id(12345));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn portrait_urls_stay_in_range() {
        for _ in 0..50 {
            let url = PlaceholderImages::Portraits.url_for(1);
            let rest = url
                .strip_prefix("https://randomuser.me/api/portraits/")
                .unwrap();
            let (gender, file) = rest.split_once('/').unwrap();
            assert!(gender == "men" || gender == "women");
            let index: u32 = file.strip_suffix(".jpg").unwrap().parse().unwrap();
            assert!(index < 99);
        }
    }
}
