//! Soft skip-list for vanished videos.
//!
//! A video that the platform reports as gone is neither processed nor
//! recorded as done; a permanent ledger entry would hide a video that
//! later reappears. Instead its id is parked here with a TTL, so repeated
//! passes stop hammering the API but eventually re-check.

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::time::Duration;

use timestitch_models::VideoId;

/// TTL cache of video ids to leave alone for a while.
#[derive(Debug)]
pub struct SkipList {
    ttl: TimeDelta,
    entries: HashMap<String, DateTime<Utc>>,
}

impl SkipList {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: HashMap::new(),
        }
    }

    /// Park a video id until its TTL lapses.
    pub fn note(&mut self, id: &VideoId) {
        self.note_at(id, Utc::now());
    }

    /// Whether the id is currently parked. Expired entries are pruned as
    /// a side effect.
    pub fn contains(&mut self, id: &VideoId) -> bool {
        self.contains_at(id, Utc::now())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn note_at(&mut self, id: &VideoId, now: DateTime<Utc>) {
        self.entries.insert(id.as_str().to_string(), now);
    }

    fn contains_at(&mut self, id: &VideoId, now: DateTime<Utc>) -> bool {
        let ttl = self.ttl;
        match self.entries.get(id.as_str()) {
            Some(&noted) if now.signed_duration_since(noted) < ttl => true,
            Some(_) => {
                self.entries.remove(id.as_str());
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noted_ids_are_skipped_until_the_ttl_lapses() {
        let mut list = SkipList::new(Duration::from_secs(3600));
        let id = VideoId::from("gone");
        let noted_at: DateTime<Utc> = "2025-06-01T10:00:00Z".parse().unwrap();

        list.note_at(&id, noted_at);
        assert!(list.contains_at(&id, "2025-06-01T10:30:00Z".parse().unwrap()));
        assert!(!list.contains_at(&id, "2025-06-01T11:00:01Z".parse().unwrap()));
        // expiry pruned the entry
        assert!(list.is_empty());
    }

    #[test]
    fn unknown_ids_are_not_skipped() {
        let mut list = SkipList::new(Duration::from_secs(3600));
        assert!(!list.contains(&VideoId::from("fresh")));
    }

    #[test]
    fn re_noting_refreshes_the_ttl() {
        let mut list = SkipList::new(Duration::from_secs(60));
        let id = VideoId::from("gone");
        list.note_at(&id, "2025-06-01T10:00:00Z".parse().unwrap());
        list.note_at(&id, "2025-06-01T10:05:00Z".parse().unwrap());
        assert!(list.contains_at(&id, "2025-06-01T10:05:30Z".parse().unwrap()));
        assert_eq!(list.len(), 1);
    }
}
