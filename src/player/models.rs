use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// One person across events, whatever governor ids and names they used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredPlayer {
    pub player_id: String,
    /// Name the player was first registered under
    pub primary_name: String,
    pub known_governor_ids: Vec<String>,
    pub known_governor_names: Vec<String>,
    pub current_governor_id: String,
    pub current_governor_name: String,
    pub active_events: BTreeSet<String>,
    pub first_seen_event: String,
    pub last_seen_event: String,
    pub last_updated: DateTime<Utc>,
}

impl RegisteredPlayer {
    pub fn new(governor_id: &str, name: &str, event_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            player_id: Uuid::new_v4().to_string(),
            primary_name: name.to_string(),
            known_governor_ids: vec![governor_id.to_string()],
            known_governor_names: vec![name.to_string()],
            current_governor_id: governor_id.to_string(),
            current_governor_name: name.to_string(),
            active_events: BTreeSet::from([event_id.to_string()]),
            first_seen_event: event_id.to_string(),
            last_seen_event: event_id.to_string(),
            last_updated: now,
        }
    }

    /// Records an appearance in `event_id`. The current id and name follow
    /// the newest event seen so far.
    pub fn observe(&mut self, governor_id: &str, name: &str, event_id: &str, now: DateTime<Utc>) {
        if !self.knows_governor_id(governor_id) {
            self.known_governor_ids.push(governor_id.to_string());
        }
        if !self.knows_name(name) {
            self.known_governor_names.push(name.to_string());
        }

        if event_id >= self.last_seen_event.as_str() {
            self.current_governor_id = governor_id.to_string();
            self.current_governor_name = name.to_string();
            self.last_seen_event = event_id.to_string();
        }
        if event_id < self.first_seen_event.as_str() {
            self.first_seen_event = event_id.to_string();
        }

        self.active_events.insert(event_id.to_string());
        self.last_updated = now;
    }

    pub fn knows_governor_id(&self, governor_id: &str) -> bool {
        self.known_governor_ids.iter().any(|id| id == governor_id)
    }

    pub fn knows_name(&self, name: &str) -> bool {
        self.known_governor_names.iter().any(|known| known == name)
    }
}
