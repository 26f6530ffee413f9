use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use super::models::RegisteredPlayer;
use crate::stats::PlayerStat;

/// Every known player, keyed by player id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerRegistry {
    players: BTreeMap<String, RegisteredPlayer>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<&RegisteredPlayer> {
        self.players.get(player_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &RegisteredPlayer> {
        self.players.values()
    }

    pub fn find_by_governor_id(&self, governor_id: &str) -> Option<&RegisteredPlayer> {
        let governor_id = governor_id.trim();
        self.players
            .values()
            .find(|player| player.knows_governor_id(governor_id))
    }

    /// Maps one appearance to a player id and records it.
    ///
    /// A known governor id wins. Otherwise a name known to exactly one player
    /// picks that player. A name shared by several players, or no match at
    /// all, registers a new player.
    pub fn resolve(
        &mut self,
        governor_id: &str,
        name: &str,
        event_id: &str,
        now: DateTime<Utc>,
    ) -> String {
        let governor_id = governor_id.trim();
        let name = name.trim();

        let found = self
            .find_by_governor_id(governor_id)
            .map(|player| player.player_id.clone())
            .or_else(|| self.unique_name_match(name));

        if let Some(player) = found.and_then(|id| self.players.get_mut(&id)) {
            player.observe(governor_id, name, event_id, now);
            return player.player_id.clone();
        }

        let player = RegisteredPlayer::new(governor_id, name, event_id, now);
        let player_id = player.player_id.clone();
        debug!(governor_id, name, player_id = %player_id, "Registered new player");
        self.players.insert(player_id.clone(), player);
        player_id
    }

    /// Resolves every record of one event. Returns the ids of the players it
    /// touched, in record order without repeats.
    pub fn record_event(
        &mut self,
        event_id: &str,
        records: &[PlayerStat],
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut touched = Vec::with_capacity(records.len());

        for record in records {
            let player_id = self.resolve(&record.governor_id, &record.name, event_id, now);
            if seen.insert(player_id.clone()) {
                touched.push(player_id);
            }
        }

        touched
    }

    fn unique_name_match(&self, name: &str) -> Option<String> {
        let mut matches = self.players.values().filter(|player| player.knows_name(name));
        let first = matches.next()?;

        if matches.next().is_some() {
            warn!(name, "Governor name matches several players, registering a new one");
            return None;
        }
        Some(first.player_id.clone())
    }
}

impl FromIterator<RegisteredPlayer> for PlayerRegistry {
    fn from_iter<I: IntoIterator<Item = RegisteredPlayer>>(iter: I) -> Self {
        Self {
            players: iter
                .into_iter()
                .map(|player| (player.player_id.clone(), player))
                .collect(),
        }
    }
}
