use serde::Serialize;

use super::{
    models::{EventStatsSet, PlayerHistoryEntry, PlayerStat, StatMetric},
    parser::DELIMITER,
};
use crate::player::RegisteredPlayer;

/// Canonical column order for CSV import and export
pub const CSV_HEADER: [&str; 7] = [
    "governorId",
    "name",
    "power",
    "kills",
    "deaths",
    "t5Kills",
    "dkp",
];

/// The `n` records with the most kills, ties kept in input order
pub fn top_n_by_kills(records: &[PlayerStat], n: usize) -> Vec<PlayerStat> {
    top_n_by(records, StatMetric::Kills, n)
}

/// The `n` records with the largest `metric`, ties kept in input order
pub fn top_n_by(records: &[PlayerStat], metric: StatMetric, n: usize) -> Vec<PlayerStat> {
    let mut ranked: Vec<&PlayerStat> = records.iter().collect();
    // stable: equal values keep their input order
    ranked.sort_by(|a, b| b.metric(metric).cmp(&a.metric(metric)));
    ranked.into_iter().take(n).cloned().collect()
}

/// Identifiers of every event, newest first
pub fn sorted_event_ids(stats: &EventStatsSet) -> Vec<String> {
    stats.event_ids_desc()
}

/// One entry per event, newest first, holding the player's record when present
pub fn history_for_player(stats: &EventStatsSet, governor_id: &str) -> Vec<PlayerHistoryEntry> {
    history_for_governors(stats, &[governor_id.trim()])
}

/// Like [`history_for_player`] for someone who used several governor ids.
/// Ids are compared without surrounding whitespace; the first matching
/// record of an event is taken.
pub fn history_for_governors<S: AsRef<str>>(
    stats: &EventStatsSet,
    governor_ids: &[S],
) -> Vec<PlayerHistoryEntry> {
    let matches = |record: &&PlayerStat| {
        let id = record.governor_id.trim();
        governor_ids.iter().any(|known| known.as_ref() == id)
    };

    stats
        .event_ids_desc()
        .into_iter()
        .map(|event_id| {
            let stat = stats
                .get(&event_id)
                .and_then(|records| records.iter().find(matches))
                .cloned();
            PlayerHistoryEntry { event_id, stat }
        })
        .collect()
}

/// Serializes records as CSV with the canonical header. String values that
/// contain the delimiter, start with `"` or carry surrounding whitespace are
/// wrapped in double quotes with inner quotes doubled.
pub fn to_csv(records: &[PlayerStat]) -> String {
    let separator = DELIMITER.to_string();
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.join(&separator));

    for record in records {
        let fields = [
            quote_if_needed(&record.governor_id),
            quote_if_needed(&record.name),
            record.power.to_string(),
            record.kills.to_string(),
            record.deaths.to_string(),
            record.t5_kills.to_string(),
            record.dkp.to_string(),
        ];
        lines.push(fields.join(&separator));
    }

    lines.join("\n")
}

fn quote_if_needed(value: &str) -> String {
    let needs_quotes =
        value.contains(DELIMITER) || value.starts_with('"') || value.trim() != value;

    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Suggested download name for an event export
pub fn export_filename(event_id: &str) -> String {
    format!("{}-export.csv", event_id)
}

/// Picks the event to display: the caller's remembered choice when it still
/// exists, otherwise the newest event.
pub fn select_event(stats: &EventStatsSet, preferred: Option<&str>) -> Option<String> {
    match preferred {
        Some(id) if stats.contains(id) => Some(id.to_string()),
        _ => stats.event_ids_desc().into_iter().next(),
    }
}

/// Dashboard payload for one selected event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub event_ids: Vec<String>,
    pub selected: Option<String>,
    pub metric: StatMetric,
    pub top: Vec<PlayerStat>,
    pub records: Vec<PlayerStat>,
}

pub fn dashboard_view(
    stats: &EventStatsSet,
    preferred: Option<&str>,
    metric: StatMetric,
    top_n: usize,
) -> DashboardView {
    let selected = select_event(stats, preferred);
    let records = selected
        .as_deref()
        .and_then(|id| stats.get(id))
        .map(<[PlayerStat]>::to_vec)
        .unwrap_or_default();

    DashboardView {
        event_ids: stats.event_ids_desc(),
        top: top_n_by(&records, metric, top_n),
        selected,
        metric,
        records,
    }
}

/// A player's standing in the newest event plus their full history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub governor_id: String,
    /// Registry entry when the governor id is linked to a known player
    pub player: Option<RegisteredPlayer>,
    pub latest_event: Option<String>,
    pub latest_dkp: Option<u64>,
    pub history: Vec<PlayerHistoryEntry>,
}

/// Profile for `governor_id`. With a registered player the history covers
/// every governor id that player has used.
pub fn player_profile(
    stats: &EventStatsSet,
    governor_id: &str,
    player: Option<&RegisteredPlayer>,
) -> PlayerProfile {
    let history = match player {
        Some(player) => history_for_governors(stats, &player.known_governor_ids),
        None => history_for_player(stats, governor_id),
    };
    let latest = history.first();

    PlayerProfile {
        governor_id: governor_id.to_string(),
        latest_event: latest.map(|entry| entry.event_id.clone()),
        latest_dkp: latest.and_then(|entry| entry.stat.as_ref()).map(|s| s.dkp),
        player: player.cloned(),
        history,
    }
}
