use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{Display, EnumIter, EnumString};

/// One player's performance in one event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStat {
    pub governor_id: String,
    pub name: String,
    pub power: u64,
    pub kills: u64,
    pub deaths: u64,
    pub t5_kills: u64,
    pub dkp: u64,
}

impl PlayerStat {
    /// Value of the given numeric field
    pub fn metric(&self, metric: StatMetric) -> u64 {
        match metric {
            StatMetric::Power => self.power,
            StatMetric::Kills => self.kills,
            StatMetric::Deaths => self.deaths,
            StatMetric::T5Kills => self.t5_kills,
            StatMetric::Dkp => self.dkp,
        }
    }
}

/// Numeric field a ranking can be ordered by
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StatMetric {
    Power,
    #[default]
    Kills,
    Deaths,
    #[serde(rename = "t5Kills")]
    #[strum(serialize = "t5Kills")]
    T5Kills,
    Dkp,
}

/// Event identifier -> ordered records for that event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventStatsSet {
    events: BTreeMap<String, Vec<PlayerStat>>,
}

impl EventStatsSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, event_id: impl Into<String>, records: Vec<PlayerStat>) {
        self.events.insert(event_id.into(), records);
    }

    pub fn get(&self, event_id: &str) -> Option<&[PlayerStat]> {
        self.events.get(event_id).map(Vec::as_slice)
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.events.contains_key(event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event identifiers newest first. Identifiers embed an ordinal, so
    /// descending lexicographic order approximates recency.
    pub fn event_ids_desc(&self) -> Vec<String> {
        self.events.keys().rev().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<PlayerStat>)> {
        self.events.iter()
    }
}

impl FromIterator<(String, Vec<PlayerStat>)> for EventStatsSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<PlayerStat>)>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// A player's record in one event, or `None` when they have no data there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerHistoryEntry {
    pub event_id: String,
    pub stat: Option<PlayerStat>,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub event_id: String,
    pub player_count: usize,
}

/// Last upload seen for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub event_id: String,
    pub player_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn player_stat_serializes_camel_case() {
        let stat = PlayerStat {
            governor_id: "1111".to_string(),
            name: "Alice".to_string(),
            t5_kills: 8,
            ..PlayerStat::default()
        };

        let json = serde_json::to_string(&stat).unwrap();
        assert!(json.contains("\"governorId\":\"1111\""));
        assert!(json.contains("\"t5Kills\":8"));

        let back: PlayerStat = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stat);
    }

    #[test]
    fn stat_metric_parses_query_names() {
        assert_eq!(StatMetric::from_str("kills").unwrap(), StatMetric::Kills);
        assert_eq!(StatMetric::from_str("t5Kills").unwrap(), StatMetric::T5Kills);
        assert_eq!(StatMetric::from_str("dkp").unwrap(), StatMetric::Dkp);
        assert!(StatMetric::from_str("assists").is_err());
        assert_eq!(StatMetric::T5Kills.to_string(), "t5Kills");
    }

    #[test]
    fn metric_reads_matching_field() {
        let stat = PlayerStat {
            power: 1,
            kills: 2,
            deaths: 3,
            t5_kills: 4,
            dkp: 5,
            ..PlayerStat::default()
        };

        let values: Vec<u64> = StatMetric::iter().map(|m| stat.metric(m)).collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn event_ids_are_listed_newest_first() {
        let set: EventStatsSet = vec![
            ("Kvk-SoC-1".to_string(), vec![]),
            ("Kvk-SoC-3".to_string(), vec![]),
            ("Kvk-SoC-2".to_string(), vec![]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            set.event_ids_desc(),
            vec!["Kvk-SoC-3", "Kvk-SoC-2", "Kvk-SoC-1"]
        );
    }

    #[test]
    fn event_stats_set_serializes_as_plain_map() {
        let mut set = EventStatsSet::new();
        set.insert("Kvk-1", vec![]);

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"Kvk-1":[]}"#);
    }
}
