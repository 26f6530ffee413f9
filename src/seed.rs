// Demo kingdom loaded on startup so a fresh server has something to show.

use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::player::PlayerRegistryService;
use crate::schedule::{ScheduleRepository, ScheduledEvent};
use crate::shared::AppError;
use crate::stats::{PlayerStat, StatsStore};
use crate::user::{password, AooTeam, Role, User, UserRepository};

pub const DEMO_GOVERNOR_ID: &str = "12345";
pub const DEMO_PASSWORD: &str = "password";

fn player(
    governor_id: &str,
    name: &str,
    power: u64,
    kills: u64,
    deaths: u64,
    t5_kills: u64,
    dkp: u64,
) -> PlayerStat {
    PlayerStat {
        governor_id: governor_id.to_string(),
        name: name.to_string(),
        power,
        kills,
        deaths,
        t5_kills,
        dkp,
    }
}

/// Two finished KvK seasons
pub fn demo_stats() -> Vec<(String, Vec<PlayerStat>)> {
    vec![
        (
            "Kvk-SoC-1".to_string(),
            vec![
                player("1111", "Alice", 150_000_000, 12_500_000, 800_000, 8_000_000, 18_000),
                player("2222", "Bob", 220_000_000, 25_000_000, 1_200_000, 15_000_000, 32_000),
                player("3333", "Charlie", 95_000_000, 8_000_000, 600_000, 4_500_000, 11_000),
            ],
        ),
        (
            "Kvk-SoC-2".to_string(),
            vec![
                player("1111", "Alice", 180_000_000, 15_000_000, 900_000, 10_000_000, 22_000),
                player("2222", "Bob", 250_000_000, 30_000_000, 1_500_000, 18_000_000, 40_000),
                player("4444", "David", 130_000_000, 10_000_000, 750_000, 6_000_000, 15_000),
            ],
        ),
    ]
}

pub fn demo_schedule() -> Vec<ScheduledEvent> {
    let now = Utc::now();
    vec![
        ScheduledEvent::new(
            "Ark of Osiris".to_string(),
            now + Duration::days(2),
            "Prepare for the Ark of Osiris! Sign up now.".to_string(),
        ),
        ScheduledEvent::new(
            "Kingdom vs Kingdom".to_string(),
            now + Duration::days(7),
            "The great war is upon us. All members must be ready to fight for the kingdom's glory!"
                .to_string(),
        ),
    ]
}

/// Loads stats with their players, the schedule and the demo account. Safe
/// to run against storage that already holds the demo data.
#[instrument(skip_all)]
pub async fn seed_demo_data(
    stats: &StatsStore,
    players: &PlayerRegistryService,
    users: &dyn UserRepository,
    schedule: &dyn ScheduleRepository,
) -> Result<(), AppError> {
    for (event_id, records) in demo_stats() {
        players.record_event(&event_id, &records).await?;
        stats.replace_event(&event_id, records).await?;
    }

    if schedule.list_events().await?.is_empty() {
        for event in demo_schedule() {
            schedule.create_event(&event).await?;
        }
    }

    let demo_user = User::new(DEMO_GOVERNOR_ID, Role::Rally, AooTeam::Team1);
    let hash = password::hash_password_blocking(DEMO_PASSWORD.to_string()).await?;
    match users.create_user(&demo_user, &hash).await {
        Ok(()) | Err(AppError::Conflict(_)) => {}
        Err(e) => return Err(e),
    }
    debug!(governor_id = DEMO_GOVERNOR_ID, "Demo account available");

    info!("Demo data loaded");
    Ok(())
}
