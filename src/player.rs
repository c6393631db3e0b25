//! Player domain objects assembled from raw API records.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Deserialize;

use crate::breakdown::{PlaylistBreakdown, TierBreakdown};
use crate::enums::{Platform, PlaylistId, PlaylistKey, Stat};
use crate::tier_estimates::{estimate, TierEstimate};


/// Rank names by tier, Unranked through Supersonic Legend.
pub const RANK_NAMES: [&str; 23] = [
    "Unranked",
    "Bronze I",
    "Bronze II",
    "Bronze III",
    "Silver I",
    "Silver II",
    "Silver III",
    "Gold I",
    "Gold II",
    "Gold III",
    "Platinum I",
    "Platinum II",
    "Platinum III",
    "Diamond I",
    "Diamond II",
    "Diamond III",
    "Champion I",
    "Champion II",
    "Champion III",
    "Grand Champion I",
    "Grand Champion II",
    "Grand Champion III",
    "Supersonic Legend",
];

/// Division names by index within a tier.
pub const DIVISION_NAMES: [&str; 4] = ["I", "II", "III", "IV"];

/// Highest season reward level a player can reach.
pub const SEASON_REWARDS_MAX_LEVEL: i32 = 8;

/// Current highest tier (Supersonic Legend). The API still reports a stale
/// pre-expansion value in its `tier_max` field, so that field is ignored.
pub const TIER_MAX: i32 = 22;

/// Playlists whose tier counts toward season rewards. Tournaments don't.
pub const PLAYLISTS_WITH_SEASON_REWARDS: [PlaylistKey; 7] = [
    PlaylistKey::SoloDuel,
    PlaylistKey::Doubles,
    PlaylistKey::Standard,
    PlaylistKey::Hoops,
    PlaylistKey::Rumble,
    PlaylistKey::Dropshot,
    PlaylistKey::SnowDay,
];

/// The API reports these fields as absent or null interchangeably; only mu
/// and sigma are reliably present.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SkillRecord {
    pub(crate) playlist: u32,
    #[serde(default)]
    pub(crate) tier: Option<i32>,
    #[serde(default)]
    pub(crate) division: Option<i32>,
    #[serde(default)]
    pub(crate) mu: Option<f64>,
    #[serde(default)]
    pub(crate) skill: Option<i64>,
    #[serde(default)]
    pub(crate) sigma: Option<f64>,
    #[serde(default)]
    pub(crate) win_streak: Option<i32>,
    #[serde(default)]
    pub(crate) matches_played: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SeasonRewardsRecord {
    #[serde(default)]
    pub(crate) level: Option<i32>,
    #[serde(default)]
    pub(crate) wins: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StatRecord {
    pub(crate) stat_type: String,
    pub(crate) value: u64,
}

/// One raw player record from the search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlayerRecord {
    #[serde(default)]
    pub(crate) user_id: Option<String>,
    pub(crate) user_name: String,
    #[serde(default)]
    pub(crate) player_skills: Vec<SkillRecord>,
    #[serde(default)]
    pub(crate) season_rewards: SeasonRewardsRecord,
    #[serde(default)]
    pub(crate) player_stats: Vec<StatRecord>,
}

/// One player's stats for one ranked playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub key: PlaylistId,
    pub tier: i32,
    pub division: i32,
    pub mu: f64,
    pub skill: i64,
    pub sigma: f64,
    pub win_streak: i32,
    pub matches_played: i32,
    pub tier_max: i32,
    pub tier_estimates: TierEstimate,
}

impl Playlist {
    pub(crate) fn from_record(record: SkillRecord, breakdown: Option<&PlaylistBreakdown>) -> Self {
        let tier = record.tier.unwrap_or(0);
        let division = record.division.unwrap_or(0);
        let mu = record.mu.unwrap_or(25.0);
        let skill = record.skill.unwrap_or_else(|| (mu * 20.0 + 100.0) as i64);

        static EMPTY: PlaylistBreakdown = PlaylistBreakdown::new();
        let tier_estimates = estimate(tier, division, skill, TIER_MAX, breakdown.unwrap_or(&EMPTY));

        Self {
            key: PlaylistId::from_id(record.playlist),
            tier,
            division,
            mu,
            skill,
            sigma: record.sigma.unwrap_or(8.333),
            win_streak: record.win_streak.unwrap_or(0),
            matches_played: record.matches_played.unwrap_or(0),
            tier_max: TIER_MAX,
            tier_estimates,
        }
    }
}

impl fmt::Display for Playlist {
    /// Rank string, e.g. "Champion I Div III".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RANK_NAMES.get(self.tier as usize) {
            Some(rank) if self.tier == 0 || self.tier == self.tier_max => f.write_str(rank),
            Some(rank) => match DIVISION_NAMES.get(self.division as usize) {
                Some(division) => write!(f, "{rank} Div {division}"),
                None => f.write_str("Unknown"),
            },
            None => f.write_str("Unknown"),
        }
    }
}

/// Season-reward progress, derived from the highest eligible tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonRewards {
    pub level: i32,
    pub wins: i32,
    pub can_advance: bool,
}

impl SeasonRewards {
    pub(crate) fn from_record(record: &SeasonRewardsRecord, highest_tier: i32) -> Self {
        let level = record.level.unwrap_or(0);
        let wins = record.wins.unwrap_or(0);
        Self {
            level,
            wins,
            can_advance: level == 0 || level * 3 < highest_tier,
        }
    }

    /// The level after this one, absent at the maximum.
    pub fn next_level(&self) -> Option<i32> {
        (self.level < SEASON_REWARDS_MAX_LEVEL).then(|| self.level + 1)
    }
}

/// Aggregate lifetime counters; stat types the server omits default to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub assists: u64,
    pub goals: u64,
    pub mvps: u64,
    pub saves: u64,
    pub shots: u64,
    pub wins: u64,
}

impl PlayerStats {
    pub(crate) fn from_records(records: &[StatRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            match record.stat_type.as_str() {
                "assists" => stats.assists = record.value,
                "goals" => stats.goals = record.value,
                "mvps" => stats.mvps = record.value,
                "saves" => stats.saves = record.value,
                "shots" => stats.shots = record.value,
                "wins" => stats.wins = record.value,
                // server may add stat types this library doesn't know
                _ => {}
            }
        }
        stats
    }

    pub fn get(&self, stat: Stat) -> u64 {
        match stat {
            Stat::Assists => self.assists,
            Stat::Goals => self.goals,
            Stat::Mvps => self.mvps,
            Stat::Saves => self.saves,
            Stat::Shots => self.shots,
            Stat::Wins => self.wins,
        }
    }
}

/// One resolved identity on one platform.
#[derive(Debug, Clone)]
pub struct Player {
    pub platform: Platform,
    /// Absent for some platforms; see [`Player`] equality below.
    pub user_id: Option<String>,
    pub user_name: String,
    /// Keyed by raw playlist id, so unknown playlists are preserved.
    pub playlists: BTreeMap<u32, Playlist>,
    /// Highest tier across the playlists that count toward season rewards.
    pub highest_tier: i32,
    pub season_rewards: SeasonRewards,
    pub stats: PlayerStats,
}

impl Player {
    pub(crate) fn from_record(
        platform: Platform,
        record: PlayerRecord,
        breakdown: &TierBreakdown,
    ) -> Self {
        let mut playlists = BTreeMap::new();
        for skills in record.player_skills {
            let playlist_breakdown = breakdown.get(&skills.playlist);
            let playlist = Playlist::from_record(skills, playlist_breakdown);
            playlists.insert(playlist.key.id(), playlist);
        }

        let highest_tier = playlists
            .iter()
            .filter(|(id, _)| {
                PLAYLISTS_WITH_SEASON_REWARDS
                    .iter()
                    .any(|key| key.id() == **id)
            })
            .map(|(_, playlist)| playlist.tier)
            .max()
            .unwrap_or(0);

        Self {
            platform,
            user_id: record.user_id,
            user_name: record.user_name,
            playlists,
            highest_tier,
            season_rewards: SeasonRewards::from_record(&record.season_rewards, highest_tier),
            stats: PlayerStats::from_records(&record.player_stats),
        }
    }

    pub fn get_playlist(&self, key: PlaylistKey) -> Option<&Playlist> {
        self.playlists.get(&key.id())
    }
}

/// Identity equality: same platform, then by `user_id` when both sides have
/// one; otherwise the (user_id, user_name) pair must match.
impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        if self.platform != other.platform {
            return false;
        }
        if let (Some(a), Some(b)) = (&self.user_id, &other.user_id) {
            return a == b;
        }
        (&self.user_id, &self.user_name) == (&other.user_id, &other.user_name)
    }
}

impl Eq for Player {}

impl Hash for Player {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.platform.hash(state);
        match &self.user_id {
            Some(user_id) => {
                "by_user_id".hash(state);
                user_id.hash(state);
            }
            None => {
                "by_user_name".hash(state);
                self.user_name.hash(state);
            }
        }
    }
}
