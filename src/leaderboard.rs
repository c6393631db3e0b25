//! Skill and stat leaderboards for a single platform.

use serde::Deserialize;
use serde_json::Value;

use crate::enums::{Platform, PlaylistKey, Stat};
use crate::error::{Result, RlError};

/// Some platforms wrap user ids as `"{platform display}|{id}|0"`.
fn unwrap_user_id(platform: Platform, user_id: Option<String>) -> Option<String> {
    user_id.map(|id| {
        let prefix = format!("{}|", platform.display_name());
        match id
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_suffix("|0"))
        {
            Some(inner) => inner.to_owned(),
            None => id,
        }
    })
}

#[derive(Debug, Clone, Deserialize)]
struct SkillEntryRecord {
    user_name: String,
    #[serde(default)]
    user_id: Option<String>,
    tier: i32,
    skill: i64,
}

/// One player on a playlist's skill leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLeaderboardPlayer {
    pub platform: Platform,
    pub playlist_key: PlaylistKey,
    /// Only present for Steam and Epic Games players.
    pub user_id: Option<String>,
    pub user_name: String,
    pub tier: i32,
    pub skill: i64,
}

/// Top 100 players of one playlist on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillLeaderboard {
    pub platform: Platform,
    pub playlist_key: PlaylistKey,
    pub players: Vec<SkillLeaderboardPlayer>,
}

impl SkillLeaderboard {
    pub(crate) fn from_raw(
        platform: Platform,
        playlist_key: PlaylistKey,
        body: Value,
    ) -> Result<Self> {
        let entries = match body.get("leaderboard") {
            Some(entries) => entries.clone(),
            None => {
                return Err(RlError::UnexpectedResponse(
                    "skill leaderboard response is missing the \"leaderboard\" key".to_owned(),
                ))
            }
        };
        let records: Vec<SkillEntryRecord> = serde_json::from_value(entries)?;
        let players = records
            .into_iter()
            .map(|record| SkillLeaderboardPlayer {
                platform,
                playlist_key,
                user_id: unwrap_user_id(platform, record.user_id),
                user_name: record.user_name,
                tier: record.tier,
                skill: record.skill,
            })
            .collect();
        Ok(Self {
            platform,
            playlist_key,
            players,
        })
    }
}

/// One player on a platform's stat leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLeaderboardPlayer {
    pub platform: Platform,
    pub stat: Stat,
    /// Only present for Steam and Epic Games players.
    pub user_id: Option<String>,
    pub user_name: String,
    pub value: u64,
}

/// Top 100 players for one lifetime stat on one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLeaderboard {
    pub platform: Platform,
    pub stat: Stat,
    pub players: Vec<StatLeaderboardPlayer>,
}

impl StatLeaderboard {
    /// The entry list and each entry's value are keyed by the stat's own
    /// name in the payload.
    pub(crate) fn from_raw(platform: Platform, stat: Stat, body: Value) -> Result<Self> {
        let entries = body.get(stat.as_str()).and_then(Value::as_array).ok_or_else(|| {
            RlError::UnexpectedResponse(format!(
                "stat leaderboard response is missing the {:?} key",
                stat.as_str()
            ))
        })?;

        let mut players = Vec::with_capacity(entries.len());
        for entry in entries {
            let user_name = entry
                .get("user_name")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    RlError::UnexpectedResponse(
                        "stat leaderboard entry is missing \"user_name\"".to_owned(),
                    )
                })?;
            let user_id = entry
                .get("user_id")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let value = entry
                .get(stat.as_str())
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    RlError::UnexpectedResponse(format!(
                        "stat leaderboard entry is missing its {:?} value",
                        stat.as_str()
                    ))
                })?;
            players.push(StatLeaderboardPlayer {
                platform,
                stat,
                user_id: unwrap_user_id(platform, user_id),
                user_name: user_name.to_owned(),
                value,
            });
        }
        Ok(Self {
            platform,
            stat,
            players,
        })
    }
}
