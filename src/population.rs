//! Player population across platforms and playlists.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::enums::{Platform, PlaylistId};
use crate::error::{Result, RlError};

#[derive(Debug, Clone, Deserialize)]
struct PopulationEntryRecord {
    #[serde(rename = "PlaylistID")]
    playlist_id: u32,
    #[serde(rename = "NumPlayers")]
    num_players: u64,
}

/// Per-platform, per-playlist player counts, keyed by raw playlist id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Population {
    pub platforms: BTreeMap<Platform, BTreeMap<u32, u64>>,
}

impl Population {
    /// The population payload is keyed by platform display name; entries
    /// for platforms this library doesn't know are logged and skipped.
    pub(crate) fn from_raw(body: &Value) -> Result<Self> {
        let map = body.as_object().ok_or_else(|| {
            RlError::UnexpectedResponse("population response is not a JSON object".to_owned())
        })?;

        let mut platforms = BTreeMap::new();
        for (name, entries) in map {
            let Some(platform) = Platform::from_display_name(name) else {
                warn!(platform = %name, "unknown platform in population response");
                continue;
            };
            let records: Vec<PopulationEntryRecord> = serde_json::from_value(entries.clone())?;
            let counts = records
                .into_iter()
                .map(|record| (record.playlist_id, record.num_players))
                .collect();
            platforms.insert(platform, counts);
        }
        Ok(Self { platforms })
    }

    /// One playlist's population summed across platforms.
    pub fn playlist_population(&self, playlist: impl Into<PlaylistId>) -> PlaylistPopulation {
        let playlist = playlist.into();
        let by_platform: BTreeMap<Platform, u64> = self
            .platforms
            .iter()
            .filter_map(|(platform, counts)| {
                counts.get(&playlist.id()).map(|count| (*platform, *count))
            })
            .collect();
        PlaylistPopulation {
            playlist,
            total: by_platform.values().sum(),
            by_platform,
        }
    }
}

/// Cross-platform view of a single playlist's population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistPopulation {
    pub playlist: PlaylistId,
    pub by_platform: BTreeMap<Platform, u64>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::PlaylistKey;
    use serde_json::json;

    fn population() -> Population {
        Population::from_raw(&json!({
            "Steam": [
                {"PlaylistID": 10, "NumPlayers": 1200},
                {"PlaylistID": 11, "NumPlayers": 4000}
            ],
            "Playstation 4": [
                {"PlaylistID": 11, "NumPlayers": 6000}
            ],
            "Google Stadia": [
                {"PlaylistID": 11, "NumPlayers": 3}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_unknown_platforms_are_skipped() {
        let population = population();
        assert_eq!(population.platforms.len(), 2);
        assert_eq!(population.platforms[&Platform::Steam][&10], 1200);
    }

    #[test]
    fn test_playlist_population_sums_across_platforms() {
        let doubles = population().playlist_population(PlaylistKey::Doubles);
        assert_eq!(doubles.total, 10_000);
        assert_eq!(doubles.by_platform[&Platform::Ps4], 6000);
        assert!(!doubles.by_platform.contains_key(&Platform::Epic));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let err = Population::from_raw(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, RlError::UnexpectedResponse(_)));
    }
}
