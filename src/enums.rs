//! Platform, playlist, and stat enumerations used across the API surface.

use std::fmt;
use std::str::FromStr;

use crate::error::RlError;

/// Platform a player account lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Steam,
    Ps4,
    XboxOne,
    Epic,
    Switch,
}

impl Platform {
    /// Every platform, in the order the multi-platform search walks them.
    pub const ALL: [Platform; 5] = [
        Platform::Steam,
        Platform::Ps4,
        Platform::XboxOne,
        Platform::Epic,
        Platform::Switch,
    ];

    /// Stable code used in API paths and query parameters.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::Ps4 => "ps4",
            Platform::XboxOne => "xboxone",
            Platform::Epic => "epic",
            Platform::Switch => "switch",
        }
    }

    /// Friendly name, as the API prints it in population data and user ids.
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Ps4 => "Playstation 4",
            Platform::XboxOne => "Xbox One",
            Platform::Epic => "Epic Games",
            Platform::Switch => "Nintendo Switch",
        }
    }

    pub(crate) fn from_display_name(name: &str) -> Option<Platform> {
        Platform::ALL
            .into_iter()
            .find(|platform| platform.display_name() == name)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steam" => Ok(Platform::Steam),
            "ps4" | "ps" | "psn" | "playstation" | "playstation 4" => Ok(Platform::Ps4),
            "xboxone" | "xbox" | "xb" | "xb1" | "xbox one" => Ok(Platform::XboxOne),
            "epic" | "epic games" | "epicgames" => Ok(Platform::Epic),
            "switch" | "nintendo" | "nintendo switch" | "nintendoswitch" => Ok(Platform::Switch),
            _ => Err(RlError::UnknownPlatform(s.trim().to_owned())),
        }
    }
}

/// Ranked playlist recognized by this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlaylistKey {
    SoloDuel,
    Doubles,
    Standard,
    Hoops,
    Rumble,
    Dropshot,
    SnowDay,
    /// Used to determine the rank for automatic tournaments.
    Tournaments,
}

impl PlaylistKey {
    /// Numeric playlist id used by the API.
    pub fn id(self) -> u32 {
        match self {
            PlaylistKey::SoloDuel => 10,
            PlaylistKey::Doubles => 11,
            PlaylistKey::Standard => 13,
            PlaylistKey::Hoops => 27,
            PlaylistKey::Rumble => 28,
            PlaylistKey::Dropshot => 29,
            PlaylistKey::SnowDay => 30,
            PlaylistKey::Tournaments => 34,
        }
    }

    pub fn from_id(id: u32) -> Option<PlaylistKey> {
        match id {
            10 => Some(PlaylistKey::SoloDuel),
            11 => Some(PlaylistKey::Doubles),
            13 => Some(PlaylistKey::Standard),
            27 => Some(PlaylistKey::Hoops),
            28 => Some(PlaylistKey::Rumble),
            29 => Some(PlaylistKey::Dropshot),
            30 => Some(PlaylistKey::SnowDay),
            34 => Some(PlaylistKey::Tournaments),
            _ => None,
        }
    }

    /// Friendly playlist name, e.g. "Solo Duel".
    pub fn name(self) -> &'static str {
        match self {
            PlaylistKey::SoloDuel => "Solo Duel",
            PlaylistKey::Doubles => "Doubles",
            PlaylistKey::Standard => "Standard",
            PlaylistKey::Hoops => "Hoops",
            PlaylistKey::Rumble => "Rumble",
            PlaylistKey::Dropshot => "Dropshot",
            PlaylistKey::SnowDay => "Snow Day",
            PlaylistKey::Tournaments => "Tournaments",
        }
    }
}

impl fmt::Display for PlaylistKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Playlist key as reported by the API. The server occasionally introduces
/// playlists this library doesn't know yet; those are preserved as raw ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaylistId {
    Known(PlaylistKey),
    Unknown(u32),
}

impl PlaylistId {
    pub fn from_id(id: u32) -> PlaylistId {
        match PlaylistKey::from_id(id) {
            Some(key) => PlaylistId::Known(key),
            None => PlaylistId::Unknown(id),
        }
    }

    pub fn id(self) -> u32 {
        match self {
            PlaylistId::Known(key) => key.id(),
            PlaylistId::Unknown(id) => id,
        }
    }
}

impl From<PlaylistKey> for PlaylistId {
    fn from(key: PlaylistKey) -> Self {
        PlaylistId::Known(key)
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistId::Known(key) => key.fmt(f),
            PlaylistId::Unknown(id) => write!(f, "Playlist {id}"),
        }
    }
}

/// Lifetime counter tracked by the stat leaderboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Assists,
    Goals,
    Mvps,
    Saves,
    Shots,
    Wins,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Assists,
        Stat::Goals,
        Stat::Mvps,
        Stat::Saves,
        Stat::Shots,
        Stat::Wins,
    ];

    /// Stable code used in API paths and response payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Stat::Assists => "assists",
            Stat::Goals => "goals",
            Stat::Mvps => "mvps",
            Stat::Saves => "saves",
            Stat::Shots => "shots",
            Stat::Wins => "wins",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_codes_are_stable() {
        assert_eq!(Platform::Steam.as_str(), "steam");
        assert_eq!(Platform::Ps4.as_str(), "ps4");
        assert_eq!(Platform::XboxOne.as_str(), "xboxone");
        assert_eq!(Platform::Epic.as_str(), "epic");
        assert_eq!(Platform::Switch.as_str(), "switch");
    }

    #[test]
    fn test_platform_display_uses_friendly_name() {
        assert_eq!(Platform::Ps4.to_string(), "Playstation 4");
        assert_eq!(Platform::Switch.to_string(), "Nintendo Switch");
    }

    #[test]
    fn test_platform_from_str_accepts_aliases() {
        assert_eq!("steam".parse::<Platform>().unwrap(), Platform::Steam);
        assert_eq!("PSN".parse::<Platform>().unwrap(), Platform::Ps4);
        assert_eq!("Xbox One".parse::<Platform>().unwrap(), Platform::XboxOne);
        assert_eq!("epic games".parse::<Platform>().unwrap(), Platform::Epic);
        assert_eq!("nintendo".parse::<Platform>().unwrap(), Platform::Switch);
        assert!(matches!(
            "dreamcast".parse::<Platform>(),
            Err(RlError::UnknownPlatform(name)) if name == "dreamcast"
        ));
    }

    #[test]
    fn test_platform_round_trips_display_name() {
        for platform in Platform::ALL {
            assert_eq!(
                Platform::from_display_name(platform.display_name()),
                Some(platform)
            );
        }
        assert_eq!(Platform::from_display_name("Stadia"), None);
    }

    #[test]
    fn test_playlist_key_ids_round_trip() {
        for key in [
            PlaylistKey::SoloDuel,
            PlaylistKey::Doubles,
            PlaylistKey::Standard,
            PlaylistKey::Hoops,
            PlaylistKey::Rumble,
            PlaylistKey::Dropshot,
            PlaylistKey::SnowDay,
            PlaylistKey::Tournaments,
        ] {
            assert_eq!(PlaylistKey::from_id(key.id()), Some(key));
        }
        assert_eq!(PlaylistKey::from_id(12), None);
    }

    #[test]
    fn test_playlist_id_preserves_unknown_ids() {
        assert_eq!(
            PlaylistId::from_id(11),
            PlaylistId::Known(PlaylistKey::Doubles)
        );
        assert_eq!(PlaylistId::from_id(99), PlaylistId::Unknown(99));
        assert_eq!(PlaylistId::from_id(99).id(), 99);
        assert_eq!(PlaylistId::Unknown(99).to_string(), "Playlist 99");
        assert_eq!(PlaylistId::from_id(30).to_string(), "Snow Day");
    }

    #[test]
    fn test_stat_codes_match_api_payloads() {
        assert_eq!(Stat::Mvps.as_str(), "mvps");
        assert_eq!(Stat::ALL.len(), 6);
    }
}
