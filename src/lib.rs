//! Rocket League Statistics API Client
//!
//! An async Rust client for the Rocket League player-statistics API,
//! resolving player identities across platforms, retrieving their ranked
//! playlist stats, and deriving rank/progress information from raw skill
//! ratings.
//!
//! ## Features
//!
//! - **Identity Resolution**: Classify identifiers per platform, including
//!   Steam vanity URLs, profile URLs, and bare steamID64s
//! - **Batch Lookups**: Pack many lookups into as few requests as the
//!   server's dynamically discovered query limit allows
//! - **Token Lifecycle**: OAuth2 client-credentials grant with expiry
//!   tracking and transparent refresh on 401
//! - **Rank Estimation**: Place unranked skill ratings into tier/division
//!   buckets from a caller-supplied breakdown table, with point-distances
//!   to the surrounding boundaries
//! - **Leaderboards & Population**: Skill/stat leaderboards and per-playlist
//!   player counts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rl_stats::{Client, Platform};
//!
//! # async fn example() -> rl_stats::Result<()> {
//! let client = Client::new("client_id", "client_secret")?;
//!
//! let player = client
//!     .get_player_by_id(Platform::Steam, "76561198012345678")
//!     .await?;
//! println!("{}: highest tier {}", player.user_name, player.highest_tier);
//! # Ok(())
//! # }
//! ```
//!
//! The crate emits [`tracing`] events but never installs a subscriber;
//! logging configuration belongs to the application.

mod auth;
mod batch;
mod http;
mod identity;

pub mod breakdown;
pub mod client;
pub mod enums;
pub mod error;
pub mod leaderboard;
pub mod player;
pub mod player_titles;
pub mod population;
pub mod tier_estimates;

// Re-export commonly used types
pub use breakdown::{DivisionRange, PlaylistBreakdown, TierBreakdown};
pub use client::{Client, ClientBuilder};
pub use enums::{Platform, PlaylistId, PlaylistKey, Stat};
pub use error::{Result, RlError};
pub use leaderboard::{
    SkillLeaderboard, SkillLeaderboardPlayer, StatLeaderboard, StatLeaderboardPlayer,
};
pub use player::{Player, PlayerStats, Playlist, SeasonRewards};
pub use player_titles::PlayerTitle;
pub use population::{PlaylistPopulation, Population};
pub use tier_estimates::TierEstimate;
