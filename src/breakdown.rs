//! Tier breakdown tables used by the rank estimation.
//!
//! A breakdown maps playlist id → tier → division → the skill range that
//! defines that bucket. Tables are sourced externally (third-party stat
//! sites) and handed to [`crate::ClientBuilder::tier_breakdown`]; a table
//! may cover only some playlists, tiers, or divisions.

use std::collections::BTreeMap;

/// `[begin, end]` skill range for one division.
pub type DivisionRange = [f64; 2];

/// Breakdown for a single playlist: tier → division → skill range.
///
/// `BTreeMap` keeps iteration in ascending (tier, division) order, which
/// makes the nearest-bucket tie-break in the estimator deterministic.
pub type PlaylistBreakdown = BTreeMap<u8, BTreeMap<u8, DivisionRange>>;

/// Full breakdown table: playlist id → playlist breakdown. Playlist ids are
/// `u32` because the server introduces new playlists with ids this library
/// has never seen.
///
/// serde_json maps integer keys to JSON string keys in both directions, so
/// this deserializes straight from the JSON shape the breakdown providers
/// produce.
pub type TierBreakdown = BTreeMap<u32, PlaylistBreakdown>;
