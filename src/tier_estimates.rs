//! Tier/division estimation from a continuous skill rating.
//!
//! The API reports `tier == 0` for players it considers unranked; given a
//! breakdown table for the playlist, the estimator places their skill
//! rating into the nearest tier/division bucket. For ranked and estimated
//! positions alike it also computes how many points separate the player
//! from the adjacent division and tier boundaries.

use std::collections::BTreeMap;
use std::fmt;

use crate::breakdown::PlaylistBreakdown;
use crate::player::{DIVISION_NAMES, RANK_NAMES};


/// Estimated rank position plus signed point-distances to the surrounding
/// boundaries. A distance is `None` at the extremes (no boundary to cross)
/// or when the breakdown table has no data for the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierEstimate {
    pub tier: i32,
    pub division: i32,
    /// Points to drop a division within the current tier; always negative.
    pub div_down: Option<i64>,
    /// Points to climb a division; always positive.
    pub div_up: Option<i64>,
    /// Points to drop to the lowest division of the current tier.
    pub tier_down: Option<i64>,
    /// Points to reach the top division of the current tier.
    pub tier_up: Option<i64>,
}

impl fmt::Display for TierEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match RANK_NAMES.get(self.tier as usize) {
            Some(rank) if self.tier == 0 => f.write_str(rank),
            Some(rank) => match DIVISION_NAMES.get(self.division as usize) {
                Some(division) => write!(f, "{rank} Div {division}"),
                None => f.write_str(rank),
            },
            None => f.write_str("Unknown"),
        }
    }
}

/// Estimate the rank position for one playlist.
///
/// A non-zero `tier` is taken as-is and only the boundary distances are
/// computed. A zero tier with an empty breakdown falls back to the
/// playlist's own values with no distances.
pub fn estimate(
    tier: i32,
    division: i32,
    skill: i64,
    tier_max: i32,
    breakdown: &PlaylistBreakdown,
) -> TierEstimate {
    let (tier, division) = if tier == 0 {
        estimate_current(skill, tier, division, tier_max, breakdown)
    } else {
        (tier, division)
    };
    TierEstimate {
        tier,
        division,
        div_down: estimate_div_down(tier, division, skill, breakdown),
        div_up: estimate_div_up(tier, division, skill, tier_max, breakdown),
        tier_down: estimate_tier_down(tier, division, skill, breakdown),
        tier_up: estimate_tier_up(tier, skill, tier_max, breakdown),
    }
}

fn divisions_of(breakdown: &PlaylistBreakdown, tier: i32) -> Option<&BTreeMap<u8, [f64; 2]>> {
    breakdown.get(&u8::try_from(tier).ok()?)
}

fn range_of(breakdown: &PlaylistBreakdown, tier: i32, division: i32) -> Option<[f64; 2]> {
    divisions_of(breakdown, tier)?
        .get(&u8::try_from(division).ok()?)
        .copied()
}

fn estimate_div_down(
    tier: i32,
    division: i32,
    skill: i64,
    breakdown: &PlaylistBreakdown,
) -> Option<i64> {
    if tier == 0 || (tier == 1 && division == 0) {
        return None;
    }
    let [begin, _] = range_of(breakdown, tier, division)?;
    let div_down = (begin - skill as f64).ceil() as i64;
    Some(if div_down >= 0 { -1 } else { div_down })
}

fn estimate_div_up(
    tier: i32,
    division: i32,
    skill: i64,
    tier_max: i32,
    breakdown: &PlaylistBreakdown,
) -> Option<i64> {
    if tier == 0 || tier == tier_max {
        return None;
    }
    let target = if tier == 0 && division == 0 {
        // unranked baseline climbs into the second division
        range_of(breakdown, tier, 1)?[0]
    } else {
        range_of(breakdown, tier, division)?[1]
    };
    let div_up = (target - skill as f64).ceil() as i64;
    Some(if div_up <= 0 { 1 } else { div_up })
}

fn estimate_tier_down(
    tier: i32,
    _division: i32,
    skill: i64,
    breakdown: &PlaylistBreakdown,
) -> Option<i64> {
    if tier == 0 || tier == 1 {
        return None;
    }
    let [begin, _] = range_of(breakdown, tier, 0)?;
    let tier_down = (begin - skill as f64).ceil() as i64;
    Some(if tier_down >= 0 { -1 } else { tier_down })
}

fn estimate_tier_up(
    tier: i32,
    skill: i64,
    tier_max: i32,
    breakdown: &PlaylistBreakdown,
) -> Option<i64> {
    if tier == 0 || tier == tier_max {
        return None;
    }
    let [_, end] = range_of(breakdown, tier, 3)?;
    let tier_up = (end - skill as f64).ceil() as i64;
    Some(if tier_up <= 0 { 1 } else { tier_up })
}

/// Place an unranked skill rating into the nearest breakdown bucket.
///
/// An exact containing bucket wins outright. Otherwise the bucket edge
/// closest to the skill rating wins, with the candidate division shifted
/// one step toward that edge; later buckets overwrite on equal distance,
/// and `BTreeMap` iteration keeps that tie-break deterministic in
/// ascending (tier, division) order.
fn estimate_current(
    skill: i64,
    fallback_tier: i32,
    fallback_division: i32,
    tier_max: i32,
    breakdown: &PlaylistBreakdown,
) -> (i32, i32) {
    let skill = skill as f64;
    let mut best: Option<(f64, i32, i32)> = None;
    for (&tier, divisions) in breakdown {
        for (&division, &[begin, end]) in divisions {
            if begin <= skill && skill <= end {
                return (i32::from(tier), i32::from(division));
            }
            let to_begin = (skill - begin).abs();
            let to_end = (skill - end).abs();
            // tie between the two edges prefers the begin side
            let (diff, shift) = if to_begin <= to_end {
                (to_begin, -1)
            } else {
                (to_end, 1)
            };
            if best.map_or(true, |(lowest, _, _)| diff <= lowest) {
                best = Some((diff, i32::from(tier), i32::from(division) + shift));
            }
        }
    }
    match best {
        Some((_, tier, division)) => normalize(tier, division, tier_max),
        None => (fallback_tier, fallback_division),
    }
}

/// Roll a shifted-out-of-range division into the adjacent tier, clamped to
/// the (tier 1, division 0) floor and the `tier_max` ceiling.
fn normalize(tier: i32, division: i32, tier_max: i32) -> (i32, i32) {
    if division == -1 {
        if tier - 1 < 1 {
            (1, 0)
        } else {
            (tier - 1, 3)
        }
    } else if division == 4 {
        if tier + 1 > tier_max {
            (tier_max, 0)
        } else {
            (tier + 1, 0)
        }
    } else {
        (tier, division)
    }
}
