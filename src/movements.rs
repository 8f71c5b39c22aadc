//! Per-user movement aggregation.
//!
//! Orchestrates the full reconstruction pass: region classification, site
//! flagging against the buffered target boundary, visit segmentation, home
//! ranking, pre-arrival post selection and great-circle routing, producing
//! one [`UserMovementRecord`] per qualifying user.
//!
//! User groups depend only on their own posts plus the shared read-only
//! indices, so aggregation runs per group independently; the `parallel`
//! feature distributes groups across a rayon pool.

use std::collections::BTreeMap;

use chrono::Duration;
use log::{info, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::classify::{assign_region_codes, flag_target_site};
use crate::error::{ensure_crs_match, Result};
use crate::great_circle::chain_route;
use crate::region_index::RegionIndex;
use crate::visits::{filter_time_window, segment_visits};
use crate::{FlowConfig, GeoPost, PostSet, RegionSet, Route, UserMovementRecord, Visit};

/// Sentinel attribute for a missing second-ranked home region.
pub const NO_REGION: &str = "N/A";

/// Counters accumulated over one reconstruction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationStats {
    /// Distinct users observed in the input
    pub users_seen: usize,
    /// Movement records emitted
    pub records_emitted: usize,
    /// Users whose first recorded activity is at the target site, plus
    /// users under the minimum post count
    pub arrived_with_no_prior: usize,
    /// Users with no post inside the target site at all
    pub no_target_arrival: usize,
}

/// Complete output of a movement-reconstruction pass.
#[derive(Debug, Clone)]
pub struct FlowSummary {
    /// One record per qualifying user, in user-id order
    pub records: Vec<UserMovementRecord>,
    /// Visit segmentation of each user's post history
    pub visits: BTreeMap<String, Vec<Visit>>,
    /// Batch counters
    pub stats: AggregationStats,
}

enum UserOutcome {
    Record(Box<UserMovementRecord>),
    NoPrior,
    NoArrival,
}

/// Reconstruct movement records for every user in the post set.
///
/// Validates that posts, regions and the target site share a coordinate
/// reference system, classifies posts lacking a region code, flags posts
/// inside the buffered site boundary, then aggregates each user's history
/// independently. A user that cannot produce a record is counted in the
/// stats and skipped; it never aborts the remaining users.
pub fn reconstruct_movements(
    posts: &PostSet,
    regions: &RegionSet,
    target_site: &RegionSet,
    config: &FlowConfig,
) -> Result<FlowSummary> {
    ensure_crs_match(&posts.crs, &regions.crs)?;
    ensure_crs_match(&posts.crs, &target_site.crs)?;

    let region_index = RegionIndex::build(regions)?;
    let classified = assign_region_codes(posts, regions, &region_index)?;

    let buffered_site = target_site.buffered(config.buffer_degrees);
    let site_index = RegionIndex::build(&buffered_site)?;
    let flagged = flag_target_site(&classified, &buffered_site, &site_index)?;

    // Group posts per user; BTreeMap keeps user order deterministic.
    let mut by_user: BTreeMap<String, Vec<GeoPost>> = BTreeMap::new();
    for post in flagged.posts {
        by_user.entry(post.user_id.clone()).or_default().push(post);
    }

    let groups: Vec<(String, Vec<GeoPost>)> = by_user
        .into_iter()
        .map(|(user_id, mut user_posts)| {
            user_posts.sort_by_key(|post| post.timestamp);
            if let Some((start, end)) = config.time_window {
                user_posts = filter_time_window(&user_posts, start, end);
            }
            (user_id, user_posts)
        })
        .collect();

    let gap_threshold = Duration::seconds((config.gap_threshold_hours * 3600.0) as i64);

    #[cfg(feature = "parallel")]
    let outcomes: Vec<(String, Vec<Visit>, UserOutcome)> = groups
        .par_iter()
        .map(|(user_id, user_posts)| {
            let user_visits = segment_visits(user_id, user_posts, gap_threshold);
            let outcome = aggregate_user(user_id, user_posts, config);
            (user_id.clone(), user_visits, outcome)
        })
        .collect();

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<(String, Vec<Visit>, UserOutcome)> = groups
        .iter()
        .map(|(user_id, user_posts)| {
            let user_visits = segment_visits(user_id, user_posts, gap_threshold);
            let outcome = aggregate_user(user_id, user_posts, config);
            (user_id.clone(), user_visits, outcome)
        })
        .collect();

    let mut records = Vec::new();
    let mut visits = BTreeMap::new();
    let mut stats = AggregationStats::default();

    for (user_id, user_visits, outcome) in outcomes {
        stats.users_seen += 1;
        visits.insert(user_id.clone(), user_visits);
        match outcome {
            UserOutcome::Record(record) => {
                stats.records_emitted += 1;
                records.push(*record);
            }
            UserOutcome::NoPrior => stats.arrived_with_no_prior += 1,
            UserOutcome::NoArrival => {
                warn!("user '{}' has no post inside the target site", user_id);
                stats.no_target_arrival += 1;
            }
        }
    }

    info!(
        "reconstructed {} movement records from {} users ({} with no prior location, {} never at target site)",
        stats.records_emitted, stats.users_seen, stats.arrived_with_no_prior, stats.no_target_arrival
    );

    Ok(FlowSummary {
        records,
        visits,
        stats,
    })
}

/// Aggregate one user's time-ordered posts into a movement outcome.
fn aggregate_user(user_id: &str, posts: &[GeoPost], config: &FlowConfig) -> UserOutcome {
    if posts.len() <= config.min_posts {
        return UserOutcome::NoPrior;
    }

    // Rank regions by post frequency; unclassified posts are excluded.
    // Ties break toward the lexicographically smaller code.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for post in posts {
        if let Some(code) = post.region_code.as_deref() {
            *counts.entry(code).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let Some(&(home1, count1)) = ranked.first() else {
        // No classified post anywhere, so no home region to travel from.
        return UserOutcome::NoPrior;
    };
    let (home2, count2) = ranked
        .get(1)
        .map(|&(code, count)| (code.to_string(), count))
        .unwrap_or_else(|| (NO_REGION.to_string(), 0));

    // First arrival at the target site.
    let Some(arrival) = posts
        .iter()
        .find(|post| post.within_target_site == Some(true))
    else {
        return UserOutcome::NoArrival;
    };

    // The previous location is the chronologically last home-region post
    // outside the site boundary.
    let Some(previous) = posts.iter().rev().find(|post| {
        post.region_code.as_deref() == Some(home1) && post.within_target_site != Some(true)
    }) else {
        return UserOutcome::NoPrior;
    };

    let days_between = (arrival.timestamp - previous.timestamp).num_days();

    let path = chain_route(&[previous.location, arrival.location], config.step_km);
    let route = Route::new(path);
    let distance_km = route.length_km();

    let total = (count1 + count2) as f64;
    UserOutcome::Record(Box::new(UserMovementRecord {
        user_id: user_id.to_string(),
        post_count: posts.len(),
        route,
        distance_km,
        time_before_arrival: previous.timestamp,
        arrival_time: arrival.timestamp,
        days_between,
        home_region_1: home1.to_string(),
        home_count_1: count1,
        home_region_2: home2,
        home_count_2: count2,
        home_pct_1: count1 as f64 / total,
        home_pct_2: count2 as f64 / total,
    }))
}
