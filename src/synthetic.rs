//! Synthetic post-history generator for tests and benchmarks.
//!
//! Generates deterministic user histories with a known home region and a
//! known target site, providing ground truth for validation of the
//! aggregation pipeline.
//!
//! # Example
//!
//! ```rust
//! use visitflow::synthetic::SyntheticScenario;
//!
//! let dataset = SyntheticScenario::default().generate();
//! assert_eq!(dataset.posts.len(), 10 * 30);
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{GeoPoint, GeoPost, PostSet, Region, RegionSet};

/// 2015-01-01T00:00:00Z, the base timestamp of all generated histories.
const BASE_TIMESTAMP: i64 = 1_420_070_400;

/// Scenario configuration for generating synthetic data.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Number of users to generate.
    pub user_count: usize,
    /// Posts per user; the last two land inside the target site.
    pub posts_per_user: usize,
    /// Center of the synthetic home region.
    pub home_center: GeoPoint,
    /// Center of the synthetic target site.
    pub site_center: GeoPoint,
    /// Uniform coordinate jitter around each cluster center, in degrees.
    pub scatter_degrees: f64,
    /// Hours between consecutive posts of one user.
    pub post_interval_hours: i64,
    /// RNG seed for deterministic reproduction.
    pub seed: u64,
}

impl Default for SyntheticScenario {
    fn default() -> Self {
        Self {
            user_count: 10,
            posts_per_user: 30,
            home_center: GeoPoint::new(60.17, 24.94),
            site_center: GeoPoint::new(-24.99, 31.55),
            scatter_degrees: 0.3,
            post_interval_hours: 6,
            seed: 42,
        }
    }
}

/// A complete synthetic dataset with ground truth.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    /// Generated posts for all users.
    pub posts: PostSet,
    /// Region collection holding the home region and the site's country.
    pub regions: RegionSet,
    /// Target-site boundary (unbuffered).
    pub target_site: RegionSet,
}

impl SyntheticScenario {
    /// Generate the dataset described by this scenario.
    pub fn generate(&self) -> SyntheticDataset {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let base = DateTime::<Utc>::from_timestamp(BASE_TIMESTAMP, 0).unwrap_or_default();

        let mut posts = Vec::with_capacity(self.user_count * self.posts_per_user);
        for user in 0..self.user_count {
            let user_id = format!("user-{user}");
            let site_posts = 2.min(self.posts_per_user);
            let home_posts = self.posts_per_user - site_posts;

            for index in 0..self.posts_per_user {
                let center = if index < home_posts {
                    self.home_center
                } else {
                    self.site_center
                };
                let location = GeoPoint::new(
                    center.latitude + rng.gen_range(-self.scatter_degrees..=self.scatter_degrees),
                    center.longitude + rng.gen_range(-self.scatter_degrees..=self.scatter_degrees),
                );
                let timestamp =
                    base + Duration::hours(self.post_interval_hours * index as i64);
                posts.push(GeoPost::new(&user_id, timestamp, location));
            }
        }

        let regions = RegionSet::wgs84(
            [
                ("HOME", self.home_center, 1.0),
                ("SITE_COUNTRY", self.site_center, 1.0),
            ]
            .into_iter()
            .filter_map(|(attribute, center, half)| {
                Region::new(attribute, square_ring(center, half))
            })
            .collect(),
        );

        let target_site = RegionSet::wgs84(
            Region::new("TARGET_SITE", square_ring(self.site_center, 0.5))
                .into_iter()
                .collect(),
        );

        SyntheticDataset {
            posts: PostSet::wgs84(posts),
            regions,
            target_site,
        }
    }
}

/// Axis-aligned square ring around a center point.
pub fn square_ring(center: GeoPoint, half_degrees: f64) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(center.latitude - half_degrees, center.longitude - half_degrees),
        GeoPoint::new(center.latitude - half_degrees, center.longitude + half_degrees),
        GeoPoint::new(center.latitude + half_degrees, center.longitude + half_degrees),
        GeoPoint::new(center.latitude + half_degrees, center.longitude - half_degrees),
    ]
}
