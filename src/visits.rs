//! Time-gap based segmentation of a user's post history into visits.

use chrono::{DateTime, Duration, Utc};

use crate::{GeoPost, Visit};

/// Date format used in visit window labels.
const WINDOW_DATE_FORMAT: &str = "%Y/%m/%d";

/// Per-post time delta to the previous post. The first post's delta is zero.
///
/// `posts` must be sorted ascending by timestamp.
pub fn time_deltas(posts: &[GeoPost]) -> Vec<Duration> {
    let mut deltas = Vec::with_capacity(posts.len());
    for (idx, post) in posts.iter().enumerate() {
        if idx == 0 {
            deltas.push(Duration::zero());
        } else {
            deltas.push(post.timestamp - posts[idx - 1].timestamp);
        }
    }
    deltas
}

/// Partition a user's time-ordered posts into visits.
///
/// A visit closes whenever the delta to the previous post exceeds
/// `gap_threshold`. The closing visit's window runs from the prior
/// closure's timestamp to the timestamp of the post that triggered the gap,
/// labelled `"{start date} - {end date}"`, with the duration rounded to
/// whole hours.
///
/// If no delta exceeds the threshold, the whole sequence is one closed
/// visit spanning first to last timestamp.
///
/// The trailing visit of a segmented history is never closed by the gap
/// rule, so its `window_label` and `duration_hours` stay `None`.
///
/// The returned visits are a contiguous, order-preserving partition of
/// `posts`: every post appears in exactly one visit.
pub fn segment_visits(user_id: &str, posts: &[GeoPost], gap_threshold: Duration) -> Vec<Visit> {
    if posts.is_empty() {
        return Vec::new();
    }

    let deltas = time_deltas(posts);
    let last = posts.len() - 1;

    let max_delta = deltas.iter().max().copied().unwrap_or_else(Duration::zero);
    if max_delta <= gap_threshold {
        let start_time = posts[0].timestamp;
        let end_time = posts[last].timestamp;
        return vec![Visit {
            user_id: user_id.to_string(),
            start_time,
            end_time,
            window_label: Some(window_label(start_time, end_time)),
            duration_hours: Some(rounded_hours(end_time - start_time)),
            posts: posts.to_vec(),
        }];
    }

    let mut visits = Vec::new();
    let mut open_from = 0;
    let mut window_start = posts[0].timestamp;

    for (idx, delta) in deltas.iter().enumerate() {
        if *delta > gap_threshold {
            // The triggering post closes the window but belongs to the
            // next visit.
            let window_end = posts[idx].timestamp;
            visits.push(Visit {
                user_id: user_id.to_string(),
                start_time: window_start,
                end_time: window_end,
                window_label: Some(window_label(window_start, window_end)),
                duration_hours: Some(rounded_hours(window_end - window_start)),
                posts: posts[open_from..idx].to_vec(),
            });
            open_from = idx;
            window_start = window_end;
        }
    }

    // Trailing open visit: the gap rule never fires again, so no label or
    // duration is assigned.
    visits.push(Visit {
        user_id: user_id.to_string(),
        start_time: window_start,
        end_time: posts[last].timestamp,
        window_label: None,
        duration_hours: None,
        posts: posts[open_from..].to_vec(),
    });

    visits
}

/// Keep posts whose timestamp falls in the half-open window `[start, end)`.
pub fn filter_time_window(
    posts: &[GeoPost],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<GeoPost> {
    posts
        .iter()
        .filter(|post| post.timestamp >= start && post.timestamp < end)
        .cloned()
        .collect()
}

fn window_label(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "{} - {}",
        start.format(WINDOW_DATE_FORMAT),
        end.format(WINDOW_DATE_FORMAT)
    )
}

fn rounded_hours(duration: Duration) -> i64 {
    (duration.num_seconds() as f64 / 3600.0).round() as i64
}
