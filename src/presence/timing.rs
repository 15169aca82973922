use serde::Serialize;

use crate::model::{Activity, Timestamps};

const MS_PER_SECOND: i64 = 1000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Time line shown under an activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ActivityTime {
    /// `HH:MM:SS elapsed` since the activity started.
    Elapsed(String),
    /// Position within the currently playing track.
    Playback(PlaybackProgress),
}

/// Progress through a playing track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackProgress {
    pub current_time: String,
    pub total_time: String,
    /// Percent complete, always within `0.0..=100.0`.
    pub progress: f64,
    pub is_finished: bool,
}

/// Derive the time line for `activity` at `now` (epoch ms).
///
/// Returns `None` when the activity has no start timestamp. Spotify playback
/// without a usable end timestamp also yields `None`; it does not fall back
/// to elapsed time.
pub fn derive_time(activity: &Activity, now: i64) -> Option<ActivityTime> {
    let start = activity.start()?;
    if activity.is_spotify() {
        activity
            .timestamps
            .and_then(|t| playback_progress(t, now))
            .map(ActivityTime::Playback)
    } else {
        Some(ActivityTime::Elapsed(format_elapsed(start, now)))
    }
}

/// Format the time since `start` as zero-padded `HH:MM:SS elapsed`.
///
/// Hours are not wrapped at 24.
pub fn format_elapsed(start: i64, now: i64) -> String {
    let difference = now - start;
    let hours = difference.div_euclid(MS_PER_HOUR);
    let rest = difference - hours * MS_PER_HOUR;
    let minutes = rest / MS_PER_MINUTE;
    let seconds = (rest - minutes * MS_PER_MINUTE) / MS_PER_SECOND;
    format!("{hours:02}:{minutes:02}:{seconds:02} elapsed")
}

/// Format a track position as `m:ss`.
pub fn format_track_time(ms: i64) -> String {
    let seconds = ms.div_euclid(MS_PER_SECOND);
    let minutes = seconds.div_euclid(60);
    let remaining = seconds.rem_euclid(60);
    format!("{minutes}:{remaining:02}")
}

/// Compute playback progress, or `None` if either timestamp is missing or
/// the track has no positive duration.
pub fn playback_progress(timestamps: Timestamps, now: i64) -> Option<PlaybackProgress> {
    let start = timestamps.start?;
    let end = timestamps.end?;
    let duration = end - start;
    if duration <= 0 {
        return None;
    }
    let elapsed = now - start;
    let is_finished = elapsed >= duration;
    let fraction = (elapsed as f64 / duration as f64).clamp(0.0, 1.0);
    let current = if is_finished { duration } else { elapsed.max(0) };

    Some(PlaybackProgress {
        current_time: format_track_time(current),
        total_time: format_track_time(duration),
        progress: fraction * 100.0,
        is_finished,
    })
}
