use crate::model::{Activity, CUSTOM_STATUS_TYPE};

/// Pick the activity to display.
///
/// A custom-status entry with a non-empty assets object wins over Spotify
/// playback; anything else is never shown.
pub fn select_activity(activities: &[Activity]) -> Option<&Activity> {
    activities
        .iter()
        .find(|a| a.kind == CUSTOM_STATUS_TYPE && a.has_assets())
        .or_else(|| activities.iter().find(|a| a.is_spotify()))
}
