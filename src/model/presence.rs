use serde::{Deserialize, Serialize};

/// Activity `type` for a custom status entry.
pub const CUSTOM_STATUS_TYPE: u8 = 0;

/// Activity `type` for media playback (listening).
pub const MEDIA_PLAYBACK_TYPE: u8 = 2;

/// Online status reported for the user.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DiscordStatus {
    Online,
    Idle,
    Dnd,
    #[default]
    Offline,
}

/// A user's live presence: status plus the activities they are running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    #[serde(rename = "discord_status", default)]
    pub status: DiscordStatus,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub discord_user: Option<DiscordUser>,
}

/// The Discord account behind a presence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A rich-presence activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub timestamps: Option<Timestamps>,
    #[serde(default)]
    pub assets: Option<Assets>,
}

/// Start and end of an activity, in epoch milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

/// Image keys attached to an activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub large_image: Option<String>,
    #[serde(default)]
    pub small_image: Option<String>,
    #[serde(default)]
    pub large_text: Option<String>,
    #[serde(default)]
    pub small_text: Option<String>,
}

impl Activity {
    /// Start timestamp, if the activity carries one.
    pub fn start(&self) -> Option<i64> {
        self.timestamps.and_then(|t| t.start)
    }

    /// Whether this is the Spotify listening activity.
    pub fn is_spotify(&self) -> bool {
        self.kind == MEDIA_PLAYBACK_TYPE && self.name.as_deref() == Some("Spotify")
    }

    /// Whether the activity carries a non-empty assets object.
    pub fn has_assets(&self) -> bool {
        self.assets.as_ref().is_some_and(|a| !a.is_empty())
    }
}

impl Assets {
    /// True when no image key or hover text is set.
    pub fn is_empty(&self) -> bool {
        [
            &self.large_image,
            &self.small_image,
            &self.large_text,
            &self.small_text,
        ]
        .into_iter()
        .all(|field| field.as_deref().unwrap_or_default().is_empty())
    }
}
