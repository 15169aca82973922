//! Discord presence panel: activity selection, time lines and asset images.

mod assets;
mod selection;
mod timing;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

pub use assets::resolve_asset_url;
pub use selection::select_activity;
pub use timing::{
    derive_time, format_elapsed, format_track_time, playback_progress, ActivityTime,
    PlaybackProgress,
};

use crate::client::WidgetClient;
use crate::model::{Activity, DiscordStatus, PresenceRecord};
use crate::ticker::{Ticker, TICK_PERIOD};

/// Name shown when none is configured.
pub const DEFAULT_USERNAME: &str = "peperclipp";

/// Shown in the activity slot when nothing is selected.
pub const NO_STATUS_MESSAGE: &str = "No status!";

/// Lead-in of the notice shown when presence cannot be loaded.
pub const UNAVAILABLE_MESSAGE: &str = "Discord presence not available. To enable this feature:";

/// Steps that opt a Discord account into Lanyard.
pub const OPT_IN_STEPS: [&str; 4] = [
    "Join the Lanyard Discord server: https://discord.gg/lanyard",
    "Run the command: /subscribe",
    "Make sure Discord Rich Presence is enabled in Discord Settings → Activity Privacy",
    "Connect Spotify in Discord Settings → Connections → Spotify",
];

/// Source of "now" in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(|| Utc::now().timestamp_millis())
}

/// Whose presence to show and how to label it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceProps {
    pub user_id: String,
    pub username: String,
    /// Avatar used when the Discord account has none.
    pub avatar_src: Option<String>,
}

impl PresenceProps {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: DEFAULT_USERNAME.to_owned(),
            avatar_src: None,
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn avatar_src(mut self, src: impl Into<String>) -> Self {
        self.avatar_src = Some(src.into());
        self
    }

    pub fn profile_url(&self) -> String {
        format!("https://discord.com/users/{}", self.user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorTone {
    Primary,
    Destructive,
    Muted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorGlyph {
    /// Small filled dot (idle).
    Dot,
    /// Horizontal bar (do not disturb).
    Bar,
    /// Hollow ring (offline).
    Ring,
}

/// Badge drawn over the avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub tone: IndicatorTone,
    pub glyph: Option<IndicatorGlyph>,
}

impl From<DiscordStatus> for StatusIndicator {
    fn from(status: DiscordStatus) -> Self {
        let (tone, glyph) = match status {
            DiscordStatus::Online => (IndicatorTone::Primary, None),
            DiscordStatus::Idle => (IndicatorTone::Primary, Some(IndicatorGlyph::Dot)),
            DiscordStatus::Dnd => (IndicatorTone::Destructive, Some(IndicatorGlyph::Bar)),
            DiscordStatus::Offline => (IndicatorTone::Muted, Some(IndicatorGlyph::Ring)),
        };
        Self { tone, glyph }
    }
}

/// The selected activity, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityCard {
    pub name: Option<String>,
    pub details: Option<String>,
    pub state: Option<String>,
    /// Empty when there is no image.
    pub large_image_url: String,
    /// Only present when the activity has a small image key.
    pub small_image_url: Option<String>,
    /// Hover text for the large image.
    pub large_text: Option<String>,
    /// Hover text for the small image.
    pub small_text: Option<String>,
    pub time: Option<ActivityTime>,
}

impl ActivityCard {
    pub fn build(activity: &Activity, time: Option<ActivityTime>) -> Self {
        let app_id = activity.application_id.as_deref();
        let assets = activity.assets.as_ref();
        let large = assets.and_then(|a| a.large_image.as_deref());
        let small = assets.and_then(|a| a.small_image.as_deref());

        Self {
            name: activity.name.clone(),
            details: activity.details.clone(),
            state: activity.state.clone(),
            large_image_url: resolve_asset_url(large, app_id),
            small_image_url: small
                .filter(|s| !s.is_empty())
                .map(|s| resolve_asset_url(Some(s), app_id)),
            large_text: assets.and_then(|a| a.large_text.clone()),
            small_text: assets.and_then(|a| a.small_text.clone()),
            time,
        }
    }
}

/// A loaded presence panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresencePanel {
    pub status: DiscordStatus,
    pub indicator: StatusIndicator,
    pub avatar_url: Option<String>,
    /// Initial shown when no avatar image loads.
    pub avatar_fallback: String,
    pub profile_url: String,
    pub display_name: String,
    pub account_name: String,
    /// `None` renders [`NO_STATUS_MESSAGE`].
    pub activity: Option<ActivityCard>,
}

impl PresencePanel {
    pub fn build(props: &PresenceProps, record: &PresenceRecord, time: Option<ActivityTime>) -> Self {
        let user = record.discord_user.as_ref();
        let avatar_url = user
            .and_then(|u| u.avatar.as_deref())
            .filter(|hash| !hash.is_empty())
            .map(|hash| {
                format!(
                    "https://cdn.discordapp.com/avatars/{}/{hash}.png",
                    props.user_id
                )
            })
            .or_else(|| props.avatar_src.clone());

        Self {
            status: record.status,
            indicator: record.status.into(),
            avatar_url,
            avatar_fallback: props
                .username
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect::<String>())
                .unwrap_or_default(),
            profile_url: props.profile_url(),
            display_name: props.username.clone(),
            account_name: user
                .map(|u| u.username.clone())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| props.username.clone()),
            activity: select_activity(&record.activities).map(|a| ActivityCard::build(a, time)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PresenceView {
    Loading,
    Unavailable {
        message: &'static str,
        steps: &'static [&'static str],
    },
    Ready(PresencePanel),
}

#[derive(Debug)]
enum PresenceState {
    Loading,
    Failed,
    Loaded(PresenceRecord),
}

/// Discord presence panel with a live time line.
pub struct PresenceWidget {
    client: WidgetClient,
    props: PresenceProps,
    clock: Clock,
    state: PresenceState,
    selected: Option<Activity>,
    ticker: Option<Ticker<Option<ActivityTime>>>,
}

impl fmt::Debug for PresenceWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenceWidget")
            .field("props", &self.props)
            .field("state", &self.state)
            .field("selected", &self.selected)
            .field("ticking", &self.ticker.is_some())
            .finish()
    }
}

impl PresenceWidget {
    pub fn new(client: WidgetClient, props: PresenceProps) -> Self {
        Self {
            client,
            props,
            clock: system_clock(),
            state: PresenceState::Loading,
            selected: None,
            ticker: None,
        }
    }

    /// Replace the wall clock, e.g. for deterministic rendering.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn props(&self) -> &PresenceProps {
        &self.props
    }

    /// Fetch the latest presence and re-derive the panel.
    #[instrument(skip(self), fields(user_id = %self.props.user_id))]
    pub async fn refresh(&mut self) {
        match self.client.get_presence(&self.props.user_id).await {
            Ok(record) => self.apply(record),
            Err(e) => {
                warn!(error = %e, "presence unavailable");
                self.state = PresenceState::Failed;
                self.retarget(None);
            }
        }
    }

    /// Apply a presence record pushed or polled from the presence source.
    ///
    /// Outside a Tokio runtime no ticker runs; the time line is then derived
    /// from the clock on every [`PresenceWidget::view`].
    pub fn apply(&mut self, record: PresenceRecord) {
        let selected = select_activity(&record.activities).cloned();
        self.retarget(selected);
        self.state = PresenceState::Loaded(record);
    }

    /// Swap the ticked activity, disposing of the old ticker first.
    fn retarget(&mut self, next: Option<Activity>) {
        if self.selected == next {
            return;
        }
        self.ticker = None;
        self.selected = next;

        let Some(activity) = self.selected.clone() else {
            return;
        };
        if activity.start().is_none() {
            return;
        }
        debug!(name = ?activity.name, "starting activity ticker");
        let clock = self.clock.clone();
        match Ticker::spawn(TICK_PERIOD, move || derive_time(&activity, clock())) {
            Ok(ticker) => self.ticker = Some(ticker),
            Err(e) => warn!(error = %e, "no runtime for activity ticker"),
        }
    }

    /// Receiver for time-line updates, while a ticking activity is shown.
    pub fn time_updates(&self) -> Option<watch::Receiver<Option<ActivityTime>>> {
        self.ticker.as_ref().map(Ticker::subscribe)
    }

    pub fn view(&self) -> PresenceView {
        match &self.state {
            PresenceState::Loading => PresenceView::Loading,
            PresenceState::Failed => PresenceView::Unavailable {
                message: UNAVAILABLE_MESSAGE,
                steps: &OPT_IN_STEPS,
            },
            PresenceState::Loaded(record) => {
                let time = match &self.ticker {
                    Some(ticker) => ticker.current(),
                    None => self
                        .selected
                        .as_ref()
                        .and_then(|a| derive_time(a, (self.clock)())),
                };
                PresenceView::Ready(PresencePanel::build(&self.props, record, time))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::model::{Assets, DiscordUser, Timestamps, CUSTOM_STATUS_TYPE, MEDIA_PLAYBACK_TYPE};

    fn editor(start: i64) -> Activity {
        Activity {
            kind: CUSTOM_STATUS_TYPE,
            application_id: Some("383226320970055681".to_owned()),
            name: Some("Visual Studio Code".to_owned()),
            details: Some("Editing lib.rs".to_owned()),
            state: Some("Workspace: site".to_owned()),
            timestamps: Some(Timestamps {
                start: Some(start),
                end: None,
            }),
            assets: Some(Assets {
                large_image: Some("mp:external/abc/https/img.test%2Frust.png".to_owned()),
                small_image: Some("565945770067623946".to_owned()),
                large_text: Some("Rust".to_owned()),
                ..Default::default()
            }),
        }
    }

    fn spotify(start: i64, end: Option<i64>) -> Activity {
        Activity {
            kind: MEDIA_PLAYBACK_TYPE,
            name: Some("Spotify".to_owned()),
            details: Some("Track".to_owned()),
            timestamps: Some(Timestamps {
                start: Some(start),
                end,
            }),
            assets: Some(Assets {
                large_image: Some("spotify:cover".to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn record(activities: Vec<Activity>) -> PresenceRecord {
        PresenceRecord {
            status: DiscordStatus::Online,
            activities,
            discord_user: Some(DiscordUser {
                id: "42".to_owned(),
                username: "account".to_owned(),
                avatar: Some("hash".to_owned()),
            }),
        }
    }

    fn fixed_clock() -> (Arc<AtomicI64>, Clock) {
        let now = Arc::new(AtomicI64::new(0));
        let source = now.clone();
        (now, Arc::new(move || source.load(Ordering::SeqCst)))
    }

    fn ready(view: PresenceView) -> PresencePanel {
        match view {
            PresenceView::Ready(panel) => panel,
            other => panic!("expected ready view, got {other:?}"),
        }
    }

    #[test]
    fn test_panel_fields() {
        let props = PresenceProps::new("42").username("eloy");
        let panel = PresencePanel::build(&props, &record(vec![editor(0)]), None);

        assert_eq!(
            panel.avatar_url.as_deref(),
            Some("https://cdn.discordapp.com/avatars/42/hash.png")
        );
        assert_eq!(panel.avatar_fallback, "E");
        assert_eq!(panel.profile_url, "https://discord.com/users/42");
        assert_eq!(panel.display_name, "eloy");
        assert_eq!(panel.account_name, "account");
        assert_eq!(panel.indicator, StatusIndicator::from(DiscordStatus::Online));

        let card = panel.activity.unwrap();
        assert_eq!(card.large_image_url, "https://img.test/rust.png");
        assert_eq!(
            card.small_image_url.as_deref(),
            Some("https://cdn.discordapp.com/app-assets/383226320970055681/565945770067623946")
        );
        assert_eq!(card.large_text.as_deref(), Some("Rust"));
        assert_eq!(card.small_text, None);
    }

    #[test]
    fn test_apply_without_runtime_derives_time_on_view() {
        let (now, clock) = fixed_clock();
        now.store(3_600_000, Ordering::SeqCst);
        let mut widget =
            PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42")).with_clock(clock);

        widget.apply(record(vec![editor(0)]));
        assert!(widget.time_updates().is_none());
        assert_eq!(
            ready(widget.view()).activity.unwrap().time,
            Some(ActivityTime::Elapsed("01:00:00 elapsed".to_owned()))
        );

        now.store(3_601_000, Ordering::SeqCst);
        assert_eq!(
            ready(widget.view()).activity.unwrap().time,
            Some(ActivityTime::Elapsed("01:00:01 elapsed".to_owned()))
        );
    }

    #[test]
    fn test_panel_fallbacks() {
        let props = PresenceProps::new("42").avatar_src("/avatar.png");
        let mut presence = record(vec![]);
        presence.discord_user = None;
        presence.status = DiscordStatus::Dnd;
        let panel = PresencePanel::build(&props, &presence, None);

        assert_eq!(panel.avatar_url.as_deref(), Some("/avatar.png"));
        assert_eq!(panel.account_name, DEFAULT_USERNAME);
        assert_eq!(panel.activity, None);
        assert_eq!(panel.indicator.tone, IndicatorTone::Destructive);
        assert_eq!(panel.indicator.glyph, Some(IndicatorGlyph::Bar));
    }

    #[test]
    fn test_small_image_only_when_keyed() {
        let card = ActivityCard::build(&spotify(0, Some(1)), None);
        assert_eq!(card.large_image_url, "https://i.scdn.co/image/cover");
        assert_eq!(card.small_image_url, None);
    }

    #[tokio::test]
    async fn test_widget_starts_loading() {
        let widget = PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42"));
        assert_eq!(widget.view(), PresenceView::Loading);
        assert!(widget.time_updates().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_ticks() {
        let (now, clock) = fixed_clock();
        now.store(65_000, Ordering::SeqCst);
        let mut widget =
            PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42")).with_clock(clock);

        widget.apply(record(vec![spotify(0, Some(100_000)), editor(0)]));
        let card = ready(widget.view()).activity.unwrap();
        assert_eq!(
            card.time,
            Some(ActivityTime::Elapsed("00:01:05 elapsed".to_owned()))
        );

        now.store(66_000, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        let card = ready(widget.view()).activity.unwrap();
        assert_eq!(
            card.time,
            Some(ActivityTime::Elapsed("00:01:06 elapsed".to_owned()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_progress_ticks() {
        let (now, clock) = fixed_clock();
        now.store(30_000, Ordering::SeqCst);
        let mut widget =
            PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42")).with_clock(clock);

        widget.apply(record(vec![spotify(0, Some(120_000))]));
        let Some(ActivityTime::Playback(progress)) = ready(widget.view()).activity.unwrap().time
        else {
            panic!("expected playback progress");
        };
        assert_eq!(progress.current_time, "0:30");
        assert_eq!(progress.total_time, "2:00");
        assert_eq!(progress.progress, 25.0);
    }

    #[tokio::test]
    async fn test_spotify_without_end_shows_no_time() {
        let mut widget = PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42"));
        widget.apply(record(vec![spotify(0, None)]));

        let card = ready(widget.view()).activity.unwrap();
        assert_eq!(card.time, None);
    }

    #[tokio::test]
    async fn test_ticker_replaced_on_selection_change() {
        let mut widget = PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42"));

        widget.apply(record(vec![editor(0)]));
        let first = widget.time_updates().unwrap();

        // Same activity again keeps the running ticker.
        widget.apply(record(vec![editor(0)]));
        assert!(widget.time_updates().unwrap().same_channel(&first));

        widget.apply(record(vec![editor(5_000)]));
        assert!(!widget.time_updates().unwrap().same_channel(&first));

        widget.apply(record(vec![]));
        assert!(widget.time_updates().is_none());
        assert_eq!(ready(widget.view()).activity, None);
    }

    #[tokio::test]
    async fn test_activity_without_start_has_no_ticker() {
        let mut widget = PresenceWidget::new(WidgetClient::new(), PresenceProps::new("42"));
        let mut activity = editor(0);
        activity.timestamps = None;
        widget.apply(record(vec![activity]));

        assert!(widget.time_updates().is_none());
        assert!(ready(widget.view()).activity.is_some());
    }
}
