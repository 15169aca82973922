use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::client::{current_year, WidgetClient};
use crate::error::Result;
use crate::model::{ContributionDay, ContributionLevel, ContributionResponse, ContributionSeries};
use crate::theme::ColorScheme;

/// Message shown when contributions could not be fetched.
pub const UNAVAILABLE_MESSAGE: &str = "Unable to load GitHub contributions.";

/// Calendar colours on a dark background, from no contributions to the
/// busiest level.
pub const DARK_PALETTE: [&str; 5] = ["#252422", "#403d39", "#6b4d3a", "#a85a2e", "#eb5e28"];

/// Calendar colours on a light background.
pub const LIGHT_PALETTE: [&str; 5] = ["#ccc5b9", "#d4c4b0", "#c99a7a", "#d87a4a", "#eb5e28"];

pub fn palette(scheme: ColorScheme) -> &'static [&'static str; 5] {
    match scheme {
        ColorScheme::Dark => &DARK_PALETTE,
        ColorScheme::Light => &LIGHT_PALETTE,
    }
}

pub fn level_color(level: ContributionLevel, scheme: ColorScheme) -> &'static str {
    palette(scheme)[level.index()]
}

/// Keep the days that fall in `year`, in source order.
pub fn filter_year(series: &[ContributionDay], year: i32) -> ContributionSeries {
    series
        .iter()
        .filter(|day| day.date.year() == year)
        .cloned()
        .collect()
}

/// Grid geometry handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarLayout {
    pub block_size: u32,
    pub block_margin: u32,
    pub block_radius: u32,
    pub max_level: u8,
    /// 0 = Sunday.
    pub week_start: u8,
}

impl Default for CalendarLayout {
    fn default() -> Self {
        Self {
            block_size: 12,
            block_margin: 4,
            block_radius: 3,
            max_level: ContributionLevel::Max.into(),
            week_start: 0,
        }
    }
}

/// Whose calendar to show, and for which year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarProps {
    pub username: String,
    /// Defaults to the current calendar year.
    pub year: Option<i32>,
}

impl CalendarProps {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            year: None,
        }
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn target_year(&self) -> i32 {
        self.year.unwrap_or_else(current_year)
    }
}

/// One coloured day in the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub count: u32,
    pub level: ContributionLevel,
    pub color: &'static str,
}

/// A calendar ready to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarData {
    pub year: i32,
    pub total: Option<u32>,
    pub color_scheme: ColorScheme,
    pub cells: Vec<CalendarCell>,
    pub layout: CalendarLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CalendarView {
    Loading,
    Unavailable { message: &'static str },
    Ready(CalendarData),
}

impl CalendarView {
    /// Build the view for a finished fetch.
    pub fn from_result(
        result: &Result<ContributionResponse>,
        year: i32,
        scheme: ColorScheme,
    ) -> Self {
        match result {
            Ok(response) => Self::Ready(CalendarData::build(response, year, scheme)),
            Err(_) => Self::Unavailable {
                message: UNAVAILABLE_MESSAGE,
            },
        }
    }
}

impl CalendarData {
    pub fn build(response: &ContributionResponse, year: i32, scheme: ColorScheme) -> Self {
        let cells = filter_year(&response.contributions, year)
            .into_iter()
            .map(|day| CalendarCell {
                color: level_color(day.level, scheme),
                date: day.date,
                count: day.count,
                level: day.level,
            })
            .collect();

        Self {
            year,
            total: response.total.get(&year.to_string()).copied(),
            color_scheme: scheme,
            cells,
            layout: CalendarLayout::default(),
        }
    }
}

/// GitHub contribution calendar bound to a theme flag.
#[derive(Debug)]
pub struct CalendarWidget {
    client: WidgetClient,
    props: CalendarProps,
    theme: watch::Receiver<ColorScheme>,
    result: Option<Result<ContributionResponse>>,
}

impl CalendarWidget {
    pub fn new(
        client: WidgetClient,
        props: CalendarProps,
        theme: watch::Receiver<ColorScheme>,
    ) -> Self {
        Self {
            client,
            props,
            theme,
            result: None,
        }
    }

    pub fn props(&self) -> &CalendarProps {
        &self.props
    }

    /// Change whose calendar is shown; the widget goes back to loading.
    pub fn set_props(&mut self, props: CalendarProps) {
        if self.props != props {
            self.props = props;
            self.result = None;
        }
    }

    /// Fetch fresh data, discarding whatever was loaded before.
    #[instrument(skip(self), fields(username = %self.props.username))]
    pub async fn load(&mut self) {
        self.result = None;
        let result = self
            .client
            .get_contributions(&self.props.username, self.props.year)
            .await;
        match &result {
            Ok(response) => debug!(days = response.contributions.len(), "calendar loaded"),
            Err(e) => warn!(error = %e, "calendar unavailable"),
        }
        self.result = Some(result);
    }

    /// Wait until the theme flips. Returns `false` once the theme source is
    /// gone.
    pub async fn theme_changed(&mut self) -> bool {
        self.theme.changed().await.is_ok()
    }

    pub fn view(&self) -> CalendarView {
        match &self.result {
            None => CalendarView::Loading,
            Some(result) => {
                CalendarView::from_result(result, self.props.target_year(), *self.theme.borrow())
            }
        }
    }
}
