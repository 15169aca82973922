use chrono::{Datelike, Local};
use tracing::instrument;

use crate::error::Result;
use crate::fetch;
use crate::model::*;

/// Default base URL of the Lanyard presence API.
pub const LANYARD_BASE_URL: &str = "https://api.lanyard.rest/v1";

/// Default base URL of the GitHub contributions API.
pub const CONTRIBUTIONS_BASE_URL: &str = "https://github-contributions-api.jogruber.de/v4";

/// Base URLs of the two remote feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub lanyard_base: String,
    pub contributions_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            lanyard_base: LANYARD_BASE_URL.to_owned(),
            contributions_base: CONTRIBUTIONS_BASE_URL.to_owned(),
        }
    }
}

/// Fetches presence and contribution data for the widgets.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> site_widgets::Result<()> {
/// use site_widgets::WidgetClient;
///
/// let client = WidgetClient::new();
/// let calendar = client.get_contributions("octocat", Some(2024)).await?;
/// println!("{} days", calendar.contributions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WidgetClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl WidgetClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            http: client,
            endpoints: Endpoints::default(),
        }
    }

    /// Point the client at different feed hosts.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch the current presence of a Discord user.
    #[instrument(skip(self))]
    pub async fn get_presence(&self, user_id: &str) -> Result<PresenceRecord> {
        fetch::lanyard::get_presence(&self.http, &self.endpoints.lanyard_base, user_id).await
    }

    /// Fetch the contribution history of a GitHub user.
    ///
    /// `year` defaults to the current local calendar year.
    #[instrument(skip(self))]
    pub async fn get_contributions(
        &self,
        username: &str,
        year: Option<i32>,
    ) -> Result<ContributionResponse> {
        let year = year.unwrap_or_else(current_year);
        fetch::contributions::get_contributions(
            &self.http,
            &self.endpoints.contributions_base,
            username,
            year,
        )
        .await
    }
}

impl Default for WidgetClient {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn current_year() -> i32 {
    Local::now().year()
}
