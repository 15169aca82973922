pub(crate) mod contributions;
pub(crate) mod lanyard;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, WidgetError};

/// Fetch a URL and return the status together with the raw body.
///
/// Non-success statuses are not turned into errors here: both feeds put an
/// error description in the body, which the caller decodes.
pub(crate) async fn get_body(client: &reqwest::Client, url: &str) -> Result<(StatusCode, String)> {
    debug!(url, "fetching feed");

    let response = client.get(url).send().await.map_err(|e| WidgetError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| WidgetError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })?;

    Ok((status, body))
}

/// Decode a JSON body, attributing failures to `url`.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| WidgetError::Json {
        url: url.to_owned(),
        source: e,
    })
}
