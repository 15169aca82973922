use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{Result, WidgetError};
use crate::fetch::{self, decode};
use crate::model::PresenceRecord;

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Option<PresenceRecord>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[instrument(skip(client, base))]
pub(crate) async fn get_presence(
    client: &reqwest::Client,
    base: &str,
    user_id: &str,
) -> Result<PresenceRecord> {
    let url = presence_url(base, user_id);
    let (status, body) = fetch::get_body(client, &url).await?;
    let record = parse_response(&url, status, &body)?;
    debug!(
        status = %record.status,
        activities = record.activities.len(),
        "parsed presence"
    );
    Ok(record)
}

pub(crate) fn presence_url(base: &str, user_id: &str) -> String {
    format!("{}/users/{user_id}", base.trim_end_matches('/'))
}

fn parse_response(url: &str, status: StatusCode, body: &str) -> Result<PresenceRecord> {
    let envelope = match decode::<Envelope>(url, body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(WidgetError::UnexpectedStatus {
                url: url.to_owned(),
                status,
                message: String::new(),
            })
        }
        Err(e) => return Err(e),
    };

    match envelope {
        Envelope {
            success: true,
            data: Some(record),
            ..
        } if status.is_success() => Ok(record),
        Envelope {
            error: Some(error), ..
        } => Err(WidgetError::Api {
            url: url.to_owned(),
            code: error.code,
            message: error.message,
        }),
        _ => Err(WidgetError::UnexpectedStatus {
            url: url.to_owned(),
            status,
            message: "response carried no presence data".to_owned(),
        }),
    }
}
