use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{Result, WidgetError};
use crate::fetch::{self, decode};
use crate::model::ContributionResponse;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[instrument(skip(client, base))]
pub(crate) async fn get_contributions(
    client: &reqwest::Client,
    base: &str,
    username: &str,
    year: i32,
) -> Result<ContributionResponse> {
    let url = contributions_url(base, username, year);
    let (status, body) = fetch::get_body(client, &url).await?;
    let response = parse_response(&url, status, &body)?;
    debug!(
        count = response.contributions.len(),
        username, year, "parsed contributions"
    );
    Ok(response)
}

pub(crate) fn contributions_url(base: &str, username: &str, year: i32) -> String {
    format!("{}/{username}?y={year}", base.trim_end_matches('/'))
}

fn parse_response(url: &str, status: StatusCode, body: &str) -> Result<ContributionResponse> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_default();
        return Err(WidgetError::UnexpectedStatus {
            url: url.to_owned(),
            status,
            message,
        });
    }
    decode(url, body)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::ContributionLevel;

    const URL: &str = "https://contributions.test/v4/octocat?y=2024";

    #[test]
    fn test_contributions_url() {
        assert_eq!(
            contributions_url("https://contributions.test/v4/", "octocat", 2024),
            URL
        );
    }

    #[test]
    fn test_parse_success() {
        let body = r#"{
            "total": {"2023": 5, "2024": 3},
            "contributions": [
                {"date": "2023-12-31", "count": 5, "level": 4},
                {"date": "2024-01-01", "count": 3, "level": 2}
            ]
        }"#;
        let response = parse_response(URL, StatusCode::OK, body).unwrap();

        assert_eq!(response.total.get("2024"), Some(&3));
        assert_eq!(response.contributions.len(), 2);
        let first = &response.contributions[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(first.count, 5);
        assert_eq!(first.level, ContributionLevel::Max);
    }

    #[test]
    fn test_parse_error_status_carries_message() {
        let body = r#"{"error": "rate limited"}"#;
        let err = parse_response(URL, StatusCode::TOO_MANY_REQUESTS, body).unwrap_err();

        match err {
            WidgetError::UnexpectedStatus {
                status, message, ..
            } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_status_without_json_body() {
        let err = parse_response(URL, StatusCode::BAD_GATEWAY, "<html>").unwrap_err();
        assert!(matches!(
            err,
            WidgetError::UnexpectedStatus { ref message, .. } if message.is_empty()
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range_level() {
        let body = r#"{"total": {}, "contributions": [{"date": "2024-01-01", "count": 1, "level": 7}]}"#;
        let err = parse_response(URL, StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, WidgetError::Json { .. }));
    }
}
