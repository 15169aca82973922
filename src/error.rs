/// All errors that can occur while fetching or decoding widget data.
#[derive(thiserror::Error, Debug)]
pub enum WidgetError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}: {message}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
        message: String,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response from {url}: {source}")]
    Json {
        url: String,
        source: serde_json::Error,
    },

    /// The presence API answered with `success: false`.
    #[error("presence api error for {url}: {code}: {message}")]
    Api {
        url: String,
        code: String,
        message: String,
    },

    /// A percent-encoded asset path could not be decoded.
    #[error("malformed percent-encoding: {0}")]
    UrlDecode(String),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
