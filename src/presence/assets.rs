use percent_encoding::percent_decode_str;
use tracing::warn;

use crate::error::{Result, WidgetError};

const SPOTIFY_IMAGE_BASE: &str = "https://i.scdn.co/image/";
const MEDIA_PROXY_BASE: &str = "https://media.discordapp.net/";
const APP_ASSETS_BASE: &str = "https://cdn.discordapp.com/app-assets/";

/// Resolve an activity asset key into an image URL.
///
/// An empty string means "no image".
pub fn resolve_asset_url(value: Option<&str>, application_id: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return String::new();
    };

    if let Some(id) = value.strip_prefix("spotify:") {
        format!("{SPOTIFY_IMAGE_BASE}{id}")
    } else if let Some(path) = value.strip_prefix("mp:external/") {
        external_image_url(path)
    } else if let Some(path) = value.strip_prefix("mp:") {
        format!("{MEDIA_PROXY_BASE}{path}")
    } else {
        match application_id.filter(|id| !id.is_empty()) {
            Some(id) => format!("{APP_ASSETS_BASE}{id}/{value}"),
            None => String::new(),
        }
    }
}

/// Turn `<variant>/https/<encoded>` into the proxied origin URL.
fn external_image_url(path: &str) -> String {
    let Some((_, url_path)) = path.split_once('/') else {
        return String::new();
    };

    let decoded = if let Some(rest) = url_path.strip_prefix("https/") {
        decode_uri_component(rest).map(|d| format!("https://{d}"))
    } else if let Some(rest) = url_path.strip_prefix("http/") {
        decode_uri_component(rest).map(|d| format!("http://{d}"))
    } else {
        return String::new();
    };

    decoded.unwrap_or_else(|e| {
        warn!(path, error = %e, "failed to decode external image url");
        String::new()
    })
}

/// Percent-decode `input`, rejecting truncated escapes and non-UTF-8 output.
pub(crate) fn decode_uri_component(input: &str) -> Result<String> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
                return Err(WidgetError::UrlDecode(input.to_owned()));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(input)
        .decode_utf8()
        .map(|d| d.into_owned())
        .map_err(|_| WidgetError::UrlDecode(input.to_owned()))
}
