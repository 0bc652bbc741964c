use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use crate::sources::HttpGet;

pub const TRACK_INFO_URL: &str =
    "https://api.bilibili.com/audio/music-service-c/songs/playing?song_id={id}";
pub const ALBUM_INFO_URL: &str = "https://api.bilibili.com/audio/music-service-c/menus/{id}";

/// Status discriminator of a trusted envelope.
const SUCCESS: &str = "success";

/// Bilibili music service client. No authentication is needed for the
/// song and menu endpoints.
#[derive(Clone)]
pub struct BilibiliClient {
    client: reqwest::blocking::Client,
}

impl BilibiliClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::remote("<client>", format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl HttpGet for BilibiliClient {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| Error::remote(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Outer JSON structure of every metadata response.
#[derive(Debug, Deserialize)]
struct Envelope {
    msg: String,
    #[serde(default)]
    data: Value,
}

/// Checks the envelope status and returns its payload.
/// A `null` or missing payload is `Ok(None)`.
pub fn unwrap_envelope(url: &str, body: &[u8]) -> Result<Option<Value>> {
    let envelope: Envelope = serde_json::from_slice(body)
        .map_err(|e| Error::remote(url, format!("malformed response: {e}")))?;

    if envelope.msg != SUCCESS {
        return Err(Error::remote(
            url,
            format!(
                "remote responded {:?}: {}",
                envelope.msg,
                String::from_utf8_lossy(body)
            ),
        ));
    }

    match envelope.data {
        Value::Null => Ok(None),
        data => Ok(Some(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://api.example/menus/1";

    #[test]
    fn test_success_envelope_yields_payload() {
        let body = br#"{"msg":"success","data":{"title":"x"}}"#;
        let data = unwrap_envelope(URL, body).unwrap().unwrap();
        assert_eq!(data["title"], "x");
    }

    #[test]
    fn test_null_payload_is_a_miss() {
        let body = br#"{"msg":"success","data":null}"#;
        assert!(unwrap_envelope(URL, body).unwrap().is_none());
    }

    #[test]
    fn test_empty_object_is_found() {
        let body = br#"{"msg":"success","data":{}}"#;
        assert!(unwrap_envelope(URL, body).unwrap().is_some());
    }

    #[test]
    fn test_failure_envelope_reports_url_and_body() {
        let body = br#"{"msg":"not found","data":null}"#;
        let err = unwrap_envelope(URL, body).unwrap_err();
        match err {
            Error::RemoteService { url, detail } => {
                assert_eq!(url, URL);
                assert!(detail.contains("not found"));
                assert!(detail.contains(r#""data":null"#));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_body_is_remote_error() {
        let err = unwrap_envelope(URL, b"<html>").unwrap_err();
        assert!(matches!(err, Error::RemoteService { .. }));
    }

    #[test]
    fn test_url_templates_have_placeholder() {
        assert!(TRACK_INFO_URL.contains("{id}"));
        assert!(ALBUM_INFO_URL.contains("{id}"));
    }
}
