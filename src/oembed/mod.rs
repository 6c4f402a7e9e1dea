//! YouTube oEmbed lookups, used to name a video before it is added.

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct OembedResponse {
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct OembedClient {
    client: reqwest::Client,
    base_url: String,
}

impl OembedClient {
    const DEFAULT_BASE_URL: &'static str = "https://www.youtube.com/oembed";
    const USER_AGENT: &'static str = concat!("wheelpod/", env!("CARGO_PKG_VERSION"));

    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(Self::USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    fn lookup_url(&self, video_id: &str) -> String {
        let watch = crate::library::links::watch_url(video_id);
        format!(
            "{}?url={}&format=json",
            self.base_url,
            urlencoding::encode(&watch)
        )
    }

    /// Title of the video, or `None` when YouTube does not know it.
    pub async fn video_title(&self, video_id: &str) -> anyhow::Result<Option<String>> {
        let url = self.lookup_url(video_id);
        tracing::debug!("oembed lookup: {url}");

        let response = self.client.get(&url).send().await.context("oembed request")?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND
            || status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::BAD_REQUEST
        {
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("oembed returned {status}");
        }

        let body: OembedResponse = response.json().await.context("parse oembed response")?;
        let title = body.title.trim();
        Ok((!title.is_empty()).then(|| title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_url_encodes_watch_url() {
        let client = OembedClient::new().unwrap();
        assert_eq!(
            client.lookup_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/oembed?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3DdQw4w9WgXcQ&format=json"
        );
    }

    #[test]
    fn test_response_parses_with_extra_fields() {
        let raw = r#"{"title":"Never Gonna Give You Up","author_name":"Rick Astley","type":"video","version":"1.0"}"#;
        let r: OembedResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(r.title, "Never Gonna Give You Up");
    }
}
