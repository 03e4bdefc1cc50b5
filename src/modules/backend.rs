use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::modules::errors::{FetchError, detail_message};
use crate::modules::serialize::PanelConfig;
use crate::modules::types::{
    DatesResponse, KeywordsResponse, LogsResponse, MessageResponse, ScrapeRequest, StatusResponse,
};

/// Typed client for the dashboard's JSON endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &PanelConfig) -> Result<Self, FetchError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("keyword-dash/0.1"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Transport)?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends path segments to the base url. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn status(&self) -> Result<StatusResponse, FetchError> {
        let url = self.endpoint(&["api", "status"])?;
        self.get(url).await
    }

    pub async fn logs(&self, lines: usize) -> Result<LogsResponse, FetchError> {
        let mut url = self.endpoint(&["api", "logs"])?;
        url.query_pairs_mut()
            .append_pair("lines", &lines.to_string());
        self.get(url).await
    }

    pub async fn dates(&self) -> Result<DatesResponse, FetchError> {
        let url = self.endpoint(&["api", "dates"])?;
        self.get(url).await
    }

    pub async fn keywords(&self, date: &str) -> Result<KeywordsResponse, FetchError> {
        let url = self.endpoint(&["api", "keywords", date])?;
        self.get(url).await
    }

    pub async fn run_scrape(&self, request: &ScrapeRequest) -> Result<MessageResponse, FetchError> {
        let url = self.endpoint(&["api", "run-scrape"])?;
        debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        decode(resp).await
    }

    pub async fn stop_scrape(&self) -> Result<MessageResponse, FetchError> {
        let url = self.endpoint(&["api", "stop-scrape"])?;
        debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        decode(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        decode(resp).await
    }
}

/// Shared response handling: non-2xx becomes `Status` (with the server's
/// detail when there is one), an unparseable 2xx body becomes `Decode`.
async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, FetchError> {
    let status = resp.status();
    let body = resp.text().await.map_err(FetchError::Transport)?;
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            detail: detail_message(&body),
        });
    }
    serde_json::from_str(&body).map_err(FetchError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&PanelConfig {
            base_url: base.to_string(),
            ..PanelConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoints_join_onto_base_path() {
        let api = client("http://dash:8000");
        assert_eq!(
            api.endpoint(&["api", "status"]).unwrap().as_str(),
            "http://dash:8000/api/status"
        );

        let api = client("http://dash:8000/panel/");
        assert_eq!(
            api.endpoint(&["api", "dates"]).unwrap().as_str(),
            "http://dash:8000/panel/api/dates"
        );
    }

    #[test]
    fn date_segment_is_encoded() {
        let api = client("http://dash:8000/");
        assert_eq!(
            api.endpoint(&["api", "keywords", "2024/06 01"]).unwrap().as_str(),
            "http://dash:8000/api/keywords/2024%2F06%2001"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        let bad = |base: &str| {
            ApiClient::new(&PanelConfig {
                base_url: base.to_string(),
                ..PanelConfig::default()
            })
        };
        assert!(matches!(bad("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(bad("mailto:ops@example.com"), Err(FetchError::InvalidUrl(_))));
    }
}
