use crate::domain::ports::Fetcher;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};

/// reqwest-backed page fetcher that only accepts HTML-ish 200 responses.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

/// 200 with a content type mentioning "html" (xhtml and other XML variants pass too).
pub fn is_good_response(response: &Response) -> bool {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_lowercase);

    response.status() == StatusCode::OK
        && content_type.is_some_and(|content_type| content_type.contains("html"))
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        tracing::debug!("GET {}", url);
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error during requests to {} : {}", url, e);
                return None;
            }
        };

        if !is_good_response(&response) {
            tracing::debug!(
                "Ignoring response from {} (status {}, content-type {:?})",
                url,
                response.status(),
                response.headers().get(CONTENT_TYPE)
            );
            return None;
        }

        match response.bytes().await {
            Ok(body) => Some(body.to_vec()),
            Err(e) => {
                tracing::warn!("Error during requests to {} : {}", url, e);
                None
            }
        }
    }
}
