use crate::error::Error;
use std::future::Future;
use bytes::Bytes;
use reqwest::Method;
use reqwest_middleware::ClientWithMiddleware;

/// A client returning raw response bodies for given URLs.
///
/// The synchronizer is generic over this so transports can be swapped out in tests.
pub trait WebClient: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        method: Method,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Bytes, Error>> + Send;
}

/// A [`WebClient`] backed by a reqwest client with middleware support (useful if you
/// need to proxy or retry your requests, for example).
#[derive(Debug, Clone)]
pub struct ReqwestWebClient {
    client: ClientWithMiddleware,
}

impl ReqwestWebClient {
    pub fn new(client: ClientWithMiddleware) -> Self {
        Self { client }
    }
}

impl WebClient for ReqwestWebClient {
    async fn fetch(
        &self,
        url: &str,
        method: Method,
        query: &[(&str, String)],
    ) -> Result<Bytes, Error> {
        let url = url::Url::parse_with_params(url, query)?;
        let response = self.client.request(method, url)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        Ok(body)
    }
}
