use super::error::FetchError;
use reqwest::blocking::Client;
use std::borrow::Cow;
use std::time::Duration;

/// Status and raw body bytes of a completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body for log lines; invalid UTF-8 is replaced, never decoded from.
    pub fn body_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

pub trait HttpTransport: Send + Sync {
    /// Issues a single GET and returns whatever the server answered.
    /// Only connection-level failures are errors here.
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.client.get(url).send().map_err(|e| {
            log::error!("Failed to send GET request.\nError: {}", e);
            FetchError::from(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
