use futures_util::StreamExt;
use reqwest::{RequestBuilder, StatusCode, Url};
use tokio_util::sync::CancellationToken;

use crate::{ExportSettings, FailureKind, Strategy, SyntheticEntry, TransferError};

/// Name of the synthetic licence entry fetched once per job.
pub const LICENCE_FILENAME: &str = "LICENCE.txt";

/// Executes exactly one strategy. Implementations never retry; falling back to the
/// next strategy is the caller's job.
#[async_trait::async_trait]
pub trait Transfer: Send + Sync {
    async fn fetch(
        &self,
        strategy: &Strategy,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TransferError>;
}

/// Supplies the text of the licence document injected into archives.
#[async_trait::async_trait]
pub trait LicenseSource: Send + Sync {
    async fn licence_entry(&self, cancel: &CancellationToken)
        -> Result<SyntheticEntry, TransferError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransfer {
    client: reqwest::Client,
    api_base: Url,
    bearer_token: Option<String>,
    max_bytes: u64,
}

impl ReqwestTransfer {
    pub fn new(settings: &ExportSettings) -> Result<Self, TransferError> {
        let api_base = Url::parse(&settings.api_base_url)
            .map_err(|err| TransferError::new(FailureKind::Unknown, err.to_string()))?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|err| TransferError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            api_base,
            bearer_token: settings.bearer_token.clone(),
            max_bytes: settings.max_bytes,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransferError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| TransferError::new(FailureKind::Unknown, "api base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authenticated(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match self.bearer_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn request_for(&self, strategy: &Strategy) -> Result<RequestBuilder, TransferError> {
        match strategy {
            Strategy::Watermark { item_id } => {
                Ok(self.authenticated(self.endpoint(&["files", item_id.as_str(), "watermarked"])?))
            }
            Strategy::Direct { url } => {
                let parsed = Url::parse(url)
                    .map_err(|err| TransferError::new(FailureKind::NotFound, err.to_string()))?;
                // Direct locators are fetched anonymously; the credential stays with the API.
                Ok(self.client.get(parsed))
            }
            Strategy::Api { item_id } => {
                Ok(self.authenticated(self.endpoint(&["files", item_id.as_str(), "download"])?))
            }
        }
    }

    async fn read_body(&self, request: RequestBuilder) -> Result<Vec<u8>, TransferError> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::new(status_failure(status), status.to_string()));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(too_large(self.max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(too_large(self.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl Transfer for ReqwestTransfer {
    async fn fetch(
        &self,
        strategy: &Strategy,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TransferError> {
        let request = self.request_for(strategy)?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransferError::cancelled()),
            result = self.read_body(request) => result,
        }
    }
}

#[async_trait::async_trait]
impl LicenseSource for ReqwestTransfer {
    async fn licence_entry(
        &self,
        cancel: &CancellationToken,
    ) -> Result<SyntheticEntry, TransferError> {
        let request = self.authenticated(self.endpoint(&["exports", "license"])?);
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransferError::cancelled()),
            result = self.read_body(request) => result?,
        };
        let text = String::from_utf8(bytes)
            .map_err(|err| TransferError::new(FailureKind::Unknown, err.to_string()))?;
        Ok(SyntheticEntry::text(LICENCE_FILENAME, text))
    }
}

fn status_failure(status: StatusCode) -> FailureKind {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FailureKind::Unauthorized,
        StatusCode::NOT_FOUND | StatusCode::GONE => FailureKind::NotFound,
        _ => FailureKind::Unknown,
    }
}

fn too_large(max_bytes: u64, actual: u64) -> TransferError {
    TransferError::new(
        FailureKind::Unknown,
        format!("response too large (max {max_bytes}, actual {actual})"),
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransferError {
    if err.is_builder() {
        return TransferError::new(FailureKind::Unknown, err.to_string());
    }
    TransferError::new(FailureKind::Network, err.to_string())
}
