//! HTTP client for the narrator server.

use crate::audio::AudioClip;
use crate::protocol::{
    Ebook, ErrorBody, ExtractedText, SynthesisRequest, SynthesisResponse, Voice,
};
use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
    synthesis_timeout: Duration,
}

impl ApiClient {
    pub fn new(base: &str, request_timeout: Duration, synthesis_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("Invalid server URL {base}"))?;
        if base.cannot_be_a_base() {
            bail!("Server URL {base} cannot carry paths");
        }
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Building HTTP client")?;
        Ok(Self {
            http,
            base,
            synthesis_timeout,
        })
    }

    /// `base` plus percent-encoded path segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| anyhow!("Server URL {} cannot carry paths", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The live notification socket: same host, `ws`/`wss` scheme, path `/ws`.
    pub fn ws_url(&self) -> Result<Url> {
        let mut url = self.endpoint(&["ws"])?;
        let scheme = if self.base.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        url.set_scheme(scheme)
            .map_err(|()| anyhow!("Cannot derive a WebSocket URL from {}", self.base))?;
        Ok(url)
    }

    pub async fn list_ebooks(&self) -> Result<Vec<Ebook>> {
        self.get_json(self.endpoint(&["api", "ebooks"])?).await
    }

    pub async fn list_voices(&self) -> Result<Vec<Voice>> {
        self.get_json(self.endpoint(&["api", "voices"])?).await
    }

    pub async fn extract_text(&self, filename: &str) -> Result<ExtractedText> {
        self.get_json(self.endpoint(&["api", "extract-text", filename])?)
            .await
    }

    /// Ask the server to render `text` and download the resulting clip.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        output_name: &str,
    ) -> Result<AudioClip> {
        let url = self.endpoint(&["api", "text-to-speech"])?;
        let body = SynthesisRequest {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            output_file_name: output_name.to_string(),
        };
        let response = self
            .http
            .post(url.clone())
            .timeout(self.synthesis_timeout)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?;
        let SynthesisResponse { audio_url } = read_json(response).await?;
        self.fetch_audio(&audio_url).await
    }

    pub async fn fetch_audio(&self, audio_url: &str) -> Result<AudioClip> {
        let url = self
            .base
            .join(audio_url)
            .with_context(|| format!("Invalid audio URL {audio_url}"))?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?;
        let response = check_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Reading audio from {url}"))?;
        debug!(url = %url, bytes = bytes.len(), "Fetched clip");
        Ok(AudioClip::new(audio_url, bytes.to_vec()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().clone();
    check_status(response)
        .await?
        .json::<T>()
        .await
        .with_context(|| format!("Unexpected response body from {url}"))
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|err| err.error)
        .unwrap_or(body);
    if message.trim().is_empty() {
        bail!("HTTP {status}");
    }
    bail!("HTTP {status}: {}", message.trim())
}
