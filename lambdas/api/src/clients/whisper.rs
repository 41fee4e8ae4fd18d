use std::time::Duration;

use async_trait::async_trait;
use domain::{consultations::SpeechToText, Error};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::Deserialize;

use super::{http_client, transport_error};

pub const MODEL_LOADING: &str =
    "The AI transcription model is currently loading. Please try again in 30 seconds.";

/// Hugging Face hosted Whisper inference
pub struct WhisperClient {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

impl WhisperClient {
    pub fn new(url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            url: url.to_string(),
            api_key,
            client: http_client(timeout)?,
            timeout,
        })
    }
}

fn failure(status: StatusCode, body: &str) -> Error {
    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Error::upstream(MODEL_LOADING);
    }
    Error::upstream(format!("Hugging Face API failed: {}", body))
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> Result<String, Error> {
        let api_key = self.api_key.as_deref().ok_or_else(|| Error::Configuration {
            message: "HUGGINGFACE_API_KEY is not set".to_string(),
        })?;

        tracing::info!("Sending {} bytes of audio to Whisper", audio.len());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .header(CONTENT_TYPE, content_type)
            .body(audio)
            .send()
            .await
            .map_err(|e| transport_error("Hugging Face", e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Hugging Face API error {}: {}", status, body);
            return Err(failure(status, &body));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Unreadable Whisper response: {}", e)))?;

        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_model_gets_a_retry_hint() {
        assert_eq!(failure(StatusCode::SERVICE_UNAVAILABLE, ""), Error::upstream(MODEL_LOADING));
        assert_eq!(
            failure(StatusCode::BAD_REQUEST, "bad audio"),
            Error::upstream("Hugging Face API failed: bad audio")
        );
    }
}
