//! HTTP clients for the hosted model and speech-to-text APIs.

pub mod gemini;
pub mod whisper;

pub use gemini::GeminiClient;
pub use whisper::WhisperClient;

use std::time::Duration;

fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Request URLs are stripped so nothing in them reaches callers or logs.
fn transport_error(service: &str, err: reqwest::Error, timeout: Duration) -> domain::Error {
    let err = err.without_url();
    if err.is_timeout() {
        domain::Error::upstream(format!(
            "{} request timed out after {}s",
            service,
            timeout.as_secs()
        ))
    } else if err.is_connect() {
        domain::Error::upstream(format!("Could not reach {}", service))
    } else {
        domain::Error::upstream(format!("{} request failed: {}", service, err))
    }
}
