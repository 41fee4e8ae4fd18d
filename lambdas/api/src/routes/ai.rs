use axum::{
    extract::State,
    Json,
};
use domain::{
    consultations::{EnrichmentMap, FormattedRecord, ImageData, ProcessedConsultation},
    Error,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::ApiError,
    extract::{ApiJson, Upload},
    state::AppState,
};

const DEFAULT_AUDIO_TYPE: &str = "audio/webm";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    #[serde(default)]
    image_data: Option<String>,
}

impl ImageInput {
    fn image(&self) -> Result<ImageData, Error> {
        ImageData::parse(self.image_data.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub struct TextInput {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
pub struct MedicationsInput {
    #[serde(default)]
    medications: Vec<String>,
}

pub async fn process_consultation(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ImageInput>,
) -> Result<Json<ProcessedConsultation>, ApiError> {
    let image = input.image()?;
    let consultation = state.pipeline().process_image(image).await?;
    Ok(Json(consultation))
}

pub async fn extract_text(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ImageInput>,
) -> Result<Json<Value>, ApiError> {
    let image = input.image()?;
    let text = state.pipeline().extract_text(image).await?;
    Ok(Json(json!({ "text": text })))
}

pub async fn extract_consultation(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TextInput>,
) -> Result<Json<ProcessedConsultation>, ApiError> {
    let consultation = state.pipeline().structure_text(&input.text).await?;
    Ok(Json(consultation))
}

pub async fn format_record(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TextInput>,
) -> Result<Json<FormattedRecord>, ApiError> {
    let record = state.pipeline().format_record(&input.text).await?;
    Ok(Json(record))
}

pub async fn enrich_medications(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<MedicationsInput>,
) -> Result<Json<EnrichmentMap>, ApiError> {
    let enriched = state
        .pipeline()
        .enrich_medications(&input.medications)
        .await
        .map_err(|e| ApiError::masked(e, "Failed to enrich medication data."))?;
    Ok(Json(enriched))
}

pub async fn polish_summary(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<TextInput>,
) -> Result<Json<Value>, ApiError> {
    let polished = state
        .pipeline()
        .polish_summary(&input.text)
        .await
        .map_err(|e| ApiError::masked(e, "Failed to polish summary."))?;
    Ok(Json(json!({ "polishedText": polished })))
}

/// Voice note -> clinical English
pub async fn transcribe(
    State(state): State<AppState>,
    Upload(mut multipart): Upload,
) -> Result<Json<Value>, ApiError> {
    let mut audio = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some("audio") {
            let content_type = field.content_type().unwrap_or(DEFAULT_AUDIO_TYPE).to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            audio = Some((bytes.to_vec(), content_type));
        }
    }

    let (bytes, content_type) = audio
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("No audio file was provided."))?;

    let transcription = state
        .pipeline()
        .transcribe_voice_note(state.speech.as_ref(), bytes, &content_type)
        .await?;

    Ok(Json(json!({ "transcription": transcription })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use domain::consultations::pipeline::NO_SPOKEN_INPUT;
    use tower::ServiceExt;

    use super::super::{router, testing::*};
    use super::*;

    #[tokio::test]
    async fn missing_image_is_rejected_without_model_call() {
        let harness = harness(vec![]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request("POST", "/api/process-consultation", json!({}), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "Image data is required" }));
        assert_eq!(harness.model.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_uses_error_field() {
        let harness = harness(vec![]);
        let app = router(harness.state);

        let response = app
            .oneshot(raw_request("POST", "/api/process-consultation", "{not json", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("JSON"));
        assert_eq!(harness.model.call_count(), 0);
    }

    #[tokio::test]
    async fn prose_wrapped_json_is_recovered() {
        let answer = r#"Sure! {"doctorName": "Dr. N", "consultationItems": [], "summaryNotes": "ok"} Hope that helps."#;
        let harness = harness(vec![Ok(answer.to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/process-consultation",
                json!({ "imageData": "data:image/jpeg;base64,aGVsbG8=" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["doctorName"], "Dr. N");
        assert_eq!(harness.model.call_count(), 1);
    }

    #[tokio::test]
    async fn refusal_surfaces_preview() {
        let harness = harness(vec![Ok("I cannot read this image.".to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/process-consultation",
                json!({ "imageData": "aGVsbG8=" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("AI failed to return a JSON object."));
    }

    #[tokio::test]
    async fn empty_medication_list_skips_model() {
        let harness = harness(vec![]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/enrich-medications",
                json!({ "medications": [] }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({}));
        assert_eq!(harness.model.call_count(), 0);
    }

    #[tokio::test]
    async fn enrichment_failure_is_masked() {
        let harness = harness(vec![Ok("not json".to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/enrich-medications",
                json!({ "medications": ["Para 500mg"] }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Failed to enrich medication data." })
        );
    }

    #[tokio::test]
    async fn polish_returns_trimmed_text() {
        let harness = harness(vec![Ok("  Polished.\n".to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/polish-summary",
                json!({ "text": "polishd" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(body_json(response).await, json!({ "polishedText": "Polished." }));
    }

    #[tokio::test]
    async fn silent_voice_note_is_reported() {
        let harness = harness_with_speech(vec![], Ok("   ".to_string()));
        let app = router(harness.state);

        let response = app
            .oneshot(multipart_request("/api/transcribe", "audio", "audio/webm", b"RIFF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "transcription": NO_SPOKEN_INPUT })
        );
        assert_eq!(harness.model.call_count(), 0);
    }

    #[tokio::test]
    async fn transcribe_requires_audio_field() {
        let harness = harness(vec![]);
        let app = router(harness.state);

        let response = app
            .oneshot(multipart_request("/api/transcribe", "file", "audio/webm", b"RIFF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "No audio file was provided." })
        );
    }
}
