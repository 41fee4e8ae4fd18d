use axum::{
    extract::State,
    Json,
};
use chrono::Utc;
use domain::consultations::{
    capture::{self, ImageData},
    compose_patient_message, review, Consultation, ConsultationPayload, ConsultationRecord,
    PatientMessage, ReviewSubmission,
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    error::{ActionError, ApiError, Success},
    extract::{ActionJson, ApiJson, Upload},
    state::AppState,
};

const SAVED: &str = "Consultation saved successfully!";

#[derive(Debug, Deserialize)]
pub struct PreviewInput {
    record: ConsultationRecord,
    #[serde(default)]
    summary: Option<String>,
}

/// Upload of a consultation paper; validation happens before any model call.
pub async fn upload_record(
    State(state): State<AppState>,
    Upload(mut multipart): Upload,
) -> Result<Json<ConsultationRecord>, ApiError> {
    let mut file = None;
    let mut title = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        match field.name() {
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                file = Some((content_type, bytes));
            }
            Some("title") => {
                title = field.text().await.ok().filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    let (content_type, bytes) = file.ok_or_else(|| ApiError::bad_request("No file was provided."))?;
    capture::validate_upload(&content_type, bytes.len())?;

    let image = ImageData::from_bytes(&content_type, &bytes);
    let mut record = ConsultationRecord::new(&content_type, Some(image.to_data_url()), Utc::now());

    match state.pipeline().process_image(image).await {
        Ok(data) => {
            record.complete(data);
            if let Some(title) = title {
                record.document_title = title;
            }
        }
        Err(err) => {
            tracing::error!("Processing {} failed: {}", record.id, err);
            record.fail(err.to_string());
        }
    }

    Ok(Json(record))
}

pub async fn preview_message(
    ApiJson(input): ApiJson<PreviewInput>,
) -> Result<Json<PatientMessage>, ApiError> {
    let data = input
        .record
        .formatted_data
        .as_ref()
        .ok_or_else(|| ApiError::bad_request("Record has no processed data to submit."))?;

    let summary = input.summary.unwrap_or_else(|| data.summary_notes.clone());
    Ok(Json(compose_patient_message(data, &summary)))
}

pub async fn submit_record(
    State(state): State<AppState>,
    ActionJson(submission): ActionJson<ReviewSubmission>,
) -> Result<Json<Success<Consultation>>, ActionError> {
    let saved =
        review::submit_review(state.repo.as_ref(), state.images.as_ref(), &submission).await?;
    Ok(Success::with_message(SAVED, saved))
}

pub async fn create_consultation(
    State(state): State<AppState>,
    ActionJson(payload): ActionJson<ConsultationPayload>,
) -> Result<Json<Success<Consultation>>, ActionError> {
    let saved =
        review::save_consultation(state.repo.as_ref(), state.images.as_ref(), payload).await?;
    Ok(Success::with_message(SAVED, saved))
}

/// The signed-in patient's consultations, newest first
pub async fn list_consultations(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Success<Vec<Consultation>>>, ActionError> {
    let consultations = state.repo.list_consultations(&user.user_id).await?;
    Ok(Success::data(consultations))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use domain::{digibooks::Profile, store::Repository};
    use serde_json::json;
    use tower::ServiceExt;

    use super::super::{router, testing::*};

    const PROCESSED: &str = r#"{
        "patientEmail": "ngwa@example.cm",
        "doctorName": "Dr. Fon",
        "consultationItems": [
            { "labWork": "Malaria", "labResults": "positive", "drugs": "Coartem 80/480", "fee": 2000,
              "enrichedInfo": { "correctedName": "Coartem", "dosageSchedule": "1-0-1", "duration": "For 3 days.", "advice": "Take with food." } },
            { "labWork": "Consultation", "drugs": null, "fee": null }
        ],
        "summaryNotes": "Malaria, treated."
    }"#;

    async fn register(repo: &dyn Repository, id: &str, email: &str) {
        let now = Utc::now();
        repo.upsert_profile(Profile {
            clerk_id: id.to_string(),
            email: email.to_string(),
            full_name: None,
            onboarding_complete: true,
            is_admin: None,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn oversized_upload_never_reaches_the_model() {
        let harness = harness(vec![Ok(PROCESSED.to_string())]);
        let app = router(harness.state);
        let big = vec![0u8; 10 * 1024 * 1024 + 1];

        let response = app
            .oneshot(multipart_request("/admin/records", "file", "image/png", &big))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "File size too large. Please upload an image smaller than 10MB." })
        );
        assert_eq!(harness.model.call_count(), 0);
    }

    #[tokio::test]
    async fn wrong_type_never_reaches_the_model() {
        let harness = harness(vec![Ok(PROCESSED.to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(multipart_request("/admin/records", "file", "application/pdf", b"%PDF"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(harness.model.call_count(), 0);
    }

    #[tokio::test]
    async fn upload_completes_record() {
        let harness = harness(vec![Ok(PROCESSED.to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(multipart_request("/admin/records", "file", "image/png", b"png-bytes"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let record = body_json(response).await;
        assert_eq!(record["status"], "completed");
        assert_eq!(record["documentTitle"], "Consultation by Dr. Fon");
        assert!(record["id"].as_str().unwrap().starts_with("REC-"));
        assert!(record["imageUrl"].as_str().unwrap().starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn failed_processing_marks_record() {
        let harness = harness(vec![Ok("no json here".to_string())]);
        let app = router(harness.state);

        let response = app
            .oneshot(multipart_request("/admin/records", "file", "image/jpeg", b"jpg"))
            .await
            .unwrap();

        let record = body_json(response).await;
        assert_eq!(record["status"], "error");
        assert_eq!(record["documentTitle"], "Processing Failed");
        assert!(record["errorMessage"].as_str().is_some());
    }

    #[tokio::test]
    async fn submit_saves_against_patient_profile() {
        let harness = harness(vec![Ok(PROCESSED.to_string())]);
        register(harness.repo.as_ref(), "patient_1", "ngwa@example.cm").await;
        let app = router(harness.state);

        let upload = app
            .clone()
            .oneshot(multipart_request("/admin/records", "file", "image/png", b"png-bytes"))
            .await
            .unwrap();
        let record = body_json(upload).await;

        let preview = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/admin/records/preview",
                json!({ "record": record, "summary": "Rest and hydrate." }),
                None,
            ))
            .await
            .unwrap();
        let preview = body_json(preview).await;
        assert_eq!(preview["patientEmail"], "ngwa@example.cm");
        assert_eq!(preview["totalFee"], 2000.0);
        assert!(preview["emailBody"]
            .as_str()
            .unwrap()
            .contains("Total Amount Due: 2,000 XAF"));

        let response = app
            .oneshot(json_request(
                "POST",
                "/admin/records/submit",
                json!({ "record": record, "patientEmail": " NGWA@example.cm", "summary": "Rest and hydrate." }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Consultation saved successfully!");
        assert_eq!(body["data"]["user_id"], "patient_1");
        assert!(body["data"]["image_url"].as_str().unwrap().starts_with("memory://"));

        let saved = harness.repo.list_consultations("patient_1").await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].summary_notes, "Rest and hydrate.");
    }

    #[tokio::test]
    async fn unregistered_patient_is_an_action_failure() {
        let harness = harness(vec![]);
        let app = router(harness.state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/consultations",
                json!({ "patient_email": "ghost@example.cm", "consultation_items": [], "summary_notes": "" }),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({
                "success": false,
                "error": "No patient profile found with the email \"ghost@example.cm\". Please ensure the patient is registered."
            })
        );
    }

    #[tokio::test]
    async fn listing_requires_identity() {
        let harness = harness(vec![]);
        let app = router(harness.state);

        let response = app.oneshot(get_request("/consultations", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({ "success": false, "error": "Authentication failed. Please sign in to continue." })
        );
    }
}
