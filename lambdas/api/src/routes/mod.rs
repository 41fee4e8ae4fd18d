use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod ai;
pub mod appointments;
pub mod consultations;
pub mod digibooks;
pub mod hospitals;

/// Fits a 10 MiB image once base64-encoded
pub const BODY_LIMIT: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // AI routes
        .route("/api/process-consultation", post(ai::process_consultation))
        .route("/api/extract-text", post(ai::extract_text))
        .route("/api/extract-consultation", post(ai::extract_consultation))
        .route("/api/format-record", post(ai::format_record))
        .route("/api/enrich-medications", post(ai::enrich_medications))
        .route("/api/polish-summary", post(ai::polish_summary))
        .route("/api/transcribe", post(ai::transcribe))
        // Staff review
        .route("/admin/records", post(consultations::upload_record))
        .route("/admin/records/preview", post(consultations::preview_message))
        .route("/admin/records/submit", post(consultations::submit_record))
        .route(
            "/consultations",
            post(consultations::create_consultation).get(consultations::list_consultations),
        )
        // Patient
        .route(
            "/digibook",
            post(digibooks::save_onboarding)
                .get(digibooks::get_digibook)
                .put(digibooks::update_digibook),
        )
        .route("/digibook/field", patch(digibooks::update_field))
        .route("/hospitals", get(hospitals::list_hospitals))
        .route("/hospitals/recommended", get(hospitals::recommended_hospitals))
        .route("/hospitals/stats", get(hospitals::hospital_stats))
        .route("/hospitals/:id", get(hospitals::get_hospital))
        .route("/appointments", post(appointments::start_booking))
        .route(
            "/appointments/:id",
            get(appointments::get_appointment).delete(appointments::close_booking),
        )
        .route("/appointments/:id/payment", post(appointments::confirm_payment))
        .route("/appointments/:id/details", post(appointments::submit_details))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::testing::*;
    use super::*;

    #[tokio::test]
    async fn health_is_ok() {
        let app = router(harness(vec![]).state);
        let response = app.oneshot(get_request("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }
}
