use axum::Json;
use domain::hospitals::{self, Hospital, HospitalFilter, HospitalStats};
use serde::Deserialize;

use crate::{
    error::ApiError,
    extract::{ApiPath, ApiQuery},
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedQuery {
    min_rating: Option<f64>,
    limit: Option<usize>,
}

pub async fn list_hospitals(
    ApiQuery(filter): ApiQuery<HospitalFilter>,
) -> Json<Vec<Hospital>> {
    Json(filter.apply(hospitals::all()))
}

pub async fn recommended_hospitals(
    ApiQuery(query): ApiQuery<RecommendedQuery>,
) -> Json<Vec<Hospital>> {
    Json(hospitals::recommended(
        hospitals::all(),
        query.min_rating.unwrap_or(4.5),
        query.limit.unwrap_or(4),
    ))
}

pub async fn hospital_stats() -> Json<HospitalStats> {
    Json(hospitals::stats(hospitals::all()))
}

pub async fn get_hospital(ApiPath(id): ApiPath<u32>) -> Result<Json<Hospital>, ApiError> {
    hospitals::find(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| domain::Error::not_found("Hospital not found").into())
}
