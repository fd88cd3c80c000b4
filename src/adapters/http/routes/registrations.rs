use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;

use crate::{
    adapters::http::app_state::AppState,
    app_error::AppResult,
    use_cases::registration::{AttendanceRecord, RegistrationForm, RegistrationMetadata},
};

#[derive(Serialize)]
struct ItemsResponse<T> {
    items: Vec<T>,
}

#[derive(Serialize)]
struct CountResponse {
    count: Option<u64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(register))
        .route("/count", get(headcount))
        .route("/metadata", get(metadata))
        .route("/export/csv", get(export_csv))
        .route("/export/xlsx", get(export_xlsx))
}

async fn register(
    State(app_state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> AppResult<impl IntoResponse> {
    let record = app_state.registration_use_cases.register(&form).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items: Vec<AttendanceRecord> = app_state.registration_use_cases.list().await?;
    Ok(Json(ItemsResponse { items }))
}

async fn headcount(State(app_state): State<AppState>) -> impl IntoResponse {
    let count = app_state.registration_use_cases.headcount().await;
    Json(CountResponse { count })
}

async fn metadata(State(app_state): State<AppState>) -> impl IntoResponse {
    let meta: RegistrationMetadata = app_state.registration_use_cases.metadata();
    Json(meta)
}

async fn export_csv(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let csv = app_state.registration_use_cases.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance.csv\"",
            ),
        ],
        csv,
    ))
}

async fn export_xlsx(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let bytes = app_state.registration_use_cases.export_xlsx().await?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance.xlsx\"",
            ),
        ],
        bytes,
    ))
}
