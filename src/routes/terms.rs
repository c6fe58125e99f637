//! # 학기 범위 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/term-range | 내 학기 범위 |
//! | PUT | /api/v1/term-range | 학기 범위 통째로 교체 |
//! | GET | /api/v1/terms | 범위로부터 생성한 학기 목록 |
//!
//! 시작이 끝보다 뒤인 범위도 저장할 수 있습니다. 그때 학기 목록은 비어 있습니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::terms::terms_in_range,
};
use axum::{extract::State, Json};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// 사용자의 학기 범위. 저장된 것이 없으면 올해 기준 기본 범위
pub(crate) async fn effective_term_range(pool: &SqlitePool, user_id: &str) -> Result<TermRange, AppError> {
    Ok(db::term_ranges::get_term_range(pool, user_id)
        .await?
        .unwrap_or_else(|| TermRange::default_from_year(Utc::now().year())))
}

pub async fn get_term_range(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TermRange>, AppError> {
    Ok(Json(effective_term_range(&state.pool, &auth.user_id).await?))
}

/// `PUT /term-range` → `{ "range": {...}, "terms": ["Fall 2024", ...] }`
pub async fn update_term_range(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(range): Json<UpdateTermRangeRequest>,
) -> Result<Json<Value>, AppError> {
    if !(range.start().year_in_bounds() && range.end().year_in_bounds()) {
        return Err(AppError::BadRequest(format!(
            "Year must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }

    db::term_ranges::upsert_term_range(&state.pool, &auth.user_id, &range).await?;
    tracing::debug!(user_id = %auth.user_id, start = %range.start(), end = %range.end(), "term range updated");

    let terms = terms_in_range(&range);
    Ok(Json(json!({ "range": range, "terms": terms })))
}

pub async fn list_terms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let range = effective_term_range(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "terms": terms_in_range(&range) })))
}
