//! # 템플릿 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/templates | 전체 템플릿 |
//! | POST | /api/v1/templates | 템플릿 생성 (항목 + 과목 슬롯) |
//! | GET | /api/v1/templates/{id} | 상세. free 슬롯과 선택 여부는 요청한 사용자 기준 |
//! | PATCH | /api/v1/templates/{id} | 이름/설명 수정 (만든 사람만) |
//! | DELETE | /api/v1/templates/{id} | 삭제 (만든 사람만) |

use crate::{db, error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

pub async fn list_templates(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let templates = db::templates::list_templates(&state.pool).await?;
    Ok(Json(json!({ "templates": templates })))
}

pub async fn create_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<Template>), AppError> {
    let template = db::templates::create_template(&state.pool, &auth.user_id, &req).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TemplateDetail>, AppError> {
    let detail = db::templates::get_template_detail(&state.pool, &auth.user_id, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(detail))
}

pub async fn update_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateTemplateRequest>,
) -> Result<Json<Template>, AppError> {
    let template = db::templates::update_template(&state.pool, &auth.user_id, &id, &req).await?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    db::templates::delete_template(&state.pool, &auth.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
