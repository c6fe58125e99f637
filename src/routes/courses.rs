//! # 과목 카탈로그 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/courses | 전체 과목 (코드순) |
//! | POST | /api/v1/courses | 과목 등록. 코드는 정규화되어 저장 |

use crate::{db, error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn list_courses(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let courses = db::courses::list_courses(&state.pool).await?;
    Ok(Json(json!({ "courses": courses })))
}

pub async fn create_course(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(req): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = db::courses::create_course(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}
