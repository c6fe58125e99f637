//! # 내 플랜 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET | /api/v1/plan | 플랜과 들어 있는 템플릿 |
//! | POST | /api/v1/plan/templates/{id} | 템플릿 넣기/빼기 (토글) |
//! | GET | /api/v1/plan/courses | 선택한 과목 목록 (`?sort=useful&desc=true`) |
//! | DELETE | /api/v1/plan/courses/{course_id} | 과목 선택 해제 + 모든 시간표에서 제거 |
//! | PUT | /api/v1/plan/course-items/{id}/selection | 슬롯 선택/해제 |
//! | PUT | /api/v1/plan/course-items/{id}/free | free 슬롯 채우기/비우기 |

use crate::{db, error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<PlanResponse>, AppError> {
    let plan = db::plans::require_plan(&state.pool, &auth.user_id).await?;
    let templates = db::plans::list_plan_templates(&state.pool, &plan.id).await?;
    Ok(Json(PlanResponse { plan, templates }))
}

pub async fn toggle_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<String>,
) -> Result<Json<ToggleTemplateResponse>, AppError> {
    let plan = db::plans::require_plan(&state.pool, &auth.user_id).await?;
    let in_plan = db::plans::toggle_template(&state.pool, &plan.id, &template_id).await?;
    Ok(Json(ToggleTemplateResponse { template_id, in_plan }))
}

/// 선택 과목 목록 정렬 쿼리. 둘 다 생략하면 과목 코드 오름차순
#[derive(Debug, Default, Deserialize)]
pub struct SelectedCoursesQuery {
    #[serde(default)]
    pub sort: CourseSortKey,
    #[serde(default)]
    pub desc: bool,
}

/// `GET /plan/courses` → `{ "courses": [...] }`, 과목마다 평점 필드 포함
///
/// 알 수 없는 `sort` 값은 axum `Query` 추출 단계에서 400입니다.
pub async fn list_selected_courses(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SelectedCoursesQuery>,
) -> Result<Json<Value>, AppError> {
    let mut courses = db::plans::list_selected_courses(&state.pool, &auth.user_id).await?;
    sort_selected_courses(&mut courses, query.sort, query.desc);
    Ok(Json(json!({ "courses": courses })))
}

pub async fn remove_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_id): Path<String>,
) -> Result<StatusCode, AppError> {
    db::plans::remove_course_selection(&state.pool, &auth.user_id, &course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_selection(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_item_id): Path<String>,
    Json(req): Json<SelectionRequest>,
) -> Result<StatusCode, AppError> {
    let plan = db::plans::require_plan(&state.pool, &auth.user_id).await?;
    db::plans::set_selection(&state.pool, &plan.id, &course_item_id, req.selected).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn fill_free_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(course_item_id): Path<String>,
    Json(req): Json<FillFreeCourseRequest>,
) -> Result<StatusCode, AppError> {
    let plan = db::plans::require_plan(&state.pool, &auth.user_id).await?;
    db::plans::fill_free_course(
        &state.pool,
        &auth.user_id,
        &plan.id,
        &course_item_id,
        req.course_id.as_deref(),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
