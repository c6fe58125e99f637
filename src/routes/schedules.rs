//! # 시간표 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/schedules | `list_schedules` | 내 시간표 목록 |
//! | POST | /api/v1/schedules | `create_schedule` | 새 시간표 |
//! | PATCH | /api/v1/schedules/{id} | `rename_schedule` | 이름 변경 |
//! | DELETE | /api/v1/schedules/{id} | `delete_schedule` | 삭제 (마지막 하나면 409) |
//! | GET | /api/v1/schedules/{id}/courses | `list_schedule_courses` | 배정 목록 |
//! | PUT | /api/v1/schedules/{id}/courses/{course_id} | `assign_course` | 학기로 이동 |
//! | DELETE | /api/v1/schedules/{id}/courses/{course_id} | `unassign_course` | available로 이동 |
//! | GET | /api/v1/schedules/{id}/board | `get_board` | 보드 화면 데이터 |
//! | GET | /api/v1/schedules/{id}/export | `export_schedule` | CSV 다운로드 |
//!
//! `{id}`가 다른 사용자의 시간표면 존재하지 않는 것과 똑같이 404입니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::{terms::effective_term_range, AppState},
    services::{board::BoardProjection, export::schedule_to_csv, terms::terms_in_range},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

/// 요청한 사용자의 시간표를 가져옵니다. 없거나 남의 것이면 404
async fn owned_schedule(state: &AppState, auth: &AuthUser, schedule_id: &str) -> Result<Schedule, AppError> {
    db::schedules::find_owned_schedule(&state.pool, &auth.user_id, schedule_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// `GET /schedules` → `{ "schedules": [...] }` (생성순)
pub async fn list_schedules(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Value>, AppError> {
    let schedules = db::schedules::list_schedules(&state.pool, &auth.user_id).await?;
    Ok(Json(json!({ "schedules": schedules })))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ScheduleNameRequest>,
) -> Result<(StatusCode, Json<Schedule>), AppError> {
    let name = validate_schedule_name(&req.name)?;
    let plan = db::plans::require_plan(&state.pool, &auth.user_id).await?;

    let schedule = db::schedules::create_schedule(&state.pool, &plan.id, &name).await?;
    tracing::info!(schedule_id = %schedule.id, user_id = %auth.user_id, "schedule created");
    Ok((StatusCode::CREATED, Json(schedule)))
}

pub async fn rename_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ScheduleNameRequest>,
) -> Result<Json<Schedule>, AppError> {
    let name = validate_schedule_name(&req.name)?;
    owned_schedule(&state, &auth, &id).await?;

    let schedule = db::schedules::rename_schedule(&state.pool, &id, &name)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(schedule))
}

/// `DELETE /schedules/{id}` → `{ "deleted_id": ..., "next_schedule_id": ... | null }`
///
/// 클라이언트는 `next_schedule_id`로 이동합니다.
pub async fn delete_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteScheduleResponse>, AppError> {
    let res = db::schedules::delete_schedule(&state.pool, &auth.user_id, &id).await?;
    Ok(Json(res))
}

pub async fn list_schedule_courses(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    owned_schedule(&state, &auth, &id).await?;
    let courses = db::assignments::list_for_schedule(&state.pool, &id).await?;
    Ok(Json(json!({ "courses": courses })))
}

/// `PUT /schedules/{id}/courses/{course_id}` + `{ "term": "Fall 2024" }`
///
/// ## 검증 순서
/// 1. 학기 라벨 형식 (400)
/// 2. 시간표 소유권 (404)
/// 3. 학기가 내 학기 범위 안에 있는지 (400). 보드에 열로 나오는 학기에만 놓을 수 있습니다
/// 4. 과목이 내 선택 목록에 있는지 (400)
///
/// 이미 다른 학기에 있던 과목이면 학기만 바뀝니다.
/// 범위를 나중에 좁혀도 이미 저장된 배정은 지우지 않습니다.
pub async fn assign_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, course_id)): Path<(String, String)>,
    Json(req): Json<AssignCourseRequest>,
) -> Result<StatusCode, AppError> {
    let term = req.term()?;
    owned_schedule(&state, &auth, &id).await?;

    let range = effective_term_range(&state.pool, &auth.user_id).await?;
    if !range.contains(term) {
        return Err(AppError::BadRequest(format!(
            "{} is outside the term range {} to {}",
            term,
            range.start(),
            range.end()
        )));
    }

    if !db::plans::is_course_selected(&state.pool, &auth.user_id, &course_id).await? {
        return Err(AppError::BadRequest(
            "Only selected courses can be scheduled".to_string(),
        ));
    }

    db::assignments::assign(&state.pool, &id, &course_id, &term.to_string()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /schedules/{id}/courses/{course_id}`
///
/// 배정되어 있지 않은 과목이어도 204입니다.
pub async fn unassign_course(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, course_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    owned_schedule(&state, &auth, &id).await?;
    db::assignments::unassign(&state.pool, &id, &course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /schedules/{id}/board`
///
/// 학기 목록 + available/scheduled 두 목록. 클라이언트 낙관적 상태의 기준점이 됩니다.
///
/// 범위를 좁히기 전에 배정된 과목은 `terms`에 없는 학기 라벨로 `scheduled`에 그대로 남습니다.
pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ScheduleBoardResponse>, AppError> {
    let schedule = owned_schedule(&state, &auth, &id).await?;

    let selected = db::plans::list_selected_courses(&state.pool, &auth.user_id).await?;
    let assignments = db::assignments::list_for_schedule(&state.pool, &id).await?;
    let (available, scheduled) = BoardProjection::from_server(selected, assignments).into_parts();

    let range = effective_term_range(&state.pool, &auth.user_id).await?;

    Ok(Json(ScheduleBoardResponse {
        schedule,
        terms: terms_in_range(&range),
        available,
        scheduled,
    }))
}

/// `GET /schedules/{id}/export` → `text/csv` 첨부 파일
pub async fn export_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = owned_schedule(&state, &auth, &id).await?;
    let rows = db::assignments::list_for_schedule(&state.pool, &id).await?;

    let filename: String = schedule
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.csv\"", filename),
            ),
        ],
        schedule_to_csv(&rows),
    ))
}
