//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 라우터 조립을 담당합니다.
//! Axum에서 핸들러는 HTTP 요청을 받아 응답을 반환하는 async 함수입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃)
//! - `courses`: 과목 카탈로그
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `plan`: 내 플랜 (템플릿 토글, 과목 선택)
//! - `schedules`: 시간표 CRUD, 과목 배정, 보드, CSV 내보내기
//! - `templates`: 졸업 요건 템플릿
//! - `terms`: 학기 범위와 학기 목록

pub mod auth;
pub mod courses;
pub mod health;
pub mod plan;
pub mod schedules;
pub mod templates;
pub mod terms;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::SqlitePool;
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool은 내부적으로 Arc라서 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
}

/// `/api/v1` 아래에 들어갈 API 라우터
///
/// axum 0.8부터 경로 파라미터는 `{id}` 문법입니다.
fn api_routes(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let plan_routes = Router::new()
        .route("/plan", get(plan::get_plan))
        .route("/plan/templates/{id}", post(plan::toggle_template))
        .route("/plan/courses", get(plan::list_selected_courses))
        .route("/plan/courses/{course_id}", delete(plan::remove_course))
        .route("/plan/course-items/{id}/selection", put(plan::set_selection))
        .route("/plan/course-items/{id}/free", put(plan::fill_free_course));

    let schedule_routes = Router::new()
        .route("/schedules", get(schedules::list_schedules).post(schedules::create_schedule))
        .route(
            "/schedules/{id}",
            patch(schedules::rename_schedule).delete(schedules::delete_schedule),
        )
        .route("/schedules/{id}/courses", get(schedules::list_schedule_courses))
        .route(
            "/schedules/{id}/courses/{course_id}",
            put(schedules::assign_course).delete(schedules::unassign_course),
        )
        .route("/schedules/{id}/board", get(schedules::get_board))
        .route("/schedules/{id}/export", get(schedules::export_schedule));

    Router::new()
        .merge(auth_routes)
        .merge(plan_routes)
        .merge(schedule_routes)
        .route("/courses", get(courses::list_courses).post(courses::create_course))
        .route("/templates", get(templates::list_templates).post(templates::create_template))
        .route(
            "/templates/{id}",
            get(templates::get_template)
                .patch(templates::update_template)
                .delete(templates::delete_template),
        )
        .route("/term-range", get(terms::get_term_range).put(terms::update_term_range))
        .route("/terms", get(terms::list_terms))
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// 전체 애플리케이션 라우터를 조립합니다.
///
/// `static_dir`이 주어지면 API 경로에 매칭되지 않는 요청은 SPA로 넘깁니다.
/// 찾을 수 없는 파일은 index.html로 응답해서 클라이언트 라우팅이 동작하게 합니다.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new().nest("/api/v1", api_routes(state));

    let router = match static_dir {
        Some(dir) => {
            let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            router.fallback_service(serve_dir)
        }
        None => router,
    };

    router.layer(cors).layer(TraceLayer::new_for_http())
}
