//! 라우터 전체를 인메모리 DB 위에 올려서 HTTP 요청 단위로 검증합니다.

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use degree_planner::routes::{self, AppState};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    routes::app(
        AppState {
            pool,
            jwt_secret: "test-secret".to_string(),
        },
        None,
    )
}

struct Reply {
    status: StatusCode,
    content_type: Option<String>,
    text: String,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        content_type,
        text: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

/// 가입하고 access token을 돌려줍니다.
async fn register(app: &Router, username: &str) -> String {
    let reply = send(
        app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": username, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    reply.json()["access_token"].as_str().unwrap().to_string()
}

async fn first_schedule_id(app: &Router, token: &str) -> String {
    let reply = send(app, Method::GET, "/api/v1/schedules", Some(token), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.json()["schedules"][0]["id"].as_str().unwrap().to_string()
}

async fn set_term_range(app: &Router, token: &str, range: Value) -> Reply {
    send(app, Method::PUT, "/api/v1/term-range", Some(token), Some(range)).await
}

/// 학기 범위를 Winter 2024 ~ Fall 2026으로 맞추고, 과목 두 개를 등록하고,
/// 둘 다 담은 템플릿을 플랜에 넣은 뒤 CS135만 선택합니다.
/// `(cs135_id, cs136_id)`를 돌려줍니다.
async fn select_courses(app: &Router, token: &str) -> (String, String) {
    let reply = set_term_range(
        app,
        token,
        json!({
            "start_season": "Winter", "start_year": 2024,
            "end_season": "Fall", "end_year": 2026
        }),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.text);

    let mut ids = Vec::new();
    for (code, name) in [("cs 135", "Functional Programs"), ("CS136", "Algorithm Design")] {
        let reply = send(
            app,
            Method::POST,
            "/api/v1/courses",
            Some(token),
            Some(json!({ "code": code, "name": name })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
        ids.push(reply.json()["id"].as_str().unwrap().to_string());
    }

    let reply = send(
        app,
        Method::POST,
        "/api/v1/templates",
        Some(token),
        Some(json!({
            "name": "CS Core",
            "description": "First year",
            "items": [
                { "type": "requirement", "course_type": "fixed", "courses": "CS135, cs136" }
            ]
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    let template_id = reply.json()["id"].as_str().unwrap().to_string();

    let reply = send(
        app,
        Method::POST,
        &format!("/api/v1/plan/templates/{}", template_id),
        Some(token),
        None,
    )
    .await;
    assert_eq!(reply.json()["in_plan"], json!(true));

    let detail = send(
        app,
        Method::GET,
        &format!("/api/v1/templates/{}", template_id),
        Some(token),
        None,
    )
    .await
    .json();
    let item_id = detail["items"][0]["fixed_courses"][0]["course_item_id"]
        .as_str()
        .unwrap()
        .to_string();

    let reply = send(
        app,
        Method::PUT,
        &format!("/api/v1/plan/course-items/{}/selection", item_id),
        Some(token),
        Some(json!({ "selected": true })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    (ids.remove(0), ids.remove(0))
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = test_app().await;

    let reply = send(&app, Method::GET, "/api/v1/schedules", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"]["code"], "missing_token");

    let reply = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
}

#[tokio::test]
async fn registration_creates_default_schedule_and_range() {
    let app = test_app().await;
    let token = register(&app, "alice").await;

    let schedules = send(&app, Method::GET, "/api/v1/schedules", Some(&token), None).await.json();
    assert_eq!(schedules["schedules"].as_array().unwrap().len(), 1);
    assert_eq!(schedules["schedules"][0]["name"], "Default");

    let terms = send(&app, Method::GET, "/api/v1/terms", Some(&token), None).await.json();
    let terms = terms["terms"].as_array().unwrap();
    assert_eq!(terms.len(), 16);
    assert!(terms[0].as_str().unwrap().starts_with("Fall "));
}

#[tokio::test]
async fn term_range_update_regenerates_terms() {
    let app = test_app().await;
    let token = register(&app, "alice").await;

    let reply = send(
        &app,
        Method::PUT,
        "/api/v1/term-range",
        Some(&token),
        Some(json!({
            "start_season": "Winter", "start_year": 2023,
            "end_season": "Spring", "end_year": 2024
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json()["terms"],
        json!(["Winter 2023", "Spring 2023", "Fall 2023", "Winter 2024", "Spring 2024"])
    );

    // 시작이 끝보다 뒤여도 에러가 아니라 빈 목록
    let reply = send(
        &app,
        Method::PUT,
        "/api/v1/term-range",
        Some(&token),
        Some(json!({
            "start_season": "Fall", "start_year": 2023,
            "end_season": "Winter", "end_year": 2023
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["terms"], json!([]));

    let terms = send(&app, Method::GET, "/api/v1/terms", Some(&token), None).await.json();
    assert_eq!(terms["terms"], json!([]));

    let reply = set_term_range(
        &app,
        &token,
        json!({
            "start_season": "Fall", "start_year": 1800,
            "end_season": "Fall", "end_year": 2024
        }),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn moving_a_course_between_terms_keeps_one_row() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let schedule_id = first_schedule_id(&app, &token).await;
    let (cs135, _) = select_courses(&app, &token).await;
    let uri = format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs135);

    for term in ["Fall 2024", "winter 2025"] {
        let reply = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "term": term }))).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT, "{}", reply.text);
    }

    let courses = send(
        &app,
        Method::GET,
        &format!("/api/v1/schedules/{}/courses", schedule_id),
        Some(&token),
        None,
    )
    .await
    .json();
    assert_eq!(courses["courses"].as_array().unwrap().len(), 1);
    assert_eq!(courses["courses"][0]["term"], "Winter 2025");

    // available로 되돌리기: 두 번째도 성공
    for _ in 0..2 {
        let reply = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
    }
    let courses = send(
        &app,
        Method::GET,
        &format!("/api/v1/schedules/{}/courses", schedule_id),
        Some(&token),
        None,
    )
    .await
    .json();
    assert!(courses["courses"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn assignment_validation() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let schedule_id = first_schedule_id(&app, &token).await;
    let (cs135, cs136) = select_courses(&app, &token).await;

    let reply = send(
        &app,
        Method::PUT,
        &format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs135),
        Some(&token),
        Some(json!({ "term": "Summer 2024" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"]["code"], "bad_request");

    // CS136은 템플릿에 있지만 선택하지 않았음
    let reply = send(
        &app,
        Method::PUT,
        &format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs136),
        Some(&token),
        Some(json!({ "term": "Fall 2024" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assignment_must_fall_inside_the_term_range() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let schedule_id = first_schedule_id(&app, &token).await;
    let (cs135, _) = select_courses(&app, &token).await;
    let uri = format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs135);

    for term in ["Fall 1", "Fall 2023", "Winter 2027", "Winter 9999"] {
        let reply = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "term": term }))).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{}", term);
    }

    // 범위의 양 끝은 허용
    for term in ["Winter 2024", "Fall 2026"] {
        let reply = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "term": term }))).await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT, "{}", term);
    }

    let board = send(
        &app,
        Method::GET,
        &format!("/api/v1/schedules/{}/board", schedule_id),
        Some(&token),
        None,
    )
    .await
    .json();
    assert_eq!(board["scheduled"][0]["term"], "Fall 2026");
    assert!(board["terms"].as_array().unwrap().contains(&json!("Fall 2026")));

    // 시작이 끝보다 뒤인 범위에는 어떤 학기도 배정할 수 없음
    set_term_range(
        &app,
        &token,
        json!({
            "start_season": "Fall", "start_year": 2026,
            "end_season": "Winter", "end_year": 2024
        }),
    )
    .await;
    let reply = send(&app, Method::PUT, &uri, Some(&token), Some(json!({ "term": "Fall 2025" }))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn board_splits_available_and_scheduled() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let schedule_id = first_schedule_id(&app, &token).await;
    let (cs135, _) = select_courses(&app, &token).await;

    let board_uri = format!("/api/v1/schedules/{}/board", schedule_id);
    let board = send(&app, Method::GET, &board_uri, Some(&token), None).await.json();
    assert_eq!(board["available"][0]["course_code"], "CS135");
    assert_eq!(board["available"][0]["term"], "");
    assert!(board["scheduled"].as_array().unwrap().is_empty());

    send(
        &app,
        Method::PUT,
        &format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs135),
        Some(&token),
        Some(json!({ "term": "Fall 2024" })),
    )
    .await;

    let board = send(&app, Method::GET, &board_uri, Some(&token), None).await.json();
    assert!(board["available"].as_array().unwrap().is_empty());
    assert_eq!(board["scheduled"][0]["term"], "Fall 2024");
}

#[tokio::test]
async fn export_is_csv_with_header() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let schedule_id = first_schedule_id(&app, &token).await;
    let (cs135, _) = select_courses(&app, &token).await;

    send(
        &app,
        Method::PUT,
        &format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs135),
        Some(&token),
        Some(json!({ "term": "Fall 2024" })),
    )
    .await;

    let reply = send(
        &app,
        Method::GET,
        &format!("/api/v1/schedules/{}/export", schedule_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.content_type.unwrap().starts_with("text/csv"));
    assert_eq!(
        reply.text,
        "Course Code,Course Name,Term\nCS135,Functional Programs,Fall 2024\n"
    );
}

#[tokio::test]
async fn schedule_lifecycle() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let default_id = first_schedule_id(&app, &token).await;

    // 유일한 시간표는 지울 수 없음
    let reply = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/schedules/{}", default_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    let reply = send(
        &app,
        Method::POST,
        "/api/v1/schedules",
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(
        &app,
        Method::POST,
        "/api/v1/schedules",
        Some(&token),
        Some(json!({ "name": "Co-op" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    let second_id = reply.json()["id"].as_str().unwrap().to_string();

    let reply = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/schedules/{}", second_id),
        Some(&token),
        Some(json!({ "name": "Co-op (alt)" })),
    )
    .await;
    assert_eq!(reply.json()["name"], "Co-op (alt)");

    let reply = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/schedules/{}", default_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["next_schedule_id"], json!(second_id));
}

#[tokio::test]
async fn other_users_schedules_are_not_found() {
    let app = test_app().await;
    let alice = register(&app, "alice").await;
    let mallory = register(&app, "mallory").await;
    let schedule_id = first_schedule_id(&app, &alice).await;

    for (method, uri) in [
        (Method::GET, format!("/api/v1/schedules/{}/board", schedule_id)),
        (Method::GET, format!("/api/v1/schedules/{}/export", schedule_id)),
        (Method::DELETE, format!("/api/v1/schedules/{}/courses/any", schedule_id)),
    ] {
        let reply = send(&app, method, &uri, Some(&mallory), None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{}", uri);
    }

    let reply = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/schedules/{}", schedule_id),
        Some(&mallory),
        Some(json!({ "name": "mine now" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_a_course_from_the_plan_unschedules_it() {
    let app = test_app().await;
    let token = register(&app, "alice").await;
    let schedule_id = first_schedule_id(&app, &token).await;
    let (cs135, _) = select_courses(&app, &token).await;

    send(
        &app,
        Method::PUT,
        &format!("/api/v1/schedules/{}/courses/{}", schedule_id, cs135),
        Some(&token),
        Some(json!({ "term": "Fall 2024" })),
    )
    .await;

    let reply = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/plan/courses/{}", cs135),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let selected = send(&app, Method::GET, "/api/v1/plan/courses", Some(&token), None).await.json();
    assert!(selected["courses"].as_array().unwrap().is_empty());

    let board = send(
        &app,
        Method::GET,
        &format!("/api/v1/schedules/{}/board", schedule_id),
        Some(&token),
        None,
    )
    .await
    .json();
    assert!(board["scheduled"].as_array().unwrap().is_empty());
    assert!(board["available"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn catalog_and_selected_courses_carry_ratings() {
    let app = test_app().await;
    let token = register(&app, "alice").await;

    for course in [
        json!({ "code": "CS135", "name": "Functional Programs",
                "useful_rating": 0.6, "liked_rating": 0.7, "num_ratings": 80,
                "antireqs": "CS115, CS145" }),
        json!({ "code": "MATH135", "name": "Algebra",
                "useful_rating": 0.9, "easy_rating": 0.3, "num_ratings": 12,
                "prereqs": "Grade 12 Calculus" }),
    ] {
        let reply = send(&app, Method::POST, "/api/v1/courses", Some(&token), Some(course)).await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    }

    let reply = send(
        &app,
        Method::POST,
        "/api/v1/courses",
        Some(&token),
        Some(json!({ "code": "STAT230", "name": "Probability", "easy_rating": 2.0 })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let catalog = send(&app, Method::GET, "/api/v1/courses", Some(&token), None).await.json();
    let cs135 = &catalog["courses"][0];
    assert_eq!(cs135["code"], "CS135");
    assert_eq!(cs135["useful_rating"], 0.6);
    assert_eq!(cs135["num_ratings"], 80);
    assert!(cs135["easy_rating"].is_null());
    assert_eq!(cs135["antireqs"], "CS115, CS145");
    assert!(cs135["prereqs"].is_null());
    assert_eq!(catalog["courses"][1]["prereqs"], "Grade 12 Calculus");

    let reply = send(
        &app,
        Method::POST,
        "/api/v1/templates",
        Some(&token),
        Some(json!({
            "name": "First Year",
            "items": [
                { "type": "requirement", "course_type": "fixed", "courses": "CS135, MATH135" }
            ]
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    let template_id = reply.json()["id"].as_str().unwrap().to_string();
    send(
        &app,
        Method::POST,
        &format!("/api/v1/plan/templates/{}", template_id),
        Some(&token),
        None,
    )
    .await;

    let detail = send(
        &app,
        Method::GET,
        &format!("/api/v1/templates/{}", template_id),
        Some(&token),
        None,
    )
    .await
    .json();
    let slots = detail["items"][0]["fixed_courses"].as_array().unwrap().clone();
    assert_eq!(slots[0]["course"]["liked_rating"], 0.7);
    for slot in &slots {
        let reply = send(
            &app,
            Method::PUT,
            &format!("/api/v1/plan/course-items/{}/selection", slot["course_item_id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "selected": true })),
        )
        .await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT);
    }

    let codes = |body: &Value| -> Vec<String> {
        body["courses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["course_code"].as_str().unwrap().to_string())
            .collect()
    };

    let selected = send(&app, Method::GET, "/api/v1/plan/courses", Some(&token), None).await.json();
    assert_eq!(codes(&selected), vec!["CS135", "MATH135"]);
    assert_eq!(selected["courses"][1]["useful_rating"], 0.9);
    assert_eq!(selected["courses"][1]["num_ratings"], 12);

    let by_useful = send(
        &app,
        Method::GET,
        "/api/v1/plan/courses?sort=useful&desc=true",
        Some(&token),
        None,
    )
    .await
    .json();
    assert_eq!(codes(&by_useful), vec!["MATH135", "CS135"]);

    let by_easy = send(&app, Method::GET, "/api/v1/plan/courses?sort=easy", Some(&token), None)
        .await
        .json();
    assert_eq!(codes(&by_easy), vec!["CS135", "MATH135"]);

    let reply = send(&app, Method::GET, "/api/v1/plan/courses?sort=rating", Some(&token), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refresh_tokens_only_work_for_refreshing() {
    let app = test_app().await;
    let reply = send(
        &app,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({ "username": "alice", "email": "alice@example.com", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    let body = reply.json();
    let access = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let mut user_keys: Vec<&str> = body["user"].as_object().unwrap().keys().map(String::as_str).collect();
    user_keys.sort_unstable();
    assert_eq!(user_keys, vec!["created_at", "email", "id", "username"]);

    // refresh 토큰은 보호된 요청에 쓸 수 없음
    let reply = send(&app, Method::GET, "/api/v1/auth/me", Some(&refresh), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.json()["error"]["code"], "invalid_token");

    // access 토큰으로는 갱신할 수 없음
    let reply = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": access })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{}", reply.text);
    let rotated = reply.json()["access_token"].as_str().unwrap().to_string();

    let me = send(&app, Method::GET, "/api/v1/auth/me", Some(&rotated), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.json()["username"], "alice");
    assert!(me.json().get("password_hash").is_none());

    // 이미 쓴 refresh 토큰은 폐기됨
    let reply = send(
        &app,
        Method::POST,
        "/api/v1/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}
