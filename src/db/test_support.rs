//! DB 테스트 공용 헬퍼

use crate::db;
use crate::models::{Course, CreateCourseRequest, Schedule, User};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// 마이그레이션을 적용한 인메모리 DB
///
/// `sqlite::memory:`는 연결마다 별도 DB가 되므로 연결을 하나로 고정합니다.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test db");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// 가입 절차를 거친 사용자와 기본 시간표
pub async fn register_user(pool: &SqlitePool, username: &str) -> (User, Schedule) {
    let user = db::users::create_user(pool, username, None, "not-a-real-hash", 2024)
        .await
        .expect("Failed to register user");
    let schedule = db::schedules::list_schedules(pool, &user.id)
        .await
        .expect("Failed to list schedules")
        .into_iter()
        .next()
        .expect("Registered user has no schedule");
    (user, schedule)
}

pub async fn add_course(pool: &SqlitePool, code: &str, name: &str) -> Course {
    db::courses::create_course(
        pool,
        &CreateCourseRequest {
            code: code.to_string(),
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create course")
}
