//! # 과목 카탈로그 쿼리 모듈
//!
//! `courses` 테이블은 모든 사용자가 공유하는 과목 목록입니다.
//! 코드는 항상 정규화된 형태(`CS135`)로 저장되므로 조회도 정규화된 코드로 합니다.

use crate::error::AppError;
use crate::models::{Course, CourseCode, CreateCourseRequest};
use sqlx::{Sqlite, SqlitePool};

/// `Course` 한 행을 읽을 때 쓰는 컬럼 목록
const COURSE_COLUMNS: &str = "id, code, name, description, \
    useful_rating, liked_rating, easy_rating, num_ratings, prereqs, antireqs, coreqs";

/// 모든 과목을 코드순으로 조회합니다.
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, AppError> {
    // format!: 컬럼 목록만 끼워 넣고, 값은 항상 bind로 넘김
    let sql = format!("SELECT {} FROM courses ORDER BY code", COURSE_COLUMNS);
    let courses = sqlx::query_as::<_, Course>(&sql)
        .fetch_all(pool)
        .await?;

    Ok(courses)
}

pub async fn get_course(pool: &SqlitePool, id: &str) -> Result<Option<Course>, AppError> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS);
    let course = sqlx::query_as::<_, Course>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(course)
}

pub async fn find_by_code<'e, E>(executor: E, code: &CourseCode) -> Result<Option<Course>, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM courses WHERE code = ?", COURSE_COLUMNS);
    let course = sqlx::query_as::<_, Course>(&sql)
        .bind(code.as_str())
        .fetch_optional(executor)
        .await?;

    Ok(course)
}

/// 과목을 카탈로그에 등록합니다.
///
/// 코드는 정규화 후 저장합니다. 같은 코드가 이미 있으면 `Conflict`.
pub async fn create_course(pool: &SqlitePool, req: &CreateCourseRequest) -> Result<Course, AppError> {
    let code = CourseCode::parse(&req.code)?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Course name is required".to_string()));
    }
    req.ratings.validate()?;

    if find_by_code(pool, &code).await?.is_some() {
        return Err(AppError::Conflict(format!("Course {} already exists", code)));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let ratings = &req.ratings;
    let requisites = &req.requisites;
    sqlx::query(
        r#"
        INSERT INTO courses (id, code, name, description,
                             useful_rating, liked_rating, easy_rating, num_ratings,
                             prereqs, antireqs, coreqs)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(code.as_str())
    .bind(name)
    .bind(&req.description)
    .bind(ratings.useful_rating)
    .bind(ratings.liked_rating)
    .bind(ratings.easy_rating)
    .bind(ratings.num_ratings)
    .bind(&requisites.prereqs)
    .bind(&requisites.antireqs)
    .bind(&requisites.coreqs)
    .execute(pool)
    .await?;

    tracing::info!(course_id = %id, code = %code, "course created");
    get_course(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created course".to_string()))
}
