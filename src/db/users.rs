//! # 사용자 인증 쿼리 모듈
//!
//! 사용자 조회, 가입, 리프레시 토큰 저장을 담당합니다.
//! 리프레시 토큰은 원문이 아니라 SHA-256 해시만 저장합니다.

use crate::db::{schedules, term_ranges};
use crate::error::AppError;
use crate::models::{TermRange, User, DEFAULT_SCHEDULE_NAME};
use sqlx::SqlitePool;

/// 새 사용자를 가입시킵니다.
///
/// ## 하나의 트랜잭션에서 만드는 것
/// 1. `users` 행
/// 2. 사용자 전용 플랜 (1:1)
/// 3. "Default" 시간표. 플랜에는 항상 시간표가 하나 이상 있어야 합니다
/// 4. 기본 학기 범위: `current_year`년 Fall부터 5년 뒤 Fall까지
///
/// 중간에 실패하면 아무것도 남지 않습니다.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
    current_year: i32,
) -> Result<User, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let plan_id = uuid::Uuid::now_v7().to_string();

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO plans (id, user_id) VALUES (?, ?)")
        .bind(&plan_id)
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    schedules::insert_schedule(&mut *tx, &plan_id, DEFAULT_SCHEDULE_NAME).await?;
    term_ranges::upsert_term_range(&mut *tx, &id, &TermRange::default_from_year(current_year))
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %id, username, "user registered");
    find_by_id(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn store_refresh_token(
    pool: &SqlitePool,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// 토큰 해시로 `(user_id, expires_at)`를 찾습니다.
pub async fn find_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<(String, String)>, AppError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT user_id, expires_at FROM refresh_tokens WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn delete_refresh_token(pool: &SqlitePool, token_hash: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete_user_refresh_tokens(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
