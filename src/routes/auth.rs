//! # 인증 API 라우트 핸들러
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | POST | /api/v1/auth/register | 가입 (플랜, 기본 시간표, 기본 학기 범위 생성) |
//! | POST | /api/v1/auth/login | 로그인 |
//! | POST | /api/v1/auth/refresh | 토큰 갱신 (refresh token rotation) |
//! | POST | /api/v1/auth/logout | 모든 refresh token 폐기 |
//! | GET | /api/v1/auth/me | 내 정보 |

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{hash_token, issue_token, verify_token, AuthUser, TokenKind},
    models::user::*,
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{Datelike, Utc};
use serde_json::{json, Value};

const REFRESH_EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// access/refresh 토큰을 새로 발급하고 refresh 토큰 해시를 저장합니다.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    // 발급 실패는 500
    let issue = |kind| {
        issue_token(&user.id, kind, &state.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    };
    let access_token = issue(TokenKind::Access)?;
    let refresh_token = issue(TokenKind::Refresh)?;

    let expires_at = (Utc::now() + TokenKind::Refresh.lifetime())
        .format(REFRESH_EXPIRY_FORMAT)
        .to_string();
    db_users::store_refresh_token(&state.pool, &user.id, &hash_token(&refresh_token), &expires_at).await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

/// `POST /auth/register`
///
/// 가입과 동시에 플랜, "Default" 시간표, 올해 Fall부터 5년짜리 학기 범위가 만들어집니다.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let NewUser { username, email } = req.validate()?;
    if let Some(email) = email {
        if db_users::find_by_email(&state.pool, email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }
    if db_users::find_by_username(&state.pool, username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    // Argon2id 해시. salt는 OS 난수로 생성
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user = db_users::create_user(&state.pool, username, email, &password_hash, Utc::now().year()).await?;

    let response = issue_tokens(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = db_users::find_by_username(&state.pool, req.username.trim())
        .await?
        .ok_or(AppError::Unauthorized("Invalid username or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid username or password".to_string()))?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /auth/refresh`
///
/// 사용한 refresh 토큰은 즉시 폐기하고 새 쌍을 발급합니다.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // access 토큰을 넣으면 서명이 맞아도 여기서 거절됨
    verify_token(&req.refresh_token, TokenKind::Refresh, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, REFRESH_EXPIRY_FORMAT)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_users::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    db_users::delete_refresh_token(&state.pool, &token_hash).await?;

    Ok(Json(issue_tokens(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}
