//! # 인증 추출자(Extractor)
//!
//! `Authorization: Bearer <JWT>` 헤더를 검증해 요청 범위의 사용자 ID를 꺼냅니다.
//! 핸들러가 인자에 `AuthUser`를 받기만 하면 인증이 강제됩니다.
//!
//! 전역 세션 상태는 없습니다. 모든 DB 함수는 이 추출자가 꺼낸 `user_id`를 인자로 받습니다.
//!
//! ## 토큰 종류
//! | 종류 | 수명 | 쓰는 곳 |
//! |------|------|---------|
//! | `Access` | 15분 | 모든 보호된 요청의 `Authorization` 헤더 |
//! | `Refresh` | 7일 | `POST /auth/refresh` 본문. DB에는 SHA-256 해시만 저장 |
//!
//! 두 토큰은 같은 비밀키로 서명되므로 `kind` 클레임으로 구분합니다.
//! refresh 토큰을 헤더에 넣으면 서명이 맞아도 401입니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{error::error_response, routes::AppState};

/// 토큰 종류. JWT 안에는 `"access"`/`"refresh"` 문자열로 들어갑니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn lifetime(self) -> Duration {
        match self {
            TokenKind::Access => Duration::minutes(15),
            TokenKind::Refresh => Duration::days(7),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    /// 토큰마다 고유한 ID. 같은 초에 발급한 토큰도 해시가 겹치지 않습니다.
    pub jti: String,
    pub kind: TokenKind,
}

/// 인증된 요청의 사용자
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = verify_token(token, TokenKind::Access, &state.jwt_secret)?;
        tracing::trace!(user_id = %claims.sub, "request authenticated");

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

/// `Authorization` 헤더에서 토큰 부분만 꺼냅니다.
///
/// 스킴 이름은 대소문자를 구분하지 않습니다 (`Bearer`, `bearer`).
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    // split_once: 첫 공백에서 한 번만 나눔 → (스킴, 나머지)
    let (scheme, token) = value.trim().split_once(' ').ok_or(AuthError::InvalidToken)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidToken);
    }
    Ok(token)
}

/// 인증 실패. 모두 401이고 `code`만 다릅니다.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token is required")]
    MissingToken,

    #[error("Invalid authorization token")]
    InvalidToken,

    #[error("Authorization token has expired")]
    ExpiredToken,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken => "invalid_token",
            AuthError::ExpiredToken => "expired_token",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        error_response(StatusCode::UNAUTHORIZED, self.code(), self.to_string())
    }
}

/// 지금 시각 기준으로 `kind` 토큰을 발급합니다.
pub fn issue_token(
    user_id: &str,
    kind: TokenKind,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + kind.lifetime()).timestamp(),
        jti: uuid::Uuid::now_v7().to_string(),
        kind,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// 서명, 만료, 종류를 검사합니다. 종류가 다르면 `InvalidToken`
pub fn verify_token(token: &str, expected: TokenKind, secret: &str) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?
    .claims;

    if claims.kind != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// 리프레시 토큰 저장용 해시 (hex 인코딩된 SHA-256)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
