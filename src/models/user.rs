//! # 사용자(User) 모델 정의
//!
//! 인증에 필요한 사용자 엔티티와 회원가입/로그인 요청·응답 구조체입니다.
//!
//! `User`는 DB 행을 읽을 때만 쓰고 JSON으로 내보내지 않습니다.
//! 클라이언트에는 항상 `UserResponse`로 바꿔서 돌려주므로 비밀번호 해시가 새어 나갈 길이 없습니다.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: String,
}

/// 클라이언트에 돌려주는 사용자 정보
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

/// 검증과 공백 정리를 마친 가입 정보. 요청 본문을 빌려 씁니다.
#[derive(Debug, PartialEq, Eq)]
pub struct NewUser<'a> {
    pub username: &'a str,
    /// 빈 문자열은 None으로 바뀝니다.
    pub email: Option<&'a str>,
}

impl RegisterRequest {
    /// 아이디 3자 이상, 비밀번호 8자 이상, 이메일은 있으면 `@` 포함
    ///
    /// 중복 검사는 DB가 필요하므로 여기서 하지 않습니다.
    pub fn validate(&self) -> Result<NewUser<'_>, AppError> {
        let username = self.username.trim();
        // chars().count(): 바이트 수가 아니라 글자 수로 셈
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AppError::BadRequest(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        if email.is_some_and(|e| !e.contains('@')) {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }

        Ok(NewUser { username, email })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}
