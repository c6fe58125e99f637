//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//! Rust에서는 예외(exception) 대신 `Result<T, E>` 타입으로 에러를 처리합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! ## 에러 분류
//! | 분류 | variant | HTTP |
//! |------|---------|------|
//! | 입력 검증 실패 (빈 이름, 잘못된 과목 코드, 잘못된 학기 라벨) | `BadRequest` | 400 |
//! | 인증 실패 | `Unauthorized` | 401 |
//! | 존재하지 않거나 본인 소유가 아닌 리소스 | `NotFound` | 404 |
//! | 불변식 위반 (마지막 시간표 삭제, 중복 이름) | `Conflict` | 409 |
//! | DB / 내부 오류 | `Database`, `Internal` | 500 |
//!
//! 어떤 에러도 프로세스를 종료시키지 않습니다. 모두 요청 하나 단위로 끝납니다.

use crate::models::{CourseCodeError, TermParseError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error; // thiserror: #[error("...")]로 Display 구현을 대신 만들어주는 매크로 크레이트

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    ///
    /// 다른 사용자의 시간표에 접근하는 경우도 여기로 보냅니다.
    /// 존재 여부 자체를 드러내지 않기 위해 403 대신 404를 씁니다.
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수 뒤에 `?`만 붙이면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),
}

// 과목 코드 검증 실패는 항상 입력 오류입니다.
// From 구현이 있으면 `CourseCode::parse(..)?` 한 줄로 AppError까지 변환됩니다.
impl From<CourseCodeError> for AppError {
    fn from(err: CourseCodeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<TermParseError> for AppError {
    fn from(err: TermParseError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        // match: 패턴 매칭. variant마다 (상태 코드, 에러 코드, 메시지) 튜플을 고릅니다.
        // 모든 variant를 다루지 않으면 컴파일 에러이므로 새 variant를 빠뜨릴 수 없습니다.
        let (status, code, message) = match self {
            // to_string(): #[error("...")]에 적은 문구가 그대로 메시지가 됨
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            // ref: 값을 이동(move)하지 않고 참조만 빌려옴. self를 아래에서 다시 쓸 수 있게 함
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Internal(ref msg) => {
                // tracing::error!: 서버 로그에만 남기고 클라이언트에는 일반 문구만 보냄
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        error_response(status, code, message)
    }
}

/// 모든 에러 응답이 공유하는 본문 형태를 만듭니다.
///
/// 결과: `{ "error": { "code": "not_found", "message": "Resource not found" } }`
/// 인증 추출자(`AuthError`)도 같은 형태를 쓰므로 클라이언트는 `error.code` 하나만 보면 됩니다.
pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    // into(): &str이든 String이든 String 하나로 맞춤
    let message: String = message.into();

    // json!: serde_json 매크로. JSON 리터럴을 그대로 적으면 Value가 만들어짐
    let body = Json(json!({
        "error": {
            "code": code,
            "message": message
        }
    }));

    // 튜플 (StatusCode, Json)도 IntoResponse를 구현하므로 바로 변환됨
    (status, body).into_response()
}
