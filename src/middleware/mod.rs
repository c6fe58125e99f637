//! # 미들웨어 모듈
//!
//! - `auth`: JWT 인증 추출자와 토큰 유틸리티

pub mod auth;
