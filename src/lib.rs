//! # degree-planner
//!
//! 졸업 요건 템플릿에서 수강할 과목을 고르고, 고른 과목을 학기별 시간표에 배치하는 서비스입니다.
//!
//! 모듈 구성:
//! - `config`: 환경변수 설정
//! - `db`: SQLite 쿼리 (sqlx)
//! - `error`: `AppError`와 HTTP 응답 변환
//! - `middleware`: JWT 인증 추출자
//! - `models`: 요청/응답/행 구조체와 도메인 값 타입 (`Term`, `CourseCode` 등)
//! - `routes`: axum 핸들러와 라우터 조립
//! - `services`: DB와 무관한 순수 로직 (학기 생성, 보드 프로젝션, CSV)
//!
//! 바이너리(`main.rs`)와 통합 테스트(`tests/`)가 같은 라우터를 쓰도록 라이브러리로 노출합니다.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
