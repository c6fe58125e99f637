//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `course`: 과목 카탈로그, 과목 코드 정규화
//! - `plan`: 사용자 플랜과 과목 선택
//! - `schedule`: 시간표와 과목-학기 배정
//! - `template`: 졸업 요건 템플릿
//! - `term`: 학기, 학기 범위
//! - `user`: 사용자 인증
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Term`처럼 짧게 접근합니다.

pub mod course;
pub mod plan;
pub mod schedule;
pub mod template;
pub mod term;
pub mod user;

pub use course::*;
pub use plan::*;
pub use schedule::*;
pub use template::*;
pub use term::*;
pub use user::*;
