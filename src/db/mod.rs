//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출하여 DB 작업을 수행합니다.
//!
//! 각 하위 모듈:
//! - `assignments`: 과목-학기 배정 저장소 (upsert / 삭제 / 목록)
//! - `courses`: 과목 카탈로그
//! - `plans`: 플랜, 템플릿 토글, 과목 선택
//! - `schedules`: 시간표 CRUD와 소유권 확인
//! - `templates`: 졸업 요건 템플릿
//! - `term_ranges`: 사용자별 학기 범위
//! - `users`: 가입과 인증 토큰
//!
//! 이름이 겹치는 함수가 있어서 glob 재공개 대신 `db::schedules::list_schedules`처럼
//! 모듈 경로로 호출합니다.

pub mod assignments;
pub mod courses;
pub mod plans;
pub mod schedules;
pub mod templates;
pub mod term_ranges;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;
