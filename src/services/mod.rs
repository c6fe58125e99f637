//! # 비즈니스 로직 모듈
//!
//! DB나 HTTP에 의존하지 않는 순수 로직을 모아둔 모듈입니다.
//! - `terms`: 학기 범위 → 학기 목록 생성
//! - `board`: 시간표 보드 프로젝션과 낙관적 갱신 상태 머신
//! - `export`: 시간표 CSV 변환

pub mod board;
pub mod export;
pub mod terms;
