//! # 시간표(Schedule) 모델 정의
//!
//! 시간표는 선택한 과목들을 학기별로 배치한 이름 있는 배열입니다.
//! 한 플랜에 여러 시간표가 있을 수 있고, 각 시간표는 서로 독립적인 배정을 가집니다.
//!
//! ## 구조체 역할
//! - `Schedule`: `schedules` 테이블 한 행
//! - `ScheduledCourse`: `schedule_courses` 배정 한 건 (과목 코드/이름 포함)
//! - `CourseInstance`: 보드 화면용 과목 카드 (`term`이 빈 문자열이면 미배정)
//! - 요청/응답 본문 구조체들

use crate::error::AppError;
use crate::models::Term;
use serde::{Deserialize, Serialize};

/// 시간표 이름 최대 길이 (문자 수 기준)
pub const MAX_SCHEDULE_NAME_LEN: usize = 20;

/// 가입 시 자동으로 만들어지는 시간표 이름
pub const DEFAULT_SCHEDULE_NAME: &str = "Default";

/// 시간표 엔티티
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Schedule {
    pub id: String,
    pub name: String,
    pub plan_id: String,
    pub created_at: String,
}

/// 시간표에 배정된 과목 한 건
///
/// 키는 `(schedule_id, course_id)`이므로 한 시간표에서 과목은 최대 한 번만 나옵니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ScheduledCourse {
    pub course_id: String,
    pub course_code: String,
    pub course_name: String,
    /// 학기 라벨 (예: "Fall 2024")
    pub term: String,
}

/// 보드 화면의 과목 카드
///
/// "배정 가능한 과목" 목록과 "시간표 안의 과목" 목록이 같은 타입을 씁니다.
/// `term`이 빈 문자열이면 아직 어느 학기에도 놓이지 않은 과목입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseInstance {
    pub course_id: String,
    pub course_code: String,
    pub course_name: String,
    pub term: String,
}

impl CourseInstance {
    pub fn is_unscheduled(&self) -> bool {
        self.term.is_empty()
    }
}

impl From<ScheduledCourse> for CourseInstance {
    fn from(row: ScheduledCourse) -> Self {
        Self {
            course_id: row.course_id,
            course_code: row.course_code,
            course_name: row.course_name,
            term: row.term,
        }
    }
}

/// 시간표 이름을 검증하고 앞뒤 공백을 제거한 이름을 돌려줍니다.
///
/// 1~20자. 중복은 허용됩니다.
pub fn validate_schedule_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Schedule name is required".to_string()));
    }
    if name.chars().count() > MAX_SCHEDULE_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Schedule name must be at most {} characters",
            MAX_SCHEDULE_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

/// `POST /api/v1/schedules`, `PATCH /api/v1/schedules/{id}` 공용 본문
#[derive(Debug, Deserialize)]
pub struct ScheduleNameRequest {
    pub name: String,
}

/// `PUT /api/v1/schedules/{id}/courses/{course_id}` 본문
///
/// `term`은 `"Fall 2024"` 형식이어야 합니다. 문자열로 받아서 `term()`으로 검증하므로
/// 형식 오류는 JSON 거부(422)가 아니라 우리 에러 형식의 400으로 나갑니다.
#[derive(Debug, Deserialize)]
pub struct AssignCourseRequest {
    pub term: String,
}

impl AssignCourseRequest {
    pub fn term(&self) -> Result<Term, AppError> {
        Ok(self.term.parse::<Term>()?)
    }
}

/// 시간표 삭제 응답
///
/// 클라이언트는 `next_schedule_id`가 있으면 그 시간표로,
/// 없으면 시간표가 선택되지 않은 기본 화면으로 이동합니다.
#[derive(Debug, Serialize)]
pub struct DeleteScheduleResponse {
    pub deleted_id: String,
    pub next_schedule_id: Option<String>,
}

/// `GET /api/v1/schedules/{id}/board` 응답
#[derive(Debug, Serialize)]
pub struct ScheduleBoardResponse {
    pub schedule: Schedule,
    pub terms: Vec<Term>,
    pub available: Vec<CourseInstance>,
    pub scheduled: Vec<CourseInstance>,
}
