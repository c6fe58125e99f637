//! # 템플릿(Template) 모델 정의
//!
//! 템플릿은 재사용 가능한 졸업 요건 정의입니다.
//! 순서가 있는 항목(item)들의 목록이며, 항목은 세 종류입니다:
//! - `instruction`: 안내 문구
//! - `separator`: 구분선
//! - `requirement`: 과목 요건. `fixed`(명시된 과목 목록 중 N개)와 `free`(아무 과목 N개)
//!
//! 요건 하나는 여러 개의 "과목 항목(course item)"을 가지며,
//! 사용자는 과목 항목 단위로 수강 여부를 선택합니다.

use crate::models::{Course, CourseCodeList};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// 템플릿을 만든 사용자. 사용자 삭제 시 NULL
    pub created_by: Option<String>,
    pub created_at: String,
}

/// 템플릿 항목 종류 (`template_items.kind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Requirement,
    Instruction,
    Separator,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Requirement => "requirement",
            ItemKind::Instruction => "instruction",
            ItemKind::Separator => "separator",
        }
    }
}

/// 요건의 과목 종류 (`template_items.course_type`, `course_items.kind`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseType {
    Fixed,
    Free,
}

impl CourseType {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseType::Fixed => "fixed",
            CourseType::Free => "free",
        }
    }
}

/// `template_items` 테이블 한 행 (DB 조회용)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TemplateItemRow {
    pub id: String,
    pub template_id: String,
    pub kind: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub course_type: Option<String>,
    pub course_count: Option<i64>,
}

/// `course_items` 테이블 한 행
///
/// fixed 항목은 `course_id`가 항상 있고, free 항목은 항상 NULL입니다.
/// free 항목에 사용자가 채운 과목은 `free_courses`에 따로 저장됩니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CourseItem {
    pub id: String,
    pub requirement_id: String,
    pub kind: String,
    pub course_id: Option<String>,
}

impl CourseItem {
    pub fn is_free(&self) -> bool {
        self.kind == CourseType::Free.as_str()
    }
}

/// 템플릿 생성 요청: `POST /api/v1/templates`
///
/// 항목의 `order_index`는 배열 순서로 매겨집니다.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<TemplateItemInput>,
}

/// 템플릿 항목 입력
///
/// `#[serde(tag = "type")]`: JSON의 `"type"` 필드 값으로 variant를 고릅니다.
/// 예: `{ "type": "separator" }`, `{ "type": "instruction", "description": "..." }`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemplateItemInput {
    Instruction {
        description: String,
    },
    Separator,
    Requirement {
        description: Option<String>,
        #[serde(flatten)]
        courses: RequirementCourses,
    },
}

/// 요건의 과목 구성
///
/// fixed: `"courses": "CS 135, MATH 135"`: 쉼표 구분 문자열을 `CourseCodeList`로 검증.
///        `course_count`가 있으면 목록 중 N개를 고르는 요건입니다.
/// free:  `"course_count": 3`: 빈 슬롯 3개
#[derive(Debug, Deserialize)]
#[serde(tag = "course_type", rename_all = "snake_case")]
pub enum RequirementCourses {
    Fixed {
        courses: CourseCodeList,
        course_count: Option<i64>,
    },
    Free {
        course_count: i64,
    },
}

/// 템플릿 이름/설명 수정 요청: `PATCH /api/v1/templates/{id}`
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// 요건 안의 과목 슬롯 한 칸
///
/// fixed 슬롯은 항상 `course`가 있고, free 슬롯은 사용자가 채우기 전까지 None입니다.
#[derive(Debug, Clone, Serialize)]
pub struct CourseSlot {
    pub course_item_id: String,
    pub course: Option<Course>,
    pub selected: bool,
}

/// 템플릿 상세 조회의 항목 하나
#[derive(Debug, Clone, Serialize)]
pub struct TemplateItemDetail {
    pub id: String,
    pub kind: String,
    pub description: Option<String>,
    pub order_index: i64,
    pub course_type: Option<String>,
    pub course_count: Option<i64>,
    pub fixed_courses: Vec<CourseSlot>,
    pub free_courses: Vec<CourseSlot>,
}

/// `GET /api/v1/templates/{id}` 응답
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDetail {
    #[serde(flatten)]
    pub template: Template,
    pub items: Vec<TemplateItemDetail>,
}
