//! # 플랜(Plan) 모델 정의
//!
//! 플랜은 사용자 한 명의 개인 학업 계획입니다. (사용자와 1:1)
//! 어떤 템플릿을 골랐는지, 어떤 과목 항목을 수강 예정으로 표시했는지를 담습니다.

use crate::models::Template;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Plan {
    pub id: String,
    pub user_id: String,
}

/// `GET /api/v1/plan` 응답
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan: Plan,
    pub templates: Vec<Template>,
}

/// 과목 항목 선택/해제: `PUT /api/v1/plan/course-items/{id}/selection`
#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub selected: bool,
}

/// free 슬롯 채우기: `PUT /api/v1/plan/course-items/{id}/free`
///
/// `course_id`가 null이면 슬롯을 비웁니다.
#[derive(Debug, Deserialize)]
pub struct FillFreeCourseRequest {
    pub course_id: Option<String>,
}

/// 템플릿 토글 결과
#[derive(Debug, Serialize)]
pub struct ToggleTemplateResponse {
    pub template_id: String,
    /// 토글 후 플랜에 포함되어 있으면 true
    pub in_plan: bool,
}
