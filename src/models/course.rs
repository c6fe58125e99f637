//! # 과목(Course) 모델 정의
//!
//! 과목 카탈로그와 과목 코드 정규화 타입을 정의합니다.
//!
//! ## 과목 코드 정규화
//! 사용자가 입력한 `"cs 135"`, `"CS135"`, `"Cs  1 35"`는 모두 같은 과목입니다.
//! `CourseCode::parse()`가 공백을 모두 제거하고 대문자로 바꾼 뒤 형식을 검사합니다.
//! 템플릿의 fixed 요건처럼 쉼표로 구분된 목록은 `CourseCodeList`가 한 번에 처리합니다.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// 과목 코드 최대 길이 (`courses.code` 컬럼 제약과 동일)
pub const MAX_COURSE_CODE_LEN: usize = 10;

/// 과목 엔티티: DB의 `courses` 테이블 한 행에 대응합니다.
///
/// 평점과 수강 요건은 JSON에서 과목 객체에 바로 펼쳐집니다 (`#[serde(flatten)]`).
/// DB 쪽도 같은 행의 컬럼이므로 `#[sqlx(flatten)]`으로 읽습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Course {
    /// 과목 고유 식별자 (UUIDv7)
    pub id: String,
    /// 정규화된 과목 코드 (예: "CS135")
    pub code: String,
    /// 과목 이름 (예: "Designing Functional Programs")
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub ratings: CourseRatings,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub requisites: CourseRequisites,
}

/// 수강생 평점
///
/// 외부 평가 사이트에서 가져온 값이라 없을 수 있습니다.
/// 세 평점은 "그렇다"고 답한 비율(0.0~1.0)이고, `num_ratings`는 응답 수입니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseRatings {
    pub useful_rating: Option<f64>,
    pub liked_rating: Option<f64>,
    pub easy_rating: Option<f64>,
    pub num_ratings: Option<i64>,
}

impl CourseRatings {
    /// 비율은 0~1, 응답 수는 0 이상이어야 합니다.
    pub fn validate(&self) -> Result<(), AppError> {
        let ratios = [
            ("useful_rating", self.useful_rating),
            ("liked_rating", self.liked_rating),
            ("easy_rating", self.easy_rating),
        ];
        for (field, value) in ratios {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(AppError::BadRequest(format!(
                        "{} must be between 0 and 1",
                        field
                    )));
                }
            }
        }
        if self.num_ratings.is_some_and(|n| n < 0) {
            return Err(AppError::BadRequest("num_ratings must not be negative".to_string()));
        }
        Ok(())
    }
}

/// 선수(prereqs), 반수(antireqs), 동시수강(coreqs) 요건
///
/// 학칙 문장을 그대로 담은 자유 텍스트입니다. 해석하지 않고 보여주기만 합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CourseRequisites {
    pub prereqs: Option<String>,
    pub antireqs: Option<String>,
    pub coreqs: Option<String>,
}

/// 과목 등록 요청: `POST /api/v1/courses`
///
/// 평점과 요건 필드는 모두 선택입니다.
#[derive(Debug, Default, Deserialize)]
pub struct CreateCourseRequest {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub ratings: CourseRatings,
    #[serde(flatten)]
    pub requisites: CourseRequisites,
}

/// 과목 코드 검증 실패
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseCodeError {
    #[error("Course code is empty")]
    Empty,

    #[error("Course code is too long: {0}")]
    TooLong(String),

    #[error("Malformed course code: {0}")]
    Malformed(String),
}

/// 정규화·검증을 마친 과목 코드
///
/// 생성 경로가 `parse()` 하나뿐이므로, 이 타입의 값은 항상 다음을 만족합니다:
/// - 공백 없음, 대문자
/// - 1~10자의 ASCII 영숫자
/// - 영문자로 시작하고 숫자를 하나 이상 포함 (예: `CS135`, `MATH239`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CourseCode(String);

impl CourseCode {
    pub fn parse(raw: &str) -> Result<Self, CourseCodeError> {
        let code = normalize_course_code(raw);

        if code.is_empty() {
            return Err(CourseCodeError::Empty);
        }
        if code.len() > MAX_COURSE_CODE_LEN {
            return Err(CourseCodeError::TooLong(code));
        }

        let well_formed = code.chars().all(|c| c.is_ascii_alphanumeric())
            && code.starts_with(|c: char| c.is_ascii_alphabetic())
            && code.chars().any(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(CourseCodeError::Malformed(raw.trim().to_string()));
        }

        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 모든 공백을 제거하고 대문자로 변환합니다.
///
/// `"cO 2 5 0"` → `"CO250"`
pub fn normalize_course_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// 쉼표로 구분된 과목 코드 목록을 검증한 결과
///
/// - 입력 순서를 유지합니다.
/// - 중복 코드는 처음 나온 것만 남깁니다.
/// - 빈 항목(`"CS135,,MATH135"`의 가운데)은 건너뜁니다.
/// - 형식이 잘못된 코드가 하나라도 있으면 전체가 실패합니다.
///
/// JSON에서는 `"CS 135, MATH 135"` 같은 문자열로 받습니다 (`try_from = "String"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct CourseCodeList(Vec<CourseCode>);

impl CourseCodeList {
    pub fn parse(raw: &str) -> Result<Self, CourseCodeError> {
        let mut codes: Vec<CourseCode> = Vec::new();
        for part in raw.split(',') {
            if part.trim().is_empty() {
                continue;
            }
            let code = CourseCode::parse(part)?;
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        Ok(Self(codes))
    }

    pub fn codes(&self) -> &[CourseCode] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for CourseCodeList {
    type Error = CourseCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// 사용자가 선택("수강 예정"으로 표시)한 과목 한 건
///
/// 같은 과목이 여러 템플릿 요건에 들어 있을 수 있어서
/// 조회 쿼리 결과는 과목 기준으로 한 번만 나오도록 정리됩니다.
/// 선택 목록 화면에서 평점순 정렬을 하므로 평점도 함께 싣습니다.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SelectedCourse {
    pub course_id: String,
    pub course_code: String,
    pub course_name: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub ratings: CourseRatings,
}

/// 선택 과목 목록 정렬 기준: `GET /api/v1/plan/courses?sort=...&desc=true`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseSortKey {
    #[default]
    Code,
    Name,
    Useful,
    Liked,
    Easy,
    NumRatings,
}

impl CourseSortKey {
    /// 기준값만으로 두 과목을 비교합니다. 평점이 없는 과목은 0으로 취급합니다.
    fn compare(self, a: &SelectedCourse, b: &SelectedCourse) -> Ordering {
        let rating = |value: Option<f64>| value.unwrap_or(0.0);
        match self {
            CourseSortKey::Code => a.course_code.cmp(&b.course_code),
            CourseSortKey::Name => a.course_name.cmp(&b.course_name),
            CourseSortKey::Useful => rating(a.ratings.useful_rating)
                .total_cmp(&rating(b.ratings.useful_rating)),
            CourseSortKey::Liked => rating(a.ratings.liked_rating)
                .total_cmp(&rating(b.ratings.liked_rating)),
            CourseSortKey::Easy => rating(a.ratings.easy_rating)
                .total_cmp(&rating(b.ratings.easy_rating)),
            CourseSortKey::NumRatings => a
                .ratings
                .num_ratings
                .unwrap_or(0)
                .cmp(&b.ratings.num_ratings.unwrap_or(0)),
        }
    }
}

/// 선택 과목 목록을 정렬합니다.
///
/// `descending`은 기준값에만 적용되고, 기준값이 같으면 항상 과목 코드 오름차순입니다.
pub fn sort_selected_courses(courses: &mut [SelectedCourse], key: CourseSortKey, descending: bool) {
    courses.sort_by(|a, b| {
        let ordering = key.compare(a, b);
        // rev: 내림차순이면 비교 결과를 뒤집음
        let ordering = if descending { ordering.reverse() } else { ordering };
        ordering.then_with(|| a.course_code.cmp(&b.course_code))
    });
}
