//! # 학기 목록 생성기
//!
//! 시작 학기와 끝 학기 사이의 모든 학기를 시간 순서대로 나열합니다.
//!
//! ## 알고리즘
//! 학기를 정수 좌표 `year * 3 + season_index`로 펼치면 "다음 학기"는 단순히 +1입니다.
//! 시작 좌표에서 끝 좌표까지(양끝 포함) 한 칸씩 전진하며,
//! Fall 다음에는 이듬해 Winter로 넘어갑니다.
//!
//! ```text
//! Winter 2023 → Spring 2023 → Fall 2023 → Winter 2024 → Spring 2024
//! ```
//!
//! 시작이 끝보다 뒤면 빈 목록을 돌려줍니다. 에러가 아니라 정해진 정책입니다.
//!
//! 목록 길이는 `MAX_TERMS`에서 잘립니다. `YEAR_BOUNDS` 안의 범위는 이 길이를 넘지 않으므로
//! HTTP로 들어오는 범위는 잘리는 일이 없습니다.

use crate::models::{Term, TermRange, MAX_YEAR, MIN_YEAR};

/// 한 번에 생성하는 최대 학기 수: `YEAR_BOUNDS` 전체(301년 × 3학기)
pub const MAX_TERMS: usize = ((MAX_YEAR - MIN_YEAR + 1) * 3) as usize;

/// `start`부터 `end`까지(양끝 포함) 학기 목록을 만듭니다.
///
/// 순수 함수입니다. 같은 입력에는 항상 같은 출력을 돌려줍니다.
/// 정수 좌표 위에서 순회하므로 `i32::MAX`년 같은 끝값에서도 넘침이 없습니다.
pub fn generate_terms(start: Term, end: Term) -> Vec<Term> {
    if start > end {
        return Vec::new();
    }

    (start.ordinal()..=end.ordinal())
        .take(MAX_TERMS)
        .filter_map(Term::from_ordinal)
        .collect()
}

/// 사용자 학기 범위로부터 학기 목록을 만듭니다.
pub fn terms_in_range(range: &TermRange) -> Vec<Term> {
    generate_terms(range.start(), range.end())
}

/// 학기 목록을 화면용 라벨 목록으로 바꿉니다. (예: `["Fall 2023", "Winter 2024"]`)
pub fn term_labels(terms: &[Term]) -> Vec<String> {
    terms.iter().map(Term::to_string).collect()
}
