//! # 학기(Term) 모델 정의
//!
//! 학기는 `{계절, 연도}` 쌍으로 표현되는 불변 값 타입입니다.
//! 화면과 API에서는 `"Fall 2024"`처럼 `"<계절> <연도>"` 문자열로 주고받습니다.
//!
//! ## 계절 순서
//! 한 해 안에서의 순서는 학사 일정 기준 `Winter → Spring → Fall`입니다.
//! (달력 순서가 아닙니다. 1월에 시작하는 Winter 학기가 가장 먼저 옵니다.)
//!
//! ## 구조체 역할
//! - `Season`: 세 가지 계절 열거형
//! - `Term`: 하나의 학기 (정렬 가능)
//! - `TermRange`: 사용자별 학기 범위 (`user_term_ranges` 테이블 한 행)
//! - `UpdateTermRangeRequest`: 학기 범위 변경 요청 본문

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

/// 학기의 계절
///
/// variant 선언 순서가 곧 연도 안에서의 시간 순서입니다.
/// `derive(PartialOrd, Ord)`는 선언 순서대로 비교하므로 `Winter < Spring < Fall`이 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Fall,
}

impl Season {
    /// 학사 일정 순서로 정렬된 전체 계절 목록
    pub const ALL: [Season; 3] = [Season::Winter, Season::Spring, Season::Fall];

    /// 연도 안에서의 위치 (Winter = 0, Spring = 1, Fall = 2)
    pub fn index(self) -> i32 {
        match self {
            Season::Winter => 0,
            Season::Spring => 1,
            Season::Fall => 2,
        }
    }

    /// `index()`의 역함수. 범위를 벗어나면 None
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Season::Winter),
            1 => Some(Season::Spring),
            2 => Some(Season::Fall),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 학기 문자열 파싱 실패
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermParseError {
    #[error("Unknown season: {0}")]
    UnknownSeason(String),

    #[error("Invalid term label: {0}")]
    InvalidLabel(String),
}

impl FromStr for Season {
    type Err = TermParseError;

    /// 대소문자를 구분하지 않습니다. (`"fall"`, `"FALL"` 모두 허용)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Season::ALL
            .into_iter()
            .find(|season| season.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TermParseError::UnknownSeason(s.to_string()))
    }
}

/// 하나의 학기 (예: `Fall 2024`)
///
/// 필드 선언 순서가 `(year, season)`이므로 derive된 `Ord`는
/// 연도를 먼저, 같은 연도 안에서는 계절 순서를 비교합니다.
///
/// JSON에서는 구조체가 아니라 `"Fall 2024"` 문자열 하나로 직렬화됩니다.
/// `#[serde(into/try_from)]`이 `String` 변환을 거치도록 지정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

impl Term {
    pub fn new(season: Season, year: i32) -> Self {
        Self { year, season }
    }

    /// 학기를 하나의 정수 좌표로 펼칩니다: `year * 3 + season_index`
    ///
    /// 학기 사이의 비교와 순회가 단순한 정수 연산이 됩니다.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 3 + i64::from(self.season.index())
    }

    /// `ordinal()`의 역함수. 연도가 `i32`를 벗어나면 None
    ///
    /// 음수 좌표에서도 계절이 어긋나지 않도록 `div_euclid`/`rem_euclid`를 씁니다.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        let year = i32::try_from(ordinal.div_euclid(3)).ok()?;
        let season = Season::from_index(i32::try_from(ordinal.rem_euclid(3)).ok()?)?;
        Some(Term::new(season, year))
    }

    /// 바로 다음 학기. Fall 다음은 이듬해 Winter입니다.
    ///
    /// `i32::MAX`년 Fall처럼 다음 연도가 표현되지 않으면 None
    pub fn next(self) -> Option<Self> {
        match self.season {
            Season::Winter => Some(Term::new(Season::Spring, self.year)),
            Season::Spring => Some(Term::new(Season::Fall, self.year)),
            Season::Fall => Some(Term::new(Season::Winter, self.year.checked_add(1)?)),
        }
    }

    /// 학기 범위 설정과 배정에서 허용하는 연도인지
    pub fn year_in_bounds(self) -> bool {
        YEAR_BOUNDS.contains(&self.year)
    }
}

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2200;

/// 학기 범위와 배정에 쓸 수 있는 연도 범위
pub const YEAR_BOUNDS: RangeInclusive<i32> = MIN_YEAR..=MAX_YEAR;

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season, self.year)
    }
}

impl FromStr for Term {
    type Err = TermParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(season), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(TermParseError::InvalidLabel(s.to_string()));
        };
        let season = season.parse::<Season>()?;
        let year = year
            .parse::<i32>()
            .map_err(|_| TermParseError::InvalidLabel(s.to_string()))?;
        Ok(Term::new(season, year))
    }
}

impl From<Term> for String {
    fn from(term: Term) -> Self {
        term.to_string()
    }
}

impl TryFrom<String> for Term {
    type Error = TermParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 사용자별 학기 범위: DB의 `user_term_ranges` 테이블 한 행에 대응합니다.
///
/// 시작이 끝보다 늦어도 저장 자체는 허용됩니다.
/// 그 경우 생성되는 학기 목록이 비어 있을 뿐, 에러가 아닙니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRange {
    pub start_season: Season,
    pub start_year: i32,
    pub end_season: Season,
    pub end_year: i32,
}

impl TermRange {
    /// 가입 시 기본값: 올해 Fall부터 5년 뒤 Fall까지
    pub fn default_from_year(year: i32) -> Self {
        Self {
            start_season: Season::Fall,
            start_year: year,
            end_season: Season::Fall,
            end_year: year + 5,
        }
    }

    pub fn start(&self) -> Term {
        Term::new(self.start_season, self.start_year)
    }

    pub fn end(&self) -> Term {
        Term::new(self.end_season, self.end_year)
    }

    /// 학기가 범위 안(양끝 포함)에 있는지. 시작이 끝보다 뒤인 범위는 아무것도 포함하지 않습니다.
    pub fn contains(&self, term: Term) -> bool {
        self.start() <= term && term <= self.end()
    }
}

/// 학기 범위 변경 요청: `PUT /api/v1/term-range`의 요청 본문
///
/// 범위는 항상 통째로(wholesale) 교체되므로 모든 필드가 필수입니다.
pub type UpdateTermRangeRequest = TermRange;
