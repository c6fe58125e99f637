//! # 학기 범위 쿼리
//!
//! 사용자당 한 행(`user_term_ranges.user_id`가 기본키)입니다.
//! 범위는 항상 통째로 교체됩니다.

use crate::error::AppError;
use crate::models::{Season, TermRange};
use sqlx::{Sqlite, SqlitePool};

/// 사용자의 학기 범위를 조회합니다.
///
/// 계절 컬럼은 TEXT로 저장되어 있으므로 `Season`으로 다시 파싱합니다.
/// CHECK 제약 덕분에 실패할 일은 없지만, 실패하면 내부 오류로 처리합니다.
pub async fn get_term_range(pool: &SqlitePool, user_id: &str) -> Result<Option<TermRange>, AppError> {
    let row = sqlx::query_as::<_, (String, i64, String, i64)>(
        r#"
        SELECT start_season, start_year, end_season, end_year
        FROM user_term_ranges
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some((start_season, start_year, end_season, end_year)) = row else {
        return Ok(None);
    };

    let parse_season = |s: &str| {
        s.parse::<Season>()
            .map_err(|e| AppError::Internal(format!("Corrupt term range row: {}", e)))
    };
    let parse_year = |y: i64| {
        i32::try_from(y).map_err(|_| AppError::Internal(format!("Year out of range: {}", y)))
    };

    Ok(Some(TermRange {
        start_season: parse_season(&start_season)?,
        start_year: parse_year(start_year)?,
        end_season: parse_season(&end_season)?,
        end_year: parse_year(end_year)?,
    }))
}

/// 학기 범위를 저장합니다. 이미 있으면 덮어씁니다.
///
/// `Executor` 제네릭: 풀(`&SqlitePool`)과 트랜잭션(`&mut *tx`) 양쪽에서 호출할 수 있습니다.
/// 회원가입 트랜잭션 안에서 기본 범위를 만들 때도 이 함수를 씁니다.
pub async fn upsert_term_range<'e, E>(
    executor: E,
    user_id: &str,
    range: &TermRange,
) -> Result<(), AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO user_term_ranges (user_id, start_season, start_year, end_season, end_year)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            start_season = excluded.start_season,
            start_year = excluded.start_year,
            end_season = excluded.end_season,
            end_year = excluded.end_year
        "#,
    )
    .bind(user_id)
    .bind(range.start_season.as_str())
    .bind(range.start_year)
    .bind(range.end_season.as_str())
    .bind(range.end_year)
    .execute(executor)
    .await?;

    Ok(())
}
