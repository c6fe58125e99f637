//! # 과목-학기 배정 저장소 (`schedule_courses`)
//!
//! 키가 `(schedule_id, course_id)`인 관계 테이블입니다.
//! 한 시간표 안에서 과목은 최대 한 학기에만 놓일 수 있습니다.
//!
//! ## 연산
//! - `assign`: upsert. 이미 배정된 과목이면 학기만 덮어씁니다.
//! - `unassign`: 키로 삭제. 없는 행을 지워도 에러가 아닙니다.
//! - `list_for_schedule`: 배정 목록 (과목 코드/이름 포함)
//!
//! 동시에 같은 과목을 두 번 배정하면 나중에 실행된 문장이 이깁니다(last-write-wins).
//! 각 연산은 단일 SQL 문장이므로 SQLite가 원자성을 보장합니다.

use crate::error::AppError;
use crate::models::ScheduledCourse;
use sqlx::SqlitePool;

/// 과목을 학기에 배정합니다.
///
/// `ON CONFLICT ... DO UPDATE`: 같은 키가 이미 있으면 INSERT 대신 term만 바꿉니다.
/// 덕분에 "학기 A → 학기 B 이동"도 이 함수 하나로 처리됩니다.
pub async fn assign(
    pool: &SqlitePool,
    schedule_id: &str,
    course_id: &str,
    term: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO schedule_courses (schedule_id, course_id, term)
        VALUES (?, ?, ?)
        ON CONFLICT(schedule_id, course_id) DO UPDATE SET term = excluded.term
        "#,
    )
    .bind(schedule_id)
    .bind(course_id)
    .bind(term)
    .execute(pool)
    .await?;

    tracing::debug!(schedule_id, course_id, term, "course assigned");
    Ok(())
}

/// 과목을 시간표에서 뺍니다 (available로 되돌림).
///
/// ## 반환값
/// - `true`: 실제로 행이 삭제됨
/// - `false`: 원래 배정되어 있지 않았음 (호출자 입장에서는 똑같이 성공)
pub async fn unassign(pool: &SqlitePool, schedule_id: &str, course_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM schedule_courses WHERE schedule_id = ? AND course_id = ?")
        .bind(schedule_id)
        .bind(course_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 시간표의 배정 목록을 조회합니다.
///
/// 순서는 보장하지 않습니다. 화면 정렬은 보드 프로젝션이 담당합니다.
/// (여기서는 테스트 재현성을 위해 과목 코드순으로 가져옵니다.)
pub async fn list_for_schedule(
    pool: &SqlitePool,
    schedule_id: &str,
) -> Result<Vec<ScheduledCourse>, AppError> {
    let rows = sqlx::query_as::<_, ScheduledCourse>(
        r#"
        SELECT c.id AS course_id, c.code AS course_code, c.name AS course_name, sc.term
        FROM schedule_courses sc
        JOIN courses c ON c.id = sc.course_id
        WHERE sc.schedule_id = ?
        ORDER BY c.code
        "#,
    )
    .bind(schedule_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
